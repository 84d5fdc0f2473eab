use serde::{Deserialize, Serialize};
use std::fmt;

/// How much of the solution path a hint discloses.
///
/// Serialized as the bare number `1..=3`, matching the `hintLevel` field
/// of the hint endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum HintLevel {
    /// Problem type, what is asked, what is given, a strategy
    First,
    /// The exact formula with problem values bound to its variables
    Second,
    /// The fully substituted expression, one calculation short of the answer
    Third,
}

/// Cursor value reported once every level has been delivered.
pub const EXHAUSTED_LEVEL: u8 = 4;

impl HintLevel {
    pub const ALL: [HintLevel; 3] = [HintLevel::First, HintLevel::Second, HintLevel::Third];

    pub fn as_u8(self) -> u8 {
        match self {
            HintLevel::First => 1,
            HintLevel::Second => 2,
            HintLevel::Third => 3,
        }
    }

    /// The following level, or `None` past the third
    pub fn next(self) -> Option<HintLevel> {
        match self {
            HintLevel::First => Some(HintLevel::Second),
            HintLevel::Second => Some(HintLevel::Third),
            HintLevel::Third => None,
        }
    }
}

impl TryFrom<u8> for HintLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(HintLevel::First),
            2 => Ok(HintLevel::Second),
            3 => Ok(HintLevel::Third),
            other => Err(format!("hint level must be 1, 2 or 3, got {}", other)),
        }
    }
}

impl From<HintLevel> for u8 {
    fn from(level: HintLevel) -> u8 {
        level.as_u8()
    }
}

impl fmt::Display for HintLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}
