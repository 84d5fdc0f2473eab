use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use crate::error::HintError;

/// Equation extracted for a problem: the template, the template with the
/// problem's values substituted, and the variable names in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquationData {
    pub equation: String,
    pub substituted_equation: String,
    #[serde(default)]
    pub variables: Vec<String>,
}

/// The problem a hint session is bound to. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemContext {
    problem: String,
    equation: Option<EquationData>,
}

impl ProblemContext {
    /// Fails fast on empty or whitespace-only problem text.
    pub fn new<S: Into<String>>(problem: S, equation: Option<EquationData>) -> Result<Self, HintError> {
        let problem = problem.into();
        if problem.trim().is_empty() {
            return Err(HintError::invalid_construction("Problem text is required"));
        }
        Ok(ProblemContext { problem, equation })
    }

    pub fn problem(&self) -> &str {
        &self.problem
    }

    pub fn equation(&self) -> Option<&EquationData> {
        self.equation.as_ref()
    }

    /// Short SHA-256 digest of the statement, for log fields
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.problem.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        digest[..12].to_string()
    }
}
