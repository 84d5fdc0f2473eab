//! Progressive hint escalation for step-by-step math help.
//!
//! A [`HintEscalationEngine`] is bound to one problem and hands out up to
//! three hints of increasing specificity, asking its [`HintProvider`] at
//! most once per level. The provider implementations live in
//! [`providers`]; the engine only ever sees the trait.

pub mod circuit_breaker;
pub mod cli;
pub mod config;
pub mod error;
pub mod hints;
pub mod logging;
pub mod metrics;
pub mod perf;
pub mod providers;

pub use error::{ErrorKind, HintError};
pub use hints::{
    EquationData, HintEscalationEngine, HintLevel, HintProvider, HintRecord, HintResponse,
    ProblemContext,
};
