pub mod context;
pub mod engine;
pub mod level;
pub mod prompts;
pub mod provider;

pub use context::{EquationData, ProblemContext};
pub use engine::{HintEscalationEngine, HintRecord, HintResponse};
pub use level::HintLevel;
pub use provider::HintProvider;
