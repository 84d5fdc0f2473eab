pub mod backend;
pub mod ollama;
pub mod resilient;

pub use backend::BackendHintProvider;
pub use ollama::OllamaHintProvider;
pub use resilient::ResilientProvider;
