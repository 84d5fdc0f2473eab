pub mod settings;

pub use settings::{get_config, load_config, HintConfig};
