mod load;
mod types;

pub use load::{apply_env_overrides, load_default, load_from_path};
pub use types::{AppConfig, ExecutorConfig, LoggingConfig, ServerConfig, WindmillConfig};
