mod load;
mod types;

pub use load::{from_toml_str, load, validate, DEFAULT_CONFIG_FILE};
pub use types::{AppConfig, LoggingConfig, OutputFormat, RunConfig, TaskConfig};
