mod env;
mod loader;
mod raw;
pub mod config;
pub mod error;

pub use config::{BasePaths, ProviderConfig};
pub use env::{shared_config_for_region, shared_config_from};
pub use error::ConfigError;
pub use loader::{load_config_file, parse_config};
