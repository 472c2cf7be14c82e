//! Configuration: raw file structs and the figment loader.

mod file_config;
mod loader;

pub use file_config::{ConfigError, FileConfig, FileGenerationConfig, FileProviderConfig};
pub use loader::ConfigLoader;
