pub mod app_config;
pub mod config;
pub mod programs;

use thiserror::Error;

pub use app_config::{AppConfig, DatasetConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use programs::{default_programs, load_programs, ProgramConfig, ProgramsFile};

/// Errors produced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read programs file {path}: {source}")]
    ProgramsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse programs file: {0}")]
    ProgramsFileParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}
