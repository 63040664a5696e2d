use std::io;

use minehint_core::{GameError, SchemaError};
use thiserror::Error;

/// Failures while reading or writing the experience file. Never reaches
/// callers of the advisor; the store logs it and carries on in memory.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("experience storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("experience data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("experience data is malformed: {0}")]
    Schema(#[from] SchemaError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdvisorError {
    #[error("No board has been set")]
    NoBoard,
    #[error(transparent)]
    Game(#[from] GameError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid value {value:?} for {key}")]
    Env { key: &'static str, value: String },
}
