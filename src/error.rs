//! Application-wide startup error types.
//!
//! Request-scoped failures live in [`crate::responder`]; everything here is
//! fatal to the process and surfaces from `main`.

use thiserror::Error;

use crate::config::ConfigurationError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigurationError),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
