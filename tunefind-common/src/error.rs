//! Common error types for Tunefind

use thiserror::Error;

/// Common result type for Tunefind operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Tunefind services
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required secret absent from the environment
    #[error("Missing required environment variable: {0}")]
    MissingSecret(&'static str),
}
