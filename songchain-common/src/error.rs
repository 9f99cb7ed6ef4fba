//! Common error types for songchain

use thiserror::Error;

/// Common result type for songchain operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the server and its helpers
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
