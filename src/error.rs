//! Error types for rosapi
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using RosError
pub type Result<T> = std::result::Result<T, RosError>;

/// Trap message the router sends when credentials are rejected
pub const INVALID_CREDENTIALS_MESSAGE: &str = "invalid user name or password (6)";

/// Unified error type for rosapi operations
#[derive(Debug, Error)]
pub enum RosError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Short read, timeout or malformed length header while decoding a word
    #[error("Stream error: {0}")]
    Stream(String),

    // -------------------------------------------------------------------------
    // Login Errors
    // -------------------------------------------------------------------------
    #[error("Invalid host address '{0}'")]
    InvalidHost(String),

    #[error("Could not connect to {host}:{port}: {message}")]
    Connection {
        host: String,
        port: u16,
        message: String,
    },

    #[error("Invalid user name or password")]
    Authentication,

    #[error("Login failed: {0}")]
    Login(String),

    // -------------------------------------------------------------------------
    // Command Errors
    // -------------------------------------------------------------------------
    #[error("Session is not authenticated")]
    NotAuthenticated,

    /// The router answered with `!trap`; the message may be missing
    #[error("Router trap: {}", .message.as_deref().unwrap_or(""))]
    Trap { message: Option<String> },

    #[error("Execution failed: {0}")]
    Execution(String),
}

impl RosError {
    /// The router's message if this is a trap
    pub fn trap_message(&self) -> Option<&str> {
        match self {
            RosError::Trap { message } => message.as_deref(),
            _ => None,
        }
    }
}
