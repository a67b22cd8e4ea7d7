use std::fmt::Display;

/// All error types that can occur while bridging commands to the gateway.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A colour string was malformed or has no chromaticity.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// The command action is neither "on" nor "off".
    #[error("command not recognised: {0}")]
    UnknownCommand(String),

    /// The bus handed over an address that is not a fixture identifier.
    #[error("invalid fixture address: {0}")]
    InvalidAddress(String),

    /// The gateway client failed to carry out a request.
    #[error("gateway {action} failed: {reason}")]
    Gateway { action: String, reason: String },

    /// The payload would not change any attribute.
    #[error("no attribute to change")]
    NoAttribute,

    /// No query handler is registered under this name.
    #[error("unknown query: {0}")]
    UnknownQuery(String),

    /// Failed to deserialize JSON data.
    #[error("failed to load json: {0:?}")]
    JsonLoad(serde_json::Error),

    /// The configuration file could not be read.
    #[error("failed to read config {path}: {err:?}")]
    ConfigRead { path: String, err: std::io::Error },

    /// The engine stopped and no longer accepts requests.
    #[error("engine request channel closed")]
    Closed,
}

impl Error {
    /// Create a new gateway error
    pub fn gateway(action: &str, err: impl Display) -> Self {
        Error::Gateway {
            action: action.to_string(),
            reason: err.to_string(),
        }
    }

    /// Create a new invalid color error
    pub fn invalid_color(input: &str, reason: &str) -> Self {
        Error::InvalidColor(format!("{input:?} ({reason})"))
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
