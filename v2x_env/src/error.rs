//! Error types for the environment abstraction.

use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Intent channel closed (receiver dropped, shutdown in progress)
    #[error("Channel error: {0}")]
    ChannelClosed(String),

    /// Context operation failed
    #[error("Context error: {0}")]
    ContextError(String),

    /// Operation timed out
    #[error("Timeout after {0}ms")]
    Timeout(u64),
}

impl EnvError {
    /// Creates a channel-closed error.
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::ChannelClosed(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EnvError::channel("intent receiver dropped");
        assert_eq!(err.to_string(), "Channel error: intent receiver dropped");
        assert_eq!(EnvError::Timeout(50).to_string(), "Timeout after 50ms");
    }
}
