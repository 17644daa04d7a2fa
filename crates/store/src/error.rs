//! Error types for the tack-store crate.

use thiserror::Error;

/// Errors surfaced to callers of store operations.
///
/// Only invalid *input* is an error: remote write failures are logged and
/// absorbed (the next snapshot reconciles), and privilege violations are
/// logged no-ops.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The entity being created failed validation.
    #[error(transparent)]
    Invalid(#[from] tack_protocol::ProtocolError),

    /// No signed-in user; creation requires an owner.
    #[error("no signed-in user")]
    NoSession,
}

/// A specialized Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        assert_eq!(StoreError::NoSession.to_string(), "no signed-in user");

        let err = StoreError::from(tack_protocol::ProtocolError::InvalidTaskTitle);
        assert!(err.to_string().contains("title"));
    }
}
