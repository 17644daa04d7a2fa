//! Error types for the tack-protocol crate.

use thiserror::Error;

/// Errors that can occur when constructing protocol types.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A task title was empty or whitespace-only.
    #[error("invalid task title: title cannot be empty")]
    InvalidTaskTitle,

    /// A project name was empty or whitespace-only.
    #[error("invalid project name: name cannot be empty")]
    InvalidProjectName,
}

/// A specialized Result type for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = ProtocolError::InvalidTaskTitle;
        assert_eq!(err.to_string(), "invalid task title: title cannot be empty");

        let err = ProtocolError::InvalidProjectName;
        assert!(err.to_string().contains("project name"));
    }
}
