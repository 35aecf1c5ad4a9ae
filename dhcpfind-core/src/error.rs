//! Error types for dhcpfind

use thiserror::Error;

/// Result type alias for dhcpfind operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for dhcpfind
#[derive(Error, Debug)]
pub enum Error {
    /// Network I/O error
    #[error("Network I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Protocol-specific error
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Invalid parameter error
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Interface not found
    #[error("Interface '{0}' not found")]
    InterfaceNotFound(String),

    /// Interface error
    #[error("Interface error: {0}")]
    Interface(String),

    /// Packet construction error
    #[error("Packet construction error: {0}")]
    PacketConstruction(String),

    /// Packet parsing error
    #[error("Packet parsing error: {0}")]
    PacketParsing(String),

    /// Capture error
    #[error("Packet capture error: {0}")]
    Capture(String),

    /// Insufficient privileges
    #[error("Insufficient privileges: {0}")]
    InsufficientPrivileges(String),

    /// Operation interrupted
    #[error("Operation interrupted: {0}")]
    Interrupted(String),
}

impl Error {
    /// Create a protocol error with a custom message
    pub fn protocol<S: Into<String>>(msg: S) -> Self {
        Error::Protocol(msg.into())
    }

    /// Create a capture error with a custom message
    pub fn capture<S: Into<String>>(msg: S) -> Self {
        Error::Capture(msg.into())
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        Error::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_parameter("max-responses", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'max-responses': must be at least 1"
        );

        let err = Error::InterfaceNotFound("eth9".to_string());
        assert_eq!(err.to_string(), "Interface 'eth9' not found");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
