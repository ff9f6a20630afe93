//! Shared error types for capability calls.
//!
//! Every failure a capability call can produce falls into one of the kinds in
//! [`ErrorKind`]. Clients of a composite capability see errors wrapped in
//! [`CapabilityError::Capability`], which names the sub-capability that failed.

use thiserror::Error;

/// Application-level error code reported by a remote implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The operation was cancelled on the remote side.
    Cancelled,
    /// Unclassified failure.
    Unknown,
    /// The request was well-formed but an argument is invalid.
    InvalidArgument,
    /// The remote deadline expired before the operation finished.
    DeadlineExceeded,
    /// The requested entity does not exist.
    NotFound,
    /// The system is not in a state required for the operation.
    FailedPrecondition,
    /// An internal invariant was broken on the remote side.
    Internal,
    /// The remote dependency is temporarily unavailable.
    Unavailable,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
            Self::InvalidArgument => "invalid argument",
            Self::DeadlineExceeded => "deadline exceeded",
            Self::NotFound => "not found",
            Self::FailedPrecondition => "failed precondition",
            Self::Internal => "internal",
            Self::Unavailable => "unavailable",
        };
        f.write_str(s)
    }
}

/// Broad classification of a [`CapabilityError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection lost, cancelled or timed out. Never retried by loopkit.
    Transport,
    /// The remote implementation returned a domain-level failure.
    Remote,
    /// The remote side does not support the operation.
    Unimplemented,
    /// A value could not be converted to or from its wire form.
    Codec,
    /// An endpoint name could not be registered.
    Registration,
}

/// Error returned by every capability operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CapabilityError {
    /// The underlying connection is closed.
    #[error("connection closed")]
    ConnectionClosed,

    /// The caller cancelled the call.
    #[error("call cancelled")]
    Cancelled,

    /// The caller's deadline passed before a response arrived.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Framing, IO or encoding failure in the transport.
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote implementation failed.
    #[error("remote error ({code}): {message}")]
    Remote {
        /// Code reported by the remote side.
        code: ErrorCode,
        /// Message reported by the remote side.
        message: String,
    },

    /// The operation is not implemented by the remote side.
    #[error("unimplemented: {0}")]
    Unimplemented(String),

    /// A value could not be converted to or from the wire.
    #[error("codec error: {0}")]
    Codec(String),

    /// An endpoint with this name is already being served.
    #[error("endpoint already registered: {0}")]
    AlreadyRegistered(String),

    /// A failure inside the named sub-capability.
    #[error("{name}: {source}")]
    Capability {
        /// Name of the sub-capability that failed.
        name: String,
        /// The underlying failure.
        source: Box<CapabilityError>,
    },
}

impl CapabilityError {
    /// Shorthand for a remote failure with the given code.
    pub fn remote(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Remote {
            code,
            message: message.into(),
        }
    }

    /// Shorthand for an unimplemented operation.
    pub fn unimplemented(operation: impl Into<String>) -> Self {
        Self::Unimplemented(operation.into())
    }

    /// Shorthand for a conversion failure.
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec(message.into())
    }

    /// Attribute this error to a named sub-capability.
    ///
    /// Errors that already name a sub-capability are returned unchanged.
    pub fn in_capability(self, name: &str) -> Self {
        match self {
            Self::Capability { .. } => self,
            other => Self::Capability {
                name: name.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, looking through sub-capability attribution.
    pub fn root(&self) -> &CapabilityError {
        match self {
            Self::Capability { source, .. } => source.root(),
            other => other,
        }
    }

    /// Name of the sub-capability this error is attributed to, if any.
    pub fn capability_name(&self) -> Option<&str> {
        match self {
            Self::Capability { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Capability { source, .. } => source.kind(),
            Self::ConnectionClosed
            | Self::Cancelled
            | Self::DeadlineExceeded
            | Self::Transport(_) => ErrorKind::Transport,
            Self::Remote { .. } => ErrorKind::Remote,
            Self::Unimplemented(_) => ErrorKind::Unimplemented,
            Self::Codec(_) => ErrorKind::Codec,
            Self::AlreadyRegistered(_) => ErrorKind::Registration,
        }
    }

    /// Returns true when the remote side does not support the operation.
    pub fn is_unimplemented(&self) -> bool {
        self.kind() == ErrorKind::Unimplemented
    }
}

/// Alias for Result with CapabilityError.
pub type CapabilityResult<T> = Result<T, CapabilityError>;
