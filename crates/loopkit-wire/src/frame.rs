//! Wire protocol frame types.
//!
//! Every frame on a loopkit connection is a MessagePack document prefixed
//! with a 4-byte big-endian length header. Frames use named-field encoding,
//! so fields can be added without breaking deployed peers; absent fields
//! decode to their defaults and unknown fields are ignored.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors from the framing layer.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("Decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("Connection closed")]
    ConnectionClosed,
    #[error("Message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: u32 },
}

/// A frame on the connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Call identifier, scoped to the direction of the call.
    pub call_id: u64,
    /// Name of the capability endpoint the call addresses.
    #[serde(default)]
    pub endpoint: String,
    /// Frame variant.
    pub kind: FrameKind,
}

/// The different kinds of frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FrameKind {
    /// A call from the peer.
    Request(RequestFrame),
    /// The answer to one of our calls.
    Response(ResponseFrame),
    /// The peer abandoned a call it issued earlier.
    Cancel,
}

/// Request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestFrame {
    /// Operation name within the endpoint's contract.
    pub method: String,
    /// Per-call metadata supplied by the caller.
    pub metadata: BTreeMap<String, String>,
    /// Time the caller is still willing to wait, in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Encoded request message.
    pub payload: Bytes,
}

/// Response body. `status` is absent on success.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseFrame {
    /// Encoded response message.
    pub payload: Bytes,
    /// Failure reported by the serving side.
    pub status: Option<Status>,
}

/// Numeric status codes carried in [`Status`].
///
/// The numbering follows gRPC so that peers written against other RPC
/// stacks interpret the codes the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    FailedPrecondition,
    Unimplemented,
    Internal,
    Unavailable,
}

impl StatusCode {
    pub fn as_u32(self) -> u32 {
        match self {
            Self::Cancelled => 1,
            Self::Unknown => 2,
            Self::InvalidArgument => 3,
            Self::DeadlineExceeded => 4,
            Self::NotFound => 5,
            Self::FailedPrecondition => 9,
            Self::Unimplemented => 12,
            Self::Internal => 13,
            Self::Unavailable => 14,
        }
    }

    /// Unrecognised codes map to [`StatusCode::Unknown`].
    pub fn from_u32(code: u32) -> Self {
        match code {
            1 => Self::Cancelled,
            3 => Self::InvalidArgument,
            4 => Self::DeadlineExceeded,
            5 => Self::NotFound,
            9 => Self::FailedPrecondition,
            12 => Self::Unimplemented,
            13 => Self::Internal,
            14 => Self::Unavailable,
            _ => Self::Unknown,
        }
    }
}

/// A failure reported by the serving side of a call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Status {
    pub code: u32,
    pub message: String,
}

impl Status {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: code.as_u32(),
            message: message.into(),
        }
    }

    pub fn unimplemented(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Unimplemented, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(StatusCode::InvalidArgument, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Internal, message)
    }

    pub fn code(&self) -> StatusCode {
        StatusCode::from_u32(self.code)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status {}: {}", self.code, self.message)
    }
}

/// Encode a frame to bytes (4-byte big-endian length + MessagePack).
pub fn encode_frame(frame: &Frame, max_size: u32) -> Result<Vec<u8>, WireError> {
    let body = rmp_serde::to_vec_named(frame)?;
    let len = u32::try_from(body.len())
        .ok()
        .filter(|len| *len <= max_size)
        .ok_or(WireError::MessageTooLarge {
            size: body.len(),
            max: max_size,
        })?;
    let mut bytes = Vec::with_capacity(4 + body.len());
    bytes.extend_from_slice(&len.to_be_bytes());
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Decode the length prefix from a 4-byte header.
pub fn decode_length(header: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*header)
}

/// Parse a MessagePack body into a Frame.
pub fn decode_frame(body: &[u8]) -> Result<Frame, WireError> {
    Ok(rmp_serde::from_slice(body)?)
}
