//! Plumbing shared by every capability stub pair.
//!
//! The server half of a stub implements [`Service`]: it receives the method
//! name and encoded request, calls the real implementation and returns the
//! encoded response or a [`Status`]. The client half goes through
//! [`invoke`], which encodes the request, issues the call on a named
//! [`Extension`] and converts the outcome back into domain terms.

use crate::broker::Extension;
use crate::conn::CallError;
use crate::frame::{Status, StatusCode};
use async_trait::async_trait;
use bytes::Bytes;
use loopkit_types::{CallContext, CapabilityError, CapabilityResult, ErrorCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Server half of a capability contract, registered under an endpoint name.
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// Handle one call. Unknown methods must answer with
    /// [`StatusCode::Unimplemented`].
    async fn call(&self, ctx: &CallContext, method: &str, payload: Bytes)
        -> Result<Bytes, Status>;
}

/// Decode a request message; malformed input is the caller's fault.
pub fn decode_request<T: DeserializeOwned>(payload: &[u8]) -> Result<T, Status> {
    rmp_serde::from_slice(payload)
        .map_err(|e| Status::invalid_argument(format!("malformed request: {e}")))
}

/// Encode a response message.
pub fn encode_response<T: Serialize>(message: &T) -> Result<Bytes, Status> {
    rmp_serde::to_vec_named(message)
        .map(Bytes::from)
        .map_err(|e| Status::internal(format!("response encode failed: {e}")))
}

/// Translate a domain error into the status sent to the caller.
///
/// Remote codes pass through unchanged and unimplemented stays unimplemented,
/// so the caller can tell "not supported" from "failed".
pub fn status_from_error(err: CapabilityError) -> Status {
    match err {
        CapabilityError::Remote { code, message } => Status::new(status_code(code), message),
        CapabilityError::Unimplemented(op) => Status::unimplemented(op),
        CapabilityError::Cancelled => Status::new(StatusCode::Cancelled, "call cancelled"),
        CapabilityError::DeadlineExceeded => {
            Status::new(StatusCode::DeadlineExceeded, "deadline exceeded")
        }
        CapabilityError::ConnectionClosed | CapabilityError::Transport(_) => {
            Status::new(StatusCode::Unavailable, err.to_string())
        }
        CapabilityError::Codec(msg) => Status::internal(format!("codec error: {msg}")),
        CapabilityError::AlreadyRegistered(_) => Status::internal(err.to_string()),
        CapabilityError::Capability { name, source } => {
            let inner = status_from_error(*source);
            Status {
                code: inner.code,
                message: format!("{name}: {}", inner.message),
            }
        }
    }
}

/// Translate a status received from the serving side into a domain error.
pub fn error_from_status(status: Status) -> CapabilityError {
    let code = match status.code() {
        StatusCode::Unimplemented => return CapabilityError::Unimplemented(status.message),
        StatusCode::Cancelled => ErrorCode::Cancelled,
        StatusCode::Unknown => ErrorCode::Unknown,
        StatusCode::InvalidArgument => ErrorCode::InvalidArgument,
        StatusCode::DeadlineExceeded => ErrorCode::DeadlineExceeded,
        StatusCode::NotFound => ErrorCode::NotFound,
        StatusCode::FailedPrecondition => ErrorCode::FailedPrecondition,
        StatusCode::Internal => ErrorCode::Internal,
        StatusCode::Unavailable => ErrorCode::Unavailable,
    };
    CapabilityError::Remote {
        code,
        message: status.message,
    }
}

fn status_code(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Cancelled => StatusCode::Cancelled,
        ErrorCode::Unknown => StatusCode::Unknown,
        ErrorCode::InvalidArgument => StatusCode::InvalidArgument,
        ErrorCode::DeadlineExceeded => StatusCode::DeadlineExceeded,
        ErrorCode::NotFound => StatusCode::NotFound,
        ErrorCode::FailedPrecondition => StatusCode::FailedPrecondition,
        ErrorCode::Internal => StatusCode::Internal,
        ErrorCode::Unavailable => StatusCode::Unavailable,
    }
}

impl From<CallError> for CapabilityError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::ConnectionClosed => CapabilityError::ConnectionClosed,
            CallError::Cancelled => CapabilityError::Cancelled,
            CallError::DeadlineExceeded => CapabilityError::DeadlineExceeded,
            CallError::Status(status) => error_from_status(status),
            CallError::Wire(e) => CapabilityError::Transport(e.to_string()),
        }
    }
}

/// Client half of one operation: encode `request`, call `method` on the
/// extension, decode the response and convert it with `convert`.
///
/// Every failure, including conversion failures, is attributed to the
/// extension's name. No retries happen here.
pub async fn invoke<Req, Resp, T, F>(
    ext: &Extension,
    ctx: &CallContext,
    method: &str,
    request: &Req,
    convert: F,
) -> CapabilityResult<T>
where
    Req: Serialize + Sync,
    Resp: DeserializeOwned,
    F: FnOnce(Resp) -> CapabilityResult<T>,
{
    call_and_convert(ext, ctx, method, request, convert)
        .await
        .map_err(|e| e.in_capability(ext.name()))
}

async fn call_and_convert<Req, Resp, T, F>(
    ext: &Extension,
    ctx: &CallContext,
    method: &str,
    request: &Req,
    convert: F,
) -> CapabilityResult<T>
where
    Req: Serialize + Sync,
    Resp: DeserializeOwned,
    F: FnOnce(Resp) -> CapabilityResult<T>,
{
    let payload = rmp_serde::to_vec_named(request)
        .map_err(|e| CapabilityError::codec(format!("request encode failed: {e}")))?;
    let bytes = ext.call(ctx, method, Bytes::from(payload)).await?;
    let response: Resp = rmp_serde::from_slice(&bytes)
        .map_err(|e| CapabilityError::codec(format!("malformed {method} response: {e}")))?;
    convert(response)
}

/// Server half of one operation's result: encode the response or translate
/// the domain error.
pub fn reply<T: Serialize>(result: CapabilityResult<T>) -> Result<Bytes, Status> {
    match result {
        Ok(message) => encode_response(&message),
        Err(e) => Err(status_from_error(e)),
    }
}
