//! Connection: a multiplexed, bidirectional call transport.
//!
//! A [`Connection`] owns one byte stream (TCP, a child process pipe, an
//! in-memory duplex) and runs two tasks over it: a writer draining an
//! outbound frame queue, and a reader dispatching incoming frames. Either
//! side may issue calls and serve calls at the same time; call ids are scoped
//! by direction, so the two id spaces never collide.
//!
//! Inbound requests are routed by endpoint name to the [`Service`] registered
//! under that name. Each handler runs in its own task, so a slow capability
//! never blocks the others sharing the connection.

use crate::frame::*;
use crate::service::Service;

use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use loopkit_types::config::TransportConfig;
use loopkit_types::CallContext;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Buffer size of each direction of an in-memory connection pair.
const DUPLEX_BUFFER: usize = 64 * 1024;

/// Raw outcome of a failed call, before conversion to a capability error.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("connection closed")]
    ConnectionClosed,
    #[error("call cancelled")]
    Cancelled,
    #[error("deadline exceeded")]
    DeadlineExceeded,
    #[error("{0}")]
    Status(Status),
    #[error(transparent)]
    Wire(#[from] WireError),
}

/// A multiplexed connection to one peer.
pub struct Connection {
    id: String,
    max_message_size: u32,
    outbound: mpsc::Sender<Vec<u8>>,
    /// Our calls awaiting a response, by call id.
    pending: DashMap<u64, oneshot::Sender<ResponseFrame>>,
    /// Peer calls being served, by call id.
    inbound: DashMap<u64, CancellationToken>,
    /// Services reachable by the peer, by endpoint name.
    services: DashMap<String, Arc<dyn Service>>,
    next_call_id: AtomicU64,
    closed: CancellationToken,
}

impl Connection {
    /// Start a connection over a reader/writer pair.
    ///
    /// Spawns the reader and writer tasks, so it must be called from within a
    /// tokio runtime. The connection stays open until [`Connection::close`]
    /// is called or the peer goes away.
    pub fn new<R, W>(reader: R, writer: W, config: &TransportConfig) -> Arc<Self>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(config.outbound_queue_depth.max(1));
        let conn = Arc::new(Self {
            id: uuid::Uuid::new_v4().to_string(),
            max_message_size: config.max_message_size,
            outbound: tx,
            pending: DashMap::new(),
            inbound: DashMap::new(),
            services: DashMap::new(),
            next_call_id: AtomicU64::new(1),
            closed: CancellationToken::new(),
        });

        info!(conn = %conn.id, "loopkit: connection opened");

        tokio::spawn(write_loop(writer, rx, conn.closed.clone(), conn.id.clone()));
        let reader_conn = Arc::clone(&conn);
        tokio::spawn(async move {
            reader_conn.read_loop(reader).await;
        });

        conn
    }

    /// Start a connection over an established TCP stream.
    pub fn from_tcp(stream: TcpStream, config: &TransportConfig) -> Arc<Self> {
        let (reader, writer) = stream.into_split();
        Self::new(reader, writer, config)
    }

    /// Two connected in-process peers.
    pub fn duplex_pair(config: &TransportConfig) -> (Arc<Self>, Arc<Self>) {
        let (a, b) = tokio::io::duplex(DUPLEX_BUFFER);
        let (a_read, a_write) = tokio::io::split(a);
        let (b_read, b_write) = tokio::io::split(b);
        (
            Self::new(a_read, a_write, config),
            Self::new(b_read, b_write, config),
        )
    }

    /// Unique id of this connection, used in log lines.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Wait until the connection is closed by either side.
    pub async fn closed(&self) {
        self.closed.cancelled().await
    }

    /// Close the connection. Pending calls fail with `ConnectionClosed` and
    /// in-flight handlers are cancelled.
    ///
    /// Only the owner of the connection should call this; extensions derived
    /// from it have no way to.
    pub fn close(&self) {
        if !self.closed.is_cancelled() {
            info!(conn = %self.id, "loopkit: closing connection");
        }
        self.shutdown_state();
    }

    /// Serve `service` under `endpoint`. Returns false if the name is taken.
    pub fn register_service(&self, endpoint: &str, service: Arc<dyn Service>) -> bool {
        match self.services.entry(endpoint.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(service);
                true
            }
        }
    }

    /// Stop serving `endpoint`. Calls already in flight run to completion.
    /// Returns false if nothing was served under that name.
    pub fn unregister_service(&self, endpoint: &str) -> bool {
        self.services.remove(endpoint).is_some()
    }

    /// Names of every endpoint served on this connection.
    pub fn served_endpoints(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Issue a call and wait for its response.
    ///
    /// Returns when the response arrives, the connection closes, the caller's
    /// cancellation token fires or the caller's deadline passes. On
    /// cancellation or deadline the peer is told to abandon the call.
    pub async fn call(
        &self,
        ctx: &CallContext,
        endpoint: &str,
        method: &str,
        payload: Bytes,
    ) -> Result<Bytes, CallError> {
        if self.is_closed() {
            return Err(CallError::ConnectionClosed);
        }
        if ctx.is_cancelled() {
            return Err(CallError::Cancelled);
        }
        if ctx.remaining() == Some(Duration::ZERO) {
            return Err(CallError::DeadlineExceeded);
        }

        let call_id = self.next_call_id.fetch_add(1, Ordering::Relaxed);
        let frame = Frame {
            call_id,
            endpoint: endpoint.to_string(),
            kind: FrameKind::Request(RequestFrame {
                method: method.to_string(),
                metadata: ctx.metadata().clone(),
                timeout_ms: ctx
                    .remaining()
                    .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
                payload,
            }),
        };
        let bytes = encode_frame(&frame, self.max_message_size)?;

        let (tx, rx) = oneshot::channel();
        self.pending.insert(call_id, tx);
        // close() may have drained the table between the check above and the insert.
        if self.is_closed() {
            self.pending.remove(&call_id);
            return Err(CallError::ConnectionClosed);
        }

        debug!(conn = %self.id, call_id, endpoint, method, "loopkit: call");

        let sent = tokio::select! {
            biased;
            _ = ctx.cancellation().cancelled() => Err(CallError::Cancelled),
            _ = sleep_until(ctx.deadline()) => Err(CallError::DeadlineExceeded),
            res = self.outbound.send(bytes) => res.map_err(|_| CallError::ConnectionClosed),
        };
        if let Err(e) = sent {
            // Nothing reached the peer, so there is nothing to cancel there.
            self.pending.remove(&call_id);
            return Err(e);
        }

        let outcome = tokio::select! {
            biased;
            _ = ctx.cancellation().cancelled() => Err(CallError::Cancelled),
            _ = sleep_until(ctx.deadline()) => Err(CallError::DeadlineExceeded),
            res = rx => res.map_err(|_| CallError::ConnectionClosed),
            _ = self.closed.cancelled() => Err(CallError::ConnectionClosed),
        };

        match outcome {
            Ok(ResponseFrame {
                status: Some(status),
                ..
            }) => Err(CallError::Status(status)),
            Ok(ResponseFrame { payload, .. }) => Ok(payload),
            Err(e) => {
                self.pending.remove(&call_id);
                if matches!(e, CallError::Cancelled | CallError::DeadlineExceeded) {
                    debug!(conn = %self.id, call_id, endpoint, reason = %e, "loopkit: abandoning call");
                    self.send_cancel(call_id, endpoint);
                }
                Err(e)
            }
        }
    }

    /// Tell the peer to stop working on one of our calls.
    fn send_cancel(&self, call_id: u64, endpoint: &str) {
        let frame = Frame {
            call_id,
            endpoint: endpoint.to_string(),
            kind: FrameKind::Cancel,
        };
        let bytes = match encode_frame(&frame, self.max_message_size) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(conn = %self.id, call_id, error = %e, "loopkit: cancel frame encode failed");
                return;
            }
        };
        // Queued from its own task so a full outbound queue delays the frame
        // instead of dropping it.
        let outbound = self.outbound.clone();
        let conn_id = self.id.clone();
        tokio::spawn(async move {
            if outbound.send(bytes).await.is_err() {
                debug!(conn = %conn_id, call_id, "loopkit: connection closed before cancel was sent");
            }
        });
    }

    /// Reader task: dispatch frames until the stream ends or we are closed.
    async fn read_loop<R>(self: Arc<Self>, mut reader: R)
    where
        R: AsyncRead + Unpin,
    {
        loop {
            let frame = tokio::select! {
                _ = self.closed.cancelled() => break,
                res = read_frame(&mut reader, self.max_message_size) => match res {
                    Ok(frame) => frame,
                    Err(WireError::ConnectionClosed) => {
                        debug!(conn = %self.id, "loopkit: peer closed the connection");
                        break;
                    }
                    Err(e) => {
                        warn!(conn = %self.id, error = %e, "loopkit: unreadable frame, closing connection");
                        break;
                    }
                },
            };
            self.dispatch(frame);
        }
        self.shutdown_state();
    }

    fn dispatch(self: &Arc<Self>, frame: Frame) {
        match frame.kind {
            FrameKind::Request(request) => {
                self.spawn_handler(frame.call_id, frame.endpoint, request);
            }
            FrameKind::Response(response) => match self.pending.remove(&frame.call_id) {
                Some((_, tx)) => {
                    let _ = tx.send(response);
                }
                None => debug!(
                    conn = %self.id,
                    call_id = frame.call_id,
                    "loopkit: response for a call no longer pending"
                ),
            },
            FrameKind::Cancel => {
                if let Some((_, token)) = self.inbound.remove(&frame.call_id) {
                    debug!(conn = %self.id, call_id = frame.call_id, "loopkit: peer cancelled call");
                    token.cancel();
                }
            }
        }
    }

    /// Serve one inbound request in its own task.
    fn spawn_handler(self: &Arc<Self>, call_id: u64, endpoint: String, request: RequestFrame) {
        let token = self.closed.child_token();
        self.inbound.insert(call_id, token.clone());
        let conn = Arc::clone(self);

        tokio::spawn(async move {
            let mut ctx = CallContext::new()
                .with_cancellation(token.clone())
                .with_metadata_map(request.metadata);
            if let Some(ms) = request.timeout_ms {
                ctx = ctx.with_timeout(Duration::from_millis(ms));
            }

            let service = conn.services.get(&endpoint).map(|s| Arc::clone(s.value()));
            let outcome = match service {
                None => {
                    debug!(conn = %conn.id, endpoint = %endpoint, "loopkit: call for unserved endpoint");
                    Err(Status::unimplemented(format!(
                        "no capability served as \"{endpoint}\""
                    )))
                }
                Some(service) => {
                    tokio::select! {
                        _ = token.cancelled() => {
                            conn.inbound.remove(&call_id);
                            return;
                        }
                        res = service.call(&ctx, &request.method, request.payload) => res,
                    }
                }
            };

            conn.inbound.remove(&call_id);
            conn.respond(call_id, endpoint, outcome).await;
        });
    }

    async fn respond(&self, call_id: u64, endpoint: String, outcome: Result<Bytes, Status>) {
        let response = match outcome {
            Ok(payload) => ResponseFrame {
                payload,
                status: None,
            },
            Err(status) => ResponseFrame {
                payload: Bytes::new(),
                status: Some(status),
            },
        };
        let mut frame = Frame {
            call_id,
            endpoint,
            kind: FrameKind::Response(response),
        };
        let bytes = match encode_frame(&frame, self.max_message_size) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(conn = %self.id, call_id, error = %e, "loopkit: response not sendable");
                frame.kind = FrameKind::Response(ResponseFrame {
                    payload: Bytes::new(),
                    status: Some(Status::internal(format!("response not sendable: {e}"))),
                });
                match encode_frame(&frame, self.max_message_size) {
                    Ok(bytes) => bytes,
                    Err(_) => return,
                }
            }
        };
        if self.outbound.send(bytes).await.is_err() {
            debug!(conn = %self.id, call_id, "loopkit: connection closed before response was sent");
        }
    }

    /// Mark closed, fail pending calls and cancel in-flight handlers.
    fn shutdown_state(&self) {
        self.closed.cancel();
        // Dropping the senders wakes every waiting caller with ConnectionClosed.
        self.pending.clear();
        for entry in self.inbound.iter() {
            entry.value().cancel();
        }
        self.inbound.clear();
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .field("pending", &self.pending.len())
            .finish()
    }
}

/// Sleep until `deadline`, or forever when there is none.
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Writer task: drain the outbound queue into the stream.
async fn write_loop<W>(
    mut writer: W,
    mut rx: mpsc::Receiver<Vec<u8>>,
    closed: CancellationToken,
    conn_id: String,
) where
    W: AsyncWrite + Unpin,
{
    loop {
        let bytes = tokio::select! {
            _ = closed.cancelled() => break,
            next = rx.recv() => match next {
                Some(bytes) => bytes,
                None => break,
            },
        };
        let written = async {
            writer.write_all(&bytes).await?;
            writer.flush().await
        }
        .await;
        if let Err(e) = written {
            debug!(conn = %conn_id, error = %e, "loopkit: write failed, closing connection");
            closed.cancel();
            break;
        }
    }
    let _ = writer.shutdown().await;
}

/// Write a framed message (4-byte length + MessagePack) to a stream.
pub async fn write_frame<W>(writer: &mut W, frame: &Frame, max_size: u32) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
{
    let bytes = encode_frame(frame, max_size)?;
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}

/// Read a framed message (4-byte length + MessagePack) from a stream.
pub async fn read_frame<R>(reader: &mut R, max_size: u32) -> Result<Frame, WireError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; 4];
    match reader.read_exact(&mut header).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(WireError::ConnectionClosed);
        }
        Err(e) => return Err(WireError::Io(e)),
    }

    let len = decode_length(&header);
    if len > max_size {
        return Err(WireError::MessageTooLarge {
            size: len as usize,
            max: max_size,
        });
    }

    let mut body = vec![0u8; len as usize];
    reader.read_exact(&mut body).await?;

    decode_frame(&body)
}
