//! Broker: derives named extensions from one shared connection.
//!
//! A [`Broker`] is constructed once per connection and passed to whatever
//! needs to reach the peer. Client halves ask it for an [`Extension`] under a
//! sub-capability name; server halves ask it to serve a [`Service`] under a
//! name. The name is the lookup key on the wire, so both sides must agree on
//! it exactly (case-sensitive).

use crate::conn::{CallError, Connection};
use crate::service::Service;
use bytes::Bytes;
use loopkit_types::{CallContext, CapabilityError, CapabilityResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Hands out named extensions of one parent connection.
///
/// Cheap to clone; clones share the same name table.
#[derive(Clone)]
pub struct Broker {
    conn: Arc<Connection>,
    extensions: Arc<RwLock<HashMap<String, Extension>>>,
}

impl Broker {
    pub fn new(conn: Arc<Connection>) -> Self {
        Self {
            conn,
            extensions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// The parent connection.
    pub fn connection(&self) -> &Arc<Connection> {
        &self.conn
    }

    /// Derive the extension addressing `name` on the peer.
    ///
    /// Idempotent for the lifetime of the connection: every call with the
    /// same name returns a handle to the same remote endpoint. Fails at once
    /// with [`CapabilityError::ConnectionClosed`] once the connection is
    /// closed. No remote call is made.
    pub fn extend(&self, name: &str) -> CapabilityResult<Extension> {
        if self.conn.is_closed() {
            // Extensions die with the connection.
            let mut extensions = self.extensions.write().unwrap_or_else(|e| e.into_inner());
            extensions.clear();
            return Err(CapabilityError::ConnectionClosed);
        }

        {
            let extensions = self.extensions.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ext) = extensions.get(name) {
                return Ok(ext.clone());
            }
        }

        let mut extensions = self.extensions.write().unwrap_or_else(|e| e.into_inner());
        let ext = extensions
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!(conn = %self.conn.id(), extension = name, "loopkit: extension derived");
                Extension {
                    name: Arc::from(name),
                    conn: Arc::clone(&self.conn),
                }
            })
            .clone();
        Ok(ext)
    }

    /// Serve `service` to the peer under `name`.
    pub fn serve(&self, name: &str, service: Arc<dyn Service>) -> CapabilityResult<()> {
        if self.conn.is_closed() {
            return Err(CapabilityError::ConnectionClosed);
        }
        if !self.conn.register_service(name, service) {
            return Err(CapabilityError::AlreadyRegistered(name.to_string()));
        }
        info!(conn = %self.conn.id(), endpoint = name, "loopkit: serving capability");
        Ok(())
    }

    /// Stop serving `name`. Returns false if nothing was served under it.
    pub fn unserve(&self, name: &str) -> bool {
        let removed = self.conn.unregister_service(name);
        if removed {
            info!(conn = %self.conn.id(), endpoint = name, "loopkit: stopped serving capability");
        }
        removed
    }

    /// Names of the extensions derived so far, sorted.
    pub fn extension_names(&self) -> Vec<String> {
        let extensions = self.extensions.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = extensions.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for Broker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broker")
            .field("conn", &self.conn.id())
            .field("extensions", &self.extension_names())
            .finish()
    }
}

/// A named handle onto one remote endpoint of a shared connection.
///
/// Holds no resources of its own and cannot close the connection.
#[derive(Clone)]
pub struct Extension {
    name: Arc<str>,
    conn: Arc<Connection>,
}

impl Extension {
    /// The endpoint name this extension addresses.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Call `method` on the remote endpoint.
    pub async fn call(
        &self,
        ctx: &CallContext,
        method: &str,
        payload: Bytes,
    ) -> Result<Bytes, CallError> {
        self.conn.call(ctx, &self.name, method, payload).await
    }

    /// Returns true if both handles address the same endpoint on the same
    /// connection.
    pub fn same_endpoint(&self, other: &Extension) -> bool {
        Arc::ptr_eq(&self.conn, &other.conn) && self.name == other.name
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension")
            .field("name", &self.name)
            .field("conn", &self.conn.id())
            .finish()
    }
}
