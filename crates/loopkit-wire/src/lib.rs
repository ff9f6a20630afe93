//! loopkit wire protocol: capabilities across a process boundary.
//!
//! Lets a host treat capabilities implemented by an out-of-process plugin
//! (and vice versa) as local values. Many named sub-capabilities share one
//! connection; each call is a MessagePack-encoded request/response pair.
//!
//! ## Architecture
//!
//! - **Connection**: multiplexed, length-framed transport over any byte stream
//! - **Broker**: derives named [`Extension`]s from a connection and serves
//!   capabilities under names
//! - **codec / value**: domain records and dynamic values to and from wire form
//! - **stubs**: client and server halves of each capability contract
//! - **CcipProviderClient**: composite capability built from named extensions

pub mod broker;
pub mod codec;
pub mod config;
pub mod conn;
pub mod frame;
pub mod logging;
pub mod provider;
pub mod resync;
pub mod schema;
pub mod service;
pub mod stubs;
pub mod value;

pub use broker::{Broker, Extension};
pub use codec::{FromWire, ToWire};
pub use conn::{CallError, Connection};
pub use frame::{Frame, FrameKind, Status, StatusCode, WireError};
pub use provider::{serve_ccip_provider, serve_ccip_provider_with_namespace, CcipProviderClient};
pub use resync::SyncCache;
pub use service::Service;
