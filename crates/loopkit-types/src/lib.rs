//! Core types and capability contracts for loopkit.
//!
//! This crate defines the domain records exchanged between an oracle host and
//! its out-of-process plugins, the capability traits both sides implement, and
//! the shared error and context types. It contains no transport logic; the
//! `loopkit-wire` crate carries these values across a connection.

pub mod capability;
pub mod ccip;
pub mod config;
pub mod context;
pub mod error;
pub mod primitives;
pub mod value;

pub use context::CallContext;
pub use error::{CapabilityError, CapabilityResult, ErrorCode, ErrorKind};
