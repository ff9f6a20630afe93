//! Schema-less dynamic values.
//!
//! [`ExtraValue`] carries key/value data whose shape cannot be declared up
//! front, such as decoded extra-argument blobs. It is a closed set of kinds
//! plus an [`ExtraValue::Other`] arm: anything outside the set is kept as an
//! opaque [`Display`](fmt::Display) value and travels as its text rendering.

use crate::primitives::BigInt;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Ordered map of dynamic values.
pub type ExtraValueMap = BTreeMap<String, ExtraValue>;

/// A recursive, schema-less value.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtraValue {
    Text(String),
    Int(i64),
    Uint32(u32),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Bytes(Vec<u8>),
    BigInt(BigInt),
    Map(ExtraValueMap),
    List(Vec<ExtraValue>),
    /// Any other kind. Rendered to text when sent over the wire.
    Other(Opaque),
}

impl ExtraValue {
    /// Wrap a value of a kind outside the supported set.
    pub fn other(value: impl fmt::Display + Send + Sync + 'static) -> Self {
        Self::Other(Opaque::new(value))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ExtraValueMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ExtraValue]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Unsigned view of any integer kind that fits in a `u64`.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Uint(v) => Some(*v),
            Self::Uint32(v) => Some(u64::from(*v)),
            Self::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl From<String> for ExtraValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for ExtraValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<i64> for ExtraValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for ExtraValue {
    fn from(v: u32) -> Self {
        Self::Uint32(v)
    }
}

impl From<u64> for ExtraValue {
    fn from(v: u64) -> Self {
        Self::Uint(v)
    }
}

impl From<f64> for ExtraValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for ExtraValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Vec<u8>> for ExtraValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<BigInt> for ExtraValue {
    fn from(v: BigInt) -> Self {
        Self::BigInt(v)
    }
}

impl From<ExtraValueMap> for ExtraValue {
    fn from(v: ExtraValueMap) -> Self {
        Self::Map(v)
    }
}

impl From<Vec<ExtraValue>> for ExtraValue {
    fn from(v: Vec<ExtraValue>) -> Self {
        Self::List(v)
    }
}

/// A value of a kind the wire format has no variant for.
///
/// Two opaque values compare equal when their renderings are equal.
#[derive(Clone)]
pub struct Opaque(Arc<dyn fmt::Display + Send + Sync>);

impl Opaque {
    pub fn new(value: impl fmt::Display + Send + Sync + 'static) -> Self {
        Self(Arc::new(value))
    }

    /// Text rendering used on the wire.
    pub fn render(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({})", self.0)
    }
}

impl fmt::Display for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        self.render() == other.render()
    }
}
