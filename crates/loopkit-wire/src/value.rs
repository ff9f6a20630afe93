//! Dynamic value codec.
//!
//! Encoding dispatches on the [`ExtraValue`] kind; [`ExtraValue::Other`] is
//! sent as its text rendering and comes back as [`ExtraValue::Text`].
//! Decoding dispatches on whichever wire field is set. A value with no known
//! field set (absent, or a kind added by a newer peer) decodes to `None`, and
//! such entries are dropped from maps and lists.

use crate::codec::{FromWire, ToWire};
use crate::schema;
use bytes::Bytes;
use loopkit_types::primitives::BigInt;
use loopkit_types::value::{ExtraValue, ExtraValueMap};
use loopkit_types::{CapabilityError, CapabilityResult};

/// Deepest nesting of maps and lists accepted from the wire.
pub const MAX_DEPTH: usize = 64;

impl ToWire for ExtraValue {
    type Wire = schema::Value;

    fn to_wire(&self) -> schema::Value {
        let mut wire = schema::Value::default();
        match self {
            ExtraValue::Text(v) => wire.string_value = Some(v.clone()),
            ExtraValue::Int(v) => wire.int64_value = Some(*v),
            ExtraValue::Uint32(v) => wire.uint32_value = Some(*v),
            ExtraValue::Uint(v) => wire.uint64_value = Some(*v),
            ExtraValue::Float(v) => wire.float64_value = Some(*v),
            ExtraValue::Bool(v) => wire.bool_value = Some(*v),
            ExtraValue::Bytes(v) => wire.bytes_value = Some(Bytes::copy_from_slice(v)),
            ExtraValue::BigInt(v) => wire.bigint_value = Some(v.to_wire()),
            ExtraValue::Map(v) => wire.map_value = Some(map_to_wire(v)),
            ExtraValue::List(v) => {
                wire.list_value = Some(schema::List {
                    items: v.iter().map(ToWire::to_wire).collect(),
                })
            }
            ExtraValue::Other(v) => wire.string_value = Some(v.render()),
        }
        wire
    }
}

/// Encode a map of dynamic values.
pub fn map_to_wire(map: &ExtraValueMap) -> schema::Map {
    schema::Map {
        fields: map
            .iter()
            .map(|(k, v)| (k.clone(), v.to_wire()))
            .collect(),
    }
}

/// Decode one dynamic value. `None` means the wire carried no known kind.
pub fn value_from_wire(wire: schema::Value) -> CapabilityResult<Option<ExtraValue>> {
    decode_value(wire, 1)
}

/// Decode a map of dynamic values, dropping entries without a known kind.
pub fn map_from_wire(wire: schema::Map) -> CapabilityResult<ExtraValueMap> {
    decode_map(wire, 1)
}

fn decode_value(wire: schema::Value, depth: usize) -> CapabilityResult<Option<ExtraValue>> {
    let kinds = [
        wire.string_value.is_some(),
        wire.int64_value.is_some(),
        wire.uint32_value.is_some(),
        wire.uint64_value.is_some(),
        wire.float64_value.is_some(),
        wire.bool_value.is_some(),
        wire.bytes_value.is_some(),
        wire.bigint_value.is_some(),
        wire.map_value.is_some(),
        wire.list_value.is_some(),
    ]
    .iter()
    .filter(|set| **set)
    .count();
    if kinds > 1 {
        return Err(CapabilityError::codec(format!(
            "dynamic value has {kinds} kinds set"
        )));
    }

    let value = if let Some(v) = wire.string_value {
        ExtraValue::Text(v)
    } else if let Some(v) = wire.int64_value {
        ExtraValue::Int(v)
    } else if let Some(v) = wire.uint32_value {
        ExtraValue::Uint32(v)
    } else if let Some(v) = wire.uint64_value {
        ExtraValue::Uint(v)
    } else if let Some(v) = wire.float64_value {
        ExtraValue::Float(v)
    } else if let Some(v) = wire.bool_value {
        ExtraValue::Bool(v)
    } else if let Some(v) = wire.bytes_value {
        ExtraValue::Bytes(v.to_vec())
    } else if let Some(v) = wire.bigint_value {
        ExtraValue::BigInt(BigInt::from_wire(v)?)
    } else if let Some(v) = wire.map_value {
        ExtraValue::Map(decode_map(v, depth)?)
    } else if let Some(v) = wire.list_value {
        ExtraValue::List(decode_list(v, depth)?)
    } else {
        return Ok(None);
    };
    Ok(Some(value))
}

fn decode_map(wire: schema::Map, depth: usize) -> CapabilityResult<ExtraValueMap> {
    check_depth(depth)?;
    let mut out = ExtraValueMap::new();
    for (key, value) in wire.fields {
        if let Some(value) = decode_value(value, depth + 1)? {
            out.insert(key, value);
        }
    }
    Ok(out)
}

fn decode_list(wire: schema::List, depth: usize) -> CapabilityResult<Vec<ExtraValue>> {
    check_depth(depth)?;
    let mut out = Vec::with_capacity(wire.items.len());
    for item in wire.items {
        if let Some(value) = decode_value(item, depth + 1)? {
            out.push(value);
        }
    }
    Ok(out)
}

fn check_depth(depth: usize) -> CapabilityResult<()> {
    if depth > MAX_DEPTH {
        return Err(CapabilityError::codec(format!(
            "dynamic value nested deeper than {MAX_DEPTH}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use loopkit_types::ErrorKind;
    use std::net::Ipv4Addr;

    fn roundtrip(value: &ExtraValue) -> Option<ExtraValue> {
        let bytes = rmp_serde::to_vec_named(&value.to_wire()).unwrap();
        value_from_wire(rmp_serde::from_slice(&bytes).unwrap()).unwrap()
    }

    #[test]
    fn test_every_kind_roundtrips() {
        let values = [
            ExtraValue::Text("gasLimit".into()),
            ExtraValue::Int(-42),
            ExtraValue::Uint32(u32::MAX),
            ExtraValue::Uint(u64::MAX),
            ExtraValue::Float(1.5),
            ExtraValue::Bool(true),
            ExtraValue::Bytes(vec![0xde, 0xad]),
            ExtraValue::BigInt(BigInt::from(u128::MAX)),
            ExtraValue::Map(ExtraValueMap::from([("k".to_string(), ExtraValue::Bool(false))])),
            ExtraValue::List(vec![ExtraValue::Int(1), ExtraValue::Text("two".into())]),
        ];
        for value in values {
            assert_eq!(roundtrip(&value), Some(value));
        }
    }

    #[test]
    fn test_widths_stay_distinct() {
        assert_eq!(roundtrip(&ExtraValue::Uint32(7)), Some(ExtraValue::Uint32(7)));
        assert_eq!(roundtrip(&ExtraValue::Uint(7)), Some(ExtraValue::Uint(7)));
    }

    #[test]
    fn test_nested_maps_of_lists_of_maps() {
        let inner = ExtraValueMap::from([
            ("tokenReceiver".to_string(), ExtraValue::Bytes(vec![1; 32])),
            ("computeUnits".to_string(), ExtraValue::Uint32(300_000)),
        ]);
        let outer = ExtraValue::Map(ExtraValueMap::from([(
            "accounts".to_string(),
            ExtraValue::List(vec![ExtraValue::Map(inner.clone()), ExtraValue::Map(inner)]),
        )]));
        assert_eq!(roundtrip(&outer), Some(outer));
    }

    #[test]
    fn test_other_kind_degrades_to_text() {
        let value = ExtraValue::other(Ipv4Addr::new(192, 168, 0, 1));
        let first = roundtrip(&value);
        let second = roundtrip(&value);
        assert_eq!(first, Some(ExtraValue::Text("192.168.0.1".into())));
        assert_eq!(first, second);
    }

    #[test]
    fn test_absent_kind_is_no_value() {
        assert_eq!(value_from_wire(schema::Value::default()).unwrap(), None);

        let mut map = map_to_wire(&ExtraValueMap::from([("a".to_string(), ExtraValue::Int(1))]));
        map.fields.insert("from_newer_peer".to_string(), schema::Value::default());
        let decoded = map_from_wire(map).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.get("a"), Some(&ExtraValue::Int(1)));
    }

    #[test]
    fn test_multiple_kinds_is_codec_error() {
        let wire = schema::Value {
            string_value: Some("x".into()),
            bool_value: Some(true),
            ..Default::default()
        };
        let err = value_from_wire(wire).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Codec);
    }

    #[test]
    fn test_excessive_nesting_is_codec_error() {
        let mut value = ExtraValue::Int(0);
        for _ in 0..MAX_DEPTH {
            value = ExtraValue::List(vec![value]);
        }
        assert!(value_from_wire(value.to_wire()).is_ok());

        let too_deep = ExtraValue::List(vec![value]);
        let err = value_from_wire(too_deep.to_wire()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Codec);
    }
}
