//! Primitive domain values shared by every capability contract.

use std::fmt;

/// A fixed-width 32-byte value: hashes, digests, merkle roots, signature halves.
///
/// Equality is byte-wise. The all-zero value is considered empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bytes32(pub [u8; 32]);

impl Bytes32 {
    /// Width in bytes.
    pub const LEN: usize = 32;

    /// The all-zero value.
    pub const ZERO: Bytes32 = Bytes32([0u8; 32]);

    /// Build from a slice, zero-padding on the right when the slice is short
    /// and keeping the first 32 bytes when it is long.
    pub fn from_slice_padded(bytes: &[u8]) -> Self {
        let mut out = [0u8; 32];
        let n = bytes.len().min(Self::LEN);
        out[..n].copy_from_slice(&bytes[..n]);
        Self(out)
    }

    /// Returns true if every byte is zero.
    pub fn is_empty(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for Bytes32 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// A chain address whose encoding depends on the chain family.
///
/// No padding is ever applied. The empty address is a valid value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnknownAddress(pub Vec<u8>);

impl UnknownAddress {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for UnknownAddress {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for UnknownAddress {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Display for UnknownAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

/// An address already rendered in its chain-native text form.
pub type UnknownEncodedAddress = String;

/// Identifies a chain across the network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainSelector(pub u64);

impl From<u64> for ChainSelector {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl fmt::Display for ChainSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message sequence number on a lane.
pub type SeqNum = u64;

/// An inclusive `[start, end]` range of sequence numbers.
///
/// `start > end` is representable and denotes an empty range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SeqNumRange {
    start: SeqNum,
    end: SeqNum,
}

impl SeqNumRange {
    pub fn new(start: SeqNum, end: SeqNum) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> SeqNum {
        self.start
    }

    pub fn end(&self) -> SeqNum {
        self.end
    }

    /// Returns true when the range holds no sequence numbers.
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Number of sequence numbers in the range.
    pub fn len(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            (self.end - self.start).saturating_add(1)
        }
    }

    pub fn contains(&self, seq_num: SeqNum) -> bool {
        self.start <= seq_num && seq_num <= self.end
    }
}

impl fmt::Display for SeqNumRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} -> {}]", self.start, self.end)
    }
}

/// An arbitrary-precision integer that may be unset.
///
/// The unset value is distinct from zero and survives the wire as such.
/// Only the magnitude is carried on the wire: a negative value comes back
/// positive after a round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BigInt(Option<num_bigint::BigInt>);

impl BigInt {
    /// The unset value.
    pub fn unset() -> Self {
        Self(None)
    }

    pub fn new(value: impl Into<num_bigint::BigInt>) -> Self {
        Self(Some(value.into()))
    }

    pub fn is_unset(&self) -> bool {
        self.0.is_none()
    }

    /// The numeric value, or `None` when unset.
    pub fn value(&self) -> Option<&num_bigint::BigInt> {
        self.0.as_ref()
    }
}

impl From<num_bigint::BigInt> for BigInt {
    fn from(v: num_bigint::BigInt) -> Self {
        Self(Some(v))
    }
}

impl From<u64> for BigInt {
    fn from(v: u64) -> Self {
        Self::new(v)
    }
}

impl From<i64> for BigInt {
    fn from(v: i64) -> Self {
        Self::new(v)
    }
}

impl From<u128> for BigInt {
    fn from(v: u128) -> Self {
        Self::new(v)
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(v) => write!(f, "{v}"),
            None => f.write_str("<unset>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes32_padding() {
        let short = Bytes32::from_slice_padded(&[1, 2, 3]);
        assert_eq!(&short.0[..3], &[1, 2, 3]);
        assert!(short.0[3..].iter().all(|b| *b == 0));

        let long = Bytes32::from_slice_padded(&[7u8; 40]);
        assert_eq!(long, Bytes32([7u8; 32]));
    }

    #[test]
    fn test_bytes32_empty() {
        assert!(Bytes32::default().is_empty());
        assert!(Bytes32::ZERO.is_empty());
        let mut raw = [0u8; 32];
        raw[31] = 1;
        assert!(!Bytes32(raw).is_empty());
    }

    #[test]
    fn test_seq_num_range() {
        let r = SeqNumRange::new(5, 9);
        assert_eq!(r.len(), 5);
        assert!(r.contains(5) && r.contains(9));
        assert!(!r.contains(10));

        let inverted = SeqNumRange::new(9, 5);
        assert!(inverted.is_empty());
        assert_eq!(inverted.len(), 0);
        assert_eq!(inverted.to_string(), "[9 -> 5]");
    }

    #[test]
    fn test_bigint_unset_vs_zero() {
        assert!(BigInt::default().is_unset());
        assert_ne!(BigInt::unset(), BigInt::from(0u64));
        assert_eq!(BigInt::unset().to_string(), "<unset>");
        assert_eq!(BigInt::from(-42i64).to_string(), "-42");
    }
}
