//! Wire codec: domain records to and from their wire form.
//!
//! [`ToWire`] never fails. [`FromWire`] fails only where a wire value cannot
//! be represented in the domain (an out-of-range narrow integer, a timestamp
//! outside chrono's range); everything else is shape-only:
//!
//! - fixed-width hashes are zero-padded on the right when short and keep the
//!   first 32 bytes when long;
//! - an unset [`BigInt`] travels as an explicit empty payload and comes back
//!   unset, distinct from zero, which travels as `[0x00]`;
//! - only the magnitude of a [`BigInt`] is carried, so a negative value comes
//!   back positive;
//! - an absent byte payload decodes as empty;
//! - the per-message token data of an execute report is kept aligned with
//!   its messages (see [`ExecutePluginReportSingleChain`]).

use crate::schema;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use loopkit_types::ccip::*;
use loopkit_types::primitives::{BigInt, Bytes32, ChainSelector, SeqNumRange, UnknownAddress};
use loopkit_types::{CapabilityError, CapabilityResult};
use num_bigint::BigUint;

/// Conversion of a domain value into its wire form.
pub trait ToWire {
    type Wire;

    fn to_wire(&self) -> Self::Wire;
}

/// Conversion of a wire value back into the domain.
pub trait FromWire: Sized {
    type Wire;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self>;
}

impl<T: ToWire> ToWire for Vec<T> {
    type Wire = Vec<T::Wire>;

    fn to_wire(&self) -> Self::Wire {
        self.iter().map(ToWire::to_wire).collect()
    }
}

impl<T: FromWire> FromWire for Vec<T> {
    type Wire = Vec<T::Wire>;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        wire.into_iter().map(T::from_wire).collect()
    }
}

/// Byte payload to wire.
pub fn bytes_to_wire(bytes: &[u8]) -> Bytes {
    Bytes::copy_from_slice(bytes)
}

/// Byte payload from wire. Absent and empty are the same thing.
pub fn bytes_from_wire(bytes: Bytes) -> Vec<u8> {
    bytes.to_vec()
}

/// Narrow a widened wire integer back to its native width.
pub fn narrow<N: TryFrom<u32>>(value: u32, field: &str) -> CapabilityResult<N> {
    N::try_from(value)
        .map_err(|_| CapabilityError::codec(format!("{field}: {value} out of range")))
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

impl ToWire for Bytes32 {
    type Wire = Bytes;

    fn to_wire(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl FromWire for Bytes32 {
    type Wire = Bytes;

    fn from_wire(wire: Bytes) -> CapabilityResult<Self> {
        Ok(Bytes32::from_slice_padded(&wire))
    }
}

impl ToWire for UnknownAddress {
    type Wire = Bytes;

    fn to_wire(&self) -> Bytes {
        bytes_to_wire(self.as_bytes())
    }
}

impl FromWire for UnknownAddress {
    type Wire = Bytes;

    fn from_wire(wire: Bytes) -> CapabilityResult<Self> {
        Ok(UnknownAddress(wire.to_vec()))
    }
}

impl ToWire for ChainSelector {
    type Wire = u64;

    fn to_wire(&self) -> u64 {
        self.0
    }
}

impl FromWire for ChainSelector {
    type Wire = u64;

    fn from_wire(wire: u64) -> CapabilityResult<Self> {
        Ok(ChainSelector(wire))
    }
}

impl ToWire for SeqNumRange {
    type Wire = schema::SeqNumRange;

    fn to_wire(&self) -> Self::Wire {
        schema::SeqNumRange {
            start: self.start(),
            end: self.end(),
        }
    }
}

impl FromWire for SeqNumRange {
    type Wire = schema::SeqNumRange;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        Ok(SeqNumRange::new(wire.start, wire.end))
    }
}

impl ToWire for BigInt {
    type Wire = schema::BigInt;

    fn to_wire(&self) -> Self::Wire {
        let value = match self.value() {
            None => Bytes::new(),
            Some(v) => Bytes::from(v.magnitude().to_bytes_be()),
        };
        schema::BigInt { value }
    }
}

impl FromWire for BigInt {
    type Wire = schema::BigInt;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        if wire.value.is_empty() {
            return Ok(BigInt::unset());
        }
        Ok(BigInt::new(BigUint::from_bytes_be(&wire.value)))
    }
}

impl ToWire for DateTime<Utc> {
    type Wire = schema::Timestamp;

    fn to_wire(&self) -> Self::Wire {
        schema::Timestamp {
            seconds: self.timestamp(),
            nanos: self.timestamp_subsec_nanos(),
        }
    }
}

impl FromWire for DateTime<Utc> {
    type Wire = schema::Timestamp;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        DateTime::from_timestamp(wire.seconds, wire.nanos).ok_or_else(|| {
            CapabilityError::codec(format!(
                "timestamp {}s {}ns out of range",
                wire.seconds, wire.nanos
            ))
        })
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

impl ToWire for RampMessageHeader {
    type Wire = schema::RampMessageHeader;

    fn to_wire(&self) -> Self::Wire {
        schema::RampMessageHeader {
            message_id: self.message_id.to_wire(),
            source_chain_selector: self.source_chain_selector.0,
            dest_chain_selector: self.dest_chain_selector.0,
            sequence_number: self.sequence_number,
            nonce: self.nonce,
            msg_hash: self.msg_hash.to_wire(),
            on_ramp: self.on_ramp.to_wire(),
            tx_hash: self.tx_hash.clone(),
        }
    }
}

impl FromWire for RampMessageHeader {
    type Wire = schema::RampMessageHeader;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        Ok(RampMessageHeader {
            message_id: Bytes32::from_wire(wire.message_id)?,
            source_chain_selector: ChainSelector(wire.source_chain_selector),
            dest_chain_selector: ChainSelector(wire.dest_chain_selector),
            sequence_number: wire.sequence_number,
            nonce: wire.nonce,
            msg_hash: Bytes32::from_wire(wire.msg_hash)?,
            on_ramp: UnknownAddress::from_wire(wire.on_ramp)?,
            tx_hash: wire.tx_hash,
        })
    }
}

impl ToWire for RampTokenAmount {
    type Wire = schema::RampTokenAmount;

    fn to_wire(&self) -> Self::Wire {
        schema::RampTokenAmount {
            source_pool_address: self.source_pool_address.to_wire(),
            dest_token_address: self.dest_token_address.to_wire(),
            extra_data: bytes_to_wire(&self.extra_data),
            amount: self.amount.to_wire(),
            dest_exec_data: bytes_to_wire(&self.dest_exec_data),
        }
    }
}

impl FromWire for RampTokenAmount {
    type Wire = schema::RampTokenAmount;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        Ok(RampTokenAmount {
            source_pool_address: UnknownAddress::from_wire(wire.source_pool_address)?,
            dest_token_address: UnknownAddress::from_wire(wire.dest_token_address)?,
            extra_data: bytes_from_wire(wire.extra_data),
            amount: BigInt::from_wire(wire.amount)?,
            dest_exec_data: bytes_from_wire(wire.dest_exec_data),
        })
    }
}

impl ToWire for Message {
    type Wire = schema::Message;

    fn to_wire(&self) -> Self::Wire {
        schema::Message {
            header: self.header.to_wire(),
            sender: self.sender.to_wire(),
            data: bytes_to_wire(&self.data),
            receiver: self.receiver.to_wire(),
            extra_args: bytes_to_wire(&self.extra_args),
            fee_token: self.fee_token.to_wire(),
            fee_token_amount: self.fee_token_amount.to_wire(),
            fee_value_juels: self.fee_value_juels.to_wire(),
            token_amounts: self.token_amounts.to_wire(),
        }
    }
}

impl FromWire for Message {
    type Wire = schema::Message;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        Ok(Message {
            header: RampMessageHeader::from_wire(wire.header)?,
            sender: UnknownAddress::from_wire(wire.sender)?,
            data: bytes_from_wire(wire.data),
            receiver: UnknownAddress::from_wire(wire.receiver)?,
            extra_args: bytes_from_wire(wire.extra_args),
            fee_token: UnknownAddress::from_wire(wire.fee_token)?,
            fee_token_amount: BigInt::from_wire(wire.fee_token_amount)?,
            fee_value_juels: BigInt::from_wire(wire.fee_value_juels)?,
            token_amounts: Vec::from_wire(wire.token_amounts)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Execute reports
// ---------------------------------------------------------------------------

/// The token data list is sent with one entry per message, padding with
/// empty entries if the domain list is short. Decoding keeps exactly one
/// domain entry per wire entry.
impl ToWire for ExecutePluginReportSingleChain {
    type Wire = schema::ChainReport;

    fn to_wire(&self) -> Self::Wire {
        let entries = self.messages.len().max(self.offchain_token_data.len());
        let offchain_token_data = (0..entries)
            .map(|i| schema::RepeatedBytes {
                items: self
                    .offchain_token_data
                    .get(i)
                    .map(|data| data.iter().map(|b| bytes_to_wire(b)).collect())
                    .unwrap_or_default(),
            })
            .collect();

        schema::ChainReport {
            source_chain_selector: self.source_chain_selector.0,
            messages: self.messages.to_wire(),
            offchain_token_data,
            proofs: self.proofs.to_wire(),
            proof_flag_bits: self.proof_flag_bits.to_wire(),
        }
    }
}

impl FromWire for ExecutePluginReportSingleChain {
    type Wire = schema::ChainReport;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        Ok(ExecutePluginReportSingleChain {
            source_chain_selector: ChainSelector(wire.source_chain_selector),
            messages: Vec::from_wire(wire.messages)?,
            offchain_token_data: wire
                .offchain_token_data
                .into_iter()
                .map(|entry| entry.items.into_iter().map(bytes_from_wire).collect())
                .collect(),
            proofs: Vec::from_wire(wire.proofs)?,
            proof_flag_bits: BigInt::from_wire(wire.proof_flag_bits)?,
        })
    }
}

impl ToWire for ExecutePluginReport {
    type Wire = schema::ExecutePluginReport;

    fn to_wire(&self) -> Self::Wire {
        schema::ExecutePluginReport {
            chain_reports: self.chain_reports.to_wire(),
        }
    }
}

impl FromWire for ExecutePluginReport {
    type Wire = schema::ExecutePluginReport;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        Ok(ExecutePluginReport {
            chain_reports: Vec::from_wire(wire.chain_reports)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Commit reports
// ---------------------------------------------------------------------------

impl ToWire for TokenPrice {
    type Wire = schema::TokenPrice;

    fn to_wire(&self) -> Self::Wire {
        schema::TokenPrice {
            token_id: self.token_id.clone(),
            price: self.price.to_wire(),
        }
    }
}

impl FromWire for TokenPrice {
    type Wire = schema::TokenPrice;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        Ok(TokenPrice {
            token_id: wire.token_id,
            price: BigInt::from_wire(wire.price)?,
        })
    }
}

impl ToWire for GasPriceChain {
    type Wire = schema::GasPriceChain;

    fn to_wire(&self) -> Self::Wire {
        schema::GasPriceChain {
            chain_selector: self.chain_selector.0,
            gas_price: self.gas_price.to_wire(),
        }
    }
}

impl FromWire for GasPriceChain {
    type Wire = schema::GasPriceChain;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        Ok(GasPriceChain {
            chain_selector: ChainSelector(wire.chain_selector),
            gas_price: BigInt::from_wire(wire.gas_price)?,
        })
    }
}

impl ToWire for PriceUpdates {
    type Wire = schema::PriceUpdates;

    fn to_wire(&self) -> Self::Wire {
        schema::PriceUpdates {
            token_price_updates: self.token_price_updates.to_wire(),
            gas_price_updates: self.gas_price_updates.to_wire(),
        }
    }
}

impl FromWire for PriceUpdates {
    type Wire = schema::PriceUpdates;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        Ok(PriceUpdates {
            token_price_updates: Vec::from_wire(wire.token_price_updates)?,
            gas_price_updates: Vec::from_wire(wire.gas_price_updates)?,
        })
    }
}

impl ToWire for MerkleRootChain {
    type Wire = schema::MerkleRootChain;

    fn to_wire(&self) -> Self::Wire {
        schema::MerkleRootChain {
            chain_selector: self.chain_selector.0,
            on_ramp_address: self.on_ramp_address.to_wire(),
            seq_nums_range: self.seq_nums_range.to_wire(),
            merkle_root: self.merkle_root.to_wire(),
        }
    }
}

impl FromWire for MerkleRootChain {
    type Wire = schema::MerkleRootChain;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        Ok(MerkleRootChain {
            chain_selector: ChainSelector(wire.chain_selector),
            on_ramp_address: UnknownAddress::from_wire(wire.on_ramp_address)?,
            seq_nums_range: SeqNumRange::from_wire(wire.seq_nums_range)?,
            merkle_root: Bytes32::from_wire(wire.merkle_root)?,
        })
    }
}

impl ToWire for RmnEcdsaSignature {
    type Wire = schema::RmnEcdsaSignature;

    fn to_wire(&self) -> Self::Wire {
        schema::RmnEcdsaSignature {
            r: self.r.to_wire(),
            s: self.s.to_wire(),
        }
    }
}

impl FromWire for RmnEcdsaSignature {
    type Wire = schema::RmnEcdsaSignature;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        Ok(RmnEcdsaSignature {
            r: Bytes32::from_wire(wire.r)?,
            s: Bytes32::from_wire(wire.s)?,
        })
    }
}

impl ToWire for CommitPluginReport {
    type Wire = schema::CommitPluginReport;

    fn to_wire(&self) -> Self::Wire {
        schema::CommitPluginReport {
            price_updates: self.price_updates.to_wire(),
            blessed_merkle_roots: self.blessed_merkle_roots.to_wire(),
            unblessed_merkle_roots: self.unblessed_merkle_roots.to_wire(),
            rmn_signatures: self.rmn_signatures.to_wire(),
        }
    }
}

impl FromWire for CommitPluginReport {
    type Wire = schema::CommitPluginReport;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        Ok(CommitPluginReport {
            price_updates: PriceUpdates::from_wire(wire.price_updates)?,
            blessed_merkle_roots: Vec::from_wire(wire.blessed_merkle_roots)?,
            unblessed_merkle_roots: Vec::from_wire(wire.unblessed_merkle_roots)?,
            rmn_signatures: Vec::from_wire(wire.rmn_signatures)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Chain state
// ---------------------------------------------------------------------------

impl ToWire for OffRampStaticConfig {
    type Wire = schema::OffRampStaticConfig;

    fn to_wire(&self) -> Self::Wire {
        schema::OffRampStaticConfig {
            chain_selector: self.chain_selector.0,
            gas_for_call_exact_check: u32::from(self.gas_for_call_exact_check),
            rmn_remote: self.rmn_remote.to_wire(),
            token_admin_registry: self.token_admin_registry.to_wire(),
            nonce_manager: self.nonce_manager.to_wire(),
        }
    }
}

impl FromWire for OffRampStaticConfig {
    type Wire = schema::OffRampStaticConfig;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        Ok(OffRampStaticConfig {
            chain_selector: ChainSelector(wire.chain_selector),
            gas_for_call_exact_check: narrow(
                wire.gas_for_call_exact_check,
                "gas_for_call_exact_check",
            )?,
            rmn_remote: UnknownAddress::from_wire(wire.rmn_remote)?,
            token_admin_registry: UnknownAddress::from_wire(wire.token_admin_registry)?,
            nonce_manager: UnknownAddress::from_wire(wire.nonce_manager)?,
        })
    }
}

impl ToWire for OffRampDynamicConfig {
    type Wire = schema::OffRampDynamicConfig;

    fn to_wire(&self) -> Self::Wire {
        schema::OffRampDynamicConfig {
            fee_quoter: self.fee_quoter.to_wire(),
            permissionless_execution_threshold_seconds: self
                .permissionless_execution_threshold_seconds,
            message_interceptor: self.message_interceptor.to_wire(),
        }
    }
}

impl FromWire for OffRampDynamicConfig {
    type Wire = schema::OffRampDynamicConfig;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        Ok(OffRampDynamicConfig {
            fee_quoter: UnknownAddress::from_wire(wire.fee_quoter)?,
            permissionless_execution_threshold_seconds: wire
                .permissionless_execution_threshold_seconds,
            message_interceptor: UnknownAddress::from_wire(wire.message_interceptor)?,
        })
    }
}

impl ToWire for OffRampConfig {
    type Wire = schema::OffRampConfig;

    fn to_wire(&self) -> Self::Wire {
        schema::OffRampConfig {
            static_config: self.static_config.to_wire(),
            dynamic_config: self.dynamic_config.to_wire(),
        }
    }
}

impl FromWire for OffRampConfig {
    type Wire = schema::OffRampConfig;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        Ok(OffRampConfig {
            static_config: OffRampStaticConfig::from_wire(wire.static_config)?,
            dynamic_config: OffRampDynamicConfig::from_wire(wire.dynamic_config)?,
        })
    }
}

impl ToWire for RmnSigner {
    type Wire = schema::RmnSigner;

    fn to_wire(&self) -> Self::Wire {
        schema::RmnSigner {
            onchain_public_key: self.onchain_public_key.to_wire(),
            node_index: self.node_index,
        }
    }
}

impl FromWire for RmnSigner {
    type Wire = schema::RmnSigner;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        Ok(RmnSigner {
            onchain_public_key: UnknownAddress::from_wire(wire.onchain_public_key)?,
            node_index: wire.node_index,
        })
    }
}

impl ToWire for RmnRemoteConfig {
    type Wire = schema::RmnRemoteConfig;

    fn to_wire(&self) -> Self::Wire {
        schema::RmnRemoteConfig {
            config_digest: self.config_digest.to_wire(),
            signers: self.signers.to_wire(),
            f_sign: self.f_sign,
        }
    }
}

impl FromWire for RmnRemoteConfig {
    type Wire = schema::RmnRemoteConfig;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        Ok(RmnRemoteConfig {
            config_digest: Bytes32::from_wire(wire.config_digest)?,
            signers: Vec::from_wire(wire.signers)?,
            f_sign: wire.f_sign,
        })
    }
}

impl ToWire for FeeQuoterStaticConfig {
    type Wire = schema::FeeQuoterStaticConfig;

    fn to_wire(&self) -> Self::Wire {
        schema::FeeQuoterStaticConfig {
            max_fee_juels_per_msg: self.max_fee_juels_per_msg.to_wire(),
            link_token: self.link_token.to_wire(),
            stale_gas_price_staleness_threshold: self.stale_gas_price_staleness_threshold,
        }
    }
}

impl FromWire for FeeQuoterStaticConfig {
    type Wire = schema::FeeQuoterStaticConfig;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        Ok(FeeQuoterStaticConfig {
            max_fee_juels_per_msg: BigInt::from_wire(wire.max_fee_juels_per_msg)?,
            link_token: UnknownAddress::from_wire(wire.link_token)?,
            stale_gas_price_staleness_threshold: wire.stale_gas_price_staleness_threshold,
        })
    }
}

impl ToWire for CurseInfo {
    type Wire = schema::CurseInfo;

    fn to_wire(&self) -> Self::Wire {
        schema::CurseInfo {
            cursed_source_chains: self
                .cursed_source_chains
                .iter()
                .map(|(chain, cursed)| (chain.0, *cursed))
                .collect(),
            cursed_destination: self.cursed_destination,
            global_curse: self.global_curse,
        }
    }
}

impl FromWire for CurseInfo {
    type Wire = schema::CurseInfo;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        Ok(CurseInfo {
            cursed_source_chains: wire
                .cursed_source_chains
                .into_iter()
                .map(|(chain, cursed)| (ChainSelector(chain), cursed))
                .collect(),
            cursed_destination: wire.cursed_destination,
            global_curse: wire.global_curse,
        })
    }
}

impl ToWire for ChainConfigSnapshot {
    type Wire = schema::ChainConfigSnapshot;

    fn to_wire(&self) -> Self::Wire {
        schema::ChainConfigSnapshot {
            offramp: self.offramp.to_wire(),
            rmn_remote: self.rmn_remote.to_wire(),
            fee_quoter: self.fee_quoter.to_wire(),
            curse_info: self.curse_info.to_wire(),
        }
    }
}

impl FromWire for ChainConfigSnapshot {
    type Wire = schema::ChainConfigSnapshot;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        Ok(ChainConfigSnapshot {
            offramp: OffRampConfig::from_wire(wire.offramp)?,
            rmn_remote: RmnRemoteConfig::from_wire(wire.rmn_remote)?,
            fee_quoter: FeeQuoterStaticConfig::from_wire(wire.fee_quoter)?,
            curse_info: CurseInfo::from_wire(wire.curse_info)?,
        })
    }
}

impl ToWire for ChainFeeComponents {
    type Wire = schema::ChainFeeComponents;

    fn to_wire(&self) -> Self::Wire {
        schema::ChainFeeComponents {
            execution_fee: self.execution_fee.to_wire(),
            data_availability_fee: self.data_availability_fee.to_wire(),
        }
    }
}

impl FromWire for ChainFeeComponents {
    type Wire = schema::ChainFeeComponents;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        Ok(ChainFeeComponents {
            execution_fee: BigInt::from_wire(wire.execution_fee)?,
            data_availability_fee: BigInt::from_wire(wire.data_availability_fee)?,
        })
    }
}

impl ToWire for TimestampedBig {
    type Wire = schema::TimestampedBig;

    fn to_wire(&self) -> Self::Wire {
        schema::TimestampedBig {
            timestamp: self.timestamp.to_wire(),
            value: self.value.to_wire(),
        }
    }
}

impl FromWire for TimestampedBig {
    type Wire = schema::TimestampedBig;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        Ok(TimestampedBig {
            timestamp: DateTime::from_wire(wire.timestamp)?,
            value: BigInt::from_wire(wire.value)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Transmission
// ---------------------------------------------------------------------------

impl ToWire for ReportWithInfo {
    type Wire = schema::ReportWithInfo;

    fn to_wire(&self) -> Self::Wire {
        schema::ReportWithInfo {
            report: bytes_to_wire(&self.report),
            info: bytes_to_wire(&self.info),
        }
    }
}

impl FromWire for ReportWithInfo {
    type Wire = schema::ReportWithInfo;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        Ok(ReportWithInfo {
            report: bytes_from_wire(wire.report),
            info: bytes_from_wire(wire.info),
        })
    }
}

impl ToWire for AttributedSignature {
    type Wire = schema::AttributedSignature;

    fn to_wire(&self) -> Self::Wire {
        schema::AttributedSignature {
            signature: bytes_to_wire(&self.signature),
            signer: u32::from(self.signer),
        }
    }
}

impl FromWire for AttributedSignature {
    type Wire = schema::AttributedSignature;

    fn from_wire(wire: Self::Wire) -> CapabilityResult<Self> {
        Ok(AttributedSignature {
            signature: bytes_from_wire(wire.signature),
            signer: narrow(wire.signer, "signer")?,
        })
    }
}
