//! Domain records exchanged by the CCIP capability family.
//!
//! All records are plain values: created fresh per call and never mutated
//! after construction.

use crate::primitives::{BigInt, Bytes32, ChainSelector, SeqNum, SeqNumRange, UnknownAddress};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Routing metadata shared by every cross-chain message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RampMessageHeader {
    /// Unique message identifier.
    pub message_id: Bytes32,
    pub source_chain_selector: ChainSelector,
    pub dest_chain_selector: ChainSelector,
    pub sequence_number: SeqNum,
    /// Sender nonce. Zero for out-of-order messages.
    pub nonce: u64,
    /// Leaf hash of the message in the commit tree.
    pub msg_hash: Bytes32,
    /// On-ramp contract that emitted the message.
    pub on_ramp: UnknownAddress,
    /// Hash of the source transaction, in its chain-native text form.
    pub tx_hash: String,
}

/// A token transfer attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RampTokenAmount {
    pub source_pool_address: UnknownAddress,
    pub dest_token_address: UnknownAddress,
    pub extra_data: Vec<u8>,
    pub amount: BigInt,
    pub dest_exec_data: Vec<u8>,
}

/// A cross-chain message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub header: RampMessageHeader,
    pub sender: UnknownAddress,
    pub data: Vec<u8>,
    pub receiver: UnknownAddress,
    /// Family-specific extra arguments; decoded via the extra-data codec.
    pub extra_args: Vec<u8>,
    pub fee_token: UnknownAddress,
    pub fee_token_amount: BigInt,
    pub fee_value_juels: BigInt,
    pub token_amounts: Vec<RampTokenAmount>,
}

// ---------------------------------------------------------------------------
// Execute reports
// ---------------------------------------------------------------------------

/// Messages from one source chain, with proofs and per-message token data.
///
/// `offchain_token_data` runs parallel to `messages`: entry `i` holds the
/// token data of message `i` and may itself be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutePluginReportSingleChain {
    pub source_chain_selector: ChainSelector,
    pub messages: Vec<Message>,
    pub offchain_token_data: Vec<Vec<Vec<u8>>>,
    pub proofs: Vec<Bytes32>,
    pub proof_flag_bits: BigInt,
}

/// Report produced by the execute plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutePluginReport {
    pub chain_reports: Vec<ExecutePluginReportSingleChain>,
}

// ---------------------------------------------------------------------------
// Commit reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenPrice {
    pub token_id: String,
    pub price: BigInt,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GasPriceChain {
    pub chain_selector: ChainSelector,
    pub gas_price: BigInt,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceUpdates {
    pub token_price_updates: Vec<TokenPrice>,
    pub gas_price_updates: Vec<GasPriceChain>,
}

/// A merkle root covering a range of messages from one source chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MerkleRootChain {
    pub chain_selector: ChainSelector,
    pub on_ramp_address: UnknownAddress,
    pub seq_nums_range: SeqNumRange,
    pub merkle_root: Bytes32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RmnEcdsaSignature {
    pub r: Bytes32,
    pub s: Bytes32,
}

/// Report produced by the commit plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitPluginReport {
    pub price_updates: PriceUpdates,
    pub blessed_merkle_roots: Vec<MerkleRootChain>,
    pub unblessed_merkle_roots: Vec<MerkleRootChain>,
    pub rmn_signatures: Vec<RmnEcdsaSignature>,
}

// ---------------------------------------------------------------------------
// Chain state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffRampStaticConfig {
    pub chain_selector: ChainSelector,
    /// Gas reserved for the exact-gas check around receiver calls.
    pub gas_for_call_exact_check: u16,
    pub rmn_remote: UnknownAddress,
    pub token_admin_registry: UnknownAddress,
    pub nonce_manager: UnknownAddress,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffRampDynamicConfig {
    pub fee_quoter: UnknownAddress,
    pub permissionless_execution_threshold_seconds: u32,
    pub message_interceptor: UnknownAddress,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffRampConfig {
    pub static_config: OffRampStaticConfig,
    pub dynamic_config: OffRampDynamicConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RmnSigner {
    pub onchain_public_key: UnknownAddress,
    pub node_index: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RmnRemoteConfig {
    pub config_digest: Bytes32,
    pub signers: Vec<RmnSigner>,
    /// Minimum number of signatures required, minus one.
    pub f_sign: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeQuoterStaticConfig {
    pub max_fee_juels_per_msg: BigInt,
    pub link_token: UnknownAddress,
    pub stale_gas_price_staleness_threshold: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurseInfo {
    pub cursed_source_chains: BTreeMap<ChainSelector, bool>,
    pub cursed_destination: bool,
    pub global_curse: bool,
}

/// Point-in-time snapshot of the on-chain configuration the plugins read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainConfigSnapshot {
    pub offramp: OffRampConfig,
    pub rmn_remote: RmnRemoteConfig,
    pub fee_quoter: FeeQuoterStaticConfig,
    pub curse_info: CurseInfo,
}

/// Fee components of a chain, in the chain's native gas units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainFeeComponents {
    pub execution_fee: BigInt,
    pub data_availability_fee: BigInt,
}

/// A value observed at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampedBig {
    pub timestamp: DateTime<Utc>,
    pub value: BigInt,
}

// ---------------------------------------------------------------------------
// Transmission
// ---------------------------------------------------------------------------

/// A report plus the opaque metadata the transmitter needs to submit it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportWithInfo {
    pub report: Vec<u8>,
    pub info: Vec<u8>,
}

/// A signature together with the index of the oracle that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributedSignature {
    pub signature: Vec<u8>,
    pub signer: u8,
}
