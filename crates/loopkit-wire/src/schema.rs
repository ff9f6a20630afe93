//! Wire schema: the messages exchanged by the CCIP capability family.
//!
//! One request and one response message per operation, plus the shared
//! records they are built from. Every message is encoded with named fields,
//! so the evolution rules are:
//!
//! - new fields must be added with a default (all structs here carry
//!   `#[serde(default)]`), so an older peer simply does not see them;
//! - a field name must never be reused for a different meaning.
//!
//! Byte payloads are [`Bytes`] so they travel as MessagePack `bin`. Chain
//! selectors are plain `u64` keys. Narrow integers are widened to `u32`.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Shared records
// ---------------------------------------------------------------------------

/// Arbitrary-precision integer: big-endian magnitude. Empty means unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BigInt {
    pub value: Bytes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeqNumRange {
    pub start: u64,
    pub end: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RampMessageHeader {
    pub message_id: Bytes,
    pub source_chain_selector: u64,
    pub dest_chain_selector: u64,
    pub sequence_number: u64,
    pub nonce: u64,
    pub msg_hash: Bytes,
    pub on_ramp: Bytes,
    pub tx_hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RampTokenAmount {
    pub source_pool_address: Bytes,
    pub dest_token_address: Bytes,
    pub extra_data: Bytes,
    pub amount: BigInt,
    pub dest_exec_data: Bytes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    pub header: RampMessageHeader,
    pub sender: Bytes,
    pub data: Bytes,
    pub receiver: Bytes,
    pub extra_args: Bytes,
    pub fee_token: Bytes,
    pub fee_token_amount: BigInt,
    pub fee_value_juels: BigInt,
    pub token_amounts: Vec<RampTokenAmount>,
}

/// Token data of one message. Present even when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepeatedBytes {
    pub items: Vec<Bytes>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainReport {
    pub source_chain_selector: u64,
    pub messages: Vec<Message>,
    /// Parallel to `messages`: entry `i` is the token data of message `i`.
    pub offchain_token_data: Vec<RepeatedBytes>,
    pub proofs: Vec<Bytes>,
    pub proof_flag_bits: BigInt,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutePluginReport {
    pub chain_reports: Vec<ChainReport>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenPrice {
    pub token_id: String,
    pub price: BigInt,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasPriceChain {
    pub chain_selector: u64,
    pub gas_price: BigInt,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceUpdates {
    pub token_price_updates: Vec<TokenPrice>,
    pub gas_price_updates: Vec<GasPriceChain>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MerkleRootChain {
    pub chain_selector: u64,
    pub on_ramp_address: Bytes,
    pub seq_nums_range: SeqNumRange,
    pub merkle_root: Bytes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RmnEcdsaSignature {
    pub r: Bytes,
    pub s: Bytes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitPluginReport {
    pub price_updates: PriceUpdates,
    pub blessed_merkle_roots: Vec<MerkleRootChain>,
    pub unblessed_merkle_roots: Vec<MerkleRootChain>,
    pub rmn_signatures: Vec<RmnEcdsaSignature>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffRampStaticConfig {
    pub chain_selector: u64,
    /// Native width is 16 bits.
    pub gas_for_call_exact_check: u32,
    pub rmn_remote: Bytes,
    pub token_admin_registry: Bytes,
    pub nonce_manager: Bytes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffRampDynamicConfig {
    pub fee_quoter: Bytes,
    pub permissionless_execution_threshold_seconds: u32,
    pub message_interceptor: Bytes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffRampConfig {
    pub static_config: OffRampStaticConfig,
    pub dynamic_config: OffRampDynamicConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RmnSigner {
    pub onchain_public_key: Bytes,
    pub node_index: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RmnRemoteConfig {
    pub config_digest: Bytes,
    pub signers: Vec<RmnSigner>,
    pub f_sign: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeQuoterStaticConfig {
    pub max_fee_juels_per_msg: BigInt,
    pub link_token: Bytes,
    pub stale_gas_price_staleness_threshold: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurseInfo {
    pub cursed_source_chains: BTreeMap<u64, bool>,
    pub cursed_destination: bool,
    pub global_curse: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfigSnapshot {
    pub offramp: OffRampConfig,
    pub rmn_remote: RmnRemoteConfig,
    pub fee_quoter: FeeQuoterStaticConfig,
    pub curse_info: CurseInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainFeeComponents {
    pub execution_fee: BigInt,
    pub data_availability_fee: BigInt,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestampedBig {
    pub timestamp: Timestamp,
    pub value: BigInt,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportWithInfo {
    pub report: Bytes,
    pub info: Bytes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributedSignature {
    pub signature: Bytes,
    /// Native width is 8 bits.
    pub signer: u32,
}

// ---------------------------------------------------------------------------
// Dynamic values
// ---------------------------------------------------------------------------

/// A dynamic value. Exactly one field is set; none set means "no value".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Value {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub int64_value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uint32_value: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uint64_value: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub float64_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bool_value: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_value: Option<Bytes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bigint_value: Option<BigInt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_value: Option<Map>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_value: Option<List>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Map {
    pub fields: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct List {
    pub items: Vec<Value>,
}

// ---------------------------------------------------------------------------
// ChainAccessor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Empty {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetContractAddressRequest {
    pub contract_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetContractAddressResponse {
    pub address: Bytes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetAllConfigsResponse {
    pub snapshot: ChainConfigSnapshot,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetChainFeeComponentsResponse {
    pub fee_components: BTreeMap<u64, ChainFeeComponents>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NextSeqNumRequest {
    pub source_chain_selectors: Vec<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NextSeqNumResponse {
    pub seq_nums: BTreeMap<u64, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressList {
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoncesRequest {
    pub addresses: BTreeMap<u64, AddressList>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NonceMap {
    pub nonces: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoncesResponse {
    pub nonces: BTreeMap<u64, NonceMap>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetLatestPriceSeqNrResponse {
    pub seq_nr: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetFeeQuoterTokenUpdatesRequest {
    pub tokens: Vec<String>,
    pub chain_selector: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetFeeQuoterTokenUpdatesResponse {
    pub token_updates: BTreeMap<String, TimestampedBig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MsgsBetweenSeqNumsRequest {
    pub dest_chain_selector: u64,
    pub seq_num_range: SeqNumRange,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MsgsBetweenSeqNumsResponse {
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncRequest {
    pub contract_name: String,
    pub contract_address: Bytes,
}

// ---------------------------------------------------------------------------
// AddressCodec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressBytesToStringRequest {
    pub address: Bytes,
    pub chain_selector: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressBytesToStringResponse {
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressStringToBytesRequest {
    pub address: String,
    pub chain_selector: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressStringToBytesResponse {
    pub address: Bytes,
}

// ---------------------------------------------------------------------------
// Report codecs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeCommitReportRequest {
    pub report: CommitPluginReport,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeCommitReportResponse {
    pub report: CommitPluginReport,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeExecuteReportRequest {
    pub report: ExecutePluginReport,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeExecuteReportResponse {
    pub report: ExecutePluginReport,
}

/// Encoded report, used by both report codecs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodedReport {
    pub encoded: Bytes,
}

// ---------------------------------------------------------------------------
// TokenDataEncoder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeUsdcRequest {
    pub message: Bytes,
    pub attestation: Bytes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeUsdcResponse {
    pub token_data: Bytes,
}

// ---------------------------------------------------------------------------
// ExtraDataCodec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeExtraArgsRequest {
    pub extra_args: Bytes,
    pub source_chain_selector: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeDestExecDataRequest {
    pub dest_exec_data: Bytes,
    pub dest_chain_selector: u64,
}

/// Decoded extra data, used by both `ExtraDataCodec` operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodedExtraData {
    pub decoded: Map,
}

// ---------------------------------------------------------------------------
// ContractTransmitter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransmitRequest {
    pub config_digest: Bytes,
    pub seq_nr: u64,
    pub report: ReportWithInfo,
    pub signatures: Vec<AttributedSignature>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FromAccountResponse {
    pub account: String,
}
