//! Client and server halves of each capability contract.
//!
//! A client half implements the contract trait by sending one request per
//! operation through an [`Extension`](crate::Extension). A server half wraps
//! a real implementation and is served under the contract's endpoint name.
//! Endpoint and method names are part of the wire contract and must never
//! be renamed.

pub mod chain_accessor;
pub mod codecs;
pub mod transmitter;

pub use chain_accessor::{ChainAccessorClient, ChainAccessorServer};
pub use codecs::{
    AddressCodecClient, AddressCodecServer, CommitPluginCodecClient, CommitPluginCodecServer,
    ExecutePluginCodecClient, ExecutePluginCodecServer, ExtraDataCodecClient,
    ExtraDataCodecServer, TokenDataEncoderClient, TokenDataEncoderServer,
};
pub use transmitter::{ContractTransmitterClient, ContractTransmitterServer};

use crate::codec::FromWire;
use crate::frame::Status;

pub const CHAIN_ACCESSOR: &str = "ChainAccessor";
pub const COMMIT_PLUGIN_CODEC: &str = "CommitPluginCodec";
pub const EXECUTE_PLUGIN_CODEC: &str = "ExecutePluginCodec";
pub const TOKEN_DATA_ENCODER: &str = "TokenDataEncoder";
pub const ADDRESS_CODEC: &str = "AddressCodec";
pub const EXTRA_DATA_CODEC: &str = "ExtraDataCodec";
pub const CONTRACT_TRANSMITTER: &str = "ContractTransmitter";

/// Method names, per contract.
pub mod methods {
    pub const GET_CONTRACT_ADDRESS: &str = "GetContractAddress";
    pub const GET_ALL_CONFIGS: &str = "GetAllConfigs";
    pub const GET_CHAIN_FEE_COMPONENTS: &str = "GetChainFeeComponents";
    pub const NEXT_SEQ_NUM: &str = "NextSeqNum";
    pub const NONCES: &str = "Nonces";
    pub const GET_LATEST_PRICE_SEQ_NR: &str = "GetLatestPriceSeqNr";
    pub const GET_FEE_QUOTER_TOKEN_UPDATES: &str = "GetFeeQuoterTokenUpdates";
    pub const MSGS_BETWEEN_SEQ_NUMS: &str = "MsgsBetweenSeqNums";
    pub const SYNC: &str = "Sync";

    pub const ADDRESS_BYTES_TO_STRING: &str = "AddressBytesToString";
    pub const ADDRESS_STRING_TO_BYTES: &str = "AddressStringToBytes";

    /// Shared by both report codecs.
    pub const ENCODE: &str = "Encode";
    pub const DECODE: &str = "Decode";

    pub const ENCODE_USDC: &str = "EncodeUSDC";

    pub const DECODE_EXTRA_ARGS: &str = "DecodeExtraArgs";
    pub const DECODE_DEST_EXEC_DATA: &str = "DecodeDestExecData";

    pub const TRANSMIT: &str = "Transmit";
    pub const FROM_ACCOUNT: &str = "FromAccount";
}

/// Status for a method the contract does not define.
pub(crate) fn unknown_method(contract: &str, method: &str) -> Status {
    Status::unimplemented(format!("{contract}.{method}"))
}

/// Convert a request field from its wire form. A value that cannot be
/// represented in the domain is the caller's fault.
pub(crate) fn from_request<T: FromWire>(wire: T::Wire) -> Result<T, Status> {
    T::from_wire(wire).map_err(|e| Status::invalid_argument(e.to_string()))
}
