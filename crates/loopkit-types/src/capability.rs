//! Capability contracts of the CCIP provider family.
//!
//! Each trait is one contract. Both the real implementation (inside a
//! plugin or the host) and the client half of a remote proxy implement it, so
//! callers cannot tell a local capability from a remote one.
//!
//! Every operation has a default body returning
//! [`CapabilityError::Unimplemented`]. An implementation may therefore
//! provide a subset of a contract; the missing operations are reported to
//! remote callers as unimplemented rather than as failures.

use crate::ccip::{
    AttributedSignature, ChainConfigSnapshot, ChainFeeComponents, CommitPluginReport,
    ExecutePluginReport, Message, ReportWithInfo, TimestampedBig,
};
use crate::context::CallContext;
use crate::error::{CapabilityError, CapabilityResult};
use crate::primitives::{
    Bytes32, ChainSelector, SeqNum, SeqNumRange, UnknownAddress, UnknownEncodedAddress,
};
use crate::value::ExtraValueMap;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

fn unimplemented<T>(operation: &str) -> CapabilityResult<T> {
    Err(CapabilityError::unimplemented(operation))
}

/// Read access to on-chain state, plus binding of contract addresses.
#[async_trait]
pub trait ChainAccessor: Send + Sync {
    /// Address bound to `contract_name`.
    async fn get_contract_address(
        &self,
        _ctx: &CallContext,
        _contract_name: &str,
    ) -> CapabilityResult<UnknownAddress> {
        unimplemented("ChainAccessor.GetContractAddress")
    }

    /// Snapshot of every configuration the plugins read.
    async fn get_all_configs(&self, _ctx: &CallContext) -> CapabilityResult<ChainConfigSnapshot> {
        unimplemented("ChainAccessor.GetAllConfigs")
    }

    /// Fee components per chain.
    async fn get_chain_fee_components(
        &self,
        _ctx: &CallContext,
    ) -> CapabilityResult<BTreeMap<ChainSelector, ChainFeeComponents>> {
        unimplemented("ChainAccessor.GetChainFeeComponents")
    }

    /// Next expected sequence number for each source chain.
    async fn next_seq_num(
        &self,
        _ctx: &CallContext,
        _sources: &[ChainSelector],
    ) -> CapabilityResult<BTreeMap<ChainSelector, SeqNum>> {
        unimplemented("ChainAccessor.NextSeqNum")
    }

    /// Current nonce of each sender, grouped by source chain.
    async fn nonces(
        &self,
        _ctx: &CallContext,
        _addresses: &BTreeMap<ChainSelector, Vec<UnknownEncodedAddress>>,
    ) -> CapabilityResult<BTreeMap<ChainSelector, BTreeMap<UnknownEncodedAddress, u64>>> {
        unimplemented("ChainAccessor.Nonces")
    }

    /// Sequence number of the latest price update.
    async fn get_latest_price_seq_nr(&self, _ctx: &CallContext) -> CapabilityResult<u64> {
        unimplemented("ChainAccessor.GetLatestPriceSeqNr")
    }

    /// Latest fee-quoter price of each token.
    async fn get_fee_quoter_token_updates(
        &self,
        _ctx: &CallContext,
        _tokens: &[UnknownEncodedAddress],
        _chain: ChainSelector,
    ) -> CapabilityResult<BTreeMap<UnknownEncodedAddress, TimestampedBig>> {
        unimplemented("ChainAccessor.GetFeeQuoterTokenUpdates")
    }

    /// Messages sent to `dest` whose sequence numbers fall in `range`.
    async fn msgs_between_seq_nums(
        &self,
        _ctx: &CallContext,
        _dest: ChainSelector,
        _range: SeqNumRange,
    ) -> CapabilityResult<Vec<Message>> {
        unimplemented("ChainAccessor.MsgsBetweenSeqNums")
    }

    /// Bind `contract_name` to `address` so later reads can find it.
    async fn sync(
        &self,
        _ctx: &CallContext,
        _contract_name: &str,
        _address: UnknownAddress,
    ) -> CapabilityResult<()> {
        unimplemented("ChainAccessor.Sync")
    }
}

/// Converts addresses between bytes and their chain-native text form.
#[async_trait]
pub trait AddressCodec: Send + Sync {
    async fn address_bytes_to_string(
        &self,
        _ctx: &CallContext,
        _address: &UnknownAddress,
        _chain: ChainSelector,
    ) -> CapabilityResult<String> {
        unimplemented("AddressCodec.AddressBytesToString")
    }

    async fn address_string_to_bytes(
        &self,
        _ctx: &CallContext,
        _address: &str,
        _chain: ChainSelector,
    ) -> CapabilityResult<UnknownAddress> {
        unimplemented("AddressCodec.AddressStringToBytes")
    }
}

/// Encodes commit reports into their on-chain form and back.
#[async_trait]
pub trait CommitPluginCodec: Send + Sync {
    async fn encode(
        &self,
        _ctx: &CallContext,
        _report: &CommitPluginReport,
    ) -> CapabilityResult<Vec<u8>> {
        unimplemented("CommitPluginCodec.Encode")
    }

    async fn decode(&self, _ctx: &CallContext, _encoded: &[u8]) -> CapabilityResult<CommitPluginReport> {
        unimplemented("CommitPluginCodec.Decode")
    }
}

/// Encodes execute reports into their on-chain form and back.
#[async_trait]
pub trait ExecutePluginCodec: Send + Sync {
    async fn encode(
        &self,
        _ctx: &CallContext,
        _report: &ExecutePluginReport,
    ) -> CapabilityResult<Vec<u8>> {
        unimplemented("ExecutePluginCodec.Encode")
    }

    async fn decode(
        &self,
        _ctx: &CallContext,
        _encoded: &[u8],
    ) -> CapabilityResult<ExecutePluginReport> {
        unimplemented("ExecutePluginCodec.Decode")
    }
}

/// Builds the off-chain token data attached to token transfers.
#[async_trait]
pub trait TokenDataEncoder: Send + Sync {
    /// Encode a USDC message and its attestation.
    async fn encode_usdc(
        &self,
        _ctx: &CallContext,
        _message: &[u8],
        _attestation: &[u8],
    ) -> CapabilityResult<Vec<u8>> {
        unimplemented("TokenDataEncoder.EncodeUSDC")
    }
}

/// Decodes family-specific extra data into dynamic values.
#[async_trait]
pub trait ExtraDataCodec: Send + Sync {
    async fn decode_extra_args(
        &self,
        _ctx: &CallContext,
        _extra_args: &[u8],
        _source_chain: ChainSelector,
    ) -> CapabilityResult<ExtraValueMap> {
        unimplemented("ExtraDataCodec.DecodeExtraArgs")
    }

    async fn decode_dest_exec_data(
        &self,
        _ctx: &CallContext,
        _dest_exec_data: &[u8],
        _dest_chain: ChainSelector,
    ) -> CapabilityResult<ExtraValueMap> {
        unimplemented("ExtraDataCodec.DecodeDestExecData")
    }
}

/// Submits signed reports on chain.
#[async_trait]
pub trait ContractTransmitter: Send + Sync {
    async fn transmit(
        &self,
        _ctx: &CallContext,
        _config_digest: Bytes32,
        _seq_nr: u64,
        _report: &ReportWithInfo,
        _signatures: &[AttributedSignature],
    ) -> CapabilityResult<()> {
        unimplemented("ContractTransmitter.Transmit")
    }

    /// Account the transmitter sends from.
    async fn from_account(&self, _ctx: &CallContext) -> CapabilityResult<String> {
        unimplemented("ContractTransmitter.FromAccount")
    }
}

/// The codec capabilities of a provider, as one injectable record.
#[derive(Clone)]
pub struct Codec {
    pub commit: Arc<dyn CommitPluginCodec>,
    pub execute: Arc<dyn ExecutePluginCodec>,
    pub token_data: Arc<dyn TokenDataEncoder>,
    pub address: Arc<dyn AddressCodec>,
    pub extra_data: Arc<dyn ExtraDataCodec>,
}

/// A composite capability: chain access, codecs and transmission behind one
/// handle.
pub trait CcipProvider: Send + Sync {
    fn chain_accessor(&self) -> Arc<dyn ChainAccessor>;

    fn codec(&self) -> Codec;

    fn contract_transmitter(&self) -> Arc<dyn ContractTransmitter>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    struct Partial;

    #[async_trait]
    impl ChainAccessor for Partial {
        async fn get_latest_price_seq_nr(&self, _ctx: &CallContext) -> CapabilityResult<u64> {
            Ok(17)
        }
    }

    #[tokio::test]
    async fn test_missing_operations_are_unimplemented() {
        let ctx = CallContext::new();
        assert_eq!(Partial.get_latest_price_seq_nr(&ctx).await.unwrap(), 17);

        let err = Partial.get_contract_address(&ctx, "OffRamp").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unimplemented);
        assert_eq!(
            err,
            CapabilityError::Unimplemented("ChainAccessor.GetContractAddress".into())
        );
    }

    #[test]
    fn test_default_codec_operations() {
        struct NoCodec;
        #[async_trait]
        impl TokenDataEncoder for NoCodec {}
        #[async_trait]
        impl ExtraDataCodec for NoCodec {}

        let ctx = CallContext::new();
        let err = tokio_test::block_on(NoCodec.encode_usdc(&ctx, b"m", b"a")).unwrap_err();
        assert_eq!(err, CapabilityError::unimplemented("TokenDataEncoder.EncodeUSDC"));

        let err = tokio_test::block_on(NoCodec.decode_dest_exec_data(&ctx, &[], ChainSelector(1)))
            .unwrap_err();
        assert!(err.is_unimplemented());
    }
}
