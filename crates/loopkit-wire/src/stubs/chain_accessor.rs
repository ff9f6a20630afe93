//! ChainAccessor stub pair.
//!
//! The client half remembers every contract binding the peer accepted
//! through `sync`, and [`ChainAccessorClient::refresh`] replays them, e.g.
//! after the plugin process was restarted.

use super::{from_request, methods, unknown_method, CHAIN_ACCESSOR};
use crate::broker::Extension;
use crate::codec::{FromWire, ToWire};
use crate::frame::Status;
use crate::resync::SyncCache;
use crate::schema;
use crate::service::{decode_request, invoke, reply, Service};
use async_trait::async_trait;
use bytes::Bytes;
use loopkit_types::capability::ChainAccessor;
use loopkit_types::ccip::{ChainConfigSnapshot, ChainFeeComponents, Message, TimestampedBig};
use loopkit_types::primitives::{
    ChainSelector, SeqNum, SeqNumRange, UnknownAddress, UnknownEncodedAddress,
};
use loopkit_types::{CallContext, CapabilityError, CapabilityResult};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Client half of [`ChainAccessor`].
#[derive(Debug, Clone)]
pub struct ChainAccessorClient {
    ext: Extension,
    synced: SyncCache<String, UnknownAddress>,
}

impl ChainAccessorClient {
    pub fn new(ext: Extension) -> Self {
        Self {
            ext,
            synced: SyncCache::new(),
        }
    }

    pub fn extension(&self) -> &Extension {
        &self.ext
    }

    /// Bindings the peer has accepted, in contract-name order.
    pub fn synced(&self) -> Vec<(String, UnknownAddress)> {
        self.synced.snapshot()
    }

    pub fn synced_len(&self) -> usize {
        self.synced.len()
    }

    /// Replay every accepted binding to the peer.
    ///
    /// Each binding is attempted once. A failed binding is logged and the
    /// pass continues; the pass as a whole still succeeds. It stops early
    /// only when `ctx` is cancelled.
    pub async fn refresh(&self, ctx: &CallContext) -> CapabilityResult<()> {
        let entries = self.synced.snapshot();
        if entries.is_empty() {
            return Ok(());
        }

        debug!(
            extension = self.ext.name(),
            bindings = entries.len(),
            "loopkit: replaying contract bindings"
        );

        let mut failed = 0usize;
        for (contract_name, address) in entries {
            if ctx.is_cancelled() {
                return Err(CapabilityError::Cancelled.in_capability(self.ext.name()));
            }
            if let Err(e) = self.sync(ctx, &contract_name, address).await {
                if ctx.is_cancelled() {
                    return Err(e);
                }
                failed += 1;
                warn!(
                    extension = self.ext.name(),
                    contract = %contract_name,
                    error = %e,
                    "loopkit: failed to replay contract binding"
                );
            }
        }

        if failed > 0 {
            debug!(
                extension = self.ext.name(),
                failed, "loopkit: replay finished with failures"
            );
        }
        Ok(())
    }
}

#[async_trait]
impl ChainAccessor for ChainAccessorClient {
    async fn get_contract_address(
        &self,
        ctx: &CallContext,
        contract_name: &str,
    ) -> CapabilityResult<UnknownAddress> {
        let req = schema::GetContractAddressRequest {
            contract_name: contract_name.to_string(),
        };
        invoke(
            &self.ext,
            ctx,
            methods::GET_CONTRACT_ADDRESS,
            &req,
            |resp: schema::GetContractAddressResponse| UnknownAddress::from_wire(resp.address),
        )
        .await
    }

    async fn get_all_configs(&self, ctx: &CallContext) -> CapabilityResult<ChainConfigSnapshot> {
        invoke(
            &self.ext,
            ctx,
            methods::GET_ALL_CONFIGS,
            &schema::Empty {},
            |resp: schema::GetAllConfigsResponse| ChainConfigSnapshot::from_wire(resp.snapshot),
        )
        .await
    }

    async fn get_chain_fee_components(
        &self,
        ctx: &CallContext,
    ) -> CapabilityResult<BTreeMap<ChainSelector, ChainFeeComponents>> {
        invoke(
            &self.ext,
            ctx,
            methods::GET_CHAIN_FEE_COMPONENTS,
            &schema::Empty {},
            |resp: schema::GetChainFeeComponentsResponse| {
                resp.fee_components
                    .into_iter()
                    .map(|(chain, fees)| {
                        ChainFeeComponents::from_wire(fees).map(|fees| (ChainSelector(chain), fees))
                    })
                    .collect()
            },
        )
        .await
    }

    async fn next_seq_num(
        &self,
        ctx: &CallContext,
        sources: &[ChainSelector],
    ) -> CapabilityResult<BTreeMap<ChainSelector, SeqNum>> {
        let req = schema::NextSeqNumRequest {
            source_chain_selectors: sources.iter().map(|c| c.0).collect(),
        };
        invoke(
            &self.ext,
            ctx,
            methods::NEXT_SEQ_NUM,
            &req,
            |resp: schema::NextSeqNumResponse| {
                Ok(resp
                    .seq_nums
                    .into_iter()
                    .map(|(chain, seq)| (ChainSelector(chain), seq))
                    .collect())
            },
        )
        .await
    }

    async fn nonces(
        &self,
        ctx: &CallContext,
        addresses: &BTreeMap<ChainSelector, Vec<UnknownEncodedAddress>>,
    ) -> CapabilityResult<BTreeMap<ChainSelector, BTreeMap<UnknownEncodedAddress, u64>>> {
        let req = schema::NoncesRequest {
            addresses: addresses
                .iter()
                .map(|(chain, addrs)| {
                    (
                        chain.0,
                        schema::AddressList {
                            addresses: addrs.clone(),
                        },
                    )
                })
                .collect(),
        };
        invoke(
            &self.ext,
            ctx,
            methods::NONCES,
            &req,
            |resp: schema::NoncesResponse| {
                Ok(resp
                    .nonces
                    .into_iter()
                    .map(|(chain, map)| (ChainSelector(chain), map.nonces))
                    .collect())
            },
        )
        .await
    }

    async fn get_latest_price_seq_nr(&self, ctx: &CallContext) -> CapabilityResult<u64> {
        invoke(
            &self.ext,
            ctx,
            methods::GET_LATEST_PRICE_SEQ_NR,
            &schema::Empty {},
            |resp: schema::GetLatestPriceSeqNrResponse| Ok(resp.seq_nr),
        )
        .await
    }

    async fn get_fee_quoter_token_updates(
        &self,
        ctx: &CallContext,
        tokens: &[UnknownEncodedAddress],
        chain: ChainSelector,
    ) -> CapabilityResult<BTreeMap<UnknownEncodedAddress, TimestampedBig>> {
        let req = schema::GetFeeQuoterTokenUpdatesRequest {
            tokens: tokens.to_vec(),
            chain_selector: chain.0,
        };
        invoke(
            &self.ext,
            ctx,
            methods::GET_FEE_QUOTER_TOKEN_UPDATES,
            &req,
            |resp: schema::GetFeeQuoterTokenUpdatesResponse| {
                resp.token_updates
                    .into_iter()
                    .map(|(token, update)| {
                        TimestampedBig::from_wire(update).map(|update| (token, update))
                    })
                    .collect()
            },
        )
        .await
    }

    async fn msgs_between_seq_nums(
        &self,
        ctx: &CallContext,
        dest: ChainSelector,
        range: SeqNumRange,
    ) -> CapabilityResult<Vec<Message>> {
        let req = schema::MsgsBetweenSeqNumsRequest {
            dest_chain_selector: dest.0,
            seq_num_range: range.to_wire(),
        };
        invoke(
            &self.ext,
            ctx,
            methods::MSGS_BETWEEN_SEQ_NUMS,
            &req,
            |resp: schema::MsgsBetweenSeqNumsResponse| Vec::from_wire(resp.messages),
        )
        .await
    }

    /// Bind the contract on the peer, then record the binding for replay.
    /// Nothing is recorded unless the peer accepted it.
    async fn sync(
        &self,
        ctx: &CallContext,
        contract_name: &str,
        address: UnknownAddress,
    ) -> CapabilityResult<()> {
        let req = schema::SyncRequest {
            contract_name: contract_name.to_string(),
            contract_address: address.to_wire(),
        };
        invoke(
            &self.ext,
            ctx,
            methods::SYNC,
            &req,
            |_: schema::Empty| Ok(()),
        )
        .await?;
        self.synced.record(contract_name.to_string(), address);
        Ok(())
    }
}

/// Server half of [`ChainAccessor`].
pub struct ChainAccessorServer {
    inner: Arc<dyn ChainAccessor>,
}

impl ChainAccessorServer {
    pub fn new(inner: Arc<dyn ChainAccessor>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Service for ChainAccessorServer {
    async fn call(
        &self,
        ctx: &CallContext,
        method: &str,
        payload: Bytes,
    ) -> Result<Bytes, Status> {
        match method {
            methods::GET_CONTRACT_ADDRESS => {
                let req: schema::GetContractAddressRequest = decode_request(&payload)?;
                let result = self.inner.get_contract_address(ctx, &req.contract_name).await;
                reply(result.map(|address| schema::GetContractAddressResponse {
                    address: address.to_wire(),
                }))
            }
            methods::GET_ALL_CONFIGS => {
                let _: schema::Empty = decode_request(&payload)?;
                let result = self.inner.get_all_configs(ctx).await;
                reply(result.map(|snapshot| schema::GetAllConfigsResponse {
                    snapshot: snapshot.to_wire(),
                }))
            }
            methods::GET_CHAIN_FEE_COMPONENTS => {
                let _: schema::Empty = decode_request(&payload)?;
                let result = self.inner.get_chain_fee_components(ctx).await;
                reply(result.map(|fees| schema::GetChainFeeComponentsResponse {
                    fee_components: fees
                        .iter()
                        .map(|(chain, fee)| (chain.0, fee.to_wire()))
                        .collect(),
                }))
            }
            methods::NEXT_SEQ_NUM => {
                let req: schema::NextSeqNumRequest = decode_request(&payload)?;
                let sources: Vec<ChainSelector> = req
                    .source_chain_selectors
                    .into_iter()
                    .map(ChainSelector)
                    .collect();
                let result = self.inner.next_seq_num(ctx, &sources).await;
                reply(result.map(|seq_nums| schema::NextSeqNumResponse {
                    seq_nums: seq_nums
                        .into_iter()
                        .map(|(chain, seq)| (chain.0, seq))
                        .collect(),
                }))
            }
            methods::NONCES => {
                let req: schema::NoncesRequest = decode_request(&payload)?;
                let addresses = req
                    .addresses
                    .into_iter()
                    .map(|(chain, list)| (ChainSelector(chain), list.addresses))
                    .collect();
                let result = self.inner.nonces(ctx, &addresses).await;
                reply(result.map(|nonces| schema::NoncesResponse {
                    nonces: nonces
                        .into_iter()
                        .map(|(chain, nonces)| (chain.0, schema::NonceMap { nonces }))
                        .collect(),
                }))
            }
            methods::GET_LATEST_PRICE_SEQ_NR => {
                let _: schema::Empty = decode_request(&payload)?;
                let result = self.inner.get_latest_price_seq_nr(ctx).await;
                reply(result.map(|seq_nr| schema::GetLatestPriceSeqNrResponse { seq_nr }))
            }
            methods::GET_FEE_QUOTER_TOKEN_UPDATES => {
                let req: schema::GetFeeQuoterTokenUpdatesRequest = decode_request(&payload)?;
                let result = self
                    .inner
                    .get_fee_quoter_token_updates(ctx, &req.tokens, ChainSelector(req.chain_selector))
                    .await;
                reply(result.map(|updates| schema::GetFeeQuoterTokenUpdatesResponse {
                    token_updates: updates
                        .iter()
                        .map(|(token, update)| (token.clone(), update.to_wire()))
                        .collect(),
                }))
            }
            methods::MSGS_BETWEEN_SEQ_NUMS => {
                let req: schema::MsgsBetweenSeqNumsRequest = decode_request(&payload)?;
                let range: SeqNumRange = from_request(req.seq_num_range)?;
                let result = self
                    .inner
                    .msgs_between_seq_nums(ctx, ChainSelector(req.dest_chain_selector), range)
                    .await;
                reply(result.map(|messages| schema::MsgsBetweenSeqNumsResponse {
                    messages: messages.to_wire(),
                }))
            }
            methods::SYNC => {
                let req: schema::SyncRequest = decode_request(&payload)?;
                let address: UnknownAddress = from_request(req.contract_address)?;
                let result = self.inner.sync(ctx, &req.contract_name, address).await;
                reply(result.map(|()| schema::Empty {}))
            }
            other => Err(unknown_method(CHAIN_ACCESSOR, other)),
        }
    }
}
