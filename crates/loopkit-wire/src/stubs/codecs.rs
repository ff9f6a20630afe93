//! Stub pairs of the codec capabilities.

use super::{
    from_request, methods, unknown_method, ADDRESS_CODEC, COMMIT_PLUGIN_CODEC,
    EXECUTE_PLUGIN_CODEC, EXTRA_DATA_CODEC, TOKEN_DATA_ENCODER,
};
use crate::broker::Extension;
use crate::codec::{bytes_from_wire, bytes_to_wire, FromWire, ToWire};
use crate::frame::Status;
use crate::schema;
use crate::service::{decode_request, invoke, reply, Service};
use crate::value::{map_from_wire, map_to_wire};
use async_trait::async_trait;
use bytes::Bytes;
use loopkit_types::capability::{
    AddressCodec, CommitPluginCodec, ExecutePluginCodec, ExtraDataCodec, TokenDataEncoder,
};
use loopkit_types::ccip::{CommitPluginReport, ExecutePluginReport};
use loopkit_types::primitives::{ChainSelector, UnknownAddress};
use loopkit_types::value::ExtraValueMap;
use loopkit_types::{CallContext, CapabilityResult};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// AddressCodec
// ---------------------------------------------------------------------------

/// Client half of [`AddressCodec`].
#[derive(Debug, Clone)]
pub struct AddressCodecClient {
    ext: Extension,
}

impl AddressCodecClient {
    pub fn new(ext: Extension) -> Self {
        Self { ext }
    }
}

#[async_trait]
impl AddressCodec for AddressCodecClient {
    async fn address_bytes_to_string(
        &self,
        ctx: &CallContext,
        address: &UnknownAddress,
        chain: ChainSelector,
    ) -> CapabilityResult<String> {
        let req = schema::AddressBytesToStringRequest {
            address: address.to_wire(),
            chain_selector: chain.0,
        };
        invoke(
            &self.ext,
            ctx,
            methods::ADDRESS_BYTES_TO_STRING,
            &req,
            |resp: schema::AddressBytesToStringResponse| Ok(resp.address),
        )
        .await
    }

    async fn address_string_to_bytes(
        &self,
        ctx: &CallContext,
        address: &str,
        chain: ChainSelector,
    ) -> CapabilityResult<UnknownAddress> {
        let req = schema::AddressStringToBytesRequest {
            address: address.to_string(),
            chain_selector: chain.0,
        };
        invoke(
            &self.ext,
            ctx,
            methods::ADDRESS_STRING_TO_BYTES,
            &req,
            |resp: schema::AddressStringToBytesResponse| UnknownAddress::from_wire(resp.address),
        )
        .await
    }
}

/// Server half of [`AddressCodec`].
pub struct AddressCodecServer {
    inner: Arc<dyn AddressCodec>,
}

impl AddressCodecServer {
    pub fn new(inner: Arc<dyn AddressCodec>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Service for AddressCodecServer {
    async fn call(
        &self,
        ctx: &CallContext,
        method: &str,
        payload: Bytes,
    ) -> Result<Bytes, Status> {
        match method {
            methods::ADDRESS_BYTES_TO_STRING => {
                let req: schema::AddressBytesToStringRequest = decode_request(&payload)?;
                let address: UnknownAddress = from_request(req.address)?;
                let result = self
                    .inner
                    .address_bytes_to_string(ctx, &address, ChainSelector(req.chain_selector))
                    .await;
                reply(result.map(|address| schema::AddressBytesToStringResponse { address }))
            }
            methods::ADDRESS_STRING_TO_BYTES => {
                let req: schema::AddressStringToBytesRequest = decode_request(&payload)?;
                let result = self
                    .inner
                    .address_string_to_bytes(ctx, &req.address, ChainSelector(req.chain_selector))
                    .await;
                reply(result.map(|address| schema::AddressStringToBytesResponse {
                    address: address.to_wire(),
                }))
            }
            other => Err(unknown_method(ADDRESS_CODEC, other)),
        }
    }
}

// ---------------------------------------------------------------------------
// CommitPluginCodec
// ---------------------------------------------------------------------------

/// Client half of [`CommitPluginCodec`].
#[derive(Debug, Clone)]
pub struct CommitPluginCodecClient {
    ext: Extension,
}

impl CommitPluginCodecClient {
    pub fn new(ext: Extension) -> Self {
        Self { ext }
    }
}

#[async_trait]
impl CommitPluginCodec for CommitPluginCodecClient {
    async fn encode(
        &self,
        ctx: &CallContext,
        report: &CommitPluginReport,
    ) -> CapabilityResult<Vec<u8>> {
        let req = schema::EncodeCommitReportRequest {
            report: report.to_wire(),
        };
        invoke(
            &self.ext,
            ctx,
            methods::ENCODE,
            &req,
            |resp: schema::EncodedReport| Ok(bytes_from_wire(resp.encoded)),
        )
        .await
    }

    async fn decode(&self, ctx: &CallContext, encoded: &[u8]) -> CapabilityResult<CommitPluginReport> {
        let req = schema::EncodedReport {
            encoded: bytes_to_wire(encoded),
        };
        invoke(
            &self.ext,
            ctx,
            methods::DECODE,
            &req,
            |resp: schema::DecodeCommitReportResponse| CommitPluginReport::from_wire(resp.report),
        )
        .await
    }
}

/// Server half of [`CommitPluginCodec`].
pub struct CommitPluginCodecServer {
    inner: Arc<dyn CommitPluginCodec>,
}

impl CommitPluginCodecServer {
    pub fn new(inner: Arc<dyn CommitPluginCodec>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Service for CommitPluginCodecServer {
    async fn call(
        &self,
        ctx: &CallContext,
        method: &str,
        payload: Bytes,
    ) -> Result<Bytes, Status> {
        match method {
            methods::ENCODE => {
                let req: schema::EncodeCommitReportRequest = decode_request(&payload)?;
                let report: CommitPluginReport = from_request(req.report)?;
                let result = self.inner.encode(ctx, &report).await;
                reply(result.map(|encoded| schema::EncodedReport {
                    encoded: Bytes::from(encoded),
                }))
            }
            methods::DECODE => {
                let req: schema::EncodedReport = decode_request(&payload)?;
                let result = self.inner.decode(ctx, &req.encoded).await;
                reply(result.map(|report| schema::DecodeCommitReportResponse {
                    report: report.to_wire(),
                }))
            }
            other => Err(unknown_method(COMMIT_PLUGIN_CODEC, other)),
        }
    }
}

// ---------------------------------------------------------------------------
// ExecutePluginCodec
// ---------------------------------------------------------------------------

/// Client half of [`ExecutePluginCodec`].
#[derive(Debug, Clone)]
pub struct ExecutePluginCodecClient {
    ext: Extension,
}

impl ExecutePluginCodecClient {
    pub fn new(ext: Extension) -> Self {
        Self { ext }
    }
}

#[async_trait]
impl ExecutePluginCodec for ExecutePluginCodecClient {
    async fn encode(
        &self,
        ctx: &CallContext,
        report: &ExecutePluginReport,
    ) -> CapabilityResult<Vec<u8>> {
        let req = schema::EncodeExecuteReportRequest {
            report: report.to_wire(),
        };
        invoke(
            &self.ext,
            ctx,
            methods::ENCODE,
            &req,
            |resp: schema::EncodedReport| Ok(bytes_from_wire(resp.encoded)),
        )
        .await
    }

    async fn decode(
        &self,
        ctx: &CallContext,
        encoded: &[u8],
    ) -> CapabilityResult<ExecutePluginReport> {
        let req = schema::EncodedReport {
            encoded: bytes_to_wire(encoded),
        };
        invoke(
            &self.ext,
            ctx,
            methods::DECODE,
            &req,
            |resp: schema::DecodeExecuteReportResponse| ExecutePluginReport::from_wire(resp.report),
        )
        .await
    }
}

/// Server half of [`ExecutePluginCodec`].
pub struct ExecutePluginCodecServer {
    inner: Arc<dyn ExecutePluginCodec>,
}

impl ExecutePluginCodecServer {
    pub fn new(inner: Arc<dyn ExecutePluginCodec>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Service for ExecutePluginCodecServer {
    async fn call(
        &self,
        ctx: &CallContext,
        method: &str,
        payload: Bytes,
    ) -> Result<Bytes, Status> {
        match method {
            methods::ENCODE => {
                let req: schema::EncodeExecuteReportRequest = decode_request(&payload)?;
                let report: ExecutePluginReport = from_request(req.report)?;
                let result = self.inner.encode(ctx, &report).await;
                reply(result.map(|encoded| schema::EncodedReport {
                    encoded: Bytes::from(encoded),
                }))
            }
            methods::DECODE => {
                let req: schema::EncodedReport = decode_request(&payload)?;
                let result = self.inner.decode(ctx, &req.encoded).await;
                reply(result.map(|report| schema::DecodeExecuteReportResponse {
                    report: report.to_wire(),
                }))
            }
            other => Err(unknown_method(EXECUTE_PLUGIN_CODEC, other)),
        }
    }
}

// ---------------------------------------------------------------------------
// TokenDataEncoder
// ---------------------------------------------------------------------------

/// Client half of [`TokenDataEncoder`].
#[derive(Debug, Clone)]
pub struct TokenDataEncoderClient {
    ext: Extension,
}

impl TokenDataEncoderClient {
    pub fn new(ext: Extension) -> Self {
        Self { ext }
    }
}

#[async_trait]
impl TokenDataEncoder for TokenDataEncoderClient {
    async fn encode_usdc(
        &self,
        ctx: &CallContext,
        message: &[u8],
        attestation: &[u8],
    ) -> CapabilityResult<Vec<u8>> {
        let req = schema::EncodeUsdcRequest {
            message: bytes_to_wire(message),
            attestation: bytes_to_wire(attestation),
        };
        invoke(
            &self.ext,
            ctx,
            methods::ENCODE_USDC,
            &req,
            |resp: schema::EncodeUsdcResponse| Ok(bytes_from_wire(resp.token_data)),
        )
        .await
    }
}

/// Server half of [`TokenDataEncoder`].
pub struct TokenDataEncoderServer {
    inner: Arc<dyn TokenDataEncoder>,
}

impl TokenDataEncoderServer {
    pub fn new(inner: Arc<dyn TokenDataEncoder>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Service for TokenDataEncoderServer {
    async fn call(
        &self,
        ctx: &CallContext,
        method: &str,
        payload: Bytes,
    ) -> Result<Bytes, Status> {
        match method {
            methods::ENCODE_USDC => {
                let req: schema::EncodeUsdcRequest = decode_request(&payload)?;
                let result = self
                    .inner
                    .encode_usdc(ctx, &req.message, &req.attestation)
                    .await;
                reply(result.map(|token_data| schema::EncodeUsdcResponse {
                    token_data: Bytes::from(token_data),
                }))
            }
            other => Err(unknown_method(TOKEN_DATA_ENCODER, other)),
        }
    }
}

// ---------------------------------------------------------------------------
// ExtraDataCodec
// ---------------------------------------------------------------------------

/// Client half of [`ExtraDataCodec`].
#[derive(Debug, Clone)]
pub struct ExtraDataCodecClient {
    ext: Extension,
}

impl ExtraDataCodecClient {
    pub fn new(ext: Extension) -> Self {
        Self { ext }
    }
}

#[async_trait]
impl ExtraDataCodec for ExtraDataCodecClient {
    async fn decode_extra_args(
        &self,
        ctx: &CallContext,
        extra_args: &[u8],
        source_chain: ChainSelector,
    ) -> CapabilityResult<ExtraValueMap> {
        let req = schema::DecodeExtraArgsRequest {
            extra_args: bytes_to_wire(extra_args),
            source_chain_selector: source_chain.0,
        };
        invoke(
            &self.ext,
            ctx,
            methods::DECODE_EXTRA_ARGS,
            &req,
            |resp: schema::DecodedExtraData| map_from_wire(resp.decoded),
        )
        .await
    }

    async fn decode_dest_exec_data(
        &self,
        ctx: &CallContext,
        dest_exec_data: &[u8],
        dest_chain: ChainSelector,
    ) -> CapabilityResult<ExtraValueMap> {
        let req = schema::DecodeDestExecDataRequest {
            dest_exec_data: bytes_to_wire(dest_exec_data),
            dest_chain_selector: dest_chain.0,
        };
        invoke(
            &self.ext,
            ctx,
            methods::DECODE_DEST_EXEC_DATA,
            &req,
            |resp: schema::DecodedExtraData| map_from_wire(resp.decoded),
        )
        .await
    }
}

/// Server half of [`ExtraDataCodec`].
pub struct ExtraDataCodecServer {
    inner: Arc<dyn ExtraDataCodec>,
}

impl ExtraDataCodecServer {
    pub fn new(inner: Arc<dyn ExtraDataCodec>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Service for ExtraDataCodecServer {
    async fn call(
        &self,
        ctx: &CallContext,
        method: &str,
        payload: Bytes,
    ) -> Result<Bytes, Status> {
        match method {
            methods::DECODE_EXTRA_ARGS => {
                let req: schema::DecodeExtraArgsRequest = decode_request(&payload)?;
                let result = self
                    .inner
                    .decode_extra_args(ctx, &req.extra_args, ChainSelector(req.source_chain_selector))
                    .await;
                reply(result.map(|decoded| schema::DecodedExtraData {
                    decoded: map_to_wire(&decoded),
                }))
            }
            methods::DECODE_DEST_EXEC_DATA => {
                let req: schema::DecodeDestExecDataRequest = decode_request(&payload)?;
                let result = self
                    .inner
                    .decode_dest_exec_data(
                        ctx,
                        &req.dest_exec_data,
                        ChainSelector(req.dest_chain_selector),
                    )
                    .await;
                reply(result.map(|decoded| schema::DecodedExtraData {
                    decoded: map_to_wire(&decoded),
                }))
            }
            other => Err(unknown_method(EXTRA_DATA_CODEC, other)),
        }
    }
}
