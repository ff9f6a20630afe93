//! ContractTransmitter stub pair.

use super::{from_request, methods, unknown_method, CONTRACT_TRANSMITTER};
use crate::broker::Extension;
use crate::codec::ToWire;
use crate::frame::Status;
use crate::schema;
use crate::service::{decode_request, invoke, reply, Service};
use async_trait::async_trait;
use bytes::Bytes;
use loopkit_types::capability::ContractTransmitter;
use loopkit_types::ccip::{AttributedSignature, ReportWithInfo};
use loopkit_types::primitives::Bytes32;
use loopkit_types::{CallContext, CapabilityResult};
use std::sync::Arc;

/// Client half of [`ContractTransmitter`].
#[derive(Debug, Clone)]
pub struct ContractTransmitterClient {
    ext: Extension,
}

impl ContractTransmitterClient {
    pub fn new(ext: Extension) -> Self {
        Self { ext }
    }
}

#[async_trait]
impl ContractTransmitter for ContractTransmitterClient {
    async fn transmit(
        &self,
        ctx: &CallContext,
        config_digest: Bytes32,
        seq_nr: u64,
        report: &ReportWithInfo,
        signatures: &[AttributedSignature],
    ) -> CapabilityResult<()> {
        let req = schema::TransmitRequest {
            config_digest: config_digest.to_wire(),
            seq_nr,
            report: report.to_wire(),
            signatures: signatures.iter().map(ToWire::to_wire).collect(),
        };
        invoke(
            &self.ext,
            ctx,
            methods::TRANSMIT,
            &req,
            |_: schema::Empty| Ok(()),
        )
        .await
    }

    async fn from_account(&self, ctx: &CallContext) -> CapabilityResult<String> {
        invoke(
            &self.ext,
            ctx,
            methods::FROM_ACCOUNT,
            &schema::Empty {},
            |resp: schema::FromAccountResponse| Ok(resp.account),
        )
        .await
    }
}

/// Server half of [`ContractTransmitter`].
pub struct ContractTransmitterServer {
    inner: Arc<dyn ContractTransmitter>,
}

impl ContractTransmitterServer {
    pub fn new(inner: Arc<dyn ContractTransmitter>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Service for ContractTransmitterServer {
    async fn call(
        &self,
        ctx: &CallContext,
        method: &str,
        payload: Bytes,
    ) -> Result<Bytes, Status> {
        match method {
            methods::TRANSMIT => {
                let req: schema::TransmitRequest = decode_request(&payload)?;
                let config_digest: Bytes32 = from_request(req.config_digest)?;
                let report: ReportWithInfo = from_request(req.report)?;
                let signatures: Vec<AttributedSignature> = from_request(req.signatures)?;
                let result = self
                    .inner
                    .transmit(ctx, config_digest, req.seq_nr, &report, &signatures)
                    .await;
                reply(result.map(|()| schema::Empty {}))
            }
            methods::FROM_ACCOUNT => {
                let _: schema::Empty = decode_request(&payload)?;
                let result = self.inner.from_account(ctx).await;
                reply(result.map(|account| schema::FromAccountResponse { account }))
            }
            other => Err(unknown_method(CONTRACT_TRANSMITTER, other)),
        }
    }
}
