//! Integration tests for the CCIP provider over a real connection.
//!
//! A fake provider is served on one end of an in-memory connection pair and
//! a `CcipProviderClient` is built on the other, so every call goes through
//! the full path: client half, wire codec, framing, connection, server half
//! and back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use loopkit_types::capability::*;
use loopkit_types::ccip::*;
use loopkit_types::primitives::*;
use loopkit_types::value::{ExtraValue, ExtraValueMap};
use loopkit_types::{CallContext, CapabilityError, CapabilityResult, ErrorCode, ErrorKind};
use loopkit_wire::config::TransportConfig;
use loopkit_wire::stubs::{ChainAccessorClient, CHAIN_ACCESSOR};
use loopkit_wire::{
    serve_ccip_provider, serve_ccip_provider_with_namespace, Broker, CcipProviderClient, Connection,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// Fake provider
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakeAccessor {
    /// Contract names whose sync is rejected.
    reject: Mutex<HashSet<String>>,
    /// Contract names whose sync never completes.
    hang: Mutex<HashSet<String>>,
    /// Every sync attempt, in arrival order.
    sync_attempts: Mutex<Vec<String>>,
    bound: Mutex<BTreeMap<String, UnknownAddress>>,
}

impl FakeAccessor {
    fn reject(&self, name: &str) {
        self.reject.lock().unwrap().insert(name.to_string());
    }

    fn accept(&self, name: &str) {
        self.reject.lock().unwrap().remove(name);
    }

    fn attempts(&self) -> Vec<String> {
        self.sync_attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainAccessor for FakeAccessor {
    async fn get_contract_address(
        &self,
        _ctx: &CallContext,
        contract_name: &str,
    ) -> CapabilityResult<UnknownAddress> {
        self.bound
            .lock()
            .unwrap()
            .get(contract_name)
            .cloned()
            .ok_or_else(|| {
                CapabilityError::remote(ErrorCode::NotFound, format!("{contract_name} not bound"))
            })
    }

    async fn get_all_configs(&self, _ctx: &CallContext) -> CapabilityResult<ChainConfigSnapshot> {
        Ok(ChainConfigSnapshot {
            offramp: OffRampConfig {
                static_config: OffRampStaticConfig {
                    chain_selector: ChainSelector(3478487238524512106),
                    gas_for_call_exact_check: u16::MAX,
                    ..Default::default()
                },
                ..Default::default()
            },
            fee_quoter: FeeQuoterStaticConfig {
                max_fee_juels_per_msg: BigInt::unset(),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    async fn get_chain_fee_components(
        &self,
        _ctx: &CallContext,
    ) -> CapabilityResult<BTreeMap<ChainSelector, ChainFeeComponents>> {
        Ok(BTreeMap::from([(
            ChainSelector(1),
            ChainFeeComponents {
                execution_fee: BigInt::from(0u64),
                data_availability_fee: BigInt::unset(),
            },
        )]))
    }

    async fn nonces(
        &self,
        _ctx: &CallContext,
        addresses: &BTreeMap<ChainSelector, Vec<UnknownEncodedAddress>>,
    ) -> CapabilityResult<BTreeMap<ChainSelector, BTreeMap<UnknownEncodedAddress, u64>>> {
        Ok(addresses
            .iter()
            .map(|(chain, addrs)| {
                (
                    *chain,
                    addrs.iter().map(|a| (a.clone(), a.len() as u64)).collect(),
                )
            })
            .collect())
    }

    async fn get_fee_quoter_token_updates(
        &self,
        _ctx: &CallContext,
        tokens: &[UnknownEncodedAddress],
        _chain: ChainSelector,
    ) -> CapabilityResult<BTreeMap<UnknownEncodedAddress, TimestampedBig>> {
        let at = DateTime::<Utc>::from_timestamp(1_700_000_000, 5).unwrap();
        Ok(tokens
            .iter()
            .map(|t| {
                (
                    t.clone(),
                    TimestampedBig {
                        timestamp: at,
                        value: BigInt::from(7u64),
                    },
                )
            })
            .collect())
    }

    async fn msgs_between_seq_nums(
        &self,
        _ctx: &CallContext,
        dest: ChainSelector,
        range: SeqNumRange,
    ) -> CapabilityResult<Vec<Message>> {
        if range.is_empty() {
            return Ok(Vec::new());
        }
        Ok((range.start()..=range.end())
            .map(|seq| Message {
                header: RampMessageHeader {
                    dest_chain_selector: dest,
                    sequence_number: seq,
                    ..Default::default()
                },
                ..Default::default()
            })
            .collect())
    }

    async fn sync(
        &self,
        _ctx: &CallContext,
        contract_name: &str,
        address: UnknownAddress,
    ) -> CapabilityResult<()> {
        self.sync_attempts
            .lock()
            .unwrap()
            .push(contract_name.to_string());
        let hang = self.hang.lock().unwrap().contains(contract_name);
        if hang {
            std::future::pending::<()>().await;
        }
        let rejected = self.reject.lock().unwrap().contains(contract_name);
        if rejected {
            return Err(CapabilityError::remote(
                ErrorCode::Unavailable,
                format!("cannot bind {contract_name}"),
            ));
        }
        self.bound
            .lock()
            .unwrap()
            .insert(contract_name.to_string(), address);
        Ok(())
    }
}

/// Stores the last report it was asked to encode and hands it back on
/// decode.
#[derive(Default)]
struct FakeCodec {
    commit: Mutex<Option<CommitPluginReport>>,
    execute: Mutex<Option<ExecutePluginReport>>,
}

#[async_trait]
impl CommitPluginCodec for FakeCodec {
    async fn encode(
        &self,
        _ctx: &CallContext,
        report: &CommitPluginReport,
    ) -> CapabilityResult<Vec<u8>> {
        *self.commit.lock().unwrap() = Some(report.clone());
        Ok(b"commit".to_vec())
    }

    async fn decode(&self, _ctx: &CallContext, _encoded: &[u8]) -> CapabilityResult<CommitPluginReport> {
        Ok(self.commit.lock().unwrap().clone().unwrap_or_default())
    }
}

#[async_trait]
impl ExecutePluginCodec for FakeCodec {
    async fn encode(
        &self,
        _ctx: &CallContext,
        report: &ExecutePluginReport,
    ) -> CapabilityResult<Vec<u8>> {
        *self.execute.lock().unwrap() = Some(report.clone());
        Ok(b"execute".to_vec())
    }

    async fn decode(
        &self,
        _ctx: &CallContext,
        encoded: &[u8],
    ) -> CapabilityResult<ExecutePluginReport> {
        if encoded != b"execute" {
            return Err(CapabilityError::remote(
                ErrorCode::InvalidArgument,
                "not an execute report",
            ));
        }
        Ok(self.execute.lock().unwrap().clone().unwrap_or_default())
    }
}

#[async_trait]
impl TokenDataEncoder for FakeCodec {
    async fn encode_usdc(
        &self,
        _ctx: &CallContext,
        message: &[u8],
        attestation: &[u8],
    ) -> CapabilityResult<Vec<u8>> {
        Ok([message, attestation].concat())
    }
}

#[async_trait]
impl AddressCodec for FakeCodec {
    async fn address_bytes_to_string(
        &self,
        _ctx: &CallContext,
        address: &UnknownAddress,
        _chain: ChainSelector,
    ) -> CapabilityResult<String> {
        Ok(address.to_string())
    }

    async fn address_string_to_bytes(
        &self,
        _ctx: &CallContext,
        address: &str,
        _chain: ChainSelector,
    ) -> CapabilityResult<UnknownAddress> {
        let digits = address.trim_start_matches("0x");
        let bytes = (0..digits.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&digits[i..i + 2], 16))
            .collect::<Result<Vec<u8>, _>>()
            .map_err(|e| CapabilityError::remote(ErrorCode::InvalidArgument, e.to_string()))?;
        Ok(UnknownAddress::new(bytes))
    }
}

#[async_trait]
impl ExtraDataCodec for FakeCodec {
    async fn decode_extra_args(
        &self,
        _ctx: &CallContext,
        extra_args: &[u8],
        _source_chain: ChainSelector,
    ) -> CapabilityResult<ExtraValueMap> {
        Ok(ExtraValueMap::from([
            ("gasLimit".to_string(), ExtraValue::BigInt(BigInt::from(200_000u64))),
            ("allowOutOfOrderExecution".to_string(), ExtraValue::Bool(true)),
            ("raw".to_string(), ExtraValue::Bytes(extra_args.to_vec())),
            ("when".to_string(), ExtraValue::other(Utc::now().date_naive())),
        ]))
    }
}

#[derive(Default)]
struct FakeTransmitter {
    transmitted: Mutex<Vec<(Bytes32, u64, ReportWithInfo, Vec<AttributedSignature>)>>,
}

#[async_trait]
impl ContractTransmitter for FakeTransmitter {
    async fn transmit(
        &self,
        _ctx: &CallContext,
        config_digest: Bytes32,
        seq_nr: u64,
        report: &ReportWithInfo,
        signatures: &[AttributedSignature],
    ) -> CapabilityResult<()> {
        self.transmitted.lock().unwrap().push((
            config_digest,
            seq_nr,
            report.clone(),
            signatures.to_vec(),
        ));
        Ok(())
    }

    async fn from_account(&self, _ctx: &CallContext) -> CapabilityResult<String> {
        Ok("0xfeedface".to_string())
    }
}

#[derive(Default)]
struct FakeProvider {
    accessor: Arc<FakeAccessor>,
    codec: Arc<FakeCodec>,
    transmitter: Arc<FakeTransmitter>,
}

impl CcipProvider for FakeProvider {
    fn chain_accessor(&self) -> Arc<dyn ChainAccessor> {
        self.accessor.clone()
    }

    fn codec(&self) -> Codec {
        Codec {
            commit: self.codec.clone(),
            execute: self.codec.clone(),
            token_data: self.codec.clone(),
            address: self.codec.clone(),
            extra_data: self.codec.clone(),
        }
    }

    fn contract_transmitter(&self) -> Arc<dyn ContractTransmitter> {
        self.transmitter.clone()
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    host: Broker,
    plugin: Arc<FakeProvider>,
    client: CcipProviderClient,
}

fn setup() -> Harness {
    let (host_conn, plugin_conn) = Connection::duplex_pair(&TransportConfig::default());
    let plugin = Arc::new(FakeProvider::default());
    serve_ccip_provider(&Broker::new(plugin_conn), plugin.clone()).unwrap();

    let host = Broker::new(host_conn);
    let client = CcipProviderClient::new(&host).unwrap();
    Harness {
        host,
        plugin,
        client,
    }
}

fn message(seq: u64, fill: u8) -> Message {
    Message {
        header: RampMessageHeader {
            message_id: Bytes32([fill; 32]),
            source_chain_selector: ChainSelector(1),
            dest_chain_selector: ChainSelector(2),
            sequence_number: seq,
            nonce: seq,
            msg_hash: Bytes32([fill ^ 0xff; 32]),
            on_ramp: UnknownAddress::new(vec![fill; 20]),
            tx_hash: format!("0x{seq:064x}"),
        },
        sender: UnknownAddress::new(vec![1; 20]),
        data: Vec::new(),
        receiver: UnknownAddress::new(vec![2; 20]),
        extra_args: vec![0x18],
        fee_token: UnknownAddress::new(vec![3; 20]),
        fee_token_amount: BigInt::from(10u64),
        fee_value_juels: BigInt::from(0u64),
        token_amounts: vec![RampTokenAmount {
            amount: BigInt::unset(),
            ..Default::default()
        }],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_chain_accessor_through_provider() {
    let h = setup();
    let ctx = CallContext::new();
    let accessor = h.client.chain_accessor();

    let snapshot = accessor.get_all_configs(&ctx).await.unwrap();
    assert_eq!(snapshot.offramp.static_config.gas_for_call_exact_check, u16::MAX);
    assert!(snapshot.fee_quoter.max_fee_juels_per_msg.is_unset());

    let fees = accessor.get_chain_fee_components(&ctx).await.unwrap();
    let fee = &fees[&ChainSelector(1)];
    assert_eq!(fee.execution_fee, BigInt::from(0u64));
    assert!(fee.data_availability_fee.is_unset());

    let msgs = accessor
        .msgs_between_seq_nums(&ctx, ChainSelector(2), SeqNumRange::new(5, 7))
        .await
        .unwrap();
    let seqs: Vec<u64> = msgs.iter().map(|m| m.header.sequence_number).collect();
    assert_eq!(seqs, vec![5, 6, 7]);

    let none = accessor
        .msgs_between_seq_nums(&ctx, ChainSelector(2), SeqNumRange::new(7, 5))
        .await
        .unwrap();
    assert!(none.is_empty());

    let request = BTreeMap::from([(
        ChainSelector(9),
        vec!["0xabc".to_string(), "0xabcdef".to_string()],
    )]);
    let nonces = accessor.nonces(&ctx, &request).await.unwrap();
    assert_eq!(nonces[&ChainSelector(9)]["0xabcdef"], 8);

    let updates = accessor
        .get_fee_quoter_token_updates(&ctx, &["LINK".to_string()], ChainSelector(1))
        .await
        .unwrap();
    assert_eq!(updates["LINK"].timestamp.timestamp(), 1_700_000_000);
    assert_eq!(updates["LINK"].timestamp.timestamp_subsec_nanos(), 5);
}

#[tokio::test]
async fn test_execute_report_keeps_alignment_end_to_end() {
    let h = setup();
    let ctx = CallContext::new();
    let codec = h.client.codec().execute;

    let report = ExecutePluginReport {
        chain_reports: vec![
            ExecutePluginReportSingleChain {
                source_chain_selector: ChainSelector(1),
                messages: vec![message(1, 0x10), message(2, 0x20), message(3, 0x30)],
                offchain_token_data: vec![vec![], vec![b"attestation".to_vec()], vec![]],
                proofs: vec![Bytes32([4; 32])],
                proof_flag_bits: BigInt::from(5u64),
            },
            ExecutePluginReportSingleChain::default(),
        ],
    };

    let encoded = codec.encode(&ctx, &report).await.unwrap();
    assert_eq!(encoded, b"execute");
    // The server saw the same report the client sent.
    assert_eq!(h.plugin.codec.execute.lock().unwrap().as_ref(), Some(&report));

    let decoded = codec.decode(&ctx, &encoded).await.unwrap();
    assert_eq!(decoded, report);
    assert_eq!(decoded.chain_reports[0].offchain_token_data.len(), 3);
    assert!(decoded.chain_reports[1].offchain_token_data.is_empty());
}

#[tokio::test]
async fn test_commit_report_and_codecs_end_to_end() {
    let h = setup();
    let ctx = CallContext::new();
    let codec = h.client.codec();

    let report = CommitPluginReport {
        price_updates: PriceUpdates {
            token_price_updates: vec![TokenPrice {
                token_id: "0x514910771af9ca656af840dff83e8264ecf986ca".to_string(),
                price: BigInt::from(-5i64),
            }],
            gas_price_updates: Vec::new(),
        },
        rmn_signatures: vec![RmnEcdsaSignature {
            r: Bytes32([1; 32]),
            s: Bytes32([2; 32]),
        }],
        ..Default::default()
    };
    codec.commit.encode(&ctx, &report).await.unwrap();
    let decoded = codec.commit.decode(&ctx, b"commit").await.unwrap();
    // Only the magnitude survives the trip.
    assert_eq!(
        decoded.price_updates.token_price_updates[0].price,
        BigInt::from(5i64)
    );
    assert_eq!(decoded.rmn_signatures, report.rmn_signatures);

    let token_data = codec.token_data.encode_usdc(&ctx, b"msg", b"att").await.unwrap();
    assert_eq!(token_data, b"msgatt");

    let addr = UnknownAddress::new(vec![0xde, 0xad, 0xbe, 0xef]);
    let text = codec
        .address
        .address_bytes_to_string(&ctx, &addr, ChainSelector(1))
        .await
        .unwrap();
    assert_eq!(text, "0xdeadbeef");
    let back = codec
        .address
        .address_string_to_bytes(&ctx, &text, ChainSelector(1))
        .await
        .unwrap();
    assert_eq!(back, addr);

    let extra = codec
        .extra_data
        .decode_extra_args(&ctx, &[0x18, 0x1d], ChainSelector(1))
        .await
        .unwrap();
    assert_eq!(
        extra.get("gasLimit"),
        Some(&ExtraValue::BigInt(BigInt::from(200_000u64)))
    );
    assert_eq!(extra.get("raw"), Some(&ExtraValue::Bytes(vec![0x18, 0x1d])));
    // Kinds without a wire form arrive as text.
    assert!(matches!(extra.get("when"), Some(ExtraValue::Text(_))));

    let err = codec
        .extra_data
        .decode_dest_exec_data(&ctx, &[], ChainSelector(1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unimplemented);
}

#[tokio::test]
async fn test_transmitter_end_to_end() {
    let h = setup();
    let ctx = CallContext::new().with_metadata("trace-id", "t-42");
    let transmitter = h.client.contract_transmitter();

    let report = ReportWithInfo {
        report: b"report".to_vec(),
        info: Vec::new(),
    };
    let sigs = vec![
        AttributedSignature {
            signature: vec![1; 65],
            signer: 0,
        },
        AttributedSignature {
            signature: vec![2; 65],
            signer: u8::MAX,
        },
    ];
    transmitter
        .transmit(&ctx, Bytes32([9; 32]), 77, &report, &sigs)
        .await
        .unwrap();

    let seen = h.plugin.transmitter.transmitted.lock().unwrap().clone();
    assert_eq!(seen, vec![(Bytes32([9; 32]), 77, report, sigs)]);

    assert_eq!(transmitter.from_account(&ctx).await.unwrap(), "0xfeedface");
}

#[tokio::test]
async fn test_resync_scenario() {
    let h = setup();
    let ctx = CallContext::new();
    let accessor = h.client.chain_accessor_client();
    let fake = &h.plugin.accessor;
    let addr_a = UnknownAddress::new(vec![0xaa; 20]);
    let addr_b = UnknownAddress::new(vec![0xbb; 20]);

    // A rejected sync is not remembered.
    fake.reject("c1");
    let err = accessor.sync(&ctx, "c1", addr_a.clone()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Remote);
    assert_eq!(accessor.synced_len(), 0);
    accessor.refresh(&ctx).await.unwrap();
    assert_eq!(fake.attempts(), vec!["c1"]);

    // An accepted one is replayed exactly once per refresh.
    fake.accept("c1");
    accessor.sync(&ctx, "c1", addr_a.clone()).await.unwrap();
    assert_eq!(accessor.synced(), vec![("c1".to_string(), addr_a.clone())]);
    accessor.refresh(&ctx).await.unwrap();
    assert_eq!(fake.attempts(), vec!["c1", "c1", "c1"]);

    // A binding that fails on replay does not abort the pass.
    accessor.sync(&ctx, "c2", addr_b.clone()).await.unwrap();
    fake.reject("c2");
    accessor.refresh(&ctx).await.unwrap();
    assert_eq!(fake.attempts()[4..], ["c1", "c2"]);
    assert_eq!(accessor.synced_len(), 2);
    assert_eq!(
        accessor.get_contract_address(&ctx, "c2").await.unwrap(),
        addr_b
    );
}

#[tokio::test]
async fn test_cancelled_sync_leaves_cache_untouched() {
    let h = setup();
    let accessor = h.client.chain_accessor_client();
    h.plugin.accessor.hang.lock().unwrap().insert("OffRamp".to_string());

    let token = CancellationToken::new();
    let ctx = CallContext::new().with_cancellation(token.clone());
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let err = accessor
        .sync(&ctx, "OffRamp", UnknownAddress::new(vec![1; 20]))
        .await
        .unwrap_err();
    canceller.await.unwrap();

    assert_eq!(err.root(), &CapabilityError::Cancelled);
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(accessor.synced_len(), 0);
}

#[tokio::test]
async fn test_deadline_leaves_cache_untouched() {
    let h = setup();
    let accessor = h.client.chain_accessor_client();
    h.plugin.accessor.hang.lock().unwrap().insert("OnRamp".to_string());

    let ctx = CallContext::new().with_timeout(Duration::from_millis(50));
    let err = accessor
        .sync(&ctx, "OnRamp", UnknownAddress::new(vec![1; 20]))
        .await
        .unwrap_err();
    assert_eq!(err.root(), &CapabilityError::DeadlineExceeded);
    assert_eq!(accessor.synced_len(), 0);
}

#[tokio::test]
async fn test_refresh_stops_when_cancelled() {
    let h = setup();
    let accessor = h.client.chain_accessor_client();
    let ctx = CallContext::new();
    accessor
        .sync(&ctx, "c1", UnknownAddress::new(vec![1]))
        .await
        .unwrap();

    let cancelled = CallContext::new();
    cancelled.cancel();
    let err = accessor.refresh(&cancelled).await.unwrap_err();
    assert_eq!(err.root(), &CapabilityError::Cancelled);
    assert_eq!(h.plugin.accessor.attempts(), vec!["c1"]);
}

#[tokio::test]
async fn test_extensions_with_same_name_reach_same_endpoint() {
    let h = setup();
    let ctx = CallContext::new();
    h.client
        .chain_accessor()
        .sync(&ctx, "OffRamp", UnknownAddress::new(vec![7; 20]))
        .await
        .unwrap();

    let first = ChainAccessorClient::new(h.host.extend(CHAIN_ACCESSOR).unwrap());
    let second = ChainAccessorClient::new(h.host.extend(CHAIN_ACCESSOR).unwrap());
    assert!(first.extension().same_endpoint(second.extension()));

    let a = first.get_contract_address(&ctx, "OffRamp").await.unwrap();
    let b = second.get_contract_address(&ctx, "OffRamp").await.unwrap();
    assert_eq!(a, b);
    assert_eq!(a, UnknownAddress::new(vec![7; 20]));
}

#[tokio::test]
async fn test_unimplemented_is_distinct_from_remote_failure() {
    let h = setup();
    let ctx = CallContext::new();
    let accessor = h.client.chain_accessor();

    let unimplemented = accessor.get_latest_price_seq_nr(&ctx).await.unwrap_err();
    assert_eq!(unimplemented.kind(), ErrorKind::Unimplemented);
    assert!(unimplemented.is_unimplemented());

    let failed = accessor
        .get_contract_address(&ctx, "Unbound")
        .await
        .unwrap_err();
    assert_eq!(failed.kind(), ErrorKind::Remote);
    assert!(!failed.is_unimplemented());
    assert_eq!(
        failed.root(),
        &CapabilityError::remote(ErrorCode::NotFound, "Unbound not bound")
    );
}

#[tokio::test]
async fn test_errors_name_the_failing_sub_capability() {
    let h = setup();
    let ctx = CallContext::new();

    let accessor_err = h
        .client
        .chain_accessor()
        .get_contract_address(&ctx, "Unbound")
        .await
        .unwrap_err();
    assert_eq!(accessor_err.capability_name(), Some("ChainAccessor"));
    assert!(accessor_err.to_string().starts_with("ChainAccessor: "));

    let codec_err = h
        .client
        .codec()
        .execute
        .decode(&ctx, b"garbage")
        .await
        .unwrap_err();
    assert_eq!(codec_err.capability_name(), Some("ExecutePluginCodec"));
    assert_eq!(codec_err.kind(), ErrorKind::Remote);
}

#[tokio::test]
async fn test_unserved_sub_capability_is_unimplemented() {
    let (host_conn, _plugin_conn) = Connection::duplex_pair(&TransportConfig::default());
    let client = CcipProviderClient::new(&Broker::new(host_conn)).unwrap();

    let err = client
        .contract_transmitter()
        .from_account(&CallContext::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unimplemented);
    assert_eq!(err.capability_name(), Some("ContractTransmitter"));
}

#[tokio::test]
async fn test_closed_connection_fails_every_sub_capability() {
    let h = setup();
    h.host.connection().close();
    let ctx = CallContext::new();

    let err = h.client.chain_accessor().get_all_configs(&ctx).await.unwrap_err();
    assert_eq!(err.root(), &CapabilityError::ConnectionClosed);
    let err = h
        .client
        .codec()
        .token_data
        .encode_usdc(&ctx, b"m", b"a")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);

    assert_eq!(
        h.host.extend(CHAIN_ACCESSOR).err(),
        Some(CapabilityError::ConnectionClosed)
    );
}

#[tokio::test]
async fn test_sub_capabilities_called_concurrently() {
    let h = setup();
    let calls = Arc::new(AtomicUsize::new(0));

    let mut tasks = Vec::new();
    for i in 0..16u64 {
        let accessor = h.client.chain_accessor();
        let codec = h.client.codec();
        let calls = calls.clone();
        tasks.push(tokio::spawn(async move {
            let ctx = CallContext::new();
            let msgs = accessor
                .msgs_between_seq_nums(&ctx, ChainSelector(1), SeqNumRange::new(i, i))
                .await
                .unwrap();
            assert_eq!(msgs[0].header.sequence_number, i);
            let data = codec
                .token_data
                .encode_usdc(&ctx, &i.to_be_bytes(), b"")
                .await
                .unwrap();
            assert_eq!(data, i.to_be_bytes());
            calls.fetch_add(1, Ordering::SeqCst);
        }));
    }
    for result in futures::future::join_all(tasks).await {
        result.unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 16);
}

#[tokio::test]
async fn test_namespaced_providers_share_one_connection() {
    let (host_conn, plugin_conn) = Connection::duplex_pair(&TransportConfig::default());
    let plugin_broker = Broker::new(plugin_conn);
    let evm = Arc::new(FakeProvider::default());
    let sol = Arc::new(FakeProvider::default());
    serve_ccip_provider_with_namespace(&plugin_broker, "evm", evm.clone()).unwrap();
    serve_ccip_provider_with_namespace(&plugin_broker, "sol", sol.clone()).unwrap();

    let host = Broker::new(host_conn);
    let evm_client = CcipProviderClient::with_namespace(&host, "evm").unwrap();
    let sol_client = CcipProviderClient::with_namespace(&host, "sol").unwrap();

    let ctx = CallContext::new();
    evm_client
        .chain_accessor()
        .sync(&ctx, "OffRamp", UnknownAddress::new(vec![1]))
        .await
        .unwrap();
    assert_eq!(evm.accessor.attempts(), vec!["OffRamp"]);
    assert!(sol.accessor.attempts().is_empty());

    let err = sol_client
        .chain_accessor()
        .get_contract_address(&ctx, "OffRamp")
        .await
        .unwrap_err();
    assert_eq!(err.capability_name(), Some("sol.ChainAccessor"));

    // Serving the same namespace twice is rejected.
    let again = serve_ccip_provider_with_namespace(&plugin_broker, "evm", evm);
    assert_eq!(again.unwrap_err().kind(), ErrorKind::Registration);
}

#[tokio::test]
async fn test_provider_over_tcp() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let plugin = Arc::new(FakeProvider::default());

    let served = plugin.clone();
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let broker = Broker::new(Connection::from_tcp(stream, &TransportConfig::default()));
        serve_ccip_provider(&broker, served).unwrap();
        broker
    });

    let stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    let host = Broker::new(Connection::from_tcp(stream, &TransportConfig::default()));
    let _plugin_broker = server.await.unwrap();
    let client = CcipProviderClient::new(&host).unwrap();

    let account = client
        .contract_transmitter()
        .from_account(&CallContext::new())
        .await
        .unwrap();
    assert_eq!(account, "0xfeedface");
}
