//! The CCIP provider: one handle over seven named sub-capabilities.
//!
//! [`CcipProviderClient`] asks the broker for one extension per
//! sub-capability and wraps each in its client half. Construction is local
//! bookkeeping only; nothing is sent until an operation is called. The
//! provider forwards every operation to the owning sub-capability and adds
//! no behaviour of its own.

use crate::broker::Broker;
use crate::service::Service;
use crate::stubs::*;
use loopkit_types::capability::{CcipProvider, ChainAccessor, Codec, ContractTransmitter};
use loopkit_types::CapabilityResult;
use std::sync::Arc;
use tracing::{info, warn};

/// Client half of [`CcipProvider`].
#[derive(Clone)]
pub struct CcipProviderClient {
    chain_accessor: Arc<ChainAccessorClient>,
    codec: Codec,
    contract_transmitter: Arc<ContractTransmitterClient>,
}

impl CcipProviderClient {
    /// Resolve every sub-capability under its plain endpoint name.
    pub fn new(broker: &Broker) -> CapabilityResult<Self> {
        Self::resolve(broker, |name| name.to_string())
    }

    /// Resolve every sub-capability as `"<namespace>.<name>"`, so several
    /// providers can share one connection.
    pub fn with_namespace(broker: &Broker, namespace: &str) -> CapabilityResult<Self> {
        Self::resolve(broker, |name| namespaced(namespace, name))
    }

    fn resolve(broker: &Broker, name: impl Fn(&str) -> String) -> CapabilityResult<Self> {
        let codec = Codec {
            commit: Arc::new(CommitPluginCodecClient::new(
                broker.extend(&name(COMMIT_PLUGIN_CODEC))?,
            )),
            execute: Arc::new(ExecutePluginCodecClient::new(
                broker.extend(&name(EXECUTE_PLUGIN_CODEC))?,
            )),
            token_data: Arc::new(TokenDataEncoderClient::new(
                broker.extend(&name(TOKEN_DATA_ENCODER))?,
            )),
            address: Arc::new(AddressCodecClient::new(broker.extend(&name(ADDRESS_CODEC))?)),
            extra_data: Arc::new(ExtraDataCodecClient::new(
                broker.extend(&name(EXTRA_DATA_CODEC))?,
            )),
        };
        Ok(Self {
            chain_accessor: Arc::new(ChainAccessorClient::new(
                broker.extend(&name(CHAIN_ACCESSOR))?,
            )),
            codec,
            contract_transmitter: Arc::new(ContractTransmitterClient::new(
                broker.extend(&name(CONTRACT_TRANSMITTER))?,
            )),
        })
    }

    /// The chain accessor client, with access to its resync operations.
    pub fn chain_accessor_client(&self) -> &Arc<ChainAccessorClient> {
        &self.chain_accessor
    }
}

impl CcipProvider for CcipProviderClient {
    fn chain_accessor(&self) -> Arc<dyn ChainAccessor> {
        self.chain_accessor.clone()
    }

    fn codec(&self) -> Codec {
        self.codec.clone()
    }

    fn contract_transmitter(&self) -> Arc<dyn ContractTransmitter> {
        self.contract_transmitter.clone()
    }
}

/// Serve every sub-capability of `provider` under its plain endpoint name.
pub fn serve_ccip_provider(broker: &Broker, provider: Arc<dyn CcipProvider>) -> CapabilityResult<()> {
    serve_with(broker, provider, |name| name.to_string())
}

/// Serve every sub-capability of `provider` as `"<namespace>.<name>"`.
pub fn serve_ccip_provider_with_namespace(
    broker: &Broker,
    namespace: &str,
    provider: Arc<dyn CcipProvider>,
) -> CapabilityResult<()> {
    serve_with(broker, provider, |name| namespaced(namespace, name))
}

fn serve_with(
    broker: &Broker,
    provider: Arc<dyn CcipProvider>,
    name: impl Fn(&str) -> String,
) -> CapabilityResult<()> {
    let codec = provider.codec();
    let services: [(String, Arc<dyn Service>); 7] = [
        (
            name(CHAIN_ACCESSOR),
            Arc::new(ChainAccessorServer::new(provider.chain_accessor())),
        ),
        (
            name(COMMIT_PLUGIN_CODEC),
            Arc::new(CommitPluginCodecServer::new(codec.commit)),
        ),
        (
            name(EXECUTE_PLUGIN_CODEC),
            Arc::new(ExecutePluginCodecServer::new(codec.execute)),
        ),
        (
            name(TOKEN_DATA_ENCODER),
            Arc::new(TokenDataEncoderServer::new(codec.token_data)),
        ),
        (
            name(ADDRESS_CODEC),
            Arc::new(AddressCodecServer::new(codec.address)),
        ),
        (
            name(EXTRA_DATA_CODEC),
            Arc::new(ExtraDataCodecServer::new(codec.extra_data)),
        ),
        (
            name(CONTRACT_TRANSMITTER),
            Arc::new(ContractTransmitterServer::new(provider.contract_transmitter())),
        ),
    ];

    // All or nothing: a name clash withdraws the endpoints served so far.
    let mut served: Vec<String> = Vec::with_capacity(services.len());
    for (endpoint, service) in services {
        if let Err(e) = broker.serve(&endpoint, service) {
            for done in &served {
                broker.unserve(done);
            }
            warn!(
                conn = %broker.connection().id(),
                endpoint = %endpoint,
                error = %e,
                "loopkit: CCIP provider not served"
            );
            return Err(e);
        }
        served.push(endpoint);
    }
    info!(
        conn = %broker.connection().id(),
        "loopkit: CCIP provider served"
    );
    Ok(())
}

fn namespaced(namespace: &str, name: &str) -> String {
    format!("{namespace}.{name}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransportConfig;
    use crate::conn::Connection;
    use async_trait::async_trait;
    use loopkit_types::capability::{
        AddressCodec, CommitPluginCodec, ExecutePluginCodec, ExtraDataCodec, TokenDataEncoder,
    };
    use loopkit_types::CapabilityError;

    #[tokio::test]
    async fn test_construction_is_local() {
        let (a, _b) = Connection::duplex_pair(&TransportConfig::default());
        let broker = Broker::new(a);
        CcipProviderClient::new(&broker).unwrap();
        CcipProviderClient::with_namespace(&broker, "evm").unwrap();

        let names = broker.extension_names();
        assert_eq!(names.len(), 14);
        assert!(names.contains(&"ChainAccessor".to_string()));
        assert!(names.contains(&"evm.ChainAccessor".to_string()));
    }

    struct Absent;

    #[async_trait]
    impl ChainAccessor for Absent {}
    #[async_trait]
    impl CommitPluginCodec for Absent {}
    #[async_trait]
    impl ExecutePluginCodec for Absent {}
    #[async_trait]
    impl TokenDataEncoder for Absent {}
    #[async_trait]
    impl AddressCodec for Absent {}
    #[async_trait]
    impl ExtraDataCodec for Absent {}
    #[async_trait]
    impl ContractTransmitter for Absent {}

    impl CcipProvider for Absent {
        fn chain_accessor(&self) -> Arc<dyn ChainAccessor> {
            Arc::new(Absent)
        }

        fn codec(&self) -> Codec {
            Codec {
                commit: Arc::new(Absent),
                execute: Arc::new(Absent),
                token_data: Arc::new(Absent),
                address: Arc::new(Absent),
                extra_data: Arc::new(Absent),
            }
        }

        fn contract_transmitter(&self) -> Arc<dyn ContractTransmitter> {
            Arc::new(Absent)
        }
    }

    #[tokio::test]
    async fn test_name_clash_serves_nothing() {
        let (_a, b) = Connection::duplex_pair(&TransportConfig::default());
        let broker = Broker::new(b);
        broker
            .serve(ADDRESS_CODEC, Arc::new(AddressCodecServer::new(Arc::new(Absent))))
            .unwrap();

        let err = serve_ccip_provider(&broker, Arc::new(Absent)).unwrap_err();
        assert_eq!(err, CapabilityError::AlreadyRegistered(ADDRESS_CODEC.to_string()));
        assert_eq!(broker.connection().served_endpoints(), vec![ADDRESS_CODEC]);

        // Once the clash is gone the provider can be served in full.
        assert!(broker.unserve(ADDRESS_CODEC));
        serve_ccip_provider(&broker, Arc::new(Absent)).unwrap();
        assert_eq!(broker.connection().served_endpoints().len(), 7);
    }

    #[tokio::test]
    async fn test_construction_on_closed_connection_fails() {
        let (a, _b) = Connection::duplex_pair(&TransportConfig::default());
        a.close();
        let err = CcipProviderClient::new(&Broker::new(a)).err().unwrap();
        assert_eq!(err, CapabilityError::ConnectionClosed);
    }
}
