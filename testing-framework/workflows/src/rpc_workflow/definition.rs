use std::time::Duration;

use async_trait::async_trait;
use testing_framework_core::{
    network::{GeckoNetwork, GeckoServiceConfig, LogLevel, NetworkError, NetworkLoader, ServiceId},
    scenario::{GeckoTest, TestContext},
};
use tracing::info;

use super::{
    error::InvalidAcceptanceRatio,
    gecko::{GeckoStakingNode, DEFAULT_GENESIS_PRIVATE_KEY},
    poll::DEFAULT_POLL_INTERVAL,
    RpcWorkflowExecutor,
};

const STAKER_SERVICE_ID: &str = "validator-node";
const DELEGATOR_SERVICE_ID: &str = "delegator-node";
const NORMAL_NODE_CONFIG_ID: &str = "normal-config";

const SNOW_QUORUM_SIZE: u32 = 2;
const SNOW_SAMPLE_SIZE: u32 = 2;

const EXECUTION_TIMEOUT: Duration = Duration::from_secs(5 * 60);
// Nodes come up one after another and each availability check settles for a
// second, so setup needs more room than the test itself.
const SETUP_BUFFER: Duration = Duration::from_secs(6 * 60);
const DEFAULT_ACCEPTANCE_RATIO: f64 = 0.3;

/// Funds, stakes and delegates across a validator and a delegator node on a
/// staking-enabled network.
#[derive(Clone, Debug)]
pub struct StakingNetworkRpcWorkflowTest {
    image_name: String,
    genesis_private_key: String,
    acceptance_ratio: f64,
    poll_interval: Duration,
}

impl StakingNetworkRpcWorkflowTest {
    #[must_use]
    pub fn new(image_name: impl Into<String>) -> Self {
        Self {
            image_name: image_name.into(),
            genesis_private_key: DEFAULT_GENESIS_PRIVATE_KEY.to_owned(),
            acceptance_ratio: DEFAULT_ACCEPTANCE_RATIO,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_genesis_private_key(mut self, key: impl Into<String>) -> Self {
        self.genesis_private_key = key.into();
        self
    }

    /// Share of the execution timeout each transaction may take to be accepted.
    pub fn with_acceptance_ratio(mut self, ratio: f64) -> Result<Self, InvalidAcceptanceRatio> {
        if ratio.is_nan() || ratio <= 0.0 || ratio > 1.0 {
            return Err(InvalidAcceptanceRatio(ratio));
        }
        self.acceptance_ratio = ratio;
        Ok(self)
    }

    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    #[must_use]
    pub fn image_name(&self) -> &str {
        &self.image_name
    }

    #[must_use]
    pub fn acceptance_timeout(&self) -> Duration {
        self.execution_timeout().mul_f64(self.acceptance_ratio)
    }

    fn staking_node(
        &self,
        network: &GeckoNetwork,
        service: &str,
    ) -> Result<GeckoStakingNode, NetworkError> {
        let client = network.gecko_client(&ServiceId::from(service))?;
        Ok(GeckoStakingNode::new(client).with_genesis_private_key(&self.genesis_private_key))
    }
}

#[async_trait]
impl GeckoTest for StakingNetworkRpcWorkflowTest {
    async fn run(&self, network: &GeckoNetwork, context: &TestContext) {
        let staker = match self.staking_node(network, STAKER_SERVICE_ID) {
            Ok(node) => node,
            Err(err) => return context.fatal(format!("could not get staker client: {err}")),
        };
        let delegator = match self.staking_node(network, DELEGATOR_SERVICE_ID) {
            Ok(node) => node,
            Err(err) => return context.fatal(format!("could not get delegator client: {err}")),
        };

        let acceptance_timeout = self.acceptance_timeout();
        info!(?acceptance_timeout, "starting rpc workflow");
        let executor = RpcWorkflowExecutor::new(staker, delegator, acceptance_timeout)
            .with_poll_interval(self.poll_interval);

        if let Err(err) = executor.execute().await {
            context.fatal(err);
        }
    }

    fn network_loader(&self) -> Result<NetworkLoader, NetworkError> {
        let normal_config = GeckoServiceConfig::new(true, LogLevel::Debug, &self.image_name)
            .with_snow_sizes(SNOW_QUORUM_SIZE, SNOW_SAMPLE_SIZE);

        NetworkLoader::builder(&self.image_name)
            .staking_enabled(true)
            .log_level(LogLevel::Debug)
            .snow_sizes(SNOW_QUORUM_SIZE, SNOW_SAMPLE_SIZE)
            .with_service_config(NORMAL_NODE_CONFIG_ID, normal_config)
            .with_service(STAKER_SERVICE_ID, NORMAL_NODE_CONFIG_ID)
            .with_service(DELEGATOR_SERVICE_ID, NORMAL_NODE_CONFIG_ID)
            .build()
    }

    fn execution_timeout(&self) -> Duration {
        EXECUTION_TIMEOUT
    }

    fn setup_buffer(&self) -> Duration {
        SETUP_BUFFER
    }
}

#[cfg(test)]
mod tests {
    use testing_framework_core::network::{ConfigurationId, GeckoService};

    use super::*;

    #[test]
    fn loader_declares_two_staking_nodes_sharing_one_config() {
        let loader = StakingNetworkRpcWorkflowTest::new("gecko:v0.5")
            .network_loader()
            .unwrap();

        let services: Vec<_> = loader
            .desired_services()
            .map(|(id, config)| (id.as_str(), config.clone()))
            .collect();
        assert_eq!(services.len(), 2);
        assert_eq!(services[0].0, "delegator-node");
        assert_eq!(services[1].0, "validator-node");
        let config = loader
            .service_config(&ConfigurationId::from("normal-config"))
            .unwrap();
        assert!(services.iter().all(|(_, service)| service == config));
        assert!(config.staking_enabled);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.image_name, "gecko:v0.5");
        assert_eq!((config.snow_quorum_size, config.snow_sample_size), (2, 2));
        assert!(config.additional_args.is_empty());
        assert!(loader.bootstrapper_config().staking_enabled);
    }

    #[test]
    fn acceptance_timeout_is_a_share_of_execution_timeout() {
        let test = StakingNetworkRpcWorkflowTest::new("gecko:v0.5");
        assert_eq!(test.execution_timeout(), Duration::from_secs(300));
        assert_eq!(test.setup_buffer(), Duration::from_secs(360));
        assert_eq!(test.acceptance_timeout(), Duration::from_secs(90));

        let test = test.with_acceptance_ratio(0.5).unwrap();
        assert_eq!(test.acceptance_timeout(), Duration::from_secs(150));
    }

    #[test]
    fn acceptance_ratio_outside_unit_interval_is_refused() {
        for ratio in [-0.3, 0.0, 1.5, f64::NAN, f64::INFINITY] {
            let err = StakingNetworkRpcWorkflowTest::new("gecko:v0.5")
                .with_acceptance_ratio(ratio)
                .unwrap_err();
            assert_eq!(err.0.to_bits(), ratio.to_bits());
        }

        let test = StakingNetworkRpcWorkflowTest::new("gecko:v0.5")
            .with_acceptance_ratio(1.0)
            .unwrap();
        assert_eq!(test.acceptance_timeout(), test.execution_timeout());
    }

    #[tokio::test]
    async fn missing_delegator_is_fatal() {
        let network = GeckoNetwork::new([GeckoService::new(
            "validator-node".into(),
            "127.0.0.1:9650".parse().unwrap(),
        )]);
        let context = TestContext::new("staking");

        StakingNetworkRpcWorkflowTest::new("gecko:v0.5")
            .run(&network, &context)
            .await;

        assert!(context.has_failed());
    }
}
