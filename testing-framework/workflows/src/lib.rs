pub mod rpc_workflow;

pub use rpc_workflow::{RpcWorkflowExecutor, StakingNetworkRpcWorkflowTest};
use testing_framework_core::{config::RunnerConfig, scenario::GeckoTestSuite};

pub const STAKING_NETWORK_RPC_WORKFLOW: &str = "staking-network-rpc-workflow";

/// Every end-to-end test, configured for the network described by `config`.
#[must_use]
pub fn e2e_suite(config: &RunnerConfig) -> GeckoTestSuite {
    let mut rpc_workflow = StakingNetworkRpcWorkflowTest::new(&config.image_name);
    if let Some(key) = &config.genesis_private_key {
        rpc_workflow = rpc_workflow.with_genesis_private_key(key);
    }

    GeckoTestSuite::new().with_test(STAKING_NETWORK_RPC_WORKFLOW, rpc_workflow)
}
