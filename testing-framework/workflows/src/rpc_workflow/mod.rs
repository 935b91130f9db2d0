//! Staking and delegation workflow driven over JSON-RPC.

mod definition;
mod error;
mod executor;
#[cfg(test)]
mod fake;
mod gecko;
mod node;
mod poll;
mod stage;

pub use definition::StakingNetworkRpcWorkflowTest;
pub use error::{InvalidAcceptanceRatio, StageError, WorkflowError};
pub use executor::{
    RegisteredValidator, RoleState, RpcWorkflowExecutor, WorkflowParameters, WorkflowState,
};
pub use gecko::{GeckoStakingNode, DEFAULT_GENESIS_PRIVATE_KEY};
pub use node::{Chain, NodeRole, StakingNode, TxRef, ValidationPeriod};
pub use poll::{wait_for_acceptance, PollSettings, DEFAULT_POLL_INTERVAL};
pub use stage::Stage;
