use std::time::Duration;

use testing_framework_core::scenario::DynError;
use thiserror::Error;

use super::{NodeRole, Stage, TxRef};

/// Acceptance ratios must lie in `(0, 1]`.
#[derive(Debug, Error, PartialEq)]
#[error("acceptance ratio {0} is outside (0, 1]")]
pub struct InvalidAcceptanceRatio(pub f64);

/// Terminal failure of the workflow, tagged with the stage it happened in.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct WorkflowError {
    stage: Stage,
    #[source]
    source: StageError,
}

impl WorkflowError {
    #[must_use]
    pub const fn new(stage: Stage, source: StageError) -> Self {
        Self { stage, source }
    }

    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub const fn stage_error(&self) -> &StageError {
        &self.source
    }
}

#[derive(Debug, Error)]
pub enum StageError {
    #[error("{call} failed: {source}")]
    Rpc {
        call: &'static str,
        #[source]
        source: DynError,
    },
    #[error("transaction {tx} was rejected")]
    Rejected { tx: TxRef },
    #[error("transaction {tx} was not accepted within {timeout:?}")]
    Timeout { tx: TxRef, timeout: Duration },
    #[error("node {node_id} is in neither the pending nor the current validator set")]
    ValidatorNotRegistered { node_id: String },
    #[error("{role} account {account} holds {actual}, expected between {min} and {max}")]
    UnexpectedBalance {
        role: NodeRole,
        account: String,
        min: u64,
        max: u64,
        actual: u64,
    },
    #[error("{0} is unknown, an earlier stage has not run")]
    MissingPrerequisite(&'static str),
}

impl StageError {
    /// Adapter for `map_err` on node calls.
    pub(crate) fn rpc(call: &'static str) -> impl FnOnce(DynError) -> Self {
        move |source| Self::Rpc { call, source }
    }
}
