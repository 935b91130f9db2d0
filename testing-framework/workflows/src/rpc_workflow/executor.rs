use std::time::Duration;

use tracing::{debug, info};

use super::{
    poll::{wait_for_acceptance, PollSettings},
    NodeRole, Stage, StageError, StakingNode, TxRef, ValidationPeriod, WorkflowError,
};

const SEED_AMOUNT: u64 = 50_000_000_000_000;
const STAKE_AMOUNT: u64 = 30_000_000_000_000;
const DELEGATION_AMOUNT: u64 = 30_000_000_000_000;

/// Lead time before a staking period starts, so it is still in the future
/// when the transaction is decided.
const STAKING_START_DELAY: Duration = Duration::from_secs(30);
const STAKING_DURATION: Duration = Duration::from_secs(2 * 24 * 60 * 60);

/// Amounts moved by the workflow, in the chain's base unit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WorkflowParameters {
    pub seed_amount: u64,
    pub stake_amount: u64,
    pub delegation_amount: u64,
}

impl Default for WorkflowParameters {
    fn default() -> Self {
        Self {
            seed_amount: SEED_AMOUNT,
            stake_amount: STAKE_AMOUNT,
            delegation_amount: DELEGATION_AMOUNT,
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RoleState {
    pub account: Option<String>,
    /// Accepted transactions that paid a fee from `account`.
    pub fee_paying_txs: u64,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegisteredValidator {
    pub node_id: String,
    pub period: ValidationPeriod,
}

/// Everything one stage hands to the next.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WorkflowState {
    pub staker: RoleState,
    pub delegator: RoleState,
    pub validator: Option<RegisteredValidator>,
}

impl WorkflowState {
    #[must_use]
    pub const fn role(&self, role: NodeRole) -> &RoleState {
        match role {
            NodeRole::Staker => &self.staker,
            NodeRole::Delegator => &self.delegator,
        }
    }

    fn role_mut(&mut self, role: NodeRole) -> &mut RoleState {
        match role {
            NodeRole::Staker => &mut self.staker,
            NodeRole::Delegator => &mut self.delegator,
        }
    }

    fn account(&self, role: NodeRole) -> Result<String, StageError> {
        self.role(role)
            .account
            .clone()
            .ok_or(StageError::MissingPrerequisite(match role {
                NodeRole::Staker => "staker account",
                NodeRole::Delegator => "delegator account",
            }))
    }
}

/// Drives funding, staking and delegation through a staker and a delegator
/// node, then checks the resulting balances.
pub struct RpcWorkflowExecutor<N> {
    staker: N,
    delegator: N,
    parameters: WorkflowParameters,
    poll: PollSettings,
}

impl<N: StakingNode> RpcWorkflowExecutor<N> {
    /// `acceptance_timeout` bounds the wait for each issued transaction.
    #[must_use]
    pub fn new(staker: N, delegator: N, acceptance_timeout: Duration) -> Self {
        Self {
            staker,
            delegator,
            parameters: WorkflowParameters::default(),
            poll: PollSettings::new(acceptance_timeout),
        }
    }

    #[must_use]
    pub const fn with_parameters(mut self, parameters: WorkflowParameters) -> Self {
        self.parameters = parameters;
        self
    }

    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll.interval = interval;
        self
    }

    #[must_use]
    pub const fn parameters(&self) -> &WorkflowParameters {
        &self.parameters
    }

    #[must_use]
    pub const fn node(&self, role: NodeRole) -> &N {
        match role {
            NodeRole::Staker => &self.staker,
            NodeRole::Delegator => &self.delegator,
        }
    }

    pub async fn execute(&self) -> Result<(), WorkflowError> {
        self.resume(Stage::FIRST, WorkflowState::default())
            .await
            .map(|_| ())
    }

    /// Runs `first` and every later stage on top of `state`.
    pub async fn resume(
        &self,
        first: Stage,
        mut state: WorkflowState,
    ) -> Result<WorkflowState, WorkflowError> {
        let mut stage = Some(first);
        while let Some(current) = stage {
            info!(stage = %current, "starting stage");
            self.run_stage(current, &mut state)
                .await
                .map_err(|source| WorkflowError::new(current, source))?;
            stage = current.next();
        }
        info!("rpc workflow finished");
        Ok(state)
    }

    pub async fn run_stage(
        &self,
        stage: Stage,
        state: &mut WorkflowState,
    ) -> Result<(), StageError> {
        match stage {
            Stage::SeedFunds => self.seed_funds(NodeRole::Staker, state).await,
            Stage::Staking => self.add_validator(state).await,
            Stage::SeedDelegatorFunds => self.seed_funds(NodeRole::Delegator, state).await,
            Stage::Delegation => self.add_delegator(state).await,
            Stage::VerifyBalances => self.verify_balances(state).await,
        }
    }

    async fn await_acceptance(&self, role: NodeRole, tx: &TxRef) -> Result<(), StageError> {
        debug!(%role, %tx, "waiting for acceptance");
        wait_for_acceptance(self.node(role), tx, self.poll).await
    }

    async fn seed_funds(
        &self,
        role: NodeRole,
        state: &mut WorkflowState,
    ) -> Result<(), StageError> {
        let node = self.node(role);
        let user = role.credentials();

        let account = node
            .create_account(&user)
            .await
            .map_err(StageError::rpc("create account"))?;
        debug!(%role, %account, "created platform account");

        let export = node
            .export_to_platform(&user, &account, self.parameters.seed_amount)
            .await
            .map_err(StageError::rpc("export to platform"))?;
        self.await_acceptance(role, &export).await?;

        let import = node
            .import_to_platform(&user, &account)
            .await
            .map_err(StageError::rpc("import to platform"))?;
        self.await_acceptance(role, &import).await?;

        let role_state = state.role_mut(role);
        role_state.account = Some(account);
        role_state.fee_paying_txs += 1;
        Ok(())
    }

    async fn add_validator(&self, state: &mut WorkflowState) -> Result<(), StageError> {
        let account = state.account(NodeRole::Staker)?;
        let node_id = self
            .staker
            .node_id()
            .await
            .map_err(StageError::rpc("get node id"))?;
        let period = ValidationPeriod::starting_in(STAKING_START_DELAY, STAKING_DURATION);

        let tx = self
            .staker
            .add_validator(
                &NodeRole::Staker.credentials(),
                &account,
                &node_id,
                &period,
                self.parameters.stake_amount,
            )
            .await
            .map_err(StageError::rpc("add validator"))?;
        self.await_acceptance(NodeRole::Staker, &tx).await?;
        state.staker.fee_paying_txs += 1;

        let validators = self
            .staker
            .validators()
            .await
            .map_err(StageError::rpc("list validators"))?;
        if !validators.contains(&node_id) {
            return Err(StageError::ValidatorNotRegistered { node_id });
        }

        info!(%node_id, "validator registered");
        state.validator = Some(RegisteredValidator { node_id, period });
        Ok(())
    }

    async fn add_delegator(&self, state: &mut WorkflowState) -> Result<(), StageError> {
        let account = state.account(NodeRole::Delegator)?;
        let validator = state
            .validator
            .as_ref()
            .ok_or(StageError::MissingPrerequisite("registered validator"))?;
        let period = validator.period.delegation_window(STAKING_START_DELAY);

        let tx = self
            .delegator
            .add_delegator(
                &NodeRole::Delegator.credentials(),
                &account,
                &validator.node_id,
                &period,
                self.parameters.delegation_amount,
            )
            .await
            .map_err(StageError::rpc("add delegator"))?;
        self.await_acceptance(NodeRole::Delegator, &tx).await?;
        state.delegator.fee_paying_txs += 1;
        Ok(())
    }

    async fn verify_balances(&self, state: &WorkflowState) -> Result<(), StageError> {
        for (role, amount) in [
            (NodeRole::Staker, self.parameters.stake_amount),
            (NodeRole::Delegator, self.parameters.delegation_amount),
        ] {
            let account = state.account(role)?;
            let actual = self
                .node(role)
                .platform_balance(&account)
                .await
                .map_err(StageError::rpc("get platform balance"))?;

            let max = self.parameters.seed_amount.saturating_sub(amount);
            let fee_allowance = self
                .node(role)
                .tx_fee()
                .saturating_mul(state.role(role).fee_paying_txs);
            let min = max.saturating_sub(fee_allowance);
            if !(min..=max).contains(&actual) {
                return Err(StageError::UnexpectedBalance {
                    role,
                    account,
                    min,
                    max,
                    actual,
                });
            }
            debug!(%role, %account, actual, "balance as expected");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use super::*;
    use crate::rpc_workflow::fake::{FakeNode, FakeScript};

    const ACCEPTANCE_TIMEOUT: Duration = Duration::from_secs(90);

    fn executor(staker: FakeScript, delegator: FakeScript) -> RpcWorkflowExecutor<FakeNode> {
        RpcWorkflowExecutor::new(
            FakeNode::new("NodeID-staker", staker),
            FakeNode::new("NodeID-delegator", delegator),
            ACCEPTANCE_TIMEOUT,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn full_workflow_passes_and_stakes_funds() {
        let script = FakeScript {
            polls_until_accepted: 2,
            tx_fee: 1_000_000,
            ..FakeScript::default()
        };
        let executor = executor(script, script);

        let state = executor
            .resume(Stage::FIRST, WorkflowState::default())
            .await
            .unwrap();

        let staker_balance = executor
            .node(NodeRole::Staker)
            .platform_balance(state.staker.account.as_deref().unwrap())
            .await
            .unwrap();
        let delegator_balance = executor
            .node(NodeRole::Delegator)
            .platform_balance(state.delegator.account.as_deref().unwrap())
            .await
            .unwrap();
        assert_eq!(staker_balance, SEED_AMOUNT - STAKE_AMOUNT - 2_000_000);
        assert_eq!(delegator_balance, SEED_AMOUNT - DELEGATION_AMOUNT - 2_000_000);
        assert_eq!(state.validator.unwrap().node_id, "NodeID-staker");
        assert_eq!(state.staker.fee_paying_txs, 2);
        assert_eq!(state.delegator.fee_paying_txs, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn staking_transport_error_stops_before_delegation() {
        let executor = executor(
            FakeScript {
                fail_add_validator: true,
                ..FakeScript::default()
            },
            FakeScript::default(),
        );

        let err = executor.execute().await.unwrap_err();

        assert_eq!(err.stage(), Stage::Staking);
        assert!(matches!(
            err.stage_error(),
            StageError::Rpc { call: "add validator", .. }
        ));
        assert!(err.to_string().starts_with("staking stage failed"));
        assert!(executor.node(NodeRole::Delegator).calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn funding_never_accepted_times_out_in_seed_funds() {
        let executor = executor(
            FakeScript {
                stuck_exports: true,
                ..FakeScript::default()
            },
            FakeScript::default(),
        );
        let started = Instant::now();

        let err = executor.execute().await.unwrap_err();

        assert_eq!(err.stage(), Stage::SeedFunds);
        assert!(matches!(err.stage_error(), StageError::Timeout { .. }));
        assert!(err.to_string().starts_with("seed funds stage failed"));
        assert!(started.elapsed() < ACCEPTANCE_TIMEOUT + Duration::from_secs(1));
        assert_eq!(
            executor.node(NodeRole::Staker).calls(),
            ["create_account", "export_to_platform"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unregistered_validator_fails_staking() {
        let executor = executor(
            FakeScript {
                skip_validator_registration: true,
                ..FakeScript::default()
            },
            FakeScript::default(),
        );

        let err = executor.execute().await.unwrap_err();

        assert!(matches!(
            err.stage_error(),
            StageError::ValidatorNotRegistered { node_id } if node_id == "NodeID-staker"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn balance_outside_fee_allowance_is_reported() {
        let executor = executor(FakeScript::default(), FakeScript::default()).with_parameters(
            WorkflowParameters {
                seed_amount: 100,
                stake_amount: 40,
                delegation_amount: 40,
            },
        );
        let mut state = WorkflowState::default();
        for stage in [
            Stage::SeedFunds,
            Stage::Staking,
            Stage::SeedDelegatorFunds,
            Stage::Delegation,
        ] {
            executor.run_stage(stage, &mut state).await.unwrap();
        }
        let executor = executor.with_parameters(WorkflowParameters {
            seed_amount: 100,
            stake_amount: 40,
            delegation_amount: 50,
        });

        let err = executor
            .run_stage(Stage::VerifyBalances, &mut state)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StageError::UnexpectedBalance {
                role: NodeRole::Delegator,
                min: 50,
                max: 50,
                actual: 60,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn stages_refuse_to_run_out_of_order() {
        let executor = executor(FakeScript::default(), FakeScript::default());

        let err = executor
            .run_stage(Stage::Delegation, &mut WorkflowState::default())
            .await
            .unwrap_err();

        assert!(matches!(err, StageError::MissingPrerequisite("delegator account")));
        assert!(executor.node(NodeRole::Delegator).calls().is_empty());
    }
}
