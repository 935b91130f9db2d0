//! In-memory staking node for exercising the workflow without a network.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use gecko_client::{TxId, TxStatus, UserPass};
use testing_framework_core::scenario::DynError;

use super::{StakingNode, TxRef, ValidationPeriod};

#[derive(Clone, Copy, Debug, Default)]
pub struct FakeScript {
    /// Status queries answered with `Processing` before the outcome shows.
    pub polls_until_accepted: usize,
    pub fail_add_validator: bool,
    /// Exports stay `Processing` forever.
    pub stuck_exports: bool,
    /// Status queries never return.
    pub hang_status: bool,
    pub skip_validator_registration: bool,
    pub tx_fee: u64,
}

struct FakeTx {
    polls_left: usize,
    outcome: TxStatus,
}

#[derive(Default)]
struct Ledger {
    balances: HashMap<String, u64>,
    exported: HashMap<String, u64>,
    txs: HashMap<TxId, FakeTx>,
    validators: Vec<String>,
    calls: Vec<&'static str>,
    status_queries: usize,
    issued: u64,
}

pub struct FakeNode {
    node_id: String,
    script: FakeScript,
    ledger: Mutex<Ledger>,
}

impl FakeNode {
    pub fn new(node_id: &str, script: FakeScript) -> Self {
        Self {
            node_id: node_id.to_owned(),
            script,
            ledger: Mutex::default(),
        }
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap()
    }

    fn issue(&self, ledger: &mut Ledger, call: &'static str, outcome: TxStatus) -> TxId {
        ledger.calls.push(call);
        ledger.issued += 1;
        let id = TxId::new(format!("{}-tx-{}", self.node_id, ledger.issued));
        ledger.txs.insert(
            id.clone(),
            FakeTx {
                polls_left: self.script.polls_until_accepted,
                outcome,
            },
        );
        id
    }

    /// Registers a transaction that resolves to `outcome`.
    pub fn issue_test_tx(&self, outcome: TxStatus) -> TxRef {
        let mut ledger = self.ledger();
        TxRef::platform(self.issue(&mut ledger, "test", outcome))
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.ledger().calls.clone()
    }

    pub fn status_queries(&self) -> usize {
        self.ledger().status_queries
    }

    fn charge(&self, ledger: &mut Ledger, account: &str, amount: u64) -> Result<(), DynError> {
        let balance = ledger
            .balances
            .get_mut(account)
            .ok_or_else(|| format!("unknown account {account}"))?;
        *balance = balance
            .checked_sub(amount + self.script.tx_fee)
            .ok_or("insufficient funds")?;
        Ok(())
    }
}

#[async_trait]
impl StakingNode for FakeNode {
    async fn node_id(&self) -> Result<String, DynError> {
        self.ledger().calls.push("node_id");
        Ok(self.node_id.clone())
    }

    async fn create_account(&self, user: &UserPass) -> Result<String, DynError> {
        let mut ledger = self.ledger();
        ledger.calls.push("create_account");
        let account = format!("{}-account", user.username);
        ledger.balances.insert(account.clone(), 0);
        Ok(account)
    }

    async fn export_to_platform(
        &self,
        _user: &UserPass,
        account: &str,
        amount: u64,
    ) -> Result<TxRef, DynError> {
        let mut ledger = self.ledger();
        *ledger.exported.entry(account.to_owned()).or_default() += amount;
        let outcome = if self.script.stuck_exports {
            TxStatus::Processing
        } else {
            TxStatus::Accepted
        };
        Ok(TxRef::x_chain(self.issue(
            &mut ledger,
            "export_to_platform",
            outcome,
        )))
    }

    async fn import_to_platform(
        &self,
        _user: &UserPass,
        account: &str,
    ) -> Result<TxRef, DynError> {
        let mut ledger = self.ledger();
        let amount = ledger.exported.remove(account).unwrap_or_default();
        *ledger.balances.entry(account.to_owned()).or_default() += amount;
        self.charge(&mut ledger, account, 0)?;
        Ok(TxRef::platform(self.issue(
            &mut ledger,
            "import_to_platform",
            TxStatus::Accepted,
        )))
    }

    async fn add_validator(
        &self,
        _user: &UserPass,
        account: &str,
        node_id: &str,
        _period: &ValidationPeriod,
        stake: u64,
    ) -> Result<TxRef, DynError> {
        let mut ledger = self.ledger();
        if self.script.fail_add_validator {
            ledger.calls.push("add_validator");
            return Err("connection refused".into());
        }
        self.charge(&mut ledger, account, stake)?;
        if !self.script.skip_validator_registration {
            ledger.validators.push(node_id.to_owned());
        }
        Ok(TxRef::platform(self.issue(
            &mut ledger,
            "add_validator",
            TxStatus::Accepted,
        )))
    }

    async fn add_delegator(
        &self,
        _user: &UserPass,
        account: &str,
        _validator_id: &str,
        _period: &ValidationPeriod,
        amount: u64,
    ) -> Result<TxRef, DynError> {
        let mut ledger = self.ledger();
        self.charge(&mut ledger, account, amount)?;
        Ok(TxRef::platform(self.issue(
            &mut ledger,
            "add_delegator",
            TxStatus::Accepted,
        )))
    }

    async fn tx_status(&self, tx: &TxRef) -> Result<TxStatus, DynError> {
        if self.script.hang_status {
            self.ledger().status_queries += 1;
            std::future::pending::<()>().await;
        }
        let mut ledger = self.ledger();
        ledger.status_queries += 1;
        let fake = ledger
            .txs
            .get_mut(&tx.id)
            .ok_or_else(|| format!("unknown transaction {tx}"))?;
        if fake.polls_left > 0 {
            fake.polls_left -= 1;
            return Ok(TxStatus::Processing);
        }
        Ok(fake.outcome)
    }

    async fn validators(&self) -> Result<Vec<String>, DynError> {
        let mut ledger = self.ledger();
        ledger.calls.push("validators");
        Ok(ledger.validators.clone())
    }

    async fn platform_balance(&self, account: &str) -> Result<u64, DynError> {
        let mut ledger = self.ledger();
        ledger.calls.push("platform_balance");
        ledger
            .balances
            .get(account)
            .copied()
            .ok_or_else(|| format!("unknown account {account}").into())
    }

    fn tx_fee(&self) -> u64 {
        self.script.tx_fee
    }
}
