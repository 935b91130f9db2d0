use std::{fmt, time::Duration};

use async_trait::async_trait;
use gecko_client::{TxId, TxStatus, UserPass};
use testing_framework_core::scenario::DynError;
use time::OffsetDateTime;

const STAKER_USERNAME: &str = "staker";
const STAKER_PASSWORD: &str = "test34test!23";
const DELEGATOR_USERNAME: &str = "delegator";
const DELEGATOR_PASSWORD: &str = "test34test!23";

/// Part a node plays in the workflow.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum NodeRole {
    Staker,
    Delegator,
}

impl NodeRole {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Staker => "staker",
            Self::Delegator => "delegator",
        }
    }

    /// Keystore user the role acts as.
    #[must_use]
    pub fn credentials(self) -> UserPass {
        match self {
            Self::Staker => UserPass::new(STAKER_USERNAME, STAKER_PASSWORD),
            Self::Delegator => UserPass::new(DELEGATOR_USERNAME, DELEGATOR_PASSWORD),
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Chain {
    X,
    P,
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::X => "X",
            Self::P => "P",
        })
    }
}

/// An issued transaction and the chain its status has to be asked on.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TxRef {
    pub chain: Chain,
    pub id: TxId,
}

impl TxRef {
    #[must_use]
    pub const fn x_chain(id: TxId) -> Self {
        Self { chain: Chain::X, id }
    }

    #[must_use]
    pub const fn platform(id: TxId) -> Self {
        Self { chain: Chain::P, id }
    }
}

impl fmt::Display for TxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain, self.id)
    }
}

/// Window during which a validator or delegator stakes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ValidationPeriod {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
}

impl ValidationPeriod {
    /// Period starting `delay` from now and lasting `duration`.
    #[must_use]
    pub fn starting_in(delay: Duration, duration: Duration) -> Self {
        let start = OffsetDateTime::now_utc() + delay;
        Self {
            start,
            end: start + duration,
        }
    }

    /// Delegation window inside `self`: starts no earlier than `delay` from
    /// now and ends with the validator.
    #[must_use]
    pub fn delegation_window(&self, delay: Duration) -> Self {
        Self {
            start: self.start.max(OffsetDateTime::now_utc() + delay),
            end: self.end,
        }
    }

    #[must_use]
    pub fn start_unix(&self) -> u64 {
        u64::try_from(self.start.unix_timestamp()).unwrap_or_default()
    }

    #[must_use]
    pub fn end_unix(&self) -> u64 {
        u64::try_from(self.end.unix_timestamp()).unwrap_or_default()
    }
}

/// What the workflow needs from a node. Every call is one round trip (or a
/// short fixed sequence of them) against the node's JSON-RPC API.
#[async_trait]
pub trait StakingNode: Send + Sync {
    async fn node_id(&self) -> Result<String, DynError>;

    /// Creates the keystore user, gives it control of funded X-chain funds
    /// and returns a fresh platform account address owned by it.
    async fn create_account(&self, user: &UserPass) -> Result<String, DynError>;

    /// Moves `amount` from the user's X-chain funds towards `account`.
    async fn export_to_platform(
        &self,
        user: &UserPass,
        account: &str,
        amount: u64,
    ) -> Result<TxRef, DynError>;

    /// Credits previously exported funds to `account`.
    async fn import_to_platform(&self, user: &UserPass, account: &str)
        -> Result<TxRef, DynError>;

    async fn add_validator(
        &self,
        user: &UserPass,
        account: &str,
        node_id: &str,
        period: &ValidationPeriod,
        stake: u64,
    ) -> Result<TxRef, DynError>;

    async fn add_delegator(
        &self,
        user: &UserPass,
        account: &str,
        validator_id: &str,
        period: &ValidationPeriod,
        amount: u64,
    ) -> Result<TxRef, DynError>;

    async fn tx_status(&self, tx: &TxRef) -> Result<TxStatus, DynError>;

    /// Ids of the pending and current validators of the default subnet.
    async fn validators(&self) -> Result<Vec<String>, DynError>;

    async fn platform_balance(&self, account: &str) -> Result<u64, DynError>;

    /// Fee charged per fee-paying platform transaction.
    fn tx_fee(&self) -> u64;
}
