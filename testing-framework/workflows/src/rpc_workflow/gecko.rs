use async_trait::async_trait;
use gecko_client::{GeckoClient, StakeRequest, TxStatus, UserPass};
use testing_framework_core::scenario::DynError;
use tracing::debug;

use super::{Chain, StakingNode, TxRef, ValidationPeriod};

/// Key holding the genesis allocation of a local Gecko network.
pub const DEFAULT_GENESIS_PRIVATE_KEY: &str = "ewoqjP7PxY4yr3iLTpLisriqt94hdyDFNgchSxGGztUrTXtNN";

/// [`StakingNode`] backed by a Gecko node's JSON-RPC API.
#[derive(Clone)]
pub struct GeckoStakingNode {
    client: GeckoClient,
    genesis_private_key: String,
    delegation_fee_rate: u32,
    tx_fee: u64,
}

impl GeckoStakingNode {
    #[must_use]
    pub fn new(client: GeckoClient) -> Self {
        Self {
            client,
            genesis_private_key: DEFAULT_GENESIS_PRIVATE_KEY.to_owned(),
            delegation_fee_rate: 0,
            tx_fee: 0,
        }
    }

    #[must_use]
    pub fn with_genesis_private_key(mut self, key: impl Into<String>) -> Self {
        self.genesis_private_key = key.into();
        self
    }

    #[must_use]
    pub const fn with_delegation_fee_rate(mut self, rate: u32) -> Self {
        self.delegation_fee_rate = rate;
        self
    }

    #[must_use]
    pub const fn with_tx_fee(mut self, tx_fee: u64) -> Self {
        self.tx_fee = tx_fee;
        self
    }

    #[must_use]
    pub const fn client(&self) -> &GeckoClient {
        &self.client
    }

    async fn next_nonce(&self, account: &str) -> Result<u64, DynError> {
        Ok(self.client.platform().get_account(account).await?.next_nonce()?)
    }

    /// Signs an unsigned platform transaction with `account`'s key and issues it.
    async fn sign_and_issue(
        &self,
        user: &UserPass,
        unsigned_tx: &str,
        account: &str,
    ) -> Result<TxRef, DynError> {
        let platform = self.client.platform();
        let signed = platform.sign(user, unsigned_tx, account).await?;
        let id = platform.issue_tx(&signed).await?;
        Ok(TxRef::platform(id))
    }
}

#[async_trait]
impl StakingNode for GeckoStakingNode {
    async fn node_id(&self) -> Result<String, DynError> {
        Ok(self.client.admin().node_id().await?)
    }

    async fn create_account(&self, user: &UserPass) -> Result<String, DynError> {
        if !self.client.keystore().create_user(user).await? {
            return Err(format!("keystore refused to create user {}", user.username).into());
        }
        let funded = self
            .client
            .x_chain()
            .import_key(user, &self.genesis_private_key)
            .await?;
        debug!(user = %user.username, %funded, "imported genesis key");
        Ok(self.client.platform().create_account(user, None).await?)
    }

    async fn export_to_platform(
        &self,
        user: &UserPass,
        account: &str,
        amount: u64,
    ) -> Result<TxRef, DynError> {
        let id = self.client.x_chain().export_ava(user, amount, account).await?;
        Ok(TxRef::x_chain(id))
    }

    async fn import_to_platform(
        &self,
        user: &UserPass,
        account: &str,
    ) -> Result<TxRef, DynError> {
        let nonce = self.next_nonce(account).await?;
        let platform = self.client.platform();
        let signed = platform.import_ava(user, account, nonce).await?;
        Ok(TxRef::platform(platform.issue_tx(&signed).await?))
    }

    async fn add_validator(
        &self,
        user: &UserPass,
        account: &str,
        node_id: &str,
        period: &ValidationPeriod,
        stake: u64,
    ) -> Result<TxRef, DynError> {
        let request = StakeRequest {
            node_id,
            start_time: period.start_unix(),
            end_time: period.end_unix(),
            stake_amount: stake,
            payer_nonce: self.next_nonce(account).await?,
            destination: account,
        };
        let unsigned = self
            .client
            .platform()
            .add_default_subnet_validator(&request, self.delegation_fee_rate)
            .await?;
        self.sign_and_issue(user, &unsigned, account).await
    }

    async fn add_delegator(
        &self,
        user: &UserPass,
        account: &str,
        validator_id: &str,
        period: &ValidationPeriod,
        amount: u64,
    ) -> Result<TxRef, DynError> {
        let request = StakeRequest {
            node_id: validator_id,
            start_time: period.start_unix(),
            end_time: period.end_unix(),
            stake_amount: amount,
            payer_nonce: self.next_nonce(account).await?,
            destination: account,
        };
        let unsigned = self
            .client
            .platform()
            .add_default_subnet_delegator(&request)
            .await?;
        self.sign_and_issue(user, &unsigned, account).await
    }

    async fn tx_status(&self, tx: &TxRef) -> Result<TxStatus, DynError> {
        let status = match tx.chain {
            Chain::X => self.client.x_chain().get_tx_status(&tx.id).await?,
            Chain::P => self.client.platform().get_tx_status(&tx.id).await?,
        };
        Ok(status)
    }

    async fn validators(&self) -> Result<Vec<String>, DynError> {
        let platform = self.client.platform();
        let mut validators = platform.get_pending_validators(None).await?;
        validators.extend(platform.get_current_validators(None).await?);
        Ok(validators.into_iter().map(|validator| validator.id).collect())
    }

    async fn platform_balance(&self, account: &str) -> Result<u64, DynError> {
        Ok(self.client.platform().get_account(account).await?.balance)
    }

    fn tx_fee(&self) -> u64 {
        self.tx_fee
    }
}
