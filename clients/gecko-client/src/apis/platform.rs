use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::{
    paths,
    requester::{EndpointRequester, Transport},
    types::{FormattedTx, JsonAddress, JsonTxId, JsonTxStatus},
    Error, TxId, TxStatus, UserPass,
};

/// Platform chain account: balances are held per account and every spend
/// must carry the next nonce.
#[serde_as]
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub address: String,
    #[serde_as(as = "DisplayFromStr")]
    pub nonce: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub balance: u64,
}

impl Account {
    pub fn next_nonce(&self) -> Result<u64, Error> {
        self.nonce
            .checked_add(1)
            .ok_or_else(|| Error::NonceExhausted {
                address: self.address.clone(),
            })
    }
}

#[serde_as]
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validator {
    pub id: String,
    #[serde_as(as = "DisplayFromStr")]
    pub start_time: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub end_time: u64,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub stake_amount: Option<u64>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub weight: Option<u64>,
}

/// Staking window and stake of an add-validator or add-delegator request.
/// Times are unix seconds.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakeRequest<'a> {
    pub node_id: &'a str,
    pub start_time: u64,
    pub end_time: u64,
    pub stake_amount: u64,
    pub payer_nonce: u64,
    pub destination: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateAccountArgs<'a> {
    #[serde(flatten)]
    user: &'a UserPass,
    #[serde(skip_serializing_if = "Option::is_none")]
    private_key: Option<&'a str>,
}

#[derive(Deserialize)]
struct AccountList {
    accounts: Vec<Account>,
}

#[serde_as]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportAvaArgs<'a> {
    #[serde(flatten)]
    user: &'a UserPass,
    to: &'a str,
    #[serde_as(as = "DisplayFromStr")]
    payer_nonce: u64,
}

#[serde_as]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportAvaArgs<'a> {
    #[serde_as(as = "DisplayFromStr")]
    amount: u64,
    to: &'a str,
    #[serde_as(as = "DisplayFromStr")]
    payer_nonce: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnsignedTxReply {
    unsigned_tx: String,
}

#[derive(Serialize)]
struct SignArgs<'a> {
    #[serde(flatten)]
    user: &'a UserPass,
    tx: &'a str,
    signer: &'a str,
}

#[serde_as]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddValidatorArgs<'a> {
    id: &'a str,
    #[serde_as(as = "DisplayFromStr")]
    start_time: u64,
    #[serde_as(as = "DisplayFromStr")]
    end_time: u64,
    #[serde_as(as = "DisplayFromStr")]
    stake_amount: u64,
    #[serde_as(as = "DisplayFromStr")]
    payer_nonce: u64,
    destination: &'a str,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    delegation_fee_rate: Option<u32>,
}

impl<'a> AddValidatorArgs<'a> {
    const fn from_request(request: &StakeRequest<'a>, delegation_fee_rate: Option<u32>) -> Self {
        Self {
            id: request.node_id,
            start_time: request.start_time,
            end_time: request.end_time,
            stake_amount: request.stake_amount,
            payer_nonce: request.payer_nonce,
            destination: request.destination,
            delegation_fee_rate,
        }
    }
}

#[derive(Serialize)]
struct SubnetArgs<'a> {
    #[serde(rename = "subnetID", skip_serializing_if = "Option::is_none")]
    subnet_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct ValidatorList {
    validators: Vec<Validator>,
}

pub struct PlatformApi<'a> {
    requester: EndpointRequester<'a>,
}

impl<'a> PlatformApi<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self {
            requester: EndpointRequester::new(transport, paths::PLATFORM, "platform"),
        }
    }

    /// Creates an account controlled by the user. With `private_key` the
    /// account is derived from that key instead of a fresh one.
    pub async fn create_account(
        &self,
        user: &UserPass,
        private_key: Option<&str>,
    ) -> Result<String, Error> {
        let reply: JsonAddress = self
            .requester
            .send_request("createAccount", &CreateAccountArgs { user, private_key })
            .await?;
        Ok(reply.address)
    }

    pub async fn get_account(&self, address: &str) -> Result<Account, Error> {
        self.requester
            .send_request(
                "getAccount",
                &JsonAddress {
                    address: address.to_owned(),
                },
            )
            .await
    }

    pub async fn list_accounts(&self, user: &UserPass) -> Result<Vec<Account>, Error> {
        let reply: AccountList = self.requester.send_request("listAccounts", user).await?;
        Ok(reply.accounts)
    }

    /// Builds a signed transaction that moves funds exported from the
    /// X-chain into `to`. The result still has to be issued.
    pub async fn import_ava(
        &self,
        user: &UserPass,
        to: &str,
        payer_nonce: u64,
    ) -> Result<String, Error> {
        let reply: FormattedTx = self
            .requester
            .send_request(
                "importAVA",
                &ImportAvaArgs {
                    user,
                    to,
                    payer_nonce,
                },
            )
            .await?;
        Ok(reply.tx)
    }

    /// Builds an unsigned transfer of `amount` to the X-chain address `to`.
    pub async fn export_ava(
        &self,
        amount: u64,
        to: &str,
        payer_nonce: u64,
    ) -> Result<String, Error> {
        let reply: UnsignedTxReply = self
            .requester
            .send_request(
                "exportAVA",
                &ExportAvaArgs {
                    amount,
                    to,
                    payer_nonce,
                },
            )
            .await?;
        Ok(reply.unsigned_tx)
    }

    pub async fn sign(&self, user: &UserPass, tx: &str, signer: &str) -> Result<String, Error> {
        let reply: FormattedTx = self
            .requester
            .send_request("sign", &SignArgs { user, tx, signer })
            .await?;
        Ok(reply.tx)
    }

    pub async fn issue_tx(&self, tx: &str) -> Result<TxId, Error> {
        let reply: JsonTxId = self
            .requester
            .send_request("issueTx", &FormattedTx { tx: tx.to_owned() })
            .await?;
        Ok(reply.tx_id)
    }

    pub async fn get_tx_status(&self, tx_id: &TxId) -> Result<TxStatus, Error> {
        let reply: JsonTxStatus = self
            .requester
            .send_request(
                "getTxStatus",
                &JsonTxId {
                    tx_id: tx_id.clone(),
                },
            )
            .await?;
        Ok(reply.status)
    }

    /// Builds an unsigned add-validator transaction for the default subnet.
    pub async fn add_default_subnet_validator(
        &self,
        request: &StakeRequest<'_>,
        delegation_fee_rate: u32,
    ) -> Result<String, Error> {
        let reply: UnsignedTxReply = self
            .requester
            .send_request(
                "addDefaultSubnetValidator",
                &AddValidatorArgs::from_request(request, Some(delegation_fee_rate)),
            )
            .await?;
        Ok(reply.unsigned_tx)
    }

    /// Builds an unsigned add-delegator transaction. `request.node_id` is
    /// the validator being delegated to.
    pub async fn add_default_subnet_delegator(
        &self,
        request: &StakeRequest<'_>,
    ) -> Result<String, Error> {
        let reply: UnsignedTxReply = self
            .requester
            .send_request(
                "addDefaultSubnetDelegator",
                &AddValidatorArgs::from_request(request, None),
            )
            .await?;
        Ok(reply.unsigned_tx)
    }

    pub async fn get_current_validators(
        &self,
        subnet_id: Option<&str>,
    ) -> Result<Vec<Validator>, Error> {
        let reply: ValidatorList = self
            .requester
            .send_request("getCurrentValidators", &SubnetArgs { subnet_id })
            .await?;
        Ok(reply.validators)
    }

    pub async fn get_pending_validators(
        &self,
        subnet_id: Option<&str>,
    ) -> Result<Vec<Validator>, Error> {
        let reply: ValidatorList = self
            .requester
            .send_request("getPendingValidators", &SubnetArgs { subnet_id })
            .await?;
        Ok(reply.validators)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_nonce_is_an_error() {
        let account = |nonce| Account {
            address: "6Y3kysjF9jnHnYkdS9yGAuoHyae2eNmeV".to_owned(),
            nonce,
            balance: 0,
        };

        assert_eq!(account(41).next_nonce().unwrap(), 42);
        let err = account(u64::MAX).next_nonce().unwrap_err();
        assert!(matches!(err, Error::NonceExhausted { .. }), "{err}");
    }
}
