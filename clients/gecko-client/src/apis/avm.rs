use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::{
    paths,
    requester::{EndpointRequester, Transport},
    types::{FormattedTx, JsonAddress, JsonAddresses, JsonTxId, JsonTxStatus},
    Error, TxId, TxStatus, UserPass,
};

#[serde_as]
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct Balance {
    #[serde_as(as = "DisplayFromStr")]
    pub balance: u64,
}

#[serde_as]
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct AssetBalance {
    pub asset: String,
    #[serde_as(as = "DisplayFromStr")]
    pub balance: u64,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct AssetDescription {
    #[serde(rename = "assetID")]
    pub asset_id: String,
    pub name: String,
    pub symbol: String,
    pub denomination: u8,
}

/// Initial owner of part of a fixed-cap asset's supply.
#[serde_as]
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Holder {
    #[serde_as(as = "DisplayFromStr")]
    pub amount: u64,
    pub address: String,
}

/// Minter set of a variable-cap or NFT asset: `threshold` of `minters` must
/// sign a mint.
#[serde_as]
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Owners {
    #[serde_as(as = "DisplayFromStr")]
    pub threshold: u32,
    pub minters: Vec<String>,
}

#[derive(Serialize)]
struct BalanceArgs<'a> {
    address: &'a str,
    #[serde(rename = "assetID")]
    asset_id: &'a str,
}

#[derive(Deserialize)]
struct AllBalancesReply {
    balances: Vec<AssetBalance>,
}

#[derive(Serialize)]
struct AssetIdArgs<'a> {
    #[serde(rename = "assetID")]
    asset_id: &'a str,
}

#[derive(Deserialize)]
struct FormattedAssetId {
    #[serde(rename = "assetID")]
    asset_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateFixedCapAssetArgs<'a> {
    #[serde(flatten)]
    user: &'a UserPass,
    name: &'a str,
    symbol: &'a str,
    denomination: u8,
    initial_holders: &'a [Holder],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateVariableCapAssetArgs<'a> {
    #[serde(flatten)]
    user: &'a UserPass,
    name: &'a str,
    symbol: &'a str,
    denomination: u8,
    minter_sets: &'a [Owners],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateNftAssetArgs<'a> {
    #[serde(flatten)]
    user: &'a UserPass,
    name: &'a str,
    symbol: &'a str,
    minter_sets: &'a [Owners],
}

#[serde_as]
#[derive(Serialize)]
struct SendNftArgs<'a> {
    #[serde(flatten)]
    user: &'a UserPass,
    #[serde(rename = "assetID")]
    asset_id: &'a str,
    #[serde(rename = "groupID")]
    #[serde_as(as = "DisplayFromStr")]
    group_id: u32,
    to: &'a str,
}

#[derive(Serialize)]
struct MintNftArgs<'a> {
    #[serde(flatten)]
    user: &'a UserPass,
    #[serde(rename = "assetID")]
    asset_id: &'a str,
    payload: &'a str,
    to: &'a str,
}

#[derive(Deserialize)]
struct FormattedUtxos {
    utxos: Vec<String>,
}

#[derive(Serialize)]
struct ExportKeyArgs<'a> {
    #[serde(flatten)]
    user: &'a UserPass,
    address: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportKeyReply {
    private_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportKeyArgs<'a> {
    #[serde(flatten)]
    user: &'a UserPass,
    private_key: &'a str,
}

#[serde_as]
#[derive(Serialize)]
struct SendArgs<'a> {
    #[serde(flatten)]
    user: &'a UserPass,
    #[serde_as(as = "DisplayFromStr")]
    amount: u64,
    #[serde(rename = "assetID")]
    asset_id: &'a str,
    to: &'a str,
}

#[serde_as]
#[derive(Serialize)]
struct ExportAvaArgs<'a> {
    #[serde(flatten)]
    user: &'a UserPass,
    #[serde_as(as = "DisplayFromStr")]
    amount: u64,
    to: &'a str,
}

#[derive(Serialize)]
struct ImportAvaArgs<'a> {
    #[serde(flatten)]
    user: &'a UserPass,
    to: &'a str,
}

/// Client of an AVM chain, the X-chain unless built for another alias.
pub struct AvmApi<'a> {
    requester: EndpointRequester<'a>,
}

impl<'a> AvmApi<'a> {
    pub(crate) fn new(transport: &'a Transport, chain: &str) -> Self {
        Self {
            requester: EndpointRequester::new(transport, paths::blockchain(chain), "avm"),
        }
    }

    /// Issues a CB58 encoded signed transaction and returns its id.
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

    pub async fn get_tx(&self, tx_id: &TxId) -> Result<String, Error> {
        let reply: FormattedTx = self
            .requester
            .send_request(
                "getTx",
                &JsonTxId {
                    tx_id: tx_id.clone(),
                },
            )
            .await?;
        Ok(reply.tx)
    }

    /// CB58 encoded UTXOs controlled by `addresses`.
    pub async fn get_utxos(&self, addresses: &[String]) -> Result<Vec<String>, Error> {
        let reply: FormattedUtxos = self
            .requester
            .send_request(
                "getUTXOs",
                &JsonAddresses {
                    addresses: addresses.to_vec(),
                },
            )
            .await?;
        Ok(reply.utxos)
    }

    /// CB58 encoded atomic UTXOs, exported from another chain to `addresses`
    /// and not yet imported.
    pub async fn get_atomic_utxos(&self, addresses: &[String]) -> Result<Vec<String>, Error> {
        let reply: FormattedUtxos = self
            .requester
            .send_request(
                "getAtomicUTXOs",
                &JsonAddresses {
                    addresses: addresses.to_vec(),
                },
            )
            .await?;
        Ok(reply.utxos)
    }

    pub async fn get_balance(&self, address: &str, asset_id: &str) -> Result<Balance, Error> {
        self.requester
            .send_request("getBalance", &BalanceArgs { address, asset_id })
            .await
    }

    pub async fn get_all_balances(&self, address: &str) -> Result<Vec<AssetBalance>, Error> {
        let reply: AllBalancesReply = self
            .requester
            .send_request(
                "getAllBalances",
                &JsonAddress {
                    address: address.to_owned(),
                },
            )
            .await?;
        Ok(reply.balances)
    }

    pub async fn get_asset_description(&self, asset_id: &str) -> Result<AssetDescription, Error> {
        self.requester
            .send_request("getAssetDescription", &AssetIdArgs { asset_id })
            .await
    }

    /// Creates an asset whose whole supply is handed to `holders` up front and
    /// returns its id.
    pub async fn create_fixed_cap_asset(
        &self,
        user: &UserPass,
        name: &str,
        symbol: &str,
        denomination: u8,
        holders: &[Holder],
    ) -> Result<String, Error> {
        let reply: FormattedAssetId = self
            .requester
            .send_request(
                "createFixedCapAsset",
                &CreateFixedCapAssetArgs {
                    user,
                    name,
                    symbol,
                    denomination,
                    initial_holders: holders,
                },
            )
            .await?;
        Ok(reply.asset_id)
    }

    pub async fn create_variable_cap_asset(
        &self,
        user: &UserPass,
        name: &str,
        symbol: &str,
        denomination: u8,
        minters: &[Owners],
    ) -> Result<String, Error> {
        let reply: FormattedAssetId = self
            .requester
            .send_request(
                "createVariableCapAsset",
                &CreateVariableCapAssetArgs {
                    user,
                    name,
                    symbol,
                    denomination,
                    minter_sets: minters,
                },
            )
            .await?;
        Ok(reply.asset_id)
    }

    pub async fn create_nft_asset(
        &self,
        user: &UserPass,
        name: &str,
        symbol: &str,
        minters: &[Owners],
    ) -> Result<String, Error> {
        let reply: FormattedAssetId = self
            .requester
            .send_request(
                "createNFTAsset",
                &CreateNftAssetArgs {
                    user,
                    name,
                    symbol,
                    minter_sets: minters,
                },
            )
            .await?;
        Ok(reply.asset_id)
    }

    pub async fn create_address(&self, user: &UserPass) -> Result<String, Error> {
        let reply: JsonAddress = self.requester.send_request("createAddress", user).await?;
        Ok(reply.address)
    }

    pub async fn list_addresses(&self, user: &UserPass) -> Result<Vec<String>, Error> {
        let reply: JsonAddresses = self.requester.send_request("listAddresses", user).await?;
        Ok(reply.addresses)
    }

    pub async fn export_key(&self, user: &UserPass, address: &str) -> Result<String, Error> {
        let reply: ExportKeyReply = self
            .requester
            .send_request("exportKey", &ExportKeyArgs { user, address })
            .await?;
        Ok(reply.private_key)
    }

    /// Imports a private key into the user's keystore and returns the X-chain
    /// address it controls.
    pub async fn import_key(&self, user: &UserPass, private_key: &str) -> Result<String, Error> {
        let reply: JsonAddress = self
            .requester
            .send_request("importKey", &ImportKeyArgs { user, private_key })
            .await?;
        Ok(reply.address)
    }

    pub async fn send(
        &self,
        user: &UserPass,
        amount: u64,
        asset_id: &str,
        to: &str,
    ) -> Result<TxId, Error> {
        let reply: JsonTxId = self
            .requester
            .send_request(
                "send",
                &SendArgs {
                    user,
                    amount,
                    asset_id,
                    to,
                },
            )
            .await?;
        Ok(reply.tx_id)
    }

    /// Mints `amount` more units of a variable-cap asset to `to`.
    pub async fn mint(
        &self,
        user: &UserPass,
        amount: u64,
        asset_id: &str,
        to: &str,
    ) -> Result<TxId, Error> {
        let reply: JsonTxId = self
            .requester
            .send_request(
                "mint",
                &SendArgs {
                    user,
                    amount,
                    asset_id,
                    to,
                },
            )
            .await?;
        Ok(reply.tx_id)
    }

    pub async fn send_nft(
        &self,
        user: &UserPass,
        asset_id: &str,
        group_id: u32,
        to: &str,
    ) -> Result<TxId, Error> {
        let reply: JsonTxId = self
            .requester
            .send_request(
                "sendNFT",
                &SendNftArgs {
                    user,
                    asset_id,
                    group_id,
                    to,
                },
            )
            .await?;
        Ok(reply.tx_id)
    }

    /// Mints an NFT carrying a CB58 encoded `payload` to `to`.
    pub async fn mint_nft(
        &self,
        user: &UserPass,
        asset_id: &str,
        payload: &str,
        to: &str,
    ) -> Result<TxId, Error> {
        let reply: JsonTxId = self
            .requester
            .send_request(
                "mintNFT",
                &MintNftArgs {
                    user,
                    asset_id,
                    payload,
                    to,
                },
            )
            .await?;
        Ok(reply.tx_id)
    }

    /// Sends AVA from the user's X-chain funds to a platform chain account.
    pub async fn export_ava(&self, user: &UserPass, amount: u64, to: &str) -> Result<TxId, Error> {
        let reply: JsonTxId = self
            .requester
            .send_request("exportAVA", &ExportAvaArgs { user, amount, to })
            .await?;
        Ok(reply.tx_id)
    }

    /// Finishes a platform chain to X-chain transfer into `to`.
    pub async fn import_ava(&self, user: &UserPass, to: &str) -> Result<TxId, Error> {
        let reply: JsonTxId = self
            .requester
            .send_request("importAVA", &ImportAvaArgs { user, to })
            .await?;
        Ok(reply.tx_id)
    }
}
