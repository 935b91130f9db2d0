use serde::{Deserialize, Serialize};

use crate::{
    paths,
    requester::{EndpointRequester, NoParams, Transport},
    Error,
};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Peer {
    pub ip: String,
    #[serde(rename = "publicIP")]
    pub public_ip: String,
    pub id: String,
    pub version: String,
    pub last_sent: String,
    pub last_received: String,
}

#[derive(Deserialize)]
struct PeerList {
    peers: Vec<Peer>,
}

#[derive(Deserialize)]
struct NodeIdReply {
    #[serde(rename = "nodeID")]
    node_id: String,
}

#[derive(Deserialize)]
struct NetworkIdReply {
    #[serde(rename = "networkID")]
    network_id: String,
}

#[derive(Serialize)]
struct BlockchainIdArgs<'a> {
    alias: &'a str,
}

#[derive(Deserialize)]
struct BlockchainIdReply {
    #[serde(rename = "blockchainID")]
    blockchain_id: String,
}

pub struct AdminApi<'a> {
    requester: EndpointRequester<'a>,
}

impl<'a> AdminApi<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self {
            requester: EndpointRequester::new(transport, paths::ADMIN, "admin"),
        }
    }

    pub async fn peers(&self) -> Result<Vec<Peer>, Error> {
        let reply: PeerList = self.requester.send_request("peers", &NoParams {}).await?;
        Ok(reply.peers)
    }

    pub async fn node_id(&self) -> Result<String, Error> {
        let reply: NodeIdReply = self
            .requester
            .send_request("getNodeID", &NoParams {})
            .await?;
        Ok(reply.node_id)
    }

    pub async fn network_id(&self) -> Result<String, Error> {
        let reply: NetworkIdReply = self
            .requester
            .send_request("getNetworkID", &NoParams {})
            .await?;
        Ok(reply.network_id)
    }

    pub async fn blockchain_id(&self, alias: &str) -> Result<String, Error> {
        let reply: BlockchainIdReply = self
            .requester
            .send_request("getBlockchainID", &BlockchainIdArgs { alias })
            .await?;
        Ok(reply.blockchain_id)
    }
}
