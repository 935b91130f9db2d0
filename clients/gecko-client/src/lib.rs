//! Typed JSON-RPC bindings for a Gecko node.
//!
//! Every subsystem of the node lives behind its own endpoint; [`GeckoClient`]
//! owns the HTTP connection and hands out one borrowed API per subsystem.

pub mod apis;
mod error;
pub mod paths;
mod requester;
mod types;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use reqwest::{Client, Url};

pub use apis::{
    admin::{AdminApi, Peer},
    avm::{AssetBalance, AssetDescription, AvmApi, Balance, Holder, Owners},
    health::{HealthApi, Liveness},
    keystore::KeystoreApi,
    platform::{Account, PlatformApi, StakeRequest, Validator},
};
pub use error::Error;
use requester::Transport;
pub use types::{TxId, TxStatus, UserPass};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct GeckoClient {
    transport: Arc<Transport>,
}

impl GeckoClient {
    /// Client for the node whose JSON-RPC server listens on `socket`.
    pub fn new(socket: SocketAddr) -> Result<Self, Error> {
        Self::with_timeout(socket, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(socket: SocketAddr, request_timeout: Duration) -> Result<Self, Error> {
        let base_url = Url::parse(&format!("http://{socket}"))?;
        Self::from_url(base_url, request_timeout)
    }

    pub fn from_url(base_url: Url, request_timeout: Duration) -> Result<Self, Error> {
        let http = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(request_timeout))
            .build()
            .map_err(Error::Client)?;
        Ok(Self {
            transport: Arc::new(Transport::new(http, base_url)),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        self.transport.base_url()
    }

    #[must_use]
    pub fn admin(&self) -> AdminApi<'_> {
        AdminApi::new(&self.transport)
    }

    #[must_use]
    pub fn health(&self) -> HealthApi<'_> {
        HealthApi::new(&self.transport)
    }

    #[must_use]
    pub fn keystore(&self) -> KeystoreApi<'_> {
        KeystoreApi::new(&self.transport)
    }

    /// API of the X-chain.
    #[must_use]
    pub fn x_chain(&self) -> AvmApi<'_> {
        self.avm(paths::X_CHAIN_ALIAS)
    }

    /// API of the AVM chain known to the node as `chain` (alias or id).
    #[must_use]
    pub fn avm(&self, chain: &str) -> AvmApi<'_> {
        AvmApi::new(&self.transport, chain)
    }

    #[must_use]
    pub fn platform(&self) -> PlatformApi<'_> {
        PlatformApi::new(&self.transport)
    }
}
