use std::{
    borrow::Cow,
    sync::atomic::{AtomicU64, Ordering},
};

use reqwest::{Client, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::Error;

const JSONRPC_VERSION: &str = "2.0";

/// Connection shared by every API of a single client.
#[derive(Debug)]
pub(crate) struct Transport {
    http: Client,
    base_url: Url,
    next_id: AtomicU64,
}

impl Transport {
    pub(crate) const fn new(http: Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            next_id: AtomicU64::new(1),
        }
    }

    pub(crate) const fn base_url(&self) -> &Url {
        &self.base_url
    }
}

/// Empty parameter object for methods that take no arguments.
#[derive(Serialize)]
pub(crate) struct NoParams {}

#[derive(Serialize)]
struct RequestEnvelope<'a, P: ?Sized> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: &'a P,
}

#[derive(Deserialize)]
struct ResponseEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Sends namespaced JSON-RPC calls to one endpoint of a node, e.g.
/// `avm.getTxStatus` to `/ext/bc/X`.
pub(crate) struct EndpointRequester<'a> {
    transport: &'a Transport,
    endpoint: Cow<'static, str>,
    namespace: &'static str,
}

impl<'a> EndpointRequester<'a> {
    pub(crate) fn new(
        transport: &'a Transport,
        endpoint: impl Into<Cow<'static, str>>,
        namespace: &'static str,
    ) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            namespace,
        }
    }

    pub(crate) async fn send_request<P, R>(&self, method: &str, params: &P) -> Result<R, Error>
    where
        P: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let method = format!("{}.{method}", self.namespace);
        let url = self
            .transport
            .base_url
            .join(self.endpoint.trim_start_matches('/'))?;
        let id = self.transport.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RequestEnvelope {
            jsonrpc: JSONRPC_VERSION,
            id,
            method: &method,
            params,
        };

        tracing::trace!(%url, %method, id, "sending json-rpc request");

        let response = self
            .transport
            .http
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|source| Error::Transport {
                method: method.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status { method, status });
        }

        let body = response.bytes().await.map_err(|source| Error::Transport {
            method: method.clone(),
            source,
        })?;
        let envelope: ResponseEnvelope =
            serde_json::from_slice(&body).map_err(|source| Error::Decode {
                method: method.clone(),
                source,
            })?;

        if let Some(error) = envelope.error {
            return Err(Error::Rpc {
                method,
                code: error.code,
                message: error.message,
            });
        }

        let Some(result) = envelope.result else {
            return Err(Error::MissingResult { method });
        };

        serde_json::from_value(result).map_err(|source| Error::Decode { method, source })
    }
}
