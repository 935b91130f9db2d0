//! Handles on the Gecko network a test runs against.

mod loader;

use std::{collections::BTreeMap, fmt, net::SocketAddr, time::Duration};

use gecko_client::{GeckoClient, DEFAULT_REQUEST_TIMEOUT};
pub use loader::{
    ConfigurationId, GeckoServiceConfig, LogLevel, NetworkLoader, NetworkLoaderBuilder,
    DEFAULT_JSON_RPC_PORT,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(String);

impl ServiceId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ServiceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("service {0} is not part of the network")]
    UnknownService(ServiceId),
    #[error("service {service} references undeclared configuration {configuration}")]
    UnknownConfiguration {
        service: ServiceId,
        configuration: ConfigurationId,
    },
    #[error("network loader declares no services")]
    NoServices,
    #[error("failed to create client for service {service}: {source}")]
    Client {
        service: ServiceId,
        #[source]
        source: gecko_client::Error,
    },
}

/// A running Gecko node as seen from the test: its id and the socket its
/// JSON-RPC server listens on.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeckoService {
    id: ServiceId,
    json_rpc_socket: SocketAddr,
}

impl GeckoService {
    #[must_use]
    pub const fn new(id: ServiceId, json_rpc_socket: SocketAddr) -> Self {
        Self {
            id,
            json_rpc_socket,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &ServiceId {
        &self.id
    }

    #[must_use]
    pub const fn json_rpc_socket(&self) -> SocketAddr {
        self.json_rpc_socket
    }
}

/// Network handed to a test. Clients are typed from the start, so a test
/// never has to guess what kind of service sits behind an id.
#[derive(Clone, Debug)]
pub struct GeckoNetwork {
    services: BTreeMap<ServiceId, GeckoService>,
    request_timeout: Duration,
}

impl GeckoNetwork {
    #[must_use]
    pub fn new(services: impl IntoIterator<Item = GeckoService>) -> Self {
        Self {
            services: services
                .into_iter()
                .map(|service| (service.id().clone(), service))
                .collect(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn services(&self) -> impl Iterator<Item = &GeckoService> {
        self.services.values()
    }

    pub fn service(&self, id: &ServiceId) -> Result<&GeckoService, NetworkError> {
        self.services
            .get(id)
            .ok_or_else(|| NetworkError::UnknownService(id.clone()))
    }

    pub fn gecko_client(&self, id: &ServiceId) -> Result<GeckoClient, NetworkError> {
        let service = self.service(id)?;
        GeckoClient::with_timeout(service.json_rpc_socket(), self.request_timeout).map_err(
            |source| NetworkError::Client {
                service: id.clone(),
                source,
            },
        )
    }

    /// Resolves every service the loader asks for, in declaration order.
    pub fn desired_services(
        &self,
        loader: &NetworkLoader,
    ) -> Result<Vec<GeckoService>, NetworkError> {
        loader
            .desired_services()
            .map(|(id, _)| self.service(id).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network() -> GeckoNetwork {
        GeckoNetwork::new([
            GeckoService::new("validator-node".into(), "127.0.0.1:9650".parse().unwrap()),
            GeckoService::new("delegator-node".into(), "127.0.0.1:9652".parse().unwrap()),
        ])
    }

    #[test]
    fn clients_are_bound_to_the_service_socket() {
        let client = network()
            .gecko_client(&ServiceId::from("delegator-node"))
            .unwrap();
        assert_eq!(client.base_url().as_str(), "http://127.0.0.1:9652/");
    }

    #[test]
    fn unknown_services_are_reported_by_id() {
        let err = network()
            .gecko_client(&ServiceId::from("bootstrapper-0"))
            .unwrap_err();
        assert!(matches!(err, NetworkError::UnknownService(id) if id.as_str() == "bootstrapper-0"));
    }
}
