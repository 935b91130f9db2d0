//! YAML description of an already provisioned network.

use std::{
    collections::BTreeMap,
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

use gecko_client::DEFAULT_REQUEST_TIMEOUT;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use thiserror::Error;

use crate::{
    network::{GeckoNetwork, GeckoService, ServiceId},
    scenario::DEFAULT_POLL_INTERVAL,
};

pub const DEFAULT_IMAGE_NAME: &str = "gecko:latest";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RunnerConfig {
    #[serde(default = "default_image_name")]
    pub image_name: String,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_request_timeout")]
    pub request_timeout: Duration,
    /// Interval between availability checks.
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_poll_interval")]
    pub poll_interval: Duration,
    #[serde(default)]
    pub genesis_private_key: Option<String>,
    pub services: BTreeMap<ServiceId, SocketAddr>,
}

fn default_image_name() -> String {
    DEFAULT_IMAGE_NAME.to_owned()
}

const fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

const fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

impl RunnerConfig {
    pub fn load_from_file(file_path: &Path) -> Result<Self, ConfigError> {
        let config_content = fs::read_to_string(file_path).map_err(|source| ConfigError::Read {
            path: file_path.to_owned(),
            source,
        })?;
        serde_yaml::from_str(&config_content).map_err(|source| ConfigError::Parse {
            path: file_path.to_owned(),
            source,
        })
    }

    #[must_use]
    pub fn network(&self) -> GeckoNetwork {
        GeckoNetwork::new(
            self.services
                .iter()
                .map(|(id, socket)| GeckoService::new(id.clone(), *socket)),
        )
        .with_request_timeout(self.request_timeout)
    }
}
