use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use super::{NetworkError, ServiceId};

pub const DEFAULT_JSON_RPC_PORT: u16 = 9650;
const DEFAULT_SNOW_SAMPLE_SIZE: u32 = 2;
const DEFAULT_SNOW_QUORUM_SIZE: u32 = 2;

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationId(String);

impl ConfigurationId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl From<&str> for ConfigurationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for ConfigurationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Fatal,
    Error,
    Warn,
    #[default]
    Info,
    Trace,
    Debug,
    Verbo,
}

impl LogLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Fatal => "fatal",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Verbo => "verbo",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How one class of Gecko node is started.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GeckoServiceConfig {
    pub staking_enabled: bool,
    pub log_level: LogLevel,
    pub image_name: String,
    pub snow_quorum_size: u32,
    pub snow_sample_size: u32,
    #[serde(default)]
    pub additional_args: BTreeMap<String, String>,
}

impl GeckoServiceConfig {
    #[must_use]
    pub fn new(staking_enabled: bool, log_level: LogLevel, image_name: impl Into<String>) -> Self {
        Self {
            staking_enabled,
            log_level,
            image_name: image_name.into(),
            snow_quorum_size: DEFAULT_SNOW_QUORUM_SIZE,
            snow_sample_size: DEFAULT_SNOW_SAMPLE_SIZE,
            additional_args: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn with_snow_sizes(mut self, quorum_size: u32, sample_size: u32) -> Self {
        self.snow_quorum_size = quorum_size;
        self.snow_sample_size = sample_size;
        self
    }

    #[must_use]
    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_args.insert(name.into(), value.into());
        self
    }

    /// Command line the node container is started with. Additional args come
    /// last so they can override the defaults.
    #[must_use]
    pub fn command_args(&self) -> Vec<String> {
        let mut args = vec![
            "--network-id=local".to_owned(),
            "--http-host=0.0.0.0".to_owned(),
            format!("--http-port={DEFAULT_JSON_RPC_PORT}"),
            format!("--staking-tls-enabled={}", self.staking_enabled),
            format!("--log-level={}", self.log_level),
            format!("--snow-quorum-size={}", self.snow_quorum_size),
            format!("--snow-sample-size={}", self.snow_sample_size),
        ];
        args.extend(
            self.additional_args
                .iter()
                .map(|(name, value)| format!("--{name}={value}")),
        );
        args
    }
}

/// Declares the network a test wants: the bootstrapper settings, the named
/// service configurations, and which services run which configuration.
#[derive(Clone, Debug)]
pub struct NetworkLoader {
    bootstrapper: GeckoServiceConfig,
    service_configs: BTreeMap<ConfigurationId, GeckoServiceConfig>,
    desired_services: BTreeMap<ServiceId, ConfigurationId>,
}

impl NetworkLoader {
    #[must_use]
    pub fn builder(image_name: impl Into<String>) -> NetworkLoaderBuilder {
        NetworkLoaderBuilder::new(image_name)
    }

    /// Configuration of the nodes the network bootstraps from.
    #[must_use]
    pub const fn bootstrapper_config(&self) -> &GeckoServiceConfig {
        &self.bootstrapper
    }

    #[must_use]
    pub fn service_config(&self, id: &ConfigurationId) -> Option<&GeckoServiceConfig> {
        self.service_configs.get(id)
    }

    /// Every desired service with its resolved configuration.
    pub fn desired_services(&self) -> impl Iterator<Item = (&ServiceId, &GeckoServiceConfig)> {
        self.desired_services.iter().filter_map(|(service, config)| {
            self.service_configs
                .get(config)
                .map(|resolved| (service, resolved))
        })
    }

    #[must_use]
    pub fn service_count(&self) -> usize {
        self.desired_services.len()
    }
}

pub struct NetworkLoaderBuilder {
    bootstrapper: GeckoServiceConfig,
    service_configs: BTreeMap<ConfigurationId, GeckoServiceConfig>,
    desired_services: BTreeMap<ServiceId, ConfigurationId>,
}

impl NetworkLoaderBuilder {
    fn new(image_name: impl Into<String>) -> Self {
        Self {
            bootstrapper: GeckoServiceConfig::new(false, LogLevel::default(), image_name),
            service_configs: BTreeMap::new(),
            desired_services: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn staking_enabled(mut self, enabled: bool) -> Self {
        self.bootstrapper.staking_enabled = enabled;
        self
    }

    #[must_use]
    pub const fn log_level(mut self, level: LogLevel) -> Self {
        self.bootstrapper.log_level = level;
        self
    }

    #[must_use]
    pub const fn snow_sizes(mut self, quorum_size: u32, sample_size: u32) -> Self {
        self.bootstrapper.snow_quorum_size = quorum_size;
        self.bootstrapper.snow_sample_size = sample_size;
        self
    }

    #[must_use]
    pub fn with_service_config(
        mut self,
        id: impl Into<ConfigurationId>,
        config: GeckoServiceConfig,
    ) -> Self {
        self.service_configs.insert(id.into(), config);
        self
    }

    #[must_use]
    pub fn with_service(
        mut self,
        service: impl Into<ServiceId>,
        config: impl Into<ConfigurationId>,
    ) -> Self {
        self.desired_services.insert(service.into(), config.into());
        self
    }

    pub fn build(self) -> Result<NetworkLoader, NetworkError> {
        if self.desired_services.is_empty() {
            return Err(NetworkError::NoServices);
        }

        if let Some((service, configuration)) = self
            .desired_services
            .iter()
            .find(|(_, config)| !self.service_configs.contains_key(*config))
        {
            return Err(NetworkError::UnknownConfiguration {
                service: service.clone(),
                configuration: configuration.clone(),
            });
        }

        Ok(NetworkLoader {
            bootstrapper: self.bootstrapper,
            service_configs: self.service_configs,
            desired_services: self.desired_services,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn services_must_reference_declared_configurations() {
        let err = NetworkLoader::builder("gecko:latest")
            .with_service_config(
                "normal-config",
                GeckoServiceConfig::new(true, LogLevel::Debug, "gecko:latest"),
            )
            .with_service("validator-node", "normal-config")
            .with_service("delegator-node", "missing-config")
            .build()
            .unwrap_err();

        assert!(matches!(
            err,
            NetworkError::UnknownConfiguration { service, configuration }
                if service.as_str() == "delegator-node"
                    && configuration.to_string() == "missing-config"
        ));
    }

    #[test]
    fn empty_networks_are_rejected() {
        let err = NetworkLoader::builder("gecko:latest").build().unwrap_err();
        assert!(matches!(err, NetworkError::NoServices));
    }

    #[test]
    fn extra_args_override_defaults_on_the_command_line() {
        let config = GeckoServiceConfig::new(true, LogLevel::Debug, "gecko:latest")
            .with_snow_sizes(3, 4)
            .with_arg("log-level", "verbo");

        let args = config.command_args();

        assert_eq!(args[..2], ["--network-id=local", "--http-host=0.0.0.0"]);
        assert!(args.contains(&"--staking-tls-enabled=true".to_owned()));
        assert!(args.contains(&"--snow-quorum-size=3".to_owned()));
        assert!(args.contains(&"--snow-sample-size=4".to_owned()));
        assert_eq!(args.last().map(String::as_str), Some("--log-level=verbo"));
    }
}
