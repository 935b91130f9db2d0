use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    paths,
    requester::{EndpointRequester, NoParams, Transport},
    Error,
};

/// Reply of `health.getLiveness`. Only `healthy` is required; the per-check
/// details are kept verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Liveness {
    pub healthy: bool,
    #[serde(default)]
    pub checks: BTreeMap<String, Value>,
}

pub struct HealthApi<'a> {
    requester: EndpointRequester<'a>,
}

impl<'a> HealthApi<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self {
            requester: EndpointRequester::new(transport, paths::HEALTH, "health"),
        }
    }

    pub async fn get_liveness(&self) -> Result<Liveness, Error> {
        self.requester
            .send_request("getLiveness", &NoParams {})
            .await
    }
}
