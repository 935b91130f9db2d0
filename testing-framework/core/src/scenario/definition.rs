use std::{
    sync::{Mutex, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use tracing::error;

use super::DynError;
use crate::network::{GeckoNetwork, NetworkError, NetworkLoader};

/// An end-to-end test run against a provisioned Gecko network.
#[async_trait]
pub trait GeckoTest: Send + Sync {
    /// Drives the test. Failures are reported through
    /// [`TestContext::fatal`].
    async fn run(&self, network: &GeckoNetwork, context: &TestContext);

    /// Topology and node configuration the test needs.
    fn network_loader(&self) -> Result<NetworkLoader, NetworkError>;

    /// Budget for [`GeckoTest::run`].
    fn execution_timeout(&self) -> Duration;

    /// Budget for bringing the network up before the test starts.
    fn setup_buffer(&self) -> Duration;
}

/// Per-run handle a test uses to report failure.
pub struct TestContext {
    test_name: String,
    failure: Mutex<Option<DynError>>,
}

impl TestContext {
    #[must_use]
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            failure: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// Marks the run as failed. Only the first failure is kept; later ones
    /// are logged and dropped.
    pub fn fatal(&self, failure: impl Into<DynError>) {
        let failure = failure.into();
        error!(test = %self.test_name, error = %failure, "test failed");
        let mut slot = self.failure.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(failure);
        }
    }

    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub(crate) fn take_failure(&self) -> Option<DynError> {
        self.failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}
