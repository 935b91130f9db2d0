use std::time::Duration;

use crate::{
    network::NetworkError,
    scenario::{AvailabilityError, DynError},
};

/// Why a test run did not pass, tagged with the phase it stopped in.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("invalid network loader: {0}")]
    Loader(#[source] NetworkError),
    #[error("network does not provide the requested services: {0}")]
    MissingService(#[source] NetworkError),
    #[error("network was not available within the setup buffer of {timeout:?}")]
    SetupTimeout { timeout: Duration },
    #[error(transparent)]
    Unavailable(#[from] AvailabilityError),
    #[error("test did not finish within {timeout:?}")]
    ExecutionTimeout { timeout: Duration },
    #[error("test panicked: {0}")]
    Panicked(String),
    #[error("test failed: {0}")]
    Failed(#[source] DynError),
}
