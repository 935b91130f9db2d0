use std::{any::Any, panic::AssertUnwindSafe, time::Duration};

use futures::{future::try_join_all, FutureExt as _};
use tokio::time::timeout;
use tracing::{info, warn};

use super::error::RunnerError;
use crate::{
    adjust_timeout,
    network::{GeckoNetwork, GeckoService},
    scenario::{
        wait_for_availability, AvailabilityChecker, GeckoAvailabilityChecker, GeckoTest,
        TestContext,
    },
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Runs tests against an already provisioned network: checks the network
/// matches the test's loader, waits for every service, then executes the test.
pub struct TestRunner<C = GeckoAvailabilityChecker> {
    checker: C,
    poll_interval: Duration,
}

impl TestRunner<GeckoAvailabilityChecker> {
    #[must_use]
    pub const fn new(request_timeout: Duration) -> Self {
        Self::with_checker(GeckoAvailabilityChecker::new(request_timeout))
    }
}

impl<C: AvailabilityChecker> TestRunner<C> {
    #[must_use]
    pub const fn with_checker(checker: C) -> Self {
        Self {
            checker,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Interval between availability checks of a service that is not up yet.
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub async fn run(
        &self,
        name: &str,
        test: &dyn GeckoTest,
        network: &GeckoNetwork,
    ) -> Result<(), RunnerError> {
        let loader = test.network_loader().map_err(RunnerError::Loader)?;
        let services = network
            .desired_services(&loader)
            .map_err(RunnerError::MissingService)?;

        let setup_buffer = adjust_timeout(test.setup_buffer());
        info!(test = name, services = services.len(), ?setup_buffer, "waiting for network");
        self.wait_for_services(&services, setup_buffer).await?;

        let execution_timeout = adjust_timeout(test.execution_timeout());
        info!(test = name, ?execution_timeout, "running test");
        let context = TestContext::new(name);
        let execution = AssertUnwindSafe(test.run(network, &context)).catch_unwind();

        match timeout(execution_timeout, execution).await {
            Err(_) => Err(RunnerError::ExecutionTimeout {
                timeout: execution_timeout,
            }),
            Ok(Err(panic)) => Err(RunnerError::Panicked(panic_message(panic))),
            Ok(Ok(())) => context.take_failure().map_or_else(
                || {
                    info!(test = name, "test passed");
                    Ok(())
                },
                |failure| Err(RunnerError::Failed(failure)),
            ),
        }
    }

    /// Waits for all services concurrently. Each one is checked with the rest
    /// of the network as its dependencies.
    async fn wait_for_services(
        &self,
        services: &[GeckoService],
        setup_buffer: Duration,
    ) -> Result<(), RunnerError> {
        let waits = services.iter().map(|service| {
            let dependencies = services
                .iter()
                .filter(|other| other.id() != service.id())
                .cloned()
                .collect::<Vec<_>>();
            async move {
                wait_for_availability(&self.checker, service, &dependencies, self.poll_interval)
                    .await
            }
        });

        match timeout(setup_buffer, try_join_all(waits)).await {
            Ok(result) => result.map(|_| ()).map_err(RunnerError::from),
            Err(_) => {
                warn!(?setup_buffer, "setup buffer exhausted");
                Err(RunnerError::SetupTimeout {
                    timeout: setup_buffer,
                })
            }
        }
    }
}

/// Attempts to turn a panic payload into a readable string for diagnostics.
fn panic_message(panic: Box<dyn Any + Send>) -> String {
    panic.downcast::<String>().map_or_else(
        |panic| {
            panic.downcast::<&'static str>().map_or_else(
                |_| "unknown panic".to_owned(),
                |message| (*message).to_owned(),
            )
        },
        |message| *message,
    )
}
