use std::time::Duration;

use async_trait::async_trait;
use gecko_client::{GeckoClient, Liveness, DEFAULT_REQUEST_TIMEOUT};
use thiserror::Error;
use tokio::time::{sleep, timeout};
use tracing::{debug, trace};

use super::DynError;
use crate::network::{GeckoService, ServiceId};

/// Ceiling for the caller's retry loop around [`AvailabilityChecker::is_service_up`].
pub const AVAILABILITY_TIMEOUT: Duration = Duration::from_secs(90);
/// Pause after a healthy reply before the node is reported up.
pub const SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Asks a node whether it is alive.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn liveness(&self, service: &GeckoService) -> Result<Liveness, DynError>;
}

/// Calls `health.getLiveness` over a client created for that one call.
#[derive(Clone, Copy, Debug)]
pub struct RpcLivenessProbe {
    request_timeout: Duration,
}

impl RpcLivenessProbe {
    #[must_use]
    pub const fn new(request_timeout: Duration) -> Self {
        Self { request_timeout }
    }
}

impl Default for RpcLivenessProbe {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }
}

#[async_trait]
impl LivenessProbe for RpcLivenessProbe {
    async fn liveness(&self, service: &GeckoService) -> Result<Liveness, DynError> {
        let client = GeckoClient::with_timeout(service.json_rpc_socket(), self.request_timeout)?;
        Ok(client.health().get_liveness().await?)
    }
}

/// Single-shot availability check. Implementations never loop; retrying is
/// up to the caller, bounded by [`AvailabilityChecker::timeout`].
#[async_trait]
pub trait AvailabilityChecker: Send + Sync {
    async fn is_service_up(&self, target: &GeckoService, dependencies: &[GeckoService]) -> bool;

    fn timeout(&self) -> Duration;
}

/// Availability of a Gecko node as reported by its own liveness endpoint.
///
/// Dependencies are not checked: a node only reports healthy once it has
/// bootstrapped from them.
pub struct GeckoAvailabilityChecker<P = RpcLivenessProbe> {
    probe: P,
    settle_delay: Duration,
    timeout: Duration,
}

impl GeckoAvailabilityChecker<RpcLivenessProbe> {
    #[must_use]
    pub const fn new(request_timeout: Duration) -> Self {
        Self::with_probe(RpcLivenessProbe::new(request_timeout))
    }
}

impl Default for GeckoAvailabilityChecker<RpcLivenessProbe> {
    fn default() -> Self {
        Self::with_probe(RpcLivenessProbe::default())
    }
}

impl<P> GeckoAvailabilityChecker<P> {
    #[must_use]
    pub const fn with_probe(probe: P) -> Self {
        Self {
            probe,
            settle_delay: SETTLE_DELAY,
            timeout: AVAILABILITY_TIMEOUT,
        }
    }
}

#[async_trait]
impl<P: LivenessProbe> AvailabilityChecker for GeckoAvailabilityChecker<P> {
    async fn is_service_up(&self, target: &GeckoService, _dependencies: &[GeckoService]) -> bool {
        match self.probe.liveness(target).await {
            Ok(liveness) if liveness.healthy => {
                sleep(self.settle_delay).await;
                true
            }
            Ok(_) => {
                debug!(service = %target.id(), "service reported unhealthy");
                false
            }
            Err(error) => {
                trace!(service = %target.id(), %error, "liveness check failed");
                false
            }
        }
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[derive(Clone, Debug, Error)]
#[error("timeout waiting for service {service} to become available after {timeout:?}")]
pub struct AvailabilityError {
    service: ServiceId,
    timeout: Duration,
}

impl AvailabilityError {
    #[must_use]
    pub const fn new(service: ServiceId, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    #[must_use]
    pub const fn service(&self) -> &ServiceId {
        &self.service
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Re-runs the checker every `poll_interval` until the target is up or the
/// checker's timeout elapses.
pub async fn wait_for_availability<C>(
    checker: &C,
    target: &GeckoService,
    dependencies: &[GeckoService],
    poll_interval: Duration,
) -> Result<(), AvailabilityError>
where
    C: AvailabilityChecker + ?Sized,
{
    let timeout_duration = checker.timeout();
    let probe = async {
        loop {
            if checker.is_service_up(target, dependencies).await {
                return;
            }
            sleep(poll_interval).await;
        }
    };

    timeout(timeout_duration, probe)
        .await
        .map_err(|_| AvailabilityError::new(target.id().clone(), timeout_duration))?;
    debug!(service = %target.id(), "service available");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{
        collections::BTreeMap,
        net::TcpListener,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Mutex,
        },
    };

    use tokio::time::Instant;

    use super::*;

    #[derive(Clone)]
    struct ScriptedProbe {
        replies: Arc<Mutex<Vec<Option<bool>>>>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedProbe {
        /// `None` is a failed call, `Some(healthy)` a liveness reply. The last
        /// reply repeats once the script runs out.
        fn new(replies: Vec<Option<bool>>) -> Self {
            Self {
                replies: Arc::new(Mutex::new(replies)),
                calls: Arc::default(),
            }
        }
    }

    #[async_trait]
    impl LivenessProbe for ScriptedProbe {
        async fn liveness(&self, _service: &GeckoService) -> Result<Liveness, DynError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = {
                let mut replies = self.replies.lock().unwrap();
                if replies.len() > 1 {
                    replies.remove(0)
                } else {
                    replies[0]
                }
            };
            reply
                .map(|healthy| Liveness {
                    healthy,
                    checks: BTreeMap::new(),
                })
                .ok_or_else(|| "connection refused".into())
        }
    }

    fn service(id: &str) -> GeckoService {
        GeckoService::new(id.into(), "127.0.0.1:9650".parse().unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn healthy_node_is_up_only_after_settle_delay() {
        let checker = GeckoAvailabilityChecker::with_probe(ScriptedProbe::new(vec![Some(true)]));
        let started = Instant::now();

        let up = checker.is_service_up(&service("validator-node"), &[]).await;

        assert!(up);
        assert!(started.elapsed() >= SETTLE_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn unhealthy_node_is_down_without_delay() {
        let checker = GeckoAvailabilityChecker::with_probe(ScriptedProbe::new(vec![Some(false)]));
        let started = Instant::now();

        assert!(!checker.is_service_up(&service("validator-node"), &[]).await);
        assert!(started.elapsed() < SETTLE_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_liveness_call_is_down() {
        let checker = GeckoAvailabilityChecker::with_probe(ScriptedProbe::new(vec![None]));

        assert!(!checker.is_service_up(&service("validator-node"), &[]).await);
    }

    #[tokio::test(start_paused = true)]
    async fn dependencies_are_not_probed() {
        let probe = ScriptedProbe::new(vec![Some(true)]);
        let checker = GeckoAvailabilityChecker::with_probe(probe.clone());
        let dependencies = [service("bootstrapper-0"), service("bootstrapper-1")];

        assert!(checker.is_service_up(&service("validator-node"), &dependencies).await);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn timeout_ceiling_is_fixed() {
        assert_eq!(
            GeckoAvailabilityChecker::<RpcLivenessProbe>::default().timeout(),
            Duration::from_secs(90)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn wait_retries_until_the_node_comes_up() {
        let probe = ScriptedProbe::new(vec![None, Some(false), Some(true)]);
        let checker = GeckoAvailabilityChecker::with_probe(probe.clone());

        wait_for_availability(
            &checker,
            &service("validator-node"),
            &[],
            Duration::from_secs(2),
        )
        .await
        .unwrap();

        assert_eq!(probe.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_gives_up_at_the_checker_timeout() {
        let checker = GeckoAvailabilityChecker::with_probe(ScriptedProbe::new(vec![None]));
        let started = Instant::now();

        let err = wait_for_availability(
            &checker,
            &service("delegator-node"),
            &[],
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();

        assert_eq!(err.service().as_str(), "delegator-node");
        assert_eq!(err.timeout(), AVAILABILITY_TIMEOUT);
        assert!(started.elapsed() >= AVAILABILITY_TIMEOUT);
        assert!(started.elapsed() < AVAILABILITY_TIMEOUT + Duration::from_secs(2));
    }

    #[tokio::test]
    async fn unreachable_node_is_down() {
        let socket = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let checker = GeckoAvailabilityChecker::new(Duration::from_secs(2));

        let up = checker
            .is_service_up(&GeckoService::new("validator-node".into(), socket), &[])
            .await;

        assert!(!up);
    }
}
