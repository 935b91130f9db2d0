//! Test harness primitives: the availability predicate, the test contract,
//! and the runner that drives a test against a provisioned network.

pub mod availability;
mod definition;
mod runtime;
mod suite;

pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub use availability::{
    wait_for_availability, AvailabilityChecker, AvailabilityError, GeckoAvailabilityChecker,
    LivenessProbe, RpcLivenessProbe,
};
pub use definition::{GeckoTest, TestContext};
pub use runtime::{RunnerError, TestRunner, DEFAULT_POLL_INTERVAL};
pub use suite::GeckoTestSuite;
