mod error;
mod runner;

pub use error::RunnerError;
pub use runner::{TestRunner, DEFAULT_POLL_INTERVAL};
