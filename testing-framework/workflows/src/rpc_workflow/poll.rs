use std::time::Duration;

use gecko_client::TxStatus;
use tokio::time::{sleep, timeout};
use tracing::{debug, trace};

use super::{StageError, StakingNode, TxRef};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PollSettings {
    pub interval: Duration,
    /// Budget for a single transaction.
    pub timeout: Duration,
}

impl PollSettings {
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout,
        }
    }
}

/// Waits for `tx` to be accepted. Status is queried every `interval` and
/// never again once it is terminal; the whole wait, hung calls included, is
/// bounded by the timeout.
pub async fn wait_for_acceptance<N>(
    node: &N,
    tx: &TxRef,
    settings: PollSettings,
) -> Result<(), StageError>
where
    N: StakingNode + ?Sized,
{
    let poll = async {
        loop {
            sleep(settings.interval).await;
            let status = node
                .tx_status(tx)
                .await
                .map_err(StageError::rpc("tx status query"))?;
            match status {
                TxStatus::Accepted => return Ok(()),
                TxStatus::Rejected => return Err(StageError::Rejected { tx: tx.clone() }),
                TxStatus::Unknown | TxStatus::Processing => {
                    trace!(%tx, %status, "transaction not decided yet");
                }
            }
        }
    };

    timeout(settings.timeout, poll)
        .await
        .map_err(|_| StageError::Timeout {
            tx: tx.clone(),
            timeout: settings.timeout,
        })??;
    debug!(%tx, "transaction accepted");
    Ok(())
}
