use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::source::PriceSource;

pub const DEFAULT_PRICE_POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Background task refreshing the price on a fixed interval.
///
/// The first fetch happens immediately. The task stops on [`PricePoller::cancel`]
/// or when the poller is dropped.
pub struct PricePoller {
    handle: JoinHandle<()>,
    latest: watch::Receiver<Option<f64>>,
}

impl PricePoller {
    pub fn start<S>(source: Arc<S>, interval: Duration) -> Self
    where
        S: PriceSource + ?Sized + 'static,
    {
        let interval = interval.max(MIN_POLL_INTERVAL);
        let (tx, latest) = watch::channel(None);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match source.fetch_price().await {
                    Ok(price) => {
                        tracing::debug!(price, "price refreshed");
                        if tx.send(Some(price)).is_err() {
                            break;
                        }
                    }
                    Err(err) => tracing::warn!(error = %err, "price refresh failed"),
                }
            }
        });
        tracing::info!(interval_secs = interval.as_secs(), "price poller started");

        Self { handle, latest }
    }

    /// Most recent successfully fetched price.
    pub fn latest(&self) -> Option<f64> {
        *self.latest.borrow()
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn cancel(&self) {
        if !self.handle.is_finished() {
            tracing::info!("price poller cancelled");
        }
        self.handle.abort();
    }
}

impl Drop for PricePoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
