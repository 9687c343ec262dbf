// Background refresh loop: a concurrent collection round on every tick

use crate::aggregator::Aggregator;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior, interval_at};

/// Shortest refresh period; `interval_at` rejects a zero period.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Handle to the running refresh task. Dropping it also stops the loop.
pub struct RefreshScheduler {
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl RefreshScheduler {
    /// Runs one concurrent round to completion, then starts the loop. The
    /// store is populated by the time this returns.
    pub async fn start(aggregator: Aggregator, period: Duration) -> Self {
        let outcomes = aggregator.collect_all_concurrent().await;
        for (domain, error) in &outcomes {
            tracing::warn!(domain = %domain, error = %error, "initial collection failed");
        }
        Self::spawn(aggregator, period)
    }

    /// Starts the loop without an initial round. The first round runs one full
    /// `period` from now.
    pub fn spawn(aggregator: Aggregator, period: Duration) -> Self {
        if period < MIN_PERIOD {
            tracing::warn!(?period, min = ?MIN_PERIOD, "refresh period too short, using minimum");
        }
        let period = period.max(MIN_PERIOD);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let mut tick = interval_at(Instant::now() + period, period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tracing::info!(interval_secs = period.as_secs(), "refresh scheduler started");

            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        let outcomes = aggregator.collect_all_concurrent().await;
                        if !outcomes.is_empty() {
                            let failed: Vec<String> = outcomes
                                .iter()
                                .map(|(d, e)| format!("{d}: {e}"))
                                .collect();
                            tracing::warn!(failed = ?failed, "refresh round finished with failures");
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::info!("refresh scheduler stopping");
                        break;
                    }
                }
            }
        });
        Self {
            shutdown_tx,
            handle,
        }
    }

    /// Signals the loop and waits for it to exit. A round already in flight
    /// finishes first.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "refresh scheduler task failed");
        }
    }
}
