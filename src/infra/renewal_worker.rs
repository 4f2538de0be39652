use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

use crate::use_cases::renewal::RenewalUseCases;

#[derive(Debug, Clone, Copy)]
pub struct SweepSchedule {
    pub renewal_interval: Duration,
    pub expiration_interval: Duration,
    pub lookahead: TimeDelta,
}

/// Drives both sweeps from one task, so within a process they never overlap.
pub async fn run_renewal_loop(renewal_use_cases: Arc<RenewalUseCases>, schedule: SweepSchedule) {
    let mut renewal_ticker = interval(schedule.renewal_interval);
    let mut expiration_ticker = interval(schedule.expiration_interval);
    renewal_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    expiration_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        renewal_every_secs = schedule.renewal_interval.as_secs(),
        expiration_every_secs = schedule.expiration_interval.as_secs(),
        lookahead_hours = schedule.lookahead.num_hours(),
        "Subscription sweep worker started"
    );

    loop {
        tokio::select! {
            _ = renewal_ticker.tick() => {
                if let Err(e) = renewal_use_cases.auto_renew_sweep(schedule.lookahead).await {
                    error!(error = %e, "Auto-renew sweep failed");
                }
            }
            _ = expiration_ticker.tick() => {
                if let Err(e) = renewal_use_cases.expiration_sweep().await {
                    error!(error = %e, "Expiration sweep failed");
                }
            }
        }
    }
}
