use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::repository::TenancyStore;
use super::service::TenancyService;

/// Run one expiry pass for the service's current day, returning how many leases expired.
///
/// Failures are logged and reported as zero so a periodic caller keeps going.
pub fn sweep_once<S>(service: &TenancyService<S>) -> usize
where
    S: TenancyStore + 'static,
{
    let as_of = service.today();
    match service.sweep_expired(as_of) {
        Ok(expired) => expired.len(),
        Err(err) => {
            warn!(%as_of, error = %err, "expiry sweep failed");
            0
        }
    }
}

/// Drive `sweep_once` forever on a fixed period. `every` must be non-zero.
pub async fn run_expiry_sweep<S>(service: Arc<TenancyService<S>>, every: Duration)
where
    S: TenancyStore + 'static,
{
    info!(period_secs = every.as_secs(), "expiry sweep scheduled");
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        sweep_once(&service);
    }
}
