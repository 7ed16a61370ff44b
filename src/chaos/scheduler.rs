//! Periodic driver for the deletion cycle

use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::orchestrator::PodChaosMonkey;
use super::selector::VictimSelector;
use crate::k8s::{CandidateMirror, PodDeleter};

/// Run one cycle every `period` until `shutdown` is cancelled.
///
/// The first cycle fires one full period after start. Cycles never
/// overlap: a tick that comes due while a cycle is still running is
/// delayed, and a cycle already in flight when shutdown arrives is
/// allowed to finish. Returns the number of cycles run.
pub async fn run_scheduler<C, M, S>(
    monkey: &PodChaosMonkey<C, M>,
    selector: &S,
    period: Duration,
    shutdown: CancellationToken,
) -> u64
where
    C: PodDeleter,
    M: CandidateMirror,
    S: VictimSelector + ?Sized,
{
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut cycles = 0;

    info!(
        namespace = %monkey.namespace(),
        dry_run = monkey.simulate_only(),
        interval = ?period,
        "Chaos scheduler started"
    );

    loop {
        tokio::select! {
            // prefer shutdown when both are ready
            biased;
            _ = shutdown.cancelled() => {
                info!("Termination signal received, stopping chaos scheduler");
                break;
            }
            _ = ticker.tick() => {
                cycles += 1;
                match monkey.run_cycle(selector).await {
                    Ok(outcome) => match outcome.target() {
                        Some(pod) => info!(cycle = cycles, %outcome, %pod, "Chaos cycle finished"),
                        None => info!(cycle = cycles, %outcome, "Chaos cycle finished"),
                    },
                    Err(e) => error!(cycle = cycles, error = %e, "An error occurred during pod deletion"),
                }
            }
        }
    }

    cycles
}
