use crate::registry::RoomRegistry;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::info;

/// Background sweep that evicts empty rooms older than one period.
///
/// Side effect only: each tick calls [`RoomRegistry::sweep_stale`] with
/// `stale_after` equal to the tick period, and never blocks registry
/// callers (the sweep itself is a short shard-by-shard critical section).
pub struct IdleReaper {
    registry: RoomRegistry,
    period: Duration,
}

impl IdleReaper {
    pub const DEFAULT_PERIOD: Duration = Duration::from_secs(300);

    pub fn new(registry: RoomRegistry, period: Duration) -> Self {
        Self { registry, period }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        // The schedule is anchored here, not at the task's first poll:
        // the first sweep lands one full period after spawn, so a room
        // created alongside the reaper gets its whole grace period.
        let first_tick = Instant::now() + self.period;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(first_tick, self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let reaped = self.registry.sweep_stale(self.period);
                if reaped > 0 {
                    info!(reaped, "idle reaper removed stale rooms");
                }
            }
        })
    }
}
