//! Arrival polling for the waiting step.
//!
//! The tracker decides arrival from consecutive snapshots: the first snapshot only
//! establishes a baseline, and arrival is reported when a known next vehicle is replaced
//! by a different one (the bus that was coming has reached the stop and left the slot).

use blindroute_core::{ArrivalQuery, BusArrival, TransitGateway};
use blindroute_voice::AbortOnDrop;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// What one snapshot means relative to the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrivalSignal {
    /// No previous snapshot; this one is the baseline.
    FirstSnapshot,
    /// Same next vehicle (or none was known before).
    Unchanged,
    /// The next vehicle changed; `veh_id` is the new snapshot's next vehicle.
    Arrived { veh_id: String },
}

#[derive(Debug, Clone, Default)]
pub struct ArrivalTracker {
    last: Option<BusArrival>,
}

impl ArrivalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold `snapshot` in; it always replaces the stored one.
    pub fn observe(&mut self, snapshot: BusArrival) -> ArrivalSignal {
        let signal = match &self.last {
            None => ArrivalSignal::FirstSnapshot,
            Some(prev) => match prev.primary_vehicle() {
                Some(prev_veh) if snapshot.primary_vehicle() != Some(prev_veh) => {
                    // the leading vehicle left the list: the bus at the stop is the new
                    // leader, or the previous one when nothing follows it
                    let veh_id = snapshot.primary_vehicle().unwrap_or(prev_veh);
                    ArrivalSignal::Arrived {
                        veh_id: veh_id.to_string(),
                    }
                }
                _ => ArrivalSignal::Unchanged,
            },
        };
        self.last = Some(snapshot);
        signal
    }

    pub fn last(&self) -> Option<&BusArrival> {
        self.last.as_ref()
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Query once immediately, then every `period`, handing each snapshot to `on_snapshot`.
/// Failed queries are skipped; the next tick retries. Drop the guard to stop.
pub fn spawn_arrival_poller<F>(
    gateway: Arc<dyn TransitGateway>,
    query: ArrivalQuery,
    period: Duration,
    on_snapshot: F,
) -> AbortOnDrop<()>
where
    F: Fn(BusArrival) + Send + 'static,
{
    AbortOnDrop::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match gateway.poll_arrival(&query).await {
                Ok(arrival) => on_snapshot(arrival),
                Err(e) => debug!(
                    "[POLLER] arrival query for {}/{} failed: {}",
                    query.ars_id, query.bus_route_id, e
                ),
            }
        }
    })
}
