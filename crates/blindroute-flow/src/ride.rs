//! The confirmed part of a trip, shared by both transit flows: waiting for the reserved
//! bus, then the alighting reservation.

use crate::context::FlowContext;
use crate::event::FlowEvent;
use crate::poller::{spawn_arrival_poller, ArrivalSignal, ArrivalTracker};
use crate::scope::StepScope;
use crate::script;
use blindroute_core::{Boarding, BusArrival, ReservationKind, ReservationOutcome, ReservationStatus};
use blindroute_voice::HapticCue;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub(crate) struct Ride {
    boarding: Boarding,
    destination: Option<String>,
    tracker: ArrivalTracker,
    on_board_veh_id: Option<String>,
}

impl Ride {
    pub(crate) fn new(boarding: Boarding, destination: Option<String>) -> Self {
        Self {
            boarding,
            destination,
            tracker: ArrivalTracker::new(),
            on_board_veh_id: None,
        }
    }

    pub(crate) fn boarding(&self) -> &Boarding {
        &self.boarding
    }

    pub(crate) fn arrival(&self) -> Option<&BusArrival> {
        self.tracker.last()
    }

    pub(crate) fn on_board_veh_id(&self) -> Option<&str> {
        self.on_board_veh_id.as_deref()
    }

    fn route(&self) -> &str {
        self.boarding.bus().spoken_name()
    }

    pub(crate) fn enter_waiting(&mut self, ctx: &FlowContext, scope: &mut StepScope) {
        self.tracker.reset();
        self.on_board_veh_id = None;
        ctx.voice.cue(HapticCue::ScreenEntry);
        let emitter = scope.emitter();
        let poller = spawn_arrival_poller(
            ctx.gateway.clone(),
            self.boarding.arrival_query(),
            ctx.timings.poll_interval,
            move |arrival| emitter.emit(FlowEvent::Snapshot(arrival)),
        );
        scope.set_poller(poller);
        info!(
            "[RIDE] waiting for route {} at {} (reservation {})",
            self.boarding.bus().bus_route_id,
            self.boarding.station().ars_id,
            self.boarding.reservation_id()
        );
    }

    pub(crate) fn on_snapshot(&mut self, ctx: &FlowContext, scope: &mut StepScope, arrival: BusArrival) {
        if !scope.is_polling() {
            return;
        }
        match self.tracker.observe(arrival) {
            ArrivalSignal::FirstSnapshot => {
                if let Some(arrival) = self.tracker.last() {
                    let text = script::waiting(self.route(), arrival, true);
                    if scope.take_first_announcement() {
                        ctx.voice.announce_primed(text);
                    } else {
                        ctx.voice.announce(text);
                    }
                }
            }
            ArrivalSignal::Unchanged => debug!("[RIDE] no change in next vehicle"),
            ArrivalSignal::Arrived { veh_id } => self.begin_arrival(ctx, scope, veh_id),
        }
    }

    /// Left swipe while waiting: the rider says the bus is here.
    pub(crate) fn report_boarded(&mut self, ctx: &FlowContext, scope: &mut StepScope) {
        let Some(veh_id) = self.tracker.last().map(|a| a.bus_veh_id1.trim().to_string()) else {
            debug!("[RIDE] boarding swipe before the first snapshot, ignored");
            return;
        };
        self.begin_arrival(ctx, scope, veh_id);
    }

    fn begin_arrival(&mut self, ctx: &FlowContext, scope: &mut StepScope, veh_id: String) {
        info!("🚌 [RIDE] bus arrived (vehicle {})", veh_id);
        scope.stop_poller();
        scope.hold();
        ctx.voice.cue(HapticCue::Arrival);
        ctx.voice.announce(script::BUS_ARRIVED);
        let emitter = scope.emitter();
        let delay = ctx.timings.arrival_confirm_delay;
        scope.spawn(async move {
            tokio::time::sleep(delay).await;
            emitter.emit(FlowEvent::ArrivalConfirmed { veh_id });
        });
    }

    /// Right swipe while waiting: stop polling, say so, then go back.
    pub(crate) fn cancel(&mut self, ctx: &FlowContext, scope: &mut StepScope) {
        scope.stop_poller();
        scope.hold();
        let emitter = scope.emitter();
        ctx.voice.announce_then(script::RESERVATION_CANCELLED, move || {
            emitter.emit(FlowEvent::CancelSpoken)
        });
    }

    pub(crate) fn board(&mut self, veh_id: String) {
        self.on_board_veh_id = Some(veh_id);
    }

    pub(crate) fn repeat_waiting(&self, ctx: &FlowContext) {
        if let Some(arrival) = self.tracker.last() {
            ctx.voice.announce(script::waiting(self.route(), arrival, false));
        }
    }

    pub(crate) fn enter_alighting(&mut self, ctx: &FlowContext, scope: &mut StepScope) {
        ctx.voice.cue(HapticCue::ScreenEntry);
        let text = script::alighting(self.route(), self.destination.as_deref());
        if scope.take_first_announcement() {
            ctx.voice.announce_primed(text);
        } else {
            ctx.voice.announce(text);
        }
    }

    /// Left swipe on the boarded screen: reserve alighting.
    pub(crate) fn request_alighting(&self, ctx: &FlowContext, scope: &mut StepScope) {
        let gateway = ctx.gateway.clone();
        let request = self.boarding.request();
        let emitter = scope.emitter();
        let started = scope.start_commit(async move {
            let outcome = gateway
                .create_boarding_reservation(&request, ReservationKind::Alighting)
                .await;
            emitter.emit(FlowEvent::Alighted(outcome));
        });
        if started {
            ctx.voice.cue(HapticCue::ActionStart);
        }
    }

    pub(crate) fn on_alighted(&self, ctx: &FlowContext, scope: &mut StepScope, outcome: ReservationOutcome) {
        match outcome.status {
            ReservationStatus::Accepted => {
                info!(
                    "[RIDE] alighting reserved ({})",
                    outcome.reservation_id.as_deref().unwrap_or_default()
                );
                scope.hold();
                let emitter = scope.emitter();
                ctx.voice.announce_then(script::ALIGHTING_RESERVED, move || {
                    emitter.emit(FlowEvent::AlightAnnounced)
                });
            }
            ReservationStatus::ServiceEnded => {
                scope.end_busy();
                ctx.voice.announce(script::NO_VEHICLE_RUNNING);
            }
            ReservationStatus::Failed => {
                scope.end_busy();
                ctx.voice.announce(script::ALIGHTING_FAILED);
            }
        }
    }

    pub(crate) fn repeat_alighting(&self, ctx: &FlowContext) {
        ctx.voice
            .announce(script::alighting(self.route(), self.destination.as_deref()));
    }
}
