//! The route-finder boarding flow, entered with a resolved [`Forwarding`]:
//! `RoutingConfirm → ReservationBusConfirm → WaitingBus → ReservationDesConfirm`.
//!
//! The boarding reservation is created on the forward swipe out of
//! `ReservationBusConfirm`, so the waiting step always starts with a confirmed boarding.

use crate::context::{FlowContext, FlowExit, FlowHandle};
use crate::event::{ContentRegion, FlowEvent, Inbound, UserInput};
use crate::ride::Ride;
use crate::scope::StepScope;
use crate::script;
use crate::step::PathFinderStep;
use blindroute_core::{
    Boarding, BoardingRequest, BusArrival, Forwarding, ReservationKind, ReservationOutcome,
    ReservationStatus,
};
use blindroute_voice::{AbortOnDrop, Gesture, HapticCue, SwipeDetector, SwipeIntent};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct RouteFinderView {
    pub step: PathFinderStep,
    pub forwarding: Forwarding,
    pub boarding: Option<Boarding>,
    pub arrival: Option<BusArrival>,
    pub on_board_veh_id: Option<String>,
    pub busy: bool,
}

pub struct RouteFinderFlow {
    ctx: FlowContext,
    forwarding: Forwarding,
    step: PathFinderStep,
    scope: StepScope,
    detector: SwipeDetector,
    ride: Option<Ride>,
    view_tx: watch::Sender<RouteFinderView>,
}

impl RouteFinderFlow {
    pub fn spawn(ctx: FlowContext, forwarding: Forwarding) -> FlowHandle<RouteFinderView> {
        let (tx, rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(RouteFinderView {
            step: PathFinderStep::RoutingConfirm,
            forwarding: forwarding.clone(),
            boarding: None,
            arrival: None,
            on_board_veh_id: None,
            busy: false,
        });
        let flow = Self {
            ctx,
            forwarding,
            step: PathFinderStep::RoutingConfirm,
            scope: StepScope::new(tx.clone()),
            detector: SwipeDetector::default(),
            ride: None,
            view_tx,
        };
        let task = AbortOnDrop::spawn(flow.run(rx));
        FlowHandle::new(tx, view_rx, task)
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Inbound>) -> FlowExit {
        info!(
            "[ROUTE] flow started: {} -> {} via {}",
            self.forwarding.from_station_nm, self.forwarding.to_station_nm, self.forwarding.bus_route_nm
        );
        self.enter();
        self.publish();
        while let Some(inbound) = rx.recv().await {
            let exit = match inbound {
                Inbound::User(input) => self.on_input(input),
                Inbound::Step { generation, event } if self.scope.accepts(generation) => {
                    self.on_event(event)
                }
                Inbound::Step { generation, .. } => {
                    debug!("[ROUTE] stale event from step {}", generation);
                    None
                }
            };
            self.publish();
            if let Some(exit) = exit {
                info!("[ROUTE] flow finished: {:?}", exit);
                return exit;
            }
        }
        FlowExit::Home
    }

    fn publish(&self) {
        let view = RouteFinderView {
            step: self.step,
            forwarding: self.forwarding.clone(),
            boarding: self.ride.as_ref().map(|r| r.boarding().clone()),
            arrival: self.ride.as_ref().and_then(|r| r.arrival().cloned()),
            on_board_veh_id: self
                .ride
                .as_ref()
                .and_then(|r| r.on_board_veh_id().map(str::to_string)),
            busy: self.scope.is_busy(),
        };
        self.view_tx.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }

    fn go(&mut self, step: PathFinderStep) {
        self.scope.renew();
        debug!(
            "[ROUTE] {} -> {} (step {})",
            self.step.as_str(),
            step.as_str(),
            self.scope.generation()
        );
        if !step.holds_boarding() {
            self.ride = None;
        }
        self.step = step;
        self.enter();
    }

    fn back(&mut self) -> Option<FlowExit> {
        match self.step.previous() {
            Some(previous) => {
                self.go(previous);
                None
            }
            None => Some(FlowExit::Home),
        }
    }

    fn enter(&mut self) {
        match self.step {
            PathFinderStep::RoutingConfirm => {
                self.ctx.voice.cue(HapticCue::ScreenEntry);
                self.announce(script::routing(&self.forwarding));
            }
            PathFinderStep::ReservationBusConfirm => {
                self.ctx.voice.cue(HapticCue::ScreenEntry);
                self.announce(script::bus_confirm(&self.forwarding));
            }
            PathFinderStep::WaitingBus => match self.ride.as_mut() {
                Some(ride) => ride.enter_waiting(&self.ctx, &mut self.scope),
                None => warn!("[ROUTE] waiting step without a boarding"),
            },
            PathFinderStep::ReservationDesConfirm => match self.ride.as_mut() {
                Some(ride) => ride.enter_alighting(&self.ctx, &mut self.scope),
                None => warn!("[ROUTE] alighting step without a boarding"),
            },
        }
    }

    fn announce(&mut self, text: String) {
        if self.scope.take_first_announcement() {
            self.ctx.voice.announce_primed(text);
        } else {
            self.ctx.voice.announce(text);
        }
    }

    fn on_input(&mut self, input: UserInput) -> Option<FlowExit> {
        match input {
            UserInput::Pointer(event) => match self.detector.feed(event) {
                Some(Gesture::Swipe(direction)) => self.on_swipe(direction.intent()),
                Some(Gesture::Tap { .. }) => {
                    self.on_tap(ContentRegion::Content);
                    None
                }
                None => None,
            },
            UserInput::Swipe(intent) => self.on_swipe(intent),
            UserInput::Tap(region) => {
                self.on_tap(region);
                None
            }
            UserInput::Text(_) | UserInput::StartListening => None,
        }
    }

    fn on_swipe(&mut self, intent: SwipeIntent) -> Option<FlowExit> {
        if self.scope.gestures_blocked() {
            debug!("[ROUTE] {:?} ignored while busy", intent);
            return None;
        }
        match (self.step, intent) {
            (PathFinderStep::RoutingConfirm, SwipeIntent::Forward) => {
                self.go(PathFinderStep::ReservationBusConfirm)
            }
            (PathFinderStep::ReservationBusConfirm, SwipeIntent::Forward) => self.reserve(),
            (PathFinderStep::WaitingBus, SwipeIntent::Forward) => {
                if let Some(ride) = self.ride.as_mut() {
                    ride.report_boarded(&self.ctx, &mut self.scope);
                }
            }
            (PathFinderStep::WaitingBus, SwipeIntent::Backward) => {
                if let Some(ride) = self.ride.as_mut() {
                    ride.cancel(&self.ctx, &mut self.scope);
                }
            }
            (PathFinderStep::ReservationDesConfirm, SwipeIntent::Forward) => {
                if let Some(ride) = self.ride.as_ref() {
                    ride.request_alighting(&self.ctx, &mut self.scope);
                }
            }
            (_, SwipeIntent::Backward) => return self.back(),
            (_, SwipeIntent::NextItem | SwipeIntent::PreviousItem) => {}
        }
        None
    }

    fn on_tap(&self, _region: ContentRegion) {
        if self.scope.is_held() {
            debug!("[ROUTE] tap ignored while the step is held");
            return;
        }
        match self.step {
            PathFinderStep::RoutingConfirm => {
                self.ctx.voice.announce(script::routing(&self.forwarding))
            }
            PathFinderStep::ReservationBusConfirm => {
                self.ctx.voice.announce(script::bus_confirm(&self.forwarding))
            }
            PathFinderStep::WaitingBus => {
                if let Some(ride) = self.ride.as_ref() {
                    ride.repeat_waiting(&self.ctx);
                }
            }
            PathFinderStep::ReservationDesConfirm => {
                if let Some(ride) = self.ride.as_ref() {
                    ride.repeat_alighting(&self.ctx);
                }
            }
        }
    }

    fn reserve(&mut self) {
        let request = self.forwarding.boarding_request();
        let gateway = self.ctx.gateway.clone();
        let timings = self.ctx.timings;
        let emitter = self.scope.emitter();
        let started = self.scope.start_commit(async move {
            tokio::time::sleep(timings.reserve_delay).await;
            let outcome = gateway
                .create_boarding_reservation(&request, ReservationKind::Boarding)
                .await;
            emitter.emit(FlowEvent::Reserved { request, outcome });
        });
        if started {
            self.ctx.voice.cue(HapticCue::ActionStart);
        }
    }

    fn on_event(&mut self, event: FlowEvent) -> Option<FlowExit> {
        match event {
            FlowEvent::Reserved { request, outcome } => self.on_reserved(request, outcome),
            FlowEvent::Snapshot(arrival) => {
                if let (PathFinderStep::WaitingBus, Some(ride)) = (self.step, self.ride.as_mut()) {
                    ride.on_snapshot(&self.ctx, &mut self.scope, arrival);
                }
            }
            FlowEvent::ArrivalConfirmed { veh_id } => {
                if let Some(ride) = self.ride.as_mut() {
                    ride.board(veh_id);
                    self.go(PathFinderStep::ReservationDesConfirm);
                }
            }
            FlowEvent::CancelSpoken => return self.back(),
            FlowEvent::Alighted(outcome) => {
                if let Some(ride) = self.ride.as_ref() {
                    ride.on_alighted(&self.ctx, &mut self.scope, outcome);
                }
            }
            FlowEvent::AlightAnnounced => return Some(FlowExit::Completed),
            FlowEvent::Heard(_)
            | FlowEvent::EmptyQuery
            | FlowEvent::StationsFound { .. }
            | FlowEvent::BusesListed(_)
            | FlowEvent::ChatReplied { .. } => {}
        }
        None
    }

    fn on_reserved(&mut self, request: BoardingRequest, outcome: ReservationOutcome) {
        self.scope.end_busy();
        match (outcome.status, outcome.reservation_id) {
            (ReservationStatus::Accepted, Some(id)) => {
                info!("[ROUTE] boarding reserved ({})", id);
                let destination = Some(self.forwarding.to_station_nm.clone());
                self.ride = Some(Ride::new(request.confirm(id), destination));
                self.go(PathFinderStep::WaitingBus);
            }
            (ReservationStatus::ServiceEnded, _) => {
                self.ctx.voice.announce(script::NO_VEHICLE_RUNNING)
            }
            _ => self.ctx.voice.announce(script::RESERVATION_FAILED),
        }
    }
}

impl Drop for RouteFinderFlow {
    fn drop(&mut self) {
        self.ctx.voice.silence();
    }
}
