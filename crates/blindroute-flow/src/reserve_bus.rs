//! The bus reservation flow:
//! `SearchStation → SelectStation → SelectBus → WaitingBus → ReservationDesConfirm`.

use crate::context::{FlowContext, FlowExit, FlowHandle};
use crate::event::{ContentRegion, FlowEvent, Inbound, UserInput};
use crate::ride::Ride;
use crate::scope::StepScope;
use crate::script;
use crate::step::ReserveBusStep;
use blindroute_core::{
    Boarding, BoardingRequest, Bus, BusArrival, BusList, LookupStatus, ReservationKind,
    ReservationOutcome, ReservationStatus, Station, StationSearch,
};
use blindroute_voice::{AbortOnDrop, Gesture, HapticCue, SwipeDetector, SwipeIntent, VoiceOutcome};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Longest spoken station name kept from one recognition session.
pub const STATION_NAME_MAX_SPOKEN: usize = 30;
/// Longest typed station name.
pub const STATION_NAME_MAX_TYPED: usize = 50;

/// What the reservation screens render.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationView {
    pub step: ReserveBusStep,
    pub station_name: String,
    pub stations: Vec<Station>,
    pub station_index: usize,
    pub buses: Vec<Bus>,
    pub bus_index: usize,
    pub boarding: Option<Boarding>,
    pub arrival: Option<BusArrival>,
    pub on_board_veh_id: Option<String>,
    pub busy: bool,
}

pub struct ReservationFlow {
    ctx: FlowContext,
    step: ReserveBusStep,
    scope: StepScope,
    detector: SwipeDetector,
    station_name: String,
    stations: Vec<Station>,
    station_index: usize,
    buses: Vec<Bus>,
    bus_index: usize,
    ride: Option<Ride>,
    view_tx: watch::Sender<ReservationView>,
}

impl ReservationFlow {
    /// Start the flow at `SearchStation`.
    pub fn spawn(ctx: FlowContext) -> FlowHandle<ReservationView> {
        let (tx, rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(ReservationView {
            step: ReserveBusStep::SearchStation,
            station_name: String::new(),
            stations: Vec::new(),
            station_index: 0,
            buses: Vec::new(),
            bus_index: 0,
            boarding: None,
            arrival: None,
            on_board_veh_id: None,
            busy: false,
        });
        let flow = Self {
            ctx,
            step: ReserveBusStep::SearchStation,
            scope: StepScope::new(tx.clone()),
            detector: SwipeDetector::default(),
            station_name: String::new(),
            stations: Vec::new(),
            station_index: 0,
            buses: Vec::new(),
            bus_index: 0,
            ride: None,
            view_tx,
        };
        let task = AbortOnDrop::spawn(flow.run(rx));
        FlowHandle::new(tx, view_rx, task)
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Inbound>) -> FlowExit {
        info!("[RESERVE] flow started");
        self.enter();
        self.publish();
        while let Some(inbound) = rx.recv().await {
            let exit = match inbound {
                Inbound::User(input) => self.on_input(input),
                Inbound::Step { generation, event } if self.scope.accepts(generation) => {
                    self.on_event(event)
                }
                Inbound::Step { generation, event } => {
                    debug!("[RESERVE] stale event from step {}: {:?}", generation, event);
                    None
                }
            };
            self.publish();
            if let Some(exit) = exit {
                info!("[RESERVE] flow finished: {:?}", exit);
                return exit;
            }
        }
        FlowExit::Home
    }

    fn publish(&self) {
        let view = ReservationView {
            step: self.step,
            station_name: self.station_name.clone(),
            stations: self.stations.clone(),
            station_index: self.station_index,
            buses: self.buses.clone(),
            bus_index: self.bus_index,
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

    fn go(&mut self, step: ReserveBusStep) {
        self.scope.renew();
        debug!(
            "[RESERVE] {} -> {} (step {})",
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
            ReserveBusStep::SearchStation => {
                self.ctx.voice.cue(HapticCue::ScreenEntry);
                self.announce(script::SEARCH_GUIDE, script::SEARCH_GUIDE.to_string());
            }
            ReserveBusStep::SelectStation => {
                self.station_index = 0;
                self.ctx.voice.cue(HapticCue::ScreenEntry);
                self.announce_station();
            }
            ReserveBusStep::SelectBus => {
                self.bus_index = 0;
                self.ctx.voice.cue(HapticCue::ScreenEntry);
                self.announce_bus();
            }
            ReserveBusStep::WaitingBus => match self.ride.as_mut() {
                Some(ride) => ride.enter_waiting(&self.ctx, &mut self.scope),
                None => warn!("[RESERVE] waiting step without a boarding"),
            },
            ReserveBusStep::ReservationDesConfirm => match self.ride.as_mut() {
                Some(ride) => ride.enter_alighting(&self.ctx, &mut self.scope),
                None => warn!("[RESERVE] alighting step without a boarding"),
            },
        }
    }

    /// First announcement of a step carries `guide` after the priming pause.
    fn announce(&mut self, guide: &str, body: String) {
        if self.scope.take_first_announcement() {
            let text = if guide == body { body } else { format!("{} {}", guide, body) };
            self.ctx.voice.announce_primed(text);
        } else {
            self.ctx.voice.announce(body);
        }
    }

    fn announce_station(&mut self) {
        if let Some(station) = self.stations.get(self.station_index) {
            let body = script::station_item(station);
            self.announce(script::STATION_GUIDE, body);
        }
    }

    fn announce_bus(&mut self) {
        if let Some(bus) = self.buses.get(self.bus_index) {
            let body = script::bus_item(bus);
            self.announce(script::BUS_GUIDE, body);
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
            UserInput::Text(text) => {
                if self.step == ReserveBusStep::SearchStation {
                    self.station_name = text.chars().take(STATION_NAME_MAX_TYPED).collect();
                }
                None
            }
            UserInput::StartListening => {
                self.start_listening();
                None
            }
        }
    }

    fn on_swipe(&mut self, intent: SwipeIntent) -> Option<FlowExit> {
        if self.scope.gestures_blocked() {
            debug!("[RESERVE] {:?} ignored while busy", intent);
            return None;
        }
        match (self.step, intent) {
            (ReserveBusStep::SearchStation, SwipeIntent::Forward) => self.search(),
            (ReserveBusStep::SearchStation, SwipeIntent::Backward) => {
                self.ctx.voice.cue(HapticCue::ActionStart);
                self.scope.stop_listening();
                return Some(FlowExit::Home);
            }
            (ReserveBusStep::SelectStation, SwipeIntent::Forward) => self.list_buses(),
            (ReserveBusStep::SelectBus, SwipeIntent::Forward) => self.reserve(),
            (
                ReserveBusStep::SelectStation | ReserveBusStep::SelectBus,
                SwipeIntent::NextItem | SwipeIntent::PreviousItem,
            ) => self.slide(intent),
            (ReserveBusStep::WaitingBus, SwipeIntent::Forward) => {
                if let Some(ride) = self.ride.as_mut() {
                    ride.report_boarded(&self.ctx, &mut self.scope);
                }
            }
            (ReserveBusStep::WaitingBus, SwipeIntent::Backward) => {
                if let Some(ride) = self.ride.as_mut() {
                    ride.cancel(&self.ctx, &mut self.scope);
                }
            }
            (ReserveBusStep::ReservationDesConfirm, SwipeIntent::Forward) => {
                if let Some(ride) = self.ride.as_ref() {
                    ride.request_alighting(&self.ctx, &mut self.scope);
                }
            }
            (_, SwipeIntent::Backward) => return self.back(),
            (_, SwipeIntent::NextItem | SwipeIntent::PreviousItem) => {}
        }
        None
    }

    /// Re-speak the current content. Never changes state.
    fn on_tap(&self, _region: ContentRegion) {
        if self.scope.is_held() {
            debug!("[RESERVE] tap ignored while the step is held");
            return;
        }
        match self.step {
            ReserveBusStep::SearchStation => self.ctx.voice.announce(script::SEARCH_GUIDE),
            ReserveBusStep::SelectStation => {
                if let Some(station) = self.stations.get(self.station_index) {
                    self.ctx.voice.cue(HapticCue::ActionStart);
                    self.ctx.voice.announce(script::station_item(station));
                }
            }
            ReserveBusStep::SelectBus => {
                if let Some(bus) = self.buses.get(self.bus_index) {
                    self.ctx.voice.cue(HapticCue::ActionStart);
                    self.ctx.voice.announce(script::bus_item(bus));
                }
            }
            ReserveBusStep::WaitingBus => {
                if let Some(ride) = self.ride.as_ref() {
                    ride.repeat_waiting(&self.ctx);
                }
            }
            ReserveBusStep::ReservationDesConfirm => {
                if let Some(ride) = self.ride.as_ref() {
                    ride.repeat_alighting(&self.ctx);
                }
            }
        }
    }

    fn start_listening(&mut self) {
        if self.step != ReserveBusStep::SearchStation || self.scope.is_busy() {
            return;
        }
        let Some(session) = self.ctx.voice.listen(STATION_NAME_MAX_SPOKEN) else {
            return;
        };
        let emitter = self.scope.emitter();
        self.scope.set_listener(AbortOnDrop::spawn(async move {
            let outcome = session.outcome().await;
            emitter.emit(FlowEvent::Heard(outcome));
        }));
    }

    fn slide(&mut self, intent: SwipeIntent) {
        let (index, len) = match self.step {
            ReserveBusStep::SelectStation => (&mut self.station_index, self.stations.len()),
            ReserveBusStep::SelectBus => (&mut self.bus_index, self.buses.len()),
            _ => return,
        };
        if len <= 1 {
            return;
        }
        *index = match intent {
            SwipeIntent::NextItem => (*index + 1) % len,
            _ => (*index + len - 1) % len,
        };
        self.ctx.voice.cue(HapticCue::SlideChange);
        self.scope.debounce(self.ctx.timings.slide_debounce);
        match self.step {
            ReserveBusStep::SelectStation => self.announce_station(),
            _ => self.announce_bus(),
        }
    }

    fn search(&mut self) {
        let query = self.station_name.trim().to_string();
        let gateway = self.ctx.gateway.clone();
        let timings = self.ctx.timings;
        let emitter = self.scope.emitter();
        let started = self.scope.start_action(timings.busy_timeout, async move {
            tokio::time::sleep(timings.search_delay).await;
            if query.is_empty() {
                emitter.emit(FlowEvent::EmptyQuery);
                return;
            }
            let search = gateway.search_stations(&query).await;
            if search.status == LookupStatus::Ok {
                tokio::time::sleep(timings.success_transition_delay).await;
            }
            emitter.emit(FlowEvent::StationsFound { query, search });
        });
        if started {
            self.ctx.voice.cue(HapticCue::ActionStart);
            self.scope.stop_listening();
        }
    }

    fn list_buses(&mut self) {
        let Some(station) = self.stations.get(self.station_index).cloned() else {
            return;
        };
        let gateway = self.ctx.gateway.clone();
        let timings = self.ctx.timings;
        let emitter = self.scope.emitter();
        let started = self.scope.start_action(timings.busy_timeout, async move {
            let list = gateway.list_buses_at_station(&station).await;
            if list.status == LookupStatus::Ok {
                tokio::time::sleep(timings.success_transition_delay).await;
            }
            emitter.emit(FlowEvent::BusesListed(list));
        });
        if started {
            self.ctx.voice.cue(HapticCue::ActionStart);
        }
    }

    fn reserve(&mut self) {
        let (Some(station), Some(bus)) = (
            self.stations.get(self.station_index).cloned(),
            self.buses.get(self.bus_index).cloned(),
        ) else {
            return;
        };
        let request = BoardingRequest::new(station, bus);
        let gateway = self.ctx.gateway.clone();
        let timings = self.ctx.timings;
        let emitter = self.scope.emitter();
        let started = self.scope.start_commit(async move {
            tokio::time::sleep(timings.reserve_delay).await;
            let outcome = gateway
                .create_boarding_reservation(&request, ReservationKind::Boarding)
                .await;
            if outcome.status == ReservationStatus::Accepted {
                tokio::time::sleep(timings.success_transition_delay).await;
            }
            emitter.emit(FlowEvent::Reserved { request, outcome });
        });
        if started {
            self.ctx.voice.cue(HapticCue::ActionStart);
        }
    }

    fn on_event(&mut self, event: FlowEvent) -> Option<FlowExit> {
        match event {
            FlowEvent::Heard(VoiceOutcome::Result(text)) => {
                if self.step == ReserveBusStep::SearchStation {
                    self.station_name = text;
                }
            }
            FlowEvent::Heard(VoiceOutcome::AutoStopped) => {
                debug!("[RESERVE] recognition stopped without a result")
            }
            FlowEvent::EmptyQuery => {
                self.scope.end_busy();
                self.ctx.voice.announce(script::NO_WORDS_DETECTED);
            }
            FlowEvent::StationsFound { query, search } => self.on_stations(query, search),
            FlowEvent::BusesListed(list) => self.on_buses(list),
            FlowEvent::Reserved { request, outcome } => self.on_reserved(request, outcome),
            FlowEvent::Snapshot(arrival) => {
                if let (ReserveBusStep::WaitingBus, Some(ride)) = (self.step, self.ride.as_mut()) {
                    ride.on_snapshot(&self.ctx, &mut self.scope, arrival);
                }
            }
            FlowEvent::ArrivalConfirmed { veh_id } => {
                if let Some(ride) = self.ride.as_mut() {
                    ride.board(veh_id);
                    self.go(ReserveBusStep::ReservationDesConfirm);
                }
            }
            FlowEvent::CancelSpoken => return self.back(),
            FlowEvent::Alighted(outcome) => {
                if let Some(ride) = self.ride.as_ref() {
                    ride.on_alighted(&self.ctx, &mut self.scope, outcome);
                }
            }
            FlowEvent::AlightAnnounced => return Some(FlowExit::Completed),
            FlowEvent::ChatReplied { .. } => {}
        }
        None
    }

    fn on_stations(&mut self, query: String, search: StationSearch) {
        self.scope.end_busy();
        match search.status {
            LookupStatus::Ok => {
                info!("[RESERVE] '{}' matched {} stations", query, search.stations.len());
                self.stations = search.stations;
                self.go(ReserveBusStep::SelectStation);
            }
            LookupStatus::NoResults => self.ctx.voice.announce(script::no_stations_found(&query)),
            LookupStatus::Failed => self.ctx.voice.announce(script::STATION_LOOKUP_FAILED),
        }
    }

    fn on_buses(&mut self, list: BusList) {
        self.scope.end_busy();
        match list.status {
            LookupStatus::Ok => {
                self.buses = list.buses;
                self.go(ReserveBusStep::SelectBus);
            }
            LookupStatus::NoResults => self.ctx.voice.announce(script::NO_BUSES_AT_STATION),
            LookupStatus::Failed => self.ctx.voice.announce(script::BUS_LOOKUP_FAILED),
        }
    }

    fn on_reserved(&mut self, request: BoardingRequest, outcome: ReservationOutcome) {
        self.scope.end_busy();
        match (outcome.status, outcome.reservation_id) {
            (ReservationStatus::Accepted, Some(id)) => {
                info!("[RESERVE] boarding reserved ({})", id);
                self.ride = Some(Ride::new(request.confirm(id), None));
                self.go(ReserveBusStep::WaitingBus);
            }
            (ReservationStatus::ServiceEnded, _) => {
                self.ctx.voice.announce(script::NO_VEHICLE_RUNNING)
            }
            _ => self.ctx.voice.announce(script::RESERVATION_FAILED),
        }
    }
}

/// Leaving the screen cuts off whatever it was saying.
impl Drop for ReservationFlow {
    fn drop(&mut self) {
        self.ctx.voice.silence();
    }
}
