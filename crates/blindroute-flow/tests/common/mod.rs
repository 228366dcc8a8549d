//! Recording fakes shared by the flow tests.
#![allow(dead_code)]

use blindroute_core::{
    ArrivalQuery, BoardingRequest, Bus, BusArrival, BusList, ChatAssistant, ChatMode, ChatReply,
    CoreError, CoreResult, FlowTimings, LookupStatus, ReservationKind, ReservationOutcome,
    ReservationPayload, ReservationStatus, Station, StationSearch, TransitGateway, MSG_OK,
};
use blindroute_flow::FlowContext;
use blindroute_voice::{PlaceholderRecognizer, PlaceholderSpeech, PlaceholderVibration, VoiceCoordinator};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn seoul_station_stations() -> Vec<Station> {
    vec![
        Station::new("102000271", "서울역", "02006"),
        Station::new("102000272", "서울역버스환승센터", "02008"),
        Station::new("101000002", "서울역서부", "03123"),
    ]
}

pub fn buses() -> Vec<Bus> {
    let mut a = Bus::new("100100016", "160", "도봉산");
    a.bus_route_abrv = "160".into();
    vec![a, Bus::new("100100118", "402", "광화문")]
}

pub fn snapshot(veh: &str) -> BusArrival {
    BusArrival {
        bus_arr_msg1: "3분후[1번째 전]".into(),
        bus_arr_msg2: "12분후[6번째 전]".into(),
        bus_veh_id1: veh.into(),
        bus_veh_id2: "V99".into(),
    }
}

/// Scripted transit gateway that records every call.
pub struct FakeGateway {
    pub stations: Mutex<StationSearch>,
    pub buses: Mutex<BusList>,
    pub outcomes: Mutex<VecDeque<ReservationOutcome>>,
    pub arrivals: Mutex<VecDeque<Result<BusArrival, String>>>,
    pub hang_search: AtomicBool,
    pub create_delay: Mutex<Duration>,
    pub searches: Mutex<Vec<String>>,
    pub bus_lookups: Mutex<Vec<Station>>,
    pub reservations: Mutex<Vec<ReservationPayload>>,
    pub polls: AtomicUsize,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self {
            stations: Mutex::new(StationSearch {
                status: LookupStatus::Ok,
                stations: seoul_station_stations(),
            }),
            buses: Mutex::new(BusList {
                status: LookupStatus::Ok,
                buses: buses(),
            }),
            outcomes: Mutex::new(VecDeque::new()),
            arrivals: Mutex::new(VecDeque::new()),
            hang_search: AtomicBool::new(false),
            create_delay: Mutex::new(Duration::ZERO),
            searches: Mutex::new(Vec::new()),
            bus_lookups: Mutex::new(Vec::new()),
            reservations: Mutex::new(Vec::new()),
            polls: AtomicUsize::new(0),
        }
    }
}

impl FakeGateway {
    pub fn with_arrivals(snapshots: &[&str]) -> Self {
        let gateway = Self::default();
        gateway.push_arrivals(snapshots);
        gateway
    }

    pub fn push_arrivals(&self, snapshots: &[&str]) {
        let mut arrivals = self.arrivals.lock().unwrap();
        for veh in snapshots {
            arrivals.push_back(Ok(snapshot(veh)));
        }
    }

    pub fn push_arrival_error(&self) {
        self.arrivals
            .lock()
            .unwrap()
            .push_back(Err("timeout".to_string()));
    }

    pub fn push_outcome(&self, outcome: ReservationOutcome) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn reservations(&self) -> Vec<ReservationPayload> {
        self.reservations.lock().unwrap().clone()
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TransitGateway for FakeGateway {
    async fn search_stations(&self, name: &str) -> StationSearch {
        self.searches.lock().unwrap().push(name.to_string());
        if self.hang_search.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.stations.lock().unwrap().clone()
    }

    async fn list_buses_at_station(&self, station: &Station) -> BusList {
        self.bus_lookups.lock().unwrap().push(station.clone());
        self.buses.lock().unwrap().clone()
    }

    async fn create_boarding_reservation(
        &self,
        request: &BoardingRequest,
        kind: ReservationKind,
    ) -> ReservationOutcome {
        let n = {
            let mut reservations = self.reservations.lock().unwrap();
            reservations.push(request.payload(kind));
            reservations.len()
        };
        let delay = *self.create_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ReservationOutcome::classify(MSG_OK, Some(format!("R{}", n))))
    }

    /// Pops scripted snapshots; the last one repeats.
    async fn poll_arrival(&self, _query: &ArrivalQuery) -> CoreResult<BusArrival> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let mut arrivals = self.arrivals.lock().unwrap();
        let next = if arrivals.len() > 1 {
            arrivals.pop_front()
        } else {
            arrivals.front().cloned()
        };
        match next {
            Some(Ok(arrival)) => Ok(arrival),
            Some(Err(e)) => Err(CoreError::Shape(e)),
            None => Err(CoreError::Shape("no snapshot scripted".into())),
        }
    }
}

/// Scripted chat service.
#[derive(Default)]
pub struct FakeChat {
    pub replies: Mutex<VecDeque<CoreResult<ChatReply>>>,
    pub requests: Mutex<Vec<(String, ChatMode)>>,
    /// Per-request reply latency, in request order.
    pub delays: Mutex<VecDeque<Duration>>,
}

impl FakeChat {
    pub fn push(&self, mode: ChatMode, message: &str) {
        self.replies.lock().unwrap().push_back(Ok(ChatReply {
            chat_mode: mode,
            message: message.to_string(),
        }));
    }

    pub fn push_error(&self) {
        self.replies.lock().unwrap().push_back(Err(CoreError::Upstream {
            status: 502,
            message: "bad gateway".into(),
        }));
    }

    pub fn requests(&self) -> Vec<(String, ChatMode)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChatAssistant for FakeChat {
    async fn reply(&self, message: &str, mode: ChatMode) -> CoreResult<ChatReply> {
        self.requests.lock().unwrap().push((message.to_string(), mode));
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CoreError::Shape("no reply scripted".into())));
        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        reply
    }
}

pub struct Rig {
    pub gateway: Arc<FakeGateway>,
    pub speech: Arc<PlaceholderSpeech>,
    pub recognizer: Arc<PlaceholderRecognizer>,
    pub motor: Arc<PlaceholderVibration>,
    pub voice: Arc<VoiceCoordinator>,
    pub ctx: FlowContext,
}

pub fn rig(gateway: FakeGateway) -> Rig {
    rig_with_speech(gateway, PlaceholderSpeech::new())
}

pub fn rig_with_speech(gateway: FakeGateway, speech: PlaceholderSpeech) -> Rig {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
    let gateway = Arc::new(gateway);
    let speech = Arc::new(speech);
    let recognizer = Arc::new(PlaceholderRecognizer::with_latency(Duration::from_secs(2)));
    let motor = Arc::new(PlaceholderVibration::new());
    let voice = Arc::new(VoiceCoordinator::new(
        speech.clone(),
        recognizer.clone(),
        motor.clone(),
    ));
    let ctx = FlowContext::new(gateway.clone(), voice.clone(), FlowTimings::default());
    Rig {
        gateway,
        speech,
        recognizer,
        motor,
        voice,
        ctx,
    }
}

pub async fn settle(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

pub fn accepted(id: &str) -> ReservationOutcome {
    ReservationOutcome {
        status: ReservationStatus::Accepted,
        reservation_id: Some(id.to_string()),
    }
}
