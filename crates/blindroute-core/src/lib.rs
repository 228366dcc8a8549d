//! Blindroute core: transit domain types and the contracts the guided flows consume.
//!
//! The flows only ever see [`TransitGateway`] and [`ChatAssistant`]. The HTTP client
//! ([`HttpTransitGateway`]) talks to the proxy gateway, which in turn uses the upstream
//! client ([`SeoulBusApi`]), the chat bridge ([`CompletionChat`]) and the
//! [`ReservationStore`].

pub mod boarding;
pub mod chat;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http_gateway;
pub mod navigation;
pub mod store;
pub mod transit;
pub mod upstream;
pub mod wire;

pub use boarding::{ArrivalQuery, Boarding, BoardingRequest, ReservationPayload};
pub use chat::CompletionChat;
pub use config::{BlindrouteConfig, FlowTimings};
pub use error::{CoreError, CoreResult};
pub use gateway::{
    BusList, ChatAssistant, ChatMode, ChatReply, LookupStatus, ReservationOutcome,
    ReservationStatus, StationSearch, TransitGateway, MSG_OK, MSG_SERVICE_ENDED,
};
pub use http_gateway::HttpTransitGateway;
pub use navigation::{Forwarding, NavigationRequest};
pub use store::{ReservationRecord, ReservationStore};
pub use transit::{Bus, BusArrival, ReservationKind, Station};
pub use upstream::SeoulBusApi;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
