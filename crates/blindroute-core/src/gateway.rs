//! Contracts the flows consume: the transit gateway and the chat assistant.
//!
//! Lookups never fail with an error: transport and shape problems are folded into a
//! `Failed` status so callers only ever branch on the status. `poll_arrival` is the
//! exception; it either yields a full snapshot or an error the poller swallows.

use crate::boarding::{ArrivalQuery, BoardingRequest};
use crate::error::CoreResult;
use crate::transit::{Bus, BusArrival, ReservationKind, Station};
use serde::{Deserialize, Serialize};

/// Status message the upstream API and the proxy use for success.
pub const MSG_OK: &str = "정상적으로 처리되었습니다.";
/// Status message for "the route has ended service for the day".
pub const MSG_SERVICE_ENDED: &str = "운행 종료되었습니다.";

/// Outcome class of a list lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStatus {
    Ok,
    NoResults,
    Failed,
}

impl LookupStatus {
    /// Classify a proxy envelope: success message with items, success with none, or anything else.
    pub fn classify(msg: &str, item_count: usize) -> Self {
        match (msg == MSG_OK, item_count) {
            (true, 0) => LookupStatus::NoResults,
            (true, _) => LookupStatus::Ok,
            (false, _) => LookupStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationSearch {
    pub status: LookupStatus,
    pub stations: Vec<Station>,
}

impl StationSearch {
    pub fn failed() -> Self {
        Self {
            status: LookupStatus::Failed,
            stations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusList {
    pub status: LookupStatus,
    pub buses: Vec<Bus>,
}

impl BusList {
    pub fn failed() -> Self {
        Self {
            status: LookupStatus::Failed,
            buses: Vec::new(),
        }
    }
}

/// Outcome class of a reservation create call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationStatus {
    Accepted,
    ServiceEnded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationOutcome {
    pub status: ReservationStatus,
    pub reservation_id: Option<String>,
}

impl ReservationOutcome {
    /// Classify a proxy envelope. Success without an id is a failure.
    pub fn classify(msg: &str, reservation_id: Option<String>) -> Self {
        let status = match (msg, reservation_id.as_deref()) {
            (MSG_OK, Some(id)) if !id.is_empty() => ReservationStatus::Accepted,
            (MSG_SERVICE_ENDED, _) => ReservationStatus::ServiceEnded,
            _ => ReservationStatus::Failed,
        };
        let reservation_id = match status {
            ReservationStatus::Accepted => reservation_id,
            _ => None,
        };
        Self {
            status,
            reservation_id,
        }
    }

    pub fn failed() -> Self {
        Self {
            status: ReservationStatus::Failed,
            reservation_id: None,
        }
    }
}

/// Station search, route lookup, reservation create and arrival polling.
#[async_trait::async_trait]
pub trait TransitGateway: Send + Sync {
    /// Stations whose name contains `name`.
    async fn search_stations(&self, name: &str) -> StationSearch;

    /// Routes serving `station`.
    async fn list_buses_at_station(&self, station: &Station) -> BusList;

    /// Create a boarding or alighting reservation.
    async fn create_boarding_reservation(
        &self,
        request: &BoardingRequest,
        kind: ReservationKind,
    ) -> ReservationOutcome;

    /// One arrival snapshot for the reserved stop + route.
    async fn poll_arrival(&self, query: &ArrivalQuery) -> CoreResult<BusArrival>;
}

/// Conversation mode of the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    /// Free conversation; the service flags navigation intent by answering in blindroute mode.
    #[default]
    Chat,
    /// Collecting start and destination; replies are "start,destination".
    Blindroute,
}

/// One assistant reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub chat_mode: ChatMode,
    pub message: String,
}

/// Chat-completion service behind the assistant screen.
#[async_trait::async_trait]
pub trait ChatAssistant: Send + Sync {
    async fn reply(&self, message: &str, mode: ChatMode) -> CoreResult<ChatReply>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_status_classification() {
        assert_eq!(LookupStatus::classify(MSG_OK, 3), LookupStatus::Ok);
        assert_eq!(LookupStatus::classify(MSG_OK, 0), LookupStatus::NoResults);
        assert_eq!(
            LookupStatus::classify("API 요청 중 오류가 발생했습니다.", 3),
            LookupStatus::Failed
        );
    }

    #[test]
    fn reservation_success_needs_an_id() {
        let ok = ReservationOutcome::classify(MSG_OK, Some("R1".into()));
        assert_eq!(ok.status, ReservationStatus::Accepted);
        assert_eq!(ok.reservation_id.as_deref(), Some("R1"));

        let no_id = ReservationOutcome::classify(MSG_OK, None);
        assert_eq!(no_id.status, ReservationStatus::Failed);

        let ended = ReservationOutcome::classify(MSG_SERVICE_ENDED, Some("R2".into()));
        assert_eq!(ended.status, ReservationStatus::ServiceEnded);
        assert!(ended.reservation_id.is_none());
    }

    #[test]
    fn chat_reply_decodes_camel_case() {
        let reply: ChatReply =
            serde_json::from_str(r#"{"chatMode":"blindroute","message":""}"#).unwrap();
        assert_eq!(reply.chat_mode, ChatMode::Blindroute);
    }
}
