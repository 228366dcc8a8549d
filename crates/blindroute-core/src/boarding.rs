//! Boarding reservations: a pending request and the confirmed reservation it becomes.
//!
//! A [`Boarding`] can only be produced by [`BoardingRequest::confirm`], which the flows call
//! on the success path of the create-reservation call. There is no state in which a
//! boarding exists without its reservation id.

use crate::transit::{Bus, ReservationKind, Station};
use serde::{Deserialize, Serialize};

/// Station + route the rider asked to board, before the gateway has accepted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardingRequest {
    station: Station,
    bus: Bus,
}

impl BoardingRequest {
    pub fn new(station: Station, bus: Bus) -> Self {
        Self { station, bus }
    }

    pub fn station(&self) -> &Station {
        &self.station
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Wire payload for the create call.
    pub fn payload(&self, kind: ReservationKind) -> ReservationPayload {
        ReservationPayload {
            st_id: self.station.st_id.clone(),
            ars_id: self.station.ars_id.clone(),
            bus_route_id: self.bus.bus_route_id.clone(),
            reservation_type: kind,
        }
    }

    /// Attach the id returned by the gateway.
    pub fn confirm(self, reservation_id: impl Into<String>) -> Boarding {
        Boarding {
            station: self.station,
            bus: self.bus,
            reservation_id: reservation_id.into(),
        }
    }
}

/// A confirmed boarding reservation held for the waiting/boarding steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Boarding {
    station: Station,
    bus: Bus,
    reservation_id: String,
}

impl Boarding {
    pub fn station(&self) -> &Station {
        &self.station
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn reservation_id(&self) -> &str {
        &self.reservation_id
    }

    /// Same stop and route as a new request, used for the alighting reservation.
    pub fn request(&self) -> BoardingRequest {
        BoardingRequest::new(self.station.clone(), self.bus.clone())
    }

    /// Arrival query for the reserved stop and route.
    pub fn arrival_query(&self) -> ArrivalQuery {
        ArrivalQuery {
            ars_id: self.station.ars_id.clone(),
            bus_route_id: self.bus.bus_route_id.clone(),
        }
    }
}

/// Body of `POST /api/reservation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationPayload {
    pub st_id: String,
    pub ars_id: String,
    pub bus_route_id: String,
    pub reservation_type: ReservationKind,
}

/// What the arrival poller asks about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalQuery {
    pub ars_id: String,
    pub bus_route_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_carries_station_and_bus() {
        let request = BoardingRequest::new(
            Station::new("102000271", "서울역", "02006"),
            Bus::new("100100016", "160", "도봉산"),
        );
        let payload = request.payload(ReservationKind::Boarding);
        assert_eq!(payload.ars_id, "02006");
        assert_eq!(payload.bus_route_id, "100100016");

        let boarding = request.confirm("R1");
        assert_eq!(boarding.reservation_id(), "R1");
        assert_eq!(
            boarding.arrival_query(),
            ArrivalQuery {
                ars_id: "02006".into(),
                bus_route_id: "100100016".into()
            }
        );
    }

    #[test]
    fn payload_serializes_reservation_type_lowercase() {
        let request = BoardingRequest::new(Station::new("1", "a", "2"), Bus::new("3", "b", "c"));
        let json = serde_json::to_value(request.payload(ReservationKind::Alighting)).unwrap();
        assert_eq!(json["reservationType"], "alighting");
        assert_eq!(json["busRouteId"], "3");
    }
}
