//! Transit domain types shared by the flows, the gateway client and the proxy.
//!
//! Field names serialize in the upstream API's camelCase (`stId`, `busRouteId`, ...).

use serde::{Deserialize, Serialize};

/// A physical stop. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub st_id: String,
    pub st_nm: String,
    /// TM coordinates.
    #[serde(default)]
    pub tm_x: String,
    #[serde(default)]
    pub tm_y: String,
    /// GRS80 coordinates.
    #[serde(default)]
    pub pos_x: String,
    #[serde(default)]
    pub pos_y: String,
    /// Arrival-sign id, the per-stop key of the arrival queries.
    pub ars_id: String,
}

impl Station {
    pub fn new(st_id: impl Into<String>, st_nm: impl Into<String>, ars_id: impl Into<String>) -> Self {
        Self {
            st_id: st_id.into(),
            st_nm: st_nm.into(),
            tm_x: String::new(),
            tm_y: String::new(),
            pos_x: String::new(),
            pos_y: String::new(),
            ars_id: ars_id.into(),
        }
    }
}

/// A route serving a station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bus {
    pub bus_route_id: String,
    pub bus_route_nm: String,
    #[serde(default)]
    pub bus_route_abrv: String,
    /// Direction label ("서울역 방면" without the suffix).
    #[serde(default)]
    pub adirection: String,
}

impl Bus {
    pub fn new(
        bus_route_id: impl Into<String>,
        bus_route_nm: impl Into<String>,
        adirection: impl Into<String>,
    ) -> Self {
        Self {
            bus_route_id: bus_route_id.into(),
            bus_route_nm: bus_route_nm.into(),
            bus_route_abrv: String::new(),
            adirection: adirection.into(),
        }
    }

    /// Name used in announcements: the abbreviation when present.
    pub fn spoken_name(&self) -> &str {
        if self.bus_route_abrv.trim().is_empty() {
            &self.bus_route_nm
        } else {
            &self.bus_route_abrv
        }
    }
}

/// Reservation type understood by the reservation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationKind {
    Boarding,
    Alighting,
}

impl ReservationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationKind::Boarding => "boarding",
            ReservationKind::Alighting => "alighting",
        }
    }
}

/// One point-in-time arrival snapshot for the reserved station + route.
///
/// Slot 1 is the next vehicle, slot 2 the one after it. An empty vehicle id means
/// no vehicle is currently assigned to the slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusArrival {
    #[serde(default)]
    pub bus_arr_msg1: String,
    #[serde(default)]
    pub bus_arr_msg2: String,
    #[serde(default)]
    pub bus_veh_id1: String,
    #[serde(default)]
    pub bus_veh_id2: String,
}

impl BusArrival {
    /// Vehicle id of the next bus, `None` when the slot is empty.
    pub fn primary_vehicle(&self) -> Option<&str> {
        let id = self.bus_veh_id1.trim();
        (!id.is_empty()).then_some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spoken_name_prefers_abbreviation() {
        let mut bus = Bus::new("100100118", "N16", "온수동");
        assert_eq!(bus.spoken_name(), "N16");
        bus.bus_route_abrv = "16".into();
        assert_eq!(bus.spoken_name(), "16");
    }

    #[test]
    fn station_decodes_upstream_field_names() {
        let json = r#"{"stId":"102000271","stNm":"서울역","tmX":"126.97","tmY":"37.55","posX":"197","posY":"450","arsId":"02006"}"#;
        let station: Station = serde_json::from_str(json).unwrap();
        assert_eq!(station.ars_id, "02006");
        assert_eq!(station.st_nm, "서울역");
    }

    #[test]
    fn empty_vehicle_slot_is_none() {
        let arrival = BusArrival::default();
        assert!(arrival.primary_vehicle().is_none());
        let arrival = BusArrival {
            bus_veh_id1: "V9".into(),
            ..Default::default()
        };
        assert_eq!(arrival.primary_vehicle(), Some("V9"));
    }
}
