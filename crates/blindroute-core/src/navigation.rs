//! Route context handed between flows.

use crate::boarding::BoardingRequest;
use crate::transit::{Bus, Station};
use serde::{Deserialize, Serialize};

/// Path of the navigation flow the assistant hands off to.
pub const BLINDROUTE_PATH: &str = "/blindroute";

/// Resolved route context for the route-finder boarding flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forwarding {
    pub from_station_id: String,
    pub from_station_nm: String,
    pub from_ars_id: String,
    pub bus_route_id: String,
    pub bus_route_nm: String,
    pub bus_route_dir: String,
    pub to_station_nm: String,
}

impl Forwarding {
    /// Boarding request for the leg's first stop and route.
    pub fn boarding_request(&self) -> BoardingRequest {
        let station = Station::new(&self.from_station_id, &self.from_station_nm, &self.from_ars_id);
        let bus = Bus::new(&self.bus_route_id, &self.bus_route_nm, &self.bus_route_dir);
        BoardingRequest::new(station, bus)
    }
}

/// Free-text start/destination extracted from a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationRequest {
    pub start: String,
    pub destination: String,
}

impl NavigationRequest {
    pub fn new(start: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            destination: destination.into(),
        }
    }

    /// Parse a "start,destination" reply. Anything other than exactly two non-empty parts is `None`.
    pub fn from_pair(reply: &str) -> Option<Self> {
        let parts: Vec<&str> = reply.split(',').map(str::trim).collect();
        match parts.as_slice() {
            [start, destination] if !start.is_empty() && !destination.is_empty() => {
                Some(Self::new(*start, *destination))
            }
            _ => None,
        }
    }

    /// `start=..&destination=..`, URL-encoded.
    pub fn to_query(&self) -> String {
        format!(
            "start={}&destination={}",
            urlencoding::encode(&self.start),
            urlencoding::encode(&self.destination)
        )
    }

    /// Target path of the handoff, e.g. `/blindroute?start=..&destination=..`.
    pub fn to_path(&self) -> String {
        format!("{}?{}", BLINDROUTE_PATH, self.to_query())
    }

    /// Parse the query string of a handoff path (leading `?` optional).
    pub fn from_query(query: &str) -> Option<Self> {
        let mut start = None;
        let mut destination = None;
        for pair in query.trim_start_matches('?').split('&') {
            let (key, value) = pair.split_once('=')?;
            let value = urlencoding::decode(&value.replace('+', " ")).ok()?.into_owned();
            match key {
                "start" => start = Some(value),
                "destination" => destination = Some(value),
                _ => {}
            }
        }
        Some(Self::new(start?, destination?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_requires_exactly_two_parts() {
        assert_eq!(
            NavigationRequest::from_pair("강남역, 서울역"),
            Some(NavigationRequest::new("강남역", "서울역"))
        );
        assert_eq!(NavigationRequest::from_pair("강남역"), None);
        assert_eq!(NavigationRequest::from_pair("a,b,c"), None);
        assert_eq!(NavigationRequest::from_pair("a,"), None);
    }

    #[test]
    fn handoff_path_survives_the_query_string() {
        let req = NavigationRequest::new("강남역 2번 출구", "서울역&광장");
        let path = req.to_path();
        assert!(path.starts_with("/blindroute?start="));
        let query = path.split_once('?').map(|(_, q)| q).unwrap();
        assert_eq!(NavigationRequest::from_query(query), Some(req));
    }

    #[test]
    fn forwarding_builds_boarding_request() {
        let fwd = Forwarding {
            from_station_id: "102000271".into(),
            from_station_nm: "서울역".into(),
            from_ars_id: "02006".into(),
            bus_route_id: "100100016".into(),
            bus_route_nm: "160".into(),
            bus_route_dir: "도봉산".into(),
            to_station_nm: "광화문".into(),
        };
        let req = fwd.boarding_request();
        assert_eq!(req.station().ars_id, "02006");
        assert_eq!(req.bus().spoken_name(), "160");
    }
}
