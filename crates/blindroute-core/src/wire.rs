//! JSON envelopes exchanged between the flows and the proxy gateway.
//!
//! Every envelope carries the upstream-style status message in `msg`; missing fields
//! decode to their defaults so a short body classifies as a failure instead of erroring.

use crate::gateway::{ChatMode, MSG_OK};
use crate::transit::BusArrival;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEnvelope<T> {
    #[serde(default)]
    pub msg: String,
    #[serde(default = "Vec::new")]
    pub item_list: Vec<T>,
}

impl<T> ListEnvelope<T> {
    pub fn ok(item_list: Vec<T>) -> Self {
        Self {
            msg: MSG_OK.to_string(),
            item_list,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            item_list: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationEnvelope {
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub reservation_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalEnvelope {
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub bus_arrival: Option<BusArrival>,
}

/// Vehicle currently serving the latest reservation (bus panel display).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelItem {
    pub bus_route_id: String,
    pub veh_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelEnvelope {
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub item: Option<PanelItem>,
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub chat_mode: ChatMode,
}
