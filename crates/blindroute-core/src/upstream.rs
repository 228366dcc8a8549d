//! Seoul city-bus open API client (`ws.bus.go.kr/api/rest`), used by the proxy gateway.
//!
//! Every response is wrapped in `comMsgHeader` / `msgHeader` / `msgBody`. `msgBody.itemList`
//! is `null` when nothing matched, which decodes to an empty list here.

use crate::error::{CoreError, CoreResult};
use crate::transit::{Bus, BusArrival, Station};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// `headerCd` for a normal answer.
pub const HEADER_CD_OK: &str = "0";
/// `headerCd` for "no result" (e.g. unknown station name).
pub const HEADER_CD_NO_RESULT: &str = "4";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComMsgHeader {
    #[serde(default)]
    pub err_msg: Option<String>,
    #[serde(default)]
    pub success_yn: Option<String>,
    #[serde(default)]
    pub return_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgHeader {
    #[serde(default)]
    pub header_msg: String,
    #[serde(default)]
    pub header_cd: String,
    #[serde(default)]
    pub item_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MsgBody<T> {
    #[serde(default = "Option::default")]
    item_list: Option<Vec<T>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse<T> {
    #[serde(default)]
    com_msg_header: ComMsgHeader,
    #[serde(default)]
    msg_header: MsgHeader,
    msg_body: Option<MsgBody<T>>,
}

/// Decoded upstream answer: header plus items (empty when `itemList` was null).
#[derive(Debug, Clone)]
pub struct UpstreamList<T> {
    pub header: MsgHeader,
    pub items: Vec<T>,
}

impl<T> UpstreamList<T> {
    pub fn is_ok(&self) -> bool {
        self.header.header_cd == HEADER_CD_OK
    }

    pub fn is_no_result(&self) -> bool {
        self.header.header_cd == HEADER_CD_NO_RESULT
    }
}

/// `stationinfo/getStationByName` item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationByNameItem {
    pub st_id: String,
    pub st_nm: String,
    #[serde(default)]
    pub tm_x: String,
    #[serde(default)]
    pub tm_y: String,
    #[serde(default)]
    pub pos_x: String,
    #[serde(default)]
    pub pos_y: String,
    #[serde(default)]
    pub ars_id: String,
}

impl From<StationByNameItem> for Station {
    fn from(item: StationByNameItem) -> Self {
        Station {
            st_id: item.st_id,
            st_nm: item.st_nm,
            tm_x: item.tm_x,
            tm_y: item.tm_y,
            pos_x: item.pos_x,
            pos_y: item.pos_y,
            ars_id: item.ars_id,
        }
    }
}

/// `stationinfo/getStationByUid` item: one route at the stop with its next two vehicles.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationByUidItem {
    #[serde(default)]
    pub st_id: String,
    #[serde(default)]
    pub st_nm: String,
    #[serde(default)]
    pub ars_id: String,
    #[serde(default)]
    pub bus_route_id: String,
    #[serde(default)]
    pub rt_nm: String,
    #[serde(default)]
    pub bus_route_abrv: Option<String>,
    #[serde(default)]
    pub adirection: String,
    #[serde(default)]
    pub veh_id1: String,
    #[serde(default)]
    pub veh_id2: String,
    #[serde(default)]
    pub arrmsg1: String,
    #[serde(default)]
    pub arrmsg2: String,
    #[serde(default)]
    pub is_arrive1: String,
}

impl StationByUidItem {
    pub fn to_bus(&self) -> Bus {
        Bus {
            bus_route_id: self.bus_route_id.clone(),
            bus_route_nm: self.rt_nm.clone(),
            bus_route_abrv: self.bus_route_abrv.clone().unwrap_or_default(),
            adirection: self.adirection.clone(),
        }
    }

    pub fn to_arrival(&self) -> BusArrival {
        BusArrival {
            bus_arr_msg1: self.arrmsg1.clone(),
            bus_arr_msg2: self.arrmsg2.clone(),
            bus_veh_id1: normalize_veh_id(&self.veh_id1),
            bus_veh_id2: normalize_veh_id(&self.veh_id2),
        }
    }

    /// The upstream reports "운행종료" in the arrival message once the route stopped for the day.
    pub fn service_ended(&self) -> bool {
        self.arrmsg1.contains("운행종료")
    }
}

/// The upstream encodes "no vehicle" as `"0"`.
fn normalize_veh_id(raw: &str) -> String {
    match raw.trim() {
        "0" => String::new(),
        other => other.to_string(),
    }
}

/// Thin async client over the open API.
#[derive(Debug, Clone)]
pub struct SeoulBusApi {
    base_url: String,
    service_key: String,
    client: reqwest::Client,
}

impl SeoulBusApi {
    /// `service_key` must already be URL-decoded (see `BlindrouteConfig::from_env`).
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> CoreResult<Self> {
        let service_key = service_key.into();
        if service_key.trim().is_empty() {
            return Err(CoreError::Config("BUS_API_SERVICE_KEY is not set".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key,
            client,
        })
    }

    async fn call<T: DeserializeOwned>(&self, op: &str, params: &[(&str, &str)]) -> CoreResult<UpstreamList<T>> {
        let url = format!("{}/{}", self.base_url, op);
        debug!("[UPSTREAM] GET {}", op);
        let res = self
            .client
            .get(&url)
            .query(&[("serviceKey", self.service_key.as_str()), ("resultType", "json")])
            .query(params)
            .send()
            .await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(CoreError::Upstream {
                status: status.as_u16(),
                message: text.chars().take(200).collect(),
            });
        }
        decode_response(&text)
    }

    /// Stations whose name contains `name`.
    pub async fn station_by_name(&self, name: &str) -> CoreResult<UpstreamList<Station>> {
        let list: UpstreamList<StationByNameItem> =
            self.call("stationinfo/getStationByName", &[("stSrch", name)]).await?;
        info!("[UPSTREAM] '{}' matched {} stations", name, list.items.len());
        Ok(UpstreamList {
            header: list.header,
            items: list.items.into_iter().map(Station::from).collect(),
        })
    }

    /// Routes at the stop with live arrival fields.
    pub async fn station_by_uid(&self, ars_id: &str) -> CoreResult<UpstreamList<StationByUidItem>> {
        self.call("stationinfo/getStationByUid", &[("arsId", ars_id)]).await
    }
}

/// Decode an envelope. `comMsgHeader.errMsg` marks an upstream failure.
pub fn decode_response<T: DeserializeOwned>(text: &str) -> CoreResult<UpstreamList<T>> {
    let parsed: ApiResponse<T> = serde_json::from_str(text)?;
    if let Some(err) = parsed.com_msg_header.err_msg.filter(|e| !e.is_empty()) {
        return Err(CoreError::Upstream {
            status: 500,
            message: if parsed.msg_header.header_msg.is_empty() {
                err
            } else {
                parsed.msg_header.header_msg
            },
        });
    }
    let items = parsed
        .msg_body
        .and_then(|b| b.item_list)
        .unwrap_or_default();
    Ok(UpstreamList {
        header: parsed.msg_header,
        items,
    })
}
