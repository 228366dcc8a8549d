//! Proxy routes in front of the Seoul bus open API, the chat bridge and the reservation store.
//!
//! Every body is a JSON envelope carrying a Korean status message in `msg`, the same
//! convention the upstream API uses, so the flows classify responses by message alone.

use axum::{
    body::Body,
    extract::{ConnectInfo, Query, State},
    http::{HeaderMap, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use blindroute_core::upstream::{StationByUidItem, UpstreamList};
use blindroute_core::wire::{
    ArrivalEnvelope, ChatRequest, ListEnvelope, PanelEnvelope, PanelItem, ReservationEnvelope,
};
use blindroute_core::{
    Bus, ChatAssistant, ChatReply, CoreError, ReservationKind, ReservationPayload,
    ReservationStore, SeoulBusApi, Station, MSG_OK, MSG_SERVICE_ENDED,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

pub(crate) const MSG_REQUEST_FAILED: &str = "API 요청 중 오류가 발생했습니다.";
pub(crate) const MSG_METHOD_NOT_ALLOWED: &str = "지원하지 않는 메서드입니다.";
const MSG_STORE_FAILED: &str = "예약 정보를 저장하지 못했습니다.";
const MSG_ROUTE_NOT_AT_STATION: &str = "해당 정류소를 지나는 노선이 아닙니다.";
const MSG_NO_ARRIVAL: &str = "도착 정보가 없습니다.";
const MSG_UPSTREAM_NOT_CONFIGURED: &str = "버스 정보 API 키가 설정되지 않았습니다.";

/// Optional rider id recorded as the reservation owner.
const OWNER_HEADER: &str = "x-rider-id";
const DEFAULT_OWNER: &str = "rider";

#[derive(Clone)]
pub(crate) struct AppState {
    /// None when no service key is configured; the bus routes then answer 500.
    pub(crate) upstream: Option<SeoulBusApi>,
    pub(crate) chat: Arc<dyn ChatAssistant>,
    pub(crate) store: Arc<ReservationStore>,
}

impl AppState {
    fn upstream(&self) -> Result<&SeoulBusApi, ApiError> {
        self.upstream.as_ref().ok_or_else(|| {
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                MSG_UPSTREAM_NOT_CONFIGURED,
            )
        })
    }
}

/// `{msg}` error body with its status code.
#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    msg: String,
}

impl ApiError {
    fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            msg: msg.into(),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        warn!("[GATEWAY] {}", e);
        match e {
            CoreError::Upstream { message, .. } => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            CoreError::Http(_) | CoreError::Decode(_) | CoreError::Shape(_) => {
                Self::new(StatusCode::BAD_GATEWAY, MSG_REQUEST_FAILED)
            }
            CoreError::Storage(_) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, MSG_STORE_FAILED),
            CoreError::Config(message) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "msg": self.msg }))).into_response()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StationNameParams {
    #[serde(default)]
    st_srch: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StationParams {
    ars_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArrivalParams {
    ars_id: String,
    bus_route_id: String,
}

pub(crate) fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/stationinfo/getStationByName", get(station_by_name))
        .route("/api/stationinfo/getRouteByStationList", get(routes_by_station))
        .route("/api/reservation", post(create_reservation))
        .route("/api/businfo/getBusArrival", get(bus_arrival))
        .route("/api/buspanelinfo/getPanelInfo", get(panel_info))
        .route("/api/chat", post(chat))
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
        .layer(axum::middleware::from_fn(log_traffic))
        .layer(cors)
}

async fn log_traffic(
    peer: Option<ConnectInfo<SocketAddr>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    let peer = peer
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "local".to_string());
    info!(
        "[GATEWAY] {} {} -> {} ({} in {:?})",
        method,
        path,
        response.status().as_u16(),
        peer,
        started.elapsed()
    );
    response
}

async fn health() -> &'static str {
    "OK"
}

async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, MSG_METHOD_NOT_ALLOWED)
}

/// "No result" from the upstream is a successful empty list to the flows.
fn list_envelope<T>(list: UpstreamList<T>) -> ListEnvelope<T> {
    if list.is_no_result() {
        return ListEnvelope::ok(Vec::new());
    }
    ListEnvelope {
        msg: list.header.header_msg,
        item_list: list.items,
    }
}

/// The stop's live entry for one route, if the route serves the stop.
async fn route_at(
    api: &SeoulBusApi,
    ars_id: &str,
    bus_route_id: &str,
) -> Result<Option<StationByUidItem>, ApiError> {
    let list = api.station_by_uid(ars_id).await?;
    Ok(list
        .items
        .into_iter()
        .find(|item| item.bus_route_id == bus_route_id))
}

async fn station_by_name(
    State(state): State<AppState>,
    Query(params): Query<StationNameParams>,
) -> Result<Json<ListEnvelope<Station>>, ApiError> {
    let list = state
        .upstream()?
        .station_by_name(params.st_srch.trim())
        .await?;
    Ok(Json(list_envelope(list)))
}

async fn routes_by_station(
    State(state): State<AppState>,
    Query(params): Query<StationParams>,
) -> Result<Json<ListEnvelope<Bus>>, ApiError> {
    let list = state.upstream()?.station_by_uid(&params.ars_id).await?;
    let buses: Vec<Bus> = list.items.iter().map(StationByUidItem::to_bus).collect();
    Ok(Json(list_envelope(UpstreamList {
        header: list.header,
        items: buses,
    })))
}

async fn create_reservation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ReservationPayload>,
) -> Result<Json<ReservationEnvelope>, ApiError> {
    let item = route_at(state.upstream()?, &payload.ars_id, &payload.bus_route_id)
        .await?
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, MSG_ROUTE_NOT_AT_STATION))?;

    if payload.reservation_type == ReservationKind::Boarding && item.service_ended() {
        info!(
            "[GATEWAY] route {} at {} has ended service",
            payload.bus_route_id, payload.ars_id
        );
        return Ok(Json(ReservationEnvelope {
            msg: MSG_SERVICE_ENDED.to_string(),
            reservation_id: None,
        }));
    }

    let owner = headers
        .get(OWNER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_OWNER);
    let record = state.store.create(owner, &payload).await?;
    Ok(Json(ReservationEnvelope {
        msg: MSG_OK.to_string(),
        reservation_id: Some(record.id),
    }))
}

async fn bus_arrival(
    State(state): State<AppState>,
    Query(params): Query<ArrivalParams>,
) -> Result<Json<ArrivalEnvelope>, ApiError> {
    let item = route_at(state.upstream()?, &params.ars_id, &params.bus_route_id)
        .await?
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, MSG_NO_ARRIVAL))?;
    Ok(Json(ArrivalEnvelope {
        msg: MSG_OK.to_string(),
        bus_arrival: Some(item.to_arrival()),
    }))
}

/// Vehicle serving the most recent reservation, for the on-board panel.
async fn panel_info(State(state): State<AppState>) -> Result<Json<PanelEnvelope>, ApiError> {
    let Some(record) = state.store.latest()? else {
        return Ok(Json(PanelEnvelope {
            msg: MSG_OK.to_string(),
            item: None,
        }));
    };
    let item = route_at(state.upstream()?, &record.ars_id, &record.bus_route_id)
        .await?
        .map(|item| {
            let veh_id = item.to_arrival().bus_veh_id1;
            PanelItem {
                bus_route_id: item.bus_route_id,
                veh_id,
            }
        });
    Ok(Json(PanelEnvelope {
        msg: MSG_OK.to_string(),
        item,
    }))
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    state
        .chat
        .reply(request.message.trim(), request.chat_mode)
        .await
        .map(Json)
        .map_err(|e| {
            warn!("[GATEWAY] chat reply failed: {}", e);
            ApiError::new(StatusCode::BAD_GATEWAY, MSG_REQUEST_FAILED)
        })
}
