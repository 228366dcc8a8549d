//! reqwest client for the blindroute proxy gateway (`add-ons/blindroute-gateway`).

use crate::boarding::{ArrivalQuery, BoardingRequest};
use crate::error::{CoreError, CoreResult};
use crate::gateway::{
    BusList, ChatAssistant, ChatMode, ChatReply, LookupStatus, ReservationOutcome, StationSearch,
    TransitGateway, MSG_OK,
};
use crate::transit::{Bus, BusArrival, ReservationKind, Station};
use crate::wire::{ArrivalEnvelope, ChatRequest, ListEnvelope, ReservationEnvelope};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Transit gateway and chat assistant backed by the proxy's HTTP routes.
#[derive(Debug, Clone)]
pub struct HttpTransitGateway {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransitGateway {
    /// `base_url` without trailing slash (e.g. http://127.0.0.1:8000).
    pub fn new(base_url: impl Into<String>) -> CoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> CoreResult<T> {
        let res = self.client.get(self.url(path)).query(query).send().await?;
        decode_body(res).await
    }

    async fn post_json<B: serde::Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> CoreResult<T> {
        let res = self.client.post(self.url(path)).json(body).send().await?;
        decode_body(res).await
    }
}

/// The proxy answers error statuses with a JSON envelope too; decode it regardless of status
/// and let the `msg` classify the outcome.
async fn decode_body<T: DeserializeOwned>(res: reqwest::Response) -> CoreResult<T> {
    let status = res.status();
    let text = res.text().await?;
    match serde_json::from_str(&text) {
        Ok(v) => Ok(v),
        Err(e) if status.is_success() => Err(CoreError::Decode(e)),
        Err(_) => Err(CoreError::Upstream {
            status: status.as_u16(),
            message: text.chars().take(200).collect(),
        }),
    }
}

#[async_trait::async_trait]
impl TransitGateway for HttpTransitGateway {
    async fn search_stations(&self, name: &str) -> StationSearch {
        match self
            .get_json::<ListEnvelope<Station>>("/api/stationinfo/getStationByName", &[("stSrch", name)])
            .await
        {
            Ok(env) => StationSearch {
                status: LookupStatus::classify(&env.msg, env.item_list.len()),
                stations: env.item_list,
            },
            Err(e) => {
                warn!("[GATEWAY] station search failed: {}", e);
                StationSearch::failed()
            }
        }
    }

    async fn list_buses_at_station(&self, station: &Station) -> BusList {
        match self
            .get_json::<ListEnvelope<Bus>>(
                "/api/stationinfo/getRouteByStationList",
                &[("arsId", station.ars_id.as_str())],
            )
            .await
        {
            Ok(env) => BusList {
                status: LookupStatus::classify(&env.msg, env.item_list.len()),
                buses: env.item_list,
            },
            Err(e) => {
                warn!("[GATEWAY] route lookup for {} failed: {}", station.ars_id, e);
                BusList::failed()
            }
        }
    }

    async fn create_boarding_reservation(
        &self,
        request: &BoardingRequest,
        kind: ReservationKind,
    ) -> ReservationOutcome {
        let payload = request.payload(kind);
        match self
            .post_json::<_, ReservationEnvelope>("/api/reservation", &payload)
            .await
        {
            Ok(env) => ReservationOutcome::classify(&env.msg, env.reservation_id),
            Err(e) => {
                warn!("[GATEWAY] reservation create failed: {}", e);
                ReservationOutcome::failed()
            }
        }
    }

    async fn poll_arrival(&self, query: &ArrivalQuery) -> CoreResult<BusArrival> {
        let env: ArrivalEnvelope = self
            .get_json(
                "/api/businfo/getBusArrival",
                &[
                    ("arsId", query.ars_id.as_str()),
                    ("busRouteId", query.bus_route_id.as_str()),
                ],
            )
            .await?;
        match env.bus_arrival {
            Some(arrival) if env.msg == MSG_OK => {
                debug!("[GATEWAY] arrival snapshot veh1={}", arrival.bus_veh_id1);
                Ok(arrival)
            }
            _ => Err(CoreError::Shape(format!("no arrival snapshot: {}", env.msg))),
        }
    }
}

#[async_trait::async_trait]
impl ChatAssistant for HttpTransitGateway {
    async fn reply(&self, message: &str, mode: ChatMode) -> CoreResult<ChatReply> {
        let body = ChatRequest {
            message: message.to_string(),
            chat_mode: mode,
        };
        self.post_json("/api/chat", &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let gw = HttpTransitGateway::new("http://localhost:8000/").unwrap();
        assert_eq!(gw.url("/health"), "http://localhost:8000/health");
    }

    #[test]
    fn short_envelope_decodes_to_failure() {
        let env: ListEnvelope<Station> = serde_json::from_str("{}").unwrap();
        assert_eq!(
            LookupStatus::classify(&env.msg, env.item_list.len()),
            LookupStatus::Failed
        );
    }
}
