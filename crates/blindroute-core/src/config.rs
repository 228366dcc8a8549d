//! Blindroute configuration loaded from the environment (`.env` is read by the binaries).
//!
//! Change endpoints and timings without code edits.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_BUS_API_BASE_URL: &str = "http://ws.bus.go.kr/api/rest";
const DEFAULT_CHAT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const DEFAULT_CHAT_MODEL: &str = "openai/gpt-3.5-turbo";
const DEFAULT_RESERVATION_DB_PATH: &str = "./data/reservations";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Endpoint and storage configuration.
///
/// | Env | Default | Description |
/// |-----|---------|-------------|
/// | BLINDROUTE_GATEWAY_URL | http://127.0.0.1:8000 | Base URL of the proxy gateway used by the flows. |
/// | BUS_API_BASE_URL | http://ws.bus.go.kr/api/rest | Seoul city-bus open API root. |
/// | BUS_API_SERVICE_KEY | (empty) | Open API service key; may be given URL-encoded. |
/// | CHAT_API_URL | OpenRouter chat completions | Chat completion endpoint. |
/// | CHAT_API_KEY / OPENROUTER_API_KEY | (empty) | Bearer key for the chat endpoint. |
/// | CHAT_MODEL | openai/gpt-3.5-turbo | Chat completion model. |
/// | RESERVATION_DB_PATH | ./data/reservations | Sled directory for reservation records. |
/// | BLINDROUTE_BIND_ADDR | 127.0.0.1:8000 | Gateway listen address. |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlindrouteConfig {
    pub gateway_url: String,
    pub bus_api_base_url: String,
    pub bus_api_service_key: String,
    pub chat_api_url: String,
    pub chat_api_key: String,
    pub chat_model: String,
    pub reservation_db_path: String,
    pub bind_addr: String,
}

impl Default for BlindrouteConfig {
    fn default() -> Self {
        Self {
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            bus_api_base_url: DEFAULT_BUS_API_BASE_URL.to_string(),
            bus_api_service_key: String::new(),
            chat_api_url: DEFAULT_CHAT_API_URL.to_string(),
            chat_api_key: String::new(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            reservation_db_path: DEFAULT_RESERVATION_DB_PATH.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl BlindrouteConfig {
    /// Load from environment. Unset or blank => defaults (see table above).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            gateway_url: env_string("BLINDROUTE_GATEWAY_URL", &defaults.gateway_url),
            bus_api_base_url: env_string("BUS_API_BASE_URL", &defaults.bus_api_base_url),
            bus_api_service_key: decode_service_key(&env_string("BUS_API_SERVICE_KEY", "")),
            chat_api_url: env_string("CHAT_API_URL", &defaults.chat_api_url),
            chat_api_key: env_opt_string("CHAT_API_KEY")
                .or_else(|| env_opt_string("OPENROUTER_API_KEY"))
                .unwrap_or_default(),
            chat_model: env_string("CHAT_MODEL", &defaults.chat_model),
            reservation_db_path: env_string("RESERVATION_DB_PATH", &defaults.reservation_db_path),
            bind_addr: env_string("BLINDROUTE_BIND_ADDR", &defaults.bind_addr),
        }
    }
}

/// Timing knobs for the step machines and the arrival poller.
///
/// | Env | Default |
/// |-----|---------|
/// | BLINDROUTE_POLL_INTERVAL_SECS | 15 |
/// | BLINDROUTE_ARRIVAL_DELAY_MS | 8000 |
/// | BLINDROUTE_BUSY_TIMEOUT_MS | 10000 |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowTimings {
    /// Interval between arrival polls while waiting for the bus.
    pub poll_interval: Duration,
    /// Pause between the arrival cue and the step change.
    pub arrival_confirm_delay: Duration,
    /// Upper bound on how long a loading indicator may suppress gestures.
    pub busy_timeout: Duration,
    /// Delay between a "search" swipe and the station lookup (lets the cue finish).
    pub search_delay: Duration,
    /// Delay between a "reserve" swipe and the reservation call.
    pub reserve_delay: Duration,
    /// Pause after a successful lookup/reservation before the next screen shows.
    pub success_transition_delay: Duration,
    /// Gestures are ignored for this long after the carousel moves.
    pub slide_debounce: Duration,
}

impl Default for FlowTimings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(15),
            arrival_confirm_delay: Duration::from_millis(8000),
            busy_timeout: Duration::from_millis(10_000),
            search_delay: Duration::from_millis(1000),
            reserve_delay: Duration::from_millis(500),
            success_transition_delay: Duration::from_millis(1000),
            slide_debounce: Duration::from_millis(250),
        }
    }
}

impl FlowTimings {
    /// Load overrides from environment. Invalid values fall back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            poll_interval: Duration::from_secs(env_u64(
                "BLINDROUTE_POLL_INTERVAL_SECS",
                defaults.poll_interval.as_secs(),
            )
            .max(1)),
            arrival_confirm_delay: Duration::from_millis(env_u64(
                "BLINDROUTE_ARRIVAL_DELAY_MS",
                defaults.arrival_confirm_delay.as_millis() as u64,
            )),
            busy_timeout: Duration::from_millis(env_u64(
                "BLINDROUTE_BUSY_TIMEOUT_MS",
                defaults.busy_timeout.as_millis() as u64,
            )),
            ..defaults
        }
    }
}

/// The open API issues keys URL-encoded; accept either form.
fn decode_service_key(raw: &str) -> String {
    if raw.contains('%') {
        urlencoding::decode(raw)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| raw.to_string())
    } else {
        raw.to_string()
    }
}

fn env_string(name: &str, default: &str) -> String {
    env_opt_string(name).unwrap_or_else(|| default.to_string())
}

fn env_opt_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_u64(name: &str, default: u64) -> u64 {
    match std::env::var(name) {
        Ok(v) => v.trim().parse().unwrap_or(default),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_key_is_url_decoded() {
        assert_eq!(decode_service_key("abc%2Bdef%3D%3D"), "abc+def==");
        assert_eq!(decode_service_key("plain+key=="), "plain+key==");
    }

    #[test]
    fn flow_timings_defaults() {
        let t = FlowTimings::default();
        assert_eq!(t.poll_interval, Duration::from_secs(15));
        assert_eq!(t.arrival_confirm_delay, Duration::from_secs(8));
        assert!(t.slide_debounce < t.search_delay);
    }
}
