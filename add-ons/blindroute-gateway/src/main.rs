//! Blindroute gateway: the proxy the guided flows talk to.
//! Seoul bus open API + chat completion + sled reservation records, on BLINDROUTE_BIND_ADDR.

mod routes;

use blindroute_core::{BlindrouteConfig, CompletionChat, ReservationStore, SeoulBusApi};
use routes::{build_app, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BlindrouteConfig::from_env();

    let upstream = match SeoulBusApi::new(&config.bus_api_base_url, &config.bus_api_service_key) {
        Ok(api) => Some(api),
        Err(e) => {
            warn!("[GATEWAY] bus routes disabled: {}", e);
            None
        }
    };
    if config.chat_api_key.is_empty() {
        warn!("[GATEWAY] CHAT_API_KEY is not set; /api/chat will fail upstream");
    }
    let chat = CompletionChat::new(
        &config.chat_api_url,
        &config.chat_api_key,
        &config.chat_model,
    )?;
    let store = ReservationStore::open(&config.reservation_db_path)?;
    info!(
        "[GATEWAY] reservations at {} ({} stored)",
        config.reservation_db_path,
        store.len()
    );

    let app = build_app(AppState {
        upstream,
        chat: Arc::new(chat),
        store: Arc::new(store),
    });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(
        "[GATEWAY] blindroute-gateway {} listening on {}",
        blindroute_core::version(),
        config.bind_addr
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
