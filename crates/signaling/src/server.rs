//! HTTP/WebSocket-Listener – Bindet Socket, nimmt Verbindungen an
//!
//! Der `SignalingServer` bindet einen TCP-Socket und bedient darueber:
//! - `GET /`        – Liveness (fester Klartext)
//! - `GET /ws`      – WebSocket-Upgrade fuer das Signaling
//! - `GET /health`  – Health-Check JSON
//! - `GET /metrics` – Prometheus (wenn aktiviert)
//!
//! Jede WebSocket-Verbindung laeuft als eigener tokio-Task mit einer
//! `ClientConnection`.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{ConnectInfo, State};
use axum::response::Response;
use axum::routing::get;
use axum::{middleware, Router};
use callrelay_observability::{
    health_router, liveness_router, metrics_router, request_timing_layer, timing_middleware,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;

use crate::connection::ClientConnection;
use crate::error::{SignalingError, SignalingResult};
use crate::server_state::SignalingState;

/// Axum-State des WebSocket-Handlers
#[derive(Clone)]
struct WsState {
    state: Arc<SignalingState>,
    shutdown_rx: watch::Receiver<bool>,
}

/// HTTP/WebSocket-Signaling-Server
pub struct SignalingServer {
    state: Arc<SignalingState>,
    bind_addr: SocketAddr,
}

impl SignalingServer {
    /// Erstellt einen neuen SignalingServer
    pub fn neu(state: Arc<SignalingState>, bind_addr: SocketAddr) -> Self {
        Self { state, bind_addr }
    }

    /// Baut den Axum-Router mit allen Endpunkten
    pub fn router(state: Arc<SignalingState>, shutdown_rx: watch::Receiver<bool>) -> Router {
        let metriken = state.metriken.clone();

        let mut app = Router::new()
            .route("/ws", get(ws_handler))
            .with_state(WsState {
                state: Arc::clone(&state),
                shutdown_rx,
            })
            .merge(liveness_router())
            .merge(health_router(Arc::clone(&state)));

        if state.config.metriken_aktiviert {
            app = app.merge(metrics_router(metriken.clone()));
        }

        app.route_layer(middleware::from_fn_with_state(metriken, timing_middleware))
            .layer(request_timing_layer())
            // Jeder Origin darf sich verbinden
            .layer(CorsLayer::permissive())
    }

    /// Bindet den Socket und bedient Verbindungen
    ///
    /// Laeuft bis `shutdown_rx` ein `true`-Signal empfaengt.
    pub async fn starten(self, shutdown_rx: watch::Receiver<bool>) -> SignalingResult<()> {
        let listener = TcpListener::bind(self.bind_addr).await?;
        self.bedienen(listener, shutdown_rx).await
    }

    /// Bedient Verbindungen auf einem bereits gebundenen Listener
    pub async fn bedienen(
        self,
        listener: TcpListener,
        shutdown_rx: watch::Receiver<bool>,
    ) -> SignalingResult<()> {
        let lokale_addr = listener.local_addr()?;
        tracing::info!(
            adresse = %lokale_addr,
            server = %self.state.config.server_name,
            "Signaling-Server gestartet"
        );

        let app = Self::router(Arc::clone(&self.state), shutdown_rx.clone());
        let mut shutdown = shutdown_rx;

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            while shutdown.changed().await.is_ok() {
                if *shutdown.borrow() {
                    break;
                }
            }
            tracing::info!("Signaling-Server: Shutdown-Signal empfangen");
        })
        .await?;

        tracing::info!("Signaling-Server gestoppt");
        Ok(())
    }
}

/// `GET /ws` – WebSocket-Upgrade
async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
    State(ws_state): State<WsState>,
) -> Result<Response, SignalingError> {
    if !ws_state.state.hat_kapazitaet() {
        tracing::warn!(
            peer = %peer_addr,
            max = ws_state.state.config.max_clients,
            "Server voll – Verbindung abgelehnt"
        );
        return Err(SignalingError::ServerVoll);
    }

    let verbindung = ClientConnection::neu(Arc::clone(&ws_state.state), peer_addr);
    let shutdown_rx = ws_state.shutdown_rx.clone();

    Ok(ws.on_upgrade(move |socket| verbindung.verarbeiten(socket, shutdown_rx)))
}
