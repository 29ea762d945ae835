//! Liveness- und Health-Endpunkte fuer callrelay
//!
//! - `GET /` – fester Klartext, bestaetigt dass der Prozess laeuft
//! - `GET /health` – JSON mit Status, Version, Uptime und Sitzungszahlen

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Fester Antworttext des Liveness-Endpunkts
pub const LIVENESS_TEXT: &str = "WebRTC Signaling Server Running";

/// Status des Health-Checks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Antwort des Health-Check-Endpunkts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub connected_sessions: usize,
    pub registered_identities: usize,
}

/// Quelle fuer die Laufzeitzahlen im Health-Check
///
/// Wird vom Signaling-Zustand implementiert, damit dieses Crate nicht vom
/// Signaling-Crate abhaengt.
pub trait StatusQuelle: Send + Sync + 'static {
    fn verbundene_sitzungen(&self) -> usize;
    fn registrierte_identitaeten(&self) -> usize;
    /// Maximale Sitzungszahl; bei Erreichen meldet der Check `degraded`
    fn max_sitzungen(&self) -> usize;
}

/// Geteilter Zustand fuer den Health-Check-Handler
pub struct HealthState<Q: StatusQuelle> {
    pub quelle: Arc<Q>,
    pub start_time: Instant,
    pub started_at: DateTime<Utc>,
}

impl<Q: StatusQuelle> Clone for HealthState<Q> {
    fn clone(&self) -> Self {
        Self {
            quelle: Arc::clone(&self.quelle),
            start_time: self.start_time,
            started_at: self.started_at,
        }
    }
}

impl<Q: StatusQuelle> HealthState<Q> {
    pub fn neu(quelle: Arc<Q>) -> Self {
        Self {
            quelle,
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Erstellt die aktuelle Health-Antwort
    pub fn antwort(&self) -> HealthResponse {
        let verbunden = self.quelle.verbundene_sitzungen();
        let status = if verbunden >= self.quelle.max_sitzungen() {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: self.started_at,
            uptime_seconds: self.uptime_seconds(),
            connected_sessions: verbunden,
            registered_identities: self.quelle.registrierte_identitaeten(),
        }
    }
}

/// Axum-Router fuer den Liveness-Endpunkt `/`
pub fn liveness_router() -> Router {
    Router::new().route("/", get(liveness_handler))
}

/// Axum-Router fuer den `/health`-Endpunkt
pub fn health_router<Q: StatusQuelle>(quelle: Arc<Q>) -> Router {
    Router::new()
        .route("/health", get(health_handler::<Q>))
        .with_state(HealthState::neu(quelle))
}

async fn liveness_handler() -> &'static str {
    LIVENESS_TEXT
}

/// `GET /health` – gibt den Serverstatus zurueck
async fn health_handler<Q: StatusQuelle>(State(state): State<HealthState<Q>>) -> impl IntoResponse {
    // 200 auch bei degraded (Liveness-Check soll nicht fehlschlagen)
    (StatusCode::OK, Json(state.antwort()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FesteZahlen {
        sitzungen: usize,
        identitaeten: usize,
        max: usize,
    }

    impl StatusQuelle for FesteZahlen {
        fn verbundene_sitzungen(&self) -> usize {
            self.sitzungen
        }
        fn registrierte_identitaeten(&self) -> usize {
            self.identitaeten
        }
        fn max_sitzungen(&self) -> usize {
            self.max
        }
    }

    fn state(sitzungen: usize, max: usize) -> HealthState<FesteZahlen> {
        HealthState::neu(Arc::new(FesteZahlen {
            sitzungen,
            identitaeten: 2,
            max,
        }))
    }

    #[test]
    fn health_state_uptime_frisch() {
        assert!(state(0, 10).uptime_seconds() < 5);
    }

    #[test]
    fn healthy_unter_limit() {
        let antwort = state(3, 10).antwort();
        assert_eq!(antwort.status, HealthStatus::Healthy);
        assert_eq!(antwort.connected_sessions, 3);
        assert_eq!(antwort.registered_identities, 2);
    }

    #[test]
    fn degraded_am_limit() {
        assert_eq!(state(10, 10).antwort().status, HealthStatus::Degraded);
    }

    #[test]
    fn health_response_serialisierung() {
        let json = serde_json::to_string(&state(1, 10).antwort()).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(json.contains("\"connected_sessions\":1"));
        assert!(json.contains("\"registered_identities\":2"));
        assert!(json.contains("\"started_at\""));
    }

    #[tokio::test]
    async fn liveness_text() {
        assert_eq!(liveness_handler().await, "WebRTC Signaling Server Running");
    }
}
