//! Fehlertypen fuer den Signaling-Service

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use callrelay_core::RelayError;
use thiserror::Error;

/// Fehlertyp fuer den Signaling-Service
#[derive(Debug, Error)]
pub enum SignalingError {
    /// IO-Fehler (Bind, Accept)
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    /// Protokollfehler (ungueltiger Frame, unbekanntes Event)
    #[error("Protokollfehler: {0}")]
    Protokoll(#[from] RelayError),

    /// WebSocket-Fehler beim Lesen oder Schreiben
    #[error("WebSocket-Fehler: {0}")]
    WebSocket(#[from] axum::Error),

    /// Ausgehendes Event konnte nicht serialisiert werden
    #[error("Serialisierung fehlgeschlagen: {0}")]
    Serialisierung(#[from] serde_json::Error),

    /// Server ist voll
    #[error("Server ist voll")]
    ServerVoll,

    /// Keine Frames innerhalb des Verbindungs-Timeouts
    #[error("Timeout")]
    Timeout,
}

impl IntoResponse for SignalingError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::ServerVoll => StatusCode::SERVICE_UNAVAILABLE,
            Self::Protokoll(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

/// Result-Typ fuer den Signaling-Service
pub type SignalingResult<T> = Result<T, SignalingError>;
