//! Prometheus-kompatible Metriken fuer callrelay
//!
//! Registrierte Metriken:
//! - `callrelay_connected_sessions` – Gauge: Aktuell verbundene Sitzungen
//! - `callrelay_registered_identities` – Gauge: Identitaeten in der Registry
//! - `callrelay_events_total` – Counter: Eingehende Events (event)
//! - `callrelay_forwarded_total` – Counter: Ausgehende Zustellversuche (event)
//! - `callrelay_dropped_total` – Counter: Still verworfene Events (reason)
//! - `callrelay_http_requests_total` – Counter: HTTP-Anfragen (method, path, status)
//! - `callrelay_http_request_duration_seconds` – Histogram: HTTP-Antwortzeit

use anyhow::Result;
use axum::{extract::State, response::IntoResponse, routing::get, Router};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Alle callrelay-Prometheus-Metriken
#[derive(Clone)]
pub struct RelayMetrics {
    pub registry: Arc<Registry>,

    // Signaling-Metriken
    pub connected_sessions: IntGauge,
    pub registered_identities: IntGauge,
    pub events_total: IntCounterVec,
    pub forwarded_total: IntCounterVec,
    pub dropped_total: IntCounterVec,

    // HTTP-Metriken
    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: HistogramVec,
}

impl RelayMetrics {
    /// Erstellt und registriert alle Metriken in einer neuen Registry
    pub fn neu() -> Result<Self> {
        let registry = Registry::new();

        // --- Signaling-Metriken ---
        let connected_sessions = IntGauge::with_opts(Opts::new(
            "callrelay_connected_sessions",
            "Anzahl aktuell verbundener Sitzungen",
        ))?;
        registry.register(Box::new(connected_sessions.clone()))?;

        let registered_identities = IntGauge::with_opts(Opts::new(
            "callrelay_registered_identities",
            "Anzahl registrierter Identitaeten",
        ))?;
        registry.register(Box::new(registered_identities.clone()))?;

        let events_total = IntCounterVec::new(
            Opts::new("callrelay_events_total", "Gesamtanzahl eingehender Events"),
            &["event"],
        )?;
        registry.register(Box::new(events_total.clone()))?;

        let forwarded_total = IntCounterVec::new(
            Opts::new(
                "callrelay_forwarded_total",
                "Gesamtanzahl ausgehender Zustellversuche",
            ),
            &["event"],
        )?;
        registry.register(Box::new(forwarded_total.clone()))?;

        let dropped_total = IntCounterVec::new(
            Opts::new("callrelay_dropped_total", "Gesamtanzahl verworfener Events"),
            &["reason"],
        )?;
        registry.register(Box::new(dropped_total.clone()))?;

        // --- HTTP-Metriken ---
        let http_requests_total = IntCounterVec::new(
            Opts::new("callrelay_http_requests_total", "Gesamtanzahl HTTP-Anfragen"),
            &["method", "path", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "callrelay_http_request_duration_seconds",
                "HTTP-Antwortzeit in Sekunden",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5,
            ]),
            &["method", "path"],
        )?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            connected_sessions,
            registered_identities,
            events_total,
            forwarded_total,
            dropped_total,
            http_requests_total,
            http_request_duration_seconds,
        })
    }

    /// Zaehlt ein eingehendes Event
    pub fn event_zaehlen(&self, event: &str) {
        self.events_total.with_label_values(&[event]).inc();
    }

    /// Zaehlt einen Zustellversuch
    pub fn weiterleitung_zaehlen(&self, event: &str) {
        self.forwarded_total.with_label_values(&[event]).inc();
    }

    /// Zaehlt ein verworfenes Event
    pub fn verworfen_zaehlen(&self, grund: &str) {
        self.dropped_total.with_label_values(&[grund]).inc();
    }

    /// Exportiert alle Metriken im Prometheus-Textformat
    pub fn exportieren(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Axum-Router fuer den `/metrics`-Endpunkt
pub fn metrics_router(metriken: RelayMetrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metriken)
}

async fn metrics_handler(State(metriken): State<RelayMetrics>) -> impl IntoResponse {
    match metriken.exportieren() {
        Ok(text) => (
            axum::http::StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4",
            )],
            text,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Metriken-Export fehlgeschlagen: {err}");
            axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
