//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable:
//! - `CR_LOG_LEVEL`: Log-Level oder EnvFilter-Direktive, Standard: aus Config
//! - `CR_LOG_FORMAT`: Format (text/json), Standard: aus Config

use tracing_subscriber::{fmt, EnvFilter};

/// Ausgabeformat der Logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Parst `text` oder `json` (Kleinschreibung)
    pub fn parsen(format: &str) -> Option<Self> {
        match format {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Waehlt den wirksamen Wert: Umgebung vor Konfiguration
fn wirksam(umgebung: Option<String>, config: &str) -> String {
    umgebung
        .filter(|wert| !wert.trim().is_empty())
        .unwrap_or_else(|| config.to_string())
}

/// Baut den EnvFilter; ungueltige Direktiven fallen auf `info` zurueck
fn filter_bauen(direktive: &str) -> EnvFilter {
    EnvFilter::try_new(direktive).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialisiert das Logging-System.
///
/// `CR_LOG_LEVEL` und `CR_LOG_FORMAT` haben Vorrang vor den Werten aus
/// der Konfiguration. Ein zweiter Aufruf im selben Prozess ist wirkungslos.
pub fn logging_initialisieren(level: &str, format: &str) {
    let filter = filter_bauen(&wirksam(std::env::var("CR_LOG_LEVEL").ok(), level));
    let format = LogFormat::parsen(&wirksam(std::env::var("CR_LOG_FORMAT").ok(), format))
        .unwrap_or(LogFormat::Text);

    let ergebnis = match format {
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_current_span(true)
            .try_init(),
        LogFormat::Text => fmt().with_env_filter(filter).with_target(true).try_init(),
    };

    if ergebnis.is_err() {
        tracing::debug!("Logging war bereits initialisiert");
    }
}

/// Validiert ob ein Log-Level-String gueltig ist.
pub fn log_level_gueltig(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    LogFormat::parsen(format).is_some()
}
