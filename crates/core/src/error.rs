//! Fehlertypen fuer callrelay
//!
//! Zentraler Fehler-Enum fuer Protokoll- und Konfigurationsfehler.
//! Fehlende Registry-Eintraege sind keine Fehler, sondern weiche
//! Routing-Ergebnisse und tauchen hier nicht auf.

use thiserror::Error;

/// Globaler Result-Alias fuer callrelay
pub type Result<T> = std::result::Result<T, RelayError>;

/// Alle harten Fehlerzustaende im callrelay-System
#[derive(Debug, Error)]
pub enum RelayError {
    // --- Protokoll ---
    #[error("Ungueltige Nachricht: {0}")]
    UngueltigeNachricht(String),

    #[error("Unbekanntes Event: {0}")]
    UnbekanntesEvent(String),

    #[error("Pflichtfeld fehlt: {event}.{feld}")]
    FeldFehlt { event: &'static str, feld: &'static str },

    #[error("JSON-Fehler: {0}")]
    Json(#[from] serde_json::Error),

    // --- Konfiguration ---
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),
}

impl RelayError {
    /// Gibt true zurueck wenn der Fehler nur das einzelne Event betrifft
    ///
    /// Solche Fehler verwerfen das Event; Verbindung und Prozess laufen weiter.
    pub fn betrifft_nur_event(&self) -> bool {
        matches!(
            self,
            Self::UngueltigeNachricht(_)
                | Self::UnbekanntesEvent(_)
                | Self::FeldFehlt { .. }
                | Self::Json(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = RelayError::UnbekanntesEvent("hangup".into());
        assert_eq!(e.to_string(), "Unbekanntes Event: hangup");
    }

    #[test]
    fn feld_fehlt_anzeige() {
        let e = RelayError::FeldFehlt {
            event: "call",
            feld: "to",
        };
        assert_eq!(e.to_string(), "Pflichtfeld fehlt: call.to");
    }

    #[test]
    fn event_fehler_erkennung() {
        assert!(RelayError::UngueltigeNachricht("x".into()).betrifft_nur_event());
        assert!(!RelayError::Konfiguration("x".into()).betrifft_nur_event());
    }
}
