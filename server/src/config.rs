//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist.
//!
//! Bind-Adresse und Port koennen per Umgebungsvariable ueberschrieben
//! werden:
//! - `CALLRELAY_BIND`: Bind-Adresse (z.B. `127.0.0.1`)
//! - `CALLRELAY_PORT`: Port (z.B. `5000`)

use callrelay_core::{RelayError, Result};
use callrelay_observability::{log_format_gueltig, log_level_gueltig};
use callrelay_signaling::SignalingConfig;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct ServerConfig {
    /// Allgemeine Server-Einstellungen
    pub server: ServerEinstellungen,
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Keepalive und Timeout pro Verbindung
    pub verbindung: VerbindungsEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
    /// Observability-Einstellungen (Metriken)
    pub observability: ObservabilityEinstellungen,
}

/// Allgemeine Server-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Anzeigename des Servers
    pub name: String,
    /// Maximale Anzahl gleichzeitiger Sitzungen
    pub max_clients: u32,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            name: "callrelay".into(),
            max_clients: 512,
        }
    }
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Adresse fuer HTTP und WebSocket
    pub bind_adresse: String,
    /// Port fuer HTTP und WebSocket
    pub port: u16,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            port: 5000,
        }
    }
}

/// Verbindungs-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerbindungsEinstellungen {
    /// Abstand der WebSocket-Pings in Sekunden
    pub keepalive_sek: u64,
    /// Nach dieser Zeit ohne empfangenen Frame wird getrennt
    pub verbindungs_timeout_sek: u64,
}

impl Default for VerbindungsEinstellungen {
    fn default() -> Self {
        Self {
            keepalive_sek: 25,
            verbindungs_timeout_sek: 60,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Observability-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityEinstellungen {
    /// Liefert `/metrics` aus
    pub aktiviert: bool,
}

impl Default for ObservabilityEinstellungen {
    fn default() -> Self {
        Self { aktiviert: true }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Wendet `CALLRELAY_BIND` und `CALLRELAY_PORT` aus der Prozessumgebung an
    pub fn mit_umgebung(mut self) -> Result<Self> {
        self.umgebung_anwenden(|name| std::env::var(name).ok())?;
        Ok(self)
    }

    /// Wendet Ueberschreibungen aus einer beliebigen Variablenquelle an
    pub fn umgebung_anwenden(&mut self, lesen: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(bind) = lesen("CALLRELAY_BIND") {
            self.netzwerk.bind_adresse = bind;
        }
        if let Some(port) = lesen("CALLRELAY_PORT") {
            self.netzwerk.port = port.trim().parse().map_err(|_| {
                RelayError::Konfiguration(format!("CALLRELAY_PORT ist kein gueltiger Port: '{port}'"))
            })?;
        }
        Ok(())
    }

    /// Prueft Werte, die TOML allein nicht absichert
    pub fn pruefen(&self) -> Result<()> {
        self.bind_adresse()?;

        if self.verbindung.keepalive_sek == 0 {
            return Err(RelayError::Konfiguration(
                "verbindung.keepalive_sek muss mindestens 1 sein".into(),
            ));
        }
        if self.verbindung.verbindungs_timeout_sek <= self.verbindung.keepalive_sek {
            return Err(RelayError::Konfiguration(format!(
                "verbindung.verbindungs_timeout_sek ({}) muss groesser als keepalive_sek ({}) sein",
                self.verbindung.verbindungs_timeout_sek, self.verbindung.keepalive_sek
            )));
        }
        if !log_level_gueltig(&self.logging.level) {
            return Err(RelayError::Konfiguration(format!(
                "Unbekanntes Log-Level: '{}'",
                self.logging.level
            )));
        }
        if !log_format_gueltig(&self.logging.format) {
            return Err(RelayError::Konfiguration(format!(
                "Unbekanntes Log-Format: '{}'",
                self.logging.format
            )));
        }
        Ok(())
    }

    /// Gibt die vollstaendige Bind-Adresse fuer HTTP/WebSocket zurueck
    pub fn bind_adresse(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.netzwerk.bind_adresse.parse().map_err(|_| {
            RelayError::Konfiguration(format!(
                "Ungueltige Bind-Adresse: '{}'",
                self.netzwerk.bind_adresse
            ))
        })?;
        Ok(SocketAddr::new(ip, self.netzwerk.port))
    }

    /// Leitet die Konfiguration des Signaling-Service ab
    pub fn signaling_config(&self) -> SignalingConfig {
        SignalingConfig {
            server_name: self.server.name.clone(),
            max_clients: self.server.max_clients,
            keepalive_sek: self.verbindung.keepalive_sek,
            verbindungs_timeout_sek: self.verbindung.verbindungs_timeout_sek,
            metriken_aktiviert: self.observability.aktiviert,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn umgebung(paare: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = paare
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn standard_config_ist_valide() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.server.max_clients, 512);
        assert_eq!(cfg.netzwerk.port, 5000);
        assert_eq!(cfg.verbindung.keepalive_sek, 25);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.pruefen().is_ok());
    }

    #[test]
    fn bind_adresse_standard() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.bind_adresse().unwrap().to_string(), "0.0.0.0:5000");
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            [server]
            name = "Testrelay"
            max_clients = 100

            [netzwerk]
            port = 8080

            [observability]
            aktiviert = false
        "#;
        let cfg: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.server.name, "Testrelay");
        assert_eq!(cfg.server.max_clients, 100);
        assert_eq!(cfg.netzwerk.port, 8080);
        // Nicht angegebene Felder behalten Standardwerte
        assert_eq!(cfg.netzwerk.bind_adresse, "0.0.0.0");
        assert_eq!(cfg.verbindung.verbindungs_timeout_sek, 60);
        assert!(!cfg.signaling_config().metriken_aktiviert);
    }

    #[test]
    fn beispielkonfiguration_ist_gueltig() {
        let cfg: ServerConfig = toml::from_str(include_str!("../../config.example.toml")).unwrap();
        assert!(cfg.pruefen().is_ok());
        assert_eq!(cfg.bind_adresse().unwrap().port(), 5000);
    }

    #[test]
    fn fehlende_datei_liefert_standardwerte() {
        let cfg = ServerConfig::laden("/nicht/vorhanden/callrelay.toml").unwrap();
        assert_eq!(cfg.netzwerk.port, 5000);
    }

    #[test]
    fn umgebung_ueberschreibt_bind_und_port() {
        let mut cfg = ServerConfig::default();
        cfg.umgebung_anwenden(umgebung(&[
            ("CALLRELAY_BIND", "127.0.0.1"),
            ("CALLRELAY_PORT", "6000"),
        ]))
        .unwrap();

        assert_eq!(cfg.bind_adresse().unwrap().to_string(), "127.0.0.1:6000");
    }

    #[test]
    fn ungueltiger_port_in_umgebung_ist_fehler() {
        let mut cfg = ServerConfig::default();
        let err = cfg
            .umgebung_anwenden(umgebung(&[("CALLRELAY_PORT", "70000")]))
            .unwrap_err();

        assert!(matches!(err, RelayError::Konfiguration(_)));
        assert_eq!(cfg.netzwerk.port, 5000);
    }

    #[test]
    fn ungueltige_bind_adresse_ist_fehler() {
        let mut cfg = ServerConfig::default();
        cfg.netzwerk.bind_adresse = "irgendwo".into();
        assert!(cfg.pruefen().is_err());
    }

    #[test]
    fn timeout_muss_ueber_keepalive_liegen() {
        let mut cfg = ServerConfig::default();
        cfg.verbindung.verbindungs_timeout_sek = 25;
        assert!(cfg.pruefen().is_err());

        cfg.verbindung.keepalive_sek = 0;
        assert!(cfg.pruefen().is_err());
    }

    #[test]
    fn unbekanntes_log_format_ist_fehler() {
        let mut cfg = ServerConfig::default();
        cfg.logging.format = "xml".into();
        assert!(cfg.pruefen().is_err());
    }

    #[test]
    fn signaling_config_uebernimmt_werte() {
        let mut cfg = ServerConfig::default();
        cfg.server.max_clients = 3;
        cfg.verbindung.keepalive_sek = 10;

        let sig = cfg.signaling_config();
        assert_eq!(sig.max_clients, 3);
        assert_eq!(sig.keepalive_sek, 10);
        assert_eq!(sig.verbindungs_timeout_sek, 60);
    }
}
