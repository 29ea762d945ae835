//! Gemeinsamer Server-Zustand fuer den Signaling-Service
//!
//! Haelt Dispatcher, Broadcaster und Metriken, die sicher zwischen
//! tokio-Tasks geteilt werden koennen.

use callrelay_observability::{RelayMetrics, StatusQuelle};
use std::sync::Arc;
use std::time::Instant;

use crate::broadcast::SessionBroadcaster;
use crate::dispatcher::MessageDispatcher;

/// Konfiguration fuer den Signaling-Service
#[derive(Debug, Clone)]
pub struct SignalingConfig {
    /// Anzeigename des Servers (nur fuer Logs)
    pub server_name: String,
    /// Maximale gleichzeitige Sitzungen
    pub max_clients: u32,
    /// Keepalive-Intervall in Sekunden
    pub keepalive_sek: u64,
    /// Timeout fuer inaktive Verbindungen in Sekunden
    pub verbindungs_timeout_sek: u64,
    /// `/metrics` ausliefern
    pub metriken_aktiviert: bool,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            server_name: "callrelay".to_string(),
            max_clients: 512,
            keepalive_sek: 25,
            verbindungs_timeout_sek: 60,
            metriken_aktiviert: true,
        }
    }
}

/// Gemeinsamer Server-Zustand (thread-safe, Arc-geteilt)
pub struct SignalingState {
    /// Server-Konfiguration
    pub config: Arc<SignalingConfig>,
    /// Router mit Registry und Anruf-Kontext
    pub dispatcher: MessageDispatcher<SessionBroadcaster>,
    /// Send-Queues aller Sitzungen (teilt den Zustand mit dem Dispatcher)
    pub broadcaster: SessionBroadcaster,
    /// Prometheus-Metriken
    pub metriken: RelayMetrics,
    /// Startzeitpunkt des Servers
    pub start_time: Instant,
}

impl SignalingState {
    /// Erstellt einen neuen SignalingState
    pub fn neu(config: SignalingConfig, metriken: RelayMetrics) -> Arc<Self> {
        let broadcaster = SessionBroadcaster::neu();
        Arc::new(Self {
            config: Arc::new(config),
            dispatcher: MessageDispatcher::neu(broadcaster.clone(), metriken.clone()),
            broadcaster,
            metriken,
            start_time: Instant::now(),
        })
    }

    /// Gibt die Uptime in Sekunden zurueck
    pub fn uptime_sek(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Prueft ob eine weitere Sitzung angenommen werden darf
    pub fn hat_kapazitaet(&self) -> bool {
        (self.broadcaster.session_anzahl() as u64) < u64::from(self.config.max_clients)
    }
}

impl StatusQuelle for SignalingState {
    fn verbundene_sitzungen(&self) -> usize {
        self.broadcaster.session_anzahl()
    }

    fn registrierte_identitaeten(&self) -> usize {
        self.dispatcher.identitaeten_anzahl()
    }

    fn max_sitzungen(&self) -> usize {
        self.config.max_clients as usize
    }
}
