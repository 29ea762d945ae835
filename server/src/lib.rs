//! callrelay-server – Bibliotheks-Root
//!
//! Deklariert alle Server-Module und stellt den oeffentlichen Einstiegspunkt
//! fuer Integrationstests bereit.

pub mod config;

use anyhow::Result;
use callrelay_observability::RelayMetrics;
use callrelay_signaling::{SignalingServer, SignalingState};
use config::ServerConfig;
use std::sync::Arc;
use tokio::sync::watch;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet den Signaling-Service und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Konfiguration pruefen
    /// 2. Metriken und Signaling-Zustand anlegen
    /// 3. HTTP/WebSocket-Listener starten
    /// 4. Auf Ctrl-C warten, dann alle Verbindungen schliessen
    pub async fn starten(self) -> Result<()> {
        self.config.pruefen()?;
        let bind_addr = self.config.bind_adresse()?;

        tracing::info!(
            server_name = %self.config.server.name,
            adresse = %bind_addr,
            max_clients = self.config.server.max_clients,
            "Server startet"
        );

        let metriken = RelayMetrics::neu()?;
        let state = SignalingState::neu(self.config.signaling_config(), metriken);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let server = SignalingServer::neu(Arc::clone(&state), bind_addr);
        let mut server_task = tokio::spawn(server.starten(shutdown_rx));

        tracing::info!("Server laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");

        tokio::select! {
            ergebnis = &mut server_task => {
                // Listener hat vorzeitig beendet (z.B. Bind fehlgeschlagen)
                ergebnis??;
                return Ok(());
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                tracing::info!("Shutdown-Signal empfangen, Server wird beendet");
            }
        }

        let _ = shutdown_tx.send(true);
        server_task.await??;

        tracing::info!(
            uptime_sek = state.uptime_sek(),
            "Server beendet"
        );
        Ok(())
    }
}
