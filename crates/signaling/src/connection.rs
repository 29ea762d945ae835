//! Client-Connection – Verwaltet eine einzelne WebSocket-Verbindung
//!
//! Jede WebSocket-Verbindung bekommt eine `ClientConnection` in einem
//! eigenen tokio-Task und eine frische `SessionId`.
//!
//! ## Ablauf
//! ```text
//! Upgrade -> Sitzung im Broadcaster registrieren
//!     |
//!     +-- Text-Frame      -> InboundEvent dekodieren -> Dispatcher
//!     +-- Send-Queue      -> OutboundEvent als Text-Frame schreiben
//!     +-- Keepalive       -> Ping
//!     +-- Shutdown/Close  -> Schleife verlassen
//!     |
//!     v
//! Disconnect: Registry bereinigen, Sitzung entfernen
//! ```
//!
//! ## Keepalive
//! - Server sendet alle `keepalive_sek` einen WebSocket-Ping
//! - Kommt innerhalb von `verbindungs_timeout_sek` kein Frame, wird die
//!   Verbindung getrennt

use axum::extract::ws::{Message, WebSocket};
use callrelay_core::SessionId;
use callrelay_protocol::{InboundEvent, OutboundEvent};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};

use crate::dispatcher::DispatchOutcome;
use crate::error::{SignalingError, SignalingResult};
use crate::server_state::SignalingState;

/// Verarbeitet eine einzelne WebSocket-Verbindung
pub struct ClientConnection {
    state: Arc<SignalingState>,
    session: SessionId,
    peer_addr: SocketAddr,
}

impl ClientConnection {
    /// Erstellt eine neue ClientConnection mit frischer SessionId
    pub fn neu(state: Arc<SignalingState>, peer_addr: SocketAddr) -> Self {
        Self {
            state,
            session: SessionId::new(),
            peer_addr,
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Startet die Verbindungs-Verarbeitungsschleife
    ///
    /// Laeuft bis die Verbindung getrennt wird oder ein Shutdown-Signal
    /// eingeht. Danach wird der Disconnect genau einmal an den Dispatcher
    /// gemeldet.
    pub async fn verarbeiten(self, socket: WebSocket, shutdown_rx: watch::Receiver<bool>) {
        let session = self.session;
        let peer_addr = self.peer_addr;

        tracing::info!(session = %session, peer = %peer_addr, "Neue Verbindung");

        let sende_rx = self.state.broadcaster.session_registrieren(session);
        self.state.metriken.connected_sessions.inc();

        match self.schleife(socket, sende_rx, shutdown_rx).await {
            Ok(()) => tracing::info!(session = %session, peer = %peer_addr, "Verbindung beendet"),
            Err(e) => tracing::warn!(
                session = %session,
                peer = %peer_addr,
                fehler = %e,
                "Verbindung abgebrochen"
            ),
        }

        // Cleanup beim Verbindungsende
        self.state.dispatcher.client_getrennt(session);
        self.state.broadcaster.session_entfernen(&session);
        self.state.metriken.connected_sessions.dec();

        tracing::debug!(session = %session, "Verbindungs-Task beendet");
    }

    async fn schleife(
        &self,
        mut socket: WebSocket,
        mut sende_rx: mpsc::Receiver<OutboundEvent>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> SignalingResult<()> {
        let keepalive_intervall = Duration::from_secs(self.state.config.keepalive_sek);
        let timeout_dauer = Duration::from_secs(self.state.config.verbindungs_timeout_sek);

        // Zeitpunkt des letzten empfangenen Frames
        let mut letzter_empfang = Instant::now();
        let mut naechster_ping = Instant::now() + keepalive_intervall;

        loop {
            let jetzt = Instant::now();

            if jetzt.duration_since(letzter_empfang) > timeout_dauer {
                return Err(SignalingError::Timeout);
            }

            let ping_verzoegerung = naechster_ping.saturating_duration_since(jetzt);

            tokio::select! {
                // Eingehender Frame vom Client
                nachricht = socket.recv() => {
                    match nachricht {
                        Some(Ok(Message::Text(text))) => {
                            letzter_empfang = Instant::now();
                            match self.text_verarbeiten(&text) {
                                Ok(_) => {}
                                // Nur dieses Event ist betroffen, die Verbindung bleibt offen
                                Err(SignalingError::Protokoll(e)) if e.betrifft_nur_event() => {
                                    tracing::warn!(
                                        session = %self.session,
                                        fehler = %e,
                                        "Ungueltiges Event verworfen"
                                    );
                                }
                                Err(e) => return Err(e),
                            }
                        }
                        Some(Ok(Message::Binary(_))) => {
                            letzter_empfang = Instant::now();
                            tracing::debug!(session = %self.session, "Binaer-Frame ignoriert");
                        }
                        Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                            letzter_empfang = Instant::now();
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            tracing::debug!(session = %self.session, "Verbindung vom Client getrennt");
                            return Ok(());
                        }
                        Some(Err(e)) => return Err(e.into()),
                    }
                }

                // Ausgehendes Event aus dem Broadcaster
                Some(ausgehend) = sende_rx.recv() => {
                    let text = ausgehend.to_json()?;
                    socket.send(Message::Text(text)).await?;
                }

                // Keepalive-Ping
                _ = tokio::time::sleep(ping_verzoegerung) => {
                    if Instant::now() >= naechster_ping {
                        socket.send(Message::Ping(Vec::new())).await?;
                        naechster_ping = Instant::now() + keepalive_intervall;
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::debug!(session = %self.session, "Shutdown-Signal – Verbindung wird getrennt");
                        let _ = socket.send(Message::Close(None)).await;
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Dekodiert einen Text-Frame und uebergibt ihn dem Dispatcher
    fn text_verarbeiten(&self, text: &str) -> SignalingResult<DispatchOutcome> {
        let event = InboundEvent::from_json(text)?;
        Ok(self.state.dispatcher.dispatch(self.session, event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server_state::SignalingConfig;
    use callrelay_observability::RelayMetrics;

    fn verbindung() -> ClientConnection {
        let state = SignalingState::neu(SignalingConfig::default(), RelayMetrics::neu().unwrap());
        ClientConnection::neu(state, "127.0.0.1:40000".parse().unwrap())
    }

    #[test]
    fn jede_verbindung_hat_eigene_sitzung() {
        assert_ne!(verbindung().session(), verbindung().session());
    }

    #[test]
    fn gueltiger_text_wird_dispatcht() {
        let v = verbindung();
        let ergebnis = v
            .text_verarbeiten(r#"{"event":"join","data":{"username":"alice"}}"#)
            .unwrap();

        assert_eq!(ergebnis, DispatchOutcome::Registriert);
        assert_eq!(v.state.dispatcher.lookup(&"alice".into()), Some(v.session()));
    }

    #[test]
    fn ungueltiger_text_ist_protokollfehler() {
        let v = verbindung();
        let err = v
            .text_verarbeiten(r#"{"event":"call","data":{"from":"alice"}}"#)
            .unwrap_err();

        assert!(matches!(err, SignalingError::Protokoll(_)));
        assert!(v.state.dispatcher.aktueller_anruf().is_none());
    }
}
