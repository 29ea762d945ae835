//! Session-Broadcaster – Sendeseite des Transport-Adapters
//!
//! Der SessionBroadcaster verwaltet die Send-Queues aller verbundenen
//! Sitzungen. Der Router adressiert ausgehende Events ausschliesslich ueber
//! die `SessionId`; die `ClientConnection` liest ihre Queue und schreibt
//! auf den WebSocket.
//!
//! ## Zustellung
//! Fire-and-forget: `try_send` blockiert nie. Volle oder geschlossene
//! Queues verwerfen die Nachricht, unbekannte Sitzungen werden still
//! ignoriert.

use callrelay_core::SessionId;
use callrelay_protocol::OutboundEvent;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Groesse der Send-Queue pro Sitzung
const SEND_QUEUE_GROESSE: usize = 64;

// ---------------------------------------------------------------------------
// SessionTransport
// ---------------------------------------------------------------------------

/// Schnittstelle zum Transport: ein Event an genau eine Sitzung senden
///
/// Gibt `false` zurueck wenn die Sitzung nicht (mehr) existiert oder die
/// Nachricht nicht eingereiht werden konnte. Der Aufrufer wird darueber
/// hinaus nicht benachrichtigt.
pub trait SessionTransport: Send + Sync + 'static {
    fn senden(&self, session: SessionId, event: OutboundEvent) -> bool;
}

// ---------------------------------------------------------------------------
// SessionSender
// ---------------------------------------------------------------------------

/// Handle auf die Send-Queue einer verbundenen Sitzung
#[derive(Clone, Debug)]
pub struct SessionSender {
    pub session: SessionId,
    pub tx: mpsc::Sender<OutboundEvent>,
}

impl SessionSender {
    /// Sendet ein Event nicht-blockierend an die Sitzung
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist.
    pub fn senden(&self, event: OutboundEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(session = %self.session, "Send-Queue voll – Event verworfen");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(session = %self.session, "Send-Queue geschlossen (Sitzung getrennt)");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SessionBroadcaster
// ---------------------------------------------------------------------------

/// Zentrale Send-Queues aller verbundenen Sitzungen
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone, Default)]
pub struct SessionBroadcaster {
    inner: Arc<DashMap<SessionId, SessionSender>>,
}

impl SessionBroadcaster {
    /// Erstellt einen neuen SessionBroadcaster
    pub fn neu() -> Self {
        Self::default()
    }

    /// Registriert eine neue Sitzung und gibt ihre Empfangs-Queue zurueck
    pub fn session_registrieren(&self, session: SessionId) -> mpsc::Receiver<OutboundEvent> {
        let (tx, rx) = mpsc::channel(SEND_QUEUE_GROESSE);
        self.inner.insert(session, SessionSender { session, tx });
        tracing::debug!(session = %session, "Sitzung im Broadcaster registriert");
        rx
    }

    /// Entfernt eine Sitzung aus dem Broadcaster
    pub fn session_entfernen(&self, session: &SessionId) {
        if self.inner.remove(session).is_some() {
            tracing::debug!(session = %session, "Sitzung aus Broadcaster entfernt");
        }
    }

    /// Sendet ein Event an eine einzelne Sitzung
    ///
    /// Gibt `true` zurueck wenn die Sitzung gefunden und das Event
    /// eingereiht wurde.
    pub fn an_session_senden(&self, session: &SessionId, event: OutboundEvent) -> bool {
        // Sender klonen, damit der DashMap-Shard nicht waehrend des Sendens gesperrt bleibt
        let sender = match self.inner.get(session) {
            Some(eintrag) => eintrag.value().clone(),
            None => {
                tracing::debug!(session = %session, "Senden an unbekannte Sitzung");
                return false;
            }
        };
        sender.senden(event)
    }

    /// Anzahl registrierter Sitzungen
    pub fn session_anzahl(&self) -> usize {
        self.inner.len()
    }

    /// Prueft ob eine Sitzung registriert ist
    pub fn ist_registriert(&self, session: &SessionId) -> bool {
        self.inner.contains_key(session)
    }
}

impl SessionTransport for SessionBroadcaster {
    fn senden(&self, session: SessionId, event: OutboundEvent) -> bool {
        self.an_session_senden(&session, event)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn session_registrieren_und_senden() {
        let broadcaster = SessionBroadcaster::neu();
        let sid = SessionId::new();

        let mut rx = broadcaster.session_registrieren(sid);
        assert!(broadcaster.ist_registriert(&sid));

        assert!(broadcaster.an_session_senden(&sid, OutboundEvent::call_rejected()));

        let empfangen = rx.try_recv().expect("Event muss vorhanden sein");
        assert_eq!(empfangen, OutboundEvent::call_rejected());
    }

    #[tokio::test]
    async fn nur_ziel_sitzung_empfaengt() {
        let broadcaster = SessionBroadcaster::neu();
        let s1 = SessionId::new();
        let s2 = SessionId::new();

        let mut rx1 = broadcaster.session_registrieren(s1);
        let mut rx2 = broadcaster.session_registrieren(s2);

        broadcaster.senden(s2, OutboundEvent::user_unavailable());

        assert!(rx1.try_recv().is_err(), "s1 darf nichts empfangen");
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn senden_an_unbekannte_sitzung_schlaegt_still_fehl() {
        let broadcaster = SessionBroadcaster::neu();
        assert!(!broadcaster.an_session_senden(&SessionId::new(), OutboundEvent::call_rejected()));
    }

    #[test]
    fn volle_queue_verwirft() {
        let broadcaster = SessionBroadcaster::neu();
        let sid = SessionId::new();
        let _rx = broadcaster.session_registrieren(sid);

        for _ in 0..SEND_QUEUE_GROESSE {
            assert!(broadcaster.an_session_senden(&sid, OutboundEvent::call_rejected()));
        }
        assert!(!broadcaster.an_session_senden(&sid, OutboundEvent::call_rejected()));
    }

    #[test]
    fn geschlossene_queue_verwirft() {
        let broadcaster = SessionBroadcaster::neu();
        let sid = SessionId::new();
        drop(broadcaster.session_registrieren(sid));

        assert!(!broadcaster.an_session_senden(&sid, OutboundEvent::call_rejected()));
    }

    #[test]
    fn session_entfernen() {
        let broadcaster = SessionBroadcaster::neu();
        let sid = SessionId::new();
        let _rx = broadcaster.session_registrieren(sid);
        assert_eq!(broadcaster.session_anzahl(), 1);

        broadcaster.session_entfernen(&sid);
        assert!(!broadcaster.ist_registriert(&sid));
        assert_eq!(broadcaster.session_anzahl(), 0);
    }
}
