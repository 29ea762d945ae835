//! Handler fuer alle eingehenden Events
//!
//! Jeder Handler arbeitet auf dem gesperrten `RouterState` und liefert
//! eine `Entscheidung`: an welche Sitzung welches Event geht, oder warum
//! nichts passiert. Gesendet wird erst vom Dispatcher, nach Freigabe
//! der Sperre.

pub mod call_handler;
pub mod negotiation_handler;
pub mod session_handler;

use callrelay_core::SessionId;
use callrelay_protocol::OutboundEvent;

use crate::dispatcher::DropReason;

/// Ergebnis eines Handlers
#[derive(Debug, Clone, PartialEq)]
pub enum Entscheidung {
    /// Event an genau eine Sitzung senden
    Zustellen {
        ziel: SessionId,
        event: OutboundEvent,
    },
    /// Event still verwerfen
    Verwerfen(DropReason),
    /// Nur Zustandsaenderung, nichts zu senden
    Erledigt,
}
