//! Session-Handler – Join und Disconnect
//!
//! Pflegt die Identity-Registry. Beide Operationen gelingen immer.

use callrelay_core::{Identity, SessionId};
use callrelay_protocol::JoinRequest;

use super::Entscheidung;
use crate::dispatcher::RouterState;

/// Verarbeitet `join`: Identitaet der sendenden Sitzung zuordnen
///
/// Eine vorherige Sitzung derselben Identitaet wird nicht benachrichtigt.
pub fn handle_join(request: JoinRequest, sender: SessionId, state: &mut RouterState) -> Entscheidung {
    let identity = request.username;

    match state.registry.register(identity.clone(), sender) {
        Some(verdraengt) => tracing::info!(
            identity = %identity,
            session = %sender,
            verdraengt = %verdraengt,
            "Identitaet von anderer Sitzung uebernommen"
        ),
        None => tracing::info!(identity = %identity, session = %sender, "Benutzer beigetreten"),
    }

    Entscheidung::Erledigt
}

/// Verarbeitet das Trennen einer Sitzung
///
/// Entfernt hoechstens eine Identitaet, naemlich die erste, die auf die
/// Sitzung zeigt.
pub fn handle_disconnect(session: SessionId, state: &mut RouterState) -> Option<Identity> {
    let entfernt = state.registry.unregister_by_session(session);
    match &entfernt {
        Some(identity) => {
            tracing::info!(identity = %identity, session = %session, "Benutzer getrennt")
        }
        None => tracing::debug!(session = %session, "Sitzung ohne Identitaet getrennt"),
    }
    entfernt
}
