//! Negotiation-Handler – Offer, Answer, ICE-Kandidaten
//!
//! Reicht opake Session-Descriptions und Kandidaten unveraendert durch.
//! Geroutet wird nach Rolle, nicht nach Absender: `offer` und
//! `ice-candidate` gehen immer an den Angerufenen, `answer` immer an den
//! Anrufer des aktuellen Kontexts.
//!
//! Der Absender wird nicht gegen die Teilnehmer des Anrufs geprueft. Jede
//! verbundene Sitzung kann so Nutzlasten in den laufenden Anruf
//! einspeisen. Das ist bekannt und wird nur protokolliert.

use callrelay_core::{Identity, SessionId};
use callrelay_protocol::OutboundEvent;
use serde_json::Value;

use super::Entscheidung;
use crate::dispatcher::{DropReason, RouterState};

/// Zielrolle innerhalb des Anruf-Kontexts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rolle {
    Anrufer,
    Angerufener,
}

/// Verarbeitet `offer` (an den Angerufenen)
pub fn handle_offer(sdp: Value, sender: SessionId, state: &mut RouterState) -> Entscheidung {
    weiterleiten(OutboundEvent::Offer(sdp), Rolle::Angerufener, sender, state)
}

/// Verarbeitet `answer` (an den Anrufer)
pub fn handle_answer(sdp: Value, sender: SessionId, state: &mut RouterState) -> Entscheidung {
    weiterleiten(OutboundEvent::Answer(sdp), Rolle::Anrufer, sender, state)
}

/// Verarbeitet `ice-candidate` (an den Angerufenen)
pub fn handle_ice_candidate(
    kandidat: Value,
    sender: SessionId,
    state: &mut RouterState,
) -> Entscheidung {
    weiterleiten(
        OutboundEvent::IceCandidate(kandidat),
        Rolle::Angerufener,
        sender,
        state,
    )
}

fn weiterleiten(
    event: OutboundEvent,
    rolle: Rolle,
    sender: SessionId,
    state: &RouterState,
) -> Entscheidung {
    let Some(ctx) = state.anruf.current() else {
        return Entscheidung::Verwerfen(DropReason::KeinAnrufKontext);
    };

    let (ziel_identitaet, grund): (&Identity, _) = match rolle {
        Rolle::Anrufer => (&ctx.caller, DropReason::AnruferNichtVerbunden),
        Rolle::Angerufener => (&ctx.callee, DropReason::AngerufenerNichtVerbunden),
    };

    let Some(ziel) = state.registry.lookup(ziel_identitaet) else {
        return Entscheidung::Verwerfen(grund);
    };

    let ist_teilnehmer = [&ctx.caller, &ctx.callee]
        .into_iter()
        .any(|teilnehmer| state.registry.lookup(teilnehmer) == Some(sender));
    if !ist_teilnehmer {
        tracing::debug!(
            session = %sender,
            event = event.name(),
            caller = %ctx.caller,
            callee = %ctx.callee,
            "Absender ist kein Teilnehmer des aktuellen Anrufs"
        );
    }

    Entscheidung::Zustellen { ziel, event }
}
