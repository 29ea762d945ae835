//! Call-Handler – Call, Accept, Reject
//!
//! `call` ist das einzige Event das den Anruf-Kontext schreibt und das
//! einzige, das bei einem Fehler einen sichtbaren Hinweis
//! (`user-unavailable`) erzeugt. Accept und Reject gehen immer an den
//! Anrufer des aktuellen Kontexts.

use callrelay_protocol::{CallRequest, OutboundEvent};

use super::Entscheidung;
use crate::dispatcher::{DropReason, RouterState};

/// Verarbeitet `call`
///
/// Der Kontext wird vor der Erreichbarkeitspruefung ueberschrieben, auch
/// wenn der Angerufene nicht online ist.
pub fn handle_call(request: CallRequest, state: &mut RouterState) -> Entscheidung {
    let CallRequest { from, to } = request;
    let ctx = state.anruf.start(from, to).clone();

    if let Some(ziel) = state.registry.lookup(&ctx.callee) {
        tracing::info!(caller = %ctx.caller, callee = %ctx.callee, "Anruf signalisiert");
        return Entscheidung::Zustellen {
            ziel,
            event: OutboundEvent::call_received(&ctx),
        };
    }

    match state.registry.lookup(&ctx.caller) {
        Some(ziel) => {
            tracing::info!(caller = %ctx.caller, callee = %ctx.callee, "Angerufener nicht online");
            Entscheidung::Zustellen {
                ziel,
                event: OutboundEvent::user_unavailable(),
            }
        }
        // Weder Angerufener noch Anrufer erreichbar: Hinweis nicht adressierbar
        None => Entscheidung::Verwerfen(DropReason::AnruferNichtVerbunden),
    }
}

/// Verarbeitet `accept-call`
pub fn handle_accept_call(state: &mut RouterState) -> Entscheidung {
    let Some(ctx) = state.anruf.current() else {
        return Entscheidung::Verwerfen(DropReason::KeinAnrufKontext);
    };
    match state.registry.lookup(&ctx.caller) {
        Some(ziel) => {
            tracing::info!(caller = %ctx.caller, callee = %ctx.callee, "Anruf angenommen");
            Entscheidung::Zustellen {
                ziel,
                event: OutboundEvent::call_accepted(ctx),
            }
        }
        None => Entscheidung::Verwerfen(DropReason::AnruferNichtVerbunden),
    }
}

/// Verarbeitet `reject-call`
pub fn handle_reject_call(state: &mut RouterState) -> Entscheidung {
    let Some(ctx) = state.anruf.current() else {
        return Entscheidung::Verwerfen(DropReason::KeinAnrufKontext);
    };
    match state.registry.lookup(&ctx.caller) {
        Some(ziel) => {
            tracing::info!(caller = %ctx.caller, callee = %ctx.callee, "Anruf abgelehnt");
            Entscheidung::Zustellen {
                ziel,
                event: OutboundEvent::call_rejected(),
            }
        }
        None => Entscheidung::Verwerfen(DropReason::AnruferNichtVerbunden),
    }
}
