//! Message-Dispatcher – Die Signaling-State-Machine
//!
//! Der Dispatcher empfaengt eingehende Events aller Verbindungen,
//! bestimmt anhand von Identity-Registry und Anruf-Kontext die Ziel-Sitzung
//! und uebergibt das ausgehende Event dem Transport.
//!
//! ## Nebenlaeufigkeit
//! Registry und Anruf-Kontext liegen gemeinsam hinter einem einzigen
//! Mutex. Jeder Handler laeuft vollstaendig innerhalb eines kritischen
//! Abschnitts, damit zwischen einem `call` und einem folgenden
//! `accept-call`/`offer` keine Aktualisierung verloren geht. Gesendet wird
//! erst nach Freigabe der Sperre; `senden` blockiert nie.

use callrelay_core::{CallContext, Identity, SessionId};
use callrelay_observability::RelayMetrics;
use callrelay_protocol::InboundEvent;
use parking_lot::Mutex;

use crate::broadcast::SessionTransport;
use crate::call_context::CallContextStore;
use crate::handlers::{call_handler, negotiation_handler, session_handler, Entscheidung};
use crate::registry::IdentityRegistry;

// ---------------------------------------------------------------------------
// Zustand
// ---------------------------------------------------------------------------

/// Der gesamte veraenderliche Zustand des Routers
#[derive(Debug, Default)]
pub struct RouterState {
    pub registry: IdentityRegistry,
    pub anruf: CallContextStore,
}

/// Warum ein Event still verworfen wurde
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Noch kein `call` seit Prozessstart
    KeinAnrufKontext,
    /// Anrufer des Kontexts hat keine registrierte Sitzung
    AnruferNichtVerbunden,
    /// Angerufener des Kontexts hat keine registrierte Sitzung
    AngerufenerNichtVerbunden,
}

impl DropReason {
    /// Stabiler Bezeichner (Log-Feld und Metrik-Label)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeinAnrufKontext => "kein_anruf_kontext",
            Self::AnruferNichtVerbunden => "anrufer_nicht_verbunden",
            Self::AngerufenerNichtVerbunden => "angerufener_nicht_verbunden",
        }
    }
}

/// Beobachtbares Ergebnis eines `dispatch`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// `join` verarbeitet
    Registriert,
    /// Ein Event wurde an `ziel` uebergeben
    ///
    /// `zugestellt` ist false wenn der Transport die Sitzung nicht mehr
    /// kannte oder die Queue voll war.
    Weitergeleitet {
        ziel: SessionId,
        event: &'static str,
        zugestellt: bool,
    },
    /// Vorbedingung nicht erfuellt, nichts gesendet
    Verworfen(DropReason),
}

// ---------------------------------------------------------------------------
// MessageDispatcher
// ---------------------------------------------------------------------------

/// Zentraler Dispatcher fuer alle Signaling-Events
///
/// Besitzt Registry und Anruf-Kontext exklusiv; keine andere Komponente
/// veraendert sie.
pub struct MessageDispatcher<T: SessionTransport> {
    zustand: Mutex<RouterState>,
    transport: T,
    metriken: RelayMetrics,
}

impl<T: SessionTransport> MessageDispatcher<T> {
    /// Erstellt einen neuen Dispatcher mit leerem Zustand
    pub fn neu(transport: T, metriken: RelayMetrics) -> Self {
        Self {
            zustand: Mutex::new(RouterState::default()),
            transport,
            metriken,
        }
    }

    /// Verarbeitet ein eingehendes Event der Sitzung `sender`
    pub fn dispatch(&self, sender: SessionId, event: InboundEvent) -> DispatchOutcome {
        let name = event.name();
        self.metriken.event_zaehlen(name);
        tracing::trace!(session = %sender, event = name, "Event empfangen");

        let entscheidung = {
            let mut zustand = self.zustand.lock();
            let entscheidung = match event {
                InboundEvent::Join(req) => session_handler::handle_join(req, sender, &mut zustand),
                InboundEvent::Call(req) => call_handler::handle_call(req, &mut zustand),
                InboundEvent::AcceptCall => call_handler::handle_accept_call(&mut zustand),
                InboundEvent::RejectCall => call_handler::handle_reject_call(&mut zustand),
                InboundEvent::Offer(sdp) => {
                    negotiation_handler::handle_offer(sdp, sender, &mut zustand)
                }
                InboundEvent::Answer(sdp) => {
                    negotiation_handler::handle_answer(sdp, sender, &mut zustand)
                }
                InboundEvent::IceCandidate(kandidat) => {
                    negotiation_handler::handle_ice_candidate(kandidat, sender, &mut zustand)
                }
            };
            self.metriken
                .registered_identities
                .set(zustand.registry.len() as i64);
            entscheidung
        };

        match entscheidung {
            Entscheidung::Erledigt => DispatchOutcome::Registriert,
            Entscheidung::Verwerfen(grund) => {
                tracing::debug!(
                    session = %sender,
                    event = name,
                    grund = grund.as_str(),
                    "Event verworfen"
                );
                self.metriken.verworfen_zaehlen(grund.as_str());
                DispatchOutcome::Verworfen(grund)
            }
            Entscheidung::Zustellen { ziel, event } => {
                let ausgehend = event.name();
                self.metriken.weiterleitung_zaehlen(ausgehend);
                let zugestellt = self.transport.senden(ziel, event);
                tracing::debug!(
                    von = %sender,
                    an = %ziel,
                    event = ausgehend,
                    zugestellt,
                    "Event weitergeleitet"
                );
                DispatchOutcome::Weitergeleitet {
                    ziel,
                    event: ausgehend,
                    zugestellt,
                }
            }
        }
    }

    /// Bereinigt die Registry wenn eine Sitzung getrennt wurde
    ///
    /// Gibt die entfernte Identitaet zurueck, falls es eine gab.
    pub fn client_getrennt(&self, session: SessionId) -> Option<Identity> {
        let mut zustand = self.zustand.lock();
        let entfernt = session_handler::handle_disconnect(session, &mut zustand);
        self.metriken
            .registered_identities
            .set(zustand.registry.len() as i64);
        entfernt
    }

    /// Aktuelle Sitzung einer Identitaet
    pub fn lookup(&self, identity: &Identity) -> Option<SessionId> {
        self.zustand.lock().registry.lookup(identity)
    }

    /// Kopie des aktuellen Anruf-Kontexts
    pub fn aktueller_anruf(&self) -> Option<CallContext> {
        self.zustand.lock().anruf.current().cloned()
    }

    /// Anzahl registrierter Identitaeten
    pub fn identitaeten_anzahl(&self) -> usize {
        self.zustand.lock().registry.len()
    }

    /// Zugriff auf den Transport (z.B. fuer Tests)
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
