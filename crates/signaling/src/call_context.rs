//! Call-Context-Store – Der eine laufende Anruf
//!
//! Haelt die Teilnehmer des zuletzt gestarteten Anrufs. Es gibt genau
//! einen Slot fuer den gesamten Dienst; jeder `call` ueberschreibt ihn,
//! auch wenn ein vorheriger Anruf noch laeuft. Geloescht wird er nie.

use callrelay_core::{CallContext, Identity};

/// Einzelner, dienstweiter Anruf-Slot
#[derive(Debug, Default)]
pub struct CallContextStore {
    aktuell: Option<CallContext>,
}

impl CallContextStore {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Startet einen Anruf und ersetzt den bisherigen Kontext
    pub fn start(&mut self, caller: Identity, callee: Identity) -> &CallContext {
        self.aktuell.insert(CallContext { caller, callee })
    }

    /// Aktueller Kontext (None nur vor dem ersten Anruf)
    pub fn current(&self) -> Option<&CallContext> {
        self.aktuell.as_ref()
    }
}
