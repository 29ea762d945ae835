//! Identity-Registry – Wer ist unter welcher Identitaet erreichbar
//!
//! Bildet jede vom Client gewaehlte Identitaet auf genau ein
//! Sitzungs-Handle ab. Ein erneuter `join` ueberschreibt die Zuordnung
//! (last-write-wins); die vorherige Sitzung wird dabei nicht getrennt,
//! sie ist nur nicht mehr ueber diese Identitaet erreichbar.
//!
//! ## Rueckwaerts-Index
//! Fuer das Trennen einer Sitzung wird ein zweiter Index
//! `session -> identitaeten` gefuehrt. Jede Identitaet bekommt beim ersten
//! Einfuegen eine Sequenznummer, die beim Ueberschreiben erhalten bleibt.
//! `unregister_by_session` entfernt damit genau die erste Identitaet in
//! Einfuege-Reihenfolge, ohne die ganze Registry zu durchsuchen.
//!
//! Die Registry selbst ist nicht thread-safe; der `MessageDispatcher`
//! serialisiert alle Zugriffe ueber einen gemeinsamen Mutex.

use callrelay_core::{Identity, SessionId};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy)]
struct Eintrag {
    session: SessionId,
    /// Position in Einfuege-Reihenfolge
    seq: u64,
}

/// Abbildung Identitaet -> Sitzung
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    eintraege: HashMap<Identity, Eintrag>,
    nach_session: HashMap<SessionId, BTreeMap<u64, Identity>>,
    naechste_seq: u64,
}

impl IdentityRegistry {
    /// Erstellt eine leere Registry
    pub fn neu() -> Self {
        Self::default()
    }

    /// Ordnet `identity` der Sitzung `session` zu (bedingungsloses Upsert)
    ///
    /// Gibt die verdraengte Sitzung zurueck, falls die Identitaet vorher
    /// einer anderen Sitzung gehoerte.
    pub fn register(&mut self, identity: Identity, session: SessionId) -> Option<SessionId> {
        if let Some(eintrag) = self.eintraege.get_mut(&identity) {
            let alt = eintrag.session;
            if alt == session {
                return None;
            }
            eintrag.session = session;
            let seq = eintrag.seq;

            Self::aus_index_entfernen(&mut self.nach_session, alt, seq);
            self.nach_session
                .entry(session)
                .or_default()
                .insert(seq, identity);
            return Some(alt);
        }

        let seq = self.naechste_seq;
        self.naechste_seq += 1;
        self.eintraege
            .insert(identity.clone(), Eintrag { session, seq });
        self.nach_session
            .entry(session)
            .or_default()
            .insert(seq, identity);
        None
    }

    /// Gibt die aktuelle Sitzung einer Identitaet zurueck
    pub fn lookup(&self, identity: &Identity) -> Option<SessionId> {
        self.eintraege.get(identity).map(|e| e.session)
    }

    /// Entfernt die erste Identitaet (Einfuege-Reihenfolge), die auf
    /// `session` zeigt
    ///
    /// Pro Aufruf wird hoechstens ein Eintrag entfernt. No-op wenn keine
    /// Identitaet auf die Sitzung zeigt.
    pub fn unregister_by_session(&mut self, session: SessionId) -> Option<Identity> {
        let identitaeten = self.nach_session.get_mut(&session)?;
        let (_, identity) = identitaeten.pop_first()?;
        if identitaeten.is_empty() {
            self.nach_session.remove(&session);
        }
        self.eintraege.remove(&identity);
        Some(identity)
    }

    /// Alle Identitaeten die aktuell auf `session` zeigen, in
    /// Einfuege-Reihenfolge
    pub fn identitaeten_von(&self, session: SessionId) -> Vec<Identity> {
        self.nach_session
            .get(&session)
            .map(|ids| ids.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Anzahl registrierter Identitaeten
    pub fn len(&self) -> usize {
        self.eintraege.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eintraege.is_empty()
    }

    fn aus_index_entfernen(
        index: &mut HashMap<SessionId, BTreeMap<u64, Identity>>,
        session: SessionId,
        seq: u64,
    ) {
        if let Some(ids) = index.get_mut(&session) {
            ids.remove(&seq);
            if ids.is_empty() {
                index.remove(&session);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> Identity {
        Identity::from(name)
    }

    #[test]
    fn register_und_lookup() {
        let mut reg = IdentityRegistry::neu();
        let s1 = SessionId::new();

        assert!(reg.register(id("alice"), s1).is_none());
        assert_eq!(reg.lookup(&id("alice")), Some(s1));
        assert_eq!(reg.lookup(&id("bob")), None);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn letzter_join_gewinnt() {
        let mut reg = IdentityRegistry::neu();
        let sitzungen: Vec<SessionId> = (0..5).map(|_| SessionId::new()).collect();

        for s in &sitzungen {
            reg.register(id("alice"), *s);
        }

        assert_eq!(reg.lookup(&id("alice")), sitzungen.last().copied());
        assert_eq!(reg.len(), 1);
        // Verdraengte Sitzungen haben keine Identitaet mehr
        for s in &sitzungen[..4] {
            assert!(reg.identitaeten_von(*s).is_empty());
        }
    }

    #[test]
    fn verdraengte_sitzung_wird_gemeldet() {
        let mut reg = IdentityRegistry::neu();
        let s1 = SessionId::new();
        let s2 = SessionId::new();

        reg.register(id("alice"), s1);
        assert_eq!(reg.register(id("alice"), s2), Some(s1));
    }

    #[test]
    fn wiederholter_join_ist_idempotent() {
        let mut reg = IdentityRegistry::neu();
        let s1 = SessionId::new();

        for _ in 0..3 {
            assert!(reg.register(id("alice"), s1).is_none());
        }

        assert_eq!(reg.len(), 1);
        assert_eq!(reg.lookup(&id("alice")), Some(s1));
        assert_eq!(reg.identitaeten_von(s1), vec![id("alice")]);
    }

    #[test]
    fn trennen_entfernt_identitaet() {
        let mut reg = IdentityRegistry::neu();
        let s1 = SessionId::new();
        let s2 = SessionId::new();

        reg.register(id("alice"), s1);
        reg.register(id("bob"), s2);

        assert_eq!(reg.unregister_by_session(s1), Some(id("alice")));
        assert_eq!(reg.lookup(&id("alice")), None);
        assert_eq!(reg.lookup(&id("bob")), Some(s2));
    }

    #[test]
    fn trennen_unbekannter_sitzung_ist_noop() {
        let mut reg = IdentityRegistry::neu();
        reg.register(id("alice"), SessionId::new());

        assert_eq!(reg.unregister_by_session(SessionId::new()), None);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn trennen_entfernt_nur_ersten_treffer() {
        let mut reg = IdentityRegistry::neu();
        let s1 = SessionId::new();

        reg.register(id("alice"), s1);
        reg.register(id("alias"), s1);

        assert_eq!(reg.unregister_by_session(s1), Some(id("alice")));
        assert_eq!(reg.lookup(&id("alias")), Some(s1));

        assert_eq!(reg.unregister_by_session(s1), Some(id("alias")));
        assert!(reg.is_empty());
    }

    #[test]
    fn ueberschreiben_behaelt_einfuege_position() {
        let mut reg = IdentityRegistry::neu();
        let s0 = SessionId::new();
        let s1 = SessionId::new();

        // "a" wird zuerst eingefuegt, zeigt aber erst spaeter auf s1
        reg.register(id("a"), s0);
        reg.register(id("b"), s1);
        reg.register(id("a"), s1);

        assert_eq!(reg.identitaeten_von(s1), vec![id("a"), id("b")]);
        assert_eq!(reg.unregister_by_session(s1), Some(id("a")));
        assert_eq!(reg.lookup(&id("b")), Some(s1));
    }

    #[test]
    fn verdraengte_sitzung_trennen_loescht_neue_zuordnung_nicht() {
        let mut reg = IdentityRegistry::neu();
        let alt = SessionId::new();
        let neu = SessionId::new();

        reg.register(id("alice"), alt);
        reg.register(id("alice"), neu);

        assert_eq!(reg.unregister_by_session(alt), None);
        assert_eq!(reg.lookup(&id("alice")), Some(neu));
    }

    #[test]
    fn neu_einfuegen_nach_trennen_kommt_ans_ende() {
        let mut reg = IdentityRegistry::neu();
        let s1 = SessionId::new();

        reg.register(id("a"), s1);
        reg.register(id("b"), s1);
        reg.unregister_by_session(s1);
        reg.register(id("a"), s1);

        assert_eq!(reg.identitaeten_von(s1), vec![id("b"), id("a")]);
    }
}
