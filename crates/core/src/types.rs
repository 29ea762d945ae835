//! Gemeinsame Identifikationstypen fuer callrelay
//!
//! Alle IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! Sitzungs-Handles und frei gewaehlten Identitaeten zur Compilezeit
//! auszuschliessen.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opakes Handle auf eine lebende Transport-Verbindung
///
/// Der Router haelt nur diese ID, nie die Verbindung selbst. Die
/// Verbindung gehoert dem Transport-Adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Erstellt eine neue zufaellige SessionId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session:{}", self.0)
    }
}

/// Vom Client gewaehlte Identitaet (nicht authentifiziert)
///
/// Jeder Client darf jede Identitaet beanspruchen; der letzte `join`
/// gewinnt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identity {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Identity {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Teilnehmer des zuletzt initiierten Anrufs
///
/// Es gibt genau einen solchen Kontext fuer den gesamten Dienst; ein neuer
/// `call` ueberschreibt ihn vollstaendig.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// Anrufende Identitaet
    pub caller: Identity,
    /// Angerufene Identitaet
    pub callee: Identity,
}

impl CallContext {
    pub fn neu(caller: impl Into<Identity>, callee: impl Into<Identity>) -> Self {
        Self {
            caller: caller.into(),
            callee: callee.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_eindeutig() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b, "Zwei neue SessionIds muessen verschieden sein");
    }

    #[test]
    fn session_id_display() {
        let id = SessionId(Uuid::nil());
        assert!(id.to_string().starts_with("session:"));
    }

    #[test]
    fn identity_ist_transparent_serialisiert() {
        let id = Identity::from("alice");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"alice\"");
        let zurueck: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(zurueck, id);
    }

    #[test]
    fn call_context_aus_str() {
        let ctx = CallContext::neu("alice", "bob");
        assert_eq!(ctx.caller.as_str(), "alice");
        assert_eq!(ctx.callee.as_str(), "bob");
    }
}
