//! callrelay-core – Gemeinsame Typen und Fehlertypen
//!
//! Dieses Crate stellt die fundamentalen Bausteine bereit, die von allen
//! anderen callrelay-Crates gemeinsam genutzt werden: Sitzungs-IDs,
//! Identitaeten, den Anruf-Kontext und den zentralen Fehler-Enum.

pub mod error;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{RelayError, Result};
pub use types::{CallContext, Identity, SessionId};
