//! callrelay-signaling – Rendezvous und Event-Relay
//!
//! Dieser Crate implementiert den Signaling-Service fuer callrelay. Clients
//! melden sich unter einem Namen an, starten Anrufe und tauschen danach
//! Offer, Answer und ICE-Kandidaten aus. Der Server interpretiert die
//! Verhandlungsdaten nicht, er leitet sie nur an die Gegenseite weiter.
//!
//! ## Architektur
//!
//! ```text
//! HTTP/WebSocket Listener (SignalingServer)
//!     |
//!     v
//! ClientConnection (pro Verbindung ein Task)
//!     |
//!     v
//! MessageDispatcher
//!     |  RouterState (ein Mutex)
//!     |    +-- IdentityRegistry   (Name -> Sitzung)
//!     |    +-- CallContextStore   (letzter Anruf, prozessweit)
//!     |
//!     +-- SessionHandler      (join, disconnect)
//!     +-- CallHandler         (call, accept-call, reject-call)
//!     +-- NegotiationHandler  (offer, answer, ice-candidate)
//!
//! SessionBroadcaster – Send-Queue pro Sitzung
//! ```

pub mod broadcast;
pub mod call_context;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod server;
pub mod server_state;

// Bequeme Re-Exporte
pub use broadcast::{SessionBroadcaster, SessionTransport};
pub use call_context::CallContextStore;
pub use connection::ClientConnection;
pub use dispatcher::{DispatchOutcome, DropReason, MessageDispatcher};
pub use error::{SignalingError, SignalingResult};
pub use registry::IdentityRegistry;
pub use server::SignalingServer;
pub use server_state::{SignalingConfig, SignalingState};
