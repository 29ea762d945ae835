//! callrelay-protocol – Event-Schema des Signalisierungsprotokolls
//!
//! Dieses Crate definiert alle Events die zwischen Client und Relay
//! ausgetauscht werden, sowie den JSON-Umschlag in dem sie reisen.
//!
//! ## Umschlag
//! ```json
//! {"event": "call", "data": {"from": "alice", "to": "bob"}}
//! ```

pub mod events;

pub use events::{
    CallAcceptedPayload, CallReceivedPayload, CallRequest, EventFrame, InboundEvent,
    JoinRequest, NoticePayload, OutboundEvent,
};
