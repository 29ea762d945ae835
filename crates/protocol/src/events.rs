//! Signalisierungs-Events
//!
//! Definiert alle eingehenden und ausgehenden Events des Relays.
//!
//! ## Design
//! - Jeder WebSocket-Text-Frame traegt genau einen `EventFrame`
//! - Eingehende Events werden an der Grenze validiert: unbekannte Namen
//!   und fehlende Pflichtfelder verwerfen das Event, nie die Verbindung
//! - `offer`, `answer` und `ice-candidate` sind opake Blobs und werden
//!   unveraendert durchgereicht

use callrelay_core::{CallContext, Identity, RelayError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Event-Namen
// ---------------------------------------------------------------------------

pub const JOIN: &str = "join";
pub const CALL: &str = "call";
pub const ACCEPT_CALL: &str = "accept-call";
pub const REJECT_CALL: &str = "reject-call";
pub const OFFER: &str = "offer";
pub const ANSWER: &str = "answer";
pub const ICE_CANDIDATE: &str = "ice-candidate";

pub const CALL_RECEIVED: &str = "call-received";
pub const USER_UNAVAILABLE: &str = "user-unavailable";
pub const CALL_ACCEPTED: &str = "call-accepted";
pub const CALL_REJECTED: &str = "call-rejected";

/// Feste Hinweistexte der ausgehenden Events
pub const TEXT_NICHT_ONLINE: &str = "User is not online";
pub const TEXT_ANGENOMMEN: &str = "Call accepted";
pub const TEXT_ABGELEHNT: &str = "Call rejected";

// ---------------------------------------------------------------------------
// Umschlag
// ---------------------------------------------------------------------------

/// JSON-Umschlag fuer ein einzelnes Event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFrame {
    /// Event-Name, z.B. `call` oder `ice-candidate`
    pub event: String,
    /// Nutzlast (fehlt = `null`)
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl EventFrame {
    pub fn neu(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Serialisiert den Umschlag als JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserialisiert einen Umschlag aus JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| RelayError::UngueltigeNachricht(format!("kein Event-Umschlag: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Eingehende Events
// ---------------------------------------------------------------------------

/// `join` – Identitaet fuer die sendende Sitzung beanspruchen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub username: Identity,
}

/// `call` – Anruf von `from` an `to` starten
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    pub from: Identity,
    pub to: Identity,
}

/// Alle Events die ein Client an das Relay senden kann
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Join(JoinRequest),
    Call(CallRequest),
    AcceptCall,
    RejectCall,
    Offer(Value),
    Answer(Value),
    IceCandidate(Value),
}

impl InboundEvent {
    /// Event-Name auf dem Draht
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join(_) => JOIN,
            Self::Call(_) => CALL,
            Self::AcceptCall => ACCEPT_CALL,
            Self::RejectCall => REJECT_CALL,
            Self::Offer(_) => OFFER,
            Self::Answer(_) => ANSWER,
            Self::IceCandidate(_) => ICE_CANDIDATE,
        }
    }

    /// Validiert einen Umschlag und erzeugt das typisierte Event
    pub fn from_frame(frame: EventFrame) -> Result<Self> {
        let EventFrame { event, data } = frame;
        match event.as_str() {
            JOIN => Ok(Self::Join(JoinRequest {
                username: pflichtfeld(&data, JOIN, "username")?,
            })),
            CALL => Ok(Self::Call(CallRequest {
                from: pflichtfeld(&data, CALL, "from")?,
                to: pflichtfeld(&data, CALL, "to")?,
            })),
            // Nutzlast wird ignoriert
            ACCEPT_CALL => Ok(Self::AcceptCall),
            REJECT_CALL => Ok(Self::RejectCall),
            OFFER => Ok(Self::Offer(blob(data, OFFER)?)),
            ANSWER => Ok(Self::Answer(blob(data, ANSWER)?)),
            ICE_CANDIDATE => Ok(Self::IceCandidate(blob(data, ICE_CANDIDATE)?)),
            _ => Err(RelayError::UnbekanntesEvent(event)),
        }
    }

    /// Dekodiert ein Event direkt aus einem Text-Frame
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_frame(EventFrame::from_json(json)?)
    }

    /// Baut den Umschlag (clientseitig, z.B. fuer Tests und Werkzeuge)
    pub fn to_frame(&self) -> EventFrame {
        let data = match self {
            Self::Join(req) => serde_json::json!({ "username": req.username }),
            Self::Call(req) => serde_json::json!({ "from": req.from, "to": req.to }),
            Self::AcceptCall | Self::RejectCall => serde_json::json!({}),
            Self::Offer(v) | Self::Answer(v) | Self::IceCandidate(v) => v.clone(),
        };
        EventFrame::neu(self.name(), data)
    }
}

fn pflichtfeld(data: &Value, event: &'static str, feld: &'static str) -> Result<Identity> {
    data.get(feld)
        .and_then(Value::as_str)
        .map(Identity::from)
        .ok_or(RelayError::FeldFehlt { event, feld })
}

fn blob(data: Value, event: &'static str) -> Result<Value> {
    if data.is_null() {
        return Err(RelayError::FeldFehlt { event, feld: "data" });
    }
    Ok(data)
}

// ---------------------------------------------------------------------------
// Ausgehende Events
// ---------------------------------------------------------------------------

/// Nutzlast von `call-received`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallReceivedPayload {
    pub from: Identity,
    pub to: Identity,
}

/// Nutzlast von `user-unavailable` und `call-rejected`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticePayload {
    pub message: String,
}

/// Nutzlast von `call-accepted`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallAcceptedPayload {
    pub message: String,
    pub to: Identity,
    pub from: Identity,
}

/// Alle Events die das Relay an genau eine Sitzung sendet
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    CallReceived(CallReceivedPayload),
    UserUnavailable(NoticePayload),
    CallAccepted(CallAcceptedPayload),
    CallRejected(NoticePayload),
    Offer(Value),
    Answer(Value),
    IceCandidate(Value),
}

impl OutboundEvent {
    /// `call-received` an den Angerufenen
    pub fn call_received(ctx: &CallContext) -> Self {
        Self::CallReceived(CallReceivedPayload {
            from: ctx.caller.clone(),
            to: ctx.callee.clone(),
        })
    }

    /// `user-unavailable` an den Anrufer
    pub fn user_unavailable() -> Self {
        Self::UserUnavailable(NoticePayload {
            message: TEXT_NICHT_ONLINE.to_string(),
        })
    }

    /// `call-accepted` an den Anrufer
    pub fn call_accepted(ctx: &CallContext) -> Self {
        Self::CallAccepted(CallAcceptedPayload {
            message: TEXT_ANGENOMMEN.to_string(),
            to: ctx.callee.clone(),
            from: ctx.caller.clone(),
        })
    }

    /// `call-rejected` an den Anrufer
    pub fn call_rejected() -> Self {
        Self::CallRejected(NoticePayload {
            message: TEXT_ABGELEHNT.to_string(),
        })
    }

    /// Event-Name auf dem Draht
    pub fn name(&self) -> &'static str {
        match self {
            Self::CallReceived(_) => CALL_RECEIVED,
            Self::UserUnavailable(_) => USER_UNAVAILABLE,
            Self::CallAccepted(_) => CALL_ACCEPTED,
            Self::CallRejected(_) => CALL_REJECTED,
            Self::Offer(_) => OFFER,
            Self::Answer(_) => ANSWER,
            Self::IceCandidate(_) => ICE_CANDIDATE,
        }
    }

    /// Baut den Umschlag fuer den Versand
    pub fn to_frame(&self) -> serde_json::Result<EventFrame> {
        let data = match self {
            Self::CallReceived(p) => serde_json::to_value(p)?,
            Self::UserUnavailable(p) | Self::CallRejected(p) => serde_json::to_value(p)?,
            Self::CallAccepted(p) => serde_json::to_value(p)?,
            Self::Offer(v) | Self::Answer(v) | Self::IceCandidate(v) => v.clone(),
        };
        Ok(EventFrame::neu(self.name(), data))
    }

    /// Serialisiert das Event als Text-Frame
    pub fn to_json(&self) -> serde_json::Result<String> {
        self.to_frame()?.to_json()
    }

    /// Dekodiert ein ausgehendes Event (clientseitig)
    pub fn from_frame(frame: EventFrame) -> Result<Self> {
        let EventFrame { event, data } = frame;
        match event.as_str() {
            CALL_RECEIVED => Ok(Self::CallReceived(serde_json::from_value(data)?)),
            USER_UNAVAILABLE => Ok(Self::UserUnavailable(serde_json::from_value(data)?)),
            CALL_ACCEPTED => Ok(Self::CallAccepted(serde_json::from_value(data)?)),
            CALL_REJECTED => Ok(Self::CallRejected(serde_json::from_value(data)?)),
            OFFER => Ok(Self::Offer(data)),
            ANSWER => Ok(Self::Answer(data)),
            ICE_CANDIDATE => Ok(Self::IceCandidate(data)),
            _ => Err(RelayError::UnbekanntesEvent(event)),
        }
    }

    /// Dekodiert ein ausgehendes Event aus einem Text-Frame
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_frame(EventFrame::from_json(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn join_dekodieren() {
        let ev = InboundEvent::from_json(r#"{"event":"join","data":{"username":"alice"}}"#)
            .unwrap();
        assert_eq!(
            ev,
            InboundEvent::Join(JoinRequest {
                username: Identity::from("alice")
            })
        );
    }

    #[test]
    fn call_ohne_to_wird_abgelehnt() {
        let err = InboundEvent::from_json(r#"{"event":"call","data":{"from":"alice"}}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            RelayError::FeldFehlt {
                event: "call",
                feld: "to"
            }
        ));
    }

    #[test]
    fn join_mit_zahl_als_name_wird_abgelehnt() {
        let err = InboundEvent::from_json(r#"{"event":"join","data":{"username":42}}"#)
            .unwrap_err();
        assert!(matches!(err, RelayError::FeldFehlt { event: "join", .. }));
    }

    #[test]
    fn accept_call_ignoriert_nutzlast() {
        let ohne = InboundEvent::from_json(r#"{"event":"accept-call"}"#).unwrap();
        let mit = InboundEvent::from_json(r#"{"event":"accept-call","data":{"x":1}}"#).unwrap();
        assert_eq!(ohne, InboundEvent::AcceptCall);
        assert_eq!(mit, InboundEvent::AcceptCall);
    }

    #[test]
    fn offer_ohne_nutzlast_wird_abgelehnt() {
        let err = InboundEvent::from_json(r#"{"event":"offer"}"#).unwrap_err();
        assert!(matches!(err, RelayError::FeldFehlt { event: "offer", .. }));
    }

    #[test]
    fn unbekanntes_event() {
        let err = InboundEvent::from_json(r#"{"event":"hangup","data":{}}"#).unwrap_err();
        match err {
            RelayError::UnbekanntesEvent(name) => assert_eq!(name, "hangup"),
            andere => panic!("Erwartet UnbekanntesEvent, erhalten: {andere}"),
        }
    }

    #[test]
    fn kein_json() {
        let err = InboundEvent::from_json("hallo").unwrap_err();
        assert!(matches!(err, RelayError::UngueltigeNachricht(_)));
        assert!(err.betrifft_nur_event());
    }

    #[test]
    fn offer_blob_bleibt_unveraendert() {
        let sdp = json!({"type": "offer", "sdp": "v=0\r\n", "extra": [1, 2, {"a": null}]});
        let ev = InboundEvent::from_frame(EventFrame::neu(OFFER, sdp.clone())).unwrap();
        let InboundEvent::Offer(blob) = ev else {
            panic!("Erwartet Offer");
        };
        let raus = OutboundEvent::Offer(blob).to_frame().unwrap();
        assert_eq!(raus.event, "offer");
        assert_eq!(raus.data, sdp);
    }

    #[test]
    fn offer_text_bleibt_byte_gleich() {
        let rein = r#"{"event":"offer","data":{"type":"offer","sdp":"v=0\r\no=- 1 2 IN IP4 127.0.0.1\r\n","zzz":1,"aaa":{"b":2,"a":1}}}"#;
        let InboundEvent::Offer(blob) = InboundEvent::from_json(rein).unwrap() else {
            panic!("Erwartet Offer");
        };

        let raus = OutboundEvent::Offer(blob).to_json().unwrap();
        assert_eq!(raus, rein);
    }

    #[test]
    fn ice_kandidat_behaelt_feldreihenfolge() {
        let rein = r#"{"event":"ice-candidate","data":{"sdpMid":"0","candidate":"candidate:1 1 udp 2122260223 10.0.0.1 5000 typ host","sdpMLineIndex":0}}"#;
        let InboundEvent::IceCandidate(blob) = InboundEvent::from_json(rein).unwrap() else {
            panic!("Erwartet IceCandidate");
        };

        assert_eq!(OutboundEvent::IceCandidate(blob).to_json().unwrap(), rein);
    }

    #[test]
    fn call_accepted_feldreihenfolge() {
        let ctx = CallContext::neu("alice", "bob");
        let json = OutboundEvent::call_accepted(&ctx).to_json().unwrap();
        assert_eq!(
            json,
            r#"{"event":"call-accepted","data":{"message":"Call accepted","to":"bob","from":"alice"}}"#
        );
    }

    #[test]
    fn user_unavailable_text() {
        let json = OutboundEvent::user_unavailable().to_json().unwrap();
        assert_eq!(
            json,
            r#"{"event":"user-unavailable","data":{"message":"User is not online"}}"#
        );
    }

    #[test]
    fn ausgehend_zurueck_dekodieren() {
        let ctx = CallContext::neu("alice", "bob");
        let json = OutboundEvent::call_received(&ctx).to_json().unwrap();
        let ev = OutboundEvent::from_json(&json).unwrap();
        assert_eq!(
            ev,
            OutboundEvent::CallReceived(CallReceivedPayload {
                from: Identity::from("alice"),
                to: Identity::from("bob"),
            })
        );
    }

    #[test]
    fn eingehend_to_frame_ist_dekodierbar() {
        let ev = InboundEvent::Call(CallRequest {
            from: Identity::from("alice"),
            to: Identity::from("bob"),
        });
        let json = ev.to_frame().to_json().unwrap();
        assert_eq!(InboundEvent::from_json(&json).unwrap(), ev);
    }
}
