//! Message Protocol
//!
//! Defines the message types exchanged between the probe and the audio
//! backend. The wire format is JSON over WebSocket text frames, with an
//! internally tagged `type` field in kebab-case.

use serde::{Deserialize, Serialize};

/// Messages sent from the probe to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ControlMessage {
    /// Start or stop the server-side audio stream
    AudioControl { action: AudioAction },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioAction {
    Start,
    Stop,
}

/// Backend messages this probe understands
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// One chunk of streamed audio, base64 text. The backend may omit
    /// `data`; an absent payload is indistinguishable from an empty one.
    AudioStream {
        #[serde(default)]
        data: String,
    },

    /// Streaming state change, sent on subscribe and on start/stop
    AudioStatus {
        streaming: bool,
        #[serde(default)]
        error: Option<String>,
    },

    /// Reply to a protocol-level ping
    Pong,
}

/// An inbound message after parsing: either a shape this probe understands,
/// or any other tagged message, kept around by its `type` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    Known(ServerMessage),
    Unknown(String),
}

impl ControlMessage {
    /// Create the stream-start command
    pub fn start() -> Self {
        ControlMessage::AudioControl {
            action: AudioAction::Start,
        }
    }

    /// Create the stream-stop command
    pub fn stop() -> Self {
        ControlMessage::AudioControl {
            action: AudioAction::Stop,
        }
    }

    /// Serialize the message to JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl InboundMessage {
    /// Parse a text frame. Messages with a `type` the probe does not model
    /// (or a known `type` with an unexpected shape) come back as `Unknown`
    /// rather than failing, so the receive loop can keep going.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if let Ok(msg) = ServerMessage::deserialize(&value) {
            return Ok(InboundMessage::Known(msg));
        }
        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| {
                <serde_json::Error as serde::de::Error>::custom("message has no type field")
            })?;
        Ok(InboundMessage::Unknown(kind.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_message_serialization() {
        let json = ControlMessage::start().to_json().unwrap();
        assert_eq!(json, r#"{"type":"audio-control","action":"start"}"#);

        let json = ControlMessage::stop().to_json().unwrap();
        assert_eq!(json, r#"{"type":"audio-control","action":"stop"}"#);
    }

    #[test]
    fn test_audio_stream_deserialization() {
        let msg = InboundMessage::from_json(r#"{"type":"audio-stream","data":"UklGRg=="}"#);
        assert_eq!(
            msg.unwrap(),
            InboundMessage::Known(ServerMessage::AudioStream {
                data: "UklGRg==".to_string()
            })
        );
    }

    #[test]
    fn test_audio_stream_without_data_defaults_to_empty() {
        let msg = InboundMessage::from_json(r#"{"type":"audio-stream"}"#).unwrap();
        match msg {
            InboundMessage::Known(ServerMessage::AudioStream { data }) => {
                assert_eq!(data.len(), 0);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_audio_status_deserialization() {
        let msg = InboundMessage::from_json(r#"{"type":"audio-status","streaming":true}"#);
        assert_eq!(
            msg.unwrap(),
            InboundMessage::Known(ServerMessage::AudioStatus {
                streaming: true,
                error: None
            })
        );

        let msg =
            InboundMessage::from_json(r#"{"type":"audio-status","streaming":false,"error":"no source"}"#);
        assert_eq!(
            msg.unwrap(),
            InboundMessage::Known(ServerMessage::AudioStatus {
                streaming: false,
                error: Some("no source".to_string())
            })
        );
    }

    #[test]
    fn test_unknown_type_falls_back_to_type_string() {
        let msg = InboundMessage::from_json(r#"{"type":"heartbeat"}"#).unwrap();
        assert_eq!(msg, InboundMessage::Unknown("heartbeat".to_string()));
    }

    #[test]
    fn test_known_type_with_unexpected_shape_is_unknown() {
        // `data` must be a string; anything else is not a chunk we can measure
        let msg = InboundMessage::from_json(r#"{"type":"audio-stream","data":7}"#).unwrap();
        assert_eq!(msg, InboundMessage::Unknown("audio-stream".to_string()));
    }

    #[test]
    fn test_untyped_message_is_an_error() {
        assert!(InboundMessage::from_json(r#"{"data":"xx"}"#).is_err());
        assert!(InboundMessage::from_json("not json").is_err());
    }
}
