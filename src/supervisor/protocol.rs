use serde::Deserialize;
use serde_json::{json, Value};

use crate::events::{EventKind, StreamSource, TranscriptEvent};

/// Commands the harness sends to an engine process.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    StartListening,
    StopListening,
    ResetRecognition,
    Speak { text: String, rate: u32 },
    StopSpeaking,
}

impl EngineCommand {
    /// Wire `type` discriminator.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StartListening => "start_listening",
            Self::StopListening => "stop_listening",
            Self::ResetRecognition => "reset_recognition",
            Self::Speak { .. } => "speak",
            Self::StopSpeaking => "stop_speaking",
        }
    }

    /// Wire `data` payload, if the command carries one.
    #[must_use]
    pub fn payload(&self) -> Option<Value> {
        match self {
            Self::Speak { text, rate } => Some(json!({ "text": text, "rate": rate })),
            _ => None,
        }
    }
}

/// Serialize a command as one `{"type":..,"data":..}` JSON line (no newline).
pub(crate) fn encode_command(kind: &str, payload: Option<Value>) -> serde_json::Result<String> {
    let mut message = serde_json::Map::new();
    message.insert("type".to_owned(), Value::String(kind.to_owned()));
    if let Some(data) = payload {
        message.insert("data".to_owned(), data);
    }
    serde_json::to_string(&Value::Object(message))
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    #[serde(rename = "type")]
    kind: String,
    data: Option<WireData>,
}

#[derive(Debug, Default, Deserialize)]
struct WireData {
    #[serde(default)]
    text: String,
    #[serde(rename = "isFinal", default)]
    is_final: bool,
    #[serde(rename = "isSpeaking", default)]
    is_speaking: bool,
    #[serde(rename = "audioStartTime")]
    audio_start: Option<f64>,
    #[serde(rename = "audioEndTime")]
    audio_end: Option<f64>,
}

/// Classify one structured-stream line into a `TranscriptEvent`.
///
/// Lines that fail to parse, and JSON with a `type` outside the protocol,
/// are retained as `Unrecognized` events carrying the raw line.
pub(crate) fn classify_line(line: &str, source: StreamSource) -> TranscriptEvent {
    let Ok(message) = serde_json::from_str::<WireMessage>(line) else {
        return TranscriptEvent::unrecognized(line, source);
    };

    match EventKind::from_wire(&message.kind) {
        EventKind::TranscriptionUpdate => {
            let data = message.data.unwrap_or_default();
            // Engines report a negative audio end time when no audio range
            // is attached to the update.
            let audio_span = match (data.audio_start, data.audio_end) {
                (Some(start), Some(end)) if end > 0.0 => Some((start, end)),
                _ => None,
            };
            TranscriptEvent {
                timestamp: std::time::Instant::now(),
                kind: EventKind::TranscriptionUpdate,
                text: data.text,
                is_final: data.is_final,
                is_speaking: data.is_speaking,
                audio_span,
                source,
            }
        }
        EventKind::Unrecognized => TranscriptEvent::unrecognized(line, source),
        kind => TranscriptEvent::marker(kind, source),
    }
}
