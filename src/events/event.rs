use std::time::Instant;

/// Which engine output stream produced an event.
///
/// The structured stream carries protocol JSON; the diagnostic stream carries
/// free-form log text. Events are ordered within a stream but the two streams
/// are not mutually ordered, so consumers must not correlate a structured
/// event with a diagnostic line by adjacency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamSource {
    Structured,
    Diagnostic,
}

/// Closed set of event types the harness understands.
///
/// Anything else, including lines that fail to parse as JSON, is retained as
/// `Unrecognized` rather than discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Ready,
    TranscriptionUpdate,
    SpeechStarted,
    SpeechEnded,
    Unrecognized,
}

impl EventKind {
    /// Map a wire `type` discriminator to an event kind.
    #[must_use]
    pub fn from_wire(kind: &str) -> Self {
        match kind {
            "ready" => Self::Ready,
            "transcription_update" => Self::TranscriptionUpdate,
            "speech_started" => Self::SpeechStarted,
            "speech_ended" => Self::SpeechEnded,
            _ => Self::Unrecognized,
        }
    }
}

/// One event received from a running engine process.
///
/// Immutable once recorded. `timestamp` is the arrival instant of the source
/// line; for `TranscriptionUpdate` events the remaining fields carry the
/// update payload, otherwise `text` holds the raw line (for `Unrecognized`)
/// or is empty.
#[derive(Debug, Clone)]
pub struct TranscriptEvent {
    /// Arrival instant of the source line
    pub timestamp: Instant,

    /// Event classification
    pub kind: EventKind,

    /// Transcribed text, or the raw line for unrecognized input
    pub text: String,

    /// Whether the engine will not revise this text further
    pub is_final: bool,

    /// Whether the engine's own TTS was active when this text was heard
    pub is_speaking: bool,

    /// Start/end offsets into the engine's audio timeline, seconds
    pub audio_span: Option<(f64, f64)>,

    /// Stream the event arrived on
    pub source: StreamSource,
}

impl TranscriptEvent {
    /// An event with no transcription payload (ready, speech markers).
    #[must_use]
    pub fn marker(kind: EventKind, source: StreamSource) -> Self {
        Self {
            timestamp: Instant::now(),
            kind,
            text: String::new(),
            is_final: false,
            is_speaking: false,
            audio_span: None,
            source,
        }
    }

    /// A raw line that could not be classified as protocol JSON.
    #[must_use]
    pub fn unrecognized(line: impl Into<String>, source: StreamSource) -> Self {
        Self {
            timestamp: Instant::now(),
            kind: EventKind::Unrecognized,
            text: line.into(),
            is_final: false,
            is_speaking: false,
            audio_span: None,
            source,
        }
    }
}
