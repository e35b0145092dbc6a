use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Scenario;
use crate::events::{EventKind, TranscriptEvent};
use crate::metrics::{word_accuracy, word_error_rate};

/// Scored outcome of one scenario run.
///
/// Computed once from a session snapshot. A scenario that captured zero
/// transcription updates still produces a record, with its timing and
/// accuracy fields absent, so every suite run yields one row per scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub stimulus_text: String,
    pub recorded_at: DateTime<Utc>,

    /// Measured wall-clock duration of the stimulus phase, seconds
    pub speech_duration_seconds: f64,

    /// Number of transcription updates captured in the window
    pub total_updates: usize,

    /// Count and ordered texts of `isFinal` updates
    pub final_count: usize,
    pub final_segments: Vec<String>,

    /// Text of the last update received
    pub last_text: String,

    /// First update timestamp relative to speech start, seconds
    pub first_update_latency_seconds: Option<f64>,

    /// Last update timestamp relative to speech start, seconds
    pub last_update_offset_seconds: Option<f64>,

    pub word_accuracy: Option<f64>,
    pub wer: Option<f64>,

    /// Whether prior-scenario vocabulary leaked into this window.
    /// `None` when there was no prior scenario to compare against.
    pub bleed_detected: Option<bool>,
}

impl ScenarioResult {
    /// Score a snapshot of session events against a scenario.
    ///
    /// Only `TranscriptionUpdate` events count; lifecycle markers and
    /// diagnostics in the same window are ignored. All relative timings use
    /// `speech_start` as the reference.
    #[must_use]
    pub fn score(
        scenario: &Scenario,
        speech_start: Instant,
        speech_duration_seconds: f64,
        events: &[TranscriptEvent],
    ) -> Self {
        let updates: Vec<&TranscriptEvent> = events
            .iter()
            .filter(|e| e.kind == EventKind::TranscriptionUpdate)
            .collect();

        let final_segments: Vec<String> = updates
            .iter()
            .filter(|e| e.is_final)
            .map(|e| e.text.clone())
            .collect();

        let last_text = updates.last().map(|e| e.text.clone()).unwrap_or_default();

        let offset = |event: &TranscriptEvent| {
            event
                .timestamp
                .checked_duration_since(speech_start)
                .map_or(0.0, |d| d.as_secs_f64())
        };
        let first_update_latency_seconds = updates.first().map(|e| offset(*e));
        let last_update_offset_seconds = updates.last().map(|e| offset(*e));

        let (accuracy, wer) = if updates.is_empty() {
            (None, None)
        } else {
            let captured = select_captured_text(&final_segments, &last_text);
            (
                Some(word_accuracy(&scenario.stimulus_text, &captured)),
                Some(word_error_rate(&scenario.stimulus_text, &captured)),
            )
        };

        Self {
            scenario_name: scenario.name.clone(),
            stimulus_text: scenario.stimulus_text.clone(),
            recorded_at: Utc::now(),
            speech_duration_seconds,
            total_updates: updates.len(),
            final_count: final_segments.len(),
            final_segments,
            last_text,
            first_update_latency_seconds,
            last_update_offset_seconds,
            word_accuracy: accuracy,
            wer,
            bleed_detected: None,
        }
    }

    /// The text this scenario was scored on: the concatenation of final
    /// segments, falling back to the latest non-final text when the engine
    /// never finalized. The fallback is a deliberate policy kept for
    /// comparability across engines.
    #[must_use]
    pub fn captured_text(&self) -> String {
        select_captured_text(&self.final_segments, &self.last_text)
    }

    /// Whether the engine produced nothing to score.
    #[must_use]
    pub fn failed(&self) -> bool {
        self.total_updates == 0
    }
}

fn select_captured_text(final_segments: &[String], last_text: &str) -> String {
    if final_segments.is_empty() {
        last_text.to_owned()
    } else {
        final_segments.join(" ")
    }
}
