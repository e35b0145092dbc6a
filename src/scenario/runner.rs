use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{BenchSession, Scenario, ScenarioResult, StimulusSource};
use crate::error::{HarnessError, HarnessResult};
use crate::events::EventKind;
use crate::supervisor::{EngineCommand, EngineProcess};

/// Phases of one scenario run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioPhase {
    Idle,
    SessionReset,
    SessionStarted,
    StimulusPlaying,
    Settling,
    Scored,
}

/// How the runner treats session state between scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPolicy {
    /// Stop and restart the listening session before every scenario, so each
    /// measures latency and accuracy in isolation. This is the default.
    ResetBetween,
    /// Keep the session running across scenarios. This is the explicit
    /// bleed-test mode: prior-turn text showing up in a later window is the
    /// signal under test, not an error.
    BackToBack,
}

/// Runner timing knobs, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Settle after `stop_listening` before reusing the pipeline
    #[serde(default = "default_stop_settle_secs")]
    pub stop_settle_secs: f64,

    /// Settle after `start_listening` for the audio engine to spin up
    #[serde(default = "default_start_settle_secs")]
    pub start_settle_secs: f64,

    /// Gap between back-to-back scenarios when no reset is issued
    #[serde(default = "default_clear_gap_secs")]
    pub clear_gap_secs: f64,

    /// Settle after `reset_recognition`
    #[serde(default = "default_reset_settle_secs")]
    pub reset_settle_secs: f64,
}

fn default_stop_settle_secs() -> f64 {
    1.0
}

fn default_start_settle_secs() -> f64 {
    2.0
}

fn default_clear_gap_secs() -> f64 {
    0.5
}

fn default_reset_settle_secs() -> f64 {
    2.0
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            stop_settle_secs: default_stop_settle_secs(),
            start_settle_secs: default_start_settle_secs(),
            clear_gap_secs: default_clear_gap_secs(),
            reset_settle_secs: default_reset_settle_secs(),
        }
    }
}

impl RunnerConfig {
    fn stop_settle(&self) -> Duration {
        Duration::from_secs_f64(self.stop_settle_secs.max(0.0))
    }

    fn start_settle(&self) -> Duration {
        Duration::from_secs_f64(self.start_settle_secs.max(0.0))
    }

    fn clear_gap(&self) -> Duration {
        Duration::from_secs_f64(self.clear_gap_secs.max(0.0))
    }

    fn reset_settle(&self) -> Duration {
        Duration::from_secs_f64(self.reset_settle_secs.max(0.0))
    }
}

/// Drives scenarios against a started engine and scores the results.
///
/// One runner per engine session. All waits are blocking sleeps or bounded
/// event waits on the calling context; only the supervisor's readers run
/// concurrently with it.
pub struct ScenarioRunner {
    engine: Arc<EngineProcess>,
    config: RunnerConfig,
    phase: ScenarioPhase,
    session: Option<BenchSession>,
    window_start: Option<Instant>,
    prior_stimulus: Option<String>,
}

impl ScenarioRunner {
    #[must_use]
    pub fn new(engine: Arc<EngineProcess>, config: RunnerConfig) -> Self {
        Self {
            engine,
            config,
            phase: ScenarioPhase::Idle,
            session: None,
            window_start: None,
            prior_stimulus: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> ScenarioPhase {
        self.phase
    }

    #[must_use]
    pub fn session(&self) -> Option<&BenchSession> {
        self.session.as_ref()
    }

    /// Stop and restart the listening session, marking a fresh measurement
    /// window.
    ///
    /// This boundary exists to keep text and events from a prior scenario
    /// out of the next one's window. Events that arrive after the stop are
    /// counted and logged as post-session bleed, then pruned.
    pub async fn reset_session(&mut self) -> HarnessResult<Instant> {
        self.phase = ScenarioPhase::SessionReset;

        if self.session.is_some() {
            let stop_sent = self.engine.send(&EngineCommand::StopListening).await?;
            if let Some(session) = self.session.as_mut() {
                session.close_at(stop_sent);
            }
            tokio::time::sleep(self.config.stop_settle()).await;

            let late_updates = self
                .engine
                .events_since(stop_sent)
                .iter()
                .filter(|e| e.kind == EventKind::TranscriptionUpdate)
                .count();
            if late_updates > 0 {
                debug!(count = late_updates, "post-session bleed: updates after stop");
            }
        }

        self.engine.event_log().prune_before(Instant::now());

        let start_sent = self.engine.send(&EngineCommand::StartListening).await?;
        let session = BenchSession::open(start_sent);
        debug!(session = %session.id, "listening session started");
        self.session = Some(session);
        self.window_start = Some(start_sent);

        tokio::time::sleep(self.config.start_settle()).await;
        self.phase = ScenarioPhase::SessionStarted;
        Ok(start_sent)
    }

    /// Send `reset_recognition` (the post-TTS recognizer reset) and advance
    /// the measurement window without restarting the session.
    pub async fn reset_recognition(&mut self) -> HarnessResult<Instant> {
        self.engine.send(&EngineCommand::ResetRecognition).await?;
        tokio::time::sleep(self.config.reset_settle()).await;
        let window = Instant::now();
        self.window_start = Some(window);
        Ok(window)
    }

    /// Run one scenario and score it.
    ///
    /// Opens a session first if none is active. A scenario that captures no
    /// events is failed-but-non-fatal: its result has absent timing fields
    /// and the caller may continue with the next scenario.
    pub async fn run_scenario(
        &mut self,
        scenario: &Scenario,
        stimulus: &dyn StimulusSource,
    ) -> HarnessResult<ScenarioResult> {
        let window_start = match self.window_start {
            Some(window) => window,
            None => self.reset_session().await?,
        };

        info!(scenario = %scenario.name, "running scenario");

        self.phase = ScenarioPhase::StimulusPlaying;
        if scenario.pre_delay_secs > 0.0 {
            tokio::time::sleep(scenario.pre_delay()).await;
        }

        // Canonical reference for every relative timing in the result.
        let speech_start = Instant::now();
        if let Err(err) = stimulus.play(self.engine.as_ref(), scenario).await {
            match err.downcast::<HarnessError>() {
                Ok(harness_err) if harness_err.is_skippable() => return Err(harness_err),
                Ok(harness_err) => {
                    warn!(scenario = %scenario.name, "stimulus failed: {harness_err}");
                }
                Err(other) => warn!(scenario = %scenario.name, "stimulus failed: {other:#}"),
            }
        }
        let speech_duration_seconds = speech_start.elapsed().as_secs_f64();

        self.phase = ScenarioPhase::Settling;
        tokio::time::sleep(scenario.post_wait()).await;

        self.phase = ScenarioPhase::Scored;
        let events = self.engine.events_since(window_start);
        let mut result =
            ScenarioResult::score(scenario, speech_start, speech_duration_seconds, &events);
        result.bleed_detected = self
            .prior_stimulus
            .as_deref()
            .map(|prior| detect_bleed(prior, &result.captured_text()));

        if result.failed() {
            warn!(
                scenario = %scenario.name,
                "no transcription updates within the settle window"
            );
        } else {
            info!(
                scenario = %scenario.name,
                updates = result.total_updates,
                finals = result.final_count,
                accuracy = ?result.word_accuracy,
                wer = ?result.wer,
                "scenario scored"
            );
        }

        self.prior_stimulus = Some(scenario.stimulus_text.clone());
        self.phase = ScenarioPhase::Idle;
        Ok(result)
    }

    /// Run a whole scenario suite under the given reset policy.
    ///
    /// Under `ResetBetween` every scenario gets a fresh session. Under
    /// `BackToBack` the session persists and only the measurement window
    /// advances between scenarios.
    pub async fn run_suite(
        &mut self,
        scenarios: &[Scenario],
        stimulus: &dyn StimulusSource,
        policy: ResetPolicy,
    ) -> HarnessResult<Vec<ScenarioResult>> {
        let mut results = Vec::with_capacity(scenarios.len());
        for (index, scenario) in scenarios.iter().enumerate() {
            if index == 0 || policy == ResetPolicy::ResetBetween {
                self.reset_session().await?;
            } else {
                tokio::time::sleep(self.config.clear_gap()).await;
                self.window_start = Some(Instant::now());
            }
            results.push(self.run_scenario(scenario, stimulus).await?);
        }
        Ok(results)
    }
}

/// Deterministic cross-turn bleed heuristic.
///
/// True when any normalized word of the prior scenario's stimulus vocabulary
/// appears, as a substring, in the lowercased captured text. Substring
/// containment (not word equality) is the original product decision and is
/// kept as-is for comparability.
#[must_use]
pub fn detect_bleed(prior_text: &str, captured: &str) -> bool {
    let haystack = captured.to_lowercase();
    if haystack.is_empty() {
        return false;
    }
    crate::metrics::normalize_words(prior_text)
        .iter()
        .any(|word| haystack.contains(word.as_str()))
}

#[cfg(test)]
mod tests {
    use super::detect_bleed;

    #[test]
    fn bleed_detects_prior_vocabulary() {
        assert!(detect_bleed("alpha bravo charlie", "i heard alpha clearly"));
    }

    #[test]
    fn bleed_clean_when_vocabularies_disjoint() {
        assert!(!detect_bleed("alpha bravo charlie", "delta echo foxtrot"));
    }

    #[test]
    fn bleed_false_for_empty_capture() {
        assert!(!detect_bleed("alpha bravo charlie", ""));
    }

    #[test]
    fn bleed_matches_substrings() {
        // Containment, not word equality: "art" bleeds into "start".
        assert!(detect_bleed("art", "please start now"));
    }
}
