use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::Scenario;
use crate::error::HarnessError;
use crate::events::EventKind;
use crate::supervisor::{EngineCommand, EngineProcess};

/// A caller-supplied speech generator.
///
/// The runner treats stimulus playback as an opaque timed phase: `play`
/// returns when the stimulus has finished producing audio. Implementations
/// may drive the engine's own TTS, shell out to a synthesis command, or
/// script a sequence of utterances and pauses.
#[async_trait::async_trait]
pub trait StimulusSource: Send + Sync {
    async fn play(&self, engine: &EngineProcess, scenario: &Scenario) -> Result<()>;
}

/// Stimulus that drives the engine's own `speak` command.
///
/// Sends `speak` and waits for the engine's `speech_ended` event, bounded by
/// twice the estimated utterance duration plus a fixed margin. A missing
/// `speech_ended` is logged and tolerated; the settle phase still follows.
pub struct SpeakStimulus;

#[async_trait::async_trait]
impl StimulusSource for SpeakStimulus {
    async fn play(&self, engine: &EngineProcess, scenario: &Scenario) -> Result<()> {
        let sent_at = engine
            .send(&EngineCommand::Speak {
                text: scenario.stimulus_text.clone(),
                rate: scenario.speech_rate,
            })
            .await?;

        let budget = scenario.estimated_speech_duration() * 2 + Duration::from_secs(5);
        if engine
            .wait_for_event_since(EventKind::SpeechEnded, sent_at, budget)
            .await
            .is_none()
        {
            warn!(
                scenario = %scenario.name,
                "no speech_ended event within {:.1}s",
                budget.as_secs_f64()
            );
        }
        Ok(())
    }
}

/// Stimulus that runs an external synthesis command to completion.
///
/// Invoked as `<program> -r <rate> <text>`, matching the macOS `say`
/// interface. A missing program surfaces as `EngineUnavailable` so the
/// caller can skip this engine's scenarios rather than abort the run.
pub struct CommandStimulus {
    program: String,
}

impl CommandStimulus {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, text: &str, rate: u32) -> Result<()> {
        let status = tokio::process::Command::new(&self.program)
            .arg("-r")
            .arg(rate.to_string())
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    anyhow::Error::new(HarnessError::EngineUnavailable(format!(
                        "synthesis command `{}` not found on PATH",
                        self.program
                    )))
                } else {
                    anyhow::Error::new(e).context(format!("failed to run `{}`", self.program))
                }
            })?;

        if !status.success() {
            anyhow::bail!("synthesis command `{}` exited with {status}", self.program);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl StimulusSource for CommandStimulus {
    async fn play(&self, _engine: &EngineProcess, scenario: &Scenario) -> Result<()> {
        debug!(scenario = %scenario.name, "speaking via `{}`", self.program);
        self.run(&scenario.stimulus_text, scenario.speech_rate).await
    }
}

/// One step of a scripted stimulus.
#[derive(Debug, Clone)]
pub enum StimulusStep {
    /// Speak text through the external synthesis command, blocking until done
    Say { text: String, rate: u32 },
    /// Scripted silence (mid-sentence pause, hesitation gap)
    Pause { seconds: f64 },
    /// Start the engine's own TTS, for interruption scenarios
    StartEngineTts { text: String, rate: u32 },
    /// Stop the engine's TTS
    StopEngineTts,
}

/// Stimulus composed of an ordered step list.
///
/// Expresses pauses, false starts, and speaking over the engine's TTS as
/// data, so the same runner covers turn-detection edge cases without
/// per-scenario code.
pub struct ScriptedStimulus {
    speaker: CommandStimulus,
    steps: Vec<StimulusStep>,
}

impl ScriptedStimulus {
    #[must_use]
    pub fn new(program: impl Into<String>, steps: Vec<StimulusStep>) -> Self {
        Self {
            speaker: CommandStimulus::new(program),
            steps,
        }
    }
}

#[async_trait::async_trait]
impl StimulusSource for ScriptedStimulus {
    async fn play(&self, engine: &EngineProcess, _scenario: &Scenario) -> Result<()> {
        for step in &self.steps {
            match step {
                StimulusStep::Say { text, rate } => {
                    self.speaker.run(text, *rate).await?;
                }
                StimulusStep::Pause { seconds } => {
                    tokio::time::sleep(Duration::from_secs_f64(seconds.max(0.0))).await;
                }
                StimulusStep::StartEngineTts { text, rate } => {
                    engine
                        .send(&EngineCommand::Speak {
                            text: text.clone(),
                            rate: *rate,
                        })
                        .await
                        .context("failed to start engine TTS")?;
                }
                StimulusStep::StopEngineTts => {
                    engine
                        .send(&EngineCommand::StopSpeaking)
                        .await
                        .context("failed to stop engine TTS")?;
                }
            }
        }
        Ok(())
    }
}
