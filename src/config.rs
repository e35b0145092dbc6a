use anyhow::Result;
use serde::Deserialize;

use crate::scenario::{CommandStimulus, RunnerConfig, Scenario, SpeakStimulus, StimulusSource};
use crate::supervisor::EngineConfig;

/// Harness configuration: engine command, runner timings, stimulus mode and
/// the scenario suite, all loaded from one config file.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub engine: EngineConfig,

    #[serde(default)]
    pub runner: RunnerConfig,

    #[serde(default)]
    pub stimulus: StimulusConfig,

    /// Benchmark scenario descriptors, run in order
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

/// How stimulus speech is generated.
#[derive(Debug, Clone, Deserialize)]
pub struct StimulusConfig {
    #[serde(default)]
    pub mode: StimulusMode,

    /// Synthesis command for `mode = "command"` (e.g. macOS `say`)
    #[serde(default = "default_stimulus_command")]
    pub command: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StimulusMode {
    /// Drive the engine's own `speak` command
    #[default]
    Speak,
    /// Run an external synthesis command per utterance
    Command,
}

fn default_stimulus_command() -> String {
    "say".to_owned()
}

impl Default for StimulusConfig {
    fn default() -> Self {
        Self {
            mode: StimulusMode::Speak,
            command: default_stimulus_command(),
        }
    }
}

impl StimulusConfig {
    /// Build the stimulus source this configuration describes.
    #[must_use]
    pub fn build(&self) -> Box<dyn StimulusSource> {
        match self.mode {
            StimulusMode::Speak => Box::new(SpeakStimulus),
            StimulusMode::Command => Box::new(CommandStimulus::new(self.command.clone())),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
