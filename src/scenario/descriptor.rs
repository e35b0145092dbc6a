use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One benchmark scenario descriptor.
///
/// Scenarios are data, enumerated per suite in the config file and passed
/// into the runner; the same descriptors run against every engine so results
/// stay comparable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario label used in results (e.g. "Counting 1-10")
    pub name: String,

    /// Text the stimulus speaks, and the scoring reference
    pub stimulus_text: String,

    /// Speech rate in words per minute
    #[serde(default = "default_speech_rate")]
    pub speech_rate: u32,

    /// Delay before speech begins, seconds
    #[serde(default = "default_pre_delay_secs")]
    pub pre_delay_secs: f64,

    /// Settle wait after speech ends, seconds
    #[serde(default = "default_post_wait_secs")]
    pub post_wait_secs: f64,
}

fn default_speech_rate() -> u32 {
    140
}

fn default_pre_delay_secs() -> f64 {
    0.5
}

fn default_post_wait_secs() -> f64 {
    3.0
}

impl Scenario {
    #[must_use]
    pub fn new(name: impl Into<String>, stimulus_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stimulus_text: stimulus_text.into(),
            speech_rate: default_speech_rate(),
            pre_delay_secs: default_pre_delay_secs(),
            post_wait_secs: default_post_wait_secs(),
        }
    }

    #[must_use]
    pub fn pre_delay(&self) -> Duration {
        Duration::from_secs_f64(self.pre_delay_secs.max(0.0))
    }

    #[must_use]
    pub fn post_wait(&self) -> Duration {
        Duration::from_secs_f64(self.post_wait_secs.max(0.0))
    }

    /// Rough duration of the spoken stimulus at the configured rate.
    ///
    /// Used to budget waits for speech-end events; not a measurement.
    #[must_use]
    pub fn estimated_speech_duration(&self) -> Duration {
        let words = self.stimulus_text.split_whitespace().count().max(1);
        let rate = self.speech_rate.max(1);
        Duration::from_secs_f64(words as f64 * 60.0 / rate as f64)
    }
}
