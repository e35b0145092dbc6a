pub mod audio;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod metrics;
pub mod scenario;
pub mod streaming;
pub mod supervisor;

pub use audio::AudioBuffer;
pub use config::{Config, StimulusConfig, StimulusMode};
pub use error::{HarnessError, HarnessResult};
pub use events::{EventKind, EventLog, StreamSource, TranscriptEvent};
pub use metrics::{word_accuracy, word_error_rate};
pub use scenario::{
    detect_bleed, BenchSession, CommandStimulus, ResetPolicy, RunnerConfig, Scenario,
    ScenarioPhase, ScenarioResult, ScenarioRunner, ScriptedStimulus, SpeakStimulus,
    StimulusSource, StimulusStep,
};
pub use streaming::{ChunkFeeder, FeedOutcome, FeederConfig, StreamingDecoder, StreamingPartial};
pub use supervisor::{EngineCommand, EngineConfig, EngineProcess};
