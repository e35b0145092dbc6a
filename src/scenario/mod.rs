//! Scenario execution.
//!
//! A scenario is one reproducible "turn": reset the session, play a timed
//! stimulus, wait for transcription to settle, then score the captured
//! events. Scenario descriptors are data; the runner is the single
//! implementation that executes them.

mod descriptor;
mod result;
mod runner;
mod session;
mod stimulus;

pub use descriptor::Scenario;
pub use result::ScenarioResult;
pub use runner::{detect_bleed, ResetPolicy, RunnerConfig, ScenarioPhase, ScenarioRunner};
pub use session::BenchSession;
pub use stimulus::{CommandStimulus, ScriptedStimulus, SpeakStimulus, StimulusSource, StimulusStep};
