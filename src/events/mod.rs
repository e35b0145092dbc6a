//! Typed engine events and the shared event log.
//!
//! Every line an engine process writes is classified exactly once at the
//! reader boundary into a `TranscriptEvent` and appended to the `EventLog`.
//! Downstream code never re-parses protocol JSON; it queries the log.

mod event;
mod log;

pub use event::{EventKind, StreamSource, TranscriptEvent};
pub use log::EventLog;
