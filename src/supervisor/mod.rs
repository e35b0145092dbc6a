//! Engine process supervision.
//!
//! Manages the lifecycle of one long-lived engine subprocess speaking
//! line-delimited JSON: commands go in on stdin, events come out on stdout,
//! diagnostics on stderr. Two reader tasks classify every output line into
//! the shared `EventLog`.

mod process;
mod protocol;

pub use process::{EngineConfig, EngineProcess};
pub use protocol::EngineCommand;
