use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::events::{EventLog, TranscriptEvent};

/// One "listening" lifetime of the engine.
///
/// A session is a view over the event log, not an owner of events: it selects
/// events whose timestamp falls in `[started_at, stopped_at)` (or everything
/// from `started_at` while still open). Created when `start_listening` is
/// sent, closed when the matching stop completes. Events arriving after close
/// are never attributed to it.
#[derive(Debug, Clone)]
pub struct BenchSession {
    /// Session identifier, unique per listening window
    pub id: String,

    /// Monotonic boundary: the instant the start command was sent
    pub started_at: Instant,

    /// Wall-clock start, for result records
    pub started_wall: DateTime<Utc>,

    /// Set when the matching stop command completes
    pub stopped_at: Option<Instant>,
}

impl BenchSession {
    /// Open a session at the instant a `start_listening` command was sent.
    #[must_use]
    pub fn open(started_at: Instant) -> Self {
        Self {
            id: format!("turn-{}", uuid::Uuid::new_v4()),
            started_at,
            started_wall: Utc::now(),
            stopped_at: None,
        }
    }

    /// Close the session at the instant its stop command was sent.
    pub fn close_at(&mut self, stopped_at: Instant) {
        self.stopped_at = Some(stopped_at);
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.stopped_at.is_none()
    }

    /// Whether `instant` falls inside this session's window.
    #[must_use]
    pub fn contains(&self, instant: Instant) -> bool {
        instant >= self.started_at && self.stopped_at.map_or(true, |stop| instant < stop)
    }

    /// Events attributed to this session, in arrival order.
    #[must_use]
    pub fn events(&self, log: &EventLog) -> Vec<TranscriptEvent> {
        log.snapshot_since(self.started_at)
            .into_iter()
            .filter(|e| self.contains(e.timestamp))
            .collect()
    }
}
