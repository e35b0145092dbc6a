use std::sync::Mutex;
use std::time::{Duration, Instant};

use tokio::sync::Notify;

use super::{EventKind, TranscriptEvent};

/// Append-only, arrival-ordered store of engine events.
///
/// Shared between the supervisor's two reader tasks (writers) and the
/// scenario runner (reader). Writers only append; readers only take
/// point-in-time snapshots, so visibility is monotonic: an event present in
/// one snapshot is present in every later snapshot until explicit pruning.
///
/// The notifier is signalled under the same append call, which lets
/// `wait_for` register a waiter, re-scan, and then sleep without a window in
/// which a matching append could be missed.
pub struct EventLog {
    events: Mutex<Vec<TranscriptEvent>>,
    notify: Notify,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            notify: Notify::new(),
        }
    }

    /// Append one event and wake all pending waiters.
    pub fn append(&self, event: TranscriptEvent) {
        {
            let mut events = self.events.lock().expect("event log poisoned");
            events.push(event);
        }
        self.notify.notify_waiters();
    }

    /// Snapshot of every recorded event, in arrival order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<TranscriptEvent> {
        self.events.lock().expect("event log poisoned").clone()
    }

    /// Snapshot of events whose timestamp is at or after `since`.
    #[must_use]
    pub fn snapshot_since(&self, since: Instant) -> Vec<TranscriptEvent> {
        self.events
            .lock()
            .expect("event log poisoned")
            .iter()
            .filter(|e| e.timestamp >= since)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().expect("event log poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop events older than `cutoff`.
    ///
    /// Housekeeping for session resets: a fresh measurement window does not
    /// need the previous scenario's events, and pruning keeps long suite runs
    /// bounded in memory.
    pub fn prune_before(&self, cutoff: Instant) {
        let mut events = self.events.lock().expect("event log poisoned");
        events.retain(|e| e.timestamp >= cutoff);
    }

    /// Earliest recorded event of `kind` at or after `since`.
    #[must_use]
    pub fn first_match(&self, kind: EventKind, since: Option<Instant>) -> Option<TranscriptEvent> {
        self.events
            .lock()
            .expect("event log poisoned")
            .iter()
            .find(|e| e.kind == kind && since.map_or(true, |s| e.timestamp >= s))
            .cloned()
    }

    /// Block until an event of `kind` is present, bounded by `timeout`.
    ///
    /// An already-recorded matching event returns immediately. Returns `None`
    /// on expiry; never raises. The register-scan-sleep loop guarantees an
    /// append between the scan and the sleep still wakes this waiter.
    pub async fn wait_for(&self, kind: EventKind, timeout: Duration) -> Option<TranscriptEvent> {
        self.wait_for_inner(kind, None, timeout).await
    }

    /// Like `wait_for`, restricted to events timestamped at or after `since`.
    ///
    /// Scoping the wait to a session window keeps a wait from matching a
    /// previous scenario's event of the same kind.
    pub async fn wait_for_since(
        &self,
        kind: EventKind,
        since: Instant,
        timeout: Duration,
    ) -> Option<TranscriptEvent> {
        self.wait_for_inner(kind, Some(since), timeout).await
    }

    async fn wait_for_inner(
        &self,
        kind: EventKind,
        since: Option<Instant>,
        timeout: Duration,
    ) -> Option<TranscriptEvent> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.notify.notified();
            if let Some(event) = self.first_match(kind, since) {
                return Some(event);
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return None;
            }
        }
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}
