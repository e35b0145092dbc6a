use thiserror::Error;

pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors that terminate a session or a whole run.
///
/// Parse failures and missed events are deliberately absent: unparsable
/// protocol lines are recorded as `Unrecognized` events, and expired event
/// waits return `None`, so aggregate reporting can proceed with one result
/// row per scenario.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to spawn engine `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("engine input pipe closed: {0}")]
    CommandWrite(#[source] std::io::Error),

    #[error("engine did not signal ready within {timeout_ms}ms")]
    StartupTimeout { timeout_ms: u64 },

    #[error("engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("json failure: {0}")]
    Json(#[from] serde_json::Error),
}

impl HarnessError {
    pub fn spawn(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            command: command.into(),
            source,
        }
    }

    /// Whether this error should only skip the affected engine's scenarios
    /// rather than abort the whole run.
    #[must_use]
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::EngineUnavailable(_))
    }
}
