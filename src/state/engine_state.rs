/// Lifecycle state definitions for one discovery run
use std::fmt;

/// Represents where a discovery run is in its lifecycle
///
/// `Idle → Running → {Completed, Exhausted, LimitReached}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    /// Engine built, seeds not yet enqueued
    Idle,

    /// Batches are being dispatched
    Running,

    // ===== Terminal States =====
    /// Stopped because batches stopped yielding new URLs
    Completed,

    /// Frontier ran dry
    Exhausted,

    /// Corpus reached the page limit
    LimitReached,
}

impl EngineState {
    /// Returns true if the run has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Exhausted | Self::LimitReached)
    }

    /// Returns true if moving to `next` is a legal transition
    pub fn can_transition_to(&self, next: EngineState) -> bool {
        match self {
            Self::Idle => next == Self::Running,
            Self::Running => next.is_terminal(),
            _ => false,
        }
    }

    /// Short lowercase label used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Exhausted => "exhausted",
            Self::LimitReached => "limit_reached",
        }
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
