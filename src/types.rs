use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Opaque identifier of an accepted goal.
///
/// Ids are handed out by the server in increasing order and are never
/// reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GoalId(u64);

impl GoalId {
    pub fn new(raw: u64) -> Self {
        GoalId(raw)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "goal-{}", self.0)
    }
}

/// Lifecycle of a single goal.
///
/// ```text
/// Pending -> Executing -> Succeeded
///                      -> Cancelled
///                      -> Failed
/// ```
///
/// `Cancelled` and `Failed` may also be reached straight from `Pending`
/// (cancelled before the executor picked it up, or failed to start).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalStatus {
    Pending,
    Executing,
    Succeeded,
    Cancelled,
    Failed,
}

impl GoalStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            GoalStatus::Succeeded | GoalStatus::Cancelled | GoalStatus::Failed
        )
    }

    pub fn can_transition_to(self, next: GoalStatus) -> bool {
        matches!(
            (self, next),
            (GoalStatus::Pending, GoalStatus::Executing)
                | (GoalStatus::Pending, GoalStatus::Cancelled)
                | (GoalStatus::Pending, GoalStatus::Failed)
                | (GoalStatus::Executing, GoalStatus::Succeeded)
                | (GoalStatus::Executing, GoalStatus::Cancelled)
                | (GoalStatus::Executing, GoalStatus::Failed)
        )
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GoalStatus::Pending => "pending",
            GoalStatus::Executing => "executing",
            GoalStatus::Succeeded => "succeeded",
            GoalStatus::Cancelled => "cancelled",
            GoalStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Answer to an admission or cancel request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalResponse {
    Accept,
    Reject,
}

/// Terminal result of a goal: status plus whatever prefix was computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalOutcome {
    pub status: GoalStatus,
    pub sequence: Vec<u64>,
    /// Human-readable failure reason, only set for `Failed`.
    pub error: Option<String>,
}

impl GoalOutcome {
    pub fn succeeded(sequence: Vec<u64>) -> Self {
        Self {
            status: GoalStatus::Succeeded,
            sequence,
            error: None,
        }
    }

    pub fn cancelled(sequence: Vec<u64>) -> Self {
        Self {
            status: GoalStatus::Cancelled,
            sequence,
            error: None,
        }
    }

    pub fn failed(sequence: Vec<u64>, error: impl Into<String>) -> Self {
        Self {
            status: GoalStatus::Failed,
            sequence,
            error: Some(error.into()),
        }
    }
}

/// Incremental progress update published after every step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub goal_id: GoalId,
    pub sequence: Vec<u64>,
}

/// How the server treats a new goal while another one is active.
///
/// - `Preempt`: only one goal may be active; admitting a new one cancels the
///   current holder (default).
/// - `Parallel`: every goal is accepted and runs on its own, nothing is
///   cancelled on admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AdmissionPolicy {
    #[default]
    Preempt,
    Parallel,
}

impl FromStr for AdmissionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "preempt" => Ok(AdmissionPolicy::Preempt),
            "parallel" => Ok(AdmissionPolicy::Parallel),
            other => Err(format!(
                "invalid admission policy: {other} (expected \"preempt\" or \"parallel\")"
            )),
        }
    }
}

/// Log level as accepted in the `[logging]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}
