//! Batch status enumeration shared by job and step executions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a job or step execution
///
/// ```text
/// STARTING -> STARTED -> COMPLETED
///                     -> FAILED
///                     -> STOPPED
/// ```
///
/// `STARTING` may also go straight to `FAILED` when setup fails. Terminal
/// states never change again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    /// Created, not yet running
    #[default]
    Starting,
    /// Running
    Started,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
    /// Stopped on request between chunks
    Stopped,
}

impl BatchStatus {
    /// Whether this status is final
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BatchStatus::Completed | BatchStatus::Failed | BatchStatus::Stopped
        )
    }

    /// Whether an execution in a terminal state with this status may be restarted
    pub fn is_restartable(&self) -> bool {
        matches!(self, BatchStatus::Failed | BatchStatus::Stopped)
    }

    /// Whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: BatchStatus) -> bool {
        match self {
            BatchStatus::Starting => matches!(
                next,
                BatchStatus::Started | BatchStatus::Failed | BatchStatus::Stopped
            ),
            BatchStatus::Started => next.is_terminal(),
            BatchStatus::Completed | BatchStatus::Failed | BatchStatus::Stopped => false,
        }
    }

    /// Upper-case name as stored in the job repository
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Starting => "STARTING",
            BatchStatus::Started => "STARTED",
            BatchStatus::Completed => "COMPLETED",
            BatchStatus::Failed => "FAILED",
            BatchStatus::Stopped => "STOPPED",
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "STARTING" => Ok(BatchStatus::Starting),
            "STARTED" => Ok(BatchStatus::Started),
            "COMPLETED" => Ok(BatchStatus::Completed),
            "FAILED" => Ok(BatchStatus::Failed),
            "STOPPED" => Ok(BatchStatus::Stopped),
            other => Err(format!("Unknown batch status '{other}'")),
        }
    }
}
