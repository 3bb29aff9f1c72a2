use std::fmt;

use thiserror::Error;

use super::job::JobState;
use crate::dataproc::DataprocError;
use crate::storage::StorageError;

/// Failures of a single [`ChunkStream::read`](super::ChunkStream::read).
#[derive(Debug, Error)]
pub enum StreamError {
    /// The stream was already closed. Callers must check `is_open` first.
    #[error("I/O operation on closed stream")]
    Closed,

    /// An object reported fewer bytes than previously observed.
    #[error("object [{object}] shrunk from {previous} to {current} bytes")]
    Shrunk {
        object: String,
        previous: u64,
        current: u64,
    },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Why [`JobWaiter::wait`](super::JobWaiter::wait) gave up.
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("job [{job_id}] entered state [{actual}] while waiting for [{goal}]")]
    GoalNotReached {
        job_id: String,
        actual: JobState,
        goal: JobState,
    },

    #[error("job [{job_id}] timed out while in state [{}]", state_label(.state))]
    Timeout {
        job_id: String,
        state: Option<JobState>,
    },

    #[error("job [{0}] not found")]
    JobNotFound(String),

    #[error("cannot wait for [{0}]: not a terminal state")]
    InvalidGoal(JobState),

    /// A status poll failed in a way that retrying will not fix.
    #[error("status poll failed: {0}")]
    Status(DataprocError),

    #[error("driver output stream failed: {0}")]
    Stream(#[from] StreamError),
}

fn state_label(state: &Option<JobState>) -> &'static str {
    state.map_or("UNKNOWN", JobState::as_str)
}

/// Output anomalies that do not turn a reached goal into a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputWarning {
    /// Streaming was requested but no snapshot ever carried an output URI.
    NotFound,
    /// The job finished but the output stream never saw its end marker.
    Incomplete,
}

impl fmt::Display for OutputWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputWarning::NotFound => write!(f, "Expected job output not found."),
            OutputWarning::Incomplete => {
                write!(f, "Job terminated, but output did not finish streaming.")
            }
        }
    }
}
