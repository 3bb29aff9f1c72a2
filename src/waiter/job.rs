use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a Dataproc job, as reported by `status.state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Pending,
    SetupDone,
    Running,
    CancelPending,
    CancelStarted,
    Cancelled,
    Done,
    Error,
    AttemptFailure,
    #[serde(other)]
    StateUnspecified,
}

impl JobState {
    /// States from which the job never transitions again.
    pub const TERMINAL: [JobState; 3] = [JobState::Cancelled, JobState::Done, JobState::Error];

    pub fn is_terminal(self) -> bool {
        Self::TERMINAL.contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Pending => "PENDING",
            JobState::SetupDone => "SETUP_DONE",
            JobState::Running => "RUNNING",
            JobState::CancelPending => "CANCEL_PENDING",
            JobState::CancelStarted => "CANCEL_STARTED",
            JobState::Cancelled => "CANCELLED",
            JobState::Done => "DONE",
            JobState::Error => "ERROR",
            JobState::AttemptFailure => "ATTEMPT_FAILURE",
            JobState::StateUnspecified => "STATE_UNSPECIFIED",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase().replace('-', "_");
        match upper.as_str() {
            "PENDING" => Ok(JobState::Pending),
            "SETUP_DONE" => Ok(JobState::SetupDone),
            "RUNNING" => Ok(JobState::Running),
            "CANCEL_PENDING" => Ok(JobState::CancelPending),
            "CANCEL_STARTED" => Ok(JobState::CancelStarted),
            "CANCELLED" => Ok(JobState::Cancelled),
            "DONE" => Ok(JobState::Done),
            "ERROR" => Ok(JobState::Error),
            "ATTEMPT_FAILURE" => Ok(JobState::AttemptFailure),
            "STATE_UNSPECIFIED" => Ok(JobState::StateUnspecified),
            _ => Err(format!("unknown job state: {s}")),
        }
    }
}

/// Immutable snapshot of a job taken by a single status poll.
///
/// Every poll produces a fresh handle; nothing here is updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobHandle {
    pub job_id: String,
    pub state: JobState,
    pub detail: Option<String>,
    /// Base URI of the driver output object series, once Dataproc has assigned one.
    pub output_uri: Option<String>,
    pub project_id: Option<String>,
    pub cluster_name: Option<String>,
    pub cluster_uuid: Option<Uuid>,
    pub state_start_time: Option<DateTime<Utc>>,
    pub control_files_uri: Option<String>,
}

impl JobHandle {
    /// A bare snapshot with only the fields the waiter cares about.
    #[cfg(test)]
    pub fn new(job_id: impl Into<String>, state: JobState) -> Self {
        Self {
            job_id: job_id.into(),
            state,
            detail: None,
            output_uri: None,
            project_id: None,
            cluster_name: None,
            cluster_uuid: None,
            state_start_time: None,
            control_files_uri: None,
        }
    }

    #[cfg(test)]
    pub fn with_output_uri(mut self, uri: impl Into<String>) -> Self {
        self.output_uri = Some(uri.into());
        self
    }

    #[cfg(test)]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_terminal()
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Job Id:[{}], Status:[{}]", self.job_id, self.state)?;
        if let Some(cluster) = &self.cluster_name {
            write!(f, ", Cluster:[{cluster}]")?;
        }
        Ok(())
    }
}
