use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use super::error::{OutputWarning, WaitError};
use super::job::{JobHandle, JobState};
use super::phase::WaitPhase;
use super::source::{ChunkStore, JobStatusSource};
use super::stream::ChunkStream;
use crate::dataproc::DataprocError;

pub const DEFAULT_OUTPUT_POLL: Duration = Duration::from_secs(1);
pub const DEFAULT_STATUS_POLL: Duration = Duration::from_secs(10);
/// How long to keep collecting output after the job is seen terminal.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(10);
pub const DEFAULT_READ_BLOCK: u64 = 64 * 1024;

/// Parameters of a single wait.
#[derive(Debug, Clone)]
pub struct WaitOptions {
    pub goal: JobState,
    pub stream_output: bool,
    pub output_poll: Duration,
    pub status_poll: Duration,
    /// `None` waits forever.
    pub timeout: Option<Duration>,
    pub grace_period: Duration,
    pub read_block: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            goal: JobState::Done,
            stream_output: false,
            output_poll: DEFAULT_OUTPUT_POLL,
            status_poll: DEFAULT_STATUS_POLL,
            timeout: None,
            grace_period: DEFAULT_GRACE_PERIOD,
            read_block: DEFAULT_READ_BLOCK,
        }
    }
}

/// Receives what the waiter learns while it runs.
pub trait WaitObserver {
    /// Every successful status poll.
    fn job_polled(&mut self, _job: &JobHandle) {}

    /// Driver output, in order, without gaps or repeats.
    fn output(&mut self, _bytes: &[u8]) {}
}

impl WaitObserver for () {}

impl WaitObserver for Vec<u8> {
    fn output(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// A job that reached the goal state.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitOutcome {
    pub job: JobHandle,
    pub output_warning: Option<OutputWarning>,
}

/// Polls a job until it reaches a terminal state, relaying its driver output.
///
/// Status is polled every `status_poll` while output is polled every
/// `output_poll`; the loop itself ticks at the output rate.
pub struct JobWaiter<'a, S, C> {
    source: &'a S,
    store: &'a C,
    options: WaitOptions,
}

impl<'a, S: JobStatusSource, C: ChunkStore> JobWaiter<'a, S, C> {
    pub fn new(source: &'a S, store: &'a C, options: WaitOptions) -> Self {
        Self {
            source,
            store,
            options,
        }
    }

    pub async fn wait<O: WaitObserver>(
        &self,
        job_id: &str,
        observer: &mut O,
    ) -> Result<WaitOutcome, WaitError> {
        let opts = &self.options;
        if !opts.goal.is_terminal() {
            return Err(WaitError::InvalidGoal(opts.goal));
        }

        let start = Instant::now();
        // A timeout past the end of the clock is no timeout at all.
        let timeout_at = opts.timeout.and_then(|t| start.checked_add(t));
        let mut now = start;
        let mut phase = WaitPhase::Waiting;
        let mut job: Option<JobHandle> = None;
        let mut stream: Option<ChunkStream<'a, C>> = None;
        let mut last_status_poll: Option<Instant> = None;

        info!(job_id, goal = %opts.goal, stream = opts.stream_output, "waiting for job");

        while !phase.expired(timeout_at, now) {
            // Output first, so a closed stream is noticed this iteration.
            if let Some(s) = stream.as_mut()
                && s.is_open()
            {
                s.drain(opts.read_block, |bytes| observer.output(bytes))
                    .await?;
            }
            let stream_closed = stream.as_ref().is_some_and(|s| !s.is_open());

            phase = phase.observe(job.as_ref(), now, opts.grace_period);
            if phase.job_complete() && (!opts.stream_output || stream_closed) {
                phase = WaitPhase::Done;
                break;
            }

            let regular_poll = !phase.job_complete()
                && last_status_poll.is_none_or(|t| now.duration_since(t) >= opts.status_poll);
            let expecting_stream = opts.stream_output && stream.is_none();
            let expecting_done = !phase.job_complete() && stream_closed;

            if regular_poll || expecting_stream || expecting_done {
                last_status_poll = Some(now);
                match self.source.get_job(job_id).await {
                    Ok(snapshot) => {
                        debug!(job_id, state = %snapshot.state, "job polled");
                        observer.job_polled(&snapshot);
                        if expecting_stream && let Some(uri) = &snapshot.output_uri {
                            debug!(job_id, uri = %uri, "streaming driver output");
                            stream = Some(ChunkStream::new(self.store, uri.clone()));
                        }
                        job = Some(snapshot);
                    }
                    Err(DataprocError::NotFound(_)) => {
                        return Err(WaitError::JobNotFound(job_id.to_string()));
                    }
                    Err(e) if e.is_transient() => {
                        // Keep trying until the deadline in case the failure is transient.
                        warn!(job_id, error = %e, "GetJob failed");
                    }
                    Err(e) => return Err(WaitError::Status(e)),
                }
            }

            sleep(opts.output_poll).await;
            now = Instant::now();
        }

        self.finish(job_id, job, stream.as_ref(), phase)
    }

    fn finish(
        &self,
        job_id: &str,
        job: Option<JobHandle>,
        stream: Option<&ChunkStream<'a, C>>,
        phase: WaitPhase,
    ) -> Result<WaitOutcome, WaitError> {
        let goal = self.options.goal;
        let state = job.as_ref().map(|j| j.state);
        let Some(job) = job.filter(JobHandle::is_complete) else {
            return Err(WaitError::Timeout {
                job_id: job_id.to_string(),
                state,
            });
        };

        if job.state != goal
            && let Some(detail) = &job.detail
        {
            // The state itself goes into the error; only the details are logged.
            info!(job_id, "{detail}");
        }

        let output_warning = match stream {
            _ if !self.options.stream_output => None,
            None => Some(OutputWarning::NotFound),
            Some(s) if s.is_open() => Some(OutputWarning::Incomplete),
            Some(_) => None,
        };
        if let Some(w) = output_warning {
            warn!(job_id, "{w}");
        }

        if job.state != goal {
            return Err(WaitError::GoalNotReached {
                job_id: job_id.to_string(),
                actual: job.state,
                goal,
            });
        }

        debug!(job_id, ?phase, "wait finished");
        Ok(WaitOutcome {
            job,
            output_warning,
        })
    }
}
