use std::time::Duration;

use tokio::time::Instant;

use super::job::JobHandle;

/// Where a wait is in its lifecycle.
///
/// `Waiting` until the first snapshot in a terminal state is seen, then
/// `TerminalGrace` for a fixed window so trailing output can still arrive,
/// then `Done` once nothing is left to wait for. A grace window too long to
/// represent as an [`Instant`] has no deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPhase {
    Waiting,
    TerminalGrace { deadline: Option<Instant> },
    Done,
}

impl WaitPhase {
    /// Whether the job has been seen in a terminal state.
    pub fn job_complete(&self) -> bool {
        !matches!(self, WaitPhase::Waiting)
    }

    /// Latch into `TerminalGrace` the first time `job` is terminal.
    ///
    /// Later calls never move the grace deadline.
    pub fn observe(self, job: Option<&JobHandle>, now: Instant, grace: Duration) -> Self {
        match self {
            WaitPhase::Waiting if job.is_some_and(JobHandle::is_complete) => {
                WaitPhase::TerminalGrace {
                    deadline: now.checked_add(grace),
                }
            }
            other => other,
        }
    }

    /// The deadline in force: the grace deadline once latched, the caller's
    /// timeout before that.
    pub fn deadline(&self, timeout_at: Option<Instant>) -> Option<Instant> {
        match self {
            WaitPhase::Waiting => timeout_at,
            WaitPhase::TerminalGrace { deadline } => *deadline,
            WaitPhase::Done => None,
        }
    }

    pub fn expired(&self, timeout_at: Option<Instant>, now: Instant) -> bool {
        self.deadline(timeout_at).is_some_and(|d| now >= d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waiter::JobState;

    const GRACE: Duration = Duration::from_secs(10);

    #[test]
    fn non_terminal_job_keeps_waiting() {
        let now = Instant::now();
        let job = JobHandle::new("j", JobState::Running);
        assert_eq!(
            WaitPhase::Waiting.observe(Some(&job), now, GRACE),
            WaitPhase::Waiting
        );
        assert_eq!(WaitPhase::Waiting.observe(None, now, GRACE), WaitPhase::Waiting);
    }

    #[test]
    fn terminal_job_latches_grace_once() {
        let now = Instant::now();
        let job = JobHandle::new("j", JobState::Done);
        let phase = WaitPhase::Waiting.observe(Some(&job), now, GRACE);
        assert_eq!(
            phase,
            WaitPhase::TerminalGrace {
                deadline: Some(now + GRACE)
            }
        );
        assert!(phase.job_complete());

        let later = now + Duration::from_secs(5);
        assert_eq!(phase.observe(Some(&job), later, GRACE), phase);
    }

    #[test]
    fn grace_deadline_replaces_timeout() {
        let now = Instant::now();
        let timeout_at = Some(now + Duration::from_secs(3));
        assert_eq!(WaitPhase::Waiting.deadline(timeout_at), timeout_at);
        assert_eq!(WaitPhase::Waiting.deadline(None), None);

        let phase = WaitPhase::TerminalGrace {
            deadline: Some(now + GRACE),
        };
        assert_eq!(phase.deadline(timeout_at), Some(now + GRACE));
        assert!(!phase.expired(timeout_at, now + Duration::from_secs(5)));
        assert!(phase.expired(timeout_at, now + GRACE));
    }

    #[test]
    fn unbounded_wait_never_expires() {
        let now = Instant::now();
        assert!(!WaitPhase::Waiting.expired(None, now + Duration::from_secs(86_400)));
    }

    #[test]
    fn overflowing_grace_has_no_deadline() {
        let now = Instant::now();
        let job = JobHandle::new("j", JobState::Done);
        let phase = WaitPhase::Waiting.observe(Some(&job), now, Duration::MAX);
        assert_eq!(phase, WaitPhase::TerminalGrace { deadline: None });
        assert!(phase.job_complete());
        assert!(!phase.expired(Some(now), now + Duration::from_secs(86_400)));
    }
}
