mod error;
mod job;
mod phase;
mod source;
mod stream;
#[cfg(test)]
pub(crate) mod testing;
mod wait;

pub use error::WaitError;
pub use job::{JobHandle, JobState};
pub use source::{ChunkStore, JobStatusSource};
pub use wait::{JobWaiter, WaitObserver, WaitOptions, WaitOutcome};
