//! The two remote collaborators the waiter polls.

use super::job::JobHandle;
use crate::dataproc::DataprocError;
use crate::storage::{ObjectMetadata, StorageError};

/// Looks up the current snapshot of a job.
#[allow(async_fn_in_trait)]
pub trait JobStatusSource {
    /// Failures that are worth retrying report `true` from
    /// [`DataprocError::is_transient`].
    async fn get_job(&self, job_id: &str) -> Result<JobHandle, DataprocError>;
}

/// Append-only series of output objects addressed by URI.
#[allow(async_fn_in_trait)]
pub trait ChunkStore {
    /// `None` when the object does not exist (yet).
    async fn metadata(&self, uri: &str) -> Result<Option<ObjectMetadata>, StorageError>;

    async fn read_range(&self, uri: &str, offset: u64, length: u64)
    -> Result<Vec<u8>, StorageError>;
}
