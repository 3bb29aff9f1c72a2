//! In-memory collaborators for waiter and stream tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::job::JobHandle;
use super::source::{ChunkStore, JobStatusSource};
use crate::dataproc::DataprocError;
use crate::storage::{ObjectMetadata, StorageError};

/// Object store backed by a map from URI to contents.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    reads: AtomicUsize,
    fail_reads: AtomicBool,
}

impl MemoryStore {
    /// Append to `uri`, creating it if needed. Appending nothing creates an empty object.
    pub fn append(&self, uri: &str, bytes: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .entry(uri.to_string())
            .or_default()
            .extend_from_slice(bytes);
    }

    pub fn truncate(&self, uri: &str, len: usize) {
        if let Some(object) = self.objects.lock().unwrap().get_mut(uri) {
            object.truncate(len);
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Make every later `read_range` fail with a 500.
    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }
}

impl ChunkStore for MemoryStore {
    async fn metadata(&self, uri: &str) -> Result<Option<ObjectMetadata>, StorageError> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .get(uri)
            .map(|o| ObjectMetadata {
                size: o.len() as u64,
            }))
    }

    async fn read_range(
        &self,
        uri: &str,
        offset: u64,
        length: u64,
    ) -> Result<Vec<u8>, StorageError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::ApiError {
                status: 500,
                message: "backend unavailable".into(),
            });
        }
        let objects = self.objects.lock().unwrap();
        let object = objects.get(uri).ok_or_else(|| StorageError::ApiError {
            status: 404,
            message: format!("no such object {uri}"),
        })?;
        let start = (offset as usize).min(object.len());
        let end = (start + length as usize).min(object.len());
        Ok(object[start..end].to_vec())
    }
}

/// One scripted answer to a status poll.
pub enum Step {
    Job {
        job: JobHandle,
        writes: Vec<(String, Vec<u8>)>,
    },
    Fail(DataprocError),
}

impl Step {
    pub fn job(job: JobHandle) -> Self {
        Step::Job {
            job,
            writes: Vec::new(),
        }
    }

    /// Output that shows up in the store at the moment this poll is answered.
    pub fn with_write(mut self, uri: &str, bytes: &[u8]) -> Self {
        if let Step::Job { writes, .. } = &mut self {
            writes.push((uri.to_string(), bytes.to_vec()));
        }
        self
    }
}

/// Status source that replays [`Step`]s and then repeats the last snapshot.
pub struct ScriptedSource {
    store: Arc<MemoryStore>,
    steps: Mutex<VecDeque<Step>>,
    last: Mutex<Option<JobHandle>>,
    polls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(store: Arc<MemoryStore>, steps: Vec<Step>) -> Self {
        Self {
            store,
            steps: Mutex::new(steps.into()),
            last: Mutex::new(None),
            polls: AtomicUsize::new(0),
        }
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

impl JobStatusSource for ScriptedSource {
    async fn get_job(&self, job_id: &str) -> Result<JobHandle, DataprocError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Job { job, writes }) => {
                for (uri, bytes) in writes {
                    self.store.append(&uri, &bytes);
                }
                *self.last.lock().unwrap() = Some(job.clone());
                Ok(job)
            }
            Some(Step::Fail(err)) => Err(err),
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| DataprocError::NotFound(job_id.to_string())),
        }
    }
}
