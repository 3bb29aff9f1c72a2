//! Byte-stream view over a numbered series of storage objects.
//!
//! Dataproc writes driver output to `{base}.000000000`, `{base}.000000001`, ...
//! Each object only grows while it is current. Object *N* is known to be
//! finished once object *N+1* exists, and an empty object marks the end of
//! the output.

use tracing::{debug, trace};

use super::error::StreamError;
use super::source::ChunkStore;

/// Position of a [`ChunkStream`] within the object series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkCursor {
    pub index: u64,
    pub offset: u64,
}

pub struct ChunkStream<'a, C> {
    store: &'a C,
    base_uri: String,
    cursor: ChunkCursor,
    // Largest size reported so far for the current object.
    last_size: u64,
    open: bool,
}

impl<'a, C: ChunkStore> ChunkStream<'a, C> {
    pub fn new(store: &'a C, base_uri: impl Into<String>) -> Self {
        Self {
            store,
            base_uri: base_uri.into(),
            cursor: ChunkCursor::default(),
            last_size: 0,
            open: true,
        }
    }

    #[cfg(test)]
    pub fn cursor(&self) -> ChunkCursor {
        self.cursor
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// URI of the `index`th object in the series.
    pub fn chunk_uri(&self, index: u64) -> String {
        format!("{}.{:09}", self.base_uri, index)
    }

    /// Read at most `max_bytes` new bytes from the current object.
    ///
    /// An empty result means "nothing new yet" unless the stream is now closed.
    pub async fn read(&mut self, max_bytes: u64) -> Result<Vec<u8>, StreamError> {
        if !self.open {
            return Err(StreamError::Closed);
        }

        // Look at the next object first: if it exists now, the size we fetch
        // for the current object afterwards is final.
        let next_exists = self
            .store
            .metadata(&self.chunk_uri(self.cursor.index + 1))
            .await?
            .is_some();

        let current_uri = self.chunk_uri(self.cursor.index);
        let Some(current) = self.store.metadata(&current_uri).await? else {
            return Ok(Vec::new());
        };

        let seen = self.last_size.max(self.cursor.offset);
        if current.size < seen {
            return Err(StreamError::Shrunk {
                object: current_uri,
                previous: seen,
                current: current.size,
            });
        }

        if current.size == 0 {
            debug!(object = %current_uri, "empty output object, closing stream");
            self.close();
            return Ok(Vec::new());
        }
        self.last_size = current.size;

        let available = current.size - self.cursor.offset;
        let to_read = max_bytes.min(available);
        let mut data = Vec::new();
        if to_read > 0 {
            data = self
                .store
                .read_range(&current_uri, self.cursor.offset, to_read)
                .await?;
            data.truncate(to_read as usize);
            self.cursor.offset += data.len() as u64;
        }

        if next_exists && self.cursor.offset == current.size {
            trace!(object = %current_uri, size = current.size, "object finished");
            self.cursor = ChunkCursor {
                index: self.cursor.index + 1,
                offset: 0,
            };
            self.last_size = 0;
        }

        Ok(data)
    }

    /// Read everything currently available, handing each block to `sink`.
    ///
    /// Stops when a read makes no progress or the stream closes. Returns the
    /// number of bytes delivered.
    pub async fn drain(
        &mut self,
        block: u64,
        mut sink: impl FnMut(&[u8]),
    ) -> Result<u64, StreamError> {
        let mut total = 0;
        while self.open {
            let before = self.cursor;
            let data = self.read(block).await?;
            if !data.is_empty() {
                total += data.len() as u64;
                sink(&data);
            } else if self.cursor == before {
                break;
            }
        }
        Ok(total)
    }
}
