use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use super::error::StorageError;
use super::types::{ObjectMetadata, ObjectPath, ObjectResource};
use crate::waiter::ChunkStore;

/// Public Cloud Storage endpoint.
pub const API_URL: &str = "https://storage.googleapis.com";

/// Minimal Cloud Storage JSON API client: object metadata and ranged reads.
pub struct StorageClient {
    access_token: Option<String>,
    client: Client,
    base_url: String,
}

impl StorageClient {
    /// Create a client pointing at a custom base URL (useful for testing).
    pub fn with_base_url(
        access_token: Option<String>,
        base_url: String,
    ) -> Result<Self, StorageError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            access_token,
            client,
            base_url,
        })
    }

    fn object_url(&self, path: &ObjectPath) -> Result<Url, StorageError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| StorageError::InvalidEndpoint(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| StorageError::InvalidEndpoint(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["storage", "v1", "b", path.bucket.as_str(), "o", path.object.as_str()]);
        Ok(url)
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Fetch the metadata of `uri`, or `None` if the object does not exist.
    pub async fn object_metadata(&self, uri: &str) -> Result<Option<ObjectMetadata>, StorageError> {
        let path: ObjectPath = uri.parse()?;
        let response = self.get(self.object_url(&path)?).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(api_error(response).await);
        }

        let resource = response.json::<ObjectResource>().await?;
        ObjectMetadata::try_from(resource).map(Some)
    }

    /// Read up to `length` bytes of `uri` starting at `offset`.
    pub async fn read_object_range(
        &self,
        uri: &str,
        offset: u64,
        length: u64,
    ) -> Result<Vec<u8>, StorageError> {
        if length == 0 {
            return Ok(Vec::new());
        }
        let path: ObjectPath = uri.parse()?;
        let mut url = self.object_url(&path)?;
        url.query_pairs_mut().append_pair("alt", "media");

        let last = offset + length - 1;
        let response = self
            .get(url)
            .header(reqwest::header::RANGE, format!("bytes={offset}-{last}"))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::RANGE_NOT_SATISFIABLE {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(api_error(response).await);
        }

        let body = response.bytes().await?;
        if status == StatusCode::PARTIAL_CONTENT {
            return Ok(body.to_vec());
        }

        // Server ignored the Range header and sent the whole object.
        let start = (offset as usize).min(body.len());
        let end = (start + length as usize).min(body.len());
        Ok(body[start..end].to_vec())
    }
}

async fn api_error(response: reqwest::Response) -> StorageError {
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    StorageError::ApiError { status, message }
}

impl ChunkStore for StorageClient {
    async fn metadata(&self, uri: &str) -> Result<Option<ObjectMetadata>, StorageError> {
        self.object_metadata(uri).await
    }

    async fn read_range(
        &self,
        uri: &str,
        offset: u64,
        length: u64,
    ) -> Result<Vec<u8>, StorageError> {
        self.read_object_range(uri, offset, length).await
    }
}
