use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::DataprocError;
use super::types::{ClusterListPage, ClusterResource, JobListPage, JobResource};
use crate::waiter::{JobHandle, JobStatusSource};

/// Public Dataproc v1 endpoint.
pub const API_URL: &str = "https://dataproc.googleapis.com/v1";

/// Page size used when listing jobs if the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Client for the Dataproc v1 `projects.regions.{jobs,clusters}` endpoints.
pub struct DataprocClient {
    project_id: String,
    region: String,
    access_token: Option<String>,
    client: Client,
    base_url: String,
}

impl DataprocClient {
    /// Create a client pointing at a custom base URL (useful for testing).
    pub fn with_base_url(
        project_id: String,
        region: String,
        access_token: Option<String>,
        base_url: String,
    ) -> Result<Self, DataprocError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            project_id,
            region,
            access_token,
            client,
            base_url,
        })
    }

    /// Build `{base}/projects/{project}/regions/{region}/{tail...}` with each
    /// segment percent-encoded.
    fn url(&self, tail: &[&str]) -> Result<Url, DataprocError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| DataprocError::InvalidEndpoint(format!("{}: {e}", self.base_url)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| DataprocError::InvalidEndpoint(self.base_url.clone()))?;
            segments
                .pop_if_empty()
                .extend(["projects", self.project_id.as_str(), "regions", self.region.as_str()])
                .extend(tail);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        what: &str,
    ) -> Result<T, DataprocError> {
        debug!(%url, "dataproc request");
        let mut request = self.client.get(url);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(DataprocError::NotFound(what.to_string()));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs.saturating_mul(1000))
                .unwrap_or(1000);
            return Err(DataprocError::RateLimited {
                retry_after_ms: retry_after,
            });
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(DataprocError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| DataprocError::UnexpectedResponse(e.to_string()))
    }

    /// Fetch one job snapshot.
    pub async fn get_job(&self, job_id: &str) -> Result<JobHandle, DataprocError> {
        let url = self.url(&["jobs", job_id])?;
        let job: JobResource = self.get_json(url, &format!("job {job_id}")).await?;
        Ok(job.into_handle(job_id))
    }

    /// Like [`get_job`](Self::get_job) but a missing job is `Ok(None)`.
    pub async fn find_job(&self, job_id: &str) -> Result<Option<JobHandle>, DataprocError> {
        match self.get_job(job_id).await {
            Ok(job) => Ok(Some(job)),
            Err(DataprocError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Fetch a single page of jobs.
    pub async fn list_jobs_page(
        &self,
        cluster_name: Option<&str>,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<JobListPage, DataprocError> {
        let mut url = self.url(&["jobs"])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("pageSize", &page_size.to_string());
            if let Some(cluster) = cluster_name {
                query.append_pair("clusterName", cluster);
            }
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }
        self.get_json(url, "job list").await
    }

    /// Walk every page of the job listing.
    pub async fn list_jobs(
        &self,
        cluster_name: Option<&str>,
        page_size: u32,
    ) -> Result<Vec<JobHandle>, DataprocError> {
        let mut jobs = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = self
                .list_jobs_page(cluster_name, page_size, page_token.as_deref())
                .await?;
            for job in page.jobs {
                let Some(job_id) = job.reference.as_ref().and_then(|r| r.job_id.clone()) else {
                    return Err(DataprocError::UnexpectedResponse(
                        "listed job has no reference.jobId".into(),
                    ));
                };
                jobs.push(job.into_handle(&job_id));
            }
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(jobs)
    }

    pub async fn get_cluster(&self, cluster_name: &str) -> Result<ClusterResource, DataprocError> {
        let url = self.url(&["clusters", cluster_name])?;
        self.get_json(url, &format!("cluster {cluster_name}")).await
    }

    /// List every cluster in the configured project and region.
    pub async fn list_clusters(&self) -> Result<Vec<ClusterResource>, DataprocError> {
        let mut clusters = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut url = self.url(&["clusters"])?;
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }
            let page: ClusterListPage = self.get_json(url, "cluster list").await?;
            clusters.extend(page.clusters);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(clusters)
    }
}

impl JobStatusSource for DataprocClient {
    async fn get_job(&self, job_id: &str) -> Result<JobHandle, DataprocError> {
        DataprocClient::get_job(self, job_id).await
    }
}
