//! Response records for the Dataproc v1 jobs and clusters endpoints.
//!
//! Every field the API may omit is an `Option` (or defaults to empty), so the
//! JSON is decoded exactly once here and consumers never look up keys by name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::waiter::{JobHandle, JobState};

/// `Job` resource as returned by `projects.regions.jobs.get`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResource {
    #[serde(default)]
    pub reference: Option<JobReference>,
    #[serde(default)]
    pub placement: Option<JobPlacement>,
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub driver_output_resource_uri: Option<String>,
    #[serde(default)]
    pub driver_control_files_uri: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReference {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub job_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPlacement {
    #[serde(default)]
    pub cluster_name: Option<String>,
    #[serde(default)]
    pub cluster_uuid: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub state: JobState,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub state_start_time: Option<DateTime<Utc>>,
}

/// One page of `projects.regions.jobs.list`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListPage {
    #[serde(default)]
    pub jobs: Vec<JobResource>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// `Cluster` resource, reduced to what the CLI prints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterResource {
    pub cluster_name: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub cluster_uuid: Option<String>,
    #[serde(default)]
    pub config: Option<ClusterConfig>,
    #[serde(default)]
    pub status: Option<ClusterStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status_history: Vec<ClusterStatus>,
}

impl ClusterResource {
    /// Compute Engine zone the cluster runs in, as a full URI.
    pub fn zone_uri(&self) -> Option<&str> {
        self.config
            .as_ref()?
            .gce_cluster_config
            .as_ref()?
            .zone_uri
            .as_deref()
            .filter(|z| !z.is_empty())
    }

    /// Short zone name, e.g. `us-central1-a`.
    pub fn zone(&self) -> Option<&str> {
        self.zone_uri()
            .map(|uri| uri.rsplit('/').next().unwrap_or(uri))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    #[serde(default)]
    pub gce_cluster_config: Option<GceClusterConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GceClusterConfig {
    #[serde(default)]
    pub zone_uri: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStatus {
    pub state: String,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub state_start_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterListPage {
    #[serde(default)]
    pub clusters: Vec<ClusterResource>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl JobResource {
    /// Convert the raw record into a [`JobHandle`].
    ///
    /// `fallback_id` is used when the record carries no `reference.jobId`.
    /// A record without `status` is reported as `STATE_UNSPECIFIED`.
    pub fn into_handle(self, fallback_id: &str) -> JobHandle {
        let reference = self.reference.unwrap_or_default();
        let placement = self.placement.unwrap_or_default();
        let (state, detail, state_start_time) = match self.status {
            Some(status) => (status.state, status.details, status.state_start_time),
            None => (JobState::StateUnspecified, None, None),
        };

        JobHandle {
            job_id: reference.job_id.unwrap_or_else(|| fallback_id.to_string()),
            state,
            detail,
            output_uri: self.driver_output_resource_uri.filter(|u| !u.is_empty()),
            project_id: reference.project_id,
            cluster_name: placement.cluster_name,
            cluster_uuid: placement
                .cluster_uuid
                .as_deref()
                .and_then(|u| Uuid::parse_str(u).ok()),
            state_start_time,
            control_files_uri: self.driver_control_files_uri,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_decodes_from_api_format() {
        let api_json = r#"{
            "reference": {"projectId": "proj", "jobId": "job-42"},
            "placement": {"clusterName": "etl", "clusterUuid": "6f1c7d36-6d0a-4c6e-9b1e-3a2f6bb2d1a4"},
            "status": {"state": "RUNNING", "stateStartTime": "2015-11-03T17:02:11.000Z"},
            "driverOutputResourceUri": "gs://bucket/google-cloud-dataproc-metainfo/job-42/driveroutput",
            "driverControlFilesUri": "gs://bucket/google-cloud-dataproc-metainfo/job-42/"
        }"#;
        let job: JobResource = serde_json::from_str(api_json).unwrap();
        let handle = job.into_handle("ignored");

        assert_eq!(handle.job_id, "job-42");
        assert_eq!(handle.state, JobState::Running);
        assert_eq!(handle.project_id.as_deref(), Some("proj"));
        assert_eq!(handle.cluster_name.as_deref(), Some("etl"));
        assert!(handle.cluster_uuid.is_some());
        assert_eq!(
            handle.output_uri.as_deref(),
            Some("gs://bucket/google-cloud-dataproc-metainfo/job-42/driveroutput")
        );
        assert_eq!(
            handle.state_start_time.unwrap().to_rfc3339(),
            "2015-11-03T17:02:11+00:00"
        );
    }

    #[test]
    fn sparse_job_uses_fallbacks() {
        let job: JobResource = serde_json::from_str("{}").unwrap();
        let handle = job.into_handle("job-7");
        assert_eq!(handle.job_id, "job-7");
        assert_eq!(handle.state, JobState::StateUnspecified);
        assert!(handle.output_uri.is_none());
        assert!(handle.detail.is_none());
    }

    #[test]
    fn status_details_and_bad_uuid() {
        let api_json = r#"{
            "placement": {"clusterUuid": "not-a-uuid"},
            "status": {"state": "ERROR", "details": "Job failed with message [boom]"},
            "driverOutputResourceUri": ""
        }"#;
        let handle = serde_json::from_str::<JobResource>(api_json)
            .unwrap()
            .into_handle("job-9");
        assert_eq!(handle.state, JobState::Error);
        assert_eq!(handle.detail.as_deref(), Some("Job failed with message [boom]"));
        assert!(handle.cluster_uuid.is_none());
        assert!(handle.output_uri.is_none());
    }

    #[test]
    fn empty_list_page() {
        let page: JobListPage = serde_json::from_str("{}").unwrap();
        assert!(page.jobs.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn cluster_decodes_zone_and_history() {
        let json = r#"{
            "clusterName": "etl",
            "config": {
                "gceClusterConfig": {
                    "zoneUri": "https://www.googleapis.com/compute/v1/projects/p/zones/us-central1-a"
                }
            },
            "status": {"state": "RUNNING", "stateStartTime": "2024-03-01T10:05:00Z"},
            "statusHistory": [
                {"state": "CREATING", "stateStartTime": "2024-03-01T10:00:00Z"}
            ]
        }"#;
        let cluster: ClusterResource = serde_json::from_str(json).unwrap();
        assert_eq!(cluster.zone(), Some("us-central1-a"));
        let status = cluster.status.as_ref().unwrap();
        assert_eq!(
            status.state_start_time.unwrap().to_rfc3339(),
            "2024-03-01T10:05:00+00:00"
        );
        assert_eq!(cluster.status_history.len(), 1);
        assert_eq!(cluster.status_history[0].state, "CREATING");
    }

    #[test]
    fn cluster_without_config_has_no_zone() {
        let cluster: ClusterResource =
            serde_json::from_str(r#"{"clusterName": "tiny", "config": {}}"#).unwrap();
        assert_eq!(cluster.zone_uri(), None);
        assert!(cluster.status_history.is_empty());
    }

    #[test]
    fn cluster_page_decodes() {
        let json = r#"{
            "clusters": [{"clusterName": "etl", "status": {"state": "RUNNING"}}],
            "nextPageToken": "abc"
        }"#;
        let page: ClusterListPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.clusters[0].cluster_name, "etl");
        assert_eq!(page.clusters[0].status.as_ref().unwrap().state, "RUNNING");
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));
    }
}
