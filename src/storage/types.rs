//! Object paths and metadata records for the Cloud Storage JSON API.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::StorageError;

/// A parsed `gs://bucket/object` location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectPath {
    pub bucket: String,
    pub object: String,
}

impl FromStr for ObjectPath {
    type Err = StorageError;

    fn from_str(uri: &str) -> Result<Self, Self::Err> {
        let rest = uri
            .strip_prefix("gs://")
            .ok_or_else(|| StorageError::InvalidUri(uri.to_string()))?;
        let (bucket, object) = rest
            .split_once('/')
            .ok_or_else(|| StorageError::InvalidUri(uri.to_string()))?;
        if bucket.is_empty() || object.is_empty() {
            return Err(StorageError::InvalidUri(uri.to_string()));
        }
        Ok(Self {
            bucket: bucket.to_string(),
            object: object.to_string(),
        })
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gs://{}/{}", self.bucket, self.object)
    }
}

/// What the chunk stream needs to know about one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub size: u64,
}

/// `Object` resource as returned by `objects.get`. `size` is a decimal string on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectResource {
    pub name: String,
    pub bucket: String,
    pub size: String,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
}

impl TryFrom<ObjectResource> for ObjectMetadata {
    type Error = StorageError;

    fn try_from(resource: ObjectResource) -> Result<Self, Self::Error> {
        let size = resource.size.parse::<u64>().map_err(|_| {
            StorageError::UnexpectedResponse(format!(
                "object {} has non-numeric size {:?}",
                resource.name, resource.size
            ))
        })?;
        Ok(Self { size })
    }
}
