pub mod control;
pub mod storage;
pub mod redis_storage;

use crate::dsl::WorkflowSource;
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// A project revision as submitted by a client: a named snapshot of the
/// project's workflow definitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Revision {
    pub name: String,
    #[serde(default)]
    pub default_params: Value,
    pub archive_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredProject {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredRevision {
    pub id: Uuid,
    pub project_id: Uuid,
    pub revision: Revision,
    pub created_at: DateTime<Utc>,
}

/// A workflow definition as stored within a revision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowDef {
    pub name: String,
    pub timezone: String,
    pub source: WorkflowSource,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredWorkflowDef {
    pub id: Uuid,
    pub revision_id: Uuid,
    pub def: WorkflowDef,
}

impl WorkflowDef {
    pub fn of(source: WorkflowSource, timezone: &str) -> WorkflowDef {
        WorkflowDef {
            name: source.name.clone(),
            timezone: timezone.to_string(),
            source,
        }
    }
}

/// Storage failures surfaced by [`storage::ProjectStore`] backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated (revision name per project,
    /// workflow name per revision, archive data per revision).
    #[error("resource conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> StoreError {
        StoreError::Backend(err.into())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> StoreError {
        StoreError::Backend(err.into())
    }
}
