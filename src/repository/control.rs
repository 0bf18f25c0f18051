use crate::repository::storage::ProjectStore;
use crate::repository::{
    Revision, StoreError, StoredProject, StoredRevision, StoredWorkflowDef, WorkflowDef,
};
use crate::schedule::{Schedule, SchedulerLookup};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Write-side wrapper around one project: revision uploads, workflow
/// definition inserts and the schedule refresh that follows them. All
/// storage semantics live behind the [`ProjectStore`] trait; this type only
/// sequences the calls.
pub struct ProjectControl {
    store: Arc<dyn ProjectStore>,
    project: StoredProject,
}

impl ProjectControl {
    pub fn new(store: Arc<dyn ProjectStore>, project: StoredProject) -> ProjectControl {
        ProjectControl { store, project }
    }

    /// Look up the named project, creating it when missing.
    pub async fn put(store: Arc<dyn ProjectStore>, name: &str) -> Result<ProjectControl, StoreError> {
        let project = store.put_project(name).await?;
        Ok(ProjectControl { store, project })
    }

    pub fn get(&self) -> &StoredProject {
        &self.project
    }

    pub async fn insert_revision(&self, revision: &Revision) -> Result<StoredRevision, StoreError> {
        self.store.insert_revision(self.project.id, revision).await
    }

    pub async fn insert_revision_archive_data(
        &self,
        revision_id: Uuid,
        data: Vec<u8>,
    ) -> Result<(), StoreError> {
        self.store
            .insert_revision_archive_data(revision_id, data)
            .await
    }

    /// Store the revision's workflow definitions, then refresh the project's
    /// schedule table from the definitions that have a scheduler.
    pub async fn insert_workflow_definitions(
        &self,
        revision: &StoredRevision,
        defs: &[WorkflowDef],
        scheds: &dyn SchedulerLookup,
        current_time: DateTime<Utc>,
    ) -> Result<Vec<StoredWorkflowDef>, StoreError> {
        let stored = self
            .insert_workflow_definitions_without_schedules(revision, defs)
            .await?;
        self.update_schedules(revision, &stored, scheds, current_time)
            .await?;
        Ok(stored)
    }

    pub async fn insert_workflow_definitions_without_schedules(
        &self,
        revision: &StoredRevision,
        defs: &[WorkflowDef],
    ) -> Result<Vec<StoredWorkflowDef>, StoreError> {
        let mut stored = Vec::with_capacity(defs.len());
        for def in defs {
            let row = self
                .store
                .insert_workflow_definition(self.project.id, revision.id, def)
                .await?;
            stored.push(row);
        }
        info!(
            project = %self.project.name,
            revision = %revision.revision.name,
            count = stored.len(),
            "stored workflow definitions"
        );
        Ok(stored)
    }

    async fn update_schedules(
        &self,
        revision: &StoredRevision,
        defs: &[StoredWorkflowDef],
        scheds: &dyn SchedulerLookup,
        current_time: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut schedules = Vec::new();
        for def in defs {
            if let Some(scheduler) = scheds.try_get_scheduler(revision, def) {
                let first_time = scheduler.first_schedule_time(current_time);
                schedules.push(Schedule::of(
                    &def.def.name,
                    def.id,
                    first_time.run_time,
                    first_time.schedule_time,
                ));
            }
        }
        self.store
            .update_schedules(self.project.id, schedules)
            .await
    }
}
