use crate::repository::{
    Revision, StoreError, StoredProject, StoredRevision, StoredWorkflowDef, WorkflowDef,
};
use crate::schedule::Schedule;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

// --- Interface ---

#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Get the project with this name, creating it if it does not exist yet.
    async fn put_project(&self, name: &str) -> Result<StoredProject, StoreError>;

    async fn find_project_by_name(&self, name: &str) -> Result<Option<StoredProject>, StoreError>;

    /// Fails with [`StoreError::Conflict`] if the project already has a
    /// revision with this name.
    async fn insert_revision(
        &self,
        project_id: Uuid,
        revision: &Revision,
    ) -> Result<StoredRevision, StoreError>;

    async fn get_revision(&self, revision_id: Uuid) -> Result<Option<StoredRevision>, StoreError>;

    /// Archive data is write-once per revision.
    async fn insert_revision_archive_data(
        &self,
        revision_id: Uuid,
        data: Vec<u8>,
    ) -> Result<(), StoreError>;

    async fn get_revision_archive_data(
        &self,
        revision_id: Uuid,
    ) -> Result<Option<Vec<u8>>, StoreError>;

    /// Fails with [`StoreError::Conflict`] if the revision already has a
    /// workflow definition with this name.
    async fn insert_workflow_definition(
        &self,
        project_id: Uuid,
        revision_id: Uuid,
        def: &WorkflowDef,
    ) -> Result<StoredWorkflowDef, StoreError>;

    async fn get_workflow_definitions(
        &self,
        revision_id: Uuid,
    ) -> Result<Vec<StoredWorkflowDef>, StoreError>;

    /// Replace the project's schedule table with the given rows.
    async fn update_schedules(
        &self,
        project_id: Uuid,
        schedules: Vec<Schedule>,
    ) -> Result<(), StoreError>;

    async fn get_schedules(&self, project_id: Uuid) -> Result<Vec<Schedule>, StoreError>;
}

// --- In-Memory Implementation ---

pub struct InMemoryProjectStore {
    projects: DashMap<Uuid, StoredProject>,
    // Map<ProjectName, ProjectId>
    project_names: DashMap<String, Uuid>,
    revisions: DashMap<Uuid, StoredRevision>,
    // Map<(ProjectId, RevisionName), RevisionId>
    revision_names: DashMap<(Uuid, String), Uuid>,
    archives: DashMap<Uuid, Vec<u8>>,
    // Map<RevisionId, definitions in insertion order>
    definitions: DashMap<Uuid, Vec<StoredWorkflowDef>>,
    schedules: DashMap<Uuid, Vec<Schedule>>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self {
            projects: DashMap::new(),
            project_names: DashMap::new(),
            revisions: DashMap::new(),
            revision_names: DashMap::new(),
            archives: DashMap::new(),
            definitions: DashMap::new(),
            schedules: DashMap::new(),
        }
    }
}

impl Default for InMemoryProjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn put_project(&self, name: &str) -> Result<StoredProject, StoreError> {
        let id = *self
            .project_names
            .entry(name.to_string())
            .or_insert_with(Uuid::new_v4);
        let project = self
            .projects
            .entry(id)
            .or_insert_with(|| StoredProject {
                id,
                name: name.to_string(),
                created_at: Utc::now(),
            })
            .value()
            .clone();
        Ok(project)
    }

    async fn find_project_by_name(&self, name: &str) -> Result<Option<StoredProject>, StoreError> {
        if let Some(id) = self.project_names.get(name) {
            Ok(self.projects.get(id.value()).map(|p| p.value().clone()))
        } else {
            Ok(None)
        }
    }

    async fn insert_revision(
        &self,
        project_id: Uuid,
        revision: &Revision,
    ) -> Result<StoredRevision, StoreError> {
        let key = (project_id, revision.name.clone());
        match self.revision_names.entry(key) {
            Entry::Occupied(_) => Err(StoreError::Conflict(format!(
                "revision '{}' already exists in project {}",
                revision.name, project_id
            ))),
            Entry::Vacant(slot) => {
                let stored = StoredRevision {
                    id: Uuid::new_v4(),
                    project_id,
                    revision: revision.clone(),
                    created_at: Utc::now(),
                };
                slot.insert(stored.id);
                self.revisions.insert(stored.id, stored.clone());
                Ok(stored)
            }
        }
    }

    async fn get_revision(&self, revision_id: Uuid) -> Result<Option<StoredRevision>, StoreError> {
        Ok(self.revisions.get(&revision_id).map(|r| r.value().clone()))
    }

    async fn insert_revision_archive_data(
        &self,
        revision_id: Uuid,
        data: Vec<u8>,
    ) -> Result<(), StoreError> {
        match self.archives.entry(revision_id) {
            Entry::Occupied(_) => Err(StoreError::Conflict(format!(
                "archive data already stored for revision {}",
                revision_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(data);
                Ok(())
            }
        }
    }

    async fn get_revision_archive_data(
        &self,
        revision_id: Uuid,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.archives.get(&revision_id).map(|d| d.value().clone()))
    }

    async fn insert_workflow_definition(
        &self,
        _project_id: Uuid,
        revision_id: Uuid,
        def: &WorkflowDef,
    ) -> Result<StoredWorkflowDef, StoreError> {
        let mut defs = self.definitions.entry(revision_id).or_default();
        if defs.iter().any(|d| d.def.name == def.name) {
            return Err(StoreError::Conflict(format!(
                "workflow '{}' already exists in revision {}",
                def.name, revision_id
            )));
        }
        let stored = StoredWorkflowDef {
            id: Uuid::new_v4(),
            revision_id,
            def: def.clone(),
        };
        defs.push(stored.clone());
        Ok(stored)
    }

    async fn get_workflow_definitions(
        &self,
        revision_id: Uuid,
    ) -> Result<Vec<StoredWorkflowDef>, StoreError> {
        Ok(self
            .definitions
            .get(&revision_id)
            .map(|defs| defs.value().clone())
            .unwrap_or_default())
    }

    async fn update_schedules(
        &self,
        project_id: Uuid,
        schedules: Vec<Schedule>,
    ) -> Result<(), StoreError> {
        self.schedules.insert(project_id, schedules);
        Ok(())
    }

    async fn get_schedules(&self, project_id: Uuid) -> Result<Vec<Schedule>, StoreError> {
        Ok(self
            .schedules
            .get(&project_id)
            .map(|s| s.value().clone())
            .unwrap_or_default())
    }
}
