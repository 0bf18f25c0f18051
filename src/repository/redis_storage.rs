use crate::repository::storage::ProjectStore;
use crate::repository::{
    Revision, StoreError, StoredProject, StoredRevision, StoredWorkflowDef, WorkflowDef,
};
use crate::schedule::Schedule;
use async_trait::async_trait;
use chrono::Utc;
use redis::AsyncCommands;
use uuid::Uuid;

pub struct RedisProjectStore {
    client: redis::Client,
    prefix: String,
}

impl RedisProjectStore {
    pub fn new(client: redis::Client, prefix: String) -> Self {
        Self { client, prefix }
    }

    fn project_names_key(&self) -> String {
        format!("{}:projects", self.prefix)
    }

    fn project_key(&self, id: Uuid) -> String {
        format!("{}:project:{}", self.prefix, id)
    }

    fn revision_names_key(&self, project_id: Uuid) -> String {
        format!("{}:project:{}:revs", self.prefix, project_id)
    }

    fn revision_key(&self, id: Uuid) -> String {
        format!("{}:rev:{}", self.prefix, id)
    }

    fn archive_key(&self, revision_id: Uuid) -> String {
        format!("{}:rev:{}:archive", self.prefix, revision_id)
    }

    fn definition_list_key(&self, revision_id: Uuid) -> String {
        format!("{}:rev:{}:wfs", self.prefix, revision_id)
    }

    fn definition_names_key(&self, revision_id: Uuid) -> String {
        format!("{}:rev:{}:wf-names", self.prefix, revision_id)
    }

    fn schedules_key(&self, project_id: Uuid) -> String {
        format!("{}:project:{}:schedules", self.prefix, project_id)
    }
}

#[async_trait]
impl ProjectStore for RedisProjectStore {
    async fn put_project(&self, name: &str) -> Result<StoredProject, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let id = Uuid::new_v4();
        let created: bool = conn.hset_nx(self.project_names_key(), name, id.to_string()).await?;
        if created {
            let project = StoredProject {
                id,
                name: name.to_string(),
                created_at: Utc::now(),
            };
            let _: () = conn
                .set(self.project_key(id), serde_json::to_string(&project)?)
                .await?;
            return Ok(project);
        }

        // Somebody else holds the name slot; read their row back.
        let existing_id: String = conn.hget(self.project_names_key(), name).await?;
        let raw: String = conn
            .get(self.project_key(parse_uuid(&existing_id)?))
            .await?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn find_project_by_name(&self, name: &str) -> Result<Option<StoredProject>, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let id: Option<String> = conn.hget(self.project_names_key(), name).await?;
        if let Some(id) = id {
            let raw: Option<String> = conn.get(self.project_key(parse_uuid(&id)?)).await?;
            if let Some(raw) = raw {
                return Ok(Some(serde_json::from_str(&raw)?));
            }
        }
        Ok(None)
    }

    async fn insert_revision(
        &self,
        project_id: Uuid,
        revision: &Revision,
    ) -> Result<StoredRevision, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let stored = StoredRevision {
            id: Uuid::new_v4(),
            project_id,
            revision: revision.clone(),
            created_at: Utc::now(),
        };
        let claimed: bool = conn
            .hset_nx(
                self.revision_names_key(project_id),
                &revision.name,
                stored.id.to_string(),
            )
            .await?;
        if !claimed {
            return Err(StoreError::Conflict(format!(
                "revision '{}' already exists in project {}",
                revision.name, project_id
            )));
        }
        let _: () = conn
            .set(self.revision_key(stored.id), serde_json::to_string(&stored)?)
            .await?;
        Ok(stored)
    }

    async fn get_revision(&self, revision_id: Uuid) -> Result<Option<StoredRevision>, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(self.revision_key(revision_id)).await?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn insert_revision_archive_data(
        &self,
        revision_id: Uuid,
        data: Vec<u8>,
    ) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let stored: bool = conn.set_nx(self.archive_key(revision_id), data).await?;
        if !stored {
            return Err(StoreError::Conflict(format!(
                "archive data already stored for revision {}",
                revision_id
            )));
        }
        Ok(())
    }

    async fn get_revision_archive_data(
        &self,
        revision_id: Uuid,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let data: Option<Vec<u8>> = conn.get(self.archive_key(revision_id)).await?;
        Ok(data)
    }

    async fn insert_workflow_definition(
        &self,
        _project_id: Uuid,
        revision_id: Uuid,
        def: &WorkflowDef,
    ) -> Result<StoredWorkflowDef, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let stored = StoredWorkflowDef {
            id: Uuid::new_v4(),
            revision_id,
            def: def.clone(),
        };
        let claimed: bool = conn
            .hset_nx(
                self.definition_names_key(revision_id),
                &def.name,
                stored.id.to_string(),
            )
            .await?;
        if !claimed {
            return Err(StoreError::Conflict(format!(
                "workflow '{}' already exists in revision {}",
                def.name, revision_id
            )));
        }
        let _: () = conn
            .rpush(
                self.definition_list_key(revision_id),
                serde_json::to_string(&stored)?,
            )
            .await?;
        Ok(stored)
    }

    async fn get_workflow_definitions(
        &self,
        revision_id: Uuid,
    ) -> Result<Vec<StoredWorkflowDef>, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Vec<String> = conn
            .lrange(self.definition_list_key(revision_id), 0, -1)
            .await?;
        let mut defs = Vec::with_capacity(raw.len());
        for item in raw {
            defs.push(serde_json::from_str(&item)?);
        }
        Ok(defs)
    }

    async fn update_schedules(
        &self,
        project_id: Uuid,
        schedules: Vec<Schedule>,
    ) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn
            .set(
                self.schedules_key(project_id),
                serde_json::to_string(&schedules)?,
            )
            .await?;
        Ok(())
    }

    async fn get_schedules(&self, project_id: Uuid) -> Result<Vec<Schedule>, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(self.schedules_key(project_id)).await?;
        match raw {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }
}

fn parse_uuid(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw).map_err(|e| StoreError::Backend(anyhow::anyhow!("invalid uuid in store: {}", e)))
}
