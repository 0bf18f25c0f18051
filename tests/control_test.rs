use trakt::dsl::builder::WorkflowBuilder;
use trakt::repository::control::ProjectControl;
use trakt::repository::storage::{InMemoryProjectStore, ProjectStore};
use trakt::repository::{Revision, StoreError, WorkflowDef};
use trakt::schedule::{IntervalSchedulerLookup, NoSchedulerLookup};
use std::sync::Arc;
use chrono::Utc;
use serde_json::json;

fn revision(name: &str) -> Revision {
    Revision {
        name: name.to_string(),
        default_params: json!({}),
        archive_type: "none".to_string(),
    }
}

#[tokio::test]
async fn test_insert_revision_and_archive_data() {
    let store: Arc<dyn ProjectStore> = Arc::new(InMemoryProjectStore::new());
    let control = ProjectControl::put(store.clone(), "analytics")
        .await
        .expect("Failed to create project");

    let stored = control
        .insert_revision(&revision("v1"))
        .await
        .expect("Failed to insert revision");
    assert_eq!(stored.project_id, control.get().id);
    assert_eq!(stored.revision.name, "v1");

    control
        .insert_revision_archive_data(stored.id, b"archive-bytes".to_vec())
        .await
        .expect("Failed to insert archive data");

    let data = store
        .get_revision_archive_data(stored.id)
        .await
        .expect("Failed to read archive data");
    assert_eq!(data, Some(b"archive-bytes".to_vec()));

    let fetched = store
        .get_revision(stored.id)
        .await
        .expect("Failed to read revision")
        .expect("Revision must exist");
    assert_eq!(fetched, stored);
}

#[tokio::test]
async fn test_duplicate_revision_name_conflicts() {
    let store: Arc<dyn ProjectStore> = Arc::new(InMemoryProjectStore::new());
    let control = ProjectControl::put(store, "analytics")
        .await
        .expect("Failed to create project");

    control
        .insert_revision(&revision("v1"))
        .await
        .expect("First insert must succeed");

    match control.insert_revision(&revision("v1")).await {
        Err(StoreError::Conflict(msg)) => assert!(msg.contains("v1")),
        other => panic!("Expected conflict, got {:?}", other.map(|r| r.revision.name)),
    }
}

#[tokio::test]
async fn test_archive_data_is_write_once() {
    let store: Arc<dyn ProjectStore> = Arc::new(InMemoryProjectStore::new());
    let control = ProjectControl::put(store, "analytics")
        .await
        .expect("Failed to create project");
    let stored = control
        .insert_revision(&revision("v1"))
        .await
        .expect("Failed to insert revision");

    control
        .insert_revision_archive_data(stored.id, vec![1, 2, 3])
        .await
        .expect("First write must succeed");
    let second = control
        .insert_revision_archive_data(stored.id, vec![4, 5, 6])
        .await;
    assert!(matches!(second, Err(StoreError::Conflict(_))));
}

#[tokio::test]
async fn test_put_project_is_idempotent() {
    let store: Arc<dyn ProjectStore> = Arc::new(InMemoryProjectStore::new());
    let first = ProjectControl::put(store.clone(), "analytics")
        .await
        .expect("Failed to create project");
    let second = ProjectControl::put(store, "analytics")
        .await
        .expect("Lookup must succeed");

    assert_eq!(first.get().id, second.get().id);
}

#[tokio::test]
async fn test_insert_workflow_definitions_updates_schedules() {
    let store: Arc<dyn ProjectStore> = Arc::new(InMemoryProjectStore::new());
    let control = ProjectControl::put(store.clone(), "analytics")
        .await
        .expect("Failed to create project");
    let stored_revision = control
        .insert_revision(&revision("v1"))
        .await
        .expect("Failed to insert revision");

    // One definition with a schedule, one without
    let scheduled = WorkflowBuilder::new("hourly-sync").schedule_every(3600).build();
    let unscheduled = WorkflowBuilder::new("on-demand").build();
    let defs = vec![
        WorkflowDef::of(scheduled, "UTC"),
        WorkflowDef::of(unscheduled, "UTC"),
    ];

    let now = Utc::now();
    let stored_defs = control
        .insert_workflow_definitions(&stored_revision, &defs, &IntervalSchedulerLookup, now)
        .await
        .expect("Failed to insert definitions");
    assert_eq!(stored_defs.len(), 2);

    let schedules = store
        .get_schedules(control.get().id)
        .await
        .expect("Failed to read schedules");
    assert_eq!(schedules.len(), 1);
    assert_eq!(schedules[0].workflow_name, "hourly-sync");
    assert_eq!(schedules[0].workflow_def_id, stored_defs[0].id);
    // First run sits on the next whole interval boundary after `now`
    assert!(schedules[0].next_run_time > now);
    assert_eq!(schedules[0].next_run_time.timestamp() % 3600, 0);
}

#[tokio::test]
async fn test_duplicate_workflow_name_in_revision_conflicts() {
    let store: Arc<dyn ProjectStore> = Arc::new(InMemoryProjectStore::new());
    let control = ProjectControl::put(store, "analytics")
        .await
        .expect("Failed to create project");
    let stored_revision = control
        .insert_revision(&revision("v1"))
        .await
        .expect("Failed to insert revision");

    let defs = vec![
        WorkflowDef::of(WorkflowBuilder::new("sync").build(), "UTC"),
        WorkflowDef::of(WorkflowBuilder::new("sync").build(), "UTC"),
    ];

    let result = control
        .insert_workflow_definitions(&stored_revision, &defs, &NoSchedulerLookup, Utc::now())
        .await;
    assert!(matches!(result, Err(StoreError::Conflict(_))));
}

#[tokio::test]
async fn test_definitions_without_schedules_leave_schedule_table_empty() {
    let store: Arc<dyn ProjectStore> = Arc::new(InMemoryProjectStore::new());
    let control = ProjectControl::put(store.clone(), "analytics")
        .await
        .expect("Failed to create project");
    let stored_revision = control
        .insert_revision(&revision("v1"))
        .await
        .expect("Failed to insert revision");

    let defs = vec![WorkflowDef::of(
        WorkflowBuilder::new("hourly-sync").schedule_every(3600).build(),
        "UTC",
    )];
    control
        .insert_workflow_definitions(&stored_revision, &defs, &NoSchedulerLookup, Utc::now())
        .await
        .expect("Failed to insert definitions");

    let schedules = store
        .get_schedules(control.get().id)
        .await
        .expect("Failed to read schedules");
    assert!(schedules.is_empty());
}
