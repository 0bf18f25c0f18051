use crate::repository::{StoredRevision, StoredWorkflowDef};
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use uuid::Uuid;

/// A workflow's next execution slot: the nominal schedule time and the
/// wall-clock time the run should actually start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleTime {
    pub schedule_time: DateTime<Utc>,
    pub run_time: DateTime<Utc>,
}

impl ScheduleTime {
    pub fn of(schedule_time: DateTime<Utc>, run_time: DateTime<Utc>) -> ScheduleTime {
        ScheduleTime { schedule_time, run_time }
    }
}

/// Persisted schedule row for one workflow definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Schedule {
    pub workflow_name: String,
    pub workflow_def_id: Uuid,
    pub next_run_time: DateTime<Utc>,
    pub next_schedule_time: DateTime<Utc>,
}

impl Schedule {
    pub fn of(
        workflow_name: &str,
        workflow_def_id: Uuid,
        next_run_time: DateTime<Utc>,
        next_schedule_time: DateTime<Utc>,
    ) -> Schedule {
        Schedule {
            workflow_name: workflow_name.to_string(),
            workflow_def_id,
            next_run_time,
            next_schedule_time,
        }
    }
}

pub trait Scheduler: Send + Sync {
    fn first_schedule_time(&self, current_time: DateTime<Utc>) -> ScheduleTime;
}

/// Looks up the scheduler for a stored workflow definition, if it has one.
/// Definitions without schedule configuration yield `None` and simply never
/// appear in the schedule table.
pub trait SchedulerLookup: Send + Sync {
    fn try_get_scheduler(
        &self,
        revision: &StoredRevision,
        def: &StoredWorkflowDef,
    ) -> Option<Box<dyn Scheduler>>;
}

/// Fixed-interval scheduler: fires at whole multiples of the interval since
/// the Unix epoch.
pub struct IntervalScheduler {
    interval_seconds: u64,
}

impl IntervalScheduler {
    pub fn new(interval_seconds: u64) -> IntervalScheduler {
        IntervalScheduler {
            interval_seconds: interval_seconds.max(1),
        }
    }
}

impl Scheduler for IntervalScheduler {
    fn first_schedule_time(&self, current_time: DateTime<Utc>) -> ScheduleTime {
        let interval = self.interval_seconds as i64;
        let next = (current_time.timestamp().div_euclid(interval) + 1) * interval;
        let time = DateTime::from_timestamp(next, 0).unwrap_or(current_time);
        ScheduleTime::of(time, time)
    }
}

/// Scheduler lookup driven by the definition's own `schedule:` block.
pub struct IntervalSchedulerLookup;

impl SchedulerLookup for IntervalSchedulerLookup {
    fn try_get_scheduler(
        &self,
        _revision: &StoredRevision,
        def: &StoredWorkflowDef,
    ) -> Option<Box<dyn Scheduler>> {
        def.def
            .source
            .schedule
            .as_ref()
            .map(|spec| Box::new(IntervalScheduler::new(spec.interval_seconds)) as Box<dyn Scheduler>)
    }
}

/// Lookup that schedules nothing. Useful when pushing definitions whose
/// schedules are managed elsewhere.
pub struct NoSchedulerLookup;

impl SchedulerLookup for NoSchedulerLookup {
    fn try_get_scheduler(
        &self,
        _revision: &StoredRevision,
        _def: &StoredWorkflowDef,
    ) -> Option<Box<dyn Scheduler>> {
        None
    }
}
