use crate::dsl::{WorkflowSource, TaskDef, ScheduleSpec};
use std::collections::HashMap;
use serde_json::Value;

pub struct WorkflowBuilder {
    name: String,
    schedule: Option<ScheduleSpec>,
    params: HashMap<String, Value>,
    pub tasks: Vec<TaskDef>, // Made public for manual manipulation in tests if needed
}

impl WorkflowBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            schedule: None,
            params: HashMap::new(),
            tasks: Vec::new(),
        }
    }

    pub fn schedule_every(mut self, interval_seconds: u64) -> Self {
        self.schedule = Some(ScheduleSpec { interval_seconds });
        self
    }

    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// 添加顶层任务 (链式构建参数与子任务)
    pub fn task(self, name: &str) -> TaskBuilder {
        TaskBuilder {
            workflow_builder: self,
            def: TaskDef::new(name),
        }
    }

    /// Add an already-composed subtree (see [`TaskDef::with_subtask`]).
    pub fn subtree(mut self, def: TaskDef) -> Self {
        self.tasks.push(def);
        self
    }

    pub fn build(self) -> WorkflowSource {
        WorkflowSource {
            name: self.name,
            schedule: self.schedule,
            params: self.params,
            tasks: self.tasks,
        }
    }
}

pub struct TaskBuilder {
    workflow_builder: WorkflowBuilder,
    def: TaskDef,
}

impl TaskBuilder {
    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.def.params.insert(key.to_string(), value.into());
        self
    }

    pub fn subtask(mut self, child: TaskDef) -> Self {
        self.def.tasks.push(child);
        self
    }

    pub fn build(mut self) -> WorkflowBuilder {
        self.workflow_builder.tasks.push(self.def);
        self.workflow_builder
    }
}
