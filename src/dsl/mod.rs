pub mod builder;

use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use serde_json::Value;

/// 原始 DSL 定义的工作流 (可从 YAML 反序列化)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowSource {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleSpec>,
    #[serde(default)]
    pub params: HashMap<String, Value>,
    #[serde(default)]
    pub tasks: Vec<TaskDef>,
}

/// 任务定义 (嵌套子任务树)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskDef {
    pub name: String,
    #[serde(default)]
    pub params: HashMap<String, Value>,
    #[serde(default)]
    pub tasks: Vec<TaskDef>,
}

/// 调度配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleSpec {
    pub interval_seconds: u64,
}

impl TaskDef {
    pub fn new(name: &str) -> TaskDef {
        TaskDef {
            name: name.to_string(),
            params: HashMap::new(),
            tasks: Vec::new(),
        }
    }

    pub fn with_param(mut self, key: &str, value: impl Into<Value>) -> TaskDef {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn with_subtask(mut self, child: TaskDef) -> TaskDef {
        self.tasks.push(child);
        self
    }
}
