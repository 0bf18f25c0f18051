use serde::{Serialize, Deserialize};
use serde_json::Value;

pub type TaskIndex = usize;

/// 编译后的工作流 (扁平化任务列表，可序列化)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompiledWorkflow {
    pub name: String,
    pub tasks: Vec<WorkflowTask>,
}

/// 扁平化任务
/// `index` equals the task's position in the list. `parent_index`, when
/// present, always refers to an earlier position: the compiler emits parents
/// before their children, and the name resolver relies on that ordering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowTask {
    pub index: TaskIndex,
    pub parent_index: Option<TaskIndex>,
    /// Address fragment of this task (e.g. "+extract"). Full names are plain
    /// concatenations of ancestor fragments, so the marker stays in the name.
    pub name: String,
    /// Task configuration payload. Opaque to the matching core.
    pub config: Value,
}

impl CompiledWorkflow {
    pub fn tasks(&self) -> &[WorkflowTask] {
        &self.tasks
    }
}
