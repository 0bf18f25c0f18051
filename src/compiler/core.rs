use crate::dsl::{WorkflowSource, TaskDef};
use crate::matcher::is_raw_task_name_char;
use crate::workflow::{CompiledWorkflow, TaskIndex, WorkflowTask};
use std::collections::HashSet;
use anyhow::{Result, anyhow};
use tracing::debug;

pub struct Compiler;

impl Compiler {
    pub fn new() -> Self {
        Self
    }

    /// Flatten a nested workflow definition into the ordered, parent-indexed
    /// task list. The root task sits at index 0 and carries the workflow's
    /// own address fragment; children follow depth-first in definition
    /// order, so every `parent_index` refers to an earlier position.
    pub fn compile(&self, source: &WorkflowSource) -> Result<CompiledWorkflow> {
        validate_name(&source.name)
            .map_err(|e| anyhow!("Invalid workflow name '{}': {}", source.name, e))?;

        // 1. Root task
        let mut tasks = Vec::new();
        tasks.push(WorkflowTask {
            index: 0,
            parent_index: None,
            name: format!("+{}", source.name),
            config: serde_json::to_value(&source.params)?,
        });

        // 2. Depth-first flattening
        self.flatten(&source.tasks, 0, &mut tasks)?;

        debug!(workflow = %source.name, tasks = tasks.len(), "compiled workflow");

        Ok(CompiledWorkflow {
            name: source.name.clone(),
            tasks,
        })
    }

    fn flatten(
        &self,
        defs: &[TaskDef],
        parent: TaskIndex,
        tasks: &mut Vec<WorkflowTask>,
    ) -> Result<()> {
        let mut sibling_names: HashSet<&str> = HashSet::new();
        for def in defs {
            validate_name(&def.name)
                .map_err(|e| anyhow!("Invalid task name '{}': {}", def.name, e))?;
            if !sibling_names.insert(&def.name) {
                return Err(anyhow!("Duplicate task name under the same parent: {}", def.name));
            }

            let index = tasks.len();
            tasks.push(WorkflowTask {
                index,
                parent_index: Some(parent),
                name: format!("+{}", def.name),
                config: serde_json::to_value(&def.params)?,
            });
            self.flatten(&def.tasks, index, tasks)?;
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(anyhow!("name must not be empty"));
    }
    for c in name.chars() {
        if !is_raw_task_name_char(c) {
            return Err(anyhow!("character '{}' is not allowed in a name", c));
        }
    }
    Ok(())
}
