use crate::workflow::WorkflowTask;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// 任务全名解析器
/// Reconstructs every task's fully qualified name from parent references.
/// Full names are plain concatenations: the parent's full name immediately
/// followed by the task's own fragment, no separator inserted.
pub struct TaskFullNameResolver<'a> {
    tasks: &'a [WorkflowTask],
}

impl<'a> TaskFullNameResolver<'a> {
    pub fn new(tasks: &'a [WorkflowTask]) -> TaskFullNameResolver<'a> {
        TaskFullNameResolver { tasks }
    }

    /// Build the full-name table for one matching call.
    ///
    /// The table preserves the order in which tasks first appear in the input
    /// list. If two tasks concatenate to the same full name, the later one
    /// overwrites the earlier in place (last write wins, no error) and the
    /// overwritten task is invisible to matching.
    pub fn resolve(&self) -> Vec<(String, &'a WorkflowTask)> {
        // Parents always precede children, so a single in-order pass computes
        // each full name exactly once, reusing the parent's cached name.
        let mut full_names: Vec<String> = Vec::with_capacity(self.tasks.len());
        for task in self.tasks {
            let full_name = match task.parent_index {
                Some(parent) => format!("{}{}", full_names[parent], task.name),
                None => task.name.clone(),
            };
            full_names.push(full_name);
        }

        let mut table: Vec<(String, &WorkflowTask)> = Vec::with_capacity(self.tasks.len());
        let mut positions: HashMap<String, usize> = HashMap::with_capacity(self.tasks.len());
        for (task, full_name) in self.tasks.iter().zip(full_names) {
            match positions.entry(full_name) {
                Entry::Occupied(slot) => {
                    table[*slot.get()].1 = task;
                }
                Entry::Vacant(slot) => {
                    let full_name = slot.key().clone();
                    slot.insert(table.len());
                    table.push((full_name, task));
                }
            }
        }
        table
    }
}
