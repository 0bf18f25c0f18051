pub mod error;
pub mod resolver;

use crate::matcher::error::{MatchError, SyntaxError};
use crate::matcher::resolver::TaskFullNameResolver;
use crate::workflow::{TaskIndex, WorkflowTask};

// Some symbols are allowed to be inside a task name fragment:
// allowed: - = [ ] { } % & @ , . _
// The compiler enforces the same set when it validates task names.
const NAME_SYMBOLS: &[char] = &['-', '=', '[', ']', '{', '}', '%', '&', '@', ',', '.', '_'];

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True for every character permitted in a raw task name.
pub fn is_raw_task_name_char(c: char) -> bool {
    is_word_char(c) || NAME_SYMBOLS.contains(&c)
}

/// Classification of a single matching call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Exactly one task's full name matched; carries its index.
    Unique(TaskIndex),
    NoMatch,
    /// Two or more full names matched. The mapping holds every hit as
    /// (index, full name), in the order tasks appear in the input list.
    Ambiguous(Vec<(TaskIndex, String)>),
}

/// 已编译的任务匹配模式
/// Immutable once compiled; safe to share and reuse across task lists.
#[derive(Debug, Clone)]
pub struct TaskMatchPattern {
    pattern: String,
    fragments: Vec<String>,
}

impl TaskMatchPattern {
    pub fn compile(pattern: &str) -> Result<TaskMatchPattern, SyntaxError> {
        let fragments = split_fragments(pattern);
        if fragments.is_empty() {
            return Err(SyntaxError::NoFragments {
                pattern: pattern.to_string(),
            });
        }
        for fragment in &fragments {
            // A one-character fragment would be a direct-child shorthand
            // (+name+name addressing only immediate children), which this
            // matcher does not support. Reject at compile time.
            if fragment.chars().count() == 1 {
                return Err(SyntaxError::DirectChildFragment {
                    pattern: pattern.to_string(),
                });
            }
        }
        Ok(TaskMatchPattern {
            pattern: pattern.to_string(),
            fragments,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Fragments produced by the delimiter rule. Only used for validation;
    /// matching itself treats the whole pattern as one literal suffix.
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    // Same as full_name.endsWith(pattern): an arbitrary prefix followed by
    // the pattern text taken literally. No wildcard expansion of the pattern.
    fn matches(&self, full_name: &str) -> bool {
        full_name.ends_with(&self.pattern)
    }

    /// Match against a task list and classify the result.
    pub fn evaluate(&self, tasks: &[WorkflowTask]) -> MatchOutcome {
        let mut all = self.find_all(tasks);
        if all.len() == 1 {
            let (index, _) = all.remove(0);
            MatchOutcome::Unique(index)
        } else if all.is_empty() {
            MatchOutcome::NoMatch
        } else {
            MatchOutcome::Ambiguous(all)
        }
    }

    /// Exception-style variant of [`evaluate`](Self::evaluate): returns the
    /// unique index or fails with the classified error.
    pub fn find_index(&self, tasks: &[WorkflowTask]) -> Result<TaskIndex, MatchError> {
        match self.evaluate(tasks) {
            MatchOutcome::Unique(index) => Ok(index),
            MatchOutcome::NoMatch => Err(MatchError::NoMatch {
                pattern: self.pattern.clone(),
            }),
            MatchOutcome::Ambiguous(matches) => Err(MatchError::Ambiguous {
                pattern: self.pattern.clone(),
                matches,
            }),
        }
    }

    fn find_all(&self, tasks: &[WorkflowTask]) -> Vec<(TaskIndex, String)> {
        let full_names = TaskFullNameResolver::new(tasks).resolve();
        let mut hits = Vec::new();
        for (full_name, task) in full_names {
            if self.matches(&full_name) {
                hits.push((task.index, full_name));
            }
        }
        hits
    }
}

// The delimiter rule: a zero-width split boundary sits immediately before
// every character that is neither a word character nor an allowed name
// symbol. The boundary character itself stays in the following fragment.
// A boundary at position 0 would produce a leading empty fragment; drop it.
fn split_fragments(pattern: &str) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut start = 0;
    for (pos, c) in pattern.char_indices() {
        if !is_raw_task_name_char(c) && pos > start {
            fragments.push(pattern[start..pos].to_string());
            start = pos;
        }
    }
    if start < pattern.len() {
        fragments.push(pattern[start..].to_string());
    }
    fragments
}
