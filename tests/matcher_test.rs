use trakt::matcher::{MatchOutcome, TaskMatchPattern};
use trakt::matcher::error::MatchError;
use trakt::workflow::{TaskIndex, WorkflowTask};
use serde_json::json;

fn task(index: TaskIndex, parent_index: Option<TaskIndex>, name: &str) -> WorkflowTask {
    WorkflowTask {
        index,
        parent_index,
        name: name.to_string(),
        config: json!({}),
    }
}

// Full names: +a, +a+b, +a+c, +x, +x+b
fn sample_tasks() -> Vec<WorkflowTask> {
    vec![
        task(0, None, "+a"),
        task(1, Some(0), "+b"),
        task(2, Some(0), "+c"),
        task(3, None, "+x"),
        task(4, Some(3), "+b"),
    ]
}

#[test]
fn test_fully_qualified_pattern_matches_uniquely() {
    let tasks = sample_tasks();
    let pattern = TaskMatchPattern::compile("+a+b").expect("Compilation failed");

    assert_eq!(pattern.evaluate(&tasks), MatchOutcome::Unique(1));
    assert_eq!(pattern.find_index(&tasks).expect("Must match"), 1);
}

#[test]
fn test_suffix_pattern_with_two_hits_is_ambiguous() {
    let tasks = sample_tasks();
    let pattern = TaskMatchPattern::compile("+b").expect("Compilation failed");

    let outcome = pattern.evaluate(&tasks);
    assert_eq!(
        outcome,
        MatchOutcome::Ambiguous(vec![(1, "+a+b".to_string()), (4, "+x+b".to_string())])
    );

    match pattern.find_index(&tasks) {
        Err(MatchError::Ambiguous { pattern, matches }) => {
            assert_eq!(pattern, "+b");
            // The payload carries every hit, in input list order
            assert_eq!(matches, vec![(1, "+a+b".to_string()), (4, "+x+b".to_string())]);
        }
        other => panic!("Expected ambiguous match, got {:?}", other),
    }
}

#[test]
fn test_ambiguous_payload_is_complete_beyond_two_hits() {
    let mut tasks = sample_tasks();
    tasks.push(task(5, None, "+y"));
    tasks.push(task(6, Some(5), "+b"));

    let pattern = TaskMatchPattern::compile("+b").expect("Compilation failed");
    match pattern.find_index(&tasks) {
        Err(MatchError::Ambiguous { matches, .. }) => {
            assert_eq!(
                matches,
                vec![
                    (1, "+a+b".to_string()),
                    (4, "+x+b".to_string()),
                    (6, "+y+b".to_string()),
                ]
            );
        }
        other => panic!("Expected ambiguous match, got {:?}", other),
    }
}

#[test]
fn test_no_match() {
    let tasks = sample_tasks();
    let pattern = TaskMatchPattern::compile("+nonexistent").expect("Compilation failed");

    assert_eq!(pattern.evaluate(&tasks), MatchOutcome::NoMatch);
    match pattern.find_index(&tasks) {
        Err(MatchError::NoMatch { pattern }) => assert_eq!(pattern, "+nonexistent"),
        other => panic!("Expected no match, got {:?}", other),
    }
}

#[test]
fn test_pattern_is_a_literal_suffix_not_a_wildcard() {
    // Nothing in the pattern text is treated specially; ".b" only matches a
    // full name that literally ends with ".b".
    let tasks = vec![
        task(0, None, "+wf"),
        task(1, Some(0), "+x.b"),
        task(2, Some(0), "+xzb"),
    ];

    let pattern = TaskMatchPattern::compile(".b").expect("Compilation failed");
    assert_eq!(pattern.evaluate(&tasks), MatchOutcome::Unique(1));
}

#[test]
fn test_compiled_pattern_is_reusable_across_task_lists() {
    let pattern = TaskMatchPattern::compile("+load").expect("Compilation failed");

    let first = vec![task(0, None, "+etl"), task(1, Some(0), "+load")];
    let second = vec![
        task(0, None, "+report"),
        task(1, Some(0), "+load"),
        task(2, Some(0), "+send"),
    ];

    assert_eq!(pattern.evaluate(&first), MatchOutcome::Unique(1));
    assert_eq!(pattern.evaluate(&second), MatchOutcome::Unique(1));
    // And again, same classification
    assert_eq!(pattern.evaluate(&first), MatchOutcome::Unique(1));
}

#[test]
fn test_matching_ignores_task_config() {
    let tasks = vec![
        task(0, None, "+wf"),
        WorkflowTask {
            index: 1,
            parent_index: Some(0),
            name: "+job".to_string(),
            config: json!({"retries": 3, "command": "echo hi"}),
        },
    ];

    let pattern = TaskMatchPattern::compile("+job").expect("Compilation failed");
    assert_eq!(pattern.evaluate(&tasks), MatchOutcome::Unique(1));
}
