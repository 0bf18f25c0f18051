use clap::{Parser, Subcommand};
use trakt::compiler::core::Compiler;
use trakt::compiler::loader::load_workflow_from_yaml;
use trakt::matcher::TaskMatchPattern;
use trakt::matcher::error::MatchError;
use trakt::matcher::resolver::TaskFullNameResolver;
use trakt::repository::control::ProjectControl;
use trakt::repository::redis_storage::RedisProjectStore;
use trakt::repository::storage::{InMemoryProjectStore, ProjectStore};
use trakt::repository::{Revision, WorkflowDef};
use trakt::schedule::IntervalSchedulerLookup;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use anyhow::Result;
use chrono::Utc;
use serde_json::json;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the resolved full names of every task in a workflow file
    Tasks {
        /// Path to the workflow YAML file
        #[arg(long, short)]
        file: PathBuf,
    },

    /// Find the task addressed by a match pattern
    Find {
        /// Path to the workflow YAML file
        #[arg(long, short)]
        file: PathBuf,

        /// Task match pattern (e.g. "+group+task")
        pattern: String,
    },

    /// Push workflow definition files as a new project revision
    Push {
        /// Workflow YAML files to include in the revision
        #[arg(long, short)]
        file: Vec<PathBuf>,

        /// Project name
        #[arg(long)]
        project: String,

        /// Revision name
        #[arg(long)]
        revision: String,

        /// Timezone recorded on each workflow definition
        #[arg(long, default_value = "UTC")]
        timezone: String,

        /// Redis connection URL; omit to validate against an in-memory store
        #[arg(long)]
        redis: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Tasks { file } => {
            let source = load_workflow_from_yaml(&file.to_string_lossy())?;
            let compiled = Compiler::new().compile(&source)?;
            for (full_name, task) in TaskFullNameResolver::new(compiled.tasks()).resolve() {
                println!("{:>4}  {}", task.index, full_name);
            }
        }

        Commands::Find { file, pattern } => {
            // Compile the pattern before touching the file so syntax errors
            // surface immediately.
            let pattern = match TaskMatchPattern::compile(&pattern) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("error: {}", e);
                    process::exit(1);
                }
            };

            let source = load_workflow_from_yaml(&file.to_string_lossy())?;
            let compiled = Compiler::new().compile(&source)?;

            match pattern.find_index(compiled.tasks()) {
                Ok(index) => {
                    let full_names = TaskFullNameResolver::new(compiled.tasks()).resolve();
                    let full_name = full_names
                        .iter()
                        .find(|(_, task)| task.index == index)
                        .map(|(name, _)| name.as_str())
                        .unwrap_or("");
                    println!("{:>4}  {}", index, full_name);
                }
                Err(MatchError::Ambiguous { pattern, matches }) => {
                    eprintln!("Task pattern '{}' is ambiguous. Did you mean:", pattern);
                    for (index, full_name) in matches {
                        eprintln!("{:>4}  {}", index, full_name);
                    }
                    process::exit(1);
                }
                Err(e) => {
                    eprintln!("error: {}", e);
                    process::exit(1);
                }
            }
        }

        Commands::Push { file, project, revision, timezone, redis } => {
            if file.is_empty() {
                anyhow::bail!("At least one --file is required");
            }

            // 1. Load and compile every definition up front. A revision with
            // an uncompilable workflow should never reach the store.
            let mut defs = Vec::with_capacity(file.len());
            let compiler = Compiler::new();
            for path in &file {
                let source = load_workflow_from_yaml(&path.to_string_lossy())?;
                let compiled = compiler.compile(&source)?;
                info!(workflow = %source.name, tasks = compiled.tasks().len(), "compiled workflow");
                defs.push(WorkflowDef::of(source, &timezone));
            }

            // 2. Pick the store backend
            let store: Arc<dyn ProjectStore> = match &redis {
                Some(url) => {
                    let client = redis::Client::open(url.as_str())?;
                    Arc::new(RedisProjectStore::new(client, "trakt".to_string()))
                }
                None => {
                    info!("No --redis given; validating against an in-memory store");
                    Arc::new(InMemoryProjectStore::new())
                }
            };

            // 3. Insert the revision with its definitions and schedules
            let control = ProjectControl::put(store, &project).await?;
            let stored_revision = control
                .insert_revision(&Revision {
                    name: revision,
                    default_params: json!({}),
                    archive_type: "none".to_string(),
                })
                .await?;
            let stored = control
                .insert_workflow_definitions(
                    &stored_revision,
                    &defs,
                    &IntervalSchedulerLookup,
                    Utc::now(),
                )
                .await?;

            println!(
                "Pushed revision '{}' of project '{}' ({} workflow definitions)",
                stored_revision.revision.name,
                control.get().name,
                stored.len()
            );
        }
    }

    Ok(())
}
