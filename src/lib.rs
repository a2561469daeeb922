// src/lib.rs

pub mod cli;
pub mod clock;
pub mod config;
pub mod deadline;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod store;
pub mod types;

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::clock::SystemClock;
use crate::config::{ConfigFile, load_or_default};
use crate::deadline::{DeadlineKey, DeadlineSource, format_deadline};
use crate::errors::BlakerError;
use crate::exec::{Gate, GuardedExecutor, RunRequest};
use crate::store::FileStore;

pub use crate::types::Status;

/// High-level entry point used by `main.rs`.
///
/// Loads config, builds the file-backed deadline source and runs the
/// command through the gate. Returns the exit code the process should exit
/// with.
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_or_default(args.config.as_deref())?;
    let executor = executor_from(&args, &cfg)?;

    if args.dry_run {
        let gate = executor.check().await?;
        print_dry_run(&args, &gate);
        return Ok(0);
    }

    let request = RunRequest::new(args.command.clone(), args.args.clone())
        .wait(args.wait.or(cfg.wait))
        .verbose(args.verbose)
        .no_delay(args.no_delay);

    info!(command = %request.command_line(), "running guarded command");
    let status = executor.run(request).await?;
    debug!(?status, "guarded run finished");

    Ok(status.shell_exit_code())
}

/// Merge CLI overrides into the config and build the executor.
fn executor_from(args: &CliArgs, cfg: &ConfigFile) -> Result<GuardedExecutor> {
    let store_path = args
        .store
        .clone()
        .or_else(|| cfg.store_path.clone())
        .ok_or_else(|| {
            BlakerError::ConfigError(
                "no store configured; pass --store or set [store].path".to_string(),
            )
        })?;

    let mut key: DeadlineKey = cfg.deadline_key.clone();
    if let Some(ref table) = args.table {
        key.table = table.clone();
    }
    if let Some(ref name) = args.key {
        key.key = name.clone();
    }

    debug!(store = ?store_path, table = %key.table, key = %key.key, "deadline source configured");

    let deadlines = DeadlineSource::new(Arc::new(FileStore::new(store_path)), key);
    Ok(GuardedExecutor::new(deadlines, Arc::new(SystemClock)))
}

fn print_dry_run(args: &CliArgs, gate: &Gate) {
    println!("blaker dry-run");
    println!("  command: {}", exec::request::command_line(&args.command, &args.args));
    match gate {
        Gate::Allow { deadline: None } => {
            println!("  break_time: (none)");
            println!("  decision: run");
        }
        Gate::Allow {
            deadline: Some(deadline),
        } => {
            println!("  break_time: {}", format_deadline(deadline));
            println!("  decision: run");
        }
        Gate::Skip { deadline } => {
            println!("  break_time: {}", format_deadline(deadline));
            println!("  decision: skip");
        }
    }
}
