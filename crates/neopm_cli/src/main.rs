//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open a store directory, seed the demo plan when it holds no project,
//!   and print every project with its tasks.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `neopm_cli <store-dir> [log-dir]`.

use log::info;
use neopm_core::{
    core_version, default_log_level, init_logging, ModelResult, NodeEntity, Project, StoreManager,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let Some(store_dir) = args.next() else {
        eprintln!("usage: neopm_cli <store-dir> [log-dir]");
        return ExitCode::from(2);
    };
    if let Some(log_dir) = args.next() {
        if let Err(err) = init_logging(default_log_level(), &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    println!("neopm_core version={}", core_version());
    match run(&store_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(store_dir: &str) -> ModelResult<()> {
    let manager = StoreManager::open(store_dir)?;
    if manager.all_projects().next().is_none() {
        let project = manager.populate_db()?;
        info!(
            "event=cli_seed module=cli status=ok project_id={}",
            project.id()
        );
    }

    for project in manager.all_projects() {
        print_project(&project?, 0)?;
    }
    manager.close()
}

fn print_project(project: &Project<'_>, depth: usize) -> ModelResult<()> {
    let indent = "  ".repeat(depth);
    println!("{indent}project {} {}", project.id(), project.name()?);
    for task in project.all_tasks() {
        let task = task?;
        let duration = task
            .duration_in_minutes()?
            .map_or_else(|| "-".to_string(), |minutes| format!("{minutes}m"));
        let dependencies = task
            .dependencies()
            .map(|dependency| dependency.and_then(|dependency| dependency.name()))
            .collect::<ModelResult<Vec<_>>>()?;
        println!(
            "{indent}  task {} {} duration={} after=[{}]",
            task.id(),
            task.name()?,
            duration,
            dependencies.join(", ")
        );
    }
    for sub_project in project.sub_projects() {
        print_project(&sub_project?, depth + 1)?;
    }
    Ok(())
}
