//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `tarefas_core` linkage without the Flutter runtime.
//! - Optionally report what a slot database currently holds.
//!
//! Usage: `tarefas_cli [DB_PATH]`

use std::process::ExitCode;
use tarefas_core::{PersistenceGateway, SqliteKvStore};

fn main() -> ExitCode {
    println!("tarefas_core ping={}", tarefas_core::ping());
    println!("tarefas_core version={}", tarefas_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    let store = match SqliteKvStore::open(&db_path) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("failed to open `{db_path}`: {err}");
            return ExitCode::FAILURE;
        }
    };
    let gateway = PersistenceGateway::new(store);
    match gateway.try_load() {
        Ok(tasks) => {
            println!("slot={} tasks={}", gateway.key(), tasks.len());
            for task in &tasks {
                println!("{}\t{}", task.id, task.text);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("slot={} unreadable: {err}", gateway.key());
            ExitCode::FAILURE
        }
    }
}
