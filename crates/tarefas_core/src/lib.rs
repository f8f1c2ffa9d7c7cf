//! Core state and persistence for the Tarefas to-do list.
//! This crate is the single source of truth for task-list invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod persist;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::task::{Task, TaskId, TaskList, TaskValidationError};
pub use persist::gateway::{
    LogObserver, PersistError, PersistObserver, PersistOp, PersistResult, PersistenceGateway,
    TASKS_SLOT_KEY,
};
pub use persist::kv::{KeyValueStore, MemoryKvStore, SqliteKvStore, StorageError, StorageResult};
pub use persist::writer::{PersistPolicy, PersistWriter, SaveTicket, WriteOutcome, WriteStatus};
pub use service::task_service::{TaskService, TaskUpdate};
pub use store::task_store::{reduce, Notice, PersistIntent, TaskAction, TaskStore, Transition};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
