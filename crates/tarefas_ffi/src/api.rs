//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the task list screen's operations to Dart via FRB.
//! - Own the process-wide task service behind a lock.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Storage failures never produce a user alert; only blank input does.

use log::error;
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::sync::Mutex;
use tarefas_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Notice, PersistPolicy, PersistenceGateway, SqliteKvStore, TaskId, TaskList, TaskService,
    TaskUpdate,
};

const TASKS_DB_FILE_NAME: &str = "tarefas.sqlite3";
const TASKS_DB_PATH_ENV: &str = "TAREFAS_DB_PATH";

static TASK_SERVICE: OnceCell<Mutex<TaskService<SqliteKvStore>>> = OnceCell::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One row of the task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    /// Stable task ID; pass back to `task_delete`.
    pub id: String,
    pub text: String,
}

/// Blocking notice the UI shows as an alert dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskAlert {
    pub title: String,
    pub message: String,
}

/// Response envelope for every task list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    /// Whether the service could be reached.
    pub ok: bool,
    /// Current tasks in display order.
    pub items: Vec<TaskItem>,
    /// Present only when user input was rejected.
    pub alert: Option<TaskAlert>,
    /// Human-readable message for diagnostics.
    pub message: String,
}

impl TaskListResponse {
    fn from_tasks(tasks: &TaskList, notice: Option<Notice>) -> Self {
        let items = tasks
            .iter()
            .map(|task| TaskItem {
                id: task.id.to_string(),
                text: task.text.clone(),
            })
            .collect::<Vec<_>>();
        let message = if items.is_empty() {
            "No tasks.".to_string()
        } else {
            format!("{} task(s).", items.len())
        };
        Self {
            ok: true,
            items,
            alert: notice.map(|notice| TaskAlert {
                title: notice.title().to_string(),
                message: notice.message().to_string(),
            }),
            message,
        }
    }

    fn from_update(update: TaskUpdate) -> Self {
        // Persistence runs on the writer thread; the ticket is not awaited.
        Self::from_tasks(&update.tasks, update.notice)
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            alert: None,
            message: message.into(),
        }
    }
}

/// Returns the current task list, restoring it from storage on first call.
///
/// # FFI contract
/// - Sync call; first call opens the local database.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_load() -> TaskListResponse {
    match with_task_service(|service| TaskListResponse::from_tasks(service.tasks(), None)) {
        Ok(response) => response,
        Err(err) => TaskListResponse::failure(format!("tasks_load failed: {err}")),
    }
}

/// Appends a task; blank input returns an alert and changes nothing.
#[flutter_rust_bridge::frb(sync)]
pub fn task_add(text: String) -> TaskListResponse {
    match with_task_service(|service| TaskListResponse::from_update(service.add(&text))) {
        Ok(response) => response,
        Err(err) => TaskListResponse::failure(format!("task_add failed: {err}")),
    }
}

/// Deletes a task by ID; unknown IDs are a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(id: String) -> TaskListResponse {
    let id = TaskId::from(id);
    match with_task_service(|service| TaskListResponse::from_update(service.delete(&id))) {
        Ok(response) => response,
        Err(err) => TaskListResponse::failure(format!("task_delete failed: {err}")),
    }
}

/// Removes every task and the stored slot.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_clear() -> TaskListResponse {
    match with_task_service(|service| TaskListResponse::from_update(service.clear())) {
        Ok(response) => response,
        Err(err) => TaskListResponse::failure(format!("tasks_clear failed: {err}")),
    }
}

/// Blocks until every scheduled save has reached storage.
///
/// The service lives for the whole process and is never dropped, so the
/// host should call this before the app is suspended or terminated.
///
/// # FFI contract
/// - Sync call; may block on disk I/O.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_flush() -> String {
    // The lock is released before waiting so the writer never blocks callers.
    let ticket = match with_task_service(|service| service.flush()) {
        Ok(ticket) => ticket,
        Err(err) => return format!("tasks_flush failed: {err}"),
    };
    match ticket.wait() {
        Ok(_) => String::new(),
        Err(err) => format!("tasks_flush failed: {err}"),
    }
}

fn resolve_tasks_db_path() -> PathBuf {
    if let Ok(raw) = std::env::var(TASKS_DB_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(TASKS_DB_FILE_NAME)
}

fn open_task_service() -> Result<Mutex<TaskService<SqliteKvStore>>, String> {
    let db_path = resolve_tasks_db_path();
    let store = SqliteKvStore::open(&db_path).map_err(|err| {
        error!(
            "event=service_open module=ffi status=error error_code=db_open_failed error={err}"
        );
        format!("tasks DB open failed: {err}")
    })?;
    let service = TaskService::open(PersistenceGateway::new(store), PersistPolicy::Background)
        .map_err(|err| format!("task service start failed: {err}"))?;
    Ok(Mutex::new(service))
}

fn with_task_service<T>(
    f: impl FnOnce(&mut TaskService<SqliteKvStore>) -> T,
) -> Result<T, String> {
    let service = TASK_SERVICE.get_or_try_init(open_task_service)?;
    let mut guard = service
        .lock()
        .map_err(|_| "task service lock poisoned".to_string())?;
    Ok(f(&mut *guard))
}
