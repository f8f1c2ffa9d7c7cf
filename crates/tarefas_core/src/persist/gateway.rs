//! Persistence gateway between the task list and one storage slot.
//!
//! # Responsibility
//! - Encode the full task list into a single JSON slot and decode it back.
//! - Report every outcome to a `PersistObserver` as a structured result.
//!
//! # Invariants
//! - Saves overwrite the whole slot; there are no partial writes.
//! - `load` never fails: read or decode failures degrade to an empty list.
//! - Persisted entries that violate task invariants reject the whole slot.

use crate::model::task::{TaskList, TaskValidationError};
use crate::persist::kv::{KeyValueStore, StorageError};
use log::{debug, error};
use serde_json::error::Category;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Slot key holding the serialized task list. Stable across releases.
pub const TASKS_SLOT_KEY: &str = "tarefas";

pub type PersistResult<T> = Result<T, PersistError>;

/// Gateway operation kind, used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOp {
    Load,
    Save,
    Clear,
}

impl PersistOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Save => "save",
            Self::Clear => "clear",
        }
    }
}

/// Failure reason for a persistence operation.
#[derive(Debug)]
pub enum PersistError {
    Storage(StorageError),
    Encode(serde_json::Error),
    Decode(serde_json::Error),
    InvalidData(TaskValidationError),
    /// The background writer is no longer accepting jobs.
    WriterStopped,
    WriterSpawn(std::io::Error),
}

impl PersistError {
    /// Stable machine-readable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Storage(_) => "storage_failed",
            Self::Encode(_) => "encode_failed",
            Self::Decode(_) => "decode_failed",
            Self::InvalidData(_) => "invalid_data",
            Self::WriterStopped => "writer_stopped",
            Self::WriterSpawn(_) => "writer_spawn_failed",
        }
    }
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode task list: {}", json_location(err)),
            Self::Decode(err) => write!(f, "failed to decode task list: {}", json_location(err)),
            Self::InvalidData(err) => write!(f, "invalid persisted task data: {err}"),
            Self::WriterStopped => write!(f, "persistence writer has stopped"),
            Self::WriterSpawn(err) => write!(f, "failed to start persistence writer: {err}"),
        }
    }
}

/// Describes a serde_json failure by category and position only.
///
/// serde_json messages quote offending values, which may be task text.
fn json_location(err: &serde_json::Error) -> String {
    let category = match err.classify() {
        Category::Io => "io",
        Category::Syntax => "syntax",
        Category::Data => "data",
        Category::Eof => "eof",
    };
    format!(
        "{category} error at line {} column {}",
        err.line(),
        err.column()
    )
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Encode(err) | Self::Decode(err) => Some(err),
            Self::InvalidData(err) => Some(err),
            Self::WriterStopped => None,
            Self::WriterSpawn(err) => Some(err),
        }
    }
}

impl From<StorageError> for PersistError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<TaskValidationError> for PersistError {
    fn from(value: TaskValidationError) -> Self {
        Self::InvalidData(value)
    }
}

/// Receives persistence outcomes.
///
/// Implementations must be cheap; they run on the thread doing the I/O.
pub trait PersistObserver: Send + Sync {
    fn on_success(&self, _op: PersistOp, _task_count: usize, _elapsed: Duration) {}
    fn on_failure(&self, op: PersistOp, error: &PersistError);
}

/// Default observer that writes log events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl PersistObserver for LogObserver {
    fn on_success(&self, op: PersistOp, task_count: usize, elapsed: Duration) {
        debug!(
            "event=tasks_{} module=persist status=ok count={} duration_ms={}",
            op.as_str(),
            task_count,
            elapsed.as_millis()
        );
    }

    fn on_failure(&self, op: PersistOp, error: &PersistError) {
        error!(
            "event=tasks_{} module=persist status=error error_code={} error={}",
            op.as_str(),
            error.code(),
            error
        );
    }
}

/// Reads and writes the task list through one named slot.
pub struct PersistenceGateway<S> {
    store: S,
    key: String,
    observer: Arc<dyn PersistObserver>,
}

impl<S: KeyValueStore> PersistenceGateway<S> {
    /// Creates a gateway on the default slot key with log reporting.
    pub fn new(store: S) -> Self {
        Self {
            store,
            key: TASKS_SLOT_KEY.to_string(),
            observer: Arc::new(LogObserver),
        }
    }

    /// Overrides the slot key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Replaces the outcome observer.
    pub fn with_observer(mut self, observer: Arc<dyn PersistObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Restores the list, degrading to empty on any failure.
    ///
    /// Failures are reported to the observer and never surface to callers.
    pub fn load(&self) -> TaskList {
        self.try_load().unwrap_or_default()
    }

    /// Restores the list and exposes failures.
    ///
    /// An absent slot yields an empty list.
    pub fn try_load(&self) -> PersistResult<TaskList> {
        self.observe(PersistOp::Load, |gateway| {
            let tasks = match gateway.store.get(&gateway.key)? {
                Some(raw) => decode(&raw)?,
                None => TaskList::new(),
            };
            let count = tasks.len();
            Ok((tasks, count))
        })
    }

    /// Overwrites the slot with the full list.
    pub fn save(&self, tasks: &TaskList) -> PersistResult<()> {
        self.observe(PersistOp::Save, |gateway| {
            let raw = serde_json::to_string(tasks).map_err(PersistError::Encode)?;
            gateway.store.set(&gateway.key, &raw)?;
            Ok(((), tasks.len()))
        })
    }

    /// Removes the slot outright.
    pub fn clear(&self) -> PersistResult<()> {
        self.observe(PersistOp::Clear, |gateway| {
            gateway.store.remove(&gateway.key)?;
            Ok(((), 0))
        })
    }

    fn observe<T>(
        &self,
        op: PersistOp,
        run: impl FnOnce(&Self) -> PersistResult<(T, usize)>,
    ) -> PersistResult<T> {
        let started_at = Instant::now();
        match run(self) {
            Ok((value, count)) => {
                self.observer.on_success(op, count, started_at.elapsed());
                Ok(value)
            }
            Err(err) => {
                self.observer.on_failure(op, &err);
                Err(err)
            }
        }
    }
}

fn decode(raw: &str) -> PersistResult<TaskList> {
    let tasks: TaskList = serde_json::from_str(raw).map_err(PersistError::Decode)?;
    tasks.validate()?;
    Ok(tasks)
}
