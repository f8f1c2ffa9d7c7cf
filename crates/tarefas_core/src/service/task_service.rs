//! Task list use-case service.
//!
//! # Responsibility
//! - Restore persisted tasks once at startup.
//! - Apply user actions to the store, then schedule their persistence.
//!
//! # Invariants
//! - In-memory state changes before persistence is scheduled, and is never
//!   rolled back by a persistence failure.
//! - Storage failures never reach the caller as a user-facing notice.

use crate::model::task::{TaskId, TaskList};
use crate::persist::gateway::{PersistResult, PersistenceGateway};
use crate::persist::kv::KeyValueStore;
use crate::persist::writer::{PersistPolicy, PersistWriter, SaveTicket};
use crate::store::task_store::{Notice, TaskAction, TaskStore};
use log::{debug, info};

/// Result of one user action.
#[derive(Debug)]
pub struct TaskUpdate {
    /// Snapshot of the list after the action.
    pub tasks: TaskList,
    /// Warning to show the user, if the action was rejected.
    pub notice: Option<Notice>,
    /// Pending persistence for this action; drop it for fire-and-forget.
    pub ticket: Option<SaveTicket>,
}

/// Use-case service owning the task state and its persistence writer.
pub struct TaskService<S: KeyValueStore + Send + 'static> {
    store: TaskStore,
    writer: PersistWriter<S>,
}

impl<S: KeyValueStore + Send + 'static> TaskService<S> {
    /// Loads persisted tasks through `gateway` and starts the writer.
    ///
    /// A failed load degrades to an empty list; only a writer start failure
    /// is returned.
    pub fn open(gateway: PersistenceGateway<S>, policy: PersistPolicy) -> PersistResult<Self> {
        let mut store = TaskStore::new();
        store.hydrate(gateway.load());
        info!(
            "event=tasks_restore module=service status=ok count={}",
            store.tasks().len()
        );

        let writer = PersistWriter::start(gateway, policy)?;
        Ok(Self { store, writer })
    }

    pub fn tasks(&self) -> &TaskList {
        self.store.tasks()
    }

    pub fn policy(&self) -> PersistPolicy {
        self.writer.policy()
    }

    /// Appends a task built from `text`.
    ///
    /// Blank input leaves state untouched and returns `Notice::EmptyText`.
    pub fn add(&mut self, text: &str) -> TaskUpdate {
        self.dispatch(TaskAction::Add(text.to_string()))
    }

    /// Removes the task with `id`; an unknown id is a no-op.
    pub fn delete(&mut self, id: &TaskId) -> TaskUpdate {
        self.dispatch(TaskAction::Delete(id.clone()))
    }

    /// Empties the list and removes the storage slot.
    pub fn clear(&mut self) -> TaskUpdate {
        self.dispatch(TaskAction::Clear)
    }

    /// Applies `action` and schedules any persistence it requires.
    pub fn dispatch(&mut self, action: TaskAction) -> TaskUpdate {
        let action_name = action_name(&action);
        let dispatch = self.store.dispatch(action);
        let ticket = dispatch.persist.map(|intent| self.writer.submit(intent));

        if dispatch.notice.is_some() {
            debug!("event=task_{action_name} module=service status=rejected reason=empty_text");
        } else {
            debug!(
                "event=task_{action_name} module=service status=ok count={}",
                self.store.tasks().len()
            );
        }

        TaskUpdate {
            tasks: self.store.tasks().clone(),
            notice: dispatch.notice,
            ticket,
        }
    }

    /// Returns a ticket resolving once all previously scheduled work ran.
    pub fn flush(&self) -> SaveTicket {
        self.writer.flush()
    }
}

fn action_name(action: &TaskAction) -> &'static str {
    match action {
        TaskAction::Add(_) => "add",
        TaskAction::Delete(_) => "delete",
        TaskAction::Clear => "clear",
    }
}
