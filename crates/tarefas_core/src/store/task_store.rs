//! Reducer-driven task store.
//!
//! # Responsibility
//! - Apply `TaskAction`s to a `TaskList` as a pure state transition.
//! - Track the one-shot "loaded" transition performed at startup.
//!
//! # Invariants
//! - Blank input never changes state and yields `Notice::EmptyText`.
//! - Add and delete always request a full-list save, even when delete
//!   matched nothing.
//! - Clear requests slot removal, never an empty-list save.

use crate::model::task::{Task, TaskId, TaskList, TaskValidationError};

/// User-level mutations accepted by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    Add(String),
    Delete(TaskId),
    Clear,
}

/// Persistence work requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistIntent {
    /// Overwrite the slot with this full snapshot.
    Save(TaskList),
    /// Remove the slot outright.
    RemoveSlot,
}

/// User-facing warning produced without changing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    EmptyText,
}

impl Notice {
    pub fn title(&self) -> &'static str {
        match self {
            Self::EmptyText => "Attention",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::EmptyText => "Type a task before adding!",
        }
    }
}

/// Result of applying one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: TaskList,
    pub persist: Option<PersistIntent>,
    pub notice: Option<Notice>,
}

impl Transition {
    fn unchanged(state: TaskList, notice: Notice) -> Self {
        Self {
            state,
            persist: None,
            notice: Some(notice),
        }
    }

    fn saved(state: TaskList) -> Self {
        let snapshot = state.clone();
        Self {
            state,
            persist: Some(PersistIntent::Save(snapshot)),
            notice: None,
        }
    }
}

/// Applies `action` to `state` and returns the next state.
pub fn reduce(mut state: TaskList, action: TaskAction) -> Transition {
    match action {
        TaskAction::Add(text) => match Task::new(&text) {
            Ok(task) => {
                state.push(task);
                Transition::saved(state)
            }
            Err(TaskValidationError::EmptyText | TaskValidationError::EmptyId) => {
                Transition::unchanged(state, Notice::EmptyText)
            }
        },
        TaskAction::Delete(id) => {
            state.remove(&id);
            Transition::saved(state)
        }
        TaskAction::Clear => Transition {
            state: TaskList::new(),
            persist: Some(PersistIntent::RemoveSlot),
            notice: None,
        },
    }
}

/// Outcome of a store dispatch, minus the state the store keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub persist: Option<PersistIntent>,
    pub notice: Option<Notice>,
}

/// Owned task state with a one-shot hydration step.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: TaskList,
    loaded: bool,
}

impl TaskStore {
    /// Creates an empty store that has not been hydrated yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces state with the list restored from storage.
    ///
    /// Only the first call takes effect; returns whether it did.
    pub fn hydrate(&mut self, tasks: TaskList) -> bool {
        if self.loaded {
            return false;
        }
        self.tasks = tasks;
        self.loaded = true;
        true
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    /// Runs `action` through `reduce` and keeps the resulting state.
    pub fn dispatch(&mut self, action: TaskAction) -> Dispatch {
        let current = std::mem::take(&mut self.tasks);
        let transition = reduce(current, action);
        self.tasks = transition.state;
        Dispatch {
            persist: transition.persist,
            notice: transition.notice,
        }
    }

    pub fn add(&mut self, text: impl Into<String>) -> Dispatch {
        self.dispatch(TaskAction::Add(text.into()))
    }

    pub fn delete(&mut self, id: &TaskId) -> Dispatch {
        self.dispatch(TaskAction::Delete(id.clone()))
    }

    pub fn clear(&mut self) -> Dispatch {
        self.dispatch(TaskAction::Clear)
    }
}

#[cfg(test)]
mod tests {
    use super::{reduce, Notice, PersistIntent, TaskAction, TaskStore};
    use crate::model::task::{Task, TaskId, TaskList};

    #[test]
    fn reduce_add_appends_and_requests_save_of_full_list() {
        let mut state = TaskList::new();
        state.push(Task::new("first").unwrap());

        let transition = reduce(state, TaskAction::Add("second".to_string()));
        assert_eq!(transition.state.texts(), vec!["first", "second"]);
        assert_eq!(
            transition.persist,
            Some(PersistIntent::Save(transition.state.clone()))
        );
        assert_eq!(transition.notice, None);
    }

    #[test]
    fn reduce_blank_add_keeps_state_and_warns() {
        let mut state = TaskList::new();
        state.push(Task::new("only").unwrap());
        let before = state.clone();

        let transition = reduce(state, TaskAction::Add("   ".to_string()));
        assert_eq!(transition.state, before);
        assert_eq!(transition.persist, None);
        assert_eq!(transition.notice, Some(Notice::EmptyText));
    }

    #[test]
    fn reduce_delete_of_missing_id_still_saves() {
        let mut state = TaskList::new();
        state.push(Task::new("kept").unwrap());

        let transition = reduce(state, TaskAction::Delete(TaskId::from("nope")));
        assert_eq!(transition.state.texts(), vec!["kept"]);
        assert!(matches!(transition.persist, Some(PersistIntent::Save(_))));
    }

    #[test]
    fn reduce_clear_requests_slot_removal() {
        let mut state = TaskList::new();
        state.push(Task::new("gone").unwrap());

        let transition = reduce(state, TaskAction::Clear);
        assert!(transition.state.is_empty());
        assert_eq!(transition.persist, Some(PersistIntent::RemoveSlot));
    }

    #[test]
    fn hydrate_is_one_shot() {
        let mut store = TaskStore::new();
        assert!(!store.is_loaded());

        let mut restored = TaskList::new();
        restored.push(Task::new("restored").unwrap());
        assert!(store.hydrate(restored));
        assert!(!store.hydrate(TaskList::new()));

        assert!(store.is_loaded());
        assert_eq!(store.tasks().texts(), vec!["restored"]);
    }

    #[test]
    fn notice_text_is_stable() {
        assert_eq!(Notice::EmptyText.title(), "Attention");
        assert_eq!(Notice::EmptyText.message(), "Type a task before adding!");
    }
}
