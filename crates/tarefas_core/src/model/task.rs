//! Task domain model.
//!
//! # Responsibility
//! - Define the `Task` record and its persisted JSON shape.
//! - Provide the ordered `TaskList` container used by the store.
//!
//! # Invariants
//! - `text` is trimmed and never empty.
//! - `id` is non-empty and stable for the task lifetime.
//! - `TaskList` keeps insertion order; removal never reorders survivors.

use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque task identifier.
///
/// New ids are time-ordered UUIDs. Ids restored from storage are kept
/// verbatim, so older payloads with epoch-millisecond ids still resolve.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generates a fresh id for a creation event.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validation errors for task invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyText,
    EmptyId,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "task text cannot be empty"),
            Self::EmptyId => write!(f, "task id cannot be empty"),
        }
    }
}

impl Error for TaskValidationError {}

/// A single to-do entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Older payloads name this field `texto` and may carry untrimmed text.
    #[serde(alias = "texto", deserialize_with = "deserialize_trimmed")]
    pub text: String,
}

/// Trims surrounding whitespace, including the U+FEFF byte order mark.
pub fn trim_text(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
}

fn deserialize_trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(trim_text(&raw).to_string())
}

impl Task {
    /// Creates a task with a generated id from raw user input.
    ///
    /// # Errors
    /// - Returns `EmptyText` when `text` is blank after trimming.
    pub fn new(text: &str) -> Result<Self, TaskValidationError> {
        Self::with_id(TaskId::generate(), text)
    }

    /// Creates a task with a caller-provided id.
    ///
    /// The text is trimmed before it is stored.
    pub fn with_id(id: TaskId, text: &str) -> Result<Self, TaskValidationError> {
        let task = Self {
            id,
            text: trim_text(text).to_string(),
        };
        task.validate()?;
        Ok(task)
    }

    /// Checks task invariants, used on both write and read paths.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if trim_text(self.id.as_str()).is_empty() {
            return Err(TaskValidationError::EmptyId);
        }
        if trim_text(&self.text).is_empty() {
            return Err(TaskValidationError::EmptyText);
        }
        Ok(())
    }
}

/// Ordered collection of all current tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskList(Vec<Task>);

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.0
    }

    /// Appends at the end; display order follows insertion order.
    pub fn push(&mut self, task: Task) {
        self.0.push(task);
    }

    /// Removes every task with `id`, keeping the relative order of the rest.
    ///
    /// Returns the number of removed entries.
    pub fn remove(&mut self, id: &TaskId) -> usize {
        let before = self.0.len();
        self.0.retain(|task| &task.id != id);
        before - self.0.len()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.0.iter().find(|task| &task.id == id)
    }

    /// Returns task texts in display order.
    pub fn texts(&self) -> Vec<&str> {
        self.0.iter().map(|task| task.text.as_str()).collect()
    }

    /// Validates every entry, reporting the first violation.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        self.0.iter().try_for_each(Task::validate)
    }
}

impl From<Vec<Task>> for TaskList {
    fn from(value: Vec<Task>) -> Self {
        Self(value)
    }
}

impl IntoIterator for TaskList {
    type Item = Task;
    type IntoIter = std::vec::IntoIter<Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a TaskList {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
