//! In-memory task state and its update rules.
//!
//! # Responsibility
//! - Own the canonical ordered task list for the process lifetime.
//! - Turn user actions into a new state plus persistence intent.
//!
//! # Invariants
//! - State changes only through `reduce`.
//! - The store never performs I/O; persistence is described, not executed.

pub mod task_store;
