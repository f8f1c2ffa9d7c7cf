//! Domain model for the task list.
//!
//! # Responsibility
//! - Define the task record and the ordered list the UI renders.
//! - Enforce creation-time invariants on task text.
//!
//! # Invariants
//! - Every task is identified by an id that never changes after creation.
//! - Insertion order is display order.

pub mod task;
