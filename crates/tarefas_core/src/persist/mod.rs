//! Task list persistence.
//!
//! # Responsibility
//! - Store the task list in one local key-value slot and restore it.
//! - Keep storage failures non-fatal: in-memory state stays authoritative.
//!
//! # Invariants
//! - Slot payload is a JSON array of `{ "id", "text" }` objects.
//! - Storage I/O never runs inside the reducer.

pub mod gateway;
pub mod kv;
pub mod writer;
