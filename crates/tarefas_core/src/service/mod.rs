//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate the task store and persistence writer into UI-level calls.
//! - Keep FFI and CLI layers decoupled from storage details.

pub mod task_service;
