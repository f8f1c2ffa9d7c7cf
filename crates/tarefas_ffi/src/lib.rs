//! Flutter-facing bindings for the Tarefas core.

pub mod api;
