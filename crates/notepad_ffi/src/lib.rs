//! Flutter-facing bridge over `notepad_core`.

pub mod api;
