//! Backend bridge: command queue from the UI thread into the tokio worker that owns the view controller.

pub mod commands;
pub mod runtime;
