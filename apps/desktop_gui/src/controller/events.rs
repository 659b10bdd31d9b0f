//! Backend-to-UI events for the desktop GUI.

use client_core::ViewState;

#[derive(Debug, Clone)]
pub enum UiEvent {
    ViewStateChanged(ViewState),
    Info(String),
    BackendFailure(String),
}
