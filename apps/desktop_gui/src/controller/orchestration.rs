//! Command orchestration helpers from UI actions to backend command queue.

use client_core::render::ViewAction;
use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::{BackendCommand, LoadTrigger};

pub fn command_for_action(action: ViewAction) -> BackendCommand {
    let trigger = match action {
        ViewAction::Retry => LoadTrigger::Retry,
        ViewAction::Refresh => LoadTrigger::Refresh,
    };
    BackendCommand::Load { trigger }
}

/// Queues `cmd` for the backend worker. Queue problems are reported through
/// `status` instead of the view state, which only the controller writes.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut Option<String>,
) {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => tracing::debug!(command = cmd_name, "queued ui->backend command"),
        Err(TrySendError::Full(_)) => {
            *status = Some("UI command queue is full; please retry".to_string());
            tracing::warn!(command = cmd_name, "ui->backend command queue is full");
        }
        Err(TrySendError::Disconnected(_)) => {
            *status = Some(
                "Backend command processor disconnected (possible startup/runtime failure); restart the viewer"
                    .to_string(),
            );
            tracing::error!(command = cmd_name, "ui->backend command queue disconnected");
        }
    }
}
