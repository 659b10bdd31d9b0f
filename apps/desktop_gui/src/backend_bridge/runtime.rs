//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread, time::Duration};

use client_core::{AnalyticsClient, ViewController, ViewState};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use tokio::sync::watch;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

const FULL_QUEUE_RETRY: Duration = Duration::from_millis(25);

pub fn launch(client: AnalyticsClient, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::BackendFailure(format!(
                    "backend worker startup failure: failed to build runtime: {err}"
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let controller = ViewController::new(Arc::new(client));
            let forwarder = tokio::spawn(forward_view_state(controller.subscribe(), ui_tx.clone()));
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Load { trigger } => {
                        tracing::debug!(
                            trigger = trigger.label(),
                            previous_generation = controller.generation(),
                            "starting view load"
                        );
                        controller.spawn_load();
                    }
                    BackendCommand::Shutdown => break,
                }
            }

            controller.teardown();
            forwarder.abort();
            tracing::info!("backend worker stopped");
        });
    });
}

async fn forward_view_state(mut updates: watch::Receiver<ViewState>, ui_tx: Sender<UiEvent>) {
    loop {
        let state = updates.borrow_and_update().clone();
        let label = state.label();
        match ui_tx.try_send(UiEvent::ViewStateChanged(state)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                // Retry with the freshest state instead of waiting for the next change.
                tracing::warn!(state = label, "backend->ui event queue is full; retrying");
                tokio::time::sleep(FULL_QUEUE_RETRY).await;
                continue;
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::debug!("ui event queue closed; stopping view state forwarding");
                break;
            }
        }
        if updates.changed().await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    async fn next_view_state(ui_rx: &Receiver<UiEvent>) -> ViewState {
        for _ in 0..200 {
            if let Ok(UiEvent::ViewStateChanged(state)) = ui_rx.try_recv() {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("no view state forwarded");
    }

    #[tokio::test]
    async fn full_queue_delivers_latest_state_once_drained() {
        let (ui_tx, ui_rx) = bounded(1);
        ui_tx
            .try_send(UiEvent::Info("Backend worker ready".to_string()))
            .expect("fill queue");
        let (state_tx, state_rx) = watch::channel(ViewState::Loading);
        let forwarder = tokio::spawn(forward_view_state(state_rx, ui_tx));

        tokio::time::sleep(Duration::from_millis(10)).await;
        let error = ViewState::Error {
            message: "plot endpoint returned HTTP 500".to_string(),
        };
        state_tx.send(error.clone()).expect("publish state");
        assert!(matches!(ui_rx.try_recv(), Ok(UiEvent::Info(_))));

        assert_eq!(next_view_state(&ui_rx).await, error);
        forwarder.abort();
    }

    #[tokio::test]
    async fn forwards_each_change_when_queue_has_room() {
        let (ui_tx, ui_rx) = bounded(8);
        let (state_tx, state_rx) = watch::channel(ViewState::Loading);
        let forwarder = tokio::spawn(forward_view_state(state_rx, ui_tx));

        assert_eq!(next_view_state(&ui_rx).await, ViewState::Loading);
        let error = ViewState::Error {
            message: "Failed to fetch data".to_string(),
        };
        state_tx.send(error.clone()).expect("publish state");
        assert_eq!(next_view_state(&ui_rx).await, error);
        forwarder.abort();
    }
}
