//! View controller: the fetch/render state machine behind the income view.
//!
//! Every user affordance (mount, retry, refresh) funnels into [`ViewController::load_all`],
//! which moves the view to [`ViewState::Loading`] and then runs the two-step
//! pipeline: statistics first, plot only once statistics succeeded. The first
//! failure short-circuits into [`ViewState::Error`]; a partial `Ready` is never
//! published.
//!
//! Overlapping invocations are allowed. Each one captures a request generation
//! when it starts and may only commit while that generation is still the latest,
//! so a superseded response is dropped instead of overwriting newer state.
//! After [`ViewController::teardown`] every commit is a no-op.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};

use shared::protocol::{PlotImage, Statistics};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, warn};

use crate::{error::FetchFailure, AnalyticsSource};

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Error {
        message: String,
    },
    Ready {
        statistics: Statistics,
        plot: Option<PlotImage>,
    },
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewState::Loading => "loading",
            ViewState::Error { .. } => "error",
            ViewState::Ready { .. } => "ready",
        }
    }
}

struct ControllerShared {
    state: watch::Sender<ViewState>,
    generation: AtomicU64,
    alive: AtomicBool,
}

/// Owns the view state for one mounted view. Cloning yields another handle to
/// the same view.
#[derive(Clone)]
pub struct ViewController {
    source: Arc<dyn AnalyticsSource>,
    shared: Arc<ControllerShared>,
}

impl ViewController {
    /// Mounts a view. The state starts as `Loading`; no request is issued until
    /// [`load_all`](Self::load_all) runs.
    pub fn new(source: Arc<dyn AnalyticsSource>) -> Self {
        let (state, _) = watch::channel(ViewState::Loading);
        Self {
            source,
            shared: Arc::new(ControllerShared {
                state,
                generation: AtomicU64::new(0),
                alive: AtomicBool::new(true),
            }),
        }
    }

    pub fn state(&self) -> ViewState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.shared.state.subscribe()
    }

    /// Generation of the most recently started invocation.
    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::SeqCst)
    }

    pub fn is_alive(&self) -> bool {
        self.shared.alive.load(Ordering::SeqCst)
    }

    /// Runs one full fetch sequence. Never fails: every failure is folded into
    /// [`ViewState::Error`].
    pub async fn load_all(&self) {
        if !self.is_alive() {
            debug!("view torn down; ignoring load request");
            return;
        }

        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "starting view load");
        self.commit(generation, ViewState::Loading);

        let next = match fetch_view_data(self.source.as_ref()).await {
            Ok((statistics, plot)) => ViewState::Ready {
                statistics,
                plot: Some(plot),
            },
            Err(failure) => {
                warn!(
                    generation,
                    endpoint = failure.endpoint().label(),
                    status = ?failure.http_status(),
                    "view load failed: {failure}"
                );
                ViewState::Error {
                    message: failure.user_message().to_string(),
                }
            }
        };

        self.commit(generation, next);
    }

    pub async fn retry(&self) {
        self.load_all().await;
    }

    pub async fn refresh(&self) {
        self.load_all().await;
    }

    /// Starts [`load_all`](Self::load_all) on the current tokio runtime without
    /// waiting for it.
    pub fn spawn_load(&self) -> JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move { controller.load_all().await })
    }

    /// Marks the view as gone. In-flight invocations keep running but can no
    /// longer change the state.
    pub fn teardown(&self) {
        if self.shared.alive.swap(false, Ordering::SeqCst) {
            debug!(generation = self.generation(), "view torn down");
        }
    }

    fn commit(&self, generation: u64, next: ViewState) -> bool {
        let label = next.label();
        // The generation check runs under the watch lock, so a newer invocation
        // cannot slip its `Loading` in between the check and the write.
        let committed = self.shared.state.send_if_modified(|state| {
            if !self.shared.alive.load(Ordering::SeqCst) {
                debug!(generation, state = label, "view torn down; dropping state update");
                return false;
            }
            let latest = self.shared.generation.load(Ordering::SeqCst);
            if generation != latest {
                debug!(generation, latest, state = label, "discarding stale view result");
                return false;
            }
            *state = next;
            true
        });
        if committed {
            debug!(generation, state = label, "view state committed");
        }
        committed
    }
}

/// Statistics, then plot. The plot request is only issued after statistics
/// succeeded.
async fn fetch_view_data(
    source: &dyn AnalyticsSource,
) -> Result<(Statistics, PlotImage), FetchFailure> {
    let statistics = source.fetch_statistics().await?;
    let plot = source.fetch_plot().await?;
    Ok((statistics, plot))
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
