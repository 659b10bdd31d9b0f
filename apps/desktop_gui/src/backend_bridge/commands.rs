//! Backend commands queued from UI to backend worker.

/// Which affordance asked for a load. Only used for logging; every trigger
/// runs the same fetch sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadTrigger {
    Mount,
    Retry,
    Refresh,
}

impl LoadTrigger {
    pub fn label(self) -> &'static str {
        match self {
            LoadTrigger::Mount => "mount",
            LoadTrigger::Retry => "retry",
            LoadTrigger::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCommand {
    Load { trigger: LoadTrigger },
    Shutdown,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Load { .. } => "load",
            BackendCommand::Shutdown => "shutdown",
        }
    }
}
