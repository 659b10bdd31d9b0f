use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body returned by the analytics service on non-2xx responses,
/// e.g. `{"error": "Failed to retrieve statistics"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    /// Best-effort parse of a response body. Returns `None` for bodies that are
    /// not the service's error shape or carry a blank message.
    pub fn from_body(body: &str) -> Option<Self> {
        serde_json::from_str::<Self>(body)
            .ok()
            .filter(|parsed| !parsed.error.trim().is_empty())
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PayloadError {
    #[error("total_majors is {total} but min/avg/max incomes are out of order ({min} / {avg} / {max})")]
    IncomeBoundsOutOfOrder {
        total: u64,
        min: f64,
        avg: f64,
        max: f64,
    },
    #[error("income field `{field}` is not a finite number")]
    NonFiniteIncome { field: &'static str },
    #[error("top_majors is not sorted by income descending at position {position}")]
    TopMajorsUnsorted { position: usize },
    #[error("plot image is empty")]
    EmptyPlotImage,
}
