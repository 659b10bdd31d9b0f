use serde::{Deserialize, Serialize};

use crate::error::PayloadError;

pub const STATISTICS_PATH: &str = "/api/statistics";
pub const PLOT_PATH: &str = "/api/plot";
pub const HEALTH_PATH: &str = "/api/health";

/// `avg_income` arrives rounded to cents while the bounds do not, so the
/// average may sit up to half a cent outside them. The extra slack absorbs
/// float noise in that comparison.
pub const AVG_ROUNDING_SLACK: f64 = 0.005 + 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MajorIncome {
    pub major: String,
    pub income: f64,
}

/// Payload of `GET /api/statistics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_majors: u64,
    pub avg_income: f64,
    pub max_income: f64,
    pub min_income: f64,
    /// Highest earning first. Ranks are positional and never sent on the wire.
    pub top_majors: Vec<MajorIncome>,
    /// Backing store the service read from (`database` or `json`), when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Statistics {
    /// Checks the invariants a well-formed statistics payload upholds. The
    /// length of `top_majors` is not checked here; rendering caps it.
    pub fn validate(&self) -> Result<(), PayloadError> {
        for (field, value) in [
            ("avg_income", self.avg_income),
            ("max_income", self.max_income),
            ("min_income", self.min_income),
        ] {
            if !value.is_finite() {
                return Err(PayloadError::NonFiniteIncome { field });
            }
        }

        if self.total_majors > 0
            && !(self.min_income <= self.max_income
                && self.min_income - AVG_ROUNDING_SLACK <= self.avg_income
                && self.avg_income <= self.max_income + AVG_ROUNDING_SLACK)
        {
            return Err(PayloadError::IncomeBoundsOutOfOrder {
                total: self.total_majors,
                min: self.min_income,
                avg: self.avg_income,
                max: self.max_income,
            });
        }

        for (position, pair) in self.top_majors.windows(2).enumerate() {
            if !pair[1].income.is_finite() || pair[0].income < pair[1].income {
                return Err(PayloadError::TopMajorsUnsorted {
                    position: position + 1,
                });
            }
        }

        Ok(())
    }
}

/// Payload of `GET /api/plot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotResponse {
    /// Directly usable as an image source: a `data:` URI or a URL.
    pub image: String,
    /// Number of majors drawn in the plot, when the service reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_majors: Option<u64>,
}

/// Opaque plot payload. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlotImage(String);

impl PlotImage {
    pub fn new(source: impl Into<String>) -> Result<Self, PayloadError> {
        let source = source.into();
        if source.trim().is_empty() {
            return Err(PayloadError::EmptyPlotImage);
        }
        Ok(Self(source))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_data_uri(&self) -> bool {
        self.0.starts_with("data:")
    }
}

impl TryFrom<PlotResponse> for PlotImage {
    type Error = PayloadError;

    fn try_from(value: PlotResponse) -> Result<Self, Self::Error> {
        Self::new(value.image)
    }
}

/// Payload of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
