//! Failure modeling for the analytics client.

use std::fmt;

use thiserror::Error;

/// Shown when a failure carries no usable detail.
pub const FALLBACK_FAILURE_MESSAGE: &str = "Failed to fetch data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Statistics,
    Plot,
    Health,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Statistics => shared::protocol::STATISTICS_PATH,
            Endpoint::Plot => shared::protocol::PLOT_PATH,
            Endpoint::Health => shared::protocol::HEALTH_PATH,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Endpoint::Statistics => "statistics",
            Endpoint::Plot => "plot",
            Endpoint::Health => "health",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The single failure kind of the fetch pipeline. Network errors, non-2xx
/// statuses and malformed bodies all end up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FetchFailure {
    endpoint: Endpoint,
    status: Option<u16>,
    message: String,
}

impl FetchFailure {
    pub fn new(endpoint: Endpoint, message: impl Into<String>) -> Self {
        Self {
            endpoint,
            status: None,
            message: message.into(),
        }
    }

    pub fn transport(endpoint: Endpoint, err: impl fmt::Display) -> Self {
        Self::new(
            endpoint,
            format!("failed to reach {endpoint} endpoint: {err}"),
        )
    }

    pub fn status(endpoint: Endpoint, status: u16, server_message: Option<String>) -> Self {
        let message = match server_message {
            Some(detail) => format!("{endpoint} endpoint returned HTTP {status}: {detail}"),
            None => format!("{endpoint} endpoint returned HTTP {status}"),
        };
        Self {
            endpoint,
            status: Some(status),
            message,
        }
    }

    pub fn malformed(endpoint: Endpoint, err: impl fmt::Display) -> Self {
        Self::new(endpoint, format!("invalid {endpoint} response payload: {err}"))
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn http_status(&self) -> Option<u16> {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Message for the error screen.
    pub fn user_message(&self) -> &str {
        if self.message.trim().is_empty() {
            FALLBACK_FAILURE_MESSAGE
        } else {
            &self.message
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid server url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("unsupported server url scheme '{0}'; expected http or https")]
    UnsupportedScheme(String),
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}
