use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    error::ApiError,
    protocol::{HealthResponse, PlotImage, PlotResponse, Statistics},
};
use tracing::debug;
use url::Url;

pub mod config;
pub mod controller;
pub mod error;
pub mod render;

pub use config::Settings;
pub use controller::{ViewController, ViewState};
pub use error::{ClientBuildError, Endpoint, FetchFailure, FALLBACK_FAILURE_MESSAGE};

/// Remote collaborator the view controller pulls its data from.
#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    async fn fetch_statistics(&self) -> Result<Statistics, FetchFailure>;
    async fn fetch_plot(&self) -> Result<PlotImage, FetchFailure>;
}

#[derive(Debug, Clone)]
struct EndpointUrls {
    statistics: Url,
    plot: Url,
    health: Url,
}

impl EndpointUrls {
    fn resolve(base: &Url) -> Result<Self, url::ParseError> {
        let join = |endpoint: Endpoint| base.join(endpoint.path().trim_start_matches('/'));
        Ok(Self {
            statistics: join(Endpoint::Statistics)?,
            plot: join(Endpoint::Plot)?,
            health: join(Endpoint::Health)?,
        })
    }

    fn get(&self, endpoint: Endpoint) -> &Url {
        match endpoint {
            Endpoint::Statistics => &self.statistics,
            Endpoint::Plot => &self.plot,
            Endpoint::Health => &self.health,
        }
    }
}

/// HTTP client for the analytics service.
#[derive(Debug, Clone)]
pub struct AnalyticsClient {
    http: Client,
    base_url: Url,
    endpoints: EndpointUrls,
}

impl AnalyticsClient {
    pub fn new(server_url: &str) -> Result<Self, ClientBuildError> {
        Self::with_http(server_url, Client::new())
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ClientBuildError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Self::with_http(&settings.server_url, builder.build()?)
    }

    pub fn with_http(server_url: &str, http: Client) -> Result<Self, ClientBuildError> {
        let base_url = parse_base_url(server_url)?;
        let endpoints =
            EndpointUrls::resolve(&base_url).map_err(|source| ClientBuildError::InvalidBaseUrl {
                url: server_url.to_string(),
                source,
            })?;
        Ok(Self {
            http,
            base_url,
            endpoints,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint_url(&self, endpoint: Endpoint) -> &Url {
        self.endpoints.get(endpoint)
    }

    /// Probes `GET /api/health`. Not part of the view's load sequence.
    pub async fn health(&self) -> Result<HealthResponse, FetchFailure> {
        self.get_json(Endpoint::Health).await
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, FetchFailure> {
        let url = self.endpoints.get(endpoint);
        debug!(endpoint = endpoint.label(), %url, "requesting analytics endpoint");

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|err| FetchFailure::transport(endpoint, err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let server_message = ApiError::from_body(&body).map(|api_error| api_error.error);
            return Err(FetchFailure::status(
                endpoint,
                status.as_u16(),
                server_message,
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| FetchFailure::transport(endpoint, err))?;
        serde_json::from_slice(&body).map_err(|err| FetchFailure::malformed(endpoint, err))
    }
}

#[async_trait]
impl AnalyticsSource for AnalyticsClient {
    async fn fetch_statistics(&self) -> Result<Statistics, FetchFailure> {
        let statistics: Statistics = self.get_json(Endpoint::Statistics).await?;
        statistics
            .validate()
            .map_err(|err| FetchFailure::malformed(Endpoint::Statistics, err))?;
        debug!(
            total_majors = statistics.total_majors,
            top_majors = statistics.top_majors.len(),
            source = statistics.source.as_deref().unwrap_or("unreported"),
            "statistics payload accepted"
        );
        Ok(statistics)
    }

    async fn fetch_plot(&self) -> Result<PlotImage, FetchFailure> {
        let plot: PlotResponse = self.get_json(Endpoint::Plot).await?;
        let plotted = plot.total_majors;
        let image =
            PlotImage::try_from(plot).map_err(|err| FetchFailure::malformed(Endpoint::Plot, err))?;
        debug!(
            plotted_majors = ?plotted,
            data_uri = image.is_data_uri(),
            "plot payload accepted"
        );
        Ok(image)
    }
}

fn parse_base_url(server_url: &str) -> Result<Url, ClientBuildError> {
    let trimmed = server_url.trim();
    let mut url = Url::parse(trimmed).map_err(|source| ClientBuildError::InvalidBaseUrl {
        url: server_url.to_string(),
        source,
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientBuildError::UnsupportedScheme(url.scheme().to_string()));
    }

    // Relative joins keep any path prefix only when the base ends with '/'.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
