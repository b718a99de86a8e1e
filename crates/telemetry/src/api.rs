//! REST client for the Telemetry & Actuation Service.
//!
//! Wraps the two endpoints the control core consumes using [`reqwest`].
//! The service also exposes reading-submission and notification endpoints
//! on the same base address; those belong to other components and are not
//! wrapped here.

use crate::messages::{ErrorBody, MetricsReading, StabilizeResponse};

/// Generic detail text for a failed metrics read. The body of a failed
/// read carries nothing the caller can act on.
const METRICS_FETCH_FAILED: &str = "metrics fetch failed";

/// Generic detail text for a failed stabilization run without a
/// server-supplied `detail`.
const STABILIZATION_FAILED: &str = "stabilization failed";

/// HTTP client for one Telemetry & Actuation Service instance.
///
/// Built without a request timeout: a stabilization run may take several
/// minutes and answers with a single response at completion.
pub struct TelemetryApi {
    client: reqwest::Client,
    base_url: String,
}

/// Errors from the service client.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryApiError {
    /// The request never produced a usable response (network, DNS, TLS,
    /// or a response body that did not match the expected shape).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-success status code.
    #[error("service error ({status}): {detail}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-supplied detail text, or a generic fallback.
        detail: String,
    },
}

impl TelemetryApi {
    /// Create a client for the service at `base_url`
    /// (e.g. `http://localhost:8000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (connection pooling across components).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Base HTTP URL of the service.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the latest metrics snapshot.
    ///
    /// Any non-success status is reported uniformly as a failed read; the
    /// error body is not inspected.
    pub async fn get_metrics(&self) -> Result<MetricsReading, TelemetryApiError> {
        let response = self
            .client
            .get(format!("{}/metrics", self.base_url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TelemetryApiError::Status {
                status: status.as_u16(),
                detail: METRICS_FETCH_FAILED.to_string(),
            });
        }

        Ok(response.json::<MetricsReading>().await?)
    }

    /// Run one stabilization pass to completion.
    ///
    /// Sends `POST /stabilize` with no body and blocks until the service
    /// has finished the whole multi-step run -- possibly minutes -- then
    /// returns the full step history in one response. On a non-success
    /// status the body is parsed as `{"detail": ...}` and the detail text
    /// is surfaced verbatim when present.
    pub async fn stabilize(&self) -> Result<StabilizeResponse, TelemetryApiError> {
        let response = self
            .client
            .post(format!("{}/stabilize", self.base_url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.detail)
                .unwrap_or_else(|| STABILIZATION_FAILED.to_string());

            tracing::warn!(status = status.as_u16(), detail = %detail, "Stabilize call rejected");
            return Err(TelemetryApiError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response.json::<StabilizeResponse>().await?)
    }
}
