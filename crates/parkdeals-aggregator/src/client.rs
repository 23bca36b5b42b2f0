//! Thin HTTP fetch layer shared by all deal sources.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::AggregatorError;

/// HTTP client for source fetches.
///
/// Each source supplies its own fixed identifying `User-Agent` per request;
/// everything else (timeouts, TLS) is shared. Non-2xx statuses map to
/// [`AggregatorError::UnexpectedStatus`] and are terminal for the run that
/// issued the fetch. There are no retries — a failed run records failure and
/// re-invocation is the caller's responsibility.
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Creates an `HttpClient` with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`AggregatorError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(timeout_secs: u64) -> Result<Self, AggregatorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client })
    }

    /// Fetches a URL and returns the raw response body as text.
    ///
    /// # Errors
    ///
    /// - [`AggregatorError::UnexpectedStatus`] — any non-2xx status.
    /// - [`AggregatorError::Http`] — network or TLS failure.
    pub async fn fetch_text(
        &self,
        url: &str,
        user_agent: &str,
    ) -> Result<String, AggregatorError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AggregatorError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(response.text().await?)
    }

    /// Fetches a URL and deserializes the response body as JSON.
    ///
    /// # Errors
    ///
    /// Everything [`fetch_text`](Self::fetch_text) returns, plus
    /// [`AggregatorError::Deserialize`] when the body is not valid JSON for `T`.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        user_agent: &str,
    ) -> Result<T, AggregatorError> {
        let body = self.fetch_text(url, user_agent).await?;
        serde_json::from_str::<T>(&body).map_err(|e| AggregatorError::Deserialize {
            context: format!("response from {url}"),
            source: e,
        })
    }
}
