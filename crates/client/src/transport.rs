//! Authenticated HTTP transport against the control-plane REST API.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::ProviderConfig;
use crate::error::{Error, Result};

/// Header carrying the configured API key.
const API_KEY_HEADER: &str = "x-api-key";

/// Header carrying the platform namespace a request is scoped to.
const API_HOST_HEADER: &str = "x-api-host";

/// Authenticated client for the control-plane REST API.
///
/// Read-only after construction and cheap to clone; safe to share across
/// concurrently running resource operations. This layer performs no
/// retries - retry and backoff belong to the convergence poller, not the
/// transport.
#[derive(Debug, Clone)]
pub struct ApigwClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: Url,
}

impl ApigwClient {
    /// Build a client from a validated configuration.
    ///
    /// Fails with a configuration error if the API key or endpoint is
    /// missing, before any request is attempted.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        config.validate()?;

        let endpoint = Url::parse(&config.endpoint)?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            api_key: config.api_key,
            endpoint,
        })
    }

    /// Issue a request and return the response body verbatim.
    ///
    /// `platform` is the tenant namespace the path is scoped to; it is
    /// forwarded alongside the API key. A JSON `body`, when present, is
    /// serialized as the request payload.
    pub async fn request(
        &self,
        platform: &str,
        path: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<String> {
        self.request_with_headers(platform, path, method, body, &[])
            .await
    }

    /// Creation variant of [`request`](Self::request) that merges extra
    /// headers into the request, allowing per-call overrides such as
    /// idempotency keys.
    pub async fn request_with_headers(
        &self,
        platform: &str,
        path: &str,
        method: Method,
        body: Option<&Value>,
        extra_headers: &[(&str, &str)],
    ) -> Result<String> {
        let url = self.build_url(path)?;
        debug!(%method, %url, platform, "sending control-plane request");

        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(API_KEY_HEADER),
            header_value(&self.api_key)?,
        );
        headers.insert(
            HeaderName::from_static(API_HOST_HEADER),
            header_value(platform)?,
        );
        for (name, value) in extra_headers {
            headers.insert(
                HeaderName::from_bytes(name.as_bytes())
                    .map_err(|e| Error::config(format!("invalid header name '{name}': {e}")))?,
                header_value(value)?,
            );
        }

        let mut builder = self.http.request(method.clone(), url).headers(headers);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return Ok(text);
        }

        warn!(%method, path, %status, "control-plane request failed");
        if status == StatusCode::NOT_FOUND {
            return Err(Error::not_found(path));
        }

        Err(Error::request_failed(status.as_u16(), text))
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        let base = self.endpoint.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::config(format!("invalid header value: {e}")))
}
