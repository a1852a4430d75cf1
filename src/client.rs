//! Authenticated HTTP dispatch.
//!
//! `ApiClient` is the single choke-point for every outbound call: it attaches
//! the bearer token, serializes bodies as JSON, and normalizes every response
//! into [`ApiResult`]. No call is ever retried automatically; the caller
//! decides whether to re-issue.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::session::{MemorySessionStore, SessionStore};

/// HTTP client for the library API.
///
/// Cheap to clone; clones share the connection pool and the session store.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    /// Create a new builder for configuring the client
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::new()
    }

    /// Build a client from loaded configuration with the given session store
    pub fn from_config(
        config: &ClientConfig,
        session: Arc<dyn SessionStore>,
    ) -> ApiResult<Self> {
        let mut builder = Self::builder()
            .base_url(config.api.base_url.clone())
            .session_store(session);
        if let Some(secs) = config.api.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder.build()
    }

    /// The shared session store
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a request and normalize the response.
    ///
    /// Policy, in order: transport failure becomes `Network`; a 401 clears
    /// the session and becomes `Unauthenticated`; the body is parsed as JSON
    /// (empty or non-JSON bodies become `{}`); any other non-2xx becomes
    /// `Rejected` with the normalized `detail` message; 2xx returns the
    /// parsed body.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> ApiResult<Value> {
        self.dispatch(method, path, &[], body).await
    }

    /// Same as [`ApiClient::request`], with URL-encoded query parameters
    pub async fn request_with_query(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> ApiResult<Value> {
        self.dispatch(method, path, query, body).await
    }

    /// GET a typed resource
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        decode(self.request(Method::GET, path, None).await?)
    }

    /// GET a typed resource with query parameters
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ApiResult<T> {
        decode(
            self.request_with_query(Method::GET, path, query, None)
                .await?,
        )
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> ApiResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method.clone(), &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(session) = self.session.get() {
            request = request.bearer_auth(&session.token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!("{} {}", method, url);
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Transport failure for {} {}: {}", method, url, e);
                return Err(ApiError::Network(e.to_string()));
            }
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            // Any 401 forces re-login, whichever call produced it
            warn!("{} {} returned 401, clearing session", method, url);
            self.session.clear();
            return Err(ApiError::Unauthenticated);
        }

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let parsed: Value =
            serde_json::from_str(&text).unwrap_or_else(|_| Value::Object(Default::default()));

        if !status.is_success() {
            let err = ApiError::rejected(status.as_u16(), &parsed);
            debug!("{} {} rejected: {}", method, url, err);
            return Err(err);
        }

        Ok(parsed)
    }
}

/// Decode a JSON value into a typed model
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Builder for configuring [`ApiClient`] instances.
pub struct ApiClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    session: Option<Arc<dyn SessionStore>>,
}

impl ApiClientBuilder {
    fn new() -> Self {
        Self {
            base_url: None,
            timeout: None,
            session: None,
        }
    }

    /// Set the base URL of the library API (required)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set an overall request timeout. Off by default: the transport default
    /// applies.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Inject the session store. Defaults to an in-memory store.
    pub fn session_store(mut self, session: Arc<dyn SessionStore>) -> Self {
        self.session = Some(session);
        self
    }

    /// Build the client
    pub fn build(self) -> ApiResult<ApiClient> {
        let base_url = self
            .base_url
            .map(|url| url.trim_end_matches('/').to_string())
            .ok_or_else(|| ApiError::Configuration("base_url is required".into()))?;

        let mut http_builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            http_builder = http_builder.timeout(timeout);
        }
        let http = http_builder
            .build()
            .map_err(|e| ApiError::Configuration(e.to_string()))?;

        Ok(ApiClient {
            base_url,
            http,
            session: self
                .session
                .unwrap_or_else(|| Arc::new(MemorySessionStore::new())),
        })
    }
}
