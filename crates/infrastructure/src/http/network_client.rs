//! Network adapter backed by `reqwest`
//!
//! Resolves origin-relative resource URLs against a configured origin and
//! captures status, headers and body into a `ResourceResponse`. Any HTTP
//! status is a response; only transport failures are errors.

use std::time::Duration;

use application::{error::ApplicationError, ports::NetworkPort};
use async_trait::async_trait;
use domain::{RequestMethod, ResourceRequest, ResourceResponse};
use reqwest::{Client, Method, Url};
use tracing::{debug, instrument};

/// Configuration for the network client
#[derive(Debug, Clone)]
pub struct NetworkClientConfig {
    /// Base URL that origin-relative paths resolve against
    pub origin: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for NetworkClientConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8080".to_string(),
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
            user_agent: format!("PromptStudio/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl NetworkClientConfig {
    /// Create a configuration for an origin with default timeouts
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            ..Self::default()
        }
    }

    /// Set the request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connect timeout
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the user agent string
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// `NetworkPort` implementation using a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestNetworkAdapter {
    client: Client,
    origin: Url,
}

impl ReqwestNetworkAdapter {
    /// Create a new adapter
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the origin is not an absolute URL or
    /// the underlying client cannot be built.
    pub fn new(config: &NetworkClientConfig) -> Result<Self, ApplicationError> {
        let origin = Url::parse(&config.origin).map_err(|e| {
            ApplicationError::Configuration(format!("invalid origin {}: {e}", config.origin))
        })?;

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;

        Ok(Self { client, origin })
    }

    /// The origin relative URLs resolve against
    pub const fn origin(&self) -> &Url {
        &self.origin
    }

    /// Resolve a request URL against the origin
    pub fn resolve(&self, url: &str) -> Result<Url, ApplicationError> {
        resolve_url(&self.origin, url)
            .ok_or_else(|| ApplicationError::Network(format!("invalid URL {url}")))
    }
}

/// Absolute form of `url`, joining relative references onto `origin`
///
/// Shared by the network adapter and cache keying so one resource always
/// maps to one URL.
pub fn resolve_url(origin: &Url, url: &str) -> Option<Url> {
    Url::parse(url).or_else(|_| origin.join(url)).ok()
}

const fn to_reqwest_method(method: RequestMethod) -> Method {
    match method {
        RequestMethod::Get => Method::GET,
        RequestMethod::Head => Method::HEAD,
        RequestMethod::Post => Method::POST,
        RequestMethod::Put => Method::PUT,
        RequestMethod::Patch => Method::PATCH,
        RequestMethod::Delete => Method::DELETE,
        RequestMethod::Options => Method::OPTIONS,
    }
}

#[async_trait]
impl NetworkPort for ReqwestNetworkAdapter {
    #[instrument(skip(self), fields(method = %request.method, url = %request.url))]
    async fn fetch(&self, request: &ResourceRequest) -> Result<ResourceResponse, ApplicationError> {
        let url = self.resolve(&request.url)?;

        let response = self
            .client
            .request(to_reqwest_method(request.method), url)
            .send()
            .await
            .map_err(|e| ApplicationError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApplicationError::Network(e.to_string()))?
            .to_vec();

        debug!(status, bytes = body.len(), "Fetched resource");
        Ok(ResourceResponse {
            status,
            headers,
            body,
        })
    }
}
