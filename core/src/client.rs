//! Client factory and the generated client handle.
//!
//! # Design
//! `Client` has one named accessor field per model, fixed when the code was
//! generated. Construction only validates the base address and builds the
//! transport; nothing touches the network until an operation is called.
//! Every accessor shares the same immutable base address and transport, so
//! a `Client` can be cloned freely and used from several threads.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::accessor::Accessor;
use crate::error::{ClientError, RemoteError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::model::ModelDescriptor;
use crate::transport::{Transport, UreqTransport, DEFAULT_BODY_LIMIT};
use crate::types::{Post, User, MODELS};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const SERVICE: &str = "service";

/// Build a client for the service at `base_url` with default settings.
pub fn create_client(base_url: &str) -> Result<Client, ClientError> {
    Client::builder(base_url).build()
}

/// Settings for the default transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Deadline for one whole request, `None` for no deadline.
    pub timeout: Option<Duration>,
    pub user_agent: String,
    /// Largest response body read, in bytes.
    pub body_limit: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            user_agent: concat!("uniorm-client/", env!("CARGO_PKG_VERSION")).to_string(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

/// Builder for `Client`.
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: String,
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            config: ClientConfig::default(),
            transport: None,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn no_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn body_limit(mut self, limit: u64) -> Self {
        self.config.body_limit = limit;
        self
    }

    /// Replace the default `ureq` transport. Timeout, user agent and body
    /// limit settings only apply to the default transport.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        let transport: Arc<dyn Transport> = Arc::new(transport);
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<Client, ClientError> {
        let base_url: Arc<str> = Arc::from(normalize_base_url(&self.base_url)?);
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                UreqTransport::new(self.config.timeout, self.config.user_agent)
                    .body_limit(self.config.body_limit),
            ),
        };

        tracing::debug!(base_url = %base_url, "client created");

        Ok(Client {
            user: Accessor::new(Arc::clone(&base_url), Arc::clone(&transport)),
            post: Accessor::new(Arc::clone(&base_url), Arc::clone(&transport)),
            base_url,
            transport,
        })
    }
}

/// Check that `raw` is an `http(s)://host[:port][/prefix]` address and
/// return it without a trailing slash.
pub fn normalize_base_url(raw: &str) -> Result<String, ClientError> {
    let invalid = |reason: &str| {
        ClientError::Configuration(format!("invalid base address `{raw}`: {reason}"))
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host"));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(invalid("credentials are not allowed"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed"));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Handle exposing one accessor per model.
#[derive(Debug, Clone)]
pub struct Client {
    pub user: Accessor<User>,
    pub post: Accessor<Post>,
    base_url: Arc<str>,
    transport: Arc<dyn Transport>,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
}

/// Body of `GET /version`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceVersion {
    pub version: String,
}

impl Client {
    pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn models(&self) -> &'static [&'static ModelDescriptor] {
        MODELS
    }

    /// Ask the service whether it is up.
    pub fn health(&self) -> Result<ServiceHealth, ClientError> {
        self.service_get("health")
    }

    pub fn version(&self) -> Result<ServiceVersion, ClientError> {
        self.service_get("version")
    }

    fn service_get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let remote = |source| ClientError::Remote {
            model: SERVICE,
            source,
        };
        let request = HttpRequest::new(HttpMethod::Get, format!("{}/{path}", self.base_url));
        let HttpResponse { status, body, .. } = self
            .transport
            .execute(&request)
            .map_err(|e| remote(RemoteError::Transport(e)))?;
        if status != 200 {
            return Err(remote(RemoteError::Status { status, body }));
        }
        serde_json::from_str(&body).map_err(|e| remote(RemoteError::Decode(e.to_string())))
    }
}
