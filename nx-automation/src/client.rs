//! HTTP client for the automation endpoint.
//!
//! Wraps reqwest::Client with basic authentication, custom headers,
//! timeout management, SSL certificate handling, and the JSON/multipart
//! request lifecycle. Retry, backoff, and pooling policy beyond reqwest's
//! defaults are the caller's responsibility.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use nx_core::config::{ClientConfig, NonJsonPolicy};
use nx_core::constants;
use nx_core::error::{NxError, NxResult};

use crate::multipart::{BoundaryGenerator, EncodedMultipart, SystemBoundaryGenerator};
use crate::operation::Operation;
use crate::response::{self, OperationResponse};

/// HTTP client for an automation server.
///
/// One logical server call at a time per [`Operation`]; clone the client
/// freely, it shares one connection pool.
#[derive(Clone)]
pub struct AutomationClient {
    inner: Client,
    /// Automation endpoint root (e.g. "http://host:8080/nuxeo/site/automation").
    base_url: String,
    /// Basic-auth credentials.
    username: Option<String>,
    password: Option<String>,
    /// Extra headers applied to every request.
    custom_headers: Vec<(String, String)>,
    /// Default request timeout.
    timeout: Duration,
    /// Extended timeout for multipart uploads.
    extended_timeout: Duration,
    /// Directory for persisted non-JSON payloads.
    download_dir: PathBuf,
    /// What to do with non-JSON response payloads.
    non_json_policy: NonJsonPolicy,
    /// Boundary token source for multipart encoding.
    boundary_gen: Arc<dyn BoundaryGenerator>,
}

impl std::fmt::Debug for AutomationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutomationClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("custom_headers", &self.custom_headers)
            .field("timeout", &self.timeout)
            .field("extended_timeout", &self.extended_timeout)
            .field("download_dir", &self.download_dir)
            .field("non_json_policy", &self.non_json_policy)
            .finish_non_exhaustive()
    }
}

/// Builder for [`AutomationClient`].
pub struct AutomationClientBuilder {
    url: String,
    username: Option<String>,
    password: Option<String>,
    custom_headers: Vec<(String, String)>,
    timeout: Duration,
    accept_self_signed_certs: bool,
    download_dir: Option<PathBuf>,
    non_json_policy: NonJsonPolicy,
    boundary_gen: Arc<dyn BoundaryGenerator>,
}

impl AutomationClientBuilder {
    fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
            custom_headers: Vec::new(),
            timeout: Duration::from_millis(constants::DEFAULT_API_TIMEOUT_MS),
            accept_self_signed_certs: false,
            download_dir: None,
            non_json_policy: NonJsonPolicy::default(),
            boundary_gen: Arc::new(SystemBoundaryGenerator),
        }
    }

    /// Set basic-auth credentials.
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Add a header applied to every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push((name.into(), value.into()));
        self
    }

    /// Set the default request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Accept self-signed SSL certificates from the server.
    pub fn accept_self_signed_certs(mut self, accept: bool) -> Self {
        self.accept_self_signed_certs = accept;
        self
    }

    /// Directory where persisted non-JSON payloads land.
    pub fn download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = Some(dir.into());
        self
    }

    /// Policy for response payloads that fail JSON decoding.
    pub fn non_json_policy(mut self, policy: NonJsonPolicy) -> Self {
        self.non_json_policy = policy;
        self
    }

    /// Inject a boundary token generator (deterministic tests).
    pub fn boundary_generator(mut self, generator: Arc<dyn BoundaryGenerator>) -> Self {
        self.boundary_gen = generator;
        self
    }

    /// Build the client.
    pub fn build(self) -> NxResult<AutomationClient> {
        let base_url = ClientConfig::sanitize_server_url(&self.url);
        if base_url.is_empty() {
            return Err(NxError::MissingConfig("server url".into()));
        }

        let mut builder = Client::builder()
            .user_agent(format!(
                "{}/{}",
                constants::CLIENT_NAME,
                constants::CLIENT_VERSION
            ))
            .timeout(self.timeout)
            .connect_timeout(Duration::from_secs(15))
            .tcp_keepalive(Duration::from_secs(30));

        // Handle self-signed certificates
        if self.accept_self_signed_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let inner = builder
            .build()
            .map_err(|e| NxError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(AutomationClient {
            inner,
            base_url,
            username: self.username,
            password: self.password,
            custom_headers: self.custom_headers,
            timeout: self.timeout,
            extended_timeout: self.timeout * constants::EXTENDED_TIMEOUT_MULTIPLIER as u32,
            download_dir: self.download_dir.unwrap_or_else(std::env::temp_dir),
            non_json_policy: self.non_json_policy,
            boundary_gen: self.boundary_gen,
        })
    }
}

impl AutomationClient {
    /// Start building a client against the given automation endpoint URL.
    pub fn builder(url: impl Into<String>) -> AutomationClientBuilder {
        AutomationClientBuilder::new(url)
    }

    /// Build a client from a loaded [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> NxResult<Self> {
        let mut builder = Self::builder(&config.server.url)
            .timeout(Duration::from_millis(config.server.api_timeout_ms))
            .accept_self_signed_certs(config.server.accept_self_signed_certs)
            .download_dir(config.effective_download_dir())
            .non_json_policy(config.download.non_json_policy);

        if !config.server.username.is_empty() {
            builder = builder.basic_auth(&config.server.username, &config.server.password);
        }
        for (k, v) in &config.server.custom_headers {
            builder = builder.header(k, v);
        }

        builder.build()
    }

    /// The automation endpoint root URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start a new operation against this server.
    pub fn operation(&self, operation_id: impl Into<String>) -> Operation<'_> {
        Operation::new(self, Some(operation_id.into()))
    }

    /// Start an operation whose id will be supplied at execute time.
    pub fn operation_unnamed(&self) -> Operation<'_> {
        Operation::new(self, None)
    }

    pub(crate) fn boundary_generator(&self) -> &dyn BoundaryGenerator {
        self.boundary_gen.as_ref()
    }

    /// Full request URL for an operation id.
    fn url(&self, operation_id: &str) -> String {
        format!("{}/{}", self.base_url, operation_id)
    }

    /// Apply basic auth and custom/extra headers to a request builder.
    fn apply_headers(
        &self,
        mut builder: reqwest::RequestBuilder,
        extra_headers: &[(String, String)],
    ) -> reqwest::RequestBuilder {
        if let Some(ref username) = self.username {
            builder = builder.basic_auth(username, self.password.as_deref());
        }
        for (key, value) in self.custom_headers.iter().chain(extra_headers) {
            builder = builder.header(key.as_str(), value.as_str());
        }
        builder
    }

    /// POST a plain JSON request body and decode the result.
    ///
    /// A payload that is not JSON is handled per the configured
    /// [`NonJsonPolicy`]; connection failures surface as typed
    /// transport errors.
    pub(crate) async fn send_json(
        &self,
        operation_id: &str,
        extra_headers: &[(String, String)],
        body: &Value,
    ) -> NxResult<OperationResponse> {
        let url = self.url(operation_id);
        debug!("POST {}", operation_id);

        // serde_json keeps '/' literal, so document paths survive as-is.
        let json = serde_json::to_string(body).map_err(NxError::from)?;

        let builder = self
            .inner
            .post(&url)
            .timeout(self.timeout)
            .header(reqwest::header::CONTENT_TYPE, constants::CONTENT_TYPE_REQUEST)
            .header(reqwest::header::ACCEPT, constants::ACCEPT_ENTITY)
            .body(json);
        let builder = self.apply_headers(builder, extra_headers);

        let response = builder
            .send()
            .await
            .map_err(|e| self.classify_error(e, &url, operation_id))?;
        let response = self.check_status(response, operation_id).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.classify_error(e, &url, operation_id))?;

        response::decode_payload(
            operation_id,
            bytes.to_vec(),
            self.non_json_policy,
            &self.download_dir,
        )
        .await
    }

    /// POST an encoded multipart/related message and decode the result.
    ///
    /// Multipart responses are always structured; a non-JSON payload here
    /// is a decode failure regardless of policy.
    pub(crate) async fn send_multipart(
        &self,
        operation_id: &str,
        extra_headers: &[(String, String)],
        encoded: EncodedMultipart,
    ) -> NxResult<OperationResponse> {
        let url = self.url(operation_id);
        debug!(
            "POST (multipart, {} parts) {}",
            encoded.part_count(),
            operation_id
        );

        let builder = self
            .inner
            .post(&url)
            .timeout(self.extended_timeout)
            .header(reqwest::header::CONTENT_TYPE, encoded.content_type())
            .header(reqwest::header::ACCEPT, constants::ACCEPT_ENTITY)
            .body(encoded.into_bytes());
        let builder = self.apply_headers(builder, extra_headers);

        let response = builder
            .send()
            .await
            .map_err(|e| self.classify_error(e, &url, operation_id))?;
        let response = self.check_status(response, operation_id).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.classify_error(e, &url, operation_id))?;

        let json = serde_json::from_slice::<Value>(&bytes).map_err(|e| NxError::Decode {
            operation_id: operation_id.to_string(),
            message: e.to_string(),
        })?;
        Ok(OperationResponse::Json(json))
    }

    /// Check the HTTP status code and convert error statuses.
    async fn check_status(
        &self,
        response: reqwest::Response,
        operation_id: &str,
    ) -> NxResult<reqwest::Response> {
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            let message = exception_message(&body).unwrap_or(body);
            warn!("server returned {} for {}", status.as_u16(), operation_id);
            return Err(NxError::Server {
                status: status.as_u16(),
                operation_id: operation_id.to_string(),
                message,
            });
        }
        Ok(response)
    }

    /// Classify a reqwest error into a typed transport error.
    fn classify_error(&self, e: reqwest::Error, url: &str, operation_id: &str) -> NxError {
        let message = if e.is_timeout() {
            format!("request timed out: {e}")
        } else if e.is_connect() {
            format!("connection failed: {e}")
        } else {
            e.to_string()
        };
        NxError::Transport {
            url: url.to_string(),
            operation_id: operation_id.to_string(),
            message,
        }
    }
}

/// Error responses usually arrive as an `exception` entity; pull out
/// its message field when they do.
fn exception_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    if value.get("entity-type")?.as_str()? != constants::entity_types::EXCEPTION {
        return None;
    }
    value.get("message")?.as_str().map(String::from)
}
