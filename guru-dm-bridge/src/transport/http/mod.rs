//! HTTP transport implementation on top of reqwest.

use std::sync::LazyLock;

use reqwest::{Client, Method};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use super::config::{HttpConfig, HttpVersion};
use crate::{
    config::{is_loopback_host, is_safe_path},
    error::{BridgeError, Result},
    request::{ApiRequest, HttpMethod},
    transport::Transport,
};

/// Longest error body kept in [`BridgeError::ApiError`] messages.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Client behind [`HttpTransport::new`], built once from [`HttpConfig::default`].
static DEFAULT_HTTP_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    build_client(&HttpConfig::default()).expect("default HTTP client configuration is valid")
});

fn build_client(config: &HttpConfig) -> reqwest::Result<Client> {
    let builder = Client::builder()
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .user_agent(config.user_agent());

    match config.http_version {
        HttpVersion::Http1 => builder.http1_only(),
        HttpVersion::Http2 => builder.http2_prior_knowledge(),
        HttpVersion::Auto => builder,
    }
    .build()
}

/// Checks everything about a request that can be rejected without sending it.
///
/// Returns the final URL.
fn preflight(base_url: &Url, request: &ApiRequest, allow_insecure: bool) -> Result<Url> {
    if !allow_insecure {
        if base_url.scheme() != "https" {
            return Err(BridgeError::TransportError(format!(
                "refusing to send credentials over {}",
                base_url.scheme()
            )));
        }
        if is_loopback_host(base_url) {
            return Err(BridgeError::TransportError("loopback hosts are not allowed".to_owned()));
        }
    }

    if !is_safe_path(&request.path) {
        return Err(BridgeError::TransportError(format!("unsafe request path {:?}", request.path)));
    }

    let injected = |text: &str| text.contains(['\r', '\n', '\0']);
    let mut headers = request.headers.iter();
    if let Some((name, _)) = headers.find(|(name, value)| injected(name) || injected(value)) {
        return Err(BridgeError::TransportError(format!(
            "header {name:?} contains line breaks or NUL"
        )));
    }

    request.url(base_url)
}

/// Decodes a 2xx body: empty is `null`, JSON is parsed, anything else is
/// kept as a JSON string.
fn parse_body(bytes: &[u8]) -> Result<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    if let Ok(value) = serde_json::from_slice(bytes) {
        return Ok(value);
    }

    let text = std::str::from_utf8(bytes)
        .map_err(|e| BridgeError::InvalidResponse(format!("body is neither JSON nor UTF-8: {e}")))?;
    Ok(Value::String(text.trim().to_owned()))
}

/// Builds the message of an [`BridgeError::ApiError`] from the response body.
fn error_message(bytes: &[u8], reason: Option<&str>) -> String {
    let body = String::from_utf8_lossy(bytes);
    let body = body.trim();
    if body.is_empty() {
        return reason.unwrap_or("no response body").to_owned();
    }

    let mut message: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    if body.chars().count() > MAX_ERROR_BODY_CHARS {
        message.push_str("...");
    }
    message
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// [`Transport`] that sends requests with reqwest.
///
/// Base URLs must be HTTPS and non-loopback unless
/// [`allow_insecure`](Self::allow_insecure) is set. A non-2xx status becomes
/// [`BridgeError::ApiError`] carrying the (truncated) response body.
///
/// # Examples
///
/// ```
/// use guru_dm_bridge::transport::{HttpConfig, HttpTransport, HttpVersion};
///
/// let config =
///     HttpConfig { timeout_secs: 60, http_version: HttpVersion::Http1, ..Default::default() };
/// let transport = HttpTransport::with_config(&config).unwrap();
/// ```
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    http_version: HttpVersion,
    allow_insecure: bool,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    /// Creates a transport on a shared client with the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: DEFAULT_HTTP_CLIENT.clone(),
            http_version: HttpVersion::Auto,
            allow_insecure: false,
        }
    }

    /// Creates a transport with its own client.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ConfigError`] if the settings are out of range,
    /// or [`BridgeError::HttpError`] if reqwest cannot build the client.
    pub fn with_config(config: &HttpConfig) -> Result<Self> {
        config.validate()?;
        let client = build_client(config)?;

        Ok(Self { client, http_version: config.http_version, allow_insecure: false })
    }

    /// Accepts `http://` and loopback base URLs (local mock servers).
    #[must_use]
    pub const fn allow_insecure(mut self, allow: bool) -> Self {
        self.allow_insecure = allow;
        self
    }

    #[instrument(
        skip(self, base_url, request),
        fields(method = %request.method, path = %request.path, status = tracing::field::Empty)
    )]
    async fn execute_request(&self, base_url: &Url, request: &ApiRequest) -> Result<Value> {
        let url = preflight(base_url, request, self.allow_insecure)?;

        let builder = request.headers.iter().fold(
            self.client.request(to_reqwest_method(request.method), url),
            |builder, (name, value)| builder.header(name, value),
        );
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        tracing::Span::current().record("status", status.as_u16());

        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(BridgeError::ApiError {
                status: status.as_u16(),
                message: error_message(&bytes, status.canonical_reason()),
            });
        }

        debug!(bytes = bytes.len(), "response received");
        parse_body(&bytes)
    }
}

impl Transport for HttpTransport {
    async fn execute<'a>(&'a self, base_url: &'a Url, request: &'a ApiRequest) -> Result<Value> {
        self.execute_request(base_url, request).await
    }

    fn protocol_name(&self) -> &'static str {
        match self.http_version {
            HttpVersion::Http1 => "http/1.1",
            HttpVersion::Http2 => "http/2",
            HttpVersion::Auto => "http",
        }
    }
}
