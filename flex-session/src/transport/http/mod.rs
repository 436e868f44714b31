//! HTTP transport implementation.
//!
//! HTTP/1.1 and HTTP/2 via reqwest with rustls.

use reqwest::Client;
use tracing::{debug, instrument};

use super::config::{HttpConfig, HttpVersion};
use crate::{
    error::{Result, SessionError},
    transport::{GatewayRequest, Transport, TransportResponse, sealed},
};

/// Rejects header values that would split or truncate the header block.
fn validate_header(name: &str, value: &str) -> Result<()> {
    if name.contains(['\r', '\n', '\0']) {
        return Err(SessionError::InvalidConfig(format!(
            "header name {name:?} contains control characters"
        )));
    }
    if value.contains(['\r', '\n', '\0']) {
        return Err(SessionError::InvalidConfig(format!(
            "value of header {name} contains control characters"
        )));
    }
    Ok(())
}

/// reqwest-based transport with connection pooling and finite timeouts.
///
/// # Examples
///
/// ```
/// use flex_session::transport::{HttpConfig, HttpTransport, HttpVersion, Transport};
///
/// let config = HttpConfig {
///     timeout_secs: 15,
///     http_version: HttpVersion::Http1,
///     ..HttpConfig::default()
/// };
///
/// let transport = HttpTransport::with_config(&config).unwrap();
/// assert_eq!(transport.protocol_name(), "http/1.1");
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    http_version: HttpVersion,
}

impl sealed::private::Sealed for HttpTransport {}

impl HttpTransport {
    /// Creates a transport with default settings (30s timeout, 10s connect timeout).
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_config(&HttpConfig::default())
    }

    /// Creates a transport with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfig`] if the configuration is out of range and
    /// [`SessionError::TransportError`] if the HTTP client cannot be built.
    pub fn with_config(config: &HttpConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout());

        builder = match config.http_version {
            HttpVersion::Http1 => builder.http1_only(),
            HttpVersion::Http2 => builder.http2_prior_knowledge(),
            HttpVersion::Auto => builder,
        };

        let client = builder.build().map_err(SessionError::TransportError)?;

        Ok(Self { client, http_version: config.http_version })
    }
}

impl Transport for HttpTransport {
    #[instrument(
        skip(self, request),
        fields(url = %request.url, body_len = request.body.len(), protocol = self.protocol_name())
    )]
    async fn post<'a>(&'a self, request: GatewayRequest<'a>) -> Result<TransportResponse> {
        let mut builder = self.client.post(request.url.clone());
        for (name, value) in request.headers {
            validate_header(name, value)?;
            builder = builder.header(*name, value);
        }

        let response = builder.body(request.body.to_owned()).send().await?;

        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_owned()))
            .collect();

        let body = response.bytes().await.map_err(SessionError::TransportError)?.to_vec();
        debug!(status, response_len = body.len(), "gateway responded");

        Ok(TransportResponse { status, body, headers })
    }

    fn protocol_name(&self) -> &'static str {
        match self.http_version {
            HttpVersion::Http1 => "http/1.1",
            HttpVersion::Http2 => "http/2",
            HttpVersion::Auto => "http",
        }
    }
}
