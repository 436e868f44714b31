//! Authenticated session creation against the gateway.

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};
use url::Url;

use crate::{
    config::{GatewayConfig, SessionRequestConfig, parse_base_url},
    error::{Result, SessionError},
    session::{
        payload::{CardNetwork, SessionPayload},
        token::SessionToken,
    },
    signing::{
        MerchantCredentials, RESOURCE_PATH, RequestSigner, SignedHeaders, SigningContext,
        crypto::{CryptoProvider, Sha256Hmac},
    },
    transport::{GatewayRequest, HttpTransport, Transport, TransportResponse},
};

/// A signed request that has not been sent.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// Absolute request URL.
    pub url: Url,
    /// Authentication and content headers in wire order.
    pub headers: Vec<(&'static str, String)>,
    /// Exact body that was digested and signed.
    pub body: String,
    /// The signed header values.
    pub signed: SignedHeaders,
}

impl PreparedRequest {
    /// Borrows the request in the form the transport sends.
    #[must_use]
    pub fn as_gateway_request(&self) -> GatewayRequest<'_> {
        GatewayRequest { url: &self.url, headers: &self.headers, body: &self.body }
    }
}

/// Creates gateway sessions with one signed `POST` per call.
///
/// Holds no per-request state. One requester can be shared by concurrent tasks.
///
/// # Examples
///
/// ```rust,no_run
/// use flex_session::{
///     config::{RunEnvironment, SessionRequestConfig},
///     session::SessionRequester,
///     signing::MerchantCredentials,
/// };
///
/// # async fn example() -> flex_session::error::Result<()> {
/// let requester = SessionRequester::new()?;
/// let credentials = MerchantCredentials::new("merchant-1", "key-1", "c2VjcmV0LWtleQ==");
/// let config = SessionRequestConfig::new("https://shop.example.com", RunEnvironment::Test);
///
/// let token = requester.request_session(&credentials, &config).await?;
/// println!("{token}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SessionRequester<T = HttpTransport, C = Sha256Hmac> {
    transport: T,
    signer: RequestSigner<C>,
    base_url: Option<String>,
    allowed_card_networks: Vec<CardNetwork>,
}

impl SessionRequester {
    /// Creates a requester with the default HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::TransportError`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Ok(Self::from_parts(HttpTransport::new()?, RequestSigner::new()))
    }

    /// Creates a requester from a gateway configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfig`] if the transport settings or base URL are
    /// invalid.
    pub fn with_config(config: &GatewayConfig) -> Result<Self> {
        let transport = HttpTransport::with_config(&config.http)?;
        let requester = Self::from_parts(transport, RequestSigner::new());
        match &config.base_url {
            Some(base_url) => requester.with_base_url(base_url),
            None => Ok(requester),
        }
    }
}

impl<T: Transport, C: CryptoProvider> SessionRequester<T, C> {
    /// Assembles a requester from a transport and a signer.
    #[must_use]
    pub fn from_parts(transport: T, signer: RequestSigner<C>) -> Self {
        Self { transport, signer, base_url: None, allowed_card_networks: CardNetwork::ALL.to_vec() }
    }

    /// Sends requests to `base_url` instead of `https://{run_environment}`.
    ///
    /// The signed `host` header keeps naming the run environment.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfig`] if `base_url` is not an absolute http(s) URL.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        parse_base_url(base_url)?;
        self.base_url = Some(base_url.trim_end_matches('/').to_owned());
        Ok(self)
    }

    /// Narrows the card networks requested for new sessions.
    #[must_use]
    pub fn with_allowed_card_networks(
        mut self,
        networks: impl IntoIterator<Item = CardNetwork>,
    ) -> Self {
        self.allowed_card_networks = networks.into_iter().collect();
        self
    }

    /// Returns the transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Builds the body, digest, signature and URL for a request signed at `now`.
    ///
    /// No network activity happens here.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidKeyEncoding`] if the secret cannot be decoded and
    /// [`SessionError::InvalidConfig`] if no URL can be formed for the run environment.
    pub fn prepare(
        &self,
        credentials: &MerchantCredentials,
        config: &SessionRequestConfig,
        now: DateTime<Utc>,
    ) -> Result<PreparedRequest> {
        let body = SessionPayload::new(config.target_origin.as_str())
            .with_allowed_card_networks(self.allowed_card_networks.iter().copied())
            .to_json()?;
        let ctx = SigningContext::new(body, now);
        let signed = self.signer.sign_request(&ctx, &config.run_environment, credentials)?;
        let url = self.session_url(&config.run_environment)?;

        Ok(PreparedRequest { url, headers: signed.to_header_pairs(), body: ctx.payload, signed })
    }

    /// Creates a session, signing the request with the current time.
    ///
    /// Makes exactly one attempt.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidKeyEncoding`]: malformed secret, nothing was sent
    /// - [`SessionError::TransportError`]: the exchange did not complete
    /// - [`SessionError::GatewayRejection`]: non-2xx status, with status and body verbatim
    pub async fn request_session(
        &self,
        credentials: &MerchantCredentials,
        config: &SessionRequestConfig,
    ) -> Result<SessionToken> {
        self.request_session_at(credentials, config, Utc::now()).await
    }

    /// Creates a session with a request signed at `now`.
    ///
    /// # Errors
    ///
    /// See [`request_session`](Self::request_session).
    #[instrument(
        skip(self, credentials, config, now),
        fields(
            merchant_id = credentials.merchant_id(),
            run_environment = %config.run_environment,
            protocol = self.transport.protocol_name()
        )
    )]
    pub async fn request_session_at(
        &self,
        credentials: &MerchantCredentials,
        config: &SessionRequestConfig,
        now: DateTime<Utc>,
    ) -> Result<SessionToken> {
        let prepared = self.prepare(credentials, config, now)?;
        let response = self.transport.post(prepared.as_gateway_request()).await?;
        Self::token_from_response(response)
    }

    fn session_url(&self, run_environment: &str) -> Result<Url> {
        let origin = match &self.base_url {
            Some(base_url) => base_url.clone(),
            None => format!("https://{run_environment}"),
        };
        Url::parse(&format!("{origin}{RESOURCE_PATH}")).map_err(|e| {
            SessionError::InvalidConfig(format!("cannot build session URL for '{origin}': {e}"))
        })
    }

    fn token_from_response(response: TransportResponse) -> Result<SessionToken> {
        if !response.is_success() {
            let body = String::from_utf8_lossy(&response.body).into_owned();
            warn!(
                status = response.status,
                body_len = body.len(),
                "gateway rejected session request"
            );
            return Err(SessionError::GatewayRejection { status: response.status, body });
        }

        let body = String::from_utf8(response.body).map_err(|e| {
            SessionError::InvalidToken(format!("session response is not UTF-8: {e}"))
        })?;
        info!(status = response.status, token_len = body.len(), "gateway session created");
        Ok(SessionToken::new(body))
    }
}
