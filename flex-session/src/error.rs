//! Error types for Flex session creation.
//!
//! All fallible operations in this crate return [`SessionError`] through the [`Result`] alias.
//!
//! # Error Categories
//!
//! - **Key material** ([`SessionError::InvalidKeyEncoding`]): the merchant secret cannot be
//!   decoded; raised before any network call
//! - **Network** ([`SessionError::TransportError`]): the HTTP exchange did not complete
//! - **Gateway** ([`SessionError::GatewayRejection`]): the gateway answered with a non-success
//!   status
//! - **Configuration** ([`SessionError::InvalidConfig`]): rejected input or settings
//! - **Verification and tokens** ([`SessionError::SignatureMismatch`],
//!   [`SessionError::InvalidToken`], [`SessionError::TokenizationError`])
//!
//! # Examples
//!
//! ```
//! use flex_session::error::{Result, SessionError};
//!
//! fn require_host(host: &str) -> Result<&str> {
//!     if host.is_empty() {
//!         return Err(SessionError::InvalidConfig("run environment host is empty".to_owned()));
//!     }
//!     Ok(host)
//! }
//!
//! assert!(require_host("apitest.cybersource.com").is_ok());
//! ```

use thiserror::Error;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that can occur while signing or creating a gateway session.
///
/// No variant is retried internally. Each call performs at most one gateway request, so
/// retrying a [`TransportError`](Self::TransportError) creates a new, distinct session.
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum SessionError {
    /// The merchant secret key is not valid base64 key material.
    ///
    /// Raised while preparing the signature, so no request has been sent.
    ///
    /// # Recovery
    ///
    /// Check the configured secret. It must be the base64-encoded shared secret issued
    /// for the merchant key id, not the raw text.
    #[error("Invalid merchant secret key encoding: {0}")]
    InvalidKeyEncoding(String),

    /// The HTTP exchange with the gateway could not complete.
    ///
    /// Wraps [`reqwest::Error`]. Common causes:
    /// - DNS resolution failures
    /// - Connection refused or reset
    /// - TLS errors
    /// - Request or connect timeout
    #[error("Gateway request failed: {0}")]
    TransportError(#[from] reqwest::Error),

    /// The gateway answered with a non-success HTTP status.
    ///
    /// Status and body are passed through untouched. Typical causes are a signature
    /// mismatch, a `date` header outside the accepted clock skew, or a malformed payload.
    /// What the body means depends on the gateway.
    #[error("Gateway rejected session request with status {status}: {body}")]
    GatewayRejection {
        /// HTTP status code returned by the gateway.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Configuration or input failed validation.
    ///
    /// # Examples
    ///
    /// ```
    /// use flex_session::error::SessionError;
    ///
    /// let err = SessionError::InvalidConfig("MERCHANT_ID is not set".to_owned());
    /// assert!(err.to_string().contains("Invalid configuration"));
    /// ```
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Session payload serialization failed.
    #[error("Payload serialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A signed request did not verify.
    #[error("Signature verification failed: {0}")]
    SignatureMismatch(String),

    /// A token could not be decoded.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// The tokenization widget reported a failure or never answered.
    #[error("Card tokenization failed: {0}")]
    TokenizationError(String),
}

impl SessionError {
    /// Returns the gateway status code for [`GatewayRejection`](Self::GatewayRejection)
    /// errors, or the transport status when reqwest captured one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::GatewayRejection { status, .. } => Some(*status),
            Self::TransportError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if the request never reached the gateway or its outcome is unknown.
    ///
    /// A caller implementing its own retry policy can use this to decide whether a
    /// second attempt makes sense.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::TransportError(_))
    }
}
