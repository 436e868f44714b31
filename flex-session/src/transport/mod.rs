//! Transport abstraction for the gateway exchange.
//!
//! The sealed [`Transport`] trait sends one already-signed request and reports what came
//! back. It never interprets status codes and never retries. Signing and status handling
//! live in [`SessionRequester`](crate::session::SessionRequester).
//!
//! # Examples
//!
//! ```rust,no_run
//! use flex_session::transport::{GatewayRequest, HttpTransport, Transport};
//! use url::Url;
//!
//! # async fn example() -> flex_session::error::Result<()> {
//! let transport = HttpTransport::new()?;
//! let url = Url::parse("https://apitest.cybersource.com/microform/v2/sessions").unwrap();
//! let headers = vec![("Content-Type", "application/json".to_owned())];
//!
//! let request = GatewayRequest { url: &url, headers: &headers, body: "{}" };
//! let response = transport.post(request).await?;
//! println!("Status: {}", response.status);
//! # Ok(())
//! # }
//! ```

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;

use url::Url;

use crate::error::Result;

pub mod config;
pub mod http;
pub(crate) mod sealed;

pub use config::{HttpConfig, HttpVersion};
pub use http::HttpTransport;

/// One outbound request, fully prepared.
#[derive(Debug, Clone, Copy)]
pub struct GatewayRequest<'a> {
    /// Absolute request URL.
    pub url: &'a Url,
    /// Headers in wire order.
    pub headers: &'a [(&'static str, String)],
    /// Request body, sent byte for byte.
    pub body: &'a str,
}

/// Response from the gateway.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body bytes.
    pub body: Vec<u8>,
    /// Response headers.
    pub headers: Vec<(String, String)>,
}

impl TransportResponse {
    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport for signed gateway requests.
///
/// This trait is sealed; only implementations within this crate exist, so every request
/// goes out exactly as the signer produced it.
pub trait Transport: sealed::private::Sealed + Send + Sync {
    /// Sends one POST request. Exactly one attempt is made.
    ///
    /// Non-success statuses are returned as a normal [`TransportResponse`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::TransportError`](crate::error::SessionError::TransportError)
    /// if the exchange does not complete.
    fn post<'a>(
        &'a self,
        request: GatewayRequest<'a>,
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a;

    /// Returns the protocol name for logging.
    fn protocol_name(&self) -> &'static str;
}
