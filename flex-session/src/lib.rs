//! Flex Session: HMAC-Signed Microform Session Creation
//!
//! A Rust library that creates card-entry sessions on the Flex tokenization gateway. A
//! merchant backend signs one `POST /microform/v2/sessions` with its shared secret and hands
//! the returned session token to the browser-side microform widget, which exchanges the
//! entered card for a transient card token.
//!
//! # What Does It Do?
//!
//! - **Digest**: `SHA-256=` + base64 of the exact request body
//! - **Signature**: HMAC-SHA256 over a canonical string of `host`, `date`, request target,
//!   `digest` and `v-c-merchant-id`, keyed with the decoded merchant secret
//! - **Session request**: one signed `POST`, body returned verbatim, never retried
//! - **Widget contract**: mount the hosted fields and await a single card token
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ Merchant backend │  credentials + target origin + run environment
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────────────────────────────────┐
//! │               flex-session                   │
//! │  ┌──────────────────┐   ┌─────────────────┐  │
//! │  │ SessionRequester │───│  RequestSigner  │  │
//! │  │ (payload, URL)   │   │ (digest + HMAC) │  │
//! │  └────────┬─────────┘   └─────────────────┘  │
//! │           │ Transport (one attempt)          │
//! └───────────┼──────────────────────────────────┘
//!             │ HTTPS
//! ┌───────────▼──────────┐
//! │ Tokenization gateway │  POST /microform/v2/sessions
//! └──────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## 1. Create a Session
//!
//! ```rust,no_run
//! use flex_session::{
//!     config::{RunEnvironment, SessionRequestConfig},
//!     session::SessionRequester,
//!     signing::MerchantCredentials,
//! };
//!
//! # async fn example() -> flex_session::Result<()> {
//! let credentials = MerchantCredentials::new("merchant-1", "key-1", "c2VjcmV0LWtleQ==");
//! let config = SessionRequestConfig::new("https://shop.example.com", RunEnvironment::Test);
//!
//! let requester = SessionRequester::new()?;
//! let token = requester.request_session(&credentials, &config).await?;
//!
//! println!("Session: {token}");
//! # Ok(())
//! # }
//! ```
//!
//! ## 2. Sign Without Sending
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use flex_session::signing::{MerchantCredentials, RequestSigner, SigningContext};
//!
//! # fn example() -> flex_session::Result<()> {
//! let credentials = MerchantCredentials::new("m1", "key-1", "dGVzdC1rZXk=");
//! let ctx = SigningContext::new("{}", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
//!
//! let headers = RequestSigner::new().sign_request(&ctx, "api.example.com", &credentials)?;
//! assert_eq!(headers.digest, "SHA-256=RBNvo1WzZ4oRRq0W9+hknpT7T8If536DEMBg9hyq/4o=");
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All operations return [`Result<T, SessionError>`](error::Result). A malformed secret
//! fails before anything is sent. Network failures and non-2xx statuses are surfaced as
//! [`SessionError::TransportError`] and [`SessionError::GatewayRejection`]; neither is
//! retried.
//!
//! # Security
//!
//! - The merchant secret is zeroized on drop and redacted from `Debug` output
//! - Secrets never appear in tracing spans or events
//! - All timeouts are finite
//! - Header values containing CR, LF or NUL are refused before sending

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest and wiremock"
)]

pub mod config;
pub mod error;
pub mod microform;
pub mod session;
pub mod signing;
pub mod transport;

pub use config::{GatewayConfig, RunEnvironment, SessionRequestConfig};
pub use error::{Result, SessionError};
pub use session::{CardToken, SessionRequester, SessionToken};
pub use signing::MerchantCredentials;
