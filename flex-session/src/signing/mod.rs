//! HTTP signature authentication for the Flex session endpoint.
//!
//! The gateway authenticates session requests with a shared-secret HTTP signature. Each
//! request carries:
//!
//! - **digest**: `SHA-256=` followed by the base64 SHA-256 of the exact request body
//! - **date**: RFC 1123 timestamp, also embedded in the signed string
//! - **v-c-merchant-id**: the merchant identifier
//! - **signature**: key id, algorithm, signed header list and HMAC-SHA256 value
//!
//! # Signing String
//!
//! Both sides rebuild the same five lines, in this order, joined by `\n` with no trailing
//! newline:
//!
//! ```text
//! host: apitest.cybersource.com
//! date: Mon, 01 Jan 2024 00:00:00 GMT
//! (request-target): post /microform/v2/sessions
//! digest: SHA-256=RBNvo1WzZ4oRRq0W9+hknpT7T8If536DEMBg9hyq/4o=
//! v-c-merchant-id: m1
//! ```
//!
//! The HMAC key is the base64-decoded merchant secret, never its text form. Reordering a
//! line, changing case or adding whitespace yields a valid-looking request that the
//! gateway rejects.
//!
//! # Key Components
//!
//! - [`RequestSigner`]: digest and signature generation
//! - [`SignatureHeader`]: the structured `signature` header value
//! - [`SignatureVerifier`]: recomputes and checks a signed request
//! - [`CryptoProvider`]: injectable hash and keyed-hash primitives
//!
//! # Examples
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use flex_session::signing::{MerchantCredentials, RequestSigner, SigningContext};
//!
//! # fn example() -> flex_session::error::Result<()> {
//! let credentials = MerchantCredentials::new("m1", "key-1", "dGVzdC1rZXk=");
//! let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let ctx = SigningContext::new("{}", now);
//!
//! let signer = RequestSigner::new();
//! let headers = signer.sign_request(&ctx, "api.example.com", &credentials)?;
//!
//! assert_eq!(headers.digest, "SHA-256=RBNvo1WzZ4oRRq0W9+hknpT7T8If536DEMBg9hyq/4o=");
//! assert_eq!(headers.date, "Mon, 01 Jan 2024 00:00:00 GMT");
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod credentials;
pub mod crypto;
pub mod header;
pub mod signer;
pub mod verifier;

pub use context::{RESOURCE_PATH, SigningContext, format_http_date};
pub use credentials::MerchantCredentials;
pub use crypto::{CryptoProvider, Sha256Hmac};
pub use header::SignatureHeader;
pub use signer::{RequestSigner, SignedHeaders, compute_digest};
pub use verifier::{ReceivedRequest, SignatureVerifier};

/// Prefix of the `digest` header value.
pub const DIGEST_PREFIX: &str = "SHA-256=";

/// Algorithm name announced in the `signature` header.
pub const SIGNATURE_ALGORITHM: &str = "HmacSHA256";

/// Signed header list, in signing-string order.
pub const SIGNED_HEADERS: &str = "host date (request-target) digest v-c-merchant-id";
