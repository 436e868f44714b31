//! Gateway session creation.
//!
//! [`SessionRequester`] serializes the [`SessionPayload`], signs it and sends a single
//! `POST /microform/v2/sessions`. The response body is returned unmodified as a
//! [`SessionToken`], which the card-entry widget consumes (see [`crate::microform`]).
//!
//! # Request Shape
//!
//! ```text
//! POST https://{run_environment}/microform/v2/sessions
//! digest: SHA-256=...
//! v-c-merchant-id: {merchant_id}
//! date: Mon, 01 Jan 2024 00:00:00 GMT
//! host: {run_environment}
//! signature: keyid="...", algorithm="HmacSHA256", headers="...", signature="..."
//! Content-Type: application/json
//!
//! {"targetOrigins":[...],"allowedCardNetworks":[...],"clientVersion":"v2.0"}
//! ```

pub mod payload;
pub mod requester;
pub mod token;

pub use payload::{CLIENT_VERSION, CardNetwork, SessionPayload};
pub use requester::{PreparedRequest, SessionRequester};
pub use token::{CardToken, SessionToken};
