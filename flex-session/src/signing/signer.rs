//! Digest and HMAC signature generation for gateway requests.

use base64::Engine as _;
use tracing::instrument;

use crate::{
    error::Result,
    signing::{
        DIGEST_PREFIX, MerchantCredentials, SignatureHeader, SigningContext,
        crypto::{CryptoProvider, Sha256Hmac},
    },
};

/// Computes the `digest` header value for a payload with SHA-256.
///
/// The hash covers the exact UTF-8 bytes of `payload`. Pass the same string that is sent
/// as the request body.
///
/// # Examples
///
/// ```
/// use flex_session::signing::compute_digest;
///
/// assert_eq!(compute_digest("{}"), "SHA-256=RBNvo1WzZ4oRRq0W9+hknpT7T8If536DEMBg9hyq/4o=");
/// ```
#[must_use]
pub fn compute_digest(payload: &str) -> String {
    RequestSigner::new().compute_digest(payload)
}

/// Full set of authentication headers for one request.
///
/// `digest` is computed once and is the same value that went into the signing string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    /// `digest` header value.
    pub digest: String,
    /// `v-c-merchant-id` header value.
    pub merchant_id: String,
    /// `date` header value.
    pub date: String,
    /// `host` header value.
    pub host: String,
    /// `signature` header value.
    pub signature: SignatureHeader,
}

impl SignedHeaders {
    /// Returns `(name, value)` pairs in wire order, including `Content-Type`.
    #[must_use]
    pub fn to_header_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("digest", self.digest.clone()),
            ("v-c-merchant-id", self.merchant_id.clone()),
            ("date", self.date.clone()),
            ("host", self.host.clone()),
            ("signature", self.signature.to_string()),
            ("Content-Type", "application/json".to_owned()),
        ]
    }
}

/// Signs gateway requests with the merchant shared secret.
///
/// Holds no credentials or per-request state, so one signer can serve concurrent calls.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use flex_session::signing::{MerchantCredentials, RequestSigner, SigningContext};
///
/// # fn example() -> flex_session::error::Result<()> {
/// let credentials = MerchantCredentials::new("m1", "key-1", "dGVzdC1rZXk=");
/// let ctx = SigningContext::new("{}", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
///
/// let header = RequestSigner::new().sign(&ctx, "api.example.com", &credentials)?;
/// assert_eq!(header.signature, "9A3WillQgPNVFjkYDcI0oS1mxNdhQHKkoMbYbwGuMBg=");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestSigner<C = Sha256Hmac> {
    crypto: C,
}

impl RequestSigner {
    /// Creates a signer backed by SHA-256 and HMAC-SHA256.
    #[must_use]
    pub const fn new() -> Self {
        Self { crypto: Sha256Hmac }
    }
}

impl<C: CryptoProvider> RequestSigner<C> {
    /// Creates a signer with custom hash primitives.
    #[must_use]
    pub const fn with_crypto(crypto: C) -> Self {
        Self { crypto }
    }

    /// Returns the hash primitives in use.
    pub const fn crypto(&self) -> &C {
        &self.crypto
    }

    /// Computes the `digest` header value for `payload`.
    #[must_use]
    pub fn compute_digest(&self, payload: &str) -> String {
        self.compute_digest_bytes(payload.as_bytes())
    }

    /// Computes the `digest` header value for raw body bytes.
    #[must_use]
    pub fn compute_digest_bytes(&self, body: &[u8]) -> String {
        let hash = self.crypto.content_hash(body);
        let hash_b64 = base64::engine::general_purpose::STANDARD.encode(hash);
        format!("{DIGEST_PREFIX}{hash_b64}")
    }

    /// Produces the `signature` header for a request.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidKeyEncoding`](crate::error::SessionError::InvalidKeyEncoding)
    /// if the merchant secret is not valid base64.
    #[instrument(
        skip(self, ctx, credentials),
        fields(
            host,
            resource_path = %ctx.resource_path,
            payload_len = ctx.payload.len(),
            merchant_id = credentials.merchant_id()
        )
    )]
    pub fn sign(
        &self,
        ctx: &SigningContext,
        host: &str,
        credentials: &MerchantCredentials,
    ) -> Result<SignatureHeader> {
        let digest = self.compute_digest(&ctx.payload);
        self.sign_with_digest(ctx, host, &digest, credentials)
    }

    /// Produces every authentication header for a request.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidKeyEncoding`](crate::error::SessionError::InvalidKeyEncoding)
    /// if the merchant secret is not valid base64.
    pub fn sign_request(
        &self,
        ctx: &SigningContext,
        host: &str,
        credentials: &MerchantCredentials,
    ) -> Result<SignedHeaders> {
        let digest = self.compute_digest(&ctx.payload);
        let signature = self.sign_with_digest(ctx, host, &digest, credentials)?;

        Ok(SignedHeaders {
            digest,
            merchant_id: credentials.merchant_id().to_owned(),
            date: ctx.http_date.clone(),
            host: host.to_owned(),
            signature,
        })
    }

    /// Computes the base64 HMAC of a signing string with a base64-encoded secret.
    pub(crate) fn compute_signature_value(
        &self,
        signing_string: &str,
        credentials: &MerchantCredentials,
    ) -> Result<String> {
        let key = credentials.decode_secret()?;
        let mac = self.crypto.keyed_hash(&key, signing_string.as_bytes())?;
        Ok(base64::engine::general_purpose::STANDARD.encode(mac))
    }

    fn sign_with_digest(
        &self,
        ctx: &SigningContext,
        host: &str,
        digest: &str,
        credentials: &MerchantCredentials,
    ) -> Result<SignatureHeader> {
        let signing_string = Self::build_signing_string(
            host,
            &ctx.http_date,
            &ctx.resource_path,
            digest,
            credentials.merchant_id(),
        );
        let value = self.compute_signature_value(&signing_string, credentials)?;

        Ok(SignatureHeader::new(credentials.merchant_key_id(), value))
    }

    /// Builds the canonical signing string.
    ///
    /// This function is `pub(crate)` so `SignatureVerifier` can rebuild the same string.
    #[must_use]
    pub(crate) fn build_signing_string(
        host: &str,
        date: &str,
        resource_path: &str,
        digest: &str,
        merchant_id: &str,
    ) -> String {
        format!(
            "host: {host}\ndate: {date}\n(request-target): post {resource_path}\ndigest: \
             {digest}\nv-c-merchant-id: {merchant_id}"
        )
    }
}
