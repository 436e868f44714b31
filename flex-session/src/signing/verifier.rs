//! Verification of signed gateway requests.
//!
//! Mirrors the checks the gateway performs, so a signed request can be validated locally
//! before it leaves the process.

use std::time::Duration;

use base64::Engine as _;
use chrono::{DateTime, Utc};
use subtle::ConstantTimeEq;
use tracing::{debug, instrument, warn};

use crate::{
    error::{Result, SessionError},
    signing::{
        MerchantCredentials, SIGNATURE_ALGORITHM, SIGNED_HEADERS, SignatureHeader,
        crypto::{CryptoProvider, Sha256Hmac},
        signer::RequestSigner,
    },
};

/// A request as received, before verification.
#[derive(Debug, Clone, Copy)]
pub struct ReceivedRequest<'a> {
    /// `host` header value.
    pub host: &'a str,
    /// `date` header value.
    pub date: &'a str,
    /// Request path.
    pub resource_path: &'a str,
    /// `digest` header value.
    pub digest: &'a str,
    /// `v-c-merchant-id` header value.
    pub merchant_id: &'a str,
    /// `signature` header value.
    pub signature: &'a str,
    /// Raw request body.
    pub body: &'a [u8],
}

/// Verifies HMAC-signed requests against merchant credentials.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use flex_session::signing::{
///     MerchantCredentials, ReceivedRequest, RequestSigner, SignatureVerifier, SigningContext,
/// };
///
/// # fn example() -> flex_session::error::Result<()> {
/// let credentials = MerchantCredentials::new("m1", "key-1", "dGVzdC1rZXk=");
/// let ctx = SigningContext::new("{}", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
/// let headers = RequestSigner::new().sign_request(&ctx, "api.example.com", &credentials)?;
/// let signature = headers.signature.to_string();
///
/// let request = ReceivedRequest {
///     host: &headers.host,
///     date: &headers.date,
///     resource_path: &ctx.resource_path,
///     digest: &headers.digest,
///     merchant_id: &headers.merchant_id,
///     signature: &signature,
///     body: ctx.payload.as_bytes(),
/// };
///
/// SignatureVerifier::new().verify(&request, &credentials)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SignatureVerifier<C = Sha256Hmac> {
    signer: RequestSigner<C>,
    max_clock_skew: Option<Duration>,
}

impl SignatureVerifier {
    /// Creates a verifier backed by SHA-256 and HMAC-SHA256, without a clock skew limit.
    #[must_use]
    pub const fn new() -> Self {
        Self { signer: RequestSigner::new(), max_clock_skew: None }
    }
}

impl<C: CryptoProvider> SignatureVerifier<C> {
    /// Creates a verifier with custom hash primitives.
    #[must_use]
    pub const fn with_crypto(crypto: C) -> Self {
        Self { signer: RequestSigner::with_crypto(crypto), max_clock_skew: None }
    }

    /// Rejects requests whose `date` differs from the verification time by more than `skew`.
    #[must_use]
    pub fn with_max_clock_skew(mut self, skew: Duration) -> Self {
        self.max_clock_skew = Some(skew);
        self
    }

    /// Verifies a request at the current time.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SignatureMismatch`] if any check fails and
    /// [`SessionError::InvalidKeyEncoding`] if the secret cannot be decoded.
    pub fn verify(
        &self,
        request: &ReceivedRequest<'_>,
        credentials: &MerchantCredentials,
    ) -> Result<()> {
        self.verify_at(request, credentials, Utc::now())
    }

    /// Verifies a request as of `now`.
    ///
    /// Checks, in order: header structure, key id, algorithm, signed header list, clock
    /// skew, body digest, then the HMAC value in constant time.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SignatureMismatch`] if any check fails and
    /// [`SessionError::InvalidKeyEncoding`] if the secret cannot be decoded.
    #[instrument(
        skip(self, request, credentials),
        fields(host = request.host, merchant_id = request.merchant_id, body_len = request.body.len())
    )]
    pub fn verify_at(
        &self,
        request: &ReceivedRequest<'_>,
        credentials: &MerchantCredentials,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let header: SignatureHeader = request.signature.parse()?;

        if header.key_id != credentials.merchant_key_id() {
            return Err(SessionError::SignatureMismatch(format!(
                "unknown key id: {}",
                header.key_id
            )));
        }
        if header.algorithm != SIGNATURE_ALGORITHM {
            return Err(SessionError::SignatureMismatch(format!(
                "unsupported algorithm: {}",
                header.algorithm
            )));
        }
        if header.headers != SIGNED_HEADERS {
            return Err(SessionError::SignatureMismatch(format!(
                "unexpected signed headers: {}",
                header.headers
            )));
        }
        if request.merchant_id != credentials.merchant_id() {
            return Err(SessionError::SignatureMismatch(
                "merchant id does not match credentials".to_owned(),
            ));
        }

        if let Some(max_skew) = self.max_clock_skew {
            Self::check_clock_skew(request.date, now, max_skew)?;
        }

        let expected_digest = self.signer.compute_digest_bytes(request.body);
        if !bool::from(expected_digest.as_bytes().ct_eq(request.digest.as_bytes())) {
            warn!("digest header does not match body");
            return Err(SessionError::SignatureMismatch(
                "digest does not match request body".to_owned(),
            ));
        }

        let signing_string = RequestSigner::<C>::build_signing_string(
            request.host,
            request.date,
            request.resource_path,
            request.digest,
            request.merchant_id,
        );
        let expected = self.signer.compute_signature_value(&signing_string, credentials)?;

        let expected_bytes = base64::engine::general_purpose::STANDARD
            .decode(&expected)
            .map_err(|e| SessionError::SignatureMismatch(format!("internal encoding: {e}")))?;
        let provided_bytes = base64::engine::general_purpose::STANDARD
            .decode(&header.signature)
            .map_err(|e| SessionError::SignatureMismatch(format!("signature is not base64: {e}")))?;

        if !bool::from(expected_bytes.ct_eq(&provided_bytes)) {
            warn!("signature value mismatch");
            return Err(SessionError::SignatureMismatch("signature value mismatch".to_owned()));
        }

        debug!("signature verified");
        Ok(())
    }

    fn check_clock_skew(date: &str, now: DateTime<Utc>, max_skew: Duration) -> Result<()> {
        let signed_at = DateTime::parse_from_rfc2822(date)
            .map_err(|e| SessionError::SignatureMismatch(format!("invalid date header: {e}")))?
            .with_timezone(&Utc);

        let skew = (now - signed_at).abs().to_std().map_err(|e| {
            SessionError::SignatureMismatch(format!("clock skew out of range: {e}"))
        })?;

        if skew > max_skew {
            return Err(SessionError::SignatureMismatch(format!(
                "date header is {}s away from now, limit is {}s",
                skew.as_secs(),
                max_skew.as_secs()
            )));
        }
        Ok(())
    }
}
