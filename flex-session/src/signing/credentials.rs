//! Merchant credentials used to sign gateway requests.

use std::fmt;

use base64::Engine as _;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{Result, SessionError};

/// Merchant identity and shared secret issued by the gateway.
///
/// The secret is kept in its base64 form until signing, is wiped on drop and is
/// redacted from `Debug` output.
///
/// # Examples
///
/// ```
/// use flex_session::signing::MerchantCredentials;
///
/// let credentials = MerchantCredentials::new("merchant-1", "key-1", "dGVzdC1rZXk=");
/// assert_eq!(credentials.merchant_id(), "merchant-1");
/// assert!(!format!("{credentials:?}").contains("dGVzdC1rZXk="));
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MerchantCredentials {
    merchant_id: String,
    merchant_key_id: String,
    merchant_secret_key_b64: String,
}

impl MerchantCredentials {
    /// Creates credentials from configuration values.
    #[must_use]
    pub fn new(
        merchant_id: impl Into<String>,
        merchant_key_id: impl Into<String>,
        merchant_secret_key_b64: impl Into<String>,
    ) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            merchant_key_id: merchant_key_id.into(),
            merchant_secret_key_b64: merchant_secret_key_b64.into(),
        }
    }

    /// Merchant identifier sent as `v-c-merchant-id`.
    #[must_use]
    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    /// Key identifier sent as `keyid` in the signature header.
    #[must_use]
    pub fn merchant_key_id(&self) -> &str {
        &self.merchant_key_id
    }

    /// Decodes the secret into raw HMAC key bytes.
    ///
    /// Surrounding ASCII whitespace is ignored so that values read from files or
    /// environment variables with a trailing newline still decode.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidKeyEncoding`] if the secret is empty or not valid
    /// standard base64.
    pub fn decode_secret(&self) -> Result<Zeroizing<Vec<u8>>> {
        let encoded = self.merchant_secret_key_b64.trim_ascii();
        if encoded.is_empty() {
            return Err(SessionError::InvalidKeyEncoding("secret key is empty".to_owned()));
        }

        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map(Zeroizing::new)
            .map_err(|e| SessionError::InvalidKeyEncoding(e.to_string()))
    }
}

impl fmt::Debug for MerchantCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerchantCredentials")
            .field("merchant_id", &self.merchant_id)
            .field("merchant_key_id", &self.merchant_key_id)
            .field("merchant_secret_key_b64", &"<redacted>")
            .finish()
    }
}
