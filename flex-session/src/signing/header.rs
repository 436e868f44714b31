//! Structured `signature` header value.

use std::{fmt, str::FromStr};

use crate::{
    error::{Result, SessionError},
    signing::{SIGNATURE_ALGORITHM, SIGNED_HEADERS},
};

/// Parsed or generated `signature` header.
///
/// Rendered as
/// `keyid="{key_id}", algorithm="{algorithm}", headers="{headers}", signature="{signature}"`.
///
/// # Examples
///
/// ```
/// use flex_session::signing::SignatureHeader;
///
/// let header = SignatureHeader::new("key-1", "c2ln");
/// assert_eq!(
///     header.to_string(),
///     "keyid=\"key-1\", algorithm=\"HmacSHA256\", \
///      headers=\"host date (request-target) digest v-c-merchant-id\", signature=\"c2ln\""
/// );
///
/// let parsed: SignatureHeader = header.to_string().parse().unwrap();
/// assert_eq!(parsed, header);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Merchant key id.
    pub key_id: String,
    /// Algorithm name, `HmacSHA256` for generated headers.
    pub algorithm: String,
    /// Space-separated signed header list.
    pub headers: String,
    /// Base64 HMAC value.
    pub signature: String,
}

impl SignatureHeader {
    /// Creates a header with the fixed algorithm and header list.
    #[must_use]
    pub fn new(key_id: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            algorithm: SIGNATURE_ALGORITHM.to_owned(),
            headers: SIGNED_HEADERS.to_owned(),
            signature: signature.into(),
        }
    }
}

impl fmt::Display for SignatureHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "keyid=\"{}\", algorithm=\"{}\", headers=\"{}\", signature=\"{}\"",
            self.key_id, self.algorithm, self.headers, self.signature
        )
    }
}

impl FromStr for SignatureHeader {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self> {
        let mut key_id = None;
        let mut algorithm = None;
        let mut headers = None;
        let mut signature = None;

        let mut rest = s.trim();
        while !rest.is_empty() {
            let (name, after_name) = rest
                .split_once("=\"")
                .ok_or_else(|| mismatch(format!("expected name=\"value\" in: {rest}")))?;
            let (value, after_value) = after_name
                .split_once('"')
                .ok_or_else(|| mismatch(format!("unterminated value for {name}")))?;

            let slot = match name.trim() {
                "keyid" => &mut key_id,
                "algorithm" => &mut algorithm,
                "headers" => &mut headers,
                "signature" => &mut signature,
                other => return Err(mismatch(format!("unknown parameter: {other}"))),
            };
            if slot.replace(value.to_owned()).is_some() {
                return Err(mismatch(format!("duplicate parameter: {}", name.trim())));
            }

            rest = after_value.trim_start();
            if let Some(next) = rest.strip_prefix(',') {
                rest = next.trim_start();
            } else if !rest.is_empty() {
                return Err(mismatch(format!("expected ',' before: {rest}")));
            }
        }

        Ok(Self {
            key_id: key_id.ok_or_else(|| mismatch("missing keyid".to_owned()))?,
            algorithm: algorithm.ok_or_else(|| mismatch("missing algorithm".to_owned()))?,
            headers: headers.ok_or_else(|| mismatch("missing headers".to_owned()))?,
            signature: signature.ok_or_else(|| mismatch("missing signature".to_owned()))?,
        })
    }
}

fn mismatch(reason: String) -> SessionError {
    SessionError::SignatureMismatch(format!("malformed signature header: {reason}"))
}
