//! Tokens returned by the gateway and the card-entry widget.
//!
//! Both are compact JWTs. This crate never verifies them; the claims are exposed for
//! display and debugging only.

use std::fmt;

use base64::Engine as _;
use serde_json::Value;

use crate::error::{Result, SessionError};

/// Session identifier returned by `POST /microform/v2/sessions`.
///
/// Holds the response body exactly as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

/// Transient card token produced by the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardToken(String);

macro_rules! token_impls {
    ($name:ident) => {
        impl $name {
            /// Wraps a raw token string.
            #[must_use]
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Returns the raw token.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the wrapper, returning the raw token.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Decodes the JWT payload without checking its signature.
            ///
            /// # Errors
            ///
            /// Returns [`SessionError::InvalidToken`] if the token is not a three-part JWT
            /// whose payload is a base64url JSON object.
            pub fn decode_unverified_claims(&self) -> Result<Value> {
                decode_unverified_claims(&self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

token_impls!(SessionToken);
token_impls!(CardToken);

fn decode_unverified_claims(token: &str) -> Result<Value> {
    let mut segments = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (segments.next(), segments.next(), segments.next(), segments.next())
    else {
        return Err(SessionError::InvalidToken("expected three dot-separated segments".to_owned()));
    };

    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| SessionError::InvalidToken(format!("payload is not base64url: {e}")))?;

    let claims: Value = serde_json::from_slice(&bytes)
        .map_err(|e| SessionError::InvalidToken(format!("payload is not JSON: {e}")))?;

    if !claims.is_object() {
        return Err(SessionError::InvalidToken("payload is not a JSON object".to_owned()));
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn encode(value: &Value) -> String {
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(value.to_string())
    }

    fn jwt(claims: &Value) -> String {
        format!("{}.{}.c2ln", encode(&json!({"alg": "RS256", "kid": "k"})), encode(claims))
    }

    #[test]
    fn test_decode_session_token_claims() {
        let token = SessionToken::new(jwt(&json!({"iss": "Flex API", "exp": 1_700_000_000})));
        let claims = token.decode_unverified_claims().unwrap();
        assert_eq!(claims["iss"], "Flex API");
        assert_eq!(claims["exp"], 1_700_000_000);
    }

    #[test]
    fn test_decode_card_token_claims() {
        let token = CardToken::from(jwt(&json!({"jti": "abc", "data": {"number": "411111XXXXXX1111"}})));
        let claims = token.decode_unverified_claims().unwrap();
        assert_eq!(claims["data"]["number"], "411111XXXXXX1111");
    }

    #[test]
    fn test_decode_accepts_padded_payload() {
        let payload = base64::engine::general_purpose::URL_SAFE.encode(r#"{"a":1}"#);
        let token = SessionToken::new(format!("e30.{payload}.sig"));
        assert_eq!(token.decode_unverified_claims().unwrap()["a"], 1);
    }

    #[test]
    fn test_decode_rejects_wrong_segment_count() {
        for raw in ["", "abc", "a.b", "a.b.c.d"] {
            let err = SessionToken::new(raw).decode_unverified_claims().unwrap_err();
            assert!(matches!(err, SessionError::InvalidToken(_)), "{raw:?}");
        }
    }

    #[test]
    fn test_decode_rejects_bad_payload() {
        let not_base64 = SessionToken::new("e30.***.sig");
        assert!(not_base64.decode_unverified_claims().is_err());

        let not_json = SessionToken::new(format!(
            "e30.{}.sig",
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode("not json")
        ));
        assert!(not_json.decode_unverified_claims().is_err());

        let not_object = SessionToken::new(format!("e30.{}.sig", encode(&json!([1, 2]))));
        assert!(not_object.decode_unverified_claims().is_err());
    }

    #[test]
    fn test_display_is_raw_token() {
        let token = SessionToken::new("raw-body");
        assert_eq!(token.to_string(), "raw-body");
        assert_eq!(token.as_str(), "raw-body");
        assert_eq!(token.into_inner(), "raw-body");
    }
}
