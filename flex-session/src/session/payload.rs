//! Session creation request body.

use serde::Serialize;

use crate::error::Result;

/// Client library version the session is issued for.
pub const CLIENT_VERSION: &str = "v2.0";

/// Card networks the microform accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardNetwork {
    /// Visa.
    Visa,
    /// Maestro.
    Maestro,
    /// Mastercard.
    Mastercard,
    /// American Express.
    Amex,
    /// Discover.
    Discover,
    /// Diners Club.
    DinersClub,
    /// JCB.
    Jcb,
    /// China UnionPay.
    Cup,
    /// Cartes Bancaires.
    CartesBancaires,
    /// Carnet.
    Carnet,
}

impl CardNetwork {
    /// Every supported network, in the order the gateway documents them.
    pub const ALL: [Self; 10] = [
        Self::Visa,
        Self::Maestro,
        Self::Mastercard,
        Self::Amex,
        Self::Discover,
        Self::DinersClub,
        Self::Jcb,
        Self::Cup,
        Self::CartesBancaires,
        Self::Carnet,
    ];
}

/// JSON body of `POST /microform/v2/sessions`.
///
/// Fields serialize in declaration order, which is the order the body is signed in.
///
/// # Examples
///
/// ```
/// use flex_session::session::{CardNetwork, SessionPayload};
///
/// let payload = SessionPayload::new("https://shop.example.com")
///     .with_allowed_card_networks([CardNetwork::Visa]);
///
/// assert_eq!(
///     payload.to_json().unwrap(),
///     r#"{"targetOrigins":["https://shop.example.com"],"allowedCardNetworks":["VISA"],"clientVersion":"v2.0"}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    /// Origins allowed to host the card fields.
    pub target_origins: Vec<String>,
    /// Accepted card networks.
    pub allowed_card_networks: Vec<CardNetwork>,
    /// Client library version.
    pub client_version: String,
}

impl SessionPayload {
    /// Creates a payload for one origin accepting every network.
    #[must_use]
    pub fn new(target_origin: impl Into<String>) -> Self {
        Self {
            target_origins: vec![target_origin.into()],
            allowed_card_networks: CardNetwork::ALL.to_vec(),
            client_version: CLIENT_VERSION.to_owned(),
        }
    }

    /// Narrows the accepted card networks.
    #[must_use]
    pub fn with_allowed_card_networks(
        mut self,
        networks: impl IntoIterator<Item = CardNetwork>,
    ) -> Self {
        self.allowed_card_networks = networks.into_iter().collect();
        self
    }

    /// Serializes to compact JSON. The result is both signed and sent.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SerializationError`](crate::error::SessionError::SerializationError)
    /// if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::compute_digest;

    const FULL_BODY: &str = r#"{"targetOrigins":["https://shop.example.com"],"allowedCardNetworks":["VISA","MAESTRO","MASTERCARD","AMEX","DISCOVER","DINERSCLUB","JCB","CUP","CARTESBANCAIRES","CARNET"],"clientVersion":"v2.0"}"#;

    #[test]
    fn test_default_payload_serialization() {
        let json = SessionPayload::new("https://shop.example.com").to_json().unwrap();
        assert_eq!(json, FULL_BODY);
    }

    #[test]
    fn test_default_payload_digest() {
        let json = SessionPayload::new("https://shop.example.com").to_json().unwrap();
        assert_eq!(
            compute_digest(&json),
            "SHA-256=REMzxF4LlNj0OUx43J3BvOvmg7oZeAdrOvWuENdLB6Q="
        );
    }

    #[test]
    fn test_card_network_wire_names() {
        let names: Vec<String> = CardNetwork::ALL
            .iter()
            .map(|n| serde_json::to_value(n).unwrap().as_str().unwrap().to_owned())
            .collect();
        assert_eq!(
            names,
            [
                "VISA",
                "MAESTRO",
                "MASTERCARD",
                "AMEX",
                "DISCOVER",
                "DINERSCLUB",
                "JCB",
                "CUP",
                "CARTESBANCAIRES",
                "CARNET"
            ]
        );
    }

    #[test]
    fn test_narrowed_networks() {
        let payload = SessionPayload::new("https://shop.example.com")
            .with_allowed_card_networks([CardNetwork::Mastercard, CardNetwork::Amex]);
        let json = payload.to_json().unwrap();
        assert!(json.contains(r#""allowedCardNetworks":["MASTERCARD","AMEX"]"#));
    }

    #[test]
    fn test_origin_is_not_rewritten() {
        let json = SessionPayload::new("http://localhost:3000").to_json().unwrap();
        assert!(json.starts_with(r#"{"targetOrigins":["http://localhost:3000"],"#));
    }
}
