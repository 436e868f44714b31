//! Hash primitives used by the signer.
//!
//! The signer never calls `sha2` or `hmac` directly. It goes through [`CryptoProvider`], so
//! tests can substitute deterministic fixtures and alternative backends can be plugged in.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::error::{Result, SessionError};

type HmacSha256 = Hmac<Sha256>;

/// Content hash and keyed hash capability.
///
/// Implementations must be pure: the same input always produces the same output.
pub trait CryptoProvider: Send + Sync {
    /// Hashes `data` for the `digest` header (SHA-256 for the gateway).
    fn content_hash(&self, data: &[u8]) -> Vec<u8>;

    /// Computes a keyed hash of `data` with raw `key` bytes (HMAC-SHA256 for the gateway).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidKeyEncoding`] if the key is unusable.
    fn keyed_hash(&self, key: &[u8], data: &[u8]) -> Result<Vec<u8>>;
}

/// SHA-256 content hash and HMAC-SHA256 keyed hash from the RustCrypto crates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sha256Hmac;

impl CryptoProvider for Sha256Hmac {
    fn content_hash(&self, data: &[u8]) -> Vec<u8> {
        Sha256::digest(data).to_vec()
    }

    fn keyed_hash(&self, key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(key)
            .map_err(|e| SessionError::InvalidKeyEncoding(format!("unusable HMAC key: {e}")))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

impl<P: CryptoProvider + ?Sized> CryptoProvider for &P {
    fn content_hash(&self, data: &[u8]) -> Vec<u8> {
        (**self).content_hash(data)
    }

    fn keyed_hash(&self, key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        (**self).keyed_hash(key, data)
    }
}
