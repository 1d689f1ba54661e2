//! Webhook signature verification (`x-hub-signature-256`)

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

/// Header carrying the webhook signature
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

const SIGNATURE_PREFIX: &str = "sha256=";

type HmacSha256 = Hmac<Sha256>;

/// Compute the `sha256=<hex>` signature of a raw body
pub fn sign(body: &[u8], secret: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(body);
    Some(format!(
        "{}{}",
        SIGNATURE_PREFIX,
        hex::encode(mac.finalize().into_bytes())
    ))
}

/// Verifies webhook bodies against the shared secret
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    secret: Option<SecretString>,
}

impl SignatureVerifier {
    pub fn new(secret: Option<SecretString>) -> Self {
        Self { secret }
    }

    /// Check a claimed signature against the exact raw request body.
    ///
    /// Fails closed: a missing secret, missing header or anything other than
    /// `sha256=` followed by the lowercase hex digest is rejected. The digest
    /// comparison is constant-time.
    pub fn verify(&self, body: &[u8], claimed: Option<&str>) -> bool {
        let (Some(secret), Some(claimed)) = (self.secret.as_ref(), claimed) else {
            return false;
        };
        let secret = secret.expose_secret();
        if secret.is_empty() {
            return false;
        }

        let Some(digest) = claimed.strip_prefix(SIGNATURE_PREFIX) else {
            return false;
        };
        if !digest.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return false;
        }
        let Ok(claimed_bytes) = hex::decode(digest) else {
            return false;
        };

        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(body);
        mac.verify_slice(&claimed_bytes).is_ok()
    }
}
