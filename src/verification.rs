use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::types::VerificationResponse;

type HmacSha256 = Hmac<Sha256>;

/// Response header carrying the signed challenge.
pub const OUTBOUND_TOKEN_HEADER: &str = "x-outbound-token";

/// Hex-encoded HMAC-SHA256 of `body` keyed with `secret`.
pub fn sign(secret: &[u8], body: &[u8]) -> String {
    // HMAC accepts keys of any length; new_from_slice cannot fail here.
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// A signed handshake reply: the exact body bytes and the token over them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedChallenge {
    pub body: Vec<u8>,
    pub token: String,
}

/// Answers webhook registration handshakes with the shared webhook secret.
#[derive(Clone)]
pub struct WebhookSigner {
    secret: Vec<u8>,
}

impl WebhookSigner {
    /// `secret` is validated non-empty by the config layer.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Serialize `{"response": challenge}` and sign exactly those bytes.
    pub fn answer(&self, challenge: &str) -> SignedChallenge {
        let body = serde_json::to_vec(&VerificationResponse {
            response: challenge,
        })
        .unwrap_or_default();
        let token = sign(&self.secret, &body);
        SignedChallenge { body, token }
    }
}

impl std::fmt::Debug for WebhookSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookSigner").finish_non_exhaustive()
    }
}
