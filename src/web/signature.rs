use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Header carrying the webhook body signature.
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

const SIGNATURE_PREFIX: &str = "sha256=";

type HmacSha256 = Hmac<Sha256>;

/// Signs `body` the way webhook senders do: `sha256=<hex digest>`.
pub fn sign(body: &[u8], secret: &str) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return String::new(),
    };
    mac.update(body);
    format!("{SIGNATURE_PREFIX}{}", hex::encode(mac.finalize().into_bytes()))
}

/// Checks `signature` against the HMAC-SHA256 of `body`.
///
/// Anything that is not `sha256=` followed by 64 hex digits is rejected.
/// The digest comparison is constant time.
pub fn verify(body: &[u8], signature: &str, secret: &str) -> bool {
    let Some(digest) = signature.strip_prefix(SIGNATURE_PREFIX) else {
        return false;
    };
    if digest.len() != 64 {
        return false;
    }
    let Ok(expected) = hex::decode(digest) else {
        return false;
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}
