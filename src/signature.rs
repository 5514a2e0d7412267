use crate::error::AppError;

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Check a hex HMAC-SHA256 signature over the raw webhook body.
///
/// The digest comparison is constant-time. Malformed hex is treated the same as a mismatch.
pub fn verify_signature(body: &[u8], signature: &str, secret: &str) -> Result<(), AppError> {
    let provided = hex::decode(signature.trim()).map_err(|_| AppError::SignatureRejected)?;
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| AppError::SignatureRejected)?;
    mac.update(body);
    mac.verify_slice(&provided)
        .map_err(|_| AppError::SignatureRejected)
}

/// Hex HMAC-SHA256 of `body`, as Vogent puts it in `X-Elto-Signature`.
#[cfg(test)]
pub fn sign(body: &[u8], secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}
