// Webhook payload signatures
//
// The platform signs every POST body with the app secret and sends the
// result as `X-Hub-Signature-256: sha256=<hex>`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the body signature
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

const SIGNATURE_PREFIX: &str = "sha256=";

/// Why a webhook body was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// No signature header while one is required
    Missing,
    /// Header present but not `sha256=<hex>`
    Malformed,
    /// Header well-formed but does not match the body
    Mismatch,
}

impl std::fmt::Display for SignatureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignatureError::Missing => write!(f, "Missing request signature"),
            SignatureError::Malformed => write!(f, "Malformed request signature"),
            SignatureError::Mismatch => write!(f, "Request signature does not match"),
        }
    }
}

impl std::error::Error for SignatureError {}

/// Header value for `body` signed with `app_secret`
pub fn sign(app_secret: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(app_secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(body);
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(mac.finalize().into_bytes()))
}

/// Check a webhook body against its signature header
///
/// # Returns
/// * `Ok(())` if the signature matches, or is absent and not required
/// * `Err(SignatureError)` otherwise
pub fn verify_signature(
    header: Option<&str>,
    body: &[u8],
    app_secret: &str,
    required: bool,
) -> Result<(), SignatureError> {
    let header = match header {
        Some(value) => value.trim(),
        None if required => return Err(SignatureError::Missing),
        None => {
            tracing::warn!("Webhook request has no signature header, accepting unverified");
            return Ok(());
        }
    };

    let provided = header
        .strip_prefix(SIGNATURE_PREFIX)
        .filter(|hex| !hex.is_empty())
        .ok_or(SignatureError::Malformed)?;

    let expected = sign(app_secret, body);
    let expected = &expected[SIGNATURE_PREFIX.len()..];

    if constant_time_compare(&provided.to_ascii_lowercase(), expected) {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
