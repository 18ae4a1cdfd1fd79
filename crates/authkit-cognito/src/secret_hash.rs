//! `SECRET_HASH` computation for app clients with a secret.

use base64::{Engine as _, engine::general_purpose::STANDARD as base64};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use authkit_core::error::InvalidInputError;
use authkit_core::{ClientSecret, Result};

type HmacSha256 = Hmac<Sha256>;

/// Base64 of HMAC-SHA256 keyed by the client secret over `username || client_id`.
pub fn secret_hash(secret: &ClientSecret, username: &str, client_id: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.expose().as_bytes()).map_err(|e| {
        InvalidInputError::Other {
            message: format!("unusable client secret: {}", e),
        }
    })?;
    mac.update(username.as_bytes());
    mac.update(client_id.as_bytes());
    Ok(base64.encode(mac.finalize().into_bytes()))
}
