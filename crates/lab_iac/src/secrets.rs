//! Random secret generation.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{IacError, IacResult};

/// Number of random bytes behind every generated password or token.
pub const SECRET_BYTES: usize = 12;

/// Draw `len` bytes from the operating system CSPRNG and base64-encode them.
pub fn random_base64(len: usize) -> IacResult<String> {
    let mut bytes = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| IacError::RandomSource(e.to_string()))?;
    Ok(STANDARD.encode(bytes))
}

/// Generate a default password or token.
pub fn generate_secret() -> IacResult<String> {
    random_base64(SECRET_BYTES)
}
