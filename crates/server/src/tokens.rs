//! Random token generation for every credential this service hands out.
//!
//! All values come from the operating system CSPRNG.

use base64::Engine;
use rand::{Rng, RngCore, distributions::Alphanumeric, rngs::OsRng};

/// Length of SSO and password reset tokens.
pub const TOKEN_LENGTH: usize = 30;

/// Generate a [`TOKEN_LENGTH`] character token over `[A-Za-z0-9]`.
///
/// Used for SSO handoff tokens and password reset links, both of which end up
/// in URLs and must stay readable.
pub fn generate_token() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Generate an opaque bearer access token.
///
/// Returns 32 random bytes as URL-safe base64 without padding.
pub fn generate_access_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
