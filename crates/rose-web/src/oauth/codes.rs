//! Verification codes and nonces.

use rand::Rng;

/// Smallest six-digit code.
pub const CODE_MIN: u32 = 100_000;
/// Largest six-digit code.
pub const CODE_MAX: u32 = 999_999;

/// Generate a random six-digit code for which `is_taken` returns false.
///
/// Retries until a free code is found; with at most a few live handshakes the
/// collision probability is negligible.
pub fn generate_code(is_taken: impl Fn(&str) -> bool) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let code = rng.gen_range(CODE_MIN..=CODE_MAX).to_string();
        if !is_taken(&code) {
            return code;
        }
    }
}

/// Generate a cryptographically random nonce (32 hex characters).
#[must_use]
pub fn generate_nonce() -> String {
    let bytes: [u8; 16] = rand::random();
    hex::encode(bytes)
}

/// Returns true if `code` has the shape of a generated code.
#[must_use]
pub fn is_well_formed(code: &str) -> bool {
    code.len() == 6
        && code.bytes().all(|b| b.is_ascii_digit())
        && code.parse::<u32>().is_ok_and(|n| (CODE_MIN..=CODE_MAX).contains(&n))
}
