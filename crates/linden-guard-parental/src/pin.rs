//! PIN hashing.
//!
//! No memory-hard hash is available in this stack, so this is the
//! documented fallback: PBKDF2-HMAC-SHA256 with a high iteration count
//! and a random per-profile salt. The iteration count is stored with the
//! hash so it can be raised later without invalidating old profiles.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;
pub(crate) const PBKDF2_ITERATIONS: u32 = 310_000;

/// A salted PIN hash as persisted in the parent profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinHash {
    pub salt: String,
    pub hash: String,
    pub iterations: u32,
}

impl PinHash {
    /// Hash a PIN with a fresh random salt.
    pub fn derive(pin: &str) -> Self {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);

        let mut out = [0u8; HASH_LEN];
        pbkdf2_hmac::<Sha256>(pin.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut out);

        Self {
            salt: hex::encode(salt),
            hash: hex::encode(out),
            iterations: PBKDF2_ITERATIONS,
        }
    }

    /// Verify a PIN against this hash in constant time.
    pub fn verify(&self, pin: &str) -> bool {
        let Ok(salt) = hex::decode(&self.salt) else {
            return false;
        };
        let Ok(expected) = hex::decode(&self.hash) else {
            return false;
        };

        let mut out = vec![0u8; expected.len().max(1)];
        pbkdf2_hmac::<Sha256>(pin.as_bytes(), &salt, self.iterations, &mut out);

        ct_eq(&out, &expected)
    }
}

/// Constant-time byte comparison.
fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
