//! PBKDF2-SHA256 password hashes.
//!
//! Stored form: `pbkdf2-sha256$<iterations>$<salt hex>$<key hex>`. The
//! iteration count travels with the hash, so raising the default does not
//! invalidate existing accounts.
//!
//! Accounts created by the earlier service hold a bare 64-character hex
//! SHA-256 digest with no salt; `verify_password` still accepts those.

use pbkdf2::pbkdf2_hmac;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

pub const DEFAULT_ITERATIONS: u32 = 600_000;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LENGTH: usize = 16;
const KEY_LENGTH: usize = 32;
const MAX_KEY_LENGTH: usize = 64;

fn derive(password: &str, salt: &[u8], iterations: u32, out: &mut [u8]) {
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, out);
}

/// Hash `password` under a fresh random salt.
pub fn hash_password(password: &str, iterations: u32) -> String {
    let mut salt = [0u8; SALT_LENGTH];
    OsRng.fill_bytes(&mut salt);

    let mut key = [0u8; KEY_LENGTH];
    derive(password, &salt, iterations, &mut key);
    format!("{SCHEME}${iterations}${}${}", hex::encode(salt), hex::encode(key))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split('$').collect::<Vec<_>>().as_slice() {
        [SCHEME, iterations, salt, key] => verify_pbkdf2(password, iterations, salt, key),
        [legacy] if legacy.len() == 64 => {
            let digest = hex::encode(Sha256::digest(password.as_bytes()));
            digest.as_bytes().ct_eq(legacy.to_ascii_lowercase().as_bytes()).into()
        }
        _ => false,
    }
}

fn verify_pbkdf2(password: &str, iterations: &str, salt: &str, key: &str) -> bool {
    let (Ok(iterations), Ok(salt), Ok(expected)) =
        (iterations.parse::<u32>(), hex::decode(salt), hex::decode(key))
    else {
        return false;
    };
    if iterations == 0 || expected.is_empty() || expected.len() > MAX_KEY_LENGTH {
        return false;
    }

    let mut actual = vec![0u8; expected.len()];
    derive(password, &salt, iterations, &mut actual);
    actual.ct_eq(&expected).into()
}
