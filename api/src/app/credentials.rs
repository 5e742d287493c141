//! Password hashing and session tokens
//!
//! Passwords are stretched with PBKDF2-HMAC-SHA256 (single 32-byte block)
//! over a per-user random salt and a server-side pepper. Session tokens are
//! random and only their SHA-256 hash is stored.

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Prefix of every session token
pub const TOKEN_PREFIX: &str = "lh-";

/// Default PBKDF2 iteration count
pub const DEFAULT_PASSWORD_ITERATIONS: u32 = 100_000;

/// Password hashing parameters
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    pepper: String,
    iterations: u32,
}

impl PasswordHasher {
    pub fn new(pepper: impl Into<String>, iterations: u32) -> Self {
        Self {
            pepper: pepper.into(),
            iterations: iterations.max(1),
        }
    }

    /// Hash a password with a fresh salt. Returns (hash_hex, salt_hex).
    pub fn hash_new(&self, password: &str) -> (String, String) {
        let salt = generate_salt();
        (self.hash(password, &salt), salt)
    }

    /// Hash a password with the given salt
    pub fn hash(&self, password: &str, salt: &str) -> String {
        hex::encode(self.derive(password, salt))
    }

    /// Verify a password against a stored hash in constant time
    pub fn verify(&self, password: &str, salt: &str, expected_hex: &str) -> bool {
        let Ok(expected) = hex::decode(expected_hex) else {
            return false;
        };
        constant_time_eq(&self.derive(password, salt), &expected)
    }

    fn derive(&self, password: &str, salt: &str) -> [u8; 32] {
        let prf = || {
            HmacSha256::new_from_slice(password.as_bytes())
                .expect("HMAC accepts keys of any length")
        };

        let mut mac = prf();
        mac.update(self.pepper.as_bytes());
        mac.update(salt.as_bytes());
        mac.update(&1u32.to_be_bytes());
        let mut block = [0u8; 32];
        block.copy_from_slice(&mac.finalize().into_bytes());
        let mut output = block;

        for _ in 1..self.iterations {
            let mut mac = prf();
            mac.update(&block);
            block.copy_from_slice(&mac.finalize().into_bytes());
            for (o, b) in output.iter_mut().zip(block.iter()) {
                *o ^= b;
            }
        }

        output
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn generate_salt() -> String {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..16).map(|_| rng.gen()).collect();
    hex::encode(bytes)
}

/// Generate a random session token
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
    format!("{}{}", TOKEN_PREFIX, hex::encode(bytes))
}

/// Hash a session token for storage
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
