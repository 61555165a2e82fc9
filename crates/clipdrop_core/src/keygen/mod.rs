//! Short, human-friendly item keys.
//!
//! Keys are drawn from [`KEY_ALPHABET`] with a random length in
//! `KEY_MIN_LEN..=KEY_MAX_LEN`. Identity is case-insensitive: storage only
//! ever sees the output of [`normalize_key`].

use crate::constants::{KEY_ALPHABET, KEY_MAX_LEN, KEY_MIN_LEN};
use rand::Rng;

/// Generate a random key using the thread-local RNG.
///
/// Uniqueness is not guaranteed here; the item store retries on collision.
pub fn generate_key() -> String {
    generate_key_with(&mut rand::thread_rng())
}

/// Generate a random key from the supplied RNG.
pub fn generate_key_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let len = rng.gen_range(KEY_MIN_LEN..=KEY_MAX_LEN);
    (0..len)
        .map(|_| char::from(KEY_ALPHABET[rng.gen_range(0..KEY_ALPHABET.len())]))
        .collect()
}

/// Canonical storage form of a key.
///
/// Applied on every lookup path (insert, fetch, increment, delete). Only ASCII
/// letters are folded, so non-ASCII input cannot alias a generated key.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}
