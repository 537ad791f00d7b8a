//! Passphrase-derived key material.
//!
//! There is no key file and no stored salt: the 256-bit base key is derived
//! deterministically from the passphrase alone. A wrong passphrase is never
//! detected up front - decryption runs to completion and surfaces as a
//! trailer mismatch.

use std::fmt;

use crate::block::Block;

/// The 256-bit base key every round subkey is derived from.
///
/// Derivation: SHA-256 of the passphrase bytes, with the digest rehashed
/// [`HASHING_REPEATS`](crate::block::HASHING_REPEATS) more times in place.
#[derive(Clone, Copy)]
pub struct BaseKey(Block);

impl BaseKey {
    /// Derive the base key from a passphrase. Never fails; an empty
    /// passphrase is accepted.
    pub fn from_passphrase(passphrase: &[u8]) -> Self {
        let mut k = Block::hash_of(passphrase);
        k.harden();
        BaseKey(k)
    }

    pub(crate) fn block(&self) -> Block {
        self.0
    }
}

// Key material stays out of logs and panic messages.
impl fmt::Debug for BaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BaseKey(..)")
    }
}
