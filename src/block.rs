//! Fixed-width value types the cipher operates on.
//!
//! A [`Block`] is 32 bytes of data, key, hash or IV material; a [`Half`] is
//! one 16-byte Feistel side. Both are plain byte arrays with value
//! semantics. Lane arithmetic (XOR, wrap-add, rotation) interprets the
//! bytes as **little-endian** 64-bit lanes on every platform - the on-disk
//! format was fixed by a little-endian implementation and must stay
//! bit-compatible everywhere.

use sha2::{Digest, Sha256};

/// Block size in bytes.
pub const BLOCK_BYTES: usize = 32;

/// Half-block size in bytes.
pub const HALF_BYTES: usize = BLOCK_BYTES / 2;

/// Number of extra SHA-256 iterations applied when hardening a block in
/// place (key derivation and IV generation).
pub const HASHING_REPEATS: usize = 2;

/// One 32-byte (256-bit) block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Block(pub [u8; BLOCK_BYTES]);

impl Block {
    /// SHA-256 of an arbitrary byte string, as a block.
    pub fn hash_of(data: &[u8]) -> Self {
        Block(Sha256::digest(data).into())
    }

    /// Copy `BLOCK_BYTES` bytes starting at `offset` out of a buffer.
    pub fn from_slice(buf: &[u8], offset: usize) -> Self {
        Block(std::array::from_fn(|i| buf[offset + i]))
    }

    /// Lanewise XOR.
    pub fn xor(self, rhs: Self) -> Self {
        let mut out = [0u8; BLOCK_BYTES];
        for (o, (a, b)) in out.iter_mut().zip(self.0.iter().zip(rhs.0.iter())) {
            *o = a ^ b;
        }
        Block(out)
    }

    /// Lanewise 64-bit addition with no carry between lanes.
    ///
    /// Not true 256-bit addition; the four lanes wrap independently.
    pub fn wrap_add(self, rhs: Self) -> Self {
        let mut out = [0u8; BLOCK_BYTES];
        for i in 0..4 {
            let a = u64::from_le_bytes(std::array::from_fn(|k| self.0[i * 8 + k]));
            let b = u64::from_le_bytes(std::array::from_fn(|k| rhs.0[i * 8 + k]));
            out[i * 8..i * 8 + 8].copy_from_slice(&a.wrapping_add(b).to_le_bytes());
        }
        Block(out)
    }

    /// Replace the contents with SHA-256 of the current contents.
    pub fn rehash(&mut self) {
        self.0 = Sha256::digest(self.0).into();
    }

    /// Rehash [`HASHING_REPEATS`] times.
    pub fn harden(&mut self) {
        for _ in 0..HASHING_REPEATS {
            self.rehash();
        }
    }

    /// Split into the left and right Feistel sides, in stream order.
    pub fn halves(self) -> (Half, Half) {
        (
            Half(std::array::from_fn(|i| self.0[i])),
            Half(std::array::from_fn(|i| self.0[HALF_BYTES + i])),
        )
    }

    /// Rejoin two Feistel sides.
    pub fn join(l: Half, r: Half) -> Self {
        let mut out = [0u8; BLOCK_BYTES];
        out[..HALF_BYTES].copy_from_slice(&l.0);
        out[HALF_BYTES..].copy_from_slice(&r.0);
        Block(out)
    }
}

/// One 16-byte (128-bit) Feistel side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Half(pub [u8; HALF_BYTES]);

impl Half {
    /// Lanewise XOR.
    pub fn xor(self, rhs: Self) -> Self {
        let mut out = [0u8; HALF_BYTES];
        for (o, (a, b)) in out.iter_mut().zip(self.0.iter().zip(rhs.0.iter())) {
            *o = a ^ b;
        }
        Half(out)
    }

    /// Rotate right by `n` bits, `0 < n < 64`.
    ///
    /// This is **not** a true 128-bit rotate. Each 64-bit lane is shifted
    /// right with the vacated high bits filled from the *other* lane:
    ///
    /// ```text
    /// out0 = (l0 >> n) | (l1 << (64 - n))
    /// out1 = (l1 >> n) | (l0 << (64 - n))
    /// ```
    ///
    /// The wire format depends on this exact formula, so it is kept verbatim.
    pub fn ror(self, n: u32) -> Self {
        debug_assert!(n > 0 && n < 64);
        let [l0, l1] = self.lanes();
        Half::from_lanes([
            (l0 >> n) | (l1 << (64 - n)),
            (l1 >> n) | (l0 << (64 - n)),
        ])
    }

    fn lanes(self) -> [u64; 2] {
        [
            u64::from_le_bytes(std::array::from_fn(|i| self.0[i])),
            u64::from_le_bytes(std::array::from_fn(|i| self.0[8 + i])),
        ]
    }

    fn from_lanes(lanes: [u64; 2]) -> Self {
        let mut out = [0u8; HALF_BYTES];
        out[..8].copy_from_slice(&lanes[0].to_le_bytes());
        out[8..].copy_from_slice(&lanes[1].to_le_bytes());
        Half(out)
    }
}
