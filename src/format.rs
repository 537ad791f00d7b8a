//! Ciphertext container layout.
//!
//! Every encrypted file has the same shape:
//!
//! ```text
//! [0x0000]  IV                                  (32 bytes)
//! [0x0020]  ciphertext cluster 1                (4096 bytes)
//! ...       whole clusters
//! [......]  last ciphertext cluster             ((k + 1) x 32 bytes)
//! [......]  trailer                             (32 bytes)
//! ```
//!
//! The last cluster carries `k` data blocks (`1 <= k <= 128`) plus one
//! padding block, so it is 64..=4128 bytes long. The trailer is the
//! SHA-256 of the concatenated per-cluster plaintext hashes.
//!
//! Total length is therefore the plaintext rounded up to a positive
//! multiple of 32, plus 96 bytes of overhead (IV, padding block, trailer).

use crate::block::BLOCK_BYTES;
use crate::{Error, Result};

/// Cluster size in bytes.
pub const CLUSTER_BYTES: usize = 4096;

/// Cluster size in blocks.
pub const CLUSTER_BLOCKS: usize = CLUSTER_BYTES / BLOCK_BYTES;

/// Smallest valid ciphertext: IV, one data block, padding block, trailer.
pub const MIN_CIPHERTEXT_BYTES: u64 = 4 * BLOCK_BYTES as u64;

/// Plaintext length rounded up to the next positive multiple of the block
/// size. Zero-length input still occupies one block.
pub fn padded_len(plaintext_len: u64) -> u64 {
    let blocks = plaintext_len.div_ceil(BLOCK_BYTES as u64).max(1);
    blocks * BLOCK_BYTES as u64
}

/// Exact ciphertext length produced for a plaintext of `plaintext_len`
/// bytes.
pub fn ciphertext_len(plaintext_len: u64) -> u64 {
    padded_len(plaintext_len) + 3 * BLOCK_BYTES as u64
}

/// Validate a ciphertext file length before decryption.
pub fn check_ciphertext_len(len: u64) -> Result<()> {
    if len == 0 {
        return Err(Error::Empty);
    }
    if len % BLOCK_BYTES as u64 != 0 {
        return Err(Error::Misaligned(len));
    }
    if len < MIN_CIPHERTEXT_BYTES {
        return Err(Error::Truncated(len));
    }
    Ok(())
}

/// Split the ciphertext body (everything between IV and trailer) into
/// whole clusters plus the last cluster's byte length.
///
/// The remainder of `body_len` mod the cluster size identifies the last
/// cluster: a remainder of 0 means the last plaintext cluster had 127 data
/// blocks (padding block included the cluster is exactly full); a
/// remainder of one block means it was full and the padding block spilled
/// over; anything else is the last cluster's own length.
pub fn split_body(body_len: u64) -> (u64, usize) {
    debug_assert!(body_len >= 2 * BLOCK_BYTES as u64);
    debug_assert!(body_len % BLOCK_BYTES as u64 == 0);
    let r = (body_len % CLUSTER_BYTES as u64) as usize;
    let last = if r == 0 {
        CLUSTER_BYTES
    } else if r == BLOCK_BYTES {
        CLUSTER_BYTES + BLOCK_BYTES
    } else {
        r
    };
    ((body_len - last as u64) / CLUSTER_BYTES as u64, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_formula() {
        assert_eq!(ciphertext_len(0), 128);
        assert_eq!(ciphertext_len(1), 128);
        assert_eq!(ciphertext_len(32), 128);
        assert_eq!(ciphertext_len(33), 160);
        assert_eq!(ciphertext_len(4096), 4192);
        assert_eq!(ciphertext_len(4097), 4224);
    }

    #[test]
    fn body_split_covers_every_last_cluster_shape() {
        // One short cluster.
        assert_eq!(split_body(64), (0, 64));
        // Exactly full last plaintext cluster: padding spills one block.
        assert_eq!(split_body(4128), (0, 4128));
        assert_eq!(split_body(8224), (1, 4128));
        // 127 data blocks + padding block fill the cluster exactly.
        assert_eq!(split_body(4096), (0, 4096));
        assert_eq!(split_body(8192), (1, 4096));
        // A full cluster followed by a short one.
        assert_eq!(split_body(4160), (1, 64));
    }

    #[test]
    fn split_round_trips_the_encoder_layout() {
        for plen in [0u64, 1, 31, 32, 33, 4064, 4065, 4095, 4096, 4097, 8192] {
            let body = ciphertext_len(plen) - 2 * BLOCK_BYTES as u64;
            let (full, last) = split_body(body);
            assert_eq!(full * CLUSTER_BYTES as u64 + last as u64, body, "plen {plen}");
            assert!(last >= 2 * BLOCK_BYTES, "plen {plen}");
            assert!(last <= CLUSTER_BYTES + BLOCK_BYTES, "plen {plen}");
        }
    }

    #[test]
    fn rejects_bad_lengths() {
        assert!(matches!(check_ciphertext_len(0), Err(Error::Empty)));
        assert!(matches!(check_ciphertext_len(130), Err(Error::Misaligned(130))));
        assert!(matches!(check_ciphertext_len(96), Err(Error::Truncated(96))));
        assert!(check_ciphertext_len(128).is_ok());
        assert!(check_ciphertext_len(4192).is_ok());
    }
}
