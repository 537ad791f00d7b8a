//! Low-level I/O helpers shared by the stream driver.
//!
//! Each function reads exactly the bytes it promises or returns an error -
//! there is no partial-read ambiguity.

use std::io::Read;

use crate::Result;
use crate::block::{BLOCK_BYTES, Block};

/// Read exactly one block.
#[inline]
pub(crate) fn read_block<R: Read>(r: &mut R) -> Result<Block> {
    let mut b = [0u8; BLOCK_BYTES];
    r.read_exact(&mut b)?;
    Ok(Block(b))
}

/// Allocate a reusable cluster buffer, sized for a full cluster plus the
/// appended padding block. Fails with [`crate::Error::Alloc`] instead of
/// aborting when memory is unavailable.
pub(crate) fn cluster_buffer(capacity: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(capacity)?;
    Ok(buf)
}
