//! Whole-file encryption and decryption.
//!
//! [`Engine`] processes one file per pass. Blocks are chained CBC-style
//! within and across clusters, the block counter feeding the key schedule
//! advances identically on both sides, every cluster's plaintext is hashed
//! before encryption (after decryption), and the hash of those hashes is
//! written as the file's integrity trailer.
//!
//! The engine owns its streams only for the duration of a pass: `encrypt`
//! and `decrypt` take the input and output files out of the engine and drop
//! them on every exit path. The base key and the recorded input length
//! survive, so one engine can encrypt and then report its throughput, or be
//! re-pointed at new files for another pass.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::block::{BLOCK_BYTES, Block};
use crate::cipher;
use crate::format::{CLUSTER_BYTES, check_ciphertext_len, padded_len, split_body};
use crate::key::BaseKey;
use crate::utils::{cluster_buffer, read_block};
use crate::{Error, Result};

/// File encryption engine.
///
/// ```no_run
/// use wilhelm::Engine;
///
/// let mut engine = Engine::new();
/// engine.set_input("report.pdf")?;
/// engine.set_key(b"correct horse battery staple");
/// engine.set_output("report.pdf.whm")?;
/// engine.encrypt()?;
/// # Ok::<(), wilhelm::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct Engine {
    input: Option<File>,
    input_len: u64,
    output: Option<File>,
    key: Option<BaseKey>,
}

impl Engine {
    /// Create an engine with no input, output, or key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the input file and record its length.
    pub fn set_input<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let file = File::open(path)?;
        self.input_len = file.metadata()?.len();
        self.input = Some(file);
        Ok(())
    }

    /// Create (or truncate) the output file.
    pub fn set_output<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.output = Some(File::create(path)?);
        Ok(())
    }

    /// Derive and store the base key. Never fails.
    pub fn set_key(&mut self, passphrase: &[u8]) {
        self.key = Some(BaseKey::from_passphrase(passphrase));
    }

    /// Length of the last-set input file, in bytes.
    pub fn size(&self) -> u64 {
        self.input_len
    }

    /// Encrypt the input file into the output file.
    ///
    /// Requires input, output, and key to be set; consumes the streams.
    pub fn encrypt(&mut self) -> Result<()> {
        let input = self.input.take().ok_or(Error::NoInput)?;
        let output = self.output.take().ok_or(Error::NoOutput)?;
        let key = self.key.ok_or(Error::NoKey)?;

        let iv = fresh_block()?;
        let mut reader = BufReader::new(input);
        let mut writer = BufWriter::new(output);
        encrypt_stream(&key, iv, self.input_len, &mut reader, &mut writer)
    }

    /// Decrypt the input file into the output file.
    ///
    /// Returns whether the recomputed trailer matched the one stored in the
    /// file. `Ok(false)` means the ciphertext or passphrase was wrong; the
    /// (garbage) output has still been written.
    pub fn decrypt(&mut self) -> Result<bool> {
        let input = self.input.take().ok_or(Error::NoInput)?;
        check_ciphertext_len(self.input_len)?;
        let output = self.output.take().ok_or(Error::NoOutput)?;
        let key = self.key.ok_or(Error::NoKey)?;

        let mut reader = BufReader::new(input);
        let mut writer = BufWriter::new(output);
        decrypt_stream(&key, self.input_len, &mut reader, &mut writer)
    }
}

/// 32 bytes from the OS random source, hardened by repeated hashing.
fn fresh_block() -> Result<Block> {
    let mut b = Block::default();
    getrandom::getrandom(&mut b.0)?;
    b.harden();
    Ok(b)
}

/// Build the padding block for a finished last cluster.
///
/// The block is random except for one byte: at a position derived from the
/// hash of the last ciphertext block, it stores how many bytes of the last
/// data block are meaningful (0 = the block is full).
fn padding_block(last_ciphertext: Block, residual: u8) -> Result<Block> {
    let pos = Block::hash_of(&last_ciphertext.0).0[0] as usize % BLOCK_BYTES;
    let mut p = fresh_block()?;
    p.0[pos] = residual;
    Ok(p)
}

#[inline]
fn load_block(buf: &[u8], index: usize) -> Block {
    Block::from_slice(buf, index * BLOCK_BYTES)
}

#[inline]
fn store_block(buf: &mut [u8], index: usize, b: Block) {
    buf[index * BLOCK_BYTES..(index + 1) * BLOCK_BYTES].copy_from_slice(&b.0);
}

/// Encrypt `len` bytes from `r` into `w` under `key`, starting from `iv`.
///
/// The IV is taken as a parameter so a pass is a deterministic function of
/// (key, iv, plaintext); only the padding block draws fresh randomness.
fn encrypt_stream<R: Read, W: Write>(
    key: &BaseKey,
    iv: Block,
    len: u64,
    r: &mut R,
    w: &mut W,
) -> Result<()> {
    w.write_all(&iv.0)?;

    let mut cluster = cluster_buffer(CLUSTER_BYTES + BLOCK_BYTES)?;
    let mut last_prev = iv;
    let mut block_num: u64 = 0;
    let mut cluster_hashes: Vec<u8> = Vec::new();
    let mut index: u64 = 0;

    loop {
        let remaining = len - index;
        let last = remaining <= CLUSTER_BYTES as u64;
        let take = if last { remaining as usize } else { CLUSTER_BYTES };

        // Zero-extend a partial (or empty) final chunk to a whole block.
        cluster.clear();
        cluster.resize(padded_len(take as u64) as usize, 0);
        r.read_exact(&mut cluster[..take])?;
        index += take as u64;

        cluster_hashes.extend_from_slice(&Block::hash_of(&cluster).0);

        let blocks = cluster.len() / BLOCK_BYTES;
        let first = load_block(&cluster, 0).xor(last_prev);
        store_block(&mut cluster, 0, first);
        for i in 0..blocks {
            let ct = cipher::encrypt_block(load_block(&cluster, i), key, block_num);
            block_num += 1;
            store_block(&mut cluster, i, ct);
            if i + 1 < blocks {
                let chained = load_block(&cluster, i + 1).xor(ct);
                store_block(&mut cluster, i + 1, chained);
            }
        }
        last_prev = load_block(&cluster, blocks - 1);

        if last {
            let residual = (len % BLOCK_BYTES as u64) as u8;
            let pad = padding_block(last_prev, residual)?.xor(last_prev);
            let pad = cipher::encrypt_block(pad, key, block_num);
            cluster.extend_from_slice(&pad.0);
        }
        w.write_all(&cluster)?;
        if last {
            break;
        }
    }

    w.write_all(&Block::hash_of(&cluster_hashes).0)?;
    w.flush()?;
    log::debug!(
        "encrypted {len} bytes into {} cluster(s)",
        cluster_hashes.len() / BLOCK_BYTES
    );
    Ok(())
}

/// Decrypt a ciphertext of `len` total bytes from `r` into `w` under `key`.
///
/// Returns whether the trailer matched the recomputed hash of hashes.
fn decrypt_stream<R: Read, W: Write>(
    key: &BaseKey,
    len: u64,
    r: &mut R,
    w: &mut W,
) -> Result<bool> {
    let iv = read_block(r)?;
    let (full_clusters, last_len) = split_body(len - 2 * BLOCK_BYTES as u64);

    let mut cluster = cluster_buffer(CLUSTER_BYTES + BLOCK_BYTES)?;
    let mut encrypted = cluster_buffer(CLUSTER_BYTES + BLOCK_BYTES)?;
    let mut last_prev = iv;
    let mut block_num: u64 = 0;
    let mut cluster_hashes: Vec<u8> = Vec::new();

    for ci in 0..=full_clusters {
        let last = ci == full_clusters;
        let clen = if last { last_len } else { CLUSTER_BYTES };

        cluster.clear();
        cluster.resize(clen, 0);
        r.read_exact(&mut cluster)?;
        encrypted.clear();
        encrypted.extend_from_slice(&cluster);

        let blocks = clen / BLOCK_BYTES;
        for i in 0..blocks {
            let pt = cipher::decrypt_block(load_block(&encrypted, i), key, block_num);
            block_num += 1;
            let chain = if i == 0 {
                last_prev
            } else {
                load_block(&encrypted, i - 1)
            };
            store_block(&mut cluster, i, pt.xor(chain));
        }

        if !last {
            last_prev = load_block(&encrypted, blocks - 1);
            cluster_hashes.extend_from_slice(&Block::hash_of(&cluster).0);
            w.write_all(&cluster)?;
        } else {
            // The final block is the padding block; the one before it is the
            // (possibly zero-extended) last data block.
            let pad = load_block(&cluster, blocks - 1);
            let pos = Block::hash_of(&encrypted[(blocks - 2) * BLOCK_BYTES..][..BLOCK_BYTES]).0[0]
                as usize
                % BLOCK_BYTES;
            let residual = pad.0[pos] as usize;

            // Hash with the padding block stripped but the zero extension
            // intact, mirroring what was hashed before encryption.
            let data_len = (blocks - 1) * BLOCK_BYTES;
            cluster_hashes.extend_from_slice(&Block::hash_of(&cluster[..data_len]).0);

            // residual >= BLOCK_BYTES only occurs on corrupt input; keep the
            // whole block and let the trailer comparison fail.
            let keep = match residual {
                0 => BLOCK_BYTES,
                n if n < BLOCK_BYTES => n,
                _ => BLOCK_BYTES,
            };
            w.write_all(&cluster[..data_len - BLOCK_BYTES + keep])?;
        }
    }

    let trailer = read_block(r)?;
    w.flush()?;

    let verified = trailer == Block::hash_of(&cluster_hashes);
    log::debug!(
        "decrypted {} cluster(s); trailer {}",
        full_clusters + 1,
        if verified { "matched" } else { "mismatched" }
    );
    Ok(verified)
}
