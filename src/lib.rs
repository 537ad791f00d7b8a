//! **wilhelm** - whole-file encryption built on a 256-bit Feistel cipher
//! with cluster-chained CBC and an integrity trailer.
//!
//! Files are processed in 4096-byte clusters of 32-byte blocks. CBC
//! chaining runs within and across clusters, a fresh random IV leads the
//! file, a self-describing padding block encodes the plaintext's residual
//! length, and a SHA-256-of-hashes trailer closes it so decryption can
//! report whether the passphrase and ciphertext were intact.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`engine`] | [`Engine`]: file-to-file encrypt/decrypt passes |
//! | [`cipher`] | the 16-round Feistel block cipher and its key schedule |
//! | [`block`]  | 32-byte block / 16-byte half-block value types |
//! | [`key`]    | passphrase to base-key derivation |
//! | [`format`] | ciphertext container layout and size arithmetic |
//! | [`error`]  | library-wide [`Error`] / [`Result`] |
//!
//! # Security
//!
//! The cipher is a **home-grown, unvetted construction**, implemented for
//! compatibility with an existing archive format. It carries no security
//! proof and no cryptanalysis pedigree. Do not reach for this crate to
//! protect sensitive data; use an established AEAD instead.

pub mod block;
pub mod cipher;
pub mod engine;
pub mod error;
pub mod format;
pub mod key;

mod utils;

pub use engine::Engine;
pub use error::{Error, Result};
pub use key::BaseKey;
