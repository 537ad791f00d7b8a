//! Library-wide error and result types.

use std::collections::TryReserveError;
use std::fmt;
use std::io;

/// Result alias used throughout wilhelm.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the library can produce.
///
/// An integrity failure after decryption is **not** an error; it is the
/// `bool` returned by [`crate::Engine::decrypt`], and callers must inspect
/// it.
#[derive(Debug)]
pub enum Error {
    /// No input file has been set before starting a pass.
    NoInput,
    /// No output file has been set before starting a pass.
    NoOutput,
    /// No passphrase has been set before starting a pass.
    NoKey,
    /// The ciphertext file is empty.
    Empty,
    /// The ciphertext length is not a multiple of the block size.
    Misaligned(u64),
    /// The ciphertext is shorter than the minimal container layout.
    Truncated(u64),
    /// A working buffer could not be allocated.
    Alloc(TryReserveError),
    /// The OS random source failed.
    Entropy(getrandom::Error),
    /// An underlying I/O operation failed.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NoInput => write!(f, "no input file has been opened"),
            Error::NoOutput => write!(f, "no output file has been set"),
            Error::NoKey => write!(f, "no passphrase has been set"),
            Error::Empty => write!(f, "input file is empty"),
            Error::Misaligned(n) => {
                write!(f, "input length {n} is not a multiple of the block size")
            }
            Error::Truncated(n) => write!(f, "input length {n} is too short to be valid"),
            Error::Alloc(e) => write!(f, "buffer allocation failed: {e}"),
            Error::Entropy(e) => write!(f, "random source failed: {e}"),
            Error::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Alloc(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<TryReserveError> for Error {
    fn from(e: TryReserveError) -> Self {
        Error::Alloc(e)
    }
}

impl From<getrandom::Error> for Error {
    fn from(e: getrandom::Error) -> Self {
        Error::Entropy(e)
    }
}
