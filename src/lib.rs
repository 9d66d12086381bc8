//! # InvisioVault Core
//!
//! This library provides the data-hiding engine behind InvisioVault:
//!
//! - LSB steganography: embed an arbitrary file inside a carrier image's
//!   least-significant pixel bits, wrapped in a self-describing binary frame
//!   with optional password-based encryption.
//! - Polyglot composition: make one file simultaneously valid as its carrier
//!   format and as a ZIP archive by patching the archive's internal offsets.
//! - QR fragments: hide an encrypted secret inside a QR payload string after
//!   a delimiter, invisible to ordinary scanners.
//!
//! All operations are synchronous, pure transformations over caller-owned
//! buffers; file and network I/O belong to the caller.

// Public API exports
pub mod bits;
pub mod crypto;
pub mod frame;
pub mod polyglot;
pub mod qr;
pub mod stego;
pub mod utils;
pub mod zip;

pub use polyglot::{create_polyglot, extract_from_polyglot};
pub use qr::{decode_fragment, encode_fragment};
pub use stego::{extract, hide, HiddenFile};

/// Result type alias for engine operations
pub type VaultResult<T> = Result<T, VaultError>;

/// Error surface for the data-hiding engine.
///
/// Every expected failure (bad password, insufficient capacity, corrupted
/// input) is an ordinary result, never a panic. Mapping to user messages or
/// HTTP statuses is the caller's job.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("carrier too small: frame needs {needed_bits} bits, carrier holds {capacity_bits}")]
    InsufficientCapacity {
        needed_bits: usize,
        capacity_bits: usize,
    },

    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("data is password-protected, a password is required")]
    PasswordRequired,

    #[error("wrong password or corrupt data")]
    WrongPasswordOrCorruptData,

    #[error("no archive signature found in file")]
    NotAPolyglot,

    #[error("embedded archive has no entries")]
    EmptyArchive,

    #[error("invalid encrypted data format")]
    InvalidEncryptedFormat,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("archive error: {0}")]
    Zip(String),

    #[error("input file error: {0}")]
    Io(#[from] std::io::Error),
}
