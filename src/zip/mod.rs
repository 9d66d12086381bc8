//! ZIP archive building and reading
//!
//! The polyglot composer needs two things from the archive layer: build a
//! single-entry archive in memory (optionally with an archive-native AES
//! password), and read the first entry back out of recovered archive bytes.
//! Offset bookkeeping for the polyglot trick lives in [`offsets`].

pub mod offsets;

use std::io::{Cursor, Read, Write};

use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{AesMode, CompressionMethod, ZipArchive, ZipWriter};

use crate::{VaultError, VaultResult};

/// Build an in-memory archive holding a single deflate-compressed entry.
///
/// With a password the entry is AES-256 encrypted using the archive format's
/// own scheme, so any stock archive tool can decrypt it; without one the
/// entry relies solely on the opacity of the surrounding polyglot.
pub fn build_archive(
    filename: &str,
    data: &[u8],
    password: Option<&str>,
) -> VaultResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    let mut options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    if let Some(pw) = password {
        options = options.with_aes_encryption(AesMode::Aes256, pw);
    }

    writer
        .start_file(filename, options)
        .map_err(zip_error)?;
    writer.write_all(data)?;

    let cursor = writer.finish().map_err(zip_error)?;
    Ok(cursor.into_inner())
}

/// Read the first entry of an archive, decrypting it when necessary.
///
/// Returns the entry's bytes and name. Fails with
/// [`VaultError::EmptyArchive`] when there are no entries,
/// [`VaultError::PasswordRequired`] when the entry is encrypted and no
/// password was supplied, and [`VaultError::WrongPasswordOrCorruptData`]
/// when decryption fails.
pub fn read_first_entry(
    archive_bytes: &[u8],
    password: Option<&str>,
) -> VaultResult<(Vec<u8>, String)> {
    let mut archive = ZipArchive::new(Cursor::new(archive_bytes)).map_err(zip_error)?;
    if archive.is_empty() {
        return Err(VaultError::EmptyArchive);
    }

    // A password on an unencrypted entry is ignored by the reader, so the
    // decrypting accessor is safe to use whenever a password was supplied.
    let mut entry = match password {
        Some(pw) => archive
            .by_index_decrypt(0, pw.as_bytes())
            .map_err(|err| match err {
                ZipError::InvalidPassword => VaultError::WrongPasswordOrCorruptData,
                other => zip_error(other),
            })?,
        None => archive.by_index(0).map_err(|err| match err {
            ZipError::UnsupportedArchive(msg) if msg == ZipError::PASSWORD_REQUIRED => {
                VaultError::PasswordRequired
            }
            other => zip_error(other),
        })?,
    };

    let name = entry.name().to_string();
    let mut data = Vec::new();
    entry
        .read_to_end(&mut data)
        .map_err(|_| VaultError::WrongPasswordOrCorruptData)?;

    Ok((data, name))
}

fn zip_error(err: ZipError) -> VaultError {
    VaultError::Zip(err.to_string())
}
