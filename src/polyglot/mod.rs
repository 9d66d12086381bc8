//! Polyglot file composition and extraction
//!
//! A polyglot here is `carrier_bytes || archive_bytes` where the archive's
//! recorded offsets have been shifted by the carrier length. Because archive
//! readers locate the directory from the end of the file and image/PDF/etc.
//! readers parse from the front, the combined file is simultaneously valid
//! under both interpretations: open it with the carrier's native application,
//! or rename it to `.zip` and extract.

use crate::utils::find_signature;
use crate::zip::offsets::{self, LOCAL_HEADER_SIGNATURE};
use crate::zip::{build_archive, read_first_entry};
use crate::{VaultError, VaultResult};

/// Build a polyglot from carrier bytes and a file to hide.
///
/// The hidden file becomes the single entry of a fresh in-memory archive
/// (AES-encrypted when `password` is given) appended after the carrier, and
/// every offset the archive records is shifted by the carrier length so the
/// combined file parses as a self-consistent archive. Either the complete
/// polyglot is returned or nothing is produced.
pub fn create_polyglot(
    carrier: &[u8],
    file_data: &[u8],
    filename: &str,
    password: Option<&str>,
) -> VaultResult<Vec<u8>> {
    if carrier.is_empty() {
        return Err(VaultError::InvalidInput("carrier is empty".to_string()));
    }

    let archive = build_archive(filename, file_data, password)?;

    let mut out = Vec::with_capacity(carrier.len() + archive.len());
    out.extend_from_slice(carrier);
    out.extend_from_slice(&archive);

    offsets::shift_offsets(&mut out[carrier.len()..], carrier.len())?;
    Ok(out)
}

/// Extract the hidden file from a polyglot.
///
/// The local-header signature scan only gates non-polyglot input; the full
/// bytes are then handed to the archive reader, which locates the directory
/// from the end of the file. With shifted offsets the whole file is a valid
/// archive already, and for a plain unshifted concatenation the reader
/// compensates for the prepended carrier itself. Slicing the carrier off
/// first would break the shifted case, since every stored offset counts from
/// the start of the combined file.
pub fn extract_from_polyglot(
    polyglot: &[u8],
    password: Option<&str>,
) -> VaultResult<(Vec<u8>, String)> {
    if find_signature(polyglot, LOCAL_HEADER_SIGNATURE).is_none() {
        return Err(VaultError::NotAPolyglot);
    }
    read_first_entry(polyglot, password)
}
