//! ZIP directory offset records and shifting
//!
//! A polyglot prepends carrier bytes in front of a complete archive, which
//! invalidates every offset the archive recorded relative to its own start.
//! This module models the trailer structures as typed records and shifts all
//! of them by one constant:
//!
//! - the EOCD's "central directory start" field, and
//! - each central-directory entry's "local header offset" field.
//!
//! The central directory walk is driven purely by entry signatures, never by
//! the stored entry count, so directories written by varied encoders are
//! tolerated; the walk stops at the first non-matching signature.

use crate::utils::{read_u16_le, read_u32_le, write_u32_le};
use crate::{VaultError, VaultResult};

/// End of Central Directory signature (`PK\x05\x06`), little-endian.
pub const EOCD_SIGNATURE: u32 = 0x06054B50;
/// Central directory file header signature (`PK\x01\x02`), little-endian.
pub const CD_ENTRY_SIGNATURE: u32 = 0x02014B50;
/// Local file header signature bytes (`PK\x03\x04`).
pub const LOCAL_HEADER_SIGNATURE: &[u8; 4] = b"PK\x03\x04";

/// Minimum EOCD record size (empty comment).
pub const EOCD_MIN_LEN: usize = 22;
/// Fixed central directory entry header size, before the variable fields.
pub const CD_ENTRY_FIXED_LEN: usize = 46;

/// ZIP End of Central Directory record
#[derive(Debug, Clone)]
pub struct EocdRecord {
    /// Byte offset of the record within the scanned buffer.
    pub position: usize,
    pub num_entries_disk: u16,
    pub num_entries_total: u16,
    pub cd_size: u32,
    /// Offset of the central directory from the start of the archive.
    pub cd_offset: u32,
    pub comment_length: u16,
}

/// One central directory file header, reduced to the fields the offset
/// shift needs.
#[derive(Debug, Clone)]
pub struct CentralDirEntry {
    /// Byte offset of the entry within the scanned buffer.
    pub position: usize,
    /// Offset of this entry's local file header from the archive start.
    pub local_header_offset: u32,
    pub name_len: u16,
    pub extra_len: u16,
    pub comment_len: u16,
}

impl CentralDirEntry {
    /// Total entry size including the variable-length trailing fields.
    pub fn total_len(&self) -> usize {
        CD_ENTRY_FIXED_LEN
            + self.name_len as usize
            + self.extra_len as usize
            + self.comment_len as usize
    }
}

/// Locate the EOCD record by scanning backward for its signature.
pub fn find_eocd(data: &[u8]) -> VaultResult<EocdRecord> {
    if data.len() < EOCD_MIN_LEN {
        return Err(VaultError::Zip("data too short for EOCD record".to_string()));
    }

    let mut offset = data.len() - EOCD_MIN_LEN;
    loop {
        if read_u32_le(data, offset) == EOCD_SIGNATURE {
            let record = EocdRecord {
                position: offset,
                num_entries_disk: read_u16_le(data, offset + 8),
                num_entries_total: read_u16_le(data, offset + 10),
                cd_size: read_u32_le(data, offset + 12),
                cd_offset: read_u32_le(data, offset + 16),
                comment_length: read_u16_le(data, offset + 20),
            };
            // The comment must fit in the bytes that follow, otherwise this
            // was a stray signature inside file data.
            if record.comment_length as usize <= data.len() - offset - EOCD_MIN_LEN {
                return Ok(record);
            }
        }
        if offset == 0 {
            break;
        }
        offset -= 1;
    }

    Err(VaultError::Zip("EOCD record not found".to_string()))
}

/// Check whether the archive uses ZIP64 extensions (unsupported here).
pub fn uses_zip64(eocd: &EocdRecord) -> bool {
    eocd.num_entries_disk == 0xFFFF
        || eocd.num_entries_total == 0xFFFF
        || eocd.cd_size == 0xFFFF_FFFF
        || eocd.cd_offset == 0xFFFF_FFFF
}

/// Walk the central directory from `cd_offset`, collecting typed entries.
///
/// Terminates at the first position whose signature is not a central
/// directory entry header.
pub fn read_central_directory(data: &[u8], cd_offset: u32) -> Vec<CentralDirEntry> {
    let mut entries = Vec::new();
    let mut offset = cd_offset as usize;

    while offset + CD_ENTRY_FIXED_LEN <= data.len() {
        if read_u32_le(data, offset) != CD_ENTRY_SIGNATURE {
            break;
        }
        let entry = CentralDirEntry {
            position: offset,
            name_len: read_u16_le(data, offset + 28),
            extra_len: read_u16_le(data, offset + 30),
            comment_len: read_u16_le(data, offset + 32),
            local_header_offset: read_u32_le(data, offset + 42),
        };
        offset += entry.total_len();
        entries.push(entry);
    }

    entries
}

/// Shift every recorded offset in `archive` by `delta` bytes.
///
/// After this call the archive is self-consistent when parsed from a file
/// where `delta` foreign bytes precede it. Rejects ZIP64 archives and shifts
/// that would overflow the 32-bit offset fields.
pub fn shift_offsets(archive: &mut [u8], delta: usize) -> VaultResult<()> {
    if delta == 0 {
        return Ok(());
    }
    let delta = u32::try_from(delta)
        .map_err(|_| VaultError::Zip("offset adjustment exceeds ZIP limits".to_string()))?;

    let eocd = find_eocd(archive)?;
    if uses_zip64(&eocd) {
        return Err(VaultError::Zip("ZIP64 archives are not supported".to_string()));
    }

    // Validate every shifted value before the first write so a failure
    // leaves the archive untouched.
    let new_cd_offset = eocd
        .cd_offset
        .checked_add(delta)
        .ok_or_else(|| VaultError::Zip("central directory offset overflow".to_string()))?;

    let entries = read_central_directory(archive, eocd.cd_offset);
    let mut shifted = Vec::with_capacity(entries.len());
    for entry in &entries {
        let offset = entry
            .local_header_offset
            .checked_add(delta)
            .ok_or_else(|| VaultError::Zip("local header offset overflow".to_string()))?;
        shifted.push((entry.position + 42, offset));
    }

    for (position, offset) in shifted {
        write_u32_le(archive, position, offset);
    }
    write_u32_le(archive, eocd.position + 16, new_cd_offset);

    Ok(())
}
