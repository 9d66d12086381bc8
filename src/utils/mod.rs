//! Utility functions shared across the engine

/// Read a little-endian u16 from byte slice
pub fn read_u16_le(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes(bytes[offset..offset + 2].try_into().expect("slice too short"))
}

/// Read a little-endian u32 from byte slice
pub fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().expect("slice too short"))
}

/// Write a little-endian u32 to byte slice
pub fn write_u32_le(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// Find the first occurrence of a byte signature, returning its offset
pub fn find_signature(data: &[u8], sig: &[u8]) -> Option<usize> {
    if sig.is_empty() || data.len() < sig.len() {
        return None;
    }
    data.windows(sig.len()).position(|w| w == sig)
}

/// Guess a MIME type from a filename extension.
///
/// Covers the common carrier and document formats; everything else is
/// `application/octet-stream`.
pub fn guess_mime_type(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "zip" => "application/zip",
        "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}
