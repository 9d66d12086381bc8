//! Steganographic image engine
//!
//! Composes the channel codec, frame codec, encryption envelope and capacity
//! planner into `hide` and `extract`. The pipeline for `hide` is
//! compress -> encrypt (if password) -> frame -> capacity check -> embed;
//! extraction runs it in reverse with decompression last. Either direction
//! completes fully or fails without partial output.

pub mod capacity;

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::{DynamicImage, GenericImageView};

use crate::bits::{embed_bits, LsbReader};
use crate::crypto::{self, Envelope};
use crate::frame::PayloadFrame;
use crate::{VaultError, VaultResult};

/// A file recovered from a carrier image.
#[derive(Debug, Clone, PartialEq)]
pub struct HiddenFile {
    pub data: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
}

/// Hide `payload` inside `carrier`, returning the modified image.
///
/// The payload is zlib-compressed, optionally encrypted under `password`,
/// wrapped in a [`PayloadFrame`] and written into the carrier's LSBs. The
/// capacity check happens before any pixel is touched; on error the carrier
/// is returned unread and unmodified.
pub fn hide(
    carrier: &DynamicImage,
    payload: &[u8],
    filename: &str,
    mime_type: &str,
    password: Option<&str>,
) -> VaultResult<DynamicImage> {
    let compressed = compress(payload)?;

    let (salt, frame_payload) = match password {
        Some(pw) => {
            let envelope = crypto::encrypt(&compressed, pw);
            (Some(envelope.salt), envelope.to_bytes())
        }
        None => (None, compressed),
    };

    let frame = PayloadFrame {
        salt,
        filename: filename.to_string(),
        mime_type: mime_type.to_string(),
        payload: frame_payload,
    };
    let encoded = frame.encode()?;

    let (width, height) = carrier.dimensions();
    let pixel_count = width as usize * height as usize;
    capacity::ensure_fits(encoded.len(), pixel_count)?;

    let mut pixels = carrier.to_rgba8();
    embed_bits(&mut pixels, &encoded);
    Ok(DynamicImage::ImageRgba8(pixels))
}

/// Extract a hidden file from `carrier`.
///
/// Fails with [`VaultError::PasswordRequired`] before attempting any
/// decryption when the frame is flagged but no password was supplied, with
/// [`VaultError::WrongPasswordOrCorruptData`] when decryption fails, and
/// with [`VaultError::MalformedFrame`] when the carrier holds no valid frame
/// at all.
pub fn extract(carrier: &DynamicImage, password: Option<&str>) -> VaultResult<HiddenFile> {
    let pixels = carrier.to_rgba8();
    let raw = LsbReader::new(&pixels).read_to_end();
    let frame = PayloadFrame::decode(&raw)?;

    let compressed = match frame.salt {
        Some(_) => {
            let password = password.ok_or(VaultError::PasswordRequired)?;
            let envelope = Envelope::from_bytes(&frame.payload)
                .map_err(|_| VaultError::MalformedFrame("encrypted payload too short".to_string()))?;
            crypto::decrypt(&envelope, password)?
        }
        None => frame.payload,
    };

    let data = decompress(&compressed)?;
    Ok(HiddenFile {
        data,
        filename: frame.filename,
        mime_type: frame.mime_type,
    })
}

fn compress(data: &[u8]) -> VaultResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn decompress(data: &[u8]) -> VaultResult<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|_| VaultError::MalformedFrame("payload failed to decompress".to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use proptest::prelude::*;

    fn test_carrier(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([
                ((x * 17) % 256) as u8,
                ((y * 23) % 256) as u8,
                (((x + y) * 31) % 256) as u8,
            ])
        });
        DynamicImage::ImageRgb8(img)
    }

    /// Incompressible pseudo-random bytes (zlib can't shrink these).
    fn noise(len: usize) -> Vec<u8> {
        let mut state = 0x2545F4914F6CDD1Du64;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state >> 32) as u8
            })
            .collect()
    }

    #[test]
    fn roundtrip_without_password() {
        let carrier = test_carrier(100, 100);
        let stego = hide(&carrier, b"hello hidden world", "note.txt", "text/plain", None).unwrap();
        let out = extract(&stego, None).unwrap();
        assert_eq!(out.data, b"hello hidden world");
        assert_eq!(out.filename, "note.txt");
        assert_eq!(out.mime_type, "text/plain");
    }

    #[test]
    fn roundtrip_with_password() {
        let carrier = test_carrier(120, 120);
        let stego = hide(
            &carrier,
            b"top secret bytes",
            "secret.bin",
            "application/octet-stream",
            Some("hunter2"),
        )
        .unwrap();
        let out = extract(&stego, Some("hunter2")).unwrap();
        assert_eq!(out.data, b"top secret bytes");
        assert_eq!(out.filename, "secret.bin");
    }

    #[test]
    fn wrong_password_fails() {
        let carrier = test_carrier(100, 100);
        let stego = hide(&carrier, b"payload", "f.bin", "application/octet-stream", Some("w1"))
            .unwrap();
        assert!(matches!(
            extract(&stego, Some("w2")),
            Err(VaultError::WrongPasswordOrCorruptData)
        ));
    }

    #[test]
    fn password_required_before_decryption() {
        let carrier = test_carrier(100, 100);
        let stego = hide(&carrier, b"payload", "f.bin", "application/octet-stream", Some("pw"))
            .unwrap();
        assert!(matches!(extract(&stego, None), Err(VaultError::PasswordRequired)));
    }

    #[test]
    fn password_ignored_on_plain_frame() {
        let carrier = test_carrier(100, 100);
        let stego = hide(&carrier, b"plain", "f.txt", "text/plain", None).unwrap();
        // Supplying a password for an unencrypted frame is harmless.
        assert_eq!(extract(&stego, Some("whatever")).unwrap().data, b"plain");
    }

    #[test]
    fn capacity_scenario_100x100() {
        // 10,000 pixels -> 3,750 bytes of frame capacity.
        let carrier = test_carrier(100, 100);

        // 3,000 incompressible bytes + frame overhead fits.
        assert!(hide(&carrier, &noise(3_000), "note.txt", "text/plain", None).is_ok());

        // 4,000 incompressible bytes does not.
        let err = hide(&carrier, &noise(4_000), "note.txt", "text/plain", None).unwrap_err();
        assert!(matches!(err, VaultError::InsufficientCapacity { .. }));
    }

    #[test]
    fn failed_hide_leaves_no_output() {
        let carrier = test_carrier(10, 10);
        let before = carrier.to_rgba8();
        let _ = hide(&carrier, &noise(1_000), "big.bin", "application/octet-stream", None);
        // The caller's image is untouched on failure.
        assert_eq!(carrier.to_rgba8(), before);
    }

    #[test]
    fn extract_on_clean_image_is_malformed() {
        let carrier = test_carrier(50, 50);
        assert!(matches!(
            extract(&carrier, None),
            Err(VaultError::MalformedFrame(_))
        ));
    }

    #[test]
    fn empty_payload_roundtrip() {
        let carrier = test_carrier(50, 50);
        let stego = hide(&carrier, b"", "empty.txt", "text/plain", None).unwrap();
        assert_eq!(extract(&stego, None).unwrap().data, b"");
    }

    #[test]
    fn compressible_payload_beats_raw_capacity() {
        // 20,000 zeros compress far below the 3,750-byte capacity.
        let carrier = test_carrier(100, 100);
        let payload = vec![0u8; 20_000];
        let stego = hide(&carrier, &payload, "zeros.bin", "application/octet-stream", None)
            .unwrap();
        assert_eq!(extract(&stego, None).unwrap().data, payload);
    }

    #[test]
    fn survives_png_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stego.png");

        let carrier = test_carrier(64, 64);
        let stego = hide(&carrier, b"written to disk", "disk.txt", "text/plain", None).unwrap();
        stego.save_with_format(&path, image::ImageFormat::Png).unwrap();

        let reloaded = image::open(&path).unwrap();
        assert_eq!(extract(&reloaded, None).unwrap().data, b"written to disk");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn roundtrip_arbitrary_payloads(payload in proptest::collection::vec(any::<u8>(), 0..512)) {
            let carrier = test_carrier(80, 80);
            let stego = hide(&carrier, &payload, "blob.bin", "application/octet-stream", None)
                .unwrap();
            let out = extract(&stego, None).unwrap();
            prop_assert_eq!(out.data, payload);
        }
    }
}
