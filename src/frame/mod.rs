//! Payload frame construction and parsing
//!
//! The frame is the binary container embedded into the carrier's LSBs.
//! Layout, all integers big-endian:
//!
//! ```text
//! [1 byte  ] password flag (0x00 or 0x01)
//! [16 bytes] PBKDF2 salt (present only when flag == 0x01)
//! [2 bytes ] metadata length
//! [N bytes ] metadata UTF-8: "<filename>|<mime_type>"
//! [4 bytes ] payload length
//! [M bytes ] payload (encrypted compressed data if flagged, else compressed)
//! ```
//!
//! `payload length` always equals the literal embedded byte count, i.e. the
//! ciphertext length when a password is set. Every declared length is
//! untrusted on the way in: parsing never reads past the recovered buffer.

use crate::crypto::SALT_LEN;
use crate::{VaultError, VaultResult};

/// Metadata separator between filename and MIME type.
const METADATA_SEPARATOR: char = '|';

/// A self-describing hidden payload with its file metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadFrame {
    /// PBKDF2 salt, present iff the payload is password-encrypted.
    pub salt: Option<[u8; SALT_LEN]>,
    pub filename: String,
    pub mime_type: String,
    /// Literal embedded bytes: serialized envelope when encrypted,
    /// compressed data otherwise.
    pub payload: Vec<u8>,
}

impl PayloadFrame {
    fn metadata(&self) -> String {
        format!("{}{}{}", self.filename, METADATA_SEPARATOR, self.mime_type)
    }

    /// Total serialized size in bytes.
    pub fn encoded_len(&self) -> usize {
        let salt_len = if self.salt.is_some() { SALT_LEN } else { 0 };
        1 + salt_len + 2 + self.metadata().len() + 4 + self.payload.len()
    }

    /// Serialize the frame to a flat byte buffer.
    pub fn encode(&self) -> VaultResult<Vec<u8>> {
        if self.filename.contains(METADATA_SEPARATOR) {
            return Err(VaultError::InvalidInput(format!(
                "filename must not contain '{METADATA_SEPARATOR}'"
            )));
        }
        let metadata = self.metadata();
        if metadata.len() > u16::MAX as usize {
            return Err(VaultError::InvalidInput("metadata too long".to_string()));
        }
        if self.payload.len() > u32::MAX as usize {
            return Err(VaultError::InvalidInput("payload too large".to_string()));
        }

        let mut out = Vec::with_capacity(self.encoded_len());
        out.push(self.salt.is_some() as u8);
        if let Some(salt) = &self.salt {
            out.extend_from_slice(salt);
        }
        out.extend_from_slice(&(metadata.len() as u16).to_be_bytes());
        out.extend_from_slice(metadata.as_bytes());
        out.extend_from_slice(&(self.payload.len() as u32).to_be_bytes());
        out.extend_from_slice(&self.payload);
        Ok(out)
    }

    /// Parse a frame from a flat byte buffer.
    ///
    /// The buffer may be longer than the frame (trailing unused carrier bits
    /// decode to garbage bytes); anything past the declared payload length is
    /// ignored. Fails with [`VaultError::MalformedFrame`] whenever a declared
    /// length is inconsistent with the available bytes, which is the normal
    /// outcome of running extraction on a non-stego image.
    pub fn decode(buf: &[u8]) -> VaultResult<Self> {
        let mut cursor = Cursor::new(buf);

        let flag = cursor.take(1)?[0];
        let salt = match flag {
            0x00 => None,
            0x01 => {
                let raw = cursor.take(SALT_LEN)?;
                let mut salt = [0u8; SALT_LEN];
                salt.copy_from_slice(raw);
                Some(salt)
            }
            other => {
                return Err(VaultError::MalformedFrame(format!(
                    "invalid password flag 0x{other:02X}"
                )))
            }
        };

        let metadata_len = u16::from_be_bytes(cursor.take(2)?.try_into().unwrap()) as usize;
        let metadata = std::str::from_utf8(cursor.take(metadata_len)?)
            .map_err(|_| VaultError::MalformedFrame("metadata is not UTF-8".to_string()))?;
        let (filename, mime_type) = metadata
            .split_once(METADATA_SEPARATOR)
            .ok_or_else(|| VaultError::MalformedFrame("metadata missing separator".to_string()))?;

        let payload_len = u32::from_be_bytes(cursor.take(4)?.try_into().unwrap()) as usize;
        let payload = cursor.take(payload_len)?.to_vec();

        Ok(Self {
            salt,
            filename: filename.to_string(),
            mime_type: mime_type.to_string(),
            payload,
        })
    }
}

/// Bounds-checked forward reader over the recovered byte buffer.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, count: usize) -> VaultResult<&'a [u8]> {
        let end = self.pos.checked_add(count).filter(|&e| e <= self.buf.len());
        match end {
            Some(end) => {
                let slice = &self.buf[self.pos..end];
                self.pos = end;
                Ok(slice)
            }
            None => Err(VaultError::MalformedFrame(format!(
                "declared length exceeds recovered data ({} bytes needed at offset {})",
                count, self.pos
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame(salt: Option<[u8; SALT_LEN]>) -> PayloadFrame {
        PayloadFrame {
            salt,
            filename: "note.txt".to_string(),
            mime_type: "text/plain".to_string(),
            payload: vec![0xDE, 0xAD, 0xBE, 0xEF],
        }
    }

    #[test]
    fn roundtrip_without_password() {
        let frame = sample_frame(None);
        let bytes = frame.encode().unwrap();
        assert_eq!(bytes.len(), frame.encoded_len());
        assert_eq!(bytes[0], 0x00);
        assert_eq!(PayloadFrame::decode(&bytes).unwrap(), frame);
    }

    #[test]
    fn roundtrip_with_password_salt() {
        let frame = sample_frame(Some([9u8; SALT_LEN]));
        let bytes = frame.encode().unwrap();
        assert_eq!(bytes[0], 0x01);
        assert_eq!(&bytes[1..1 + SALT_LEN], &[9u8; SALT_LEN]);
        assert_eq!(PayloadFrame::decode(&bytes).unwrap(), frame);
    }

    #[test]
    fn trailing_garbage_ignored() {
        let frame = sample_frame(None);
        let mut bytes = frame.encode().unwrap();
        bytes.extend_from_slice(&[0x55; 64]); // unused carrier bits
        assert_eq!(PayloadFrame::decode(&bytes).unwrap(), frame);
    }

    #[test]
    fn invalid_flag_rejected() {
        let mut bytes = sample_frame(None).encode().unwrap();
        bytes[0] = 0x7F;
        assert!(matches!(
            PayloadFrame::decode(&bytes),
            Err(VaultError::MalformedFrame(_))
        ));
    }

    #[test]
    fn truncated_metadata_rejected() {
        let frame = sample_frame(None);
        let bytes = frame.encode().unwrap();
        // Cut inside the metadata field.
        assert!(matches!(
            PayloadFrame::decode(&bytes[..5]),
            Err(VaultError::MalformedFrame(_))
        ));
    }

    #[test]
    fn oversized_payload_length_rejected() {
        let frame = sample_frame(None);
        let mut bytes = frame.encode().unwrap();
        // Inflate the declared payload length past the buffer end.
        let len_pos = bytes.len() - frame.payload.len() - 4;
        bytes[len_pos..len_pos + 4].copy_from_slice(&u32::MAX.to_be_bytes());
        assert!(matches!(
            PayloadFrame::decode(&bytes),
            Err(VaultError::MalformedFrame(_))
        ));
    }

    #[test]
    fn missing_separator_rejected() {
        let mut out = vec![0x00];
        out.extend_from_slice(&4u16.to_be_bytes());
        out.extend_from_slice(b"noop");
        out.extend_from_slice(&0u32.to_be_bytes());
        assert!(matches!(
            PayloadFrame::decode(&out),
            Err(VaultError::MalformedFrame(_))
        ));
    }

    #[test]
    fn filename_with_separator_rejected() {
        let mut frame = sample_frame(None);
        frame.filename = "bad|name".to_string();
        assert!(matches!(frame.encode(), Err(VaultError::InvalidInput(_))));
    }

    #[test]
    fn empty_input_rejected() {
        assert!(matches!(
            PayloadFrame::decode(&[]),
            Err(VaultError::MalformedFrame(_))
        ));
    }

    #[test]
    fn mime_type_may_contain_separator() {
        // split is on the first separator only
        let frame = PayloadFrame {
            salt: None,
            filename: "f".to_string(),
            mime_type: "weird|mime".to_string(),
            payload: vec![],
        };
        let decoded = PayloadFrame::decode(&frame.encode().unwrap()).unwrap();
        assert_eq!(decoded.mime_type, "weird|mime");
    }
}
