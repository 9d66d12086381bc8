//! QR fragment codec
//!
//! Packs a hidden secret behind a visible string, for QR codes that show one
//! thing when scanned casually and carry another for software that knows the
//! marker. The combined form is `{public}#IVDATA:{base64(payload)}` where the
//! payload is either the secret's raw UTF-8 bytes or, with a password, a
//! serialized encryption envelope.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::crypto::{self, Envelope};
use crate::{VaultError, VaultResult};

/// Separator between the visible text and the hidden fragment.
pub const FRAGMENT_MARKER: &str = "#IVDATA:";

/// Payloads at or above this length are presumed to be encryption envelopes
/// when no password is given. The smallest envelope is 48 bytes, so a short
/// plain secret is never misclassified; a plain secret this long is
/// indistinguishable from envelope bytes and reported as password-protected.
const ENVELOPE_HEURISTIC_LEN: usize = 32;

/// Combine visible text and a hidden secret into one scannable string.
///
/// Without a password the secret rides along base64-encoded but readable by
/// anyone who knows the marker. With a password it is sealed in an
/// encryption envelope first.
pub fn encode_fragment(public_text: &str, secret_text: &str, password: Option<&str>) -> String {
    let payload = match password {
        Some(pw) => crypto::encrypt(secret_text.as_bytes(), pw).to_bytes(),
        None => secret_text.as_bytes().to_vec(),
    };
    format!("{public_text}{FRAGMENT_MARKER}{}", STANDARD.encode(payload))
}

/// Split a scanned string back into `(public_text, secret_text)`.
///
/// A string without the marker is entirely public. Fails with
/// [`VaultError::PasswordRequired`] when the fragment looks encrypted and no
/// password was supplied, and [`VaultError::InvalidEncryptedFormat`] when the
/// fragment cannot be interpreted at all.
pub fn decode_fragment(combined: &str, password: Option<&str>) -> VaultResult<(String, String)> {
    let Some((public_text, fragment)) = combined.split_once(FRAGMENT_MARKER) else {
        return Ok((combined.to_string(), String::new()));
    };
    if fragment.is_empty() {
        return Ok((public_text.to_string(), String::new()));
    }

    let payload = STANDARD
        .decode(fragment)
        .map_err(|_| VaultError::InvalidEncryptedFormat)?;

    let secret = match password {
        Some(pw) => {
            if payload.len() < ENVELOPE_HEURISTIC_LEN {
                return Err(VaultError::InvalidEncryptedFormat);
            }
            // Past the heuristic threshold the fragment claims to be an
            // envelope; one that still can't be parsed is corrupt, not
            // misformatted.
            let envelope = Envelope::from_bytes(&payload)
                .map_err(|_| VaultError::WrongPasswordOrCorruptData)?;
            let plain = crypto::decrypt(&envelope, pw)?;
            String::from_utf8(plain).map_err(|_| VaultError::WrongPasswordOrCorruptData)?
        }
        None => {
            if payload.len() >= ENVELOPE_HEURISTIC_LEN {
                return Err(VaultError::PasswordRequired);
            }
            String::from_utf8(payload).map_err(|_| VaultError::InvalidEncryptedFormat)?
        }
    };

    Ok((public_text.to_string(), secret))
}
