//! Password-based encryption envelope
//!
//! Keys are derived with PBKDF2-HMAC-SHA256 (100,000 iterations, 32-byte
//! output) and data is encrypted with AES-256-CBC using PKCS#7 padding. The
//! envelope serializes as `salt(16) || iv(16) || ciphertext` so the decoder
//! can re-derive the key from the password alone.
//!
//! Decryption failure and padding failure are collapsed into a single
//! [`VaultError::WrongPasswordOrCorruptData`] so callers cannot be used as a
//! padding oracle.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use crate::{VaultError, VaultResult};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// PBKDF2 salt length in bytes.
pub const SALT_LEN: usize = 16;
/// AES-CBC initialization vector length in bytes.
pub const IV_LEN: usize = 16;
/// AES block size in bytes.
pub const BLOCK_LEN: usize = 16;
/// PBKDF2 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 100_000;
/// Derived key length (AES-256).
pub const KEY_LEN: usize = 32;

/// Minimum serialized envelope size: salt + iv + one padded block.
pub const MIN_ENVELOPE_LEN: usize = SALT_LEN + IV_LEN + BLOCK_LEN;

/// A password-encrypted byte buffer with the material needed to decrypt it.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub salt: [u8; SALT_LEN],
    pub iv: [u8; IV_LEN],
    pub ciphertext: Vec<u8>,
}

/// Derive a 256-bit key from a password and salt.
///
/// Deterministic: the same (password, salt) pair always yields the same key.
pub fn derive_key(password: &str, salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    key
}

/// Encrypt `plaintext` under a password with a fresh random salt and IV.
///
/// PKCS#7 padding is applied even when the input is already block-aligned,
/// so the pad is always self-describing. Because the salt and IV are fresh
/// per call, encrypting the same input twice never yields the same output.
pub fn encrypt(plaintext: &[u8], password: &str) -> Envelope {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let key = derive_key(password, &salt);
    let cipher = Aes256CbcEnc::new_from_slices(&key, &iv).expect("key/iv lengths are fixed");
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    Envelope { salt, iv, ciphertext }
}

/// Decrypt an envelope with the supplied password.
///
/// Fails with [`VaultError::WrongPasswordOrCorruptData`] when the padding is
/// invalid or the ciphertext is not block-aligned; a wrong password and
/// corrupted data are indistinguishable here.
pub fn decrypt(envelope: &Envelope, password: &str) -> VaultResult<Vec<u8>> {
    if envelope.ciphertext.is_empty() || envelope.ciphertext.len() % BLOCK_LEN != 0 {
        return Err(VaultError::WrongPasswordOrCorruptData);
    }

    let key = derive_key(password, &envelope.salt);
    let cipher =
        Aes256CbcDec::new_from_slices(&key, &envelope.iv).expect("key/iv lengths are fixed");

    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(&envelope.ciphertext)
        .map_err(|_| VaultError::WrongPasswordOrCorruptData)
}

impl Envelope {
    /// Serialize as `salt || iv || ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SALT_LEN + IV_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parse `salt || iv || ciphertext`, rejecting buffers too short to hold
    /// the fixed prefix plus one cipher block.
    pub fn from_bytes(data: &[u8]) -> VaultResult<Self> {
        if data.len() < MIN_ENVELOPE_LEN {
            return Err(VaultError::InvalidEncryptedFormat);
        }

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&data[..SALT_LEN]);
        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&data[SALT_LEN..SALT_LEN + IV_LEN]);

        Ok(Self {
            salt,
            iv,
            ciphertext: data[SALT_LEN + IV_LEN..].to_vec(),
        })
    }
}
