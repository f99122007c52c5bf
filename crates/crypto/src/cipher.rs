use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{engine::general_purpose, Engine as _};
use rand::RngCore;

use ripple_shared::{Body, Envelope};

use crate::error::CryptoError;
use crate::keys::MessageKey;

const IV_SIZE: usize = 12;

/// Encrypt a message body under the thread key.
///
/// A fresh random IV is drawn for every call; reusing an IV under the same
/// key breaks AES-GCM, so the IV is never caller-supplied.
pub fn encrypt(key: &MessageKey, plaintext: &str) -> Result<Envelope, CryptoError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::EncryptionFailed)?;

    let mut iv = [0u8; IV_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut iv);
    let nonce = Nonce::from_slice(&iv);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| CryptoError::EncryptionFailed)?;

    Ok(Envelope {
        cipher_text: general_purpose::STANDARD.encode(&ciphertext),
        iv: general_purpose::STANDARD.encode(iv),
    })
}

pub fn decrypt(key: &MessageKey, envelope: &Envelope) -> Result<String, CryptoError> {
    let iv = general_purpose::STANDARD
        .decode(&envelope.iv)
        .map_err(|_| CryptoError::DecryptionFailed)?;
    if iv.len() != IV_SIZE {
        return Err(CryptoError::DecryptionFailed);
    }
    let ciphertext = general_purpose::STANDARD
        .decode(&envelope.cipher_text)
        .map_err(|_| CryptoError::DecryptionFailed)?;

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::DecryptionFailed)?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&iv), ciphertext.as_slice())
        .map_err(|_| CryptoError::DecryptionFailed)?;

    String::from_utf8(plaintext).map_err(|_| CryptoError::DecryptionFailed)
}

/// Build the body to send: encrypted when the recipient has a key on file,
/// plaintext otherwise. The fallback is a documented degradation and is
/// logged, never silent.
pub fn seal_body(key: Option<&MessageKey>, text: &str) -> Result<Body, CryptoError> {
    match key {
        Some(key) => Ok(Body::Encrypted(encrypt(key, text)?)),
        None => {
            tracing::warn!("recipient has no public key, sending plaintext");
            Ok(Body::Plaintext(text.to_string()))
        }
    }
}

/// Recover the display text of a received body.
///
/// An encrypted body without a usable key, or one that fails authentication,
/// surfaces `DecryptionFailed` so the caller can render a placeholder
/// instead of raw ciphertext.
pub fn open_body(key: Option<&MessageKey>, body: &Body) -> Result<String, CryptoError> {
    match body {
        Body::Plaintext(text) => Ok(text.clone()),
        Body::Encrypted(envelope) => match key {
            Some(key) => decrypt(key, envelope),
            None => Err(CryptoError::DecryptionFailed),
        },
    }
}
