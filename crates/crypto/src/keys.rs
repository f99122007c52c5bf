use base64::{engine::general_purpose, Engine as _};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use sha2::Sha256;
use x25519_dalek::{PublicKey, StaticSecret};

use ripple_shared::ThreadId;

use crate::error::CryptoError;

/// Symmetric key for one thread's message bodies.
pub type MessageKey = [u8; 32];

pub struct Keypair {
    pub secret: StaticSecret,
    pub public: PublicKey,
}

impl Keypair {
    /// Base64 form of the public key, as uploaded to the server.
    pub fn public_base64(&self) -> String {
        encode_public_key(&self.public)
    }
}

pub fn generate_keypair() -> Keypair {
    let secret = StaticSecret::random_from_rng(OsRng);
    let public = PublicKey::from(&secret);
    Keypair { secret, public }
}

pub fn encode_public_key(public: &PublicKey) -> String {
    general_purpose::STANDARD.encode(public.as_bytes())
}

pub fn decode_public_key(encoded: &str) -> Result<PublicKey, CryptoError> {
    let bytes = general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
    let bytes: [u8; 32] = bytes
        .try_into()
        .map_err(|_| CryptoError::InvalidPublicKey("public key must be 32 bytes".into()))?;
    Ok(PublicKey::from(bytes))
}

/// ECDH shared secret; both directions derive the same 32 bytes.
pub fn shared_secret(my_secret: &StaticSecret, their_public: &PublicKey) -> [u8; 32] {
    my_secret.diffie_hellman(their_public).to_bytes()
}

/// Expand the ECDH secret into the per-thread message key.
///
/// The canonical thread id goes in as the HKDF salt, so the same pair of
/// users always ends up with the same key for a given thread, derived
/// independently on both sides.
pub fn message_key(shared_secret: &[u8; 32], thread: &ThreadId) -> MessageKey {
    let hk = Hkdf::<Sha256>::new(Some(thread.as_str().as_bytes()), shared_secret);
    let mut key = [0u8; 32];
    hk.expand(b"dm-message-key", &mut key)
        .expect("32 bytes is a valid HKDF-SHA256 output length");
    key
}
