//! Client-side crypto helper for Ripple direct messages.
//!
//! Each user holds an X25519 keypair and publishes the public half. Both
//! participants of a thread run ECDH against the other's public key, expand
//! the shared secret into a per-thread AES-256-GCM key bound to the
//! canonical thread id, and encrypt message bodies into the JSON envelope
//! the server stores opaquely. No key material ever leaves the client.

pub mod cipher;
pub mod error;
pub mod keys;

pub use cipher::{decrypt, encrypt, open_body, seal_body};
pub use error::CryptoError;
pub use keys::{
    decode_public_key, encode_public_key, generate_keypair, message_key, shared_secret,
    Keypair, MessageKey,
};
