//! Encryption layer for storj-backup.
//!
//! Provides:
//! - Argon2id key derivation for passphrase-protected local state
//! - ChaCha20-Poly1305 for small sealed blobs (the keyring)
//! - XChaCha20-Poly1305 STREAM for archive files of arbitrary size
//! - Ed25519 client identity for signing bridge requests
//!
//! # Architecture
//!
//! Every uploaded archive gets its own random [`DataCipherKeyIv`]. The
//! secret never leaves the machine; it is stored in the local keyring,
//! indexed by the remote file id, and the keyring itself is sealed with a
//! key derived from the user's passphrase.

mod cipher;
mod error;
mod key;
pub mod keypair;
pub mod stream;

pub use cipher::{decrypt, encrypt, EncryptedData, NONCE_SIZE, TAG_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use key::{derive_key, DataCipherKeyIv, DerivedKey, KdfParams, Salt, IV_SIZE, KEY_SIZE, SALT_SIZE};
pub use keypair::{verify_hex, KeyPair};
pub use stream::{decrypt_file, encrypt_file, SEGMENT_SIZE};
