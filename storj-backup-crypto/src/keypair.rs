//! Client identity keypair.
//!
//! The bridge identifies an uploading client by an Ed25519 public key that
//! was registered once with account credentials. Every later request is
//! signed with the matching secret key.

use crate::error::{CryptoError, CryptoResult};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

/// Size of a secret or public key in bytes.
pub const KEYPAIR_KEY_SIZE: usize = 32;

/// Ed25519 keypair used to sign bridge requests.
///
/// The secret key zeroizes itself on drop (from ed25519-dalek).
pub struct KeyPair {
    signing: SigningKey,
}

impl KeyPair {
    /// Generates a fresh keypair.
    pub fn generate() -> Self {
        let seed: [u8; KEYPAIR_KEY_SIZE] = rand::random();
        Self {
            signing: SigningKey::from_bytes(&seed),
        }
    }

    /// Reconstructs a keypair from raw secret key bytes.
    pub fn from_secret_bytes(bytes: [u8; KEYPAIR_KEY_SIZE]) -> Self {
        Self {
            signing: SigningKey::from_bytes(&bytes),
        }
    }

    /// Parses a hex-encoded secret key, as written to `private.key`.
    pub fn from_private_hex(encoded: &str) -> CryptoResult<Self> {
        let bytes = hex::decode(encoded.trim())
            .map_err(|e| CryptoError::InvalidEncoding(format!("private key: {e}")))?;

        let bytes: [u8; KEYPAIR_KEY_SIZE] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: KEYPAIR_KEY_SIZE,
                    actual: bytes.len(),
                })?;

        Ok(Self::from_secret_bytes(bytes))
    }

    pub fn secret_bytes(&self) -> [u8; KEYPAIR_KEY_SIZE] {
        self.signing.to_bytes()
    }

    pub fn public_bytes(&self) -> [u8; KEYPAIR_KEY_SIZE] {
        self.signing.verifying_key().to_bytes()
    }

    pub fn private_hex(&self) -> String {
        hex::encode(self.secret_bytes())
    }

    pub fn public_hex(&self) -> String {
        hex::encode(self.public_bytes())
    }

    /// Signs `message`, returning the hex-encoded signature.
    pub fn sign_hex(&self, message: &[u8]) -> String {
        hex::encode(self.signing.sign(message).to_bytes())
    }
}

/// Verifies a hex signature produced by [`KeyPair::sign_hex`].
pub fn verify_hex(public_hex: &str, message: &[u8], signature_hex: &str) -> CryptoResult<()> {
    let mut public = [0u8; KEYPAIR_KEY_SIZE];
    hex::decode_to_slice(public_hex, &mut public)
        .map_err(|e| CryptoError::InvalidEncoding(format!("public key: {e}")))?;
    let mut signature = [0u8; 64];
    hex::decode_to_slice(signature_hex, &mut signature)
        .map_err(|e| CryptoError::InvalidEncoding(format!("signature: {e}")))?;

    let verifying = VerifyingKey::from_bytes(&public)
        .map_err(|e| CryptoError::InvalidEncoding(format!("public key: {e}")))?;

    verifying
        .verify(message, &Signature::from_bytes(&signature))
        .map_err(|_| CryptoError::Decryption("signature does not match".to_string()))
}
