//! Streaming file encryption.
//!
//! Files are sealed with XChaCha20-Poly1305 in the STREAM construction
//! (big-endian 32-bit segment counter). Plaintext is cut into fixed-size
//! segments; every segment carries its own tag and the final one is marked
//! so truncation is detected on decryption.

use crate::error::{CryptoError, CryptoResult};
use crate::key::DataCipherKeyIv;
use crate::TAG_SIZE;
use chacha20poly1305::aead::generic_array::GenericArray;
use chacha20poly1305::aead::stream::{DecryptorBE32, EncryptorBE32};
use chacha20poly1305::aead::KeyInit;
use chacha20poly1305::XChaCha20Poly1305;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, BufWriter};

/// Plaintext bytes per encrypted segment.
pub const SEGMENT_SIZE: usize = 64 * 1024;

/// Encrypts `source` into `target`, returning the number of bytes written.
///
/// The returned future resolves only after the output has been flushed and
/// synced to disk, so the target is safe to hand to an uploader.
pub async fn encrypt_file(
    source: &Path,
    target: &Path,
    secret: &DataCipherKeyIv,
) -> CryptoResult<u64> {
    let cipher = XChaCha20Poly1305::new(GenericArray::from_slice(secret.key()));
    let mut encryptor = EncryptorBE32::from_aead(cipher, GenericArray::from_slice(secret.iv()));

    let mut reader = File::open(source).await?;
    let mut writer = BufWriter::new(File::create(target).await?);
    let mut written = 0u64;

    let mut current = vec![0u8; SEGMENT_SIZE];
    let mut next = vec![0u8; SEGMENT_SIZE];
    let mut current_len = read_full(&mut reader, &mut current).await?;

    loop {
        // A short read means EOF, so only a full segment can have a successor.
        let next_len = if current_len == SEGMENT_SIZE {
            read_full(&mut reader, &mut next).await?
        } else {
            0
        };

        if next_len == 0 {
            let sealed = encryptor
                .encrypt_last(&current[..current_len])
                .map_err(|e| CryptoError::Encryption(format!("final segment: {e}")))?;
            writer.write_all(&sealed).await?;
            written += sealed.len() as u64;
            break;
        }

        let sealed = encryptor
            .encrypt_next(&current[..current_len])
            .map_err(|e| CryptoError::Encryption(format!("segment: {e}")))?;
        writer.write_all(&sealed).await?;
        written += sealed.len() as u64;

        std::mem::swap(&mut current, &mut next);
        current_len = next_len;
    }

    writer.flush().await?;
    writer.get_ref().sync_all().await?;
    Ok(written)
}

/// Decrypts a file produced by [`encrypt_file`], returning the plaintext size.
pub async fn decrypt_file(
    source: &Path,
    target: &Path,
    secret: &DataCipherKeyIv,
) -> CryptoResult<u64> {
    const SEALED_SEGMENT_SIZE: usize = SEGMENT_SIZE + TAG_SIZE;

    let cipher = XChaCha20Poly1305::new(GenericArray::from_slice(secret.key()));
    let mut decryptor = DecryptorBE32::from_aead(cipher, GenericArray::from_slice(secret.iv()));

    let mut reader = File::open(source).await?;
    let mut writer = BufWriter::new(File::create(target).await?);
    let mut written = 0u64;

    let mut current = vec![0u8; SEALED_SEGMENT_SIZE];
    let mut next = vec![0u8; SEALED_SEGMENT_SIZE];
    let mut current_len = read_full(&mut reader, &mut current).await?;

    loop {
        let next_len = if current_len == SEALED_SEGMENT_SIZE {
            read_full(&mut reader, &mut next).await?
        } else {
            0
        };

        if next_len == 0 {
            let plain = decryptor
                .decrypt_last(&current[..current_len])
                .map_err(|_| {
                    CryptoError::Decryption("final segment (wrong key or truncated file)".into())
                })?;
            writer.write_all(&plain).await?;
            written += plain.len() as u64;
            break;
        }

        let plain = decryptor
            .decrypt_next(&current[..current_len])
            .map_err(|_| CryptoError::Decryption("segment (wrong key or tampered data)".into()))?;
        writer.write_all(&plain).await?;
        written += plain.len() as u64;

        std::mem::swap(&mut current, &mut next);
        current_len = next_len;
    }

    writer.flush().await?;
    Ok(written)
}

/// Reads until `buf` is full or the reader hits EOF.
async fn read_full<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
