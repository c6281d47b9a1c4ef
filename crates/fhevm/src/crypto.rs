// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Public key sealing over secp256k1.
//!
//! A sealed box is `[33 byte ephemeral public key][12 byte nonce][ciphertext]`. The AES-256-GCM
//! key is the SHA-256 of the ECDH x coordinate and a domain tag. Associated data is bound into
//! the tag, so a box only opens under the context it was sealed for.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use alloy::signers::k256::{elliptic_curve::sec1::ToEncodedPoint, PublicKey, SecretKey};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::Zeroizing;

const KDF_TAG: &[u8] = b"cloak-seal-v1";
const PUBLIC_KEY_LEN: usize = 33;
const NONCE_LEN: usize = 12;
const HEADER_LEN: usize = PUBLIC_KEY_LEN + NONCE_LEN;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SealError {
    #[error("Sealed box is too short")]
    TooShort,
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Could not seal data")]
    Seal,
    #[error("Could not open sealed data")]
    Open,
}

fn shared_key(secret: &SecretKey, public: &PublicKey) -> Result<Zeroizing<[u8; 32]>, SealError> {
    let shared = (public.to_projective() * *secret.to_nonzero_scalar()).to_affine();
    let encoded = shared.to_encoded_point(false);
    let x = encoded.x().ok_or(SealError::InvalidPublicKey)?;

    let mut hasher = Sha256::new();
    hasher.update(x);
    hasher.update(KDF_TAG);
    let mut key = Zeroizing::new([0u8; 32]);
    key.copy_from_slice(&hasher.finalize());
    Ok(key)
}

/// Seal `plaintext` so only the holder of the secret key for `recipient` can open it
pub fn seal(recipient: &PublicKey, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>, SealError> {
    let ephemeral = SecretKey::random(&mut OsRng);
    let key = shared_key(&ephemeral, recipient)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key.as_ref()).map_err(|_| SealError::Seal)?;
    let ciphertext = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| SealError::Seal)?;

    let ephemeral_public = ephemeral.public_key().to_encoded_point(true);

    let mut output = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    output.extend_from_slice(ephemeral_public.as_bytes());
    output.extend_from_slice(&nonce_bytes);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Open a box made by [`seal`]
pub fn open(secret: &SecretKey, sealed: &[u8], aad: &[u8]) -> Result<Zeroizing<Vec<u8>>, SealError> {
    if sealed.len() < HEADER_LEN {
        return Err(SealError::TooShort);
    }

    let ephemeral_public = PublicKey::from_sec1_bytes(&sealed[..PUBLIC_KEY_LEN])
        .map_err(|_| SealError::InvalidPublicKey)?;
    let nonce = Nonce::from_slice(&sealed[PUBLIC_KEY_LEN..HEADER_LEN]);
    let ciphertext = &sealed[HEADER_LEN..];

    let key = shared_key(secret, &ephemeral_public)?;
    let cipher = Aes256Gcm::new_from_slice(key.as_ref()).map_err(|_| SealError::Open)?;
    let plaintext = cipher
        .decrypt(
            nonce,
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| SealError::Open)?;

    Ok(Zeroizing::new(plaintext))
}

/// Length of a sealed box holding `plaintext_len` bytes
pub const fn sealed_len(plaintext_len: usize) -> usize {
    // 16 byte GCM tag
    HEADER_LEN + plaintext_len + 16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open() {
        let recipient = SecretKey::random(&mut OsRng);
        let sealed = seal(&recipient.public_key(), b"1200", b"ctx").unwrap();
        assert_eq!(sealed.len(), sealed_len(4));

        let opened = open(&recipient, &sealed, b"ctx").unwrap();
        assert_eq!(opened.as_slice(), b"1200");
    }

    #[test]
    fn test_wrong_context_or_key_fails() {
        let recipient = SecretKey::random(&mut OsRng);
        let other = SecretKey::random(&mut OsRng);
        let sealed = seal(&recipient.public_key(), b"1200", b"ctx").unwrap();

        assert!(matches!(open(&recipient, &sealed, b"other"), Err(SealError::Open)));
        assert!(matches!(open(&other, &sealed, b"ctx"), Err(SealError::Open)));
        assert!(matches!(
            open(&recipient, &sealed[..10], b"ctx"),
            Err(SealError::TooShort)
        ));
    }
}
