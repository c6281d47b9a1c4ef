// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::crypto::{self, SealError};
use alloy::{
    primitives::Bytes,
    signers::k256::{elliptic_curve::sec1::ToEncodedPoint, PublicKey, SecretKey},
};
use rand::rngs::OsRng;
use std::fmt;
use zeroize::Zeroizing;

/// A secp256k1 keypair used to receive sealed values. The secret never leaves the process.
pub struct Keypair {
    secret: SecretKey,
}

impl Keypair {
    pub fn generate() -> Self {
        Self {
            secret: SecretKey::random(&mut OsRng),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.secret.public_key()
    }

    /// Compressed SEC1 encoding of the public key
    pub fn public_key_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.public_key().to_encoded_point(true).as_bytes())
    }

    pub fn open(&self, sealed: &[u8], aad: &[u8]) -> Result<Zeroizing<Vec<u8>>, SealError> {
        crypto::open(&self.secret, sealed, aad)
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key_bytes())
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Parse a SEC1 encoded public key as sent over the wire
pub fn parse_public_key(bytes: &[u8]) -> Result<PublicKey, SealError> {
    PublicKey::from_sec1_bytes(bytes).map_err(|_| SealError::InvalidPublicKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypairs_are_fresh() {
        let a = Keypair::generate();
        let b = Keypair::generate();
        assert_ne!(a.public_key_bytes(), b.public_key_bytes());
        assert_eq!(a.public_key_bytes().len(), 33);
        assert!(!format!("{:?}", a).contains("SecretKey"));
    }

    #[test]
    fn test_public_key_wire_form() {
        let pair = Keypair::generate();
        let parsed = parse_public_key(&pair.public_key_bytes()).unwrap();
        let sealed = crypto::seal(&parsed, b"7", b"").unwrap();
        assert_eq!(pair.open(&sealed, b"").unwrap().as_slice(), b"7");
        assert!(parse_public_key(&[1, 2, 3]).is_err());
    }
}
