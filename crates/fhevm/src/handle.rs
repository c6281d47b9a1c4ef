// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Ciphertext handles. A handle is 32 bytes: a 21 byte hash prefix, the index of the value
//! within its input, the host chain id (8 bytes), the encrypted type and a version byte.

use alloy::primitives::{keccak256, Address, B256};

/// Type byte for `euint64`
pub const EUINT64_TYPE: u8 = 5;
pub const HANDLE_VERSION: u8 = 0;

const INDEX_BYTE: usize = 21;
const CHAIN_ID_RANGE: std::ops::Range<usize> = 22..30;
const TYPE_BYTE: usize = 30;
const VERSION_BYTE: usize = 31;

/// The all-zero handle means no value was ever recorded
pub fn is_zero_handle(handle: &B256) -> bool {
    handle.is_zero()
}

/// Derive the handle of value `index` in an encrypted input bound to `contract`, `user` and
/// `chain_id`
pub fn derive_input_handle(
    sealed: &[u8],
    index: u8,
    contract: Address,
    user: Address,
    chain_id: u64,
) -> B256 {
    let mut preimage = Vec::with_capacity(8 + sealed.len() + 20 + 20 + 8);
    preimage.extend_from_slice(b"ZK-w_hdl");
    preimage.extend_from_slice(sealed);
    preimage.extend_from_slice(contract.as_slice());
    preimage.extend_from_slice(user.as_slice());
    preimage.extend_from_slice(&chain_id.to_be_bytes());

    let mut handle = keccak256(&preimage);
    handle[INDEX_BYTE] = index;
    handle[CHAIN_ID_RANGE].copy_from_slice(&chain_id.to_be_bytes());
    handle[TYPE_BYTE] = EUINT64_TYPE;
    handle[VERSION_BYTE] = HANDLE_VERSION;
    handle
}

/// Host chain id encoded in a handle
pub fn handle_chain_id(handle: &B256) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&handle[CHAIN_ID_RANGE]);
    u64::from_be_bytes(bytes)
}

pub fn handle_type(handle: &B256) -> u8 {
    handle[TYPE_BYTE]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_metadata() {
        let contract = Address::repeat_byte(0x11);
        let user = Address::repeat_byte(0x22);
        let handle = derive_input_handle(b"sealed", 0, contract, user, 11_155_111);

        assert!(!is_zero_handle(&handle));
        assert_eq!(handle_chain_id(&handle), 11_155_111);
        assert_eq!(handle_type(&handle), EUINT64_TYPE);
        assert_eq!(handle[INDEX_BYTE], 0);
    }

    #[test]
    fn test_handle_binds_submitter() {
        let contract = Address::repeat_byte(0x11);
        let a = derive_input_handle(b"sealed", 0, contract, Address::repeat_byte(1), 1);
        let b = derive_input_handle(b"sealed", 0, contract, Address::repeat_byte(2), 1);
        assert_ne!(a, b);
        assert!(is_zero_handle(&B256::ZERO));
    }
}
