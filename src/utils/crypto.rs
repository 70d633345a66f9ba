// src/utils/crypto.rs
//! Cryptographic helpers shared by signers and verifiers.
//!
//! Uses Keccak-256 (Ethereum's standard hash function) for message digests
//! and follows the `eth_sign` convention for what actually gets signed.

use ethers::utils::keccak256;
use ethers_core::types::Address;
use ethers_core::utils::hash_message;
use k256::ecdsa::VerifyingKey;

/// Computes a Keccak-256 hash of the input data (Ethereum-compatible).
///
/// # Arguments
/// * `data` - Binary data to hash (as bytes slice)
///
/// # Returns
/// Fixed-size 32-byte array (`[u8; 32]`) containing the hash.
pub fn hash_data(data: &[u8]) -> [u8; 32] {
    keccak256(data)
}

/// Prehash that an `eth_sign` signer actually signs for a 32-byte digest.
///
/// Computes `keccak256("\x19Ethereum Signed Message:\n32" || digest)`.
pub fn eth_signed_prehash(digest: &[u8; 32]) -> [u8; 32] {
    hash_message(digest).to_fixed_bytes()
}

/// Derives the account address of a secp256k1 public key.
///
/// The address is the last 20 bytes of the Keccak-256 hash of the
/// uncompressed point without its `0x04` tag byte.
pub fn address_from_verifying_key(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = hash_data(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::SigningKey;

    #[test]
    fn test_hash_data_known_vector() {
        // keccak256("") from the Keccak reference
        assert_eq!(
            ethers_core::utils::hex::encode(hash_data(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_address_from_known_private_key() {
        // Private key 0x...01 controls 0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf
        let mut secret = [0u8; 32];
        secret[31] = 1;
        let key = SigningKey::from_slice(&secret).unwrap();
        let address = address_from_verifying_key(key.verifying_key());
        assert_eq!(
            ethers_core::utils::to_checksum(&address, None),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
    }

    #[test]
    fn test_eth_signed_prehash_differs_from_digest() {
        let digest = hash_data(b"claim");
        assert_ne!(eth_signed_prehash(&digest), digest);
        assert_eq!(eth_signed_prehash(&digest), eth_signed_prehash(&digest));
    }
}
