//! Authority credential decoding.
//!
//! A credential is 64 bytes of secret material: bytes [0..32) are the
//! private scalar, bytes [32..64) the corresponding public address. Two
//! textual encodings are accepted, tried in this fixed order:
//!
//! 1. a base58 string,
//! 2. a JSON array of 64 unsigned byte values.
//!
//! Nothing else is recognized, and the length is enforced before any chain
//! interaction.

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use thiserror::Error;

pub const CREDENTIAL_LEN: usize = 64;

#[derive(Debug, Error, PartialEq)]
pub enum CredentialError {
    #[error("invalid credential format, use base58 or a JSON array like [1,2,3...]")]
    UnrecognizedEncoding,
    #[error("credential must decode to exactly {CREDENTIAL_LEN} bytes, got {0}")]
    WrongLength(usize),
    #[error("credential bytes do not form a valid keypair: {0}")]
    InvalidKeypair(String),
}

/// Decode a credential from either accepted encoding.
pub fn decode_credential(input: &str) -> Result<[u8; CREDENTIAL_LEN], CredentialError> {
    let input = input.trim();

    let bytes = match bs58::decode(input).into_vec() {
        Ok(bytes) => bytes,
        Err(_) => serde_json::from_str::<Vec<u8>>(input)
            .map_err(|_| CredentialError::UnrecognizedEncoding)?,
    };

    if bytes.len() != CREDENTIAL_LEN {
        return Err(CredentialError::WrongLength(bytes.len()));
    }

    let mut credential = [0u8; CREDENTIAL_LEN];
    credential.copy_from_slice(&bytes);
    Ok(credential)
}

/// The public address embedded in bytes [32..64) of the credential.
pub fn authority_address(credential: &[u8; CREDENTIAL_LEN]) -> Pubkey {
    let mut key = [0u8; 32];
    key.copy_from_slice(&credential[32..]);
    Pubkey::new_from_array(key)
}

/// Build the signing keypair from the raw credential bytes.
pub fn signing_keypair(credential: &[u8; CREDENTIAL_LEN]) -> Result<Keypair, CredentialError> {
    Keypair::from_bytes(credential).map_err(|e| CredentialError::InvalidKeypair(e.to_string()))
}
