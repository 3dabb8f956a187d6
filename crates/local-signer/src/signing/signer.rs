use rand_core::CryptoRngCore;
use rsa::signature;

use super::algorithm::SigningAlgorithm;
use super::ecdsa::{P256Signer, P384Signer, P521Signer};
use super::rsa::RsaPssSigner;
use crate::keys::PrivateKey;

#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("failed to create signer: {key} key cannot sign with {algorithm}")]
    KeyMismatch {
        key: &'static str,
        algorithm: SigningAlgorithm,
    },
    #[error("failed to create signer: {0}")]
    InvalidKey(String),
    #[error("failed to sign payload: {0}")]
    Sign(#[from] signature::Error),
}

/// Trait for signing opaque payloads.
///
/// Implementations are sync; signing is CPU-bound and happens once per
/// process.
pub trait PayloadSigner {
    /// Sign the payload. Returns raw signature bytes in the encoding the
    /// algorithm's wire token implies.
    fn sign(&self, payload: &[u8], rng: &mut dyn CryptoRngCore) -> Result<Vec<u8>, SignerError>;

    /// Algorithm this signer produces signatures for.
    fn algorithm(&self) -> SigningAlgorithm;
}

/// Binds a private key to the algorithm chosen from the certificate.
///
/// Fails when the key cannot produce signatures under `algorithm`, which
/// happens when the private key does not belong to the certificate.
pub fn signer_for(
    key: PrivateKey,
    algorithm: SigningAlgorithm,
) -> Result<Box<dyn PayloadSigner>, SignerError> {
    use SigningAlgorithm::*;

    let signer: Box<dyn PayloadSigner> = match (key, algorithm) {
        (PrivateKey::Rsa(key), RsassaPssSha256 | RsassaPssSha384 | RsassaPssSha512) => {
            Box::new(RsaPssSigner::new(key, algorithm)?)
        }
        (PrivateKey::P256(key), EcdsaSha256) => Box::new(P256Signer::new(&key)?),
        (PrivateKey::P384(key), EcdsaSha384) => Box::new(P384Signer::new(&key)?),
        (PrivateKey::P521(key), EcdsaSha512) => Box::new(P521Signer::new(&key)?),
        (key, algorithm) => {
            return Err(SignerError::KeyMismatch {
                key: key.kind(),
                algorithm,
            });
        }
    };
    Ok(signer)
}
