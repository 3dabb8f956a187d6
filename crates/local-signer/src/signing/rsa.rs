use rand_core::CryptoRngCore;
use rsa::RsaPrivateKey;
use rsa::pss::BlindedSigningKey;
use rsa::signature::{RandomizedSigner, SignatureEncoding};
use rsa::traits::PublicKeyParts;
use sha2::{Sha256, Sha384, Sha512};

use super::algorithm::{HashAlgorithm, KeyType, SigningAlgorithm};
use super::signer::{PayloadSigner, SignerError};

/// RSASSA-PSS signer.
///
/// The salt is as long as the digest output and the private key operation
/// is blinded; both draw from the caller's CSPRNG.
pub struct RsaPssSigner {
    private_key: RsaPrivateKey,
    algorithm: SigningAlgorithm,
}

impl RsaPssSigner {
    pub fn new(private_key: RsaPrivateKey, algorithm: SigningAlgorithm) -> Result<Self, SignerError> {
        let expected = algorithm.key_spec();
        if expected.key_type != KeyType::Rsa {
            return Err(SignerError::KeyMismatch {
                key: "RSA",
                algorithm,
            });
        }
        let bits = private_key.size() * 8;
        if bits != expected.size {
            return Err(SignerError::InvalidKey(format!(
                "RSA private key is {bits} bits, {algorithm} requires {}",
                expected.size
            )));
        }
        Ok(Self {
            private_key,
            algorithm,
        })
    }
}

impl PayloadSigner for RsaPssSigner {
    fn sign(&self, payload: &[u8], mut rng: &mut dyn CryptoRngCore) -> Result<Vec<u8>, SignerError> {
        let key = self.private_key.clone();
        let signature = match self.algorithm.hash() {
            HashAlgorithm::Sha256 => BlindedSigningKey::<Sha256>::new(key)
                .try_sign_with_rng(&mut rng, payload)?
                .to_vec(),
            HashAlgorithm::Sha384 => BlindedSigningKey::<Sha384>::new(key)
                .try_sign_with_rng(&mut rng, payload)?
                .to_vec(),
            HashAlgorithm::Sha512 => BlindedSigningKey::<Sha512>::new(key)
                .try_sign_with_rng(&mut rng, payload)?
                .to_vec(),
        };
        Ok(signature)
    }

    fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }
}
