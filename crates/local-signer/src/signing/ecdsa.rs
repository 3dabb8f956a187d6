use p256::ecdsa::signature::RandomizedSigner;
use rand_core::CryptoRngCore;

use super::algorithm::SigningAlgorithm;
use super::signer::{PayloadSigner, SignerError};

macro_rules! ecdsa_signer {
    ($name:ident, $curve:ident, $algorithm:expr, $doc:expr) => {
        #[doc = $doc]
        ///
        /// Nonces are hedged: RFC 6979 derivation mixed with fresh entropy
        /// from the caller's CSPRNG. Signatures are fixed-width `r || s`.
        pub struct $name {
            signing_key: $curve::ecdsa::SigningKey,
        }

        impl $name {
            pub fn new(secret_key: &$curve::SecretKey) -> Result<Self, SignerError> {
                let signing_key = $curve::ecdsa::SigningKey::from_bytes(&secret_key.to_bytes())
                    .map_err(|e| SignerError::InvalidKey(e.to_string()))?;
                Ok(Self { signing_key })
            }
        }

        impl PayloadSigner for $name {
            fn sign(
                &self,
                payload: &[u8],
                mut rng: &mut dyn CryptoRngCore,
            ) -> Result<Vec<u8>, SignerError> {
                let signature: $curve::ecdsa::Signature =
                    self.signing_key.try_sign_with_rng(&mut rng, payload)?;
                Ok(signature.to_bytes().to_vec())
            }

            fn algorithm(&self) -> SigningAlgorithm {
                $algorithm
            }
        }
    };
}

ecdsa_signer!(
    P256Signer,
    p256,
    SigningAlgorithm::EcdsaSha256,
    "ECDSA signer on NIST P-256 with SHA-256."
);
ecdsa_signer!(
    P384Signer,
    p384,
    SigningAlgorithm::EcdsaSha384,
    "ECDSA signer on NIST P-384 with SHA-384."
);
ecdsa_signer!(
    P521Signer,
    p521,
    SigningAlgorithm::EcdsaSha512,
    "ECDSA signer on NIST P-521 with SHA-512."
);
