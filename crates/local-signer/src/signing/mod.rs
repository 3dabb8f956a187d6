mod algorithm;
mod ecdsa;
mod rsa;
mod signer;

pub(crate) use algorithm::{EC_PUBLIC_KEY, RSA_ENCRYPTION, SECP256R1, SECP384R1, SECP521R1};
pub use algorithm::{AlgorithmError, HashAlgorithm, KeySpec, KeyType, SigningAlgorithm};
pub use ecdsa::{P256Signer, P384Signer, P521Signer};
pub use self::rsa::RsaPssSigner;
pub use signer::{PayloadSigner, SignerError, signer_for};
