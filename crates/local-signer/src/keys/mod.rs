//! Resolution of the key material named by a request: the certificate chain
//! behind a key ID and the private key behind `pluginConfig.env`.

mod certificate;
mod environment;
mod private_key;

pub use certificate::{ChainCertificate, load_certificate_chain};
pub use environment::{Environment, ProcessEnvironment};
pub use private_key::{
    ENV_CONFIG_KEY, PemKeyError, PrivateKey, load_private_key, parse_private_key_pem,
};

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("failed to read certificate file: {0}")]
    ReadCertificate(#[source] std::io::Error),
    #[error("failed to parse certificate file: {0}")]
    ParseCertificate(String),
    #[error("no certificate found")]
    NoCertificate,
    #[error("no private key specified")]
    MissingKeyConfig,
    #[error("environment variable {0:?} is not set")]
    MissingEnvironment(String),
    #[error("failed to decode private key from environment variable {name:?}: {source}")]
    DecodeKey {
        name: String,
        source: base64::DecodeError,
    },
    #[error("failed to parse private key from environment variable {name:?}: {reason}")]
    ParseKey { name: String, reason: String },
    #[error("private key is not a signer: {0}")]
    NotASigner(String),
}

impl KeyError {
    /// Whether the failure was caused by caller input or configuration.
    ///
    /// A key that parses but cannot sign points at a resolver/algorithm
    /// mismatch instead.
    pub fn is_validation(&self) -> bool {
        !matches!(self, KeyError::NotASigner(_))
    }
}
