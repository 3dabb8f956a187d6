use std::collections::BTreeMap;
use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, PrivateKeyInfo};

use super::{Environment, KeyError};
use crate::signing::{EC_PUBLIC_KEY, RSA_ENCRYPTION, SECP256R1, SECP384R1, SECP521R1};

/// `pluginConfig` key naming the environment variable that holds the key.
pub const ENV_CONFIG_KEY: &str = "env";

/// A private key this plugin knows how to sign with.
pub enum PrivateKey {
    Rsa(RsaPrivateKey),
    P256(p256::SecretKey),
    P384(p384::SecretKey),
    P521(p521::SecretKey),
}

impl PrivateKey {
    pub fn kind(&self) -> &'static str {
        match self {
            PrivateKey::Rsa(_) => "RSA",
            PrivateKey::P256(_) => "EC P-256",
            PrivateKey::P384(_) => "EC P-384",
            PrivateKey::P521(_) => "EC P-521",
        }
    }
}

// Never print key material.
impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrivateKey").field(&self.kind()).finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PemKeyError {
    #[error("{0}")]
    Malformed(String),
    #[error("{0}")]
    NotASigner(String),
}

fn malformed(error: impl fmt::Display) -> PemKeyError {
    PemKeyError::Malformed(error.to_string())
}

/// Loads the private key named by `plugin_config["env"]`.
///
/// The variable holds base64 (standard alphabet, padded) of a PEM document;
/// only its first block is read.
pub fn load_private_key(
    plugin_config: &BTreeMap<String, String>,
    env: &dyn Environment,
) -> Result<PrivateKey, KeyError> {
    let name = plugin_config
        .get(ENV_CONFIG_KEY)
        .filter(|name| !name.is_empty())
        .ok_or(KeyError::MissingKeyConfig)?;

    let encoded = env
        .var(name)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| KeyError::MissingEnvironment(name.clone()))?;

    let pem = STANDARD
        .decode(encoded.trim())
        .map_err(|source| KeyError::DecodeKey {
            name: name.clone(),
            source,
        })?;

    parse_private_key_pem(&pem).map_err(|e| match e {
        PemKeyError::Malformed(reason) => KeyError::ParseKey {
            name: name.clone(),
            reason,
        },
        PemKeyError::NotASigner(reason) => KeyError::NotASigner(reason),
    })
}

/// Parses the first PEM block of `data` as a private key.
///
/// Accepts `PRIVATE KEY` (PKCS#8), `RSA PRIVATE KEY` (PKCS#1) and
/// `EC PRIVATE KEY` (SEC1).
pub fn parse_private_key_pem(data: &[u8]) -> Result<PrivateKey, PemKeyError> {
    let block = pem::parse(data).map_err(malformed)?;
    let der = block.contents();
    match block.tag() {
        "PRIVATE KEY" => parse_pkcs8(der),
        "RSA PRIVATE KEY" => RsaPrivateKey::from_pkcs1_der(der)
            .map(PrivateKey::Rsa)
            .map_err(malformed),
        "EC PRIVATE KEY" => parse_sec1(der),
        other => Err(PemKeyError::Malformed(format!(
            "unexpected PEM block type {other:?}"
        ))),
    }
}

fn parse_pkcs8(der: &[u8]) -> Result<PrivateKey, PemKeyError> {
    let info = PrivateKeyInfo::try_from(der).map_err(malformed)?;
    let algorithm = info.algorithm.oid;

    if algorithm == RSA_ENCRYPTION {
        return RsaPrivateKey::from_pkcs8_der(der)
            .map(PrivateKey::Rsa)
            .map_err(malformed);
    }
    if algorithm != EC_PUBLIC_KEY {
        return Err(PemKeyError::NotASigner(format!(
            "key algorithm {algorithm} not supported"
        )));
    }

    let curve = info.algorithm.parameters_oid().map_err(malformed)?;
    if curve == SECP256R1 {
        p256::SecretKey::from_pkcs8_der(der)
            .map(PrivateKey::P256)
            .map_err(malformed)
    } else if curve == SECP384R1 {
        p384::SecretKey::from_pkcs8_der(der)
            .map(PrivateKey::P384)
            .map_err(malformed)
    } else if curve == SECP521R1 {
        p521::SecretKey::from_pkcs8_der(der)
            .map(PrivateKey::P521)
            .map_err(malformed)
    } else {
        Err(PemKeyError::Malformed(format!("curve {curve} not supported")))
    }
}

// SEC1 keys carry the curve OID, so decoding under the wrong curve fails.
fn parse_sec1(der: &[u8]) -> Result<PrivateKey, PemKeyError> {
    if let Ok(key) = p256::SecretKey::from_sec1_der(der) {
        return Ok(PrivateKey::P256(key));
    }
    if let Ok(key) = p384::SecretKey::from_sec1_der(der) {
        return Ok(PrivateKey::P384(key));
    }
    p521::SecretKey::from_sec1_der(der)
        .map(PrivateKey::P521)
        .map_err(|_| PemKeyError::Malformed("invalid SEC1 EC private key".into()))
}
