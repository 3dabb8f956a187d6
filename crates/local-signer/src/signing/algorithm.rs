use std::fmt;
use std::str::FromStr;

use rsa::RsaPublicKey;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::traits::PublicKeyParts;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use x509_cert::Certificate;
use x509_cert::der::asn1::ObjectIdentifier;

pub(crate) const RSA_ENCRYPTION: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
pub(crate) const EC_PUBLIC_KEY: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
pub(crate) const SECP256R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
pub(crate) const SECP384R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");
pub(crate) const SECP521R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.35");

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlgorithmError {
    #[error("unsupported signing key: {key_type}: key size {size} not supported")]
    UnsupportedKeySize { key_type: KeyType, size: usize },
    #[error("unsupported signing key: {0}")]
    UnsupportedPublicKey(String),
    #[error("malformed public key: {0}")]
    MalformedPublicKey(String),
    #[error("invalid wire token {0:?}")]
    InvalidToken(String),
}

/// Asymmetric key family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    Rsa,
    Ec,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Rsa => "RSA",
            KeyType::Ec => "EC",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key type and bit length of a signing key, as derived from its certificate.
///
/// On the wire a key spec is the token `<TYPE>-<SIZE>`, e.g. `RSA-2048` or
/// `EC-256`. Only specs that map to a [`SigningAlgorithm`] have a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub key_type: KeyType,
    pub size: usize,
}

impl KeySpec {
    pub const fn new(key_type: KeyType, size: usize) -> Self {
        Self { key_type, size }
    }

    /// Reads the key spec of the certificate's subject public key.
    ///
    /// RSA sizes are the modulus length in whole bytes times eight; EC sizes
    /// are the bit size of the named curve. The size is not checked against
    /// the algorithm table here.
    pub fn from_certificate(certificate: &Certificate) -> Result<Self, AlgorithmError> {
        let spki = &certificate.tbs_certificate.subject_public_key_info;
        let oid = spki.algorithm.oid;

        if oid == RSA_ENCRYPTION {
            let key = RsaPublicKey::from_pkcs1_der(spki.subject_public_key.raw_bytes())
                .map_err(|e| AlgorithmError::MalformedPublicKey(e.to_string()))?;
            return Ok(KeySpec::new(KeyType::Rsa, key.size() * 8));
        }

        if oid == EC_PUBLIC_KEY {
            let curve = spki
                .algorithm
                .parameters
                .as_ref()
                .ok_or_else(|| {
                    AlgorithmError::MalformedPublicKey("missing named curve parameter".into())
                })?
                .decode_as::<ObjectIdentifier>()
                .map_err(|e| AlgorithmError::MalformedPublicKey(e.to_string()))?;
            return curve_size(&curve)
                .map(|size| KeySpec::new(KeyType::Ec, size))
                .ok_or_else(|| {
                    AlgorithmError::UnsupportedPublicKey(format!("curve {curve} not supported"))
                });
        }

        Err(AlgorithmError::UnsupportedPublicKey(format!(
            "public key algorithm {oid} not supported"
        )))
    }

    /// Wire token for a supported key spec.
    pub fn token(&self) -> Result<String, AlgorithmError> {
        SigningAlgorithm::from_key_spec(*self)?;
        Ok(self.to_string())
    }
}

impl fmt::Display for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.key_type, self.size)
    }
}

impl FromStr for KeySpec {
    type Err = AlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AlgorithmError::InvalidToken(s.to_string());
        let (key_type, size) = s.split_once('-').ok_or_else(invalid)?;
        let key_type = match key_type {
            "RSA" => KeyType::Rsa,
            "EC" => KeyType::Ec,
            _ => return Err(invalid()),
        };
        let size = size.parse::<usize>().map_err(|_| invalid())?;
        let spec = KeySpec::new(key_type, size);
        SigningAlgorithm::from_key_spec(spec).map_err(|_| invalid())?;
        Ok(spec)
    }
}

impl Serialize for KeySpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let token = self.token().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&token)
    }
}

impl<'de> Deserialize<'de> for KeySpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(serde::de::Error::custom)
    }
}

fn curve_size(curve: &ObjectIdentifier) -> Option<usize> {
    if *curve == SECP256R1 {
        Some(256)
    } else if *curve == SECP384R1 {
        Some(384)
    } else if *curve == SECP521R1 {
        Some(521)
    } else {
        None
    }
}

/// Digest algorithm paired with a signing algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[serde(rename = "SHA-256")]
    Sha256,
    #[serde(rename = "SHA-384")]
    Sha384,
    #[serde(rename = "SHA-512")]
    Sha512,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha384 => "SHA-384",
            HashAlgorithm::Sha512 => "SHA-512",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signature algorithms a certificate's key spec can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    #[serde(rename = "RSASSA-PSS-SHA-256")]
    RsassaPssSha256,
    #[serde(rename = "RSASSA-PSS-SHA-384")]
    RsassaPssSha384,
    #[serde(rename = "RSASSA-PSS-SHA-512")]
    RsassaPssSha512,
    #[serde(rename = "ECDSA-SHA-256")]
    EcdsaSha256,
    #[serde(rename = "ECDSA-SHA-384")]
    EcdsaSha384,
    #[serde(rename = "ECDSA-SHA-512")]
    EcdsaSha512,
}

impl SigningAlgorithm {
    pub const ALL: [SigningAlgorithm; 6] = [
        SigningAlgorithm::RsassaPssSha256,
        SigningAlgorithm::RsassaPssSha384,
        SigningAlgorithm::RsassaPssSha512,
        SigningAlgorithm::EcdsaSha256,
        SigningAlgorithm::EcdsaSha384,
        SigningAlgorithm::EcdsaSha512,
    ];

    /// The only mapping from key spec to algorithm. There is no fallback.
    pub fn from_key_spec(spec: KeySpec) -> Result<Self, AlgorithmError> {
        match (spec.key_type, spec.size) {
            (KeyType::Rsa, 2048) => Ok(SigningAlgorithm::RsassaPssSha256),
            (KeyType::Rsa, 3072) => Ok(SigningAlgorithm::RsassaPssSha384),
            (KeyType::Rsa, 4096) => Ok(SigningAlgorithm::RsassaPssSha512),
            (KeyType::Ec, 256) => Ok(SigningAlgorithm::EcdsaSha256),
            (KeyType::Ec, 384) => Ok(SigningAlgorithm::EcdsaSha384),
            (KeyType::Ec, 521) => Ok(SigningAlgorithm::EcdsaSha512),
            (key_type, size) => Err(AlgorithmError::UnsupportedKeySize { key_type, size }),
        }
    }

    pub fn key_spec(&self) -> KeySpec {
        match self {
            SigningAlgorithm::RsassaPssSha256 => KeySpec::new(KeyType::Rsa, 2048),
            SigningAlgorithm::RsassaPssSha384 => KeySpec::new(KeyType::Rsa, 3072),
            SigningAlgorithm::RsassaPssSha512 => KeySpec::new(KeyType::Rsa, 4096),
            SigningAlgorithm::EcdsaSha256 => KeySpec::new(KeyType::Ec, 256),
            SigningAlgorithm::EcdsaSha384 => KeySpec::new(KeyType::Ec, 384),
            SigningAlgorithm::EcdsaSha512 => KeySpec::new(KeyType::Ec, 521),
        }
    }

    pub fn hash(&self) -> HashAlgorithm {
        match self {
            SigningAlgorithm::RsassaPssSha256 | SigningAlgorithm::EcdsaSha256 => {
                HashAlgorithm::Sha256
            }
            SigningAlgorithm::RsassaPssSha384 | SigningAlgorithm::EcdsaSha384 => {
                HashAlgorithm::Sha384
            }
            SigningAlgorithm::RsassaPssSha512 | SigningAlgorithm::EcdsaSha512 => {
                HashAlgorithm::Sha512
            }
        }
    }

    /// Wire token, e.g. `ECDSA-SHA-256`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SigningAlgorithm::RsassaPssSha256 => "RSASSA-PSS-SHA-256",
            SigningAlgorithm::RsassaPssSha384 => "RSASSA-PSS-SHA-384",
            SigningAlgorithm::RsassaPssSha512 => "RSASSA-PSS-SHA-512",
            SigningAlgorithm::EcdsaSha256 => "ECDSA-SHA-256",
            SigningAlgorithm::EcdsaSha384 => "ECDSA-SHA-384",
            SigningAlgorithm::EcdsaSha512 => "ECDSA-SHA-512",
        }
    }

    /// JOSE/COSE short name, used in logs.
    pub fn short_name(&self) -> &'static str {
        match self {
            SigningAlgorithm::RsassaPssSha256 => "PS256",
            SigningAlgorithm::RsassaPssSha384 => "PS384",
            SigningAlgorithm::RsassaPssSha512 => "PS512",
            SigningAlgorithm::EcdsaSha256 => "ES256",
            SigningAlgorithm::EcdsaSha384 => "ES384",
            SigningAlgorithm::EcdsaSha512 => "ES512",
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_key_specs_map_exactly() {
        let table = [
            (KeyType::Rsa, 2048, SigningAlgorithm::RsassaPssSha256),
            (KeyType::Rsa, 3072, SigningAlgorithm::RsassaPssSha384),
            (KeyType::Rsa, 4096, SigningAlgorithm::RsassaPssSha512),
            (KeyType::Ec, 256, SigningAlgorithm::EcdsaSha256),
            (KeyType::Ec, 384, SigningAlgorithm::EcdsaSha384),
            (KeyType::Ec, 521, SigningAlgorithm::EcdsaSha512),
        ];
        for (key_type, size, expected) in table {
            let spec = KeySpec::new(key_type, size);
            assert_eq!(SigningAlgorithm::from_key_spec(spec).unwrap(), expected);
            assert_eq!(expected.key_spec(), spec);
        }
    }

    #[test]
    fn unsupported_key_specs_are_rejected() {
        for spec in [
            KeySpec::new(KeyType::Rsa, 1024),
            KeySpec::new(KeyType::Rsa, 2047),
            KeySpec::new(KeyType::Ec, 192),
            KeySpec::new(KeyType::Ec, 512),
        ] {
            let err = SigningAlgorithm::from_key_spec(spec).unwrap_err();
            assert!(err.to_string().starts_with("unsupported signing key"), "{err}");
        }
    }

    #[test]
    fn unsupported_size_message_names_type_and_size() {
        let err = SigningAlgorithm::from_key_spec(KeySpec::new(KeyType::Rsa, 1024)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported signing key: RSA: key size 1024 not supported"
        );
    }

    #[test]
    fn wire_tokens() {
        assert_eq!(SigningAlgorithm::EcdsaSha256.as_str(), "ECDSA-SHA-256");
        assert_eq!(SigningAlgorithm::RsassaPssSha512.as_str(), "RSASSA-PSS-SHA-512");
        assert_eq!(
            serde_json::to_string(&SigningAlgorithm::RsassaPssSha384).unwrap(),
            r#""RSASSA-PSS-SHA-384""#
        );
        assert_eq!(KeySpec::new(KeyType::Ec, 521).token().unwrap(), "EC-521");
        assert_eq!(KeySpec::new(KeyType::Rsa, 2048).token().unwrap(), "RSA-2048");
    }

    #[test]
    fn serde_tokens_agree_with_as_str() {
        for algorithm in SigningAlgorithm::ALL {
            let json = serde_json::to_string(&algorithm).unwrap();
            assert_eq!(json, format!("\"{}\"", algorithm.as_str()));
            let hash = serde_json::to_string(&algorithm.hash()).unwrap();
            assert_eq!(hash, format!("\"{}\"", algorithm.hash().as_str()));
        }
    }

    #[test]
    fn unsupported_key_spec_has_no_token() {
        assert!(KeySpec::new(KeyType::Rsa, 1024).token().is_err());
        assert!(serde_json::to_string(&KeySpec::new(KeyType::Ec, 192)).is_err());
    }

    #[test]
    fn parses_key_spec_tokens() {
        assert_eq!(
            "RSA-3072".parse::<KeySpec>().unwrap(),
            KeySpec::new(KeyType::Rsa, 3072)
        );
        assert_eq!("EC-384".parse::<KeySpec>().unwrap(), KeySpec::new(KeyType::Ec, 384));
        for token in ["DSA-2048", "RSA-1024", "EC-", "EC256", "rsa-2048", ""] {
            assert!(token.parse::<KeySpec>().is_err(), "{token} should not parse");
        }
    }

    #[test]
    fn hash_follows_algorithm() {
        assert_eq!(SigningAlgorithm::EcdsaSha512.hash(), HashAlgorithm::Sha512);
        assert_eq!(SigningAlgorithm::RsassaPssSha256.hash(), HashAlgorithm::Sha256);
        assert_eq!(SigningAlgorithm::EcdsaSha384.short_name(), "ES384");
    }
}
