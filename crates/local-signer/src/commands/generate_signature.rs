use rand_core::CryptoRngCore;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::{check_contract_version, check_key_id};
use crate::error::PluginError;
use crate::keys::{ENV_CONFIG_KEY, Environment, KeyError, load_certificate_chain, load_private_key};
use crate::protocol::{GenerateSignatureRequest, GenerateSignatureResponse};
use crate::signing::{KeySpec, SigningAlgorithm, signer_for};

/// Signs the request payload with the key named by `pluginConfig.env` and
/// returns the signature together with the certificate chain at `keyId`.
pub fn generate_signature(
    request: GenerateSignatureRequest,
    env: &dyn Environment,
    rng: &mut dyn CryptoRngCore,
) -> Result<GenerateSignatureResponse, PluginError> {
    validate(&request)?;

    let chain = load_certificate_chain(&request.key_id)?;
    let private_key = load_private_key(&request.plugin_config, env)?;

    let leaf = chain.first().ok_or(KeyError::NoCertificate)?;
    let key_spec = KeySpec::from_certificate(&leaf.certificate).map_err(PluginError::KeySpec)?;
    if let Some(requested) = request.key_spec {
        if requested != key_spec {
            return Err(PluginError::InvalidRequest(format!(
                "key spec mismatch: request has {requested}, certificate has {key_spec}"
            )));
        }
    }

    let algorithm = SigningAlgorithm::from_key_spec(key_spec).map_err(PluginError::Algorithm)?;
    if let Some(requested) = request.hash_algorithm {
        if requested != algorithm.hash() {
            return Err(PluginError::InvalidRequest(format!(
                "hash algorithm mismatch: request has {requested}, {algorithm} uses {}",
                algorithm.hash()
            )));
        }
    }

    debug!(
        key_id = %request.key_id,
        %key_spec,
        %algorithm,
        alg = algorithm.short_name(),
        chain_len = chain.len(),
        leaf_sha256 = %hex::encode(Sha256::digest(&leaf.der)),
        "resolved signing key"
    );

    let signer = signer_for(private_key, algorithm)?;
    let signature = signer.sign(&request.payload, rng)?;

    debug!(signature_len = signature.len(), "signed payload");

    Ok(GenerateSignatureResponse {
        key_id: request.key_id,
        signature,
        signing_algorithm: signer.algorithm(),
        certificate_chain: chain.into_iter().map(|cert| cert.der).collect(),
    })
}

// Everything that can be checked without touching the filesystem or the
// environment.
fn validate(request: &GenerateSignatureRequest) -> Result<(), PluginError> {
    check_contract_version(request.contract_version.as_deref())?;
    check_key_id(&request.key_id)?;
    if request.payload.is_empty() {
        return Err(PluginError::InvalidRequest("payload is required".into()));
    }
    let has_key_config = request
        .plugin_config
        .get(ENV_CONFIG_KEY)
        .is_some_and(|name| !name.is_empty());
    if !has_key_config {
        return Err(KeyError::MissingKeyConfig.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn request() -> GenerateSignatureRequest {
        GenerateSignatureRequest {
            contract_version: Some("1.0".into()),
            key_id: "/does/not/exist.crt".into(),
            key_spec: None,
            hash_algorithm: None,
            payload: b"payload".to_vec(),
            plugin_config: BTreeMap::from([(ENV_CONFIG_KEY.to_string(), "KEY".to_string())]),
        }
    }

    #[test]
    fn validates_complete_request() {
        assert!(validate(&request()).is_ok());
    }

    #[test]
    fn empty_payload_is_rejected() {
        let mut request = request();
        request.payload.clear();
        let err = validate(&request).unwrap_err();
        assert_eq!(err.to_string(), "payload is required");
    }

    #[test]
    fn missing_key_config_is_rejected_before_io() {
        let mut request = request();
        request.plugin_config.clear();
        let err = validate(&request).unwrap_err();
        assert!(matches!(err, PluginError::Key(KeyError::MissingKeyConfig)));

        request
            .plugin_config
            .insert(ENV_CONFIG_KEY.to_string(), String::new());
        assert!(validate(&request).is_err());
    }

    #[test]
    fn unsupported_contract_version_is_rejected() {
        let mut request = request();
        request.contract_version = Some("0.9".into());
        assert!(matches!(
            validate(&request),
            Err(PluginError::InvalidRequest(_))
        ));
    }
}
