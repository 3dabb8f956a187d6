use tracing::debug;

use super::{check_contract_version, check_key_id};
use crate::error::PluginError;
use crate::keys::{KeyError, load_certificate_chain};
use crate::protocol::{DescribeKeyRequest, DescribeKeyResponse};
use crate::signing::KeySpec;

/// Reports the key spec of the leaf certificate stored at `keyId`.
pub fn describe_key(request: DescribeKeyRequest) -> Result<DescribeKeyResponse, PluginError> {
    check_contract_version(request.contract_version.as_deref())?;
    check_key_id(&request.key_id)?;

    let chain = load_certificate_chain(&request.key_id)?;
    let leaf = chain.first().ok_or(KeyError::NoCertificate)?;
    let key_spec = KeySpec::from_certificate(&leaf.certificate).map_err(PluginError::KeySpec)?;
    // Only specs with a signing algorithm have a wire token.
    key_spec.token().map_err(PluginError::KeySpec)?;

    debug!(key_id = %request.key_id, %key_spec, "described key");

    Ok(DescribeKeyResponse {
        key_id: request.key_id,
        key_spec,
    })
}
