//! Command handlers. Each takes a decoded request and returns the response
//! document or the error to report.

mod describe_key;
mod generate_signature;

pub use describe_key::describe_key;
pub use generate_signature::generate_signature;

use crate::error::PluginError;
use crate::metadata::{CONTRACT_VERSION, PluginMetadata};
use crate::protocol::GetMetadataResponse;

pub fn get_metadata(metadata: &PluginMetadata) -> GetMetadataResponse {
    metadata.describe()
}

fn check_contract_version(version: Option<&str>) -> Result<(), PluginError> {
    match version {
        None | Some(CONTRACT_VERSION) => Ok(()),
        Some(other) => Err(PluginError::InvalidRequest(format!(
            "unsupported contract version {other:?}, expected {CONTRACT_VERSION:?}"
        ))),
    }
}

fn check_key_id(key_id: &str) -> Result<(), PluginError> {
    if key_id.is_empty() {
        return Err(PluginError::InvalidRequest("keyId is required".into()));
    }
    Ok(())
}
