use crate::protocol::{Capability, GetMetadataResponse};

/// The only plugin contract version spoken by this crate.
pub const CONTRACT_VERSION: &str = "1.0";

/// Static identity of a plugin binary.
///
/// Each binary owns one of these and passes it to the dispatcher, so the
/// same core can ship under different names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginMetadata {
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub url: &'static str,
}

impl PluginMetadata {
    pub fn describe(&self) -> GetMetadataResponse {
        GetMetadataResponse {
            name: self.name.to_string(),
            description: self.description.to_string(),
            version: self.version.to_string(),
            url: self.url.to_string(),
            supported_contract_versions: vec![CONTRACT_VERSION.to_string()],
            capabilities: vec![Capability::SignatureGenerator],
        }
    }
}
