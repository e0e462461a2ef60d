//! Transaction bundle model
//!
//! The submission payload is a single `Bundle` of type `transaction`.
//! Entries carry a `urn:uuid:` full URL so the registry can assign
//! permanent resource ids atomically while same-bundle references keep
//! resolving.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    #[serde(rename = "resourceType")]
    pub resource_type: &'static str,
    #[serde(rename = "type")]
    pub type_: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<BundleEntry>,
}

impl Bundle {
    /// New transaction bundle over the given entries.
    pub fn transaction(entry: Vec<BundleEntry>) -> Self {
        Self {
            resource_type: "Bundle",
            type_: "transaction",
            entry,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    pub full_url: String,
    pub resource: Value,
    pub request: BundleRequest,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleRequest {
    pub method: &'static str,
    pub url: String,
}
