//! Transaction-entry construction
//!
//! Wraps a mapped resource into a bundle entry with a `urn:uuid:` full
//! URL and a `POST` request line. Transforms run against the serialized
//! bytes of the individual entry, not the structured resource, so
//! serialization quirks can be patched without touching the data model.

use crate::domain::Result;
use crate::fhir::{BundleEntry, BundleRequest};
use serde::Serialize;
use serde_json::{Map, Value};

/// Post-processing applied to a serialized entry resource.
#[derive(Debug, Clone, Copy)]
pub enum EntryTransform {
    /// Drop a top-level key from the serialized resource.
    RemoveKey(&'static str),
}

impl EntryTransform {
    fn apply(&self, bytes: Vec<u8>) -> Result<Vec<u8>> {
        match self {
            EntryTransform::RemoveKey(key) => {
                let mut object: Map<String, Value> = serde_json::from_slice(&bytes)?;
                object.remove(*key);
                Ok(serde_json::to_vec(&object)?)
            }
        }
    }
}

/// Build a transaction entry for a mapped resource.
///
/// `resource_type` is both the transaction URL and the type the registry
/// creates; `id` is the entry's temporary in-bundle identity.
pub fn transaction_entry(
    resource: &impl Serialize,
    id: &str,
    resource_type: &str,
    transforms: &[EntryTransform],
) -> Result<BundleEntry> {
    let mut bytes = serde_json::to_vec(resource)?;
    for transform in transforms {
        bytes = transform.apply(bytes)?;
    }
    let resource: Value = serde_json::from_slice(&bytes)?;

    Ok(BundleEntry {
        full_url: format!("urn:uuid:{id}"),
        resource,
        request: BundleRequest {
            method: "POST",
            url: resource_type.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_shape() {
        let resource = json!({"resourceType": "Condition", "code": {}});
        let entry =
            transaction_entry(&resource, "11111111-2222-3333-4444-555555555555", "Condition", &[])
                .unwrap();
        assert_eq!(
            entry.full_url,
            "urn:uuid:11111111-2222-3333-4444-555555555555"
        );
        assert_eq!(entry.request.method, "POST");
        assert_eq!(entry.request.url, "Condition");
        assert_eq!(entry.resource["resourceType"], "Condition");
    }

    #[test]
    fn test_remove_key_transform() {
        let resource = json!({
            "resourceType": "MedicationRequest",
            "medicationCodeableConcept": {"coding": []},
            "medicationReference": {"reference": "urn:uuid:x"}
        });
        let entry = transaction_entry(
            &resource,
            "id",
            "MedicationRequest",
            &[EntryTransform::RemoveKey("medicationCodeableConcept")],
        )
        .unwrap();
        assert!(entry.resource.get("medicationCodeableConcept").is_none());
        assert!(entry.resource.get("medicationReference").is_some());
    }

    #[test]
    fn test_remove_key_missing_is_noop() {
        let resource = json!({"resourceType": "Medication"});
        let entry = transaction_entry(
            &resource,
            "id",
            "Medication",
            &[EntryTransform::RemoveKey("medicationCodeableConcept")],
        )
        .unwrap();
        assert_eq!(entry.resource, json!({"resourceType": "Medication"}));
    }
}
