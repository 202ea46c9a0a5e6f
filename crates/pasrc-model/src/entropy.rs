//! `Entropy` (§3, §4.4): the durable side-channel of volatile,
//! non-semantic data. Written last, read first. Missing entropy is never
//! fatal on pack — every field here documents its own deterministic
//! fallback, applied by the consumer that owns it (`pasrc-ir` for unique
//! IDs, `pasrc-assets` for resource/logo names).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entropy {
    #[serde(default)]
    pub control_unique_ids: IndexMap<String, i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_logo_file_name: Option<String>,
    #[serde(default)]
    pub local_resource_file_names: IndexMap<String, String>,
    #[serde(default)]
    pub resource_order: IndexMap<String, i64>,
    /// Sparse map of volatile header fields (timestamps, auto-generated
    /// ids outside the control tree) keyed by their header field name.
    #[serde(default)]
    pub volatile_properties: IndexMap<String, JsonValue>,
    #[serde(default)]
    pub data_source_order: IndexMap<String, i64>,
    /// Fields written by a newer tool version than this one, preserved
    /// byte-for-byte (§4.4, "Extra entropy fields unrecognized by the
    /// current version are preserved byte-for-byte").
    #[serde(flatten)]
    pub unrecognized: IndexMap<String, JsonValue>,
}

impl Entropy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deterministic fallback for §8 P8/scenario 6: one greater than the
    /// largest id already recorded, or `1` if entropy is empty.
    #[must_use]
    pub fn next_unique_id(&self) -> i64 {
        self.control_unique_ids.values().copied().max().unwrap_or(0) + 1
    }

    /// Deterministic fallback asset name: a fresh 4-digit zero-padded
    /// numeric name greater than any number already present among the
    /// renamed resources (§4.2, "Inverse on pack").
    #[must_use]
    pub fn next_numeric_asset_name(&self) -> String {
        let max = self
            .local_resource_file_names
            .values()
            .filter_map(|original| {
                let stem = original.rsplit_once('.').map_or(original.as_str(), |(s, _)| s);
                stem.parse::<u32>().ok()
            })
            .max()
            .unwrap_or(0);

        format!("{:04}", max + 1)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn next_unique_id_scenario_6() {
        let mut entropy = Entropy::new();
        entropy.control_unique_ids.insert("ctrlName".into(), 42);
        assert_eq!(entropy.next_unique_id(), 43);

        entropy.control_unique_ids.remove("ctrlName");
        assert_eq!(entropy.next_unique_id(), 1);
    }

    #[test]
    fn unrecognized_fields_round_trip() {
        let json = r#"{"controlUniqueIds":{},"futureField":"keep-me"}"#;
        let entropy: Entropy = serde_json::from_str(json).unwrap();
        assert_eq!(
            entropy.unrecognized.get("futureField").unwrap(),
            &JsonValue::String("keep-me".into())
        );

        let back = serde_json::to_string(&entropy).unwrap();
        let reparsed: Entropy = serde_json::from_str(&back).unwrap();
        assert_eq!(reparsed.unrecognized.get("futureField").unwrap(), &JsonValue::String("keep-me".into()));
    }

    #[test]
    fn next_numeric_asset_name_pads_to_four_digits() {
        let mut entropy = Entropy::new();
        entropy
            .local_resource_file_names
            .insert("Photo".into(), "0007.png".into());
        assert_eq!(entropy.next_numeric_asset_name(), "0008");
    }
}
