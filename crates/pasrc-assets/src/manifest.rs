//! The resource manifest (§4.2): the JSON describing all local-file
//! resources, read out of `Document::resources_manifest`.

use serde::{Deserialize, Serialize};
use serde_json::Map as JsonMap;
use serde_json::Value as JsonValue;

pub const KIND_LOCAL_FILE: &str = "LocalFile";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub path: String,
    #[serde(flatten)]
    pub extra: JsonMap<String, JsonValue>,
}

/// Parses `Document::resources_manifest` into the resource list,
/// tolerating `Null` (no manifest yet) as an empty list.
#[must_use]
pub fn parse(manifest: &JsonValue) -> Vec<ResourceEntry> {
    match manifest {
        JsonValue::Null => Vec::new(),
        JsonValue::Array(_) => {
            serde_json::from_value(manifest.clone()).unwrap_or_default()
        }
        JsonValue::Object(obj) => obj
            .get("resources")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Serializes the resource list back into the same shape it was read from
/// (array-rooted, since that's what `parse` produces when given `Null`).
#[must_use]
pub fn serialize(entries: &[ResourceEntry]) -> JsonValue {
    serde_json::to_value(entries).unwrap_or(JsonValue::Array(Vec::new()))
}
