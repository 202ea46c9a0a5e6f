//! `CanvasManifest.json`: the document's scalar headers, assembled into one
//! file and torn back apart on read (§3, "scalar headers").

use serde_json::{Map as JsonMap, Value as JsonValue};

use pasrc_model::{Document, FormatVersion};

use crate::error::Error;

pub fn to_json(doc: &Document) -> JsonValue {
    let mut map = JsonMap::new();
    map.insert(
        "formatVersion".into(),
        JsonValue::String(doc.format_version.unwrap_or(FormatVersion::CURRENT).to_string()),
    );
    map.insert("properties".into(), doc.properties.clone());
    map.insert("header".into(), doc.header.clone());
    map.insert("publishInfo".into(), doc.publish_info.clone());
    map.insert(
        "screenOrder".into(),
        JsonValue::Array(doc.screen_order.iter().cloned().map(JsonValue::String).collect()),
    );
    JsonValue::Object(map)
}

/// Populates `doc`'s scalar headers from a parsed `CanvasManifest.json`.
/// Enforces I7: a `formatVersion` that doesn't match [`FormatVersion::CURRENT`]
/// is fatal.
pub fn apply(doc: &mut Document, value: &JsonValue) -> Result<(), Error> {
    let version_str = value
        .get("formatVersion")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| Error::MissingManifestField("formatVersion".into()))?;

    let version = parse_version(version_str)
        .ok_or_else(|| Error::MissingManifestField("formatVersion".into()))?;

    if version != FormatVersion::CURRENT {
        return Err(Error::FormatNotSupported {
            found: version.to_string(),
            expected: FormatVersion::CURRENT.to_string(),
        });
    }

    doc.format_version = Some(version);
    doc.properties = value.get("properties").cloned().unwrap_or(JsonValue::Null);
    doc.header = value.get("header").cloned().unwrap_or(JsonValue::Null);
    doc.publish_info = value.get("publishInfo").cloned().unwrap_or(JsonValue::Null);
    doc.screen_order = value
        .get("screenOrder")
        .and_then(JsonValue::as_array)
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default();

    Ok(())
}

fn parse_version(s: &str) -> Option<FormatVersion> {
    let (major, minor) = s.split_once('.')?;
    Some(FormatVersion { major: major.parse().ok()?, minor: minor.parse().ok()? })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_scalar_headers() {
        let mut doc = Document::empty();
        doc.properties = serde_json::json!({ "a": 1 });
        doc.screen_order = vec!["Screen1".into(), "Screen2".into()];

        let json = to_json(&doc);
        let mut back = Document::empty();
        apply(&mut back, &json).unwrap();

        assert_eq!(back.properties, doc.properties);
        assert_eq!(back.screen_order, doc.screen_order);
        assert_eq!(back.format_version, Some(FormatVersion::CURRENT));
    }

    #[test]
    fn mismatched_format_version_is_fatal() {
        let json = serde_json::json!({ "formatVersion": "0.1" });
        let mut doc = Document::empty();
        let err = apply(&mut doc, &json).unwrap_err();
        assert!(matches!(err, Error::FormatNotSupported { .. }));
    }
}
