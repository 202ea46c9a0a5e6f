//! `Document` → archive (§4.6): `applyTransformsBeforeWrite` (AssetStabilizer
//! inverse, then IRSplitCombine's combine), assemble every recognized entry
//! plus `unknownFiles` passthrough, then compute and store the deterministic
//! checksum (§4.6, excluding the checksum entry itself).

use std::io::{Seek, Write};

use serde_json::Value as JsonValue;

use pasrc_ir::CombineContext;
use pasrc_model::Document;

use crate::checksum;
use crate::error::Error;
use crate::kind;

/// Packs a (mutated-in-place, per §4.6's state machine) `Document` into a
/// fresh PKG archive written to `writer`. Returns the checksum stored in
/// the archive's `Checksum.json` entry.
pub fn write_pkg<W: Write + Seek>(doc: &mut Document, writer: W) -> Result<String, Error> {
    pasrc_assets::stabilize_on_pack(doc).map_err(Error::Assets)?;

    let mut entries: Vec<(String, Vec<u8>)> = Vec::new();

    entries.push((kind::PROPERTIES.to_string(), canonical_json(&doc.properties)));
    entries.push((kind::PUBLISH_INFO.to_string(), canonical_json(&doc.publish_info)));
    entries.push((kind::THEMES.to_string(), canonical_json(&doc.themes)));
    entries.push((kind::RESOURCES.to_string(), canonical_json(&doc.resources_manifest)));

    let mut header = doc.header.as_object().cloned().unwrap_or_default();
    header.insert(
        "formatVersion".into(),
        JsonValue::String(doc.format_version.unwrap_or(pasrc_model::FormatVersion::CURRENT).to_string()),
    );
    entries.push((kind::HEADER.to_string(), canonical_json(&JsonValue::Object(header))));

    // Combine mutates `doc.templates`/`doc.entropy` as it goes (§4.3 combine
    // steps 2, 3, 6), so the blocks it walks are snapshotted first to avoid
    // holding an immutable borrow of `doc` across the loop.
    let screens: Vec<(String, pasrc_model::IrBlock)> = doc
        .screen_order
        .iter()
        .filter_map(|name| doc.screens.get(name).map(|b| (name.clone(), b.clone())))
        .collect();
    let components: Vec<(String, pasrc_model::IrBlock)> =
        doc.components.iter().map(|(name, b)| (name.clone(), b.clone())).collect();

    for (name, block) in &screens {
        let mut ctx = CombineContext {
            templates: &mut doc.templates,
            editor_states: &doc.editor_states,
            entropy: &mut doc.entropy,
        };
        let control = pasrc_ir::combine(block, &mut ctx).map_err(Error::Ir)?;
        let json = pasrc_ir::control_to_json(&control);
        entries.push((format!("{}/{name}.json", kind::CONTROLS_DIR), canonical_json(&json)));
    }

    for (name, block) in &components {
        let mut ctx = CombineContext {
            templates: &mut doc.templates,
            editor_states: &doc.editor_states,
            entropy: &mut doc.entropy,
        };
        let control = pasrc_ir::combine(block, &mut ctx).map_err(Error::Ir)?;
        let json = pasrc_ir::control_to_json(&control);
        entries.push((format!("{}/{name}.json", kind::COMPONENTS_DIR), canonical_json(&json)));
    }

    let templates_json: Vec<JsonValue> =
        doc.templates.iter().map(|(_, t)| pasrc_model::json::template_to_json(t)).collect();
    entries.push((kind::TEMPLATES.to_string(), canonical_json(&JsonValue::Array(templates_json))));

    entries.push((
        kind::ENTROPY.to_string(),
        canonical_json(&serde_json::to_value(&doc.entropy).unwrap_or(JsonValue::Null)),
    ));

    for blob in doc.unknown_files.values() {
        entries.push((blob.display_name.clone(), blob.bytes.clone()));
    }

    for blob in doc.assets.values() {
        let path = format!("{}/{}", kind::ASSETS_DIR, blob.display_name);
        entries.push((path, blob.bytes.clone()));
    }

    let sum = checksum::compute(&entries);
    entries.push((
        kind::CHECKSUM.to_string(),
        canonical_json(&serde_json::json!({ "checksum": sum })),
    ));

    let mut zip = zip::ZipWriter::new(writer);
    let options = zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (path, bytes) in &entries {
        zip.start_file(path, options).map_err(Error::Zip)?;
        zip.write_all(bytes).map_err(|e| Error::Io { path: path.clone(), source: e })?;
    }
    zip.finish().map_err(Error::Zip)?;

    doc.checksum = Some(sum.clone());
    Ok(sum)
}

fn canonical_json(value: &JsonValue) -> Vec<u8> {
    pasrc_model::json::canonical_bytes(value)
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use pasrc_diag::ErrorContainer;
    use pasrc_model::{IrBlock, PropNode, TypeRef, TypedName};

    use super::*;
    use crate::config::Config;
    use crate::loader::load_pkg;

    #[test]
    fn canonical_json_is_stable() {
        let a = canonical_json(&serde_json::json!({ "b": 1, "a": 2 }));
        let b = canonical_json(&serde_json::json!({ "a": 2, "b": 1 }));
        assert_eq!(a, b);
    }

    #[test]
    fn write_then_load_round_trips_a_screen() {
        let mut doc = Document::empty();
        doc.format_version = Some(pasrc_model::FormatVersion::CURRENT);
        doc.screen_order = vec!["Screen1".into()];

        let mut screen = IrBlock::new(TypedName {
            identifier: "Screen1".into(),
            kind: TypeRef { type_name: "Screen".into(), optional_variant: None },
        });
        screen.properties.push(PropNode { identifier: "Fill".into(), expression: "RGBA(0,0,0,1)".into() });
        doc.screens.insert("Screen1".into(), screen);

        let mut buf = Cursor::new(Vec::new());
        let sum = write_pkg(&mut doc, &mut buf).unwrap();
        assert!(!sum.is_empty());

        buf.set_position(0);
        let config = Config::new();
        let mut errors = ErrorContainer::new();
        let reloaded = load_pkg(buf, &config, &mut errors).unwrap();

        assert!(errors.is_empty());
        assert_eq!(reloaded.screen_order, doc.screen_order);
        assert!(reloaded.screens.contains_key("Screen1"));
    }
}
