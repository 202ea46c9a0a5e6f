//! Document → sharded source tree (§4.5). Writers treat `Document` as
//! read-only (§3 Lifecycles).

use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use pasrc_model::{ControlState, Document};

use crate::error::Error;
use crate::fs_util::{write_bytes, write_json, write_text};
use crate::json::{canonicalize, control_state_to_json, template_to_json};
use crate::manifest;
use crate::paths;

pub fn write_source_tree(doc: &Document, root: &Path) -> Result<(), Error> {
    write_json(&root.join(paths::CANVAS_MANIFEST), &manifest::to_json(doc))?;
    write_json(&root.join(paths::CONTROL_TEMPLATES), &templates_to_json(doc))?;
    write_json(&root.join(paths::THEMES), &doc.themes)?;

    for name in &doc.screen_order {
        if let Some(block) = doc.screens.get(name) {
            let text = pasrc_dsl::print_block(block);
            write_text(&root.join(paths::screen(name)), &text)?;
        }
    }

    for (name, block) in &doc.components {
        let text = pasrc_dsl::print_block(block);
        write_text(&root.join(paths::component_source(name)), &text)?;

        if let Some(template) = doc.templates.get(name) {
            write_json(&root.join(paths::component_template(name)), &template_to_json(template))?;
        }
    }

    write_editor_states(doc, root)?;

    write_json(&root.join(paths::RESOURCES_MANIFEST), &doc.resources_manifest)?;
    for (key, blob) in &doc.assets {
        let rel = asset_relative_path(key.as_str(), &blob.display_name);
        write_bytes(&root.join(paths::ASSETS_DIR).join(rel), &blob.bytes)?;
    }

    write_json(&root.join(paths::ENTROPY), &serde_json::to_value(&doc.entropy).unwrap_or(JsonValue::Null))?;
    if let Some(checksum) = &doc.checksum {
        write_json(&root.join(paths::CHECKSUM), &serde_json::json!({ "checksum": checksum }))?;
    }

    write_unknown_files(doc, root)?;

    Ok(())
}

fn templates_to_json(doc: &Document) -> JsonValue {
    JsonValue::Array(doc.templates.iter().map(|(_, t)| template_to_json(t)).collect())
}

fn write_editor_states(doc: &Document, root: &Path) -> Result<(), Error> {
    let mut grouped: IndexMap<String, Vec<&ControlState>> = IndexMap::new();
    for state in doc.editor_states.values() {
        grouped.entry(state.top_parent_name.clone()).or_default().push(state);
    }

    for (top_parent, states) in grouped {
        let array = JsonValue::Array(states.iter().map(|s| control_state_to_json(s)).collect());
        write_json(&root.join(paths::editor_state(&top_parent)), &array)?;
    }

    Ok(())
}

/// Reassembles an asset's on-disk path: the stabilized directory recorded in
/// the archive-path key (with a leading `assets` segment dropped, since
/// that's this function's own `Assets/` root) joined with the blob's display
/// name, which [`pasrc_assets`] keeps in sync with the stabilized file name.
fn asset_relative_path(key: &str, display_name: &str) -> String {
    let mut segments: Vec<&str> = key.split('/').collect();
    segments.pop();
    if segments.first().map(|s| s.eq_ignore_ascii_case("assets")).unwrap_or(false) {
        segments.remove(0);
    }
    if segments.is_empty() {
        display_name.to_string()
    } else {
        format!("{}/{}", segments.join("/"), display_name)
    }
}

/// `Other/<unknown-files>`: JSON entries are canonicalized for stable diffs;
/// everything else is passed through verbatim (§4.5).
fn write_unknown_files(doc: &Document, root: &Path) -> Result<(), Error> {
    for blob in doc.unknown_files.values() {
        let dest = root.join(paths::OTHER_DIR).join(&blob.display_name);

        match serde_json::from_slice::<JsonValue>(&blob.bytes) {
            Ok(value) => write_json(&dest, &canonicalize(&value))?,
            Err(_) => write_bytes(&dest, &blob.bytes)?,
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn asset_relative_path_drops_assets_prefix() {
        assert_eq!(asset_relative_path("assets/photo.png", "Photo.png"), "Photo.png");
        assert_eq!(asset_relative_path("assets/icons/foo.png", "Foo.png"), "icons/Foo.png");
        assert_eq!(asset_relative_path("logo.png", "logo.png"), "logo.png");
    }
}
