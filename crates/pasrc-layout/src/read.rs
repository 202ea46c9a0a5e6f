//! Sharded source tree → `Document` (§4.5), the inverse of [`crate::write`].
//! A malformed `.pa.yaml` file is fatal only for the control tree it names
//! (§7): it is recorded in `errors` with its file and span, and reading
//! continues with the remaining files.

use std::path::Path;

use pasrc_diag::{Code, Diagnostic, ErrorContainer, SourceSpan};
use pasrc_model::{AssetBlob, Document};
use serde_json::Value as JsonValue;

use crate::error::Error;
use crate::fs_util::{read_text, try_read_json, walk_files};
use crate::json::{control_state_from_json, template_from_json};
use crate::paths;

pub fn read_source_tree(root: &Path, errors: &mut ErrorContainer) -> Result<Document, Error> {
    let mut doc = Document::empty();

    let manifest_value = crate::fs_util::read_json(&root.join(paths::CANVAS_MANIFEST))?;
    crate::manifest::apply(&mut doc, &manifest_value)?;

    if let Some(JsonValue::Array(templates)) = try_read_json(&root.join(paths::CONTROL_TEMPLATES))? {
        for entry in &templates {
            doc.templates.insert(template_from_json(entry));
        }
    }

    if let Some(themes) = try_read_json(&root.join(paths::THEMES))? {
        doc.themes = themes;
    }

    read_screens(&mut doc, root, errors)?;
    read_components(&mut doc, root, errors)?;
    read_editor_states(&mut doc, root, errors)?;
    read_assets(&mut doc, root)?;

    if let Some(resources) = try_read_json(&root.join(paths::RESOURCES_MANIFEST))? {
        doc.resources_manifest = resources;
    }

    if let Some(entropy_json) = try_read_json(&root.join(paths::ENTROPY))? {
        doc.entropy = serde_json::from_value(entropy_json).unwrap_or_default();
    }

    if let Some(checksum_json) = try_read_json(&root.join(paths::CHECKSUM))? {
        doc.checksum = checksum_json.get("checksum").and_then(JsonValue::as_str).map(str::to_string);
    }

    read_unknown_files(&mut doc, root)?;

    Ok(doc)
}

fn parse_pa_yaml(
    path: &Path,
    root: &Path,
    errors: &mut ErrorContainer,
) -> Result<Option<pasrc_model::IrBlock>, Error> {
    let text = read_text(path)?;
    match pasrc_dsl::parse_block(&text) {
        Ok(block) => Ok(Some(block)),
        Err(e) => {
            let file = crate::fs_util::relative_slashed(path, root);
            log::warn!("failed to parse `{file}`: {e}");
            errors.push(
                Diagnostic::fatal(Code::ParseError, e.to_string()).with_span(SourceSpan {
                    file,
                    start_line: 0,
                    start_col: 0,
                    end_line: 0,
                    end_col: 0,
                }),
            );
            Ok(None)
        }
    }
}

/// Screens live directly under `Src/` and under `Src/Tests/`; this tool
/// doesn't distinguish test roots from ordinary screens once loaded, so both
/// land in `doc.screens`/`doc.screen_order`, `Src/` files first.
fn read_screens(doc: &mut Document, root: &Path, errors: &mut ErrorContainer) -> Result<(), Error> {
    let src_dir = root.join(paths::SRC_DIR);
    let tests_dir = src_dir.join("Tests");

    let mut top_level: Vec<_> = walk_files(&src_dir)?
        .into_iter()
        .filter(|p| p.parent() == Some(src_dir.as_path()))
        .filter(|p| p.file_name().and_then(|n| n.to_str()).map(|n| n.ends_with(".pa.yaml")).unwrap_or(false))
        .collect();
    top_level.sort();

    let mut test_files = walk_files(&tests_dir)?;
    test_files.sort();

    for path in top_level.into_iter().chain(test_files) {
        let Some(name) = path.file_name().and_then(|n| n.to_str()).and_then(paths::strip_pa_yaml) else {
            continue;
        };
        if let Some(block) = parse_pa_yaml(&path, root, errors)? {
            doc.screen_order.push(name.to_string());
            doc.screens.insert(name.to_string(), block);
        }
    }

    Ok(())
}

fn read_components(doc: &mut Document, root: &Path, errors: &mut ErrorContainer) -> Result<(), Error> {
    let components_dir = root.join(paths::SRC_COMPONENTS_DIR);

    for path in walk_files(&components_dir)? {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else { continue };
        let Some(name) = paths::strip_pa_yaml(file_name) else { continue };

        if let Some(block) = parse_pa_yaml(&path, root, errors)? {
            doc.components.insert(name.to_string(), block);
        }

        if let Some(template_json) = try_read_json(&components_dir.join(format!("{name}.json")))? {
            doc.templates.insert(template_from_json(&template_json));
        }
    }

    Ok(())
}

/// A control name seen in more than one `*.editorstate.json` file is
/// `EditorStateError` (§7): fatal, but recorded per occurrence so the whole
/// tree still loads instead of aborting the walk.
fn read_editor_states(doc: &mut Document, root: &Path, errors: &mut ErrorContainer) -> Result<(), Error> {
    let dir = root.join(paths::SRC_EDITOR_STATE_DIR);

    for path in walk_files(&dir)? {
        let Some(array) = try_read_json(&path)? else { continue };
        let JsonValue::Array(items) = array else { continue };

        for item in &items {
            let state = control_state_from_json(item);
            if doc.editor_states.contains_key(&state.name) {
                let file = crate::fs_util::relative_slashed(&path, root);
                errors.push(Diagnostic::fatal(
                    Code::EditorStateError,
                    format!("duplicate editor-state entry `{}` in {file}", state.name),
                ));
                continue;
            }
            doc.editor_states.insert(state.name.clone(), state);
        }
    }

    Ok(())
}

fn read_assets(doc: &mut Document, root: &Path) -> Result<(), Error> {
    let assets_dir = root.join(paths::ASSETS_DIR);
    let resources_json = assets_dir.join("Resources.json");

    for path in walk_files(&assets_dir)? {
        if path == resources_json {
            continue;
        }

        let rel = crate::fs_util::relative_slashed(&path, &assets_dir);
        let bytes = crate::fs_util::read_bytes(&path)?;
        let display_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string();
        let key = pasrc_path::normalize(&format!("assets/{rel}"));

        doc.assets.insert(key, AssetBlob::new(bytes, display_name));
    }

    Ok(())
}

fn read_unknown_files(doc: &mut Document, root: &Path) -> Result<(), Error> {
    let other_dir = root.join(paths::OTHER_DIR);

    for path in walk_files(&other_dir)? {
        let rel = crate::fs_util::relative_slashed(&path, &other_dir);
        let bytes = crate::fs_util::read_bytes(&path)?;
        doc.unknown_files.insert(pasrc_path::normalize(&rel), pasrc_model::UnknownBlob::new(bytes, rel));
    }

    Ok(())
}
