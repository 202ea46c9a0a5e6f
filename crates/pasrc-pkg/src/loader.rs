//! Archive → `Document` (§4.6): enumerate, canonicalize, classify, deserialize
//! recognized entries, fall through to `unknownFiles`, then run
//! `applyTransformsAfterLoad` (IRSplitCombine, then AssetStabilizer).

use std::io::{Read, Seek};

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use pasrc_diag::{Code, Diagnostic, ErrorContainer};
use pasrc_ir::{split, SplitContext};
use pasrc_model::{AssetBlob, Document, FormatVersion, TemplateState};

use crate::config::Config;
use crate::error::Error;
use crate::kind::{self, EntryKind};

/// Unpacks a PKG archive into a fresh `Document`. `errors` collects
/// non-aborting diagnostics (oversized assets, ...); a fatal failure
/// (bad format version, a split-level `DuplicateSymbol`) both pushes a
/// diagnostic and returns `Err`, per §7.
pub fn load_pkg<R: Read + Seek>(
    reader: R,
    config: &Config,
    errors: &mut ErrorContainer,
) -> Result<Document, Error> {
    let mut archive = zip::ZipArchive::new(reader).map_err(Error::Zip)?;
    let mut doc = Document::empty();

    let mut screens_raw: IndexMap<String, JsonValue> = IndexMap::new();
    let mut components_raw: IndexMap<String, JsonValue> = IndexMap::new();
    let mut template_snapshots: IndexMap<String, TemplateState> = IndexMap::new();
    let mut header_seen = false;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(Error::Zip)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().replace('\\', "/");
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| Error::Io { path: name.clone(), source: e })?;
        drop(entry);

        match kind::classify(&name) {
            EntryKind::Properties => doc.properties = parse_json(&name, &bytes)?,
            EntryKind::Header => {
                header_seen = true;
                let value = parse_json(&name, &bytes)?;
                apply_header(&mut doc, &value)?;
            }
            EntryKind::PublishInfo => doc.publish_info = parse_json(&name, &bytes)?,
            EntryKind::Themes => doc.themes = parse_json(&name, &bytes)?,
            EntryKind::Templates => {
                if let JsonValue::Array(items) = parse_json(&name, &bytes)? {
                    for item in &items {
                        let template = pasrc_model::json::template_from_json(item);
                        template_snapshots.insert(template.name.clone(), template.clone());
                        doc.templates.insert(template);
                    }
                }
            }
            EntryKind::Resources => doc.resources_manifest = parse_json(&name, &bytes)?,
            EntryKind::Entropy => {
                let value = parse_json(&name, &bytes)?;
                doc.entropy = serde_json::from_value(value).unwrap_or_default();
            }
            EntryKind::Checksum => {
                let value = parse_json(&name, &bytes)?;
                doc.checksum = value.get("checksum").and_then(JsonValue::as_str).map(str::to_string);
            }
            EntryKind::ComponentReferences | EntryKind::Connections => {
                doc.unknown_files.insert(pasrc_path::normalize(&name), pasrc_model::UnknownBlob::new(bytes, name));
            }
            EntryKind::Screen(scr_name) => {
                screens_raw.insert(scr_name, parse_json(&name, &bytes)?);
            }
            EntryKind::Component(comp_name) => {
                components_raw.insert(comp_name, parse_json(&name, &bytes)?);
            }
            EntryKind::Asset(file_name) => {
                if bytes.len() > config.get().asset_size_limit() {
                    errors.push(Diagnostic::warning(
                        Code::GenericWarning,
                        format!("asset `{name}` ({} bytes) exceeds the configured size limit, skipped", bytes.len()),
                    ));
                    continue;
                }
                doc.assets.insert(pasrc_path::normalize(&name), AssetBlob::new(bytes, file_name));
            }
            EntryKind::Unknown => {
                doc.unknown_files.insert(pasrc_path::normalize(&name), pasrc_model::UnknownBlob::new(bytes, name));
            }
        }
    }

    if !header_seen {
        return Err(Error::MissingEntry(kind::HEADER.to_string()));
    }

    // §4.3 IRSplitCombine: screens and components are instantiated in
    // alphabetical name order, independent of archive entry order
    // (`Document::all_blocks`'s documented insertion contract).
    let mut screen_names: Vec<&String> = screens_raw.keys().collect();
    screen_names.sort();
    doc.screen_order = screen_names.iter().map(|s| s.to_string()).collect();

    let mut component_names: Vec<&String> = components_raw.keys().collect();
    component_names.sort();

    for name in screen_names {
        let raw = pasrc_ir::control_from_json(&screens_raw[name]);
        let block = split_one(&raw, name, &mut doc, &template_snapshots, errors)?;
        doc.screens.insert(name.clone(), block);
    }

    for name in component_names {
        let raw = pasrc_ir::control_from_json(&components_raw[name]);
        let block = split_one(&raw, name, &mut doc, &template_snapshots, errors)?;
        doc.components.insert(name.clone(), block);
    }

    pasrc_assets::stabilize_on_unpack(&mut doc).map_err(Error::Assets)?;

    Ok(doc)
}

/// `false` here is only the *inherited* test-suite flag for the top-level
/// call — a root control tags itself via `PkgControl::is_test_suite`, which
/// `split` ORs in regardless of what gets passed here (§4.3 step 9, I1).
fn split_one(
    raw: &pasrc_ir::PkgControl,
    top_parent_name: &str,
    doc: &mut Document,
    template_snapshots: &IndexMap<String, TemplateState>,
    errors: &mut ErrorContainer,
) -> Result<pasrc_model::IrBlock, Error> {
    let mut ctx = SplitContext {
        templates: &mut doc.templates,
        editor_states: &mut doc.editor_states,
        entropy: &mut doc.entropy,
        template_snapshots,
    };

    split(raw, top_parent_name, 0, false, &mut ctx).map_err(|e| {
        errors.push(Diagnostic::fatal(ir_error_code(&e), e.to_string()));
        Error::Ir(e)
    })
}

fn ir_error_code(e: &pasrc_ir::Error) -> Code {
    match e {
        pasrc_ir::Error::DuplicateControlName(_) => Code::DuplicateSymbol,
        pasrc_ir::Error::UnsupportedChange(_) => Code::UnsupportedChange,
        pasrc_ir::Error::MissingThisProperty(_) | pasrc_ir::Error::UnknownScopeParameter { .. } => {
            Code::InternalError
        }
    }
}

fn apply_header(doc: &mut Document, value: &JsonValue) -> Result<(), Error> {
    let version_str = value.get("formatVersion").and_then(JsonValue::as_str);
    let version = version_str.and_then(parse_version);

    match (version_str, version) {
        (Some(_), Some(v)) if v == FormatVersion::CURRENT => {
            doc.format_version = Some(v);
        }
        (Some(found), _) => {
            return Err(Error::FormatNotSupported {
                found: found.to_string(),
                expected: FormatVersion::CURRENT.to_string(),
            });
        }
        (None, _) => {
            doc.format_version = Some(FormatVersion::CURRENT);
        }
    }

    doc.header = value.clone();
    Ok(())
}

fn parse_version(s: &str) -> Option<FormatVersion> {
    let (major, minor) = s.split_once('.')?;
    Some(FormatVersion { major: major.parse().ok()?, minor: minor.parse().ok()? })
}

fn parse_json(path: &str, bytes: &[u8]) -> Result<JsonValue, Error> {
    serde_json::from_slice(bytes).map_err(|source| Error::Json { path: path.to_string(), source })
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;

    fn write_entry(zip: &mut zip::ZipWriter<Cursor<Vec<u8>>>, name: &str, bytes: &[u8]) {
        let options = zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        zip.start_file(name, options).unwrap();
        std::io::Write::write_all(zip, bytes).unwrap();
    }

    fn sample_pkg() -> Vec<u8> {
        let cursor = Cursor::new(Vec::new());
        let mut zip = zip::ZipWriter::new(cursor);

        write_entry(&mut zip, kind::PROPERTIES, b"{}");
        write_entry(&mut zip, kind::HEADER, br#"{"formatVersion":"0.18"}"#);
        write_entry(&mut zip, kind::PUBLISH_INFO, b"{}");
        write_entry(&mut zip, kind::THEMES, b"{}");
        write_entry(&mut zip, kind::TEMPLATES, b"[]");
        write_entry(&mut zip, kind::RESOURCES, b"{}");
        write_entry(
            &mut zip,
            "Controls/Screen1.json",
            br#"{"name":"Screen1","controlType":"Screen","publishOrderIndex":0,"isComponentDefinition":false,"children":[]}"#,
        );

        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn load_pkg_builds_a_screen() {
        let bytes = sample_pkg();
        let config = Config::new();
        let mut errors = ErrorContainer::new();

        let doc = load_pkg(Cursor::new(bytes), &config, &mut errors).unwrap();

        assert!(errors.is_empty());
        assert_eq!(doc.screen_order, vec!["Screen1".to_string()]);
        assert!(doc.screens.contains_key("Screen1"));
    }

    #[test]
    fn load_pkg_rejects_wrong_format_version() {
        let cursor = Cursor::new(Vec::new());
        let mut zip = zip::ZipWriter::new(cursor);
        write_entry(&mut zip, kind::HEADER, br#"{"formatVersion":"0.1"}"#);
        let bytes = zip.finish().unwrap().into_inner();

        let config = Config::new();
        let mut errors = ErrorContainer::new();
        let err = load_pkg(Cursor::new(bytes), &config, &mut errors).unwrap_err();
        assert!(matches!(err, Error::FormatNotSupported { .. }));
    }
}
