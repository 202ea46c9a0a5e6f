//! `AssetStabilizer` (§4.2): deterministic renaming of asset files, and its
//! exact inverse on pack.

use std::collections::{HashMap, HashSet};

use pasrc_model::Document;
use serde_json::Value as JsonValue;

use crate::manifest::{self, ResourceEntry, KIND_LOCAL_FILE};

#[derive(Debug)]
pub enum Error {
    MalformedManifest(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedManifest(msg) => write!(f, "malformed resource manifest: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

fn file_name(path: &str) -> String {
    path.replace('\\', "/")
        .rsplit('/')
        .next()
        .unwrap_or(path)
        .to_string()
}

fn dir_of(path: &str) -> String {
    let slashed = path.replace('\\', "/");
    match slashed.rsplit_once('/') {
        Some((dir, _)) => dir.to_string(),
        None => String::new(),
    }
}

fn extension_of(name: &str) -> String {
    let file = file_name(name);
    match file.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_string(),
        _ => String::new(),
    }
}

fn join(dir: &str, file: &str) -> String {
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{dir}/{file}")
    }
}

/// Finds the asset whose key's file name matches `name` case-insensitively,
/// returning its key and containing directory.
fn find_asset_by_file_name(
    doc: &Document,
    name: &str,
) -> Option<(pasrc_path::NormalizedPath, String)> {
    let wanted = name.to_ascii_lowercase();

    doc.assets.keys().find_map(|key| {
        let fname = file_name(key.as_str());
        (fname == wanted).then(|| (key.clone(), dir_of(key.as_str())))
    })
}

/// Unpack-time stabilization: renames every `LocalFile` resource to
/// `<resourceName><originalExtension>`, resolving case collisions and
/// writing asset-info sidecars for duplicate original filenames, then
/// normalizes the logo filename. Mutates `doc.assets`, `doc.entropy`,
/// `doc.resources_manifest`, `doc.publish_info`, and `doc.unknown_files`
/// (sidecars).
pub fn stabilize_on_unpack(doc: &mut Document) -> Result<(), Error> {
    let mut entries = manifest::parse(&doc.resources_manifest);

    let mut local: Vec<usize> = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.kind == KIND_LOCAL_FILE)
        .map(|(i, _)| i)
        .collect();
    local.sort_by(|&a, &b| entries[a].name.cmp(&entries[b].name));

    let originals: Vec<String> = local.iter().map(|&i| file_name(&entries[i].path)).collect();

    let mut original_counts: HashMap<String, usize> = HashMap::new();
    for o in &originals {
        *original_counts.entry(o.to_ascii_lowercase()).or_insert(0) += 1;
    }

    let mut assigned_lower: HashSet<String> = HashSet::new();
    let mut sidecars = Vec::new();

    for (k, &i) in local.iter().enumerate() {
        let resource_name = entries[i].name.clone();
        let original_file_name = originals[k].clone();
        let ext = extension_of(&original_file_name);
        let dir = dir_of(&entries[i].path);

        let mut new_stem = resource_name.clone();
        let mut lower = new_stem.to_ascii_lowercase();

        if assigned_lower.contains(&lower) {
            let mut n: u32 = 1;
            loop {
                let candidate = format!("{resource_name}_{n}");
                let candidate_lower = candidate.to_ascii_lowercase();

                if !assigned_lower.contains(&candidate_lower) {
                    log::warn!(
                        "case collision on resource name `{resource_name}`; aliased to `{candidate}`"
                    );
                    new_stem = candidate;
                    lower = candidate_lower;
                    break;
                }

                n += 1;
            }
        }

        assigned_lower.insert(lower);

        let new_file_name = if ext.is_empty() {
            new_stem
        } else {
            format!("{new_stem}.{ext}")
        };
        let new_path = join(&dir, &new_file_name);

        let old_key = pasrc_path::normalize(&entries[i].path);
        let new_key = pasrc_path::normalize(&new_path);

        if let Some(mut blob) = doc.assets.shift_remove(&old_key) {
            blob.display_name = new_file_name.clone();
            doc.assets.insert(new_key, blob);
        }

        doc.entropy
            .local_resource_file_names
            .insert(resource_name, original_file_name.clone());

        if original_counts
            .get(&original_file_name.to_ascii_lowercase())
            .copied()
            .unwrap_or(0)
            > 1
        {
            let sidecar_body = serde_json::json!({
                "originalName": original_file_name,
                "newFileName": new_file_name,
                "path": new_path,
            });
            let sidecar_path = format!("{new_path}.json");
            sidecars.push((sidecar_path, sidecar_body));
        }

        entries[i].path = new_path;
    }

    for (path, body) in sidecars {
        let bytes = serde_json::to_vec_pretty(&body)
            .map_err(|e| Error::MalformedManifest(e.to_string()))?;
        doc.unknown_files
            .insert(pasrc_path::normalize(&path), pasrc_model::UnknownBlob::new(bytes, path));
    }

    doc.resources_manifest = manifest::serialize(&entries);
    stabilize_logo_unpack(doc);

    Ok(())
}

fn stabilize_logo_unpack(doc: &mut Document) {
    let Some(logo_name) = doc
        .publish_info
        .get("logoFileName")
        .and_then(|v| v.as_str())
        .map(str::to_string)
    else {
        return;
    };

    let Some((old_key, dir)) = find_asset_by_file_name(doc, &logo_name) else {
        return;
    };

    let ext = extension_of(&logo_name);
    let new_file_name = if ext.is_empty() {
        "logo".to_string()
    } else {
        format!("logo.{ext}")
    };
    let new_path = join(&dir, &new_file_name);
    let new_key = pasrc_path::normalize(&new_path);

    if let Some(mut blob) = doc.assets.shift_remove(&old_key) {
        blob.display_name = new_file_name.clone();
        doc.assets.insert(new_key, blob);
    }

    doc.entropy.old_logo_file_name = Some(logo_name);

    if let JsonValue::Object(map) = &mut doc.publish_info {
        map.insert("logoFileName".into(), JsonValue::String(new_file_name));
    }
}

/// Pack-time inverse of [`stabilize_on_unpack`]. For each resource, restores
/// the name recorded in `Entropy.local_resource_file_names` if present;
/// otherwise mints a fresh numeric name greater than any seen so far
/// (§4.2, §8 P8). Restores the logo filename the same way.
pub fn stabilize_on_pack(doc: &mut Document) -> Result<(), Error> {
    let mut entries = manifest::parse(&doc.resources_manifest);

    let mut local: Vec<usize> = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.kind == KIND_LOCAL_FILE)
        .map(|(i, _)| i)
        .collect();
    local.sort_by(|&a, &b| entries[a].name.cmp(&entries[b].name));

    // Largest numeric stem already on record, so freshly-minted fallback
    // names keep climbing past it without ever touching `doc.entropy`
    // itself (minting must not leave fake entries in the serialized
    // side-channel).
    let mut next_numeric: u32 = doc
        .entropy
        .local_resource_file_names
        .values()
        .filter_map(|original| {
            let stem = original.rsplit_once('.').map_or(original.as_str(), |(s, _)| s);
            stem.parse::<u32>().ok()
        })
        .max()
        .unwrap_or(0)
        + 1;

    for &i in &local {
        restore_one(doc, &mut entries[i], &mut next_numeric);
    }

    doc.resources_manifest = manifest::serialize(&entries);
    stabilize_logo_pack(doc);

    Ok(())
}

fn restore_one(doc: &mut Document, entry: &mut ResourceEntry, next_numeric: &mut u32) {
    let dir = dir_of(&entry.path);
    let current_key = pasrc_path::normalize(&entry.path);

    let restored_name = match doc.entropy.local_resource_file_names.get(&entry.name) {
        Some(original) => original.clone(),
        None => {
            let ext = extension_of(&entry.path);
            let stem = format!("{next_numeric:04}");
            *next_numeric += 1;

            if ext.is_empty() {
                stem
            } else {
                format!("{stem}.{ext}")
            }
        }
    };

    let restored_path = join(&dir, &restored_name);
    let restored_key = pasrc_path::normalize(&restored_path);

    if let Some(mut blob) = doc.assets.shift_remove(&current_key) {
        blob.display_name = restored_name.clone();
        doc.assets.insert(restored_key, blob);
    }

    entry.path = restored_path;
}

fn stabilize_logo_pack(doc: &mut Document) {
    let Some(logo_name) = doc
        .publish_info
        .get("logoFileName")
        .and_then(|v| v.as_str())
        .map(str::to_string)
    else {
        return;
    };

    let Some((old_key, dir)) = find_asset_by_file_name(doc, &logo_name) else {
        return;
    };

    let restored_name = doc
        .entropy
        .old_logo_file_name
        .clone()
        .unwrap_or(logo_name);
    let restored_path = join(&dir, &restored_name);
    let restored_key = pasrc_path::normalize(&restored_path);

    if let Some(mut blob) = doc.assets.shift_remove(&old_key) {
        blob.display_name = restored_name.clone();
        doc.assets.insert(restored_key, blob);
    }

    if let JsonValue::Object(map) = &mut doc.publish_info {
        map.insert("logoFileName".into(), JsonValue::String(restored_name));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pasrc_model::AssetBlob;

    fn doc_with_resources(entries: Vec<(&str, &str)>) -> Document {
        let mut doc = Document::empty();

        let manifest: Vec<JsonValue> = entries
            .iter()
            .map(|(name, path)| {
                doc.assets.insert(
                    pasrc_path::normalize(path),
                    AssetBlob::new(vec![1, 2, 3], (*name).to_string()),
                );
                serde_json::json!({ "name": name, "kind": "LocalFile", "path": path })
            })
            .collect();

        doc.resources_manifest = JsonValue::Array(manifest);
        doc
    }

    #[test]
    fn asset_collision_scenario_4() {
        let mut doc = doc_with_resources(vec![
            ("Photo", "Assets/original1.png"),
            ("photo", "Assets/original2.png"),
        ]);

        stabilize_on_unpack(&mut doc).unwrap();

        assert!(doc.assets.contains_key(&pasrc_path::normalize("Assets/Photo.png")));
        assert!(doc.assets.contains_key(&pasrc_path::normalize("Assets/photo_1.png")));

        assert_eq!(
            doc.entropy.local_resource_file_names.get("Photo").unwrap(),
            "original1.png"
        );
        assert_eq!(
            doc.entropy.local_resource_file_names.get("photo").unwrap(),
            "original2.png"
        );

        stabilize_on_pack(&mut doc).unwrap();

        assert!(doc.assets.contains_key(&pasrc_path::normalize("Assets/original1.png")));
        assert!(doc.assets.contains_key(&pasrc_path::normalize("Assets/original2.png")));
    }

    #[test]
    fn logo_rename_scenario_5() {
        let mut doc = Document::empty();
        doc.assets.insert(
            pasrc_path::normalize("e6c4d3-ab.png"),
            AssetBlob::new(vec![9], "logo".into()),
        );
        doc.publish_info = serde_json::json!({ "logoFileName": "e6c4d3-ab.png" });

        stabilize_on_unpack(&mut doc).unwrap();

        assert!(doc.assets.contains_key(&pasrc_path::normalize("logo.png")));
        assert_eq!(
            doc.entropy.old_logo_file_name.as_deref(),
            Some("e6c4d3-ab.png")
        );
        assert_eq!(
            doc.publish_info.get("logoFileName").unwrap(),
            "logo.png"
        );

        stabilize_on_pack(&mut doc).unwrap();

        assert!(doc.assets.contains_key(&pasrc_path::normalize("e6c4d3-ab.png")));
        assert_eq!(
            doc.publish_info.get("logoFileName").unwrap(),
            "e6c4d3-ab.png"
        );
    }

    #[test]
    fn pack_without_entropy_mints_numeric_name() {
        let mut doc = doc_with_resources(vec![("Widget", "Assets/Widget.ico")]);
        // No entropy recorded: entropy-absent robustness (P8).
        stabilize_on_pack(&mut doc).unwrap();

        let restored = manifest::parse(&doc.resources_manifest);
        assert_eq!(restored[0].path, "Assets/0001.ico");
    }
}
