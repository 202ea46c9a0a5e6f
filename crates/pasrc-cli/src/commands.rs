//! One function per CLI verb (§6). Each opens/creates whatever files it
//! needs, drives the library crates, prints accumulated diagnostics, and
//! reports whether the run should be considered a pass.

use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use pasrc_diag::ErrorContainer;
use pasrc_model::{Document, FormatVersion};

use crate::error::Error;

fn print_diagnostics(errors: &ErrorContainer) {
    for diag in errors.iter() {
        eprintln!("{diag}");
    }
}

pub fn unpack(pkg: &str, out_dir: Option<&str>) -> Result<bool, Error> {
    let bytes = std::fs::read(pkg).map_err(|source| Error::Io { path: pkg.to_string(), source })?;
    let config = pasrc_pkg::Config::new();
    let mut errors = ErrorContainer::new();
    let doc = pasrc_pkg::load_pkg(Cursor::new(bytes), &config, &mut errors)?;

    let out_dir: PathBuf = match out_dir {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(format!("{pkg}_src")),
    };
    pasrc_layout::write_source_tree(&doc, &out_dir)?;

    print_diagnostics(&errors);
    log::info!("unpacked `{pkg}` into `{}`", out_dir.display());
    Ok(!errors.has_fatal())
}

pub fn pack(pkg: &str, src_dir: &str) -> Result<bool, Error> {
    let mut errors = ErrorContainer::new();
    let mut doc = pasrc_layout::read_source_tree(Path::new(src_dir), &mut errors)?;

    let file = File::create(pkg).map_err(|source| Error::Io { path: pkg.to_string(), source })?;
    pasrc_pkg::write_pkg(&mut doc, file)?;

    print_diagnostics(&errors);
    log::info!("packed `{src_dir}` into `{pkg}`");
    Ok(!errors.has_fatal())
}

/// Synthesizes a new PKG from a single raw DSL screen plus whatever stock
/// templates live as flat `*.json` files (PKG `Templates.json` shape) under
/// `pkgs_dir`.
pub fn make(pkg: &str, pkgs_dir: &str, pa_file: &str) -> Result<bool, Error> {
    let text =
        std::fs::read_to_string(pa_file).map_err(|source| Error::Io { path: pa_file.to_string(), source })?;
    let block = pasrc_dsl::parse_block(&text)?;

    let mut doc = Document::empty();
    doc.format_version = Some(FormatVersion::CURRENT);
    doc.properties = serde_json::json!({});
    doc.header = serde_json::json!({});
    doc.publish_info = serde_json::json!({});
    doc.themes = serde_json::json!({});
    doc.resources_manifest = serde_json::json!({});

    let screen_name = block.name.identifier.clone();
    doc.screen_order.push(screen_name.clone());
    doc.screens.insert(screen_name, block);

    for entry in
        std::fs::read_dir(pkgs_dir).map_err(|source| Error::Io { path: pkgs_dir.to_string(), source })?
    {
        let entry = entry.map_err(|source| Error::Io { path: pkgs_dir.to_string(), source })?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let bytes = std::fs::read(&path)
            .map_err(|source| Error::Io { path: path.display().to_string(), source })?;
        let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|source| {
            Error::Layout(pasrc_layout::Error::Json { path: path.display().to_string(), source })
        })?;
        doc.templates.insert(pasrc_model::json::template_from_json(&value));
    }

    let file = File::create(pkg).map_err(|source| Error::Io { path: pkg.to_string(), source })?;
    pasrc_pkg::write_pkg(&mut doc, file)?;

    log::info!("made `{pkg}` from `{pa_file}` with templates from `{pkgs_dir}`");
    Ok(true)
}

/// `-test`: round-trips one PKG in memory and compares the checksum stored
/// in the original archive against the one produced by repacking it.
pub fn test_one(pkg: &str) -> Result<bool, Error> {
    let bytes = std::fs::read(pkg).map_err(|source| Error::Io { path: pkg.to_string(), source })?;
    let config = pasrc_pkg::Config::new();
    let mut errors = ErrorContainer::new();
    let mut doc = pasrc_pkg::load_pkg(Cursor::new(bytes), &config, &mut errors)?;
    let original_checksum = doc.checksum.clone();

    let mut repacked = Cursor::new(Vec::new());
    let new_checksum = pasrc_pkg::write_pkg(&mut doc, &mut repacked)?;

    print_diagnostics(&errors);

    let matches = match &original_checksum {
        Some(original) => *original == new_checksum,
        None => true,
    };

    if matches {
        println!("PASS  {pkg}");
    } else {
        println!(
            "FAIL  {pkg}  (checksum {} != {new_checksum})",
            original_checksum.as_deref().unwrap_or("<none>")
        );
    }

    Ok(matches && !errors.has_fatal())
}

/// `-testall`: every top-level `*.msapp` under `dir`.
pub fn test_all(dir: &str) -> Result<bool, Error> {
    let mut total = 0;
    let mut passed = 0;

    for entry in std::fs::read_dir(dir).map_err(|source| Error::Io { path: dir.to_string(), source })? {
        let entry = entry.map_err(|source| Error::Io { path: dir.to_string(), source })?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()).map(|e| e.eq_ignore_ascii_case("msapp")) != Some(true) {
            continue;
        }

        total += 1;
        let path_str = path.display().to_string();
        match test_one(&path_str) {
            Ok(true) => passed += 1,
            Ok(false) => {}
            Err(e) => eprintln!("{path_str}: {e}"),
        }
    }

    println!("{passed}/{total} passed");
    Ok(passed == total)
}
