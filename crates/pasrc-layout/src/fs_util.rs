//! Small filesystem helpers shared by [`crate::write`] and [`crate::read`].
//! Kept separate from the tree-shape logic so that logic can be read without
//! wading through `fs::` calls.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;

use crate::error::Error;

fn to_io_err(path: &Path, source: std::io::Error) -> Error {
    Error::Io { path: path.display().to_string(), source }
}

pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| to_io_err(parent, e))?;
    }
    fs::write(path, bytes).map_err(|e| to_io_err(path, e))
}

pub fn write_text(path: &Path, text: &str) -> Result<(), Error> {
    write_bytes(path, text.as_bytes())
}

pub fn write_json(path: &Path, value: &JsonValue) -> Result<(), Error> {
    write_bytes(path, &crate::json::canonical_bytes(value))
}

pub fn read_bytes(path: &Path) -> Result<Vec<u8>, Error> {
    fs::read(path).map_err(|e| to_io_err(path, e))
}

pub fn read_text(path: &Path) -> Result<String, Error> {
    fs::read_to_string(path).map_err(|e| to_io_err(path, e))
}

pub fn read_json(path: &Path) -> Result<JsonValue, Error> {
    let bytes = read_bytes(path)?;
    serde_json::from_slice(&bytes).map_err(|e| Error::Json { path: path.display().to_string(), source: e })
}

pub fn try_read_json(path: &Path) -> Result<Option<JsonValue>, Error> {
    if !path.is_file() {
        return Ok(None);
    }
    read_json(path).map(Some)
}

/// Every regular file under `dir`, recursively, in lexicographic path order
/// for determinism. Returns an empty list if `dir` does not exist.
pub fn walk_files(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut out = Vec::new();
    if !dir.is_dir() {
        return Ok(out);
    }
    walk_into(dir, &mut out)?;
    out.sort();
    Ok(out)
}

fn walk_into(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), Error> {
    for entry in fs::read_dir(dir).map_err(|e| to_io_err(dir, e))? {
        let entry = entry.map_err(|e| to_io_err(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| to_io_err(&path, e))?;
        if file_type.is_dir() {
            walk_into(&path, out)?;
        } else if file_type.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

/// `full`'s path relative to `root`, forward-slash separated.
#[must_use]
pub fn relative_slashed(full: &Path, root: &Path) -> String {
    full.strip_prefix(root)
        .unwrap_or(full)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
