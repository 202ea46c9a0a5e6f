//! Path normalization, escaping, and relative-path math shared by every
//! subsystem that moves between archive paths (forward-slash, case-insensitive)
//! and filesystem paths (native separator).

use std::fmt;

/// An archive path after [`normalize`]: forward-slash separated, no leading
/// or trailing slash, ASCII-lowercased. Used as a map key wherever the spec
/// calls for one (`AssetTable`, `Document::assets`, `Document::unknownFiles`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NormalizedPath(String);

impl NormalizedPath {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NormalizedPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NormalizedPath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(normalize(&raw))
    }
}

/// Registry of normalize collisions seen so far, so callers can decide what
/// to do with the first-wins/warn policy without a global logger dependency
/// on the caller's part. [`normalize`] itself only ever logs.
#[derive(Debug, Default)]
pub struct CollisionLog {
    seen: std::collections::HashSet<String>,
}

impl CollisionLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `raw`'s normalized form. Returns `true` the first time a
    /// given normalized string is seen, `false` (and logs a warning) on every
    /// collision after that. First registration always wins downstream.
    pub fn register(&mut self, raw: &str) -> bool {
        let norm = normalize(raw);
        if self.seen.insert(norm.0.clone()) {
            true
        } else {
            log::warn!("normalize collision on `{raw}` (normalizes to `{}`)", norm.0);
            false
        }
    }
}

/// Trims, replaces `\` with `/`, strips leading/trailing slashes, and
/// lowercases. This is the archive-path space's sole notion of identity:
/// two paths that normalize to the same string are the same archive entry.
#[must_use]
pub fn normalize(p: &str) -> NormalizedPath {
    let trimmed = p.trim();
    let slashed = trimmed.replace('\\', "/");
    let stripped = slashed.trim_matches('/');
    NormalizedPath(stripped.to_ascii_lowercase())
}

/// Characters kept literal by [`escape_file_name`]; everything else outside
/// `A-Za-z0-9` is percent-encoded.
fn is_literal(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '.' | '[' | ']' | '-' | '\\')
}

/// Percent-encodes every character outside `[A-Za-z0-9 _.\[\]-\\]`. Code
/// points above `0x7F` are encoded as `%%HHHH` (four hex digits of the
/// scalar value), not as UTF-8 percent-escapes — this exact encoding is
/// required for round-trip fidelity with the original tool's file naming.
#[must_use]
pub fn escape_file_name(s: &str) -> String {
    let mut out = String::with_capacity(s.len());

    for c in s.chars() {
        if is_literal(c) {
            out.push(c);
        } else if (c as u32) <= 0x7F {
            out.push_str(&format!("%{:02x}", c as u32));
        } else {
            out.push_str(&format!("%%{:04x}", c as u32));
        }
    }

    out
}

/// Reverses [`escape_file_name`]. A stray `%` (or `%%`) without enough valid
/// hex digits following it is treated as a literal character rather than a
/// parse error, matching the original tool's lenient unescaping.
#[must_use]
pub fn unescape_file_name(s: &str) -> String {
    let bytes: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];

        if c != '%' {
            out.push(c);
            i += 1;
            continue;
        }

        if bytes.get(i + 1) == Some(&'%') {
            if let Some(scalar) = read_hex(&bytes, i + 2, 4) {
                if let Some(ch) = char::from_u32(scalar) {
                    out.push(ch);
                    i += 6;
                    continue;
                }
            }

            out.push('%');
            i += 1;
            continue;
        }

        if let Some(scalar) = read_hex(&bytes, i + 1, 2) {
            if let Some(ch) = char::from_u32(scalar) {
                out.push(ch);
                i += 3;
                continue;
            }
        }

        out.push('%');
        i += 1;
    }

    out
}

fn read_hex(chars: &[char], start: usize, count: usize) -> Option<u32> {
    if start + count > chars.len() {
        return None;
    }

    let hex: String = chars[start..start + count].iter().collect();
    u32::from_str_radix(&hex, 16).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    InvalidPath,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPath => write!(f, "path is not relative to the given base"),
        }
    }
}

impl std::error::Error for Error {}

/// Computes `full`'s path relative to `base`, enforcing that `full` starts
/// with `base` after separator normalization (`/` folded to `\`). If the
/// final path component has no extension, a trailing separator is appended —
/// this mirrors the original tool's directory-vs-file heuristic, since it
/// never consults the filesystem to tell the two apart.
pub fn relative(full: &str, base: &str) -> Result<String, Error> {
    let full_n = full.replace('/', "\\");
    let base_n = base.replace('/', "\\");
    let base_trimmed = base_n.trim_end_matches('\\');

    if !full_n
        .to_ascii_lowercase()
        .starts_with(&base_trimmed.to_ascii_lowercase())
    {
        return Err(Error::InvalidPath);
    }

    let mut rest = &full_n[base_trimmed.len()..];
    rest = rest.trim_start_matches('\\');

    if rest.is_empty() {
        return Err(Error::InvalidPath);
    }

    let last_component = rest.rsplit('\\').next().unwrap_or(rest);
    let mut out = rest.to_string();

    if !last_component.contains('.') {
        out.push('\\');
    }

    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn normalize_smoke() {
        assert_eq!(normalize("/Foo/Bar/").as_str(), "foo/bar");
        assert_eq!(normalize("Foo\\Bar").as_str(), "foo/bar");
        assert_eq!(normalize("  Foo/Bar  ").as_str(), "foo/bar");
    }

    #[test]
    fn normalize_collision_logs_but_is_not_fatal() {
        let mut log = CollisionLog::new();
        assert!(log.register("Foo/Bar"));
        assert!(!log.register("foo/bar"));
    }

    #[test]
    fn escape_roundtrip_p3() {
        assert_eq!(escape_file_name("\r\t!$/^%"), "%0d%09%21%24%2f%5e%25");
        assert_eq!(escape_file_name("\u{4523}"), "%%4523");
        assert_eq!(unescape_file_name("foo-%41"), "foo-A");
        assert_eq!(
            escape_file_name("0123456789AZaz[]_. \\"),
            "0123456789AZaz[]_. \\"
        );
    }

    #[test]
    fn escape_unescape_roundtrip_arbitrary() {
        for s in ["hello world.txt", "düsseldorf", "a%b", "%%zzzz", "%"] {
            assert_eq!(unescape_file_name(&escape_file_name(s)), s);
        }
    }

    #[test]
    fn unescape_stray_percent_is_literal() {
        assert_eq!(unescape_file_name("100%"), "100%");
        assert_eq!(unescape_file_name("%zz"), "%zz");
    }

    #[test]
    fn relative_p4() {
        assert_eq!(
            relative("C:\\Foo\\Bar\\Baz", "C:\\Foo").unwrap(),
            "Bar\\Baz\\"
        );
        assert_eq!(
            relative("C:\\Foo\\Bar.msapp", "C:\\").unwrap(),
            "Foo\\Bar.msapp"
        );
    }

    #[test]
    fn relative_rejects_unrelated_base() {
        assert_eq!(relative("C:\\Foo\\Bar", "D:\\Quux"), Err(Error::InvalidPath));
    }
}
