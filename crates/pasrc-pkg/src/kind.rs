//! Filename→kind lookup table (§4.6): the loader classifies every archive
//! entry by its canonicalized relative path; the writer uses the same
//! constants in reverse to name the entries it produces.

pub const PROPERTIES: &str = "Properties.json";
pub const HEADER: &str = "Header.json";
pub const PUBLISH_INFO: &str = "PublishInfo.json";
pub const THEMES: &str = "Themes.json";
pub const TEMPLATES: &str = "Templates.json";
pub const RESOURCES: &str = "Resources.json";
pub const ENTROPY: &str = "Entropy.json";
pub const CHECKSUM: &str = "Checksum.json";
pub const COMPONENT_REFERENCES: &str = "ComponentReferences.json";
pub const CONNECTIONS: &str = "Connections/Connections.json";

pub const CONTROLS_DIR: &str = "Controls";
pub const COMPONENTS_DIR: &str = "Components";
pub const ASSETS_DIR: &str = "Assets";

/// What a canonicalized archive entry path was recognized as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Properties,
    Header,
    PublishInfo,
    Themes,
    Templates,
    Resources,
    Entropy,
    Checksum,
    ComponentReferences,
    Connections,
    /// `Controls/<name>.json`: one screen's control tree.
    Screen(String),
    /// `Components/<name>.json`: one component definition's control tree.
    Component(String),
    /// `Assets/<name>`: a resource blob, keyed by its on-disk file name.
    Asset(String),
    /// Everything else — preserved verbatim in `unknownFiles` (§4.5/§4.6).
    Unknown,
}

/// Classifies one canonicalized (forward-slash, as found in the archive)
/// entry path per the fixed kind table (§4.6, "case-insensitive").
#[must_use]
pub fn classify(path: &str) -> EntryKind {
    if path.eq_ignore_ascii_case(PROPERTIES) {
        return EntryKind::Properties;
    }
    if path.eq_ignore_ascii_case(HEADER) {
        return EntryKind::Header;
    }
    if path.eq_ignore_ascii_case(PUBLISH_INFO) {
        return EntryKind::PublishInfo;
    }
    if path.eq_ignore_ascii_case(THEMES) {
        return EntryKind::Themes;
    }
    if path.eq_ignore_ascii_case(TEMPLATES) {
        return EntryKind::Templates;
    }
    if path.eq_ignore_ascii_case(RESOURCES) {
        return EntryKind::Resources;
    }
    if path.eq_ignore_ascii_case(ENTROPY) {
        return EntryKind::Entropy;
    }
    if path.eq_ignore_ascii_case(CHECKSUM) {
        return EntryKind::Checksum;
    }
    if path.eq_ignore_ascii_case(COMPONENT_REFERENCES) {
        return EntryKind::ComponentReferences;
    }
    if path.eq_ignore_ascii_case(CONNECTIONS) {
        return EntryKind::Connections;
    }

    if let Some(rest) = strip_dir_ci(path, CONTROLS_DIR) {
        if let Some(name) = rest.strip_suffix(".json") {
            return EntryKind::Screen(name.to_string());
        }
    }
    if let Some(rest) = strip_dir_ci(path, COMPONENTS_DIR) {
        if let Some(name) = rest.strip_suffix(".json") {
            return EntryKind::Component(name.to_string());
        }
    }
    if let Some(rest) = strip_dir_ci(path, ASSETS_DIR) {
        if !rest.is_empty() {
            return EntryKind::Asset(rest.to_string());
        }
    }

    EntryKind::Unknown
}

/// Strips a leading `<dir>/` segment case-insensitively, returning the
/// remainder if `path` is actually under that directory.
fn strip_dir_ci<'a>(path: &'a str, dir: &str) -> Option<&'a str> {
    let prefix_len = dir.len();
    if path.len() > prefix_len + 1
        && path.is_char_boundary(prefix_len)
        && path[..prefix_len].eq_ignore_ascii_case(dir)
        && path.as_bytes()[prefix_len] == b'/'
    {
        Some(&path[prefix_len + 1..])
    } else {
        None
    }
}
