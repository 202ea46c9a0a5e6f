//! Fixed relative locations within a source tree (§4.5). Every function here
//! returns a forward-slash relative path; callers join it onto a root with
//! `Path::join`, which handles the native separator.

pub const CANVAS_MANIFEST: &str = "CanvasManifest.json";
pub const CONTROL_TEMPLATES: &str = "ControlTemplates.json";
pub const THEMES: &str = "Src/Themes.json";
pub const RESOURCES_MANIFEST: &str = "Assets/Resources.json";
pub const ENTROPY: &str = "Entropy/Entropy.json";
pub const CHECKSUM: &str = "Entropy/Checksum.json";

pub const SRC_DIR: &str = "Src";
pub const SRC_COMPONENTS_DIR: &str = "Src/Components";
pub const SRC_EDITOR_STATE_DIR: &str = "Src/EditorState";
pub const ASSETS_DIR: &str = "Assets";
pub const OTHER_DIR: &str = "Other";

#[must_use]
pub fn screen(name: &str) -> String {
    format!("{SRC_DIR}/{name}.pa.yaml")
}

#[must_use]
pub fn component_source(name: &str) -> String {
    format!("{SRC_COMPONENTS_DIR}/{name}.pa.yaml")
}

#[must_use]
pub fn component_template(name: &str) -> String {
    format!("{SRC_COMPONENTS_DIR}/{name}.json")
}

#[must_use]
pub fn editor_state(top_parent_name: &str) -> String {
    format!("{SRC_EDITOR_STATE_DIR}/{top_parent_name}.editorstate.json")
}

/// Strips a source-relative screen/component path down to its bare control
/// name, i.e. the inverse of [`screen`]/[`component_source`].
#[must_use]
pub fn strip_pa_yaml(file_name: &str) -> Option<&str> {
    file_name.strip_suffix(".pa.yaml")
}

#[must_use]
pub fn strip_editor_state(file_name: &str) -> Option<&str> {
    file_name.strip_suffix(".editorstate.json")
}
