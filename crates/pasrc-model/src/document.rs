//! `Document` (§3): the root aggregate. Created empty by either loader;
//! mutated only during load and the explicit transform passes; writers
//! treat it as read-only (§3 Lifecycles).

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use pasrc_path::NormalizedPath;

use crate::asset::{AssetBlob, UnknownBlob};
use crate::entropy::Entropy;
use crate::ir::IrBlock;
use crate::state::ControlState;
use crate::template::TemplateStore;

/// Integer pair `(major, minor)`. Current version is `0.18` (§6). Mismatch
/// on source load is fatal (`FormatNotSupported`, I7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FormatVersion {
    pub major: u32,
    pub minor: u32,
}

impl FormatVersion {
    pub const CURRENT: FormatVersion = FormatVersion { major: 0, minor: 18 };
}

impl std::fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    pub screens: IndexMap<String, IrBlock>,
    pub components: IndexMap<String, IrBlock>,
    pub templates: TemplateStore,
    pub editor_states: IndexMap<String, ControlState>,
    pub assets: IndexMap<NormalizedPath, AssetBlob>,
    /// Files carried through verbatim for fidelity because this tool does
    /// not understand their format (§3).
    pub unknown_files: IndexMap<NormalizedPath, UnknownBlob>,
    pub entropy: Entropy,
    pub properties: JsonValue,
    pub header: JsonValue,
    pub publish_info: JsonValue,
    pub themes: JsonValue,
    pub resources_manifest: JsonValue,
    pub checksum: Option<String>,
    pub format_version: Option<FormatVersion>,
    /// Preserves deterministic screen enumeration order, independent of
    /// `screens`' own (alphabetical, by construction of `IndexMap`
    /// insertion) order once screens are added/removed during editing.
    pub screen_order: Vec<String>,
}

impl Document {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            screens: IndexMap::new(),
            components: IndexMap::new(),
            templates: TemplateStore::new(),
            editor_states: IndexMap::new(),
            assets: IndexMap::new(),
            unknown_files: IndexMap::new(),
            entropy: Entropy::new(),
            properties: JsonValue::Null,
            header: JsonValue::Null,
            publish_info: JsonValue::Null,
            themes: JsonValue::Null,
            resources_manifest: JsonValue::Null,
            checksum: None,
            format_version: None,
            screen_order: Vec::new(),
        }
    }

    /// All top-level control trees: screens first (in `screen_order`), then
    /// components, alphabetically (`IndexMap` iteration order reflects
    /// insertion, which the loader performs alphabetically — see
    /// `pasrc-pkg`).
    pub fn all_blocks(&self) -> impl Iterator<Item = (&str, &IrBlock)> {
        self.screen_order
            .iter()
            .filter_map(move |name| self.screens.get(name).map(|b| (name.as_str(), b)))
            .chain(self.components.iter().map(|(n, b)| (n.as_str(), b)))
    }

    #[must_use]
    pub fn control_count(&self) -> usize {
        self.all_blocks().map(|(_, b)| b.walk().count()).sum()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ir::{TypeRef, TypedName};

    #[test]
    fn empty_document_has_no_controls() {
        let doc = Document::empty();
        assert_eq!(doc.control_count(), 0);
    }

    #[test]
    fn all_blocks_respects_screen_order_then_components() {
        let mut doc = Document::empty();

        let screen_b = IrBlock::new(TypedName {
            identifier: "ScreenB".into(),
            kind: TypeRef { type_name: "Screen".into(), optional_variant: None },
        });
        let screen_a = IrBlock::new(TypedName {
            identifier: "ScreenA".into(),
            kind: TypeRef { type_name: "Screen".into(), optional_variant: None },
        });

        doc.screens.insert("ScreenB".into(), screen_b);
        doc.screens.insert("ScreenA".into(), screen_a);
        doc.screen_order = vec!["ScreenB".into(), "ScreenA".into()];

        let names: Vec<_> = doc.all_blocks().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["ScreenB", "ScreenA"]);
    }
}
