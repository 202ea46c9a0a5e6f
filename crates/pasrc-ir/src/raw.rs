//! The PKG-side control shape (§4.3): what `pasrc-pkg` parses out of a
//! screen/component's control JSON, and what it serializes back after
//! combine. Intentionally flat and untyped where the PKG format itself is
//! untyped (`extension_data`) — only the fields split/combine actually
//! touch are broken out.

use serde_json::Map as JsonMap;
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PkgRule {
    pub property: String,
    pub expression: String,
    pub name_map: Option<JsonValue>,
    pub rule_provider_type: Option<String>,
    pub extension_data: JsonMap<String, JsonValue>,
}

/// The `lastModifiedTimestamp` carried by a component definition's rules,
/// reattached on combine (§4.3 combine step 6).
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDefinitionInfo {
    pub last_modified_timestamp: Option<JsonValue>,
    pub children: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PkgControl {
    pub name: String,
    pub control_type: String,
    pub variant_name: Option<String>,
    pub unique_id: Option<i64>,
    pub style_name: Option<String>,
    pub is_component_definition: bool,
    /// Recognized marker for a test-suite subtree (I1/§4.3 step 9, §8 P7):
    /// a control tagged `isTestSuite` and every descendant underneath it
    /// are exempt from the duplicate-name check.
    pub is_test_suite: bool,
    pub gallery_template_child_name: Option<String>,
    pub publish_order_index: i64,
    pub rules: Vec<PkgRule>,
    pub children: Vec<PkgControl>,
    pub extension_data: JsonMap<String, JsonValue>,
    pub component_definition_info: Option<ComponentDefinitionInfo>,
}

impl PkgControl {
    #[must_use]
    pub fn new(name: impl Into<String>, control_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            control_type: control_type.into(),
            variant_name: None,
            unique_id: None,
            style_name: None,
            is_component_definition: false,
            is_test_suite: false,
            gallery_template_child_name: None,
            publish_order_index: 0,
            rules: Vec::new(),
            children: Vec::new(),
            extension_data: JsonMap::new(),
            component_definition_info: None,
        }
    }

    #[must_use]
    pub fn z_index(&self) -> f64 {
        self.rules
            .iter()
            .find(|r| r.property == "ZIndex")
            .and_then(|r| r.expression.trim().parse::<f64>().ok())
            .unwrap_or(-1.0)
    }
}
