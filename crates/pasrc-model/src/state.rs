//! The editor-state sidecar (§3): everything that is presentation metadata
//! rather than logical structure, keyed by control name in
//! `Document::editor_states`.

use serde_json::Map as JsonMap;
use serde_json::Value as JsonValue;

/// Per-control presentation metadata. Mutated in-place by the combine pass
/// to re-attach extension data (§3 Lifecycles).
#[derive(Debug, Clone, PartialEq)]
pub struct ControlState {
    pub name: String,
    pub top_parent_name: String,
    pub publish_order_index: i64,
    /// Position among siblings at pack time (I4); `-1` for controls lacking
    /// recorded state.
    pub parent_index: i64,
    pub style_name: String,
    /// Order in which this control's properties were found at unpack time;
    /// restored verbatim on combine (I3, P6).
    pub properties: Vec<PropertyState>,
    pub extension_data: JsonMap<String, JsonValue>,
    pub is_component_definition: Option<bool>,
    /// Carries the PKG-side `isTestSuite` marker (§4.3 step 9, I1) across a
    /// pack so a genuine test-suite root doesn't lose the flag that exempts
    /// it and its descendants from the duplicate-name check.
    pub is_test_suite: bool,
    pub gallery_template_child_name: Option<String>,
}

impl ControlState {
    #[must_use]
    pub fn new(name: impl Into<String>, top_parent_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            top_parent_name: top_parent_name.into(),
            publish_order_index: 0,
            parent_index: -1,
            style_name: String::new(),
            properties: Vec::new(),
            extension_data: JsonMap::new(),
            is_component_definition: None,
            is_test_suite: false,
            gallery_template_child_name: None,
        }
    }

    /// Index of `property_name` in `self.properties`, if recorded. Drives
    /// I3/P6 property-order restoration during combine.
    #[must_use]
    pub fn property_order_index(&self, property_name: &str) -> Option<usize> {
        self.properties
            .iter()
            .position(|p| p.property_name == property_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyState {
    pub property_name: String,
    pub name_map: Option<JsonValue>,
    pub rule_provider_type: String,
    pub extension_data: JsonMap<String, JsonValue>,
}

impl PropertyState {
    #[must_use]
    pub fn new(property_name: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            name_map: None,
            rule_provider_type: "Unknown".to_string(),
            extension_data: JsonMap::new(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn property_order_index_smoke() {
        let mut state = ControlState::new("Label1", "Screen1");
        state.properties.push(PropertyState::new("Text"));
        state.properties.push(PropertyState::new("X"));

        assert_eq!(state.property_order_index("X"), Some(1));
        assert_eq!(state.property_order_index("Missing"), None);
    }
}
