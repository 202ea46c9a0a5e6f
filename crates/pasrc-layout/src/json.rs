//! Source-tree-specific JSON helpers. The typed projections for
//! `TemplateState`/`ControlState`/etc. live in `pasrc_model::json` (shared
//! with `pasrc-pkg`, which projects the same shapes out of the archive);
//! only `Other/` canonicalization is specific to this crate.

pub use pasrc_model::json::{
    control_state_from_json, control_state_to_json, template_from_json, template_to_json,
};

use serde_json::Value as JsonValue;

/// Recursively rebuilds a JSON value with object keys sorted ordinally, so
/// two semantically-equal documents serialize identically regardless of the
/// order fields were produced in (§4.5, `Other/` canonicalization).
#[must_use]
pub fn canonicalize(value: &JsonValue) -> JsonValue {
    pasrc_model::json::canonicalize(value)
}

#[cfg(test)]
mod test {
    use super::*;
    use pasrc_model::{ControlState, CustomPropertyDef, PropertyState, TemplateState};

    #[test]
    fn canonicalize_sorts_nested_keys() {
        let value = serde_json::json!({ "b": 1, "a": { "z": 1, "y": 2 } });
        let sorted = canonicalize(&value);
        let keys: Vec<&String> = sorted.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn control_state_json_round_trips() {
        let mut state = ControlState::new("Label1", "Screen1");
        state.style_name = "defaultLabelStyle".into();
        state.properties.push(PropertyState::new("Text"));
        state.extension_data.insert("extra".into(), JsonValue::Bool(true));

        let json = control_state_to_json(&state);
        let back = control_state_from_json(&json);
        assert_eq!(back, state);
    }

    #[test]
    fn template_json_round_trips() {
        let mut template = TemplateState::new("Button");
        template.display_name = Some("Classic Button".into());
        template
            .custom_properties
            .insert("OnSelect".into(), CustomPropertyDef { is_function_type: true, scope_rules: vec![] });

        let json = template_to_json(&template);
        let back = template_from_json(&json);
        assert_eq!(back, template);
    }
}
