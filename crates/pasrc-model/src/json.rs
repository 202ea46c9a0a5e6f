//! Hand-rolled JSON views of the model types that don't carry a `serde`
//! derive of their own (§9, "JSON extension data" — extension bags stay
//! opaque `serde_json::Map`s; only the typed fields around them are
//! projected explicitly here, one direction at a time). Shared between
//! `pasrc-layout` (source-tree sidecars) and `pasrc-pkg` (the PKG's own
//! `Templates.json`/editor-state entries), since both sides use the same
//! wire shape for these types.

use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::{ControlState, CustomPropertyDef, PropertyState, ScopeRule, TemplateState};

pub fn scope_rule_to_json(rule: &ScopeRule) -> JsonValue {
    let mut map = JsonMap::new();
    map.insert("name".into(), JsonValue::String(rule.name.clone()));
    if let Some(v) = &rule.default_rule {
        map.insert("defaultRule".into(), JsonValue::String(v.clone()));
    }
    if let Some(v) = &rule.scope_property_data_type {
        map.insert("scopePropertyDataType".into(), JsonValue::String(v.clone()));
    }
    if let Some(v) = rule.parameter_index {
        map.insert("parameterIndex".into(), JsonValue::from(v));
    }
    if let Some(v) = &rule.parent_property_name {
        map.insert("parentPropertyName".into(), JsonValue::String(v.clone()));
    }
    JsonValue::Object(map)
}

pub fn scope_rule_from_json(v: &JsonValue) -> ScopeRule {
    ScopeRule {
        name: v.get("name").and_then(JsonValue::as_str).unwrap_or_default().to_string(),
        default_rule: v.get("defaultRule").and_then(JsonValue::as_str).map(str::to_string),
        scope_property_data_type: v
            .get("scopePropertyDataType")
            .and_then(JsonValue::as_str)
            .map(str::to_string),
        parameter_index: v.get("parameterIndex").and_then(JsonValue::as_u64).map(|n| n as u32),
        parent_property_name: v.get("parentPropertyName").and_then(JsonValue::as_str).map(str::to_string),
    }
}

pub fn custom_property_to_json(def: &CustomPropertyDef) -> JsonValue {
    serde_json::json!({
        "isFunctionType": def.is_function_type,
        "scopeRules": def.scope_rules.iter().map(scope_rule_to_json).collect::<Vec<_>>(),
    })
}

pub fn custom_property_from_json(v: &JsonValue) -> CustomPropertyDef {
    CustomPropertyDef {
        is_function_type: v.get("isFunctionType").and_then(JsonValue::as_bool).unwrap_or(false),
        scope_rules: v
            .get("scopeRules")
            .and_then(JsonValue::as_array)
            .map(|arr| arr.iter().map(scope_rule_from_json).collect())
            .unwrap_or_default(),
    }
}

/// Projects a [`TemplateState`] into the PKG template JSON shape: typed
/// fields at the top level, `extension_data` spliced back in beside them
/// (§9, "JSON extension data" — never re-serialized through a typed shape).
pub fn template_to_json(template: &TemplateState) -> JsonValue {
    let mut map = template.extension_data.clone();
    map.insert("name".into(), JsonValue::String(template.name.clone()));
    if let Some(display) = &template.display_name {
        map.insert("displayName".into(), JsonValue::String(display.clone()));
    }
    map.insert(
        "isComponentTemplate".into(),
        JsonValue::Bool(template.is_component_template),
    );

    let mut props = JsonMap::new();
    for (name, def) in &template.custom_properties {
        props.insert(name.clone(), custom_property_to_json(def));
    }
    map.insert("customProperties".into(), JsonValue::Object(props));

    JsonValue::Object(map)
}

pub fn template_from_json(v: &JsonValue) -> TemplateState {
    let mut extension_data = v.as_object().cloned().unwrap_or_default();

    let name = extension_data
        .remove("name")
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    let display_name = extension_data.remove("displayName").and_then(|v| v.as_str().map(str::to_string));
    let is_component_template = extension_data
        .remove("isComponentTemplate")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    let mut custom_properties = IndexMap::new();
    if let Some(JsonValue::Object(props)) = extension_data.remove("customProperties") {
        for (name, def) in props {
            custom_properties.insert(name, custom_property_from_json(&def));
        }
    }

    TemplateState {
        name,
        display_name,
        is_component_template,
        custom_properties,
        extension_data,
    }
}

pub fn property_state_to_json(state: &PropertyState) -> JsonValue {
    let mut map = state.extension_data.clone();
    map.insert("propertyName".into(), JsonValue::String(state.property_name.clone()));
    map.insert("ruleProviderType".into(), JsonValue::String(state.rule_provider_type.clone()));
    if let Some(name_map) = &state.name_map {
        map.insert("nameMap".into(), name_map.clone());
    }
    JsonValue::Object(map)
}

pub fn property_state_from_json(v: &JsonValue) -> PropertyState {
    let mut extension_data = v.as_object().cloned().unwrap_or_default();
    let property_name = extension_data
        .remove("propertyName")
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    let rule_provider_type = extension_data
        .remove("ruleProviderType")
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "Unknown".to_string());
    let name_map = extension_data.remove("nameMap");

    PropertyState {
        property_name,
        name_map,
        rule_provider_type,
        extension_data,
    }
}

pub fn control_state_to_json(state: &ControlState) -> JsonValue {
    let mut map = state.extension_data.clone();
    map.insert("name".into(), JsonValue::String(state.name.clone()));
    map.insert("topParentName".into(), JsonValue::String(state.top_parent_name.clone()));
    map.insert("publishOrderIndex".into(), JsonValue::from(state.publish_order_index));
    map.insert("parentIndex".into(), JsonValue::from(state.parent_index));
    map.insert("styleName".into(), JsonValue::String(state.style_name.clone()));
    map.insert(
        "properties".into(),
        JsonValue::Array(state.properties.iter().map(property_state_to_json).collect()),
    );
    if let Some(v) = state.is_component_definition {
        map.insert("isComponentDefinition".into(), JsonValue::Bool(v));
    }
    if state.is_test_suite {
        map.insert("isTestSuite".into(), JsonValue::Bool(true));
    }
    if let Some(v) = &state.gallery_template_child_name {
        map.insert("galleryTemplateChildName".into(), JsonValue::String(v.clone()));
    }
    JsonValue::Object(map)
}

pub fn control_state_from_json(v: &JsonValue) -> ControlState {
    let mut extension_data = v.as_object().cloned().unwrap_or_default();

    let name = extension_data.remove("name").and_then(|v| v.as_str().map(str::to_string)).unwrap_or_default();
    let top_parent_name = extension_data
        .remove("topParentName")
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    let publish_order_index = extension_data.remove("publishOrderIndex").and_then(|v| v.as_i64()).unwrap_or(0);
    let parent_index = extension_data.remove("parentIndex").and_then(|v| v.as_i64()).unwrap_or(-1);
    let style_name = extension_data
        .remove("styleName")
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    let properties = match extension_data.remove("properties") {
        Some(JsonValue::Array(arr)) => arr.iter().map(property_state_from_json).collect(),
        _ => Vec::new(),
    };
    let is_component_definition = extension_data.remove("isComponentDefinition").and_then(|v| v.as_bool());
    let is_test_suite = extension_data.remove("isTestSuite").and_then(|v| v.as_bool()).unwrap_or(false);
    let gallery_template_child_name = extension_data
        .remove("galleryTemplateChildName")
        .and_then(|v| v.as_str().map(str::to_string));

    ControlState {
        name,
        top_parent_name,
        publish_order_index,
        parent_index,
        style_name,
        properties,
        extension_data,
        is_component_definition,
        is_test_suite,
        gallery_template_child_name,
    }
}

/// Recursively rebuilds a JSON value with object keys sorted ordinally, so
/// two semantically-equal documents serialize identically regardless of the
/// order fields were produced in (§4.5, `Other/` canonicalization).
#[must_use]
pub fn canonicalize(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = JsonMap::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            JsonValue::Object(sorted)
        }
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Fixed two-space indentation, canonicalized key order, trailing newline —
/// the deterministic rendering every writer in this workspace uses.
#[must_use]
pub fn canonical_bytes(value: &JsonValue) -> Vec<u8> {
    let mut bytes = serde_json::to_vec_pretty(&canonicalize(value)).unwrap_or_default();
    bytes.push(b'\n');
    bytes
}

#[cfg(test)]
mod test {
    use super::*;

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
