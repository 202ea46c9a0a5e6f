//! PKG-side JSON shape for [`PkgControl`] (§4.6: "the loader ... deserializes
//! recognized JSON ... by a filename→kind lookup table"). `pasrc-pkg` is the
//! only consumer; kept here because the type itself lives in this crate.

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::raw::{ComponentDefinitionInfo, PkgControl, PkgRule};

fn rule_to_json(rule: &PkgRule) -> JsonValue {
    let mut map = rule.extension_data.clone();
    map.insert("property".into(), JsonValue::String(rule.property.clone()));
    map.insert("invariantScript".into(), JsonValue::String(rule.expression.clone()));
    if let Some(name_map) = &rule.name_map {
        map.insert("nameMap".into(), name_map.clone());
    }
    if let Some(provider) = &rule.rule_provider_type {
        map.insert("ruleProviderType".into(), JsonValue::String(provider.clone()));
    }
    JsonValue::Object(map)
}

fn rule_from_json(v: &JsonValue) -> PkgRule {
    let mut extension_data = v.as_object().cloned().unwrap_or_default();
    let property = extension_data.remove("property").and_then(|v| v.as_str().map(str::to_string)).unwrap_or_default();
    let expression = extension_data
        .remove("invariantScript")
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    let name_map = extension_data.remove("nameMap");
    let rule_provider_type = extension_data.remove("ruleProviderType").and_then(|v| v.as_str().map(str::to_string));

    PkgRule { property, expression, name_map, rule_provider_type, extension_data }
}

fn component_definition_info_to_json(info: &ComponentDefinitionInfo) -> JsonValue {
    let mut map = JsonMap::new();
    if let Some(ts) = &info.last_modified_timestamp {
        map.insert("lastModifiedTimestamp".into(), ts.clone());
    }
    map.insert(
        "children".into(),
        JsonValue::Array(info.children.iter().cloned().map(JsonValue::String).collect()),
    );
    JsonValue::Object(map)
}

fn component_definition_info_from_json(v: &JsonValue) -> ComponentDefinitionInfo {
    ComponentDefinitionInfo {
        last_modified_timestamp: v.get("lastModifiedTimestamp").cloned(),
        children: v
            .get("children")
            .and_then(JsonValue::as_array)
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default(),
    }
}

pub fn control_to_json(control: &PkgControl) -> JsonValue {
    let mut map = control.extension_data.clone();
    map.insert("name".into(), JsonValue::String(control.name.clone()));
    map.insert("controlType".into(), JsonValue::String(control.control_type.clone()));
    if let Some(v) = &control.variant_name {
        map.insert("variantName".into(), JsonValue::String(v.clone()));
    }
    if let Some(v) = control.unique_id {
        map.insert("controlUniqueId".into(), JsonValue::String(v.to_string()));
    }
    if let Some(v) = &control.style_name {
        map.insert("styleName".into(), JsonValue::String(v.clone()));
    }
    map.insert("isComponentDefinition".into(), JsonValue::Bool(control.is_component_definition));
    if control.is_test_suite {
        map.insert("isTestSuite".into(), JsonValue::Bool(true));
    }
    if let Some(v) = &control.gallery_template_child_name {
        map.insert("galleryTemplateChildName".into(), JsonValue::String(v.clone()));
    }
    map.insert("publishOrderIndex".into(), JsonValue::from(control.publish_order_index));
    map.insert(
        "rules".into(),
        JsonValue::Array(control.rules.iter().map(rule_to_json).collect()),
    );
    map.insert(
        "children".into(),
        JsonValue::Array(control.children.iter().map(control_to_json).collect()),
    );
    if let Some(info) = &control.component_definition_info {
        map.insert("componentDefinitionInfo".into(), component_definition_info_to_json(info));
    }
    JsonValue::Object(map)
}

pub fn control_from_json(v: &JsonValue) -> PkgControl {
    let mut extension_data = v.as_object().cloned().unwrap_or_default();

    let name = extension_data.remove("name").and_then(|v| v.as_str().map(str::to_string)).unwrap_or_default();
    let control_type = extension_data
        .remove("controlType")
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    let variant_name = extension_data.remove("variantName").and_then(|v| v.as_str().map(str::to_string));
    let unique_id = extension_data
        .remove("controlUniqueId")
        .and_then(|v| v.as_str().map(str::to_string))
        .and_then(|s| s.parse::<i64>().ok());
    let style_name = extension_data.remove("styleName").and_then(|v| v.as_str().map(str::to_string));
    let is_component_definition =
        extension_data.remove("isComponentDefinition").and_then(|v| v.as_bool()).unwrap_or(false);
    let is_test_suite = extension_data.remove("isTestSuite").and_then(|v| v.as_bool()).unwrap_or(false);
    let gallery_template_child_name =
        extension_data.remove("galleryTemplateChildName").and_then(|v| v.as_str().map(str::to_string));
    let publish_order_index = extension_data.remove("publishOrderIndex").and_then(|v| v.as_i64()).unwrap_or(0);

    let rules = match extension_data.remove("rules") {
        Some(JsonValue::Array(arr)) => arr.iter().map(rule_from_json).collect(),
        _ => Vec::new(),
    };
    let children = match extension_data.remove("children") {
        Some(JsonValue::Array(arr)) => arr.iter().map(control_from_json).collect(),
        _ => Vec::new(),
    };
    let component_definition_info =
        extension_data.remove("componentDefinitionInfo").as_ref().map(component_definition_info_from_json);

    PkgControl {
        name,
        control_type,
        variant_name,
        unique_id,
        style_name,
        is_component_definition,
        is_test_suite,
        gallery_template_child_name,
        publish_order_index,
        rules,
        children,
        extension_data,
        component_definition_info,
    }
}
