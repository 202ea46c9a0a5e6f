//! Control templates (§3 `TemplateState`) and their registry (§2
//! `TemplateStore`). The original system treats templates as document-wide
//! state reachable from many callers; here the registry is a plain owned
//! map on `Document`, passed explicitly wherever it's needed (§9, "Template
//! store singleton").

use indexmap::IndexMap;
use serde_json::Map as JsonMap;
use serde_json::Value as JsonValue;

/// One parameter of a function-typed custom property, i.e. a "scope rule".
/// `default_rule`/`scope_property_data_type`/`parameter_index`/
/// `parent_property_name` are cleared by split step 4 and rebuilt by combine
/// step 4 — kept `Option` so absence is always explicit (§9, "Mutability
/// through transforms").
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScopeRule {
    pub name: String,
    pub default_rule: Option<String>,
    pub scope_property_data_type: Option<String>,
    pub parameter_index: Option<u32>,
    pub parent_property_name: Option<String>,
}

/// One custom property on a template. Function-typed ones carry the scope
/// rules that become a `FuncNode`'s args on split.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CustomPropertyDef {
    pub is_function_type: bool,
    pub scope_rules: Vec<ScopeRule>,
}

impl CustomPropertyDef {
    /// Every name this property hides from plain `PropNode` emission: its
    /// own scope-rule names for an instance, or (handled by the caller,
    /// since definitions also hide the property's own name) for a
    /// definition.
    pub fn scope_rule_names(&self) -> impl Iterator<Item = &str> {
        self.scope_rules.iter().map(|r| r.name.as_str())
    }
}

/// A faithful reflection of the PKG's template JSON plus two local flags.
/// Templates are shared (reference-style) between the store and any IR
/// references in spirit; logical ownership lives in the store (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateState {
    /// Internal/original template name, used as the store key.
    pub name: String,
    pub display_name: Option<String>,
    pub is_component_template: bool,
    pub custom_properties: IndexMap<String, CustomPropertyDef>,
    /// Everything else in the PKG's template JSON, unknown to this tool but
    /// required for round-trip (§9, "JSON extension data").
    pub extension_data: JsonMap<String, JsonValue>,
}

impl TemplateState {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            is_component_template: false,
            custom_properties: IndexMap::new(),
            extension_data: JsonMap::new(),
        }
    }

    /// `kind.typeName` per §4.3 split step 6: the template's display name if
    /// present, otherwise its internal name.
    #[must_use]
    pub fn effective_type_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

/// Registry of control templates, built-in and discovered, keyed by name
/// (§2 `TemplateStore`). Case-ordinal (exact-case) keys.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: IndexMap<String, TemplateState>,
}

impl TemplateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TemplateState> {
        self.templates.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut TemplateState> {
        self.templates.get_mut(name)
    }

    /// Registers a newly-discovered template, or returns the existing one
    /// unchanged if `name` is already present (§4.3 split step 7: "new
    /// registrations copy the PKG template; existing ones gain
    /// `isComponentTemplate`...").
    pub fn register_or_get_mut(&mut self, name: &str, make: impl FnOnce() -> TemplateState) -> &mut TemplateState {
        self.templates
            .entry(name.to_string())
            .or_insert_with(make)
    }

    /// Synthesizes a default (empty) template for `type_name` if the store
    /// has no entry for it (§4.3 combine step 2).
    pub fn get_or_synthesize(&mut self, type_name: &str) -> &mut TemplateState {
        self.templates
            .entry(type_name.to_string())
            .or_insert_with(|| TemplateState::new(type_name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TemplateState)> {
        self.templates.iter()
    }

    pub fn insert(&mut self, template: TemplateState) {
        self.templates.insert(template.name.clone(), template);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn register_or_get_keeps_existing() {
        let mut store = TemplateStore::new();
        store.register_or_get_mut("Button", || {
            let mut t = TemplateState::new("Button");
            t.display_name = Some("Classic Button".into());
            t
        });

        let entry = store.register_or_get_mut("Button", || TemplateState::new("Button"));
        entry.is_component_template = true;

        assert_eq!(
            store.get("Button").unwrap().display_name.as_deref(),
            Some("Classic Button")
        );
        assert!(store.get("Button").unwrap().is_component_template);
    }

    #[test]
    fn synthesize_default_for_unknown_type() {
        let mut store = TemplateStore::new();
        let t = store.get_or_synthesize("MyComponent");
        assert_eq!(t.name, "MyComponent");
        assert!(!t.is_component_template);
    }
}
