//! Combine: `(IrBlock, ControlState)` → PKG control JSON (§4.3 "Combine"),
//! the exact inverse of split.

use indexmap::IndexMap;

use pasrc_model::{ControlState, CustomPropertyDef, Entropy, IrBlock, ScopeRule, TemplateStore};

use crate::error::Error;
use crate::raw::{ComponentDefinitionInfo, PkgControl, PkgRule};

pub struct CombineContext<'a> {
    pub templates: &'a mut TemplateStore,
    pub editor_states: &'a IndexMap<String, ControlState>,
    pub entropy: &'a mut Entropy,
}

pub fn combine(block: &IrBlock, ctx: &mut CombineContext<'_>) -> Result<PkgControl, Error> {
    // Step 1: recurse, then sort ascending by parentIndex; missing state
    // sorts first (`-1`), ties stable.
    let mut children_with_idx: Vec<(PkgControl, i64)> = Vec::with_capacity(block.children.len());
    for child in &block.children {
        let idx = ctx
            .editor_states
            .get(&child.name.identifier)
            .map_or(-1, |s| s.parent_index);
        let child_control = combine(child, ctx)?;
        children_with_idx.push((child_control, idx));
    }
    children_with_idx.sort_by_key(|(_, idx)| *idx);
    let children: Vec<PkgControl> = children_with_idx.into_iter().map(|(c, _)| c).collect();

    let identifier = &block.name.identifier;
    let state = ctx.editor_states.get(identifier).cloned();

    // Step 2.
    ctx.templates.get_or_synthesize(&block.name.kind.type_name);

    // Step 3.
    let unique_id = match ctx.entropy.control_unique_ids.get(identifier) {
        Some(id) => *id,
        None => {
            let id = ctx.entropy.next_unique_id();
            ctx.entropy.control_unique_ids.insert(identifier.clone(), id);
            id
        }
    };

    // Step 4: plain PropNode rules.
    let mut rules = Vec::with_capacity(block.properties.len());
    for prop in &block.properties {
        let matching_state = state
            .as_ref()
            .and_then(|s| s.properties.iter().find(|p| p.property_name == prop.identifier));

        rules.push(PkgRule {
            property: prop.identifier.clone(),
            expression: prop.expression.clone(),
            name_map: matching_state.and_then(|s| s.name_map.clone()),
            rule_provider_type: Some(
                matching_state
                    .map(|s| s.rule_provider_type.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
            ),
            extension_data: matching_state.map(|s| s.extension_data.clone()).unwrap_or_default(),
        });
    }

    let is_component_definition = state.as_ref().and_then(|s| s.is_component_definition).unwrap_or(false);

    // UnsupportedChange (step 7): a plain property absent from the recorded
    // state on a component definition is a new property.
    if is_component_definition {
        if let Some(state) = &state {
            for prop in &block.properties {
                if state.property_order_index(&prop.identifier).is_none() {
                    return Err(Error::UnsupportedChange(prop.identifier.clone()));
                }
            }
        }
    }

    // Function nodes (component definition case), and the instance-side
    // dummy-rule case when the IR carries no function nodes but the
    // template still has function-typed custom properties.
    if !block.functions.is_empty() {
        for func in &block.functions {
            rules.push(rule_from_func_node(func));
            let extra = rewrite_scope_rules(ctx.templates, &block.name.kind.type_name, func)?;
            rules.extend(extra);
        }
    } else {
        let template = ctx.templates.get(&block.name.kind.type_name).unwrap().clone();
        for (prop_name, def) in &template.custom_properties {
            if !def.is_function_type {
                continue;
            }
            rules.extend(dummy_rules_for(prop_name, def));
        }
    }

    // Step 5: reorder to the recorded property order; unrecorded sort last,
    // stably.
    if let Some(state) = &state {
        rules.sort_by_key(|r| state.property_order_index(&r.property).unwrap_or(usize::MAX));
    }

    let mut control = PkgControl::new(identifier.clone(), block.name.kind.type_name.clone());
    control.variant_name = block.name.kind.optional_variant.clone();
    control.unique_id = Some(unique_id);
    control.rules = rules;
    control.children = children;
    control.is_component_definition = is_component_definition;

    if let Some(state) = &state {
        control.style_name = Some(state.style_name.clone());
        control.gallery_template_child_name = state.gallery_template_child_name.clone();
        control.publish_order_index = state.publish_order_index;
        control.extension_data = state.extension_data.clone();
        control.is_test_suite = state.is_test_suite;
    } else {
        // Preserved as-is, open question (§9): controls with no recorded
        // state get a synthesized `StyleName` rather than an empty one.
        control.style_name = Some(format!("default{}Style", block.name.kind.type_name));
    }

    // Step 6.
    if is_component_definition {
        let last_modified_timestamp = state
            .as_ref()
            .and_then(|s| s.extension_data.get("lastModifiedTimestamp"))
            .cloned();
        control.component_definition_info = Some(ComponentDefinitionInfo {
            last_modified_timestamp,
            children: control.children.iter().map(|c| c.name.clone()).collect(),
        });

        if let Some(template) = ctx.templates.get_mut(&block.name.kind.type_name) {
            template.is_component_template = true;
        }
    }

    Ok(control)
}

fn rule_from_func_node(func: &pasrc_model::FuncNode) -> PkgRule {
    let this_property = func
        .metadata
        .iter()
        .find(|m| m.identifier == "ThisProperty")
        .map(|m| m.default_expression.clone())
        .unwrap_or_default();

    PkgRule {
        property: func.identifier.clone(),
        expression: this_property,
        ..PkgRule::default()
    }
}

fn dummy_rules_for(prop_name: &str, def: &CustomPropertyDef) -> Vec<PkgRule> {
    def.scope_rules
        .iter()
        .map(|rule| {
            let property = if rule.parent_property_name.is_none() {
                prop_name.to_string()
            } else {
                format!("{prop_name}_{}", rule.name)
            };
            PkgRule {
                property,
                expression: rule.default_rule.clone().unwrap_or_default(),
                ..PkgRule::default()
            }
        })
        .collect()
}

/// Emits the `<funcName>_<argId>` rules for a `FuncNode`'s non-`ThisProperty`
/// metadata entries, and rewrites the template's scope-rule fields from the
/// IR's args/metadata (§4.3 combine step 4).
fn rewrite_scope_rules(
    templates: &mut TemplateStore,
    type_name: &str,
    func: &pasrc_model::FuncNode,
) -> Result<Vec<PkgRule>, Error> {
    let this_property_present = func.metadata.iter().any(|m| m.identifier == "ThisProperty");
    if !this_property_present {
        return Err(Error::MissingThisProperty(func.identifier.clone()));
    }

    let template = templates.get_or_synthesize(type_name);
    let existing = template.custom_properties.get(&func.identifier).cloned();

    if let Some(existing) = &existing {
        for arg in &func.args {
            if !existing.scope_rules.iter().any(|r| r.name == arg.identifier) {
                return Err(Error::UnknownScopeParameter {
                    function: func.identifier.clone(),
                    parameter: arg.identifier.clone(),
                });
            }
        }
    }

    let mut scope_rules = Vec::with_capacity(func.args.len() + 1);
    let this_default = func
        .metadata
        .iter()
        .find(|m| m.identifier == "ThisProperty")
        .map(|m| m.default_expression.clone());
    scope_rules.push(ScopeRule {
        name: func.identifier.clone(),
        default_rule: this_default,
        scope_property_data_type: None,
        parameter_index: None,
        parent_property_name: None,
    });

    for (idx, arg) in func.args.iter().enumerate() {
        let default_rule = func
            .metadata
            .iter()
            .find(|m| m.identifier == arg.identifier)
            .map(|m| m.default_expression.clone());
        scope_rules.push(ScopeRule {
            name: arg.identifier.clone(),
            default_rule,
            scope_property_data_type: Some(arg.kind.type_name.clone()),
            parameter_index: Some(idx as u32),
            parent_property_name: Some(func.identifier.clone()),
        });
    }

    template.custom_properties.insert(
        func.identifier.clone(),
        CustomPropertyDef { is_function_type: true, scope_rules },
    );

    let mut extra_rules = Vec::with_capacity(func.args.len());
    for arg in &func.args {
        let default_rule = func
            .metadata
            .iter()
            .find(|m| m.identifier == arg.identifier)
            .map(|m| m.default_expression.clone())
            .unwrap_or_default();
        extra_rules.push(PkgRule {
            property: format!("{}_{}", func.identifier, arg.identifier),
            expression: default_rule,
            ..PkgRule::default()
        });
    }

    Ok(extra_rules)
}

#[cfg(test)]
mod test {
    use super::*;
    use pasrc_model::{normalize_expression, ArgMetadata, FuncNode, PropNode, TypeRef, TypedName};

    fn block_with_functions() -> IrBlock {
        let mut block = IrBlock::new(TypedName {
            identifier: "Button1".into(),
            kind: TypeRef { type_name: "Gallery/Button".into(), optional_variant: None },
        });
        block.functions.push(FuncNode {
            identifier: "OnSelect".into(),
            args: vec![TypedName {
                identifier: "record".into(),
                kind: TypeRef { type_name: "Record".into(), optional_variant: None },
            }],
            metadata: vec![
                ArgMetadata { identifier: "ThisProperty".into(), default_expression: normalize_expression("Navigate(Screen1)") },
                ArgMetadata { identifier: "record".into(), default_expression: normalize_expression("ThisItem") },
            ],
        });
        block
    }

    #[test]
    fn function_node_combines_into_rules_and_scope_rules() {
        let mut templates = TemplateStore::new();
        let editor_states = IndexMap::new();
        let mut entropy = Entropy::new();
        let mut ctx = CombineContext { templates: &mut templates, editor_states: &editor_states, entropy: &mut entropy };

        let block = block_with_functions();
        let control = combine(&block, &mut ctx).unwrap();

        assert!(control.rules.iter().any(|r| r.property == "OnSelect" && r.expression == "Navigate(Screen1)"));
        assert!(control.rules.iter().any(|r| r.property == "OnSelect_record" && r.expression == "ThisItem"));

        let template = ctx.templates.get("Gallery/Button").unwrap();
        let def = &template.custom_properties["OnSelect"];
        assert!(def.is_function_type);
        assert_eq!(def.scope_rules.len(), 2);
    }

    #[test]
    fn missing_this_property_is_fatal() {
        let mut templates = TemplateStore::new();
        let editor_states = IndexMap::new();
        let mut entropy = Entropy::new();
        let mut ctx = CombineContext { templates: &mut templates, editor_states: &editor_states, entropy: &mut entropy };

        let mut block = block_with_functions();
        block.functions[0].metadata.retain(|m| m.identifier != "ThisProperty");

        let err = combine(&block, &mut ctx).unwrap_err();
        assert!(matches!(err, Error::MissingThisProperty(name) if name == "OnSelect"));
    }

    #[test]
    fn is_test_suite_marker_round_trips_through_combine() {
        let mut templates = TemplateStore::new();
        let mut editor_states = IndexMap::new();
        let mut entropy = Entropy::new();

        let mut state = ControlState::new("TestCase1", "TestCase1");
        state.is_test_suite = true;
        editor_states.insert("TestCase1".into(), state);

        let mut ctx = CombineContext { templates: &mut templates, editor_states: &editor_states, entropy: &mut entropy };

        let block = IrBlock::new(TypedName {
            identifier: "TestCase1".into(),
            kind: TypeRef { type_name: "Test/TestCase".into(), optional_variant: None },
        });

        let control = combine(&block, &mut ctx).unwrap();
        assert!(control.is_test_suite);
    }

    #[test]
    fn new_property_on_component_definition_is_unsupported_change() {
        let mut templates = TemplateStore::new();
        let mut editor_states = IndexMap::new();
        let mut entropy = Entropy::new();

        let mut state = ControlState::new("Button1", "Button1");
        state.is_component_definition = Some(true);
        editor_states.insert("Button1".into(), state);

        let mut ctx = CombineContext { templates: &mut templates, editor_states: &editor_states, entropy: &mut entropy };

        let mut block = IrBlock::new(TypedName {
            identifier: "Button1".into(),
            kind: TypeRef { type_name: "Gallery/Button".into(), optional_variant: None },
        });
        block.properties.push(PropNode { identifier: "NewProp".into(), expression: "1".into() });

        let err = combine(&block, &mut ctx).unwrap_err();
        assert!(matches!(err, Error::UnsupportedChange(name) if name == "NewProp"));
    }
}
