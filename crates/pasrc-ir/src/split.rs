//! Split: PKG control JSON → `(IrBlock, ControlState)` (§4.3 "Split").

use indexmap::IndexMap;

use pasrc_model::{
    normalize_expression, ArgMetadata, ControlState, Entropy, FuncNode, IrBlock, PropNode,
    PropertyState, TemplateState, TemplateStore, TypeRef, TypedName,
};

use crate::error::Error;
use crate::raw::PkgControl;

/// Everything split needs that outlives a single control, threaded through
/// the recursion instead of being rebuilt per call.
pub struct SplitContext<'a> {
    pub templates: &'a mut TemplateStore,
    pub editor_states: &'a mut IndexMap<String, ControlState>,
    pub entropy: &'a mut Entropy,
    /// A control whose raw template lookup misses the store gets this
    /// snapshot registered verbatim (§4.3 split step 7, "new registrations
    /// copy the PKG template").
    pub template_snapshots: &'a IndexMap<String, TemplateState>,
}

/// Splits one control subtree rooted at `control`, inserting every
/// descendant's `ControlState` into `ctx.editor_states` as a side effect.
/// `top_parent_name` is the screen/component root's name; `in_test_suite`
/// disables the I1 duplicate-name check for the subtree. A control can also
/// mark itself as a test-suite root via `control.is_test_suite` (the
/// recognizable marker §4.3 step 9 relies on), which flips the flag on for
/// itself and every descendant even when the caller passed `false`.
pub fn split(
    control: &PkgControl,
    top_parent_name: &str,
    parent_index: i64,
    in_test_suite: bool,
    ctx: &mut SplitContext<'_>,
) -> Result<IrBlock, Error> {
    let in_test_suite = in_test_suite || control.is_test_suite;

    // Step 1: recurse into children, then sort ascending by ZIndex (I4),
    // ties preserving input order (`sort_by` is stable).
    let mut children_with_z: Vec<(IrBlock, f64)> = Vec::with_capacity(control.children.len());
    for (idx, child) in control.children.iter().enumerate() {
        let child_ir = split(child, top_parent_name, idx as i64, in_test_suite, ctx)?;
        children_with_z.push((child_ir, child.z_index()));
    }
    children_with_z.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    let children: Vec<IrBlock> = children_with_z.into_iter().map(|(ir, _)| ir).collect();

    // Step 2/7: register or update the template.
    let is_component_definition = control.is_component_definition;
    ensure_template(ctx, control, is_component_definition);
    let template = ctx
        .templates
        .get(&control.control_type)
        .expect("just registered above");

    // Step 3: customPropsToHide.
    let custom_props_to_hide = custom_props_to_hide(template, is_component_definition);

    // Step 4: definitions synthesize one FuncNode per function-typed
    // custom property, clearing the scope-rule fields it consumes.
    let mut functions = Vec::new();
    if is_component_definition {
        let prop_names: Vec<String> = template
            .custom_properties
            .iter()
            .filter(|(_, def)| def.is_function_type)
            .map(|(name, _)| name.clone())
            .collect();

        for prop_name in prop_names {
            let func = build_func_node(ctx.templates.get_mut(&control.control_type).unwrap(), &prop_name);
            if let Some(func) = func {
                functions.push(func);
            }
        }
    }

    // Step 5: PropNode + PropertyState per rule, skipping hidden PropNodes.
    let mut properties = Vec::with_capacity(control.rules.len());
    let mut property_states = Vec::with_capacity(control.rules.len());
    for rule in &control.rules {
        if !custom_props_to_hide.contains(rule.property.as_str()) {
            properties.push(PropNode {
                identifier: rule.property.clone(),
                expression: normalize_expression(&rule.expression),
            });
        }

        property_states.push(PropertyState {
            property_name: rule.property.clone(),
            name_map: rule.name_map.clone(),
            rule_provider_type: rule
                .rule_provider_type
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            extension_data: rule.extension_data.clone(),
        });
    }

    // Step 6.
    let template = ctx.templates.get(&control.control_type).unwrap();
    let type_name = template
        .display_name
        .clone()
        .unwrap_or_else(|| template.name.clone());
    let optional_variant = control
        .variant_name
        .clone()
        .filter(|v| !v.is_empty());

    let mut block = IrBlock::new(TypedName {
        identifier: control.name.clone(),
        kind: TypeRef { type_name, optional_variant },
    });
    block.properties = properties;
    block.functions = functions;
    block.children = children;

    // Step 8.
    let unique_id = control.unique_id.unwrap_or_else(|| ctx.entropy.next_unique_id());
    ctx.entropy
        .control_unique_ids
        .insert(control.name.clone(), unique_id);

    // Step 9.
    let mut state = ControlState::new(control.name.clone(), top_parent_name.to_string());
    state.publish_order_index = control.publish_order_index;
    state.parent_index = parent_index;
    state.style_name = control.style_name.clone().unwrap_or_default();
    state.properties = property_states;
    state.extension_data = control.extension_data.clone();
    state.is_component_definition = Some(is_component_definition);
    state.is_test_suite = in_test_suite;
    state.gallery_template_child_name = control.gallery_template_child_name.clone();

    if let Some(info) = &control.component_definition_info {
        if let Some(ts) = &info.last_modified_timestamp {
            state
                .extension_data
                .insert("lastModifiedTimestamp".to_string(), ts.clone());
        }
    }

    if ctx.editor_states.contains_key(&control.name) && !in_test_suite {
        return Err(Error::DuplicateControlName(control.name.clone()));
    }
    ctx.editor_states.insert(control.name.clone(), state);

    Ok(block)
}

fn ensure_template(ctx: &mut SplitContext<'_>, control: &PkgControl, is_component_definition: bool) {
    if ctx.templates.get(&control.control_type).is_none() {
        let fresh = match ctx.template_snapshots.get(&control.control_type) {
            Some(snapshot) => snapshot.clone(),
            None => {
                log::warn!(
                    "control `{}` references template `{}` with no snapshot in Templates.json; synthesizing a fresh one",
                    control.name,
                    control.control_type
                );
                TemplateState::new(control.control_type.clone())
            }
        };
        ctx.templates.insert(fresh);
    }

    if is_component_definition {
        let template = ctx.templates.get_mut(&control.control_type).unwrap();
        template.is_component_template = true;

        if let Some(snapshot) = ctx.template_snapshots.get(&control.control_type) {
            for (name, def) in &snapshot.custom_properties {
                template.custom_properties.insert(name.clone(), def.clone());
            }
        }
    }
}

fn custom_props_to_hide(
    template: &pasrc_model::TemplateState,
    is_component_definition: bool,
) -> std::collections::HashSet<String> {
    let mut hide = std::collections::HashSet::new();

    for (prop_name, def) in &template.custom_properties {
        if !def.is_function_type {
            continue;
        }

        if is_component_definition {
            hide.insert(prop_name.clone());
        }

        for rule in &def.scope_rules {
            hide.insert(rule.name.clone());
        }
    }

    hide
}

/// Builds the `FuncNode` for one function-typed custom property, clearing
/// the scope-rule fields it consumed so combine can rebuild them without
/// duplication (§4.3 split step 4). The rule with no `parent_property_name`
/// is the property's own default ("ThisProperty"); the rest are its args.
fn build_func_node(template: &mut TemplateState, prop_name: &str) -> Option<FuncNode> {
    let def = template.custom_properties.get_mut(prop_name)?;

    let mut metadata = Vec::with_capacity(def.scope_rules.len());
    let mut args = Vec::new();

    for rule in &def.scope_rules {
        let default_expression = normalize_expression(rule.default_rule.as_deref().unwrap_or(""));

        if rule.parent_property_name.is_none() {
            metadata.insert(
                0,
                ArgMetadata { identifier: "ThisProperty".to_string(), default_expression },
            );
        } else {
            args.push(TypedName {
                identifier: rule.name.clone(),
                kind: TypeRef {
                    type_name: rule.scope_property_data_type.clone().unwrap_or_default(),
                    optional_variant: None,
                },
            });
            metadata.push(ArgMetadata { identifier: rule.name.clone(), default_expression });
        }
    }

    for rule in &mut def.scope_rules {
        rule.default_rule = None;
        rule.scope_property_data_type = None;
        rule.parameter_index = None;
        rule.parent_property_name = None;
    }

    Some(FuncNode { identifier: prop_name.to_string(), args, metadata })
}

#[cfg(test)]
mod test {
    use super::*;
    use pasrc_model::{CustomPropertyDef, ScopeRule};

    fn ctx_parts() -> (TemplateStore, IndexMap<String, ControlState>, Entropy, IndexMap<String, TemplateState>) {
        (TemplateStore::new(), IndexMap::new(), Entropy::new(), IndexMap::new())
    }

    #[test]
    fn z_order_scenario_3() {
        let (mut templates, mut states, mut entropy, snapshots) = ctx_parts();
        let mut ctx = SplitContext {
            templates: &mut templates,
            editor_states: &mut states,
            entropy: &mut entropy,
            template_snapshots: &snapshots,
        };

        let mut parent = PkgControl::new("Parent", "Screen");
        let mut a = PkgControl::new("A", "Label");
        a.rules.push(crate::raw::PkgRule { property: "ZIndex".into(), expression: "2".into(), ..Default::default() });
        let mut b = PkgControl::new("B", "Label");
        b.rules.push(crate::raw::PkgRule { property: "ZIndex".into(), expression: "1".into(), ..Default::default() });
        let mut c = PkgControl::new("C", "Label");
        c.rules.push(crate::raw::PkgRule { property: "ZIndex".into(), expression: "foo".into(), ..Default::default() });
        parent.children = vec![a, b, c];

        let block = split(&parent, "Parent", -1, false, &mut ctx).unwrap();
        let names: Vec<_> = block.children.iter().map(|c| c.name.identifier.as_str()).collect();
        assert_eq!(names, vec!["C", "B", "A"]);
    }

    #[test]
    fn duplicate_name_outside_test_suite_is_fatal() {
        let (mut templates, mut states, mut entropy, snapshots) = ctx_parts();
        let mut ctx = SplitContext {
            templates: &mut templates,
            editor_states: &mut states,
            entropy: &mut entropy,
            template_snapshots: &snapshots,
        };

        let mut parent = PkgControl::new("Parent", "Screen");
        parent.children = vec![PkgControl::new("Dup", "Label"), PkgControl::new("Dup", "Label")];

        let err = split(&parent, "Parent", -1, false, &mut ctx).unwrap_err();
        assert!(matches!(err, Error::DuplicateControlName(name) if name == "Dup"));
    }

    #[test]
    fn duplicate_name_inside_test_suite_is_permitted() {
        let (mut templates, mut states, mut entropy, snapshots) = ctx_parts();
        let mut ctx = SplitContext {
            templates: &mut templates,
            editor_states: &mut states,
            entropy: &mut entropy,
            template_snapshots: &snapshots,
        };

        let mut parent = PkgControl::new("Parent", "Screen");
        parent.children = vec![PkgControl::new("Dup", "Label"), PkgControl::new("Dup", "Label")];

        split(&parent, "Parent", -1, true, &mut ctx).unwrap();
    }

    #[test]
    fn is_test_suite_marker_permits_duplicates_from_the_production_call_site() {
        let (mut templates, mut states, mut entropy, snapshots) = ctx_parts();
        let mut ctx = SplitContext {
            templates: &mut templates,
            editor_states: &mut states,
            entropy: &mut entropy,
            template_snapshots: &snapshots,
        };

        let mut parent = PkgControl::new("Parent", "Screen");
        parent.is_test_suite = true;
        parent.children = vec![PkgControl::new("Dup", "Label"), PkgControl::new("Dup", "Label")];

        // `loader::split_one` always passes `false` for the inherited flag;
        // a genuine test-suite root must still be able to flip it on itself.
        split(&parent, "Parent", -1, false, &mut ctx).unwrap();
    }

    #[test]
    fn function_typed_custom_property_splits_into_func_node() {
        let (mut templates, mut states, mut entropy, mut snapshots) = ctx_parts();

        let def = CustomPropertyDef { is_function_type: true, scope_rules: vec![
            ScopeRule { name: "OnSelect".into(), default_rule: Some("Navigate(Screen1)".into()), parent_property_name: None, ..Default::default() },
            ScopeRule { name: "record".into(), default_rule: Some("ThisItem".into()), scope_property_data_type: Some("Record".into()), parent_property_name: Some("OnSelect".into()), parameter_index: Some(0) },
        ] };
        let mut template = TemplateState::new("Gallery/Button");
        template.custom_properties.insert("OnSelect".into(), def);
        snapshots.insert("Gallery/Button".into(), template);

        let mut ctx = SplitContext {
            templates: &mut templates,
            editor_states: &mut states,
            entropy: &mut entropy,
            template_snapshots: &snapshots,
        };

        let mut control = PkgControl::new("Button1", "Gallery/Button");
        control.is_component_definition = true;
        let block = split(&control, "Button1", -1, false, &mut ctx).unwrap();

        assert_eq!(block.functions.len(), 1);
        let func = &block.functions[0];
        assert_eq!(func.identifier, "OnSelect");
        assert_eq!(func.args.len(), 1);
        assert_eq!(func.args[0].identifier, "record");
        assert_eq!(func.metadata.len(), 2);
        assert_eq!(func.metadata[0].identifier, "ThisProperty");

        let stored = ctx.templates.get("Gallery/Button").unwrap();
        let stored_def = &stored.custom_properties["OnSelect"];
        assert!(stored_def.scope_rules.iter().all(|r| r.default_rule.is_none()));
    }
}
