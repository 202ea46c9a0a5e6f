//! Pretty-printer: `IrBlock` → indentation-based text (§6, "The text DSL").

use pasrc_model::{FuncNode, IrBlock};

const INDENT_UNIT: &str = "    ";

#[must_use]
pub fn print_block(block: &IrBlock) -> String {
    let mut out = String::new();
    write_block(&mut out, block, 0);
    out
}

fn write_indent(out: &mut String, indent: u32) {
    for _ in 0..indent {
        out.push_str(INDENT_UNIT);
    }
}

fn write_block(out: &mut String, block: &IrBlock, indent: u32) {
    write_indent(out, indent);
    out.push_str(&block.name.identifier);
    out.push_str(" As ");
    out.push_str(&block.name.kind.type_name);
    if let Some(variant) = &block.name.kind.optional_variant {
        out.push('.');
        out.push_str(variant);
    }
    out.push_str(":\n");

    for prop in &block.properties {
        write_property(out, &prop.identifier, &prop.expression, indent + 1);
    }
    for func in &block.functions {
        write_function(out, func, indent + 1);
    }
    for child in &block.children {
        write_block(out, child, indent + 1);
    }
}

fn write_property(out: &mut String, identifier: &str, expression: &str, indent: u32) {
    write_indent(out, indent);
    out.push_str(identifier);

    if expression.contains('\n') {
        out.push_str(" =\n");
        for line in expression.split('\n') {
            write_indent(out, indent + 1);
            out.push_str("| ");
            out.push_str(line);
            out.push('\n');
        }
    } else {
        out.push_str(" = ");
        out.push_str(expression);
        out.push('\n');
    }
}

fn write_function(out: &mut String, func: &FuncNode, indent: u32) {
    write_indent(out, indent);
    out.push_str(&func.identifier);
    out.push('(');
    for (i, arg) in func.args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&arg.identifier);
        out.push_str(": ");
        out.push_str(&arg.kind.type_name);
    }
    out.push_str("):\n");

    for meta in &func.metadata {
        write_property(out, &meta.identifier, &meta.default_expression, indent + 1);
    }
}
