//! # Module Reference Documentation
//!
//! `module-reference.md` lists every runtime module, grouped by `category`.
//! Categories appear in name order; within a category modules keep their
//! dependency order, which is also the order they run in. Modules without a
//! category land in `Uncategorized`.

use std::collections::BTreeMap;

use mimic_core::{LocatedModule, ParameterDefinition};

use crate::context::EmitContext;
use crate::error::CodegenResult;
use crate::header::CommentStyle;

/// Render `module-reference.md`.
pub fn emit(ctx: &EmitContext<'_>) -> CodegenResult<String> {
    let mut categories: BTreeMap<&str, Vec<&LocatedModule>> = BTreeMap::new();
    for module in ctx.runtime_modules() {
        categories
            .entry(module.definition.category_or_default())
            .or_default()
            .push(module);
    }

    let mut out = ctx.header(CommentStyle::Html);
    out.push_str("# Module Reference\n\n");
    let total: usize = categories.values().map(Vec::len).sum();
    out.push_str(&format!(
        "{total} runtime module(s), listed by category in execution order.\n\n"
    ));

    if categories.is_empty() {
        out.push_str("No runtime modules are defined.\n");
        return Ok(out);
    }

    for (category, modules) in &categories {
        let names = inline_list(modules.iter().map(|m| m.name()));
        out.push_str(&format!("- **{category}**: {names}\n"));
    }
    out.push('\n');

    for (category, modules) in &categories {
        out.push_str(&format!("## {category}\n\n"));
        for module in modules {
            write_module(&mut out, module);
        }
    }
    Ok(out)
}

fn write_module(out: &mut String, module: &LocatedModule) {
    let def = &module.definition;
    let title = if def.display_name.is_empty() {
        def.name.as_str()
    } else {
        def.display_name.as_str()
    };
    out.push_str(&format!("### {title} (`{}`)\n\n", def.name));
    if !def.description.is_empty() {
        out.push_str(&format!("{}\n\n", def.description.trim()));
    }

    out.push_str("| Field | Value |\n");
    out.push_str("|-------|-------|\n");
    out.push_str(&format!("| Version | {} |\n", cell(&def.version)));
    out.push_str(&format!("| Author | {} |\n", cell(&def.author)));
    out.push_str(&format!("| Register function | `{}` |\n", def.register_symbol()));
    let requires = inline_list(def.dependencies.requires.iter().map(String::as_str));
    let provides = inline_list(def.dependencies.provides.iter().map(String::as_str));
    out.push_str(&format!("| Requires | {requires} |\n"));
    out.push_str(&format!("| Provides | {provides} |\n"));
    if !def.compilation_requires.is_empty() {
        out.push_str(&format!("| Build features | {} |\n", def.compilation_requires.join(", ")));
    }
    if let Some(enabled) = def.default_enabled {
        let enabled = if enabled { "yes" } else { "no" };
        out.push_str(&format!("| Enabled by default | {enabled} |\n"));
    }
    out.push('\n');

    if def.parameters.is_empty() {
        out.push_str("No runtime parameters.\n\n");
    } else {
        out.push_str("**Parameters**\n\n");
        out.push_str("| Name | Type | Default | Units | Range | Description |\n");
        out.push_str("|------|------|---------|-------|-------|-------------|\n");
        for param in &def.parameters {
            write_parameter(out, param);
        }
        out.push('\n');
    }

    if !def.references.is_empty() {
        out.push_str("**References**\n\n");
        for reference in &def.references {
            out.push_str(&format!("- {reference}\n"));
        }
        out.push('\n');
    }

    if let Some(docs) = &def.docs {
        let links = docs.links();
        if !links.is_empty() {
            out.push_str("**Documentation**\n\n");
            for (label, path) in links {
                out.push_str(&format!("- {label}: `{path}`\n"));
            }
            out.push('\n');
        }
    }
}

fn write_parameter(out: &mut String, param: &ParameterDefinition) {
    let units = param.units.as_deref().filter(|u| !u.is_empty()).unwrap_or("-");
    let range = match param.range.as_deref() {
        Some([min, max]) => format!("[{min}, {max}]"),
        _ => "-".to_string(),
    };
    out.push_str(&format!(
        "| `{}` | {} | {} | {} | {} | {} |\n",
        param.name,
        param.kind,
        cell(&param.default.to_string()),
        cell(units),
        range,
        cell(&param.description)
    ));
}

fn inline_list<'s>(items: impl Iterator<Item = &'s str>) -> String {
    let items: Vec<String> = items.map(|i| format!("`{i}`")).collect();
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

/// Table-safe text: pipes escaped, newlines folded.
fn cell(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return "-".to_string();
    }
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fixtures::*;
    use mimic_core::{Layout, TypeRegistry};
    use serde_json::json;

    #[test]
    fn test_grouped_by_category_in_execution_order() {
        let mut modules = standard_modules();
        modules.push(module("stellar_mass", json!({
            "display_name": "Stellar Mass",
            "description": "Tracks stars.",
            "version": "0.1.0",
            "author": "Mimic",
            "category": "Stars",
            "sources": ["stellar_mass.c"],
            "register_function": "stellar_mass_register",
            "dependencies": { "requires": ["ColdGas"], "provides": [] },
            "default_enabled": false
        })));
        let model = model(standard_properties(), modules);
        let types = TypeRegistry::standard();
        let layout = Layout::default();
        let ctx = EmitContext::new(&model, &types, &layout, timestamp()).unwrap();
        let text = emit(&ctx).unwrap();

        assert!(text.starts_with("<!--\nAUTO-GENERATED CODE - DO NOT EDIT\n"));
        assert!(text.contains("3 runtime module(s)"));
        assert!(text.contains("- **Gas**: `sage_infall`, `sage_cooling`\n"));
        let infall = text.find("### SAGE Infall (`sage_infall`)").unwrap();
        let cooling = text.find("### SAGE Cooling (`sage_cooling`)").unwrap();
        let stars = text.find("## Stars").unwrap();
        assert!(infall < cooling && cooling < stars);
        assert!(!text.contains("test_fixture"));
        assert!(text.contains("| Enabled by default | no |\n"));
        assert!(text.contains("| Provides | none |\n"));
    }

    #[test]
    fn test_parameter_table_and_references() {
        let model = model(standard_properties(), standard_modules());
        let types = TypeRegistry::standard();
        let layout = Layout::default();
        let ctx = EmitContext::new(&model, &types, &layout, timestamp()).unwrap();
        let text = emit(&ctx).unwrap();

        assert!(text.contains(
            "| `CoolingEfficiency` | double | 1.0 | - | [0, 10] | scaling |\n"
        ));
        assert!(text.contains("- Croton et al. 2006\n"));
        assert!(text.contains("No runtime parameters.\n"));
    }

    #[test]
    fn test_cell_escapes_pipes() {
        assert_eq!(cell("a | b"), "a \\| b");
        assert_eq!(cell("  "), "-");
    }
}
