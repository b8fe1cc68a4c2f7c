//! `module_init.c`: includes every runtime module's headers and registers
//! the modules in dependency order.
//!
//! The `#include` block is sorted by module name, not by execution order;
//! only the `register_all_modules` body follows the resolved order.
//!
//! Utility modules are test-only and never appear here.

use mimic_core::LocatedModule;

use crate::context::EmitContext;
use crate::error::CodegenResult;
use crate::header::CommentStyle;

/// Render `module_init.c`.
pub fn emit(ctx: &EmitContext<'_>) -> CodegenResult<String> {
    let modules: Vec<&LocatedModule> = ctx.runtime_modules().collect();
    let mut out = ctx.header(CommentStyle::CBlock);

    out.push_str("#include \"module_registry.h\"\n\n");

    out.push_str("/* Module headers (sorted alphabetically) */\n");
    let mut by_name = modules.clone();
    by_name.sort_by(|a, b| a.name().cmp(b.name()));
    for module in by_name {
        let mut headers: Vec<&String> = module.definition.headers.iter().collect();
        headers.sort();
        for header in headers {
            let dir = module.relative_dir_slashed();
            out.push_str(&format!("#include \"{dir}/{header}\"\n"));
        }
    }
    out.push('\n');

    out.push_str("/**\n");
    out.push_str(" * @brief Register all available physics modules\n");
    out.push_str(" *\n");
    out.push_str(&format!(" * Modules registered: {}\n", modules.len()));
    out.push_str(" *\n");
    if !modules.is_empty() {
        out.push_str(" * Dependency order:\n");
        for (i, module) in modules.iter().enumerate() {
            let deps = &module.definition.dependencies;
            let provides = list_or_none(&deps.provides);
            if deps.requires.is_empty() {
                let name = module.name();
                out.push_str(&format!(" * {}. {name}: provides [{provides}]\n", i + 1));
            } else {
                out.push_str(&format!(
                    " * {}. {}: requires [{}] → provides [{provides}]\n",
                    i + 1,
                    module.name(),
                    deps.requires.join(", ")
                ));
            }
        }
    }
    out.push_str(" */\n");

    out.push_str("void register_all_modules(void) {\n");
    if modules.is_empty() {
        out.push_str("    /* No modules to register */\n");
    } else {
        out.push_str("    /* Register in dependency-resolved order */\n");
        for module in &modules {
            out.push_str(&format!(
                "    {}();  /* {} */\n",
                module.definition.register_symbol(),
                dependency_comment(module)
            ));
        }
    }
    out.push_str("}\n");
    Ok(out)
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

fn dependency_comment(module: &LocatedModule) -> String {
    let deps = &module.definition.dependencies;
    match (deps.requires.is_empty(), deps.provides.is_empty()) {
        (false, false) => format!(
            "Requires: {} → Provides: {}",
            deps.requires.join(", "),
            deps.provides.join(", ")
        ),
        (true, false) => format!("Provides: {}", deps.provides.join(", ")),
        (false, true) => format!("Requires: {}", deps.requires.join(", ")),
        (true, true) => "No dependencies".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fixtures::*;
    use mimic_core::{Layout, TypeRegistry};

    fn body(text: &str) -> &str {
        let start = text.find("#include").unwrap();
        &text[start..]
    }

    #[test]
    fn test_registration_in_dependency_order() {
        let model = model(standard_properties(), standard_modules());
        let types = TypeRegistry::standard();
        let layout = Layout::default();
        let ctx = EmitContext::new(&model, &types, &layout, timestamp()).unwrap();
        let text = emit(&ctx).unwrap();

        let expected = "\
#include \"module_registry.h\"

/* Module headers (sorted alphabetically) */
#include \"sage_cooling/sage_cooling.h\"
#include \"sage_infall/sage_infall.h\"
#include \"sage_infall/sage_infall_constants.h\"

/**
 * @brief Register all available physics modules
 *
 * Modules registered: 2
 *
 * Dependency order:
 * 1. sage_infall: requires [Mvir] → provides [HotGas]
 * 2. sage_cooling: requires [HotGas] → provides [ColdGas]
 */
void register_all_modules(void) {
    /* Register in dependency-resolved order */
    sage_infall_register();  /* Requires: Mvir → Provides: HotGas */
    sage_cooling_register();  /* Requires: HotGas → Provides: ColdGas */
}
";
        assert_eq!(body(&text), expected);
    }

    #[test]
    fn test_empty_registry() {
        let model = model(standard_properties(), Vec::new());
        let types = TypeRegistry::standard();
        let layout = Layout::default();
        let ctx = EmitContext::new(&model, &types, &layout, timestamp()).unwrap();
        let text = emit(&ctx).unwrap();
        assert!(text.contains(" * Modules registered: 0\n"));
        assert!(text.contains("    /* No modules to register */\n"));
    }
}
