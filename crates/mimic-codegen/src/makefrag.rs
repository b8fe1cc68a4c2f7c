//! `module_sources.mk`: the `MODULE_SRCS` list the unit-test build links.
//!
//! Order: the registry core, each runtime module's sources in dependency
//! order, and the generated registration source last. Paths are spelled
//! relative to `$(SRC_DIR)`.

use crate::context::EmitContext;
use crate::error::CodegenResult;
use crate::header::CommentStyle;
use crate::shapes;

/// Render `module_sources.mk`.
pub fn emit(ctx: &EmitContext<'_>) -> CodegenResult<String> {
    let layout = ctx.layout;
    let modules_dir = layout.modules_dir_under_src();

    let mut entries = vec![format!("$(SRC_DIR)/{}", layout.registry_source_slashed())];
    for module in ctx.runtime_modules() {
        let dir = module.relative_dir_slashed();
        entries.extend(
            module
                .definition
                .sources
                .iter()
                .map(|source| format!("$(SRC_DIR)/{modules_dir}/{dir}/{source}")),
        );
    }
    entries.push(format!("$(SRC_DIR)/{}", layout.module_init_under_src()));

    let mut out = ctx.header(CommentStyle::Hash);
    out.push_str("# Module source files for unit testing\n");
    out.push_str("MODULE_SRCS = \\\n");
    let last = entries.len() - 1;
    for (i, entry) in entries.iter().enumerate() {
        out.push_str(&shapes::make_list_item(entry, i == last));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fixtures::*;
    use mimic_core::{Layout, TypeRegistry};

    #[test]
    fn test_sources_in_dependency_order() {
        let model = model(standard_properties(), standard_modules());
        let types = TypeRegistry::standard();
        let layout = Layout::default();
        let ctx = EmitContext::new(&model, &types, &layout, timestamp()).unwrap();
        let text = emit(&ctx).unwrap();

        let expected = "\
# Module source files for unit testing
MODULE_SRCS = \\
    $(SRC_DIR)/core/module_registry.c \\
    $(SRC_DIR)/modules/sage_infall/sage_infall.c \\
    $(SRC_DIR)/modules/sage_cooling/sage_cooling.c \\
    $(SRC_DIR)/modules/sage_cooling/cooling_tables.c \\
    $(SRC_DIR)/modules/_system/generated/module_init.c
";
        assert!(text.starts_with("# AUTO-GENERATED CODE - DO NOT EDIT\n"));
        assert!(text.ends_with(expected));
        assert!(!text.contains("fixture.c"));
    }

    #[test]
    fn test_no_modules() {
        let model = model(standard_properties(), Vec::new());
        let types = TypeRegistry::standard();
        let layout = Layout::default();
        let ctx = EmitContext::new(&model, &types, &layout, timestamp()).unwrap();
        let text = emit(&ctx).unwrap();
        assert!(text.ends_with(
            "MODULE_SRCS = \\\n    $(SRC_DIR)/core/module_registry.c \\\n    $(SRC_DIR)/modules/_system/generated/module_init.c\n"
        ));
    }
}
