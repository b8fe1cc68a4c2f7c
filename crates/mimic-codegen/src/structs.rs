//! `property_defs.h`: the processing, payload and output records.
//!
//! - `struct Halo` holds every halo property that takes part in processing:
//!   internal-only properties, and output properties that are initialized
//!   (anything but `init_source: skip`). It ends with the pointer to the
//!   galaxy payload.
//! - `struct GalaxyData` holds every galaxy property.
//! - `struct HaloOutput` holds every output property, halo before galaxy.

use mimic_core::PropertyDefinition;

use crate::context::EmitContext;
use crate::error::CodegenResult;
use crate::header::CommentStyle;
use crate::shapes;

/// Render `property_defs.h`.
pub fn emit(ctx: &EmitContext<'_>) -> CodegenResult<String> {
    let props = ctx.properties();
    let mut out = ctx.header(CommentStyle::CBlock);

    out.push_str("#ifndef GENERATED_PROPERTY_DEFS_H\n");
    out.push_str("#define GENERATED_PROPERTY_DEFS_H\n\n");
    out.push_str("/* Forward declarations */\n");
    out.push_str("struct GalaxyData;\n\n");

    out.push_str("/* Halo properties (internal processing) */\n");
    out.push_str("struct Halo {\n");
    out.push_str("  /* Halo properties */\n");
    for prop in props.halo.iter().filter(|p| p.in_processing_record()) {
        out.push_str(&field(ctx, prop)?);
    }
    out.push_str("\n  /* Galaxy pointer (physics-agnostic separation) */\n");
    out.push_str("  struct GalaxyData *galaxy;\n");
    out.push_str("};\n\n");

    out.push_str("/* Galaxy properties (baryonic physics) */\n");
    out.push_str("struct GalaxyData {\n");
    for prop in &props.galaxy {
        out.push_str(&field(ctx, prop)?);
    }
    out.push_str("};\n\n");

    out.push_str("/* Output structure (file writing) */\n");
    out.push_str("struct HaloOutput {\n");
    out.push_str("  /* Halo properties */\n");
    for prop in props.halo.iter().filter(|p| p.output) {
        out.push_str(&field(ctx, prop)?);
    }
    out.push_str("\n  /* Galaxy properties */\n");
    for prop in props.galaxy.iter().filter(|p| p.output) {
        out.push_str(&field(ctx, prop)?);
    }
    out.push_str("};\n\n");

    out.push_str("#endif /* GENERATED_PROPERTY_DEFS_H */\n");
    Ok(out)
}

fn field(ctx: &EmitContext<'_>, prop: &PropertyDefinition) -> CodegenResult<String> {
    let info = ctx.type_info(prop)?;
    Ok(shapes::struct_field(
        info.c_type,
        &prop.name,
        &info.c_array_suffix(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fixtures::*;
    use mimic_core::{Layout, TypeRegistry};

    fn body(text: &str) -> &str {
        let start = text.find("#ifndef").unwrap();
        &text[start..]
    }

    #[test]
    fn test_property_defs_layout() {
        let model = model(standard_properties(), Vec::new());
        let types = TypeRegistry::standard();
        let layout = Layout::default();
        let ctx = EmitContext::new(&model, &types, &layout, timestamp()).unwrap();
        let text = emit(&ctx).unwrap();

        let expected = "\
#ifndef GENERATED_PROPERTY_DEFS_H
#define GENERATED_PROPERTY_DEFS_H

/* Forward declarations */
struct GalaxyData;

/* Halo properties (internal processing) */
struct Halo {
  /* Halo properties */
  float Mvir;
  float Pos[3];
  int Len;

  /* Galaxy pointer (physics-agnostic separation) */
  struct GalaxyData *galaxy;
};

/* Galaxy properties (baryonic physics) */
struct GalaxyData {
  float HotGas;
  double ColdGas;
};

/* Output structure (file writing) */
struct HaloOutput {
  /* Halo properties */
  float Mvir;
  float Pos[3];
  int Type;

  /* Galaxy properties */
  float HotGas;
};

#endif /* GENERATED_PROPERTY_DEFS_H */
";
        assert_eq!(body(&text), expected);
    }

    #[test]
    fn test_header_precedes_guard() {
        let model = model(standard_properties(), Vec::new());
        let types = TypeRegistry::standard();
        let layout = Layout::default();
        let ctx = EmitContext::new(&model, &types, &layout, timestamp()).unwrap();
        let text = emit(&ctx).unwrap();
        assert!(text.starts_with("/* AUTO-GENERATED CODE - DO NOT EDIT"));
        assert!(text.contains(&format!("Source hash: {}", hash())));
    }
}
