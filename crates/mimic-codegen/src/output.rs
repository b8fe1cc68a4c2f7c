//! `copy_to_output.inc`: fills `struct HaloOutput *o` from `const struct Halo *g`.
//!
//! Halo properties read from `g->`, galaxy properties from `g->galaxy->`.
//! Properties with `output: false` are not part of the output record and are
//! skipped.

use mimic_core::{OutputSource, PropertyCategory, PropertyDefinition};

use crate::context::EmitContext;
use crate::error::{CodegenError, CodegenResult};
use crate::header::CommentStyle;
use crate::shapes;

/// Render `copy_to_output.inc`.
pub fn emit(ctx: &EmitContext<'_>) -> CodegenResult<String> {
    let props = ctx.properties();
    let mut out = ctx.header(CommentStyle::CBlock);
    out.push_str("/* Copy properties from struct Halo to struct HaloOutput\n");
    out.push_str(
        " * Used in prepare_halo_for_output(int filenr, int tree, const struct Halo *g, struct HaloOutput *o)\n",
    );
    out.push_str(" */\n\n");

    out.push_str("/* Halo properties */\n");
    for prop in props.halo.iter().filter(|p| p.output) {
        out.push_str(&statement(ctx, PropertyCategory::Halo, prop)?);
    }
    out.push_str("\n/* Galaxy properties */\n");
    for prop in props.galaxy.iter().filter(|p| p.output) {
        out.push_str(&statement(ctx, PropertyCategory::Galaxy, prop)?);
    }
    Ok(out)
}

fn statement(
    ctx: &EmitContext<'_>,
    category: PropertyCategory,
    prop: &PropertyDefinition,
) -> CodegenResult<String> {
    let name = &prop.name;
    let target = format!("o->{name}");
    let record = match category {
        PropertyCategory::Halo => "g->",
        PropertyCategory::Galaxy => "g->galaxy->",
    };
    let own_field = format!("{record}{name}");

    let code = match prop.output_source_for(category) {
        OutputSource::Custom => shapes::comment(&format!(
            "CUSTOM: {name} - see prepare_halo_for_output() for hand-written code"
        )),
        OutputSource::CopyDirect => shapes::assign(&target, &own_field),
        OutputSource::CopyDirectArray => {
            shapes::array_copy(array_len(ctx, prop)?, &target, &own_field)
        }
        OutputSource::CopyFromSource => {
            let field = prop
                .output_tree_field
                .as_deref()
                .ok_or_else(|| unresolved(prop, "copy-from-source without output_tree_field"))?;
            shapes::assign(&target, &format!("InputTreeHalos[g->HaloNr].{field}"))
        }
        OutputSource::CopyFromSourceArray => {
            let field = prop.output_tree_field.as_deref().unwrap_or(name);
            shapes::array_copy(
                array_len(ctx, prop)?,
                &target,
                &format!("InputTreeHalos[g->HaloNr].{field}"),
            )
        }
        OutputSource::Recompute => {
            let (Some(function), Some(arg)) = (&prop.output_function, &prop.output_function_arg)
            else {
                return Err(unresolved(
                    prop,
                    "recompute without output_function and output_function_arg",
                ));
            };
            shapes::assign(&target, &format!("{function}({arg})"))
        }
        OutputSource::Conditional => {
            let (Some(condition), Some(if_true), Some(if_false)) = (
                &prop.output_condition,
                &prop.output_true_value,
                &prop.output_false_value,
            ) else {
                return Err(unresolved(prop, "conditional without condition and both values"));
            };
            shapes::conditional_assign(
                &target,
                condition,
                &if_true.to_c_literal(),
                &if_false.to_c_literal(),
            )
        }
        OutputSource::DerivedFromOwnedPayload => {
            shapes::assign(&target, &format!("g->galaxy->{name}"))
        }
        OutputSource::Unrecognized(raw) => {
            return Err(unresolved(prop, &format!("unrecognized output_source '{raw}'")))
        }
    };
    Ok(code)
}

fn array_len(ctx: &EmitContext<'_>, prop: &PropertyDefinition) -> CodegenResult<usize> {
    ctx.type_info(prop)?
        .array_len
        .ok_or_else(|| unresolved(prop, "array copy of a scalar type"))
}

fn unresolved(prop: &PropertyDefinition, reason: &str) -> CodegenError {
    CodegenError::UnresolvedSource {
        property: prop.name.clone(),
        reason: reason.to_string(),
    }
}
