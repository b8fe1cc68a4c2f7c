//! Initialization fragments.
//!
//! `init_halo_properties.inc` is pasted into `init_halo(int p, int halonr)`
//! and `init_galaxy_properties.inc` runs right after the galaxy payload is
//! allocated. Both assign into `FoFWorkspace[p]`, the halo directly and the
//! galaxy through its `galaxy->` pointer.

use mimic_core::{InitSource, PropertyCategory, PropertyDefinition};

use crate::context::EmitContext;
use crate::error::{CodegenError, CodegenResult};
use crate::header::CommentStyle;
use crate::shapes;

const GALAXY_DEFAULT_VALUE: &str = "0.0";

/// Render `init_halo_properties.inc`.
pub fn emit_halo(ctx: &EmitContext<'_>) -> CodegenResult<String> {
    let mut out = ctx.header(CommentStyle::CBlock);
    out.push_str("/* Initialize halo properties in init_halo(int p, int halonr) */\n\n");
    for prop in &ctx.properties().halo {
        out.push_str(&statement(ctx, PropertyCategory::Halo, prop)?);
    }
    Ok(out)
}

/// Render `init_galaxy_properties.inc`.
pub fn emit_galaxy(ctx: &EmitContext<'_>) -> CodegenResult<String> {
    let mut out = ctx.header(CommentStyle::CBlock);
    out.push_str("/* Initialize galaxy properties after allocating FoFWorkspace[p].galaxy */\n\n");
    for prop in &ctx.properties().galaxy {
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
    let target = match category {
        PropertyCategory::Halo => format!("FoFWorkspace[p].{name}"),
        PropertyCategory::Galaxy => format!("FoFWorkspace[p].galaxy->{name}"),
    };
    let tree_field = format!("InputTreeHalos[halonr].{name}");

    let code = match prop.init_source_for(category) {
        InitSource::Skip => match category {
            PropertyCategory::Halo if prop.in_processing_record() => {
                shapes::comment(&format!("{name}: skip (custom initialization in init_halo)"))
            }
            PropertyCategory::Halo => {
                shapes::comment(&format!("{name}: skip (output-only, not in struct Halo)"))
            }
            PropertyCategory::Galaxy => {
                shapes::comment(&format!("{name}: skip (custom initialization)"))
            }
        },
        InitSource::Default => {
            let value = match (&prop.init_value, category) {
                (Some(value), _) => value.to_c_literal(),
                (None, PropertyCategory::Galaxy) => GALAXY_DEFAULT_VALUE.to_string(),
                (None, PropertyCategory::Halo) => {
                    return Err(unresolved(prop, "init_source 'default' without init_value"))
                }
            };
            shapes::assign(&target, &value)
        }
        InitSource::CopyFromSource => shapes::assign(&target, &tree_field),
        InitSource::CopyFromSourceArray => {
            let len = ctx
                .type_info(prop)?
                .array_len
                .ok_or_else(|| unresolved(prop, "array copy of a scalar type"))?;
            shapes::array_copy(len, &target, &tree_field)
        }
        InitSource::Calculate => {
            let function = prop
                .init_function
                .as_deref()
                .ok_or_else(|| unresolved(prop, "init_source 'calculate' without init_function"))?;
            shapes::assign(&target, &format!("{function}(halonr)"))
        }
        InitSource::Unrecognized(raw) => {
            return Err(unresolved(prop, &format!("unrecognized init_source '{raw}'")))
        }
    };
    Ok(code)
}

fn unresolved(prop: &PropertyDefinition, reason: &str) -> CodegenError {
    CodegenError::UnresolvedSource {
        property: prop.name.clone(),
        reason: reason.to_string(),
    }
}
