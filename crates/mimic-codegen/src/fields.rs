//! HDF5 field table fragments for `calc_hdf5_props()`.

use crate::context::EmitContext;
use crate::error::CodegenResult;
use crate::header::CommentStyle;
use crate::shapes;

/// Render `hdf5_field_count.inc`.
pub fn emit_count(ctx: &EmitContext<'_>) -> CodegenResult<String> {
    let count = ctx.properties().output_properties().count();
    let mut out = ctx.header(CommentStyle::CBlock);
    out.push_str("/* HDF5 field count and counter initialization */\n\n");
    out.push_str(&format!("HDF5_n_props = {count};\n"));
    out.push_str("int i = 0;\n");
    Ok(out)
}

/// Render `hdf5_field_definitions.inc`.
pub fn emit_definitions(ctx: &EmitContext<'_>) -> CodegenResult<String> {
    let mut out = ctx.header(CommentStyle::CBlock);
    out.push_str("/* HDF5 field definitions for calc_hdf5_props() */\n");
    out.push_str("/* Requires: struct HaloOutput galout; */\n\n");
    for (_, prop) in ctx.properties().output_properties() {
        let info = ctx.type_info(prop)?;
        out.push_str(&shapes::field_table_entry(&prop.name, info.h5_type));
    }
    Ok(out)
}
