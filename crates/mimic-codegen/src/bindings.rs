//! NumPy data-layout bindings for the plotting package.
//!
//! `dtype.py` describes the output record twice: once with C struct
//! alignment for the binary format and once packed for HDF5. Field order is
//! the serialization order of `struct HaloOutput`.

use crate::context::EmitContext;
use crate::error::CodegenResult;
use crate::header::CommentStyle;
use crate::shapes;

/// Render `dtype.py`.
pub fn emit_dtype(ctx: &EmitContext<'_>) -> CodegenResult<String> {
    let mut fields = String::new();
    for (_, prop) in ctx.properties().output_properties() {
        let info = ctx.type_info(prop)?;
        fields.push_str(&shapes::dtype_entry(&prop.name, info.numpy_type));
    }

    let mut out = ctx.header(CommentStyle::PythonDoc);
    out.push_str("import numpy as np\n\n");
    out.push_str("def get_binary_dtype():\n");
    out.push_str("    \"\"\"Return NumPy dtype for binary output format (with struct alignment).\"\"\"\n");
    out.push_str("    return np.dtype([\n");
    out.push_str(&fields);
    out.push_str("    ], align=True)\n\n");
    out.push_str("def get_hdf5_dtype():\n");
    out.push_str("    \"\"\"Return NumPy dtype for HDF5 output format (no alignment).\"\"\"\n");
    out.push_str("    return np.dtype([\n");
    out.push_str(&fields);
    out.push_str("    ])\n");
    Ok(out)
}

/// Render the package `__init__.py` re-exporting both dtype functions.
pub fn emit_package(ctx: &EmitContext<'_>) -> CodegenResult<String> {
    let mut out = ctx.header(CommentStyle::PythonDoc);
    out.push_str("from .dtype import get_binary_dtype, get_hdf5_dtype\n\n");
    out.push_str("__all__ = [\"get_binary_dtype\", \"get_hdf5_dtype\"]\n");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fixtures::*;
    use mimic_core::{Layout, TypeRegistry};

    #[test]
    fn test_dtype_module() {
        let model = model(standard_properties(), Vec::new());
        let types = TypeRegistry::standard();
        let layout = Layout::default();
        let ctx = EmitContext::new(&model, &types, &layout, timestamp()).unwrap();
        let text = emit_dtype(&ctx).unwrap();

        let fields = concat!(
            "        (\"Mvir\", np.float32),\n",
            "        (\"Pos\", (np.float32, 3)),\n",
            "        (\"Type\", np.int32),\n",
            "        (\"HotGas\", np.float32),\n",
        );
        let binary = format!("    return np.dtype([\n{fields}    ], align=True)\n");
        let hdf5 = format!("    return np.dtype([\n{fields}    ])\n");
        assert!(text.starts_with("\"\"\"AUTO-GENERATED CODE - DO NOT EDIT\n"));
        assert!(text.contains(&binary));
        assert!(text.ends_with(&hdf5));
    }

    #[test]
    fn test_package_reexports() {
        let model = model(standard_properties(), Vec::new());
        let types = TypeRegistry::standard();
        let layout = Layout::default();
        let ctx = EmitContext::new(&model, &types, &layout, timestamp()).unwrap();
        let text = emit_package(&ctx).unwrap();
        assert!(text.contains("from .dtype import get_binary_dtype, get_hdf5_dtype\n"));
    }
}
