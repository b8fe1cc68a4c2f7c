//! Line builders shared by the emitters.
//!
//! Each function renders one syntactic shape, newline included. Emitters
//! only decide *which* shape a property needs; the exact spelling lives here.

/// `  float Mvir;` / `  float Pos[3];`
pub fn struct_field(c_type: &str, name: &str, array_suffix: &str) -> String {
    format!("  {c_type} {name}{array_suffix};\n")
}

/// `target = value;`
pub fn assign(target: &str, value: &str) -> String {
    format!("{target} = {value};\n")
}

/// Element-wise copy of a fixed-length array.
pub fn array_copy(len: usize, target: &str, source: &str) -> String {
    format!("for (int j = 0; j < {len}; j++) {{\n  {target}[j] = {source}[j];\n}}\n")
}

/// Two-branch assignment.
pub fn conditional_assign(target: &str, condition: &str, if_true: &str, if_false: &str) -> String {
    format!(
        "if ({condition}) {{\n  {target} = {if_true};\n}} else {{\n  {target} = {if_false};\n}}\n"
    )
}

/// `/* text */`
pub fn comment(text: &str) -> String {
    format!("/* {text} */\n")
}

/// One HDF5 field-table entry, followed by a blank line.
pub fn field_table_entry(name: &str, h5_type: &str) -> String {
    format!(
        "/* {name} */\n\
         HDF5_dst_offsets[i] = HOFFSET(struct HaloOutput, {name});\n\
         HDF5_dst_sizes[i] = sizeof(galout.{name});\n\
         HDF5_field_names[i] = \"{name}\";\n\
         HDF5_field_types[i++] = {h5_type};\n\n"
    )
}

/// One NumPy dtype tuple inside `np.dtype([...])`.
pub fn dtype_entry(name: &str, numpy_type: &str) -> String {
    format!("        (\"{name}\", {numpy_type}),\n")
}

/// One continued line of a make variable.
pub fn make_list_item(entry: &str, last: bool) -> String {
    if last {
        format!("    {entry}\n")
    } else {
        format!("    {entry} \\\n")
    }
}
