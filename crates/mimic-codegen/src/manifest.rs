//! `property_ranges.json`: per output property, what scientific tests need
//! to range-check the written data.
//!
//! JSON has no comments, so the header travels in a leading `_comment` key.
//! Properties keep serialization order rather than being sorted by name.

use serde::{Serialize, Serializer};

use mimic_core::Scalar;

use crate::context::EmitContext;
use crate::error::CodegenResult;

/// Manifest format version.
pub const SCHEMA_VERSION: u32 = 1;

const NOTES: &str =
    "Auto-generated from metadata/properties/*.yaml. Range is inclusive; sentinels are exempt.";

#[derive(Serialize)]
struct Manifest<'a> {
    #[serde(rename = "_comment")]
    comment: String,
    schema_version: u32,
    generated_at: String,
    source_hash: &'a str,
    properties: OrderedEntries<'a>,
    notes: &'static str,
}

#[derive(Serialize)]
struct Entry<'a> {
    name: &'a str,
    category: &'static str,
    #[serde(rename = "type")]
    kind: String,
    units: &'a str,
    is_vector: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    range: Option<&'a [f64]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sentinels: Option<&'a [Scalar]>,
}

/// A JSON object whose keys keep insertion order.
struct OrderedEntries<'a>(Vec<Entry<'a>>);

impl Serialize for OrderedEntries<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|entry| (entry.name, entry)))
    }
}

/// Render `property_ranges.json`.
pub fn emit(ctx: &EmitContext<'_>) -> CodegenResult<String> {
    let mut entries = Vec::new();
    for (category, prop) in ctx.properties().output_properties() {
        let info = ctx.type_info(prop)?;
        entries.push(Entry {
            name: &prop.name,
            category: category.as_str(),
            kind: prop.kind.to_string(),
            units: &prop.units,
            is_vector: info.is_vector(),
            range: prop.range.as_deref(),
            sentinels: prop.sentinels.as_deref(),
        });
    }

    let manifest = Manifest {
        comment: ctx.inline_header(),
        schema_version: SCHEMA_VERSION,
        generated_at: ctx.generated_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        source_hash: ctx.hash().as_str(),
        properties: OrderedEntries(entries),
        notes: NOTES,
    };
    let mut out = serde_json::to_string_pretty(&manifest)?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fixtures::*;
    use mimic_core::{Layout, TypeRegistry};
    use serde_json::{json, Value};

    fn manifest() -> (String, Value) {
        let model = model(standard_properties(), Vec::new());
        let types = TypeRegistry::standard();
        let layout = Layout::default();
        let ctx = EmitContext::new(&model, &types, &layout, timestamp()).unwrap();
        let text = emit(&ctx).unwrap();
        let value = serde_json::from_str(&text).unwrap();
        (text, value)
    }

    #[test]
    fn test_manifest_fields() {
        let (_, value) = manifest();
        assert_eq!(value["schema_version"], 1);
        assert_eq!(value["generated_at"], "2025-01-02T03:04:05Z");
        assert_eq!(value["source_hash"], hash().as_str());
        assert_eq!(
            value["properties"]["Mvir"],
            json!({
                "name": "Mvir", "category": "halo", "type": "float",
                "units": "1e10 Msun/h", "is_vector": false, "range": [0.0, 1000000.0]
            })
        );
        assert_eq!(value["properties"]["Pos"]["is_vector"], true);
        assert_eq!(value["properties"]["Type"]["sentinels"], json!([-1]));
        assert!(value["properties"].get("Len").is_none());
        assert!(value["properties"].get("ColdGas").is_none());
    }

    #[test]
    fn test_comment_leads_and_order_is_kept() {
        let (text, _) = manifest();
        let second_line = text.lines().nth(1).unwrap();
        assert!(second_line.trim_start().starts_with("\"_comment\": \"AUTO-GENERATED"));
        let mvir = text.find("\"Mvir\": {").unwrap();
        let hot_gas = text.find("\"HotGas\": {").unwrap();
        assert!(mvir < hot_gas);
    }
}
