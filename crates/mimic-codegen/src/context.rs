//! Shared input of every emitter.

use chrono::{DateTime, Utc};

use mimic_core::layout::slashed;
use mimic_core::{
    Layout, LocatedModule, PropertyDefinition, PropertySet, SourceHash, TypeInfo, TypeRegistry,
};
use mimic_schema::{resolve_order, ValidatedModel};

use crate::error::{CodegenError, CodegenResult};
use crate::header::{self, CommentStyle, HeaderFields, TIMESTAMP_FORMAT};

/// A validated model plus everything needed to render it.
#[derive(Debug, Clone)]
pub struct EmitContext<'a> {
    /// Validated properties and modules.
    pub model: &'a ValidatedModel,
    /// Every module, utility modules included, in dependency order.
    pub order: Vec<&'a LocatedModule>,
    /// Timestamp written into headers and the manifest.
    pub generated_at: DateTime<Utc>,
    /// Type rendering table.
    pub types: &'a TypeRegistry,
    /// Repository layout.
    pub layout: &'a Layout,
}

impl<'a> EmitContext<'a> {
    /// Resolve the module order and assemble the context.
    pub fn new(
        model: &'a ValidatedModel,
        types: &'a TypeRegistry,
        layout: &'a Layout,
        generated_at: DateTime<Utc>,
    ) -> CodegenResult<Self> {
        let order = resolve_order(&model.modules)?;
        Ok(Self {
            model,
            order,
            generated_at,
            types,
            layout,
        })
    }

    /// Hash embedded in every artifact.
    pub fn hash(&self) -> &'a SourceHash {
        &self.model.source_hash
    }

    /// Both property lists.
    pub fn properties(&self) -> &'a PropertySet {
        &self.model.properties
    }

    /// Non-utility modules in dependency order.
    pub fn runtime_modules(&self) -> impl Iterator<Item = &'a LocatedModule> + '_ {
        self.order
            .iter()
            .copied()
            .filter(|m| !m.definition.is_utility)
    }

    /// Registry entry for a property's type.
    pub fn type_info(&self, prop: &PropertyDefinition) -> CodegenResult<&'a TypeInfo> {
        self.types.get(&prop.kind).ok_or_else(|| CodegenError::UnknownType {
            property: prop.name.clone(),
            kind: prop.kind.to_string(),
        })
    }

    /// `Generated on:` value.
    pub fn generated_on(&self) -> String {
        self.generated_at.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Input patterns listed in headers.
    pub fn source_patterns(&self) -> Vec<String> {
        vec![
            slashed(&self.layout.halo_properties),
            slashed(&self.layout.galaxy_properties),
            format!("{}/*/module_info.yaml", slashed(&self.layout.modules_dir)),
        ]
    }

    /// Header block in `style`.
    pub fn header(&self, style: CommentStyle) -> String {
        let generated_on = self.generated_on();
        let sources = self.source_patterns();
        header::render(style, &self.header_fields(&generated_on, &sources))
    }

    /// One-line header for JSON artifacts.
    pub fn inline_header(&self) -> String {
        let generated_on = self.generated_on();
        let sources = self.source_patterns();
        header::inline(&self.header_fields(&generated_on, &sources))
    }

    fn header_fields<'f>(&'f self, generated_on: &'f str, sources: &'f [String]) -> HeaderFields<'f> {
        HeaderFields {
            generated_on,
            sources,
            hash: self.hash(),
        }
    }
}
