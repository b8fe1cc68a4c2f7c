//! # Artifact Set
//!
//! The fixed list of files one generation run produces, where each lands,
//! and how they are written.
//!
//! Emission is all-or-nothing: every artifact is rendered in memory before
//! the first byte is written, so an emitter error leaves the tree untouched.
//! Writing itself is sequential with no cross-file transaction; a failed
//! write is repaired by the next run.

use std::fmt;
use std::path::{Path, PathBuf};

use mimic_core::{Layout, SourceHash};

use crate::context::EmitContext;
use crate::error::{CodegenError, CodegenResult};
use crate::{bindings, docs, fields, init, makefrag, manifest, output, registration, stamp, structs};

/// One generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    /// `property_defs.h`
    PropertyDefs,
    /// `init_halo_properties.inc`
    InitHalo,
    /// `init_galaxy_properties.inc`
    InitGalaxy,
    /// `copy_to_output.inc`
    CopyToOutput,
    /// `hdf5_field_count.inc`
    FieldCount,
    /// `hdf5_field_definitions.inc`
    FieldDefinitions,
    /// `dtype.py`
    LayoutBindings,
    /// `__init__.py` of the bindings package
    LayoutPackage,
    /// `module_init.c`
    ModuleRegistry,
    /// `module_sources.mk`
    BuildFragment,
    /// `module-reference.md`
    ModuleReference,
    /// `property_ranges.json`
    ValidationManifest,
    /// `module_registry_hash.txt`
    HashFile,
}

impl ArtifactKind {
    /// Every artifact, in write order.
    pub const ALL: [ArtifactKind; 13] = [
        Self::PropertyDefs,
        Self::InitHalo,
        Self::InitGalaxy,
        Self::CopyToOutput,
        Self::FieldCount,
        Self::FieldDefinitions,
        Self::LayoutBindings,
        Self::LayoutPackage,
        Self::ModuleRegistry,
        Self::BuildFragment,
        Self::ModuleReference,
        Self::ValidationManifest,
        Self::HashFile,
    ];

    /// Repository-relative path under `layout`.
    pub fn path(self, layout: &Layout) -> PathBuf {
        match self {
            Self::PropertyDefs => layout.include_dir.join("property_defs.h"),
            Self::InitHalo => layout.include_dir.join("init_halo_properties.inc"),
            Self::InitGalaxy => layout.include_dir.join("init_galaxy_properties.inc"),
            Self::CopyToOutput => layout.include_dir.join("copy_to_output.inc"),
            Self::FieldCount => layout.include_dir.join("hdf5_field_count.inc"),
            Self::FieldDefinitions => layout.include_dir.join("hdf5_field_definitions.inc"),
            Self::LayoutBindings => layout.bindings_dir.join("dtype.py"),
            Self::LayoutPackage => layout.bindings_dir.join("__init__.py"),
            Self::ModuleRegistry => layout.module_init.clone(),
            Self::BuildFragment => layout.tests_generated_dir.join("module_sources.mk"),
            Self::ModuleReference => layout.module_reference.clone(),
            Self::ValidationManifest => layout.tests_generated_dir.join("property_ranges.json"),
            Self::HashFile => layout.hash_file.clone(),
        }
    }

    /// Short human-readable description.
    pub fn description(self) -> &'static str {
        match self {
            Self::PropertyDefs => "struct definitions",
            Self::InitHalo => "halo initialization",
            Self::InitGalaxy => "galaxy initialization",
            Self::CopyToOutput => "output copy",
            Self::FieldCount => "HDF5 field count",
            Self::FieldDefinitions => "HDF5 field definitions",
            Self::LayoutBindings => "NumPy dtypes",
            Self::LayoutPackage => "bindings package",
            Self::ModuleRegistry => "module registration",
            Self::BuildFragment => "module source list",
            Self::ModuleReference => "module reference",
            Self::ValidationManifest => "validation manifest",
            Self::HashFile => "hash record",
        }
    }

    /// Render this artifact.
    pub fn emit(self, ctx: &EmitContext<'_>) -> CodegenResult<String> {
        match self {
            Self::PropertyDefs => structs::emit(ctx),
            Self::InitHalo => init::emit_halo(ctx),
            Self::InitGalaxy => init::emit_galaxy(ctx),
            Self::CopyToOutput => output::emit(ctx),
            Self::FieldCount => fields::emit_count(ctx),
            Self::FieldDefinitions => fields::emit_definitions(ctx),
            Self::LayoutBindings => bindings::emit_dtype(ctx),
            Self::LayoutPackage => bindings::emit_package(ctx),
            Self::ModuleRegistry => registration::emit(ctx),
            Self::BuildFragment => makefrag::emit(ctx),
            Self::ModuleReference => docs::emit(ctx),
            Self::ValidationManifest => manifest::emit(ctx),
            Self::HashFile => stamp::emit(ctx),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A rendered artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    /// Which artifact.
    pub kind: ArtifactKind,
    /// Repository-relative target path.
    pub path: PathBuf,
    /// Full file content.
    pub content: String,
    /// Hash written into the header.
    pub embedded_hash: SourceHash,
}

/// Render every artifact in memory.
pub fn emit_all(ctx: &EmitContext<'_>) -> CodegenResult<Vec<GeneratedArtifact>> {
    ArtifactKind::ALL
        .iter()
        .map(|&kind| {
            Ok(GeneratedArtifact {
                kind,
                path: kind.path(ctx.layout),
                content: kind.emit(ctx)?,
                embedded_hash: ctx.hash().clone(),
            })
        })
        .collect()
}

/// Write artifacts under `root`, creating directories as needed.
///
/// Returns the absolute paths written.
pub fn write_all(root: &Path, artifacts: &[GeneratedArtifact]) -> CodegenResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = root.join(&artifact.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CodegenError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&path, &artifact.content).map_err(|source| CodegenError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %artifact.path.display(), kind = %artifact.kind, "wrote artifact");
        written.push(path);
    }
    Ok(written)
}

/// Whether the tree under `root` was generated from `hash` and is complete.
///
/// True only if the hash file records `hash` and every artifact exists.
pub fn is_current(root: &Path, layout: &Layout, hash: &SourceHash) -> bool {
    let recorded = stamp::read_recorded(&root.join(&layout.hash_file));
    if recorded.as_ref() != Some(hash) {
        tracing::debug!(recorded = ?recorded.as_ref().map(SourceHash::as_str), "hash record differs");
        return false;
    }
    ArtifactKind::ALL
        .iter()
        .all(|kind| root.join(kind.path(layout)).is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fixtures::*;
    use mimic_core::TypeRegistry;

    #[test]
    fn test_default_paths() {
        let layout = Layout::default();
        assert_eq!(
            ArtifactKind::PropertyDefs.path(&layout),
            PathBuf::from("src/include/generated/property_defs.h")
        );
        assert_eq!(
            ArtifactKind::LayoutBindings.path(&layout),
            PathBuf::from("output/mimic-plot/generated/dtype.py")
        );
        assert_eq!(
            ArtifactKind::ValidationManifest.path(&layout),
            PathBuf::from("tests/generated/property_ranges.json")
        );
    }

    #[test]
    fn test_paths_are_distinct() {
        let layout = Layout::default();
        let paths: std::collections::BTreeSet<PathBuf> =
            ArtifactKind::ALL.iter().map(|k| k.path(&layout)).collect();
        assert_eq!(paths.len(), ArtifactKind::ALL.len());
    }

    #[test]
    fn test_write_then_current() {
        let model = model(standard_properties(), standard_modules());
        let types = TypeRegistry::standard();
        let layout = Layout::default();
        let ctx = EmitContext::new(&model, &types, &layout, timestamp()).unwrap();
        let artifacts = emit_all(&ctx).unwrap();
        assert_eq!(artifacts.len(), ArtifactKind::ALL.len());

        let dir = tempfile::tempdir().unwrap();
        assert!(!is_current(dir.path(), &layout, &hash()));
        let written = write_all(dir.path(), &artifacts).unwrap();
        assert!(written.iter().all(|p| p.is_file()));
        assert!(is_current(dir.path(), &layout, &hash()));

        std::fs::remove_file(dir.path().join(ArtifactKind::FieldCount.path(&layout))).unwrap();
        assert!(!is_current(dir.path(), &layout, &hash()));
    }
}
