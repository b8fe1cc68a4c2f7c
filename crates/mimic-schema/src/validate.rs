//! # Metadata Validation
//!
//! Checks every loaded property entry and module manifest and collects the
//! findings into one [`DiagnosticsReport`]. Nothing short-circuits across
//! entities: a run reports every problem it can see.
//!
//! ## Stages
//!
//! Each document goes through:
//!
//! 1. **Structure.** The embedded JSON Schema for its kind. A document with
//!    structural violations stops here, since its fields cannot be trusted.
//! 2. **Typed deserialization** into [`PropertyDefinition`] or
//!    [`ModuleDefinition`].
//! 3. **Value rules** on the typed record, in a fixed order. For modules:
//!    version, naming, register function, parameters, compilation features,
//!    declared files, then the register-function text search. Naming errors
//!    are therefore always recorded before file or dependency errors of the
//!    same module.
//!
//! After all entities: duplicate property names, capability names against
//! the property set, and the module graph for cycles.
//!
//! Utility modules (`is_utility: true`) only get the name checks and
//! test-file warnings.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde_json::Value;

use mimic_core::ident::{is_identifier, is_semver};
use mimic_core::{
    DiagnosticsReport, ErrorClass, InitSource, Layout, LocatedModule, ModuleDefinition,
    OutputSource, PropertyCategory, PropertyDefinition, PropertySet, SchemaTables, SourceHash,
    TestKind, TypeInfo,
};

use crate::error::SchemaBuildError;
use crate::loader::{RawModule, RawPropertyFile, SpecSet};
use crate::resolve::{check_capabilities, DependencyGraph};
use crate::structure::{DocumentKind, StructuralSchemas};

/// Entity name for findings that belong to no single property or module.
pub const GLOBAL_ENTITY: &str = "GLOBAL";

/// Fully validated metadata, ready for dependency ordering and emission.
#[derive(Debug, Clone)]
pub struct ValidatedModel {
    /// Repository root.
    pub root: PathBuf,
    /// Both property lists.
    pub properties: PropertySet,
    /// Modules in discovery order.
    pub modules: Vec<LocatedModule>,
    /// Hash over every input.
    pub source_hash: SourceHash,
}

/// Outcome of one validation run.
#[derive(Debug, Clone)]
pub struct Validation {
    /// Every finding.
    pub report: DiagnosticsReport,
    /// The typed model; `None` if any error was recorded.
    pub model: Option<ValidatedModel>,
}

/// Validates a [`SpecSet`] against structural and value rules.
#[derive(Debug)]
pub struct SchemaValidator {
    tables: SchemaTables,
    structural: StructuralSchemas,
}

impl SchemaValidator {
    /// Build a validator with the given tables.
    pub fn new(tables: SchemaTables) -> Result<Self, SchemaBuildError> {
        Ok(Self {
            tables,
            structural: StructuralSchemas::compile()?,
        })
    }

    /// The injected tables.
    pub fn tables(&self) -> &SchemaTables {
        &self.tables
    }

    /// Run every check over `specs`.
    pub fn validate(&self, specs: &SpecSet, layout: &Layout) -> Validation {
        let mut report = DiagnosticsReport::new();

        let properties = self.validate_properties(specs, &mut report);

        let mut modules = Vec::with_capacity(specs.modules.len());
        for raw in &specs.modules {
            if let Some(module) = self.validate_module(raw, &specs.root, layout, &mut report) {
                modules.push(module);
            }
        }

        check_capabilities(&modules, &properties, &mut report);
        let graph = DependencyGraph::build(modules.iter().map(|m| &m.definition));
        if let Err(err) = graph.topological_order() {
            report.error(
                GLOBAL_ENTITY,
                ErrorClass::Dependency,
                format!("{err} (cycle members: {})", err.members.join(", ")),
            );
            if !err.blocked.is_empty() {
                report.error(
                    GLOBAL_ENTITY,
                    ErrorClass::Dependency,
                    format!("modules blocked by the cycle: {}", err.blocked.join(", ")),
                );
            }
        }

        tracing::debug!(
            properties = properties.len(),
            modules = modules.len(),
            errors = report.error_count(),
            warnings = report.warning_count(),
            "validation finished"
        );

        let model = (!report.has_errors()).then(|| ValidatedModel {
            root: specs.root.clone(),
            properties,
            modules,
            source_hash: specs.source_hash.clone(),
        });
        Validation { report, model }
    }

    // ------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------

    fn validate_properties(&self, specs: &SpecSet, report: &mut DiagnosticsReport) -> PropertySet {
        let halo = self.validate_property_file(&specs.halo, report);
        let galaxy = self.validate_property_file(&specs.galaxy, report);
        let set = PropertySet { halo, galaxy };

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut first_seen = Vec::new();
        for (_, prop) in set.iter() {
            let count = counts.entry(prop.name.as_str()).or_default();
            if *count == 0 {
                first_seen.push(prop.name.as_str());
            }
            *count += 1;
        }
        for name in first_seen {
            let count = counts.get(name).copied().unwrap_or_default();
            if count > 1 {
                report.error(
                    name,
                    ErrorClass::Schema,
                    format!("duplicate property name, defined {count} times across halo and galaxy files"),
                );
            }
        }
        set
    }

    fn validate_property_file(
        &self,
        file: &RawPropertyFile,
        report: &mut DiagnosticsReport,
    ) -> Vec<PropertyDefinition> {
        let key = file.category.yaml_key();
        let Some(entries) = &file.entries else {
            report.error(
                key,
                ErrorClass::Schema,
                format!("{} has no '{key}' list", file.path.display()),
            );
            return Vec::new();
        };

        entries
            .iter()
            .enumerate()
            .filter_map(|(index, value)| {
                let entity = value
                    .get("name")
                    .and_then(Value::as_str)
                    .map(String::from)
                    .unwrap_or_else(|| format!("{key}[{index}]"));
                self.validate_property(file.category, &entity, value, report)
            })
            .collect()
    }

    fn validate_property(
        &self,
        category: PropertyCategory,
        entity: &str,
        value: &Value,
        report: &mut DiagnosticsReport,
    ) -> Option<PropertyDefinition> {
        if !self.check_structure(DocumentKind::Property, entity, value, report) {
            return None;
        }
        let prop: PropertyDefinition = match serde_json::from_value(value.clone()) {
            Ok(prop) => prop,
            Err(e) => {
                report.error(entity, ErrorClass::Schema, format!("cannot read property: {e}"));
                return None;
            }
        };

        let type_info = self.tables.types.get(&prop.kind);
        if type_info.is_none() {
            report.error(
                entity,
                ErrorClass::Schema,
                format!(
                    "invalid type '{}'; expected one of: {}",
                    prop.kind,
                    self.tables.types.names().join(", ")
                ),
            );
        }

        if !is_identifier(&prop.name) {
            report.error(
                entity,
                ErrorClass::Naming,
                format!("'{}' is not a valid C identifier", prop.name),
            );
        }

        self.check_init_source(category, &prop, type_info, entity, report);
        self.check_output_source(category, &prop, type_info, entity, report);
        check_range_and_sentinels(&prop, entity, report);

        Some(prop)
    }

    fn check_init_source(
        &self,
        category: PropertyCategory,
        prop: &PropertyDefinition,
        type_info: Option<&TypeInfo>,
        entity: &str,
        report: &mut DiagnosticsReport,
    ) {
        match prop.init_source_for(category) {
            InitSource::Unrecognized(raw) => report.error(
                entity,
                ErrorClass::Schema,
                format!(
                    "invalid init_source '{raw}'; expected one of: default, copy-from-source, \
                     copy-from-source-array, calculate, skip"
                ),
            ),
            // Galaxy entries fall back to 0.0.
            InitSource::Default
                if category == PropertyCategory::Halo && prop.init_value.is_none() =>
            {
                report.error(entity, ErrorClass::Schema, "init_source 'default' requires init_value")
            }
            InitSource::Calculate if prop.init_function.is_none() => report.error(
                entity,
                ErrorClass::Schema,
                "init_source 'calculate' requires init_function",
            ),
            InitSource::CopyFromSourceArray if type_info.is_some_and(|t| !t.is_vector()) => {
                report.error(
                    entity,
                    ErrorClass::Schema,
                    format!(
                        "init_source 'copy-from-source-array' requires a vector type, got '{}'",
                        prop.kind
                    ),
                )
            }
            _ => {}
        }
    }

    fn check_output_source(
        &self,
        category: PropertyCategory,
        prop: &PropertyDefinition,
        type_info: Option<&TypeInfo>,
        entity: &str,
        report: &mut DiagnosticsReport,
    ) {
        let source = prop.output_source_for(category);
        if let OutputSource::Unrecognized(raw) = &source {
            report.error(
                entity,
                ErrorClass::Schema,
                format!(
                    "invalid output_source '{raw}'; expected one of: copy-direct, copy-direct-array, \
                     copy-from-source, copy-from-source-array, recompute, conditional, custom, \
                     derived-from-owned-payload"
                ),
            );
            return;
        }
        if !prop.output {
            return;
        }

        let mut require = |present: bool, field: &str| {
            if !present {
                report.error(
                    entity,
                    ErrorClass::Schema,
                    format!("output_source '{source}' requires {field}"),
                );
            }
        };
        match source {
            OutputSource::CopyFromSource => {
                require(prop.output_tree_field.is_some(), "output_tree_field");
            }
            OutputSource::Recompute => {
                require(prop.output_function.is_some(), "output_function");
                require(prop.output_function_arg.is_some(), "output_function_arg");
            }
            OutputSource::Conditional => {
                require(prop.output_condition.is_some(), "output_condition");
                require(prop.output_true_value.is_some(), "output_true_value");
                require(prop.output_false_value.is_some(), "output_false_value");
            }
            _ => {}
        }

        if source.is_array_copy() && type_info.is_some_and(|t| !t.is_vector()) {
            report.error(
                entity,
                ErrorClass::Schema,
                format!(
                    "output_source '{source}' requires a vector type, got '{}'",
                    prop.kind
                ),
            );
        }
    }

    // ------------------------------------------------------------------
    // Modules
    // ------------------------------------------------------------------

    fn validate_module(
        &self,
        raw: &RawModule,
        root: &Path,
        layout: &Layout,
        report: &mut DiagnosticsReport,
    ) -> Option<LocatedModule> {
        let dir_name = raw.dir_name();
        let Some(body) = &raw.body else {
            report.error(
                &dir_name,
                ErrorClass::Schema,
                format!("{} has no 'module' mapping", raw.manifest.display()),
            );
            return None;
        };
        let entity = body
            .get("name")
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| dir_name.clone());
        let is_utility = body.get("is_utility").and_then(Value::as_bool).unwrap_or(false);
        let kind = if is_utility {
            DocumentKind::UtilityModule
        } else {
            DocumentKind::Module
        };

        if !self.check_structure(kind, &entity, body, report) {
            return None;
        }
        let definition: ModuleDefinition = match serde_json::from_value(body.clone()) {
            Ok(definition) => definition,
            Err(e) => {
                report.error(&entity, ErrorClass::Schema, format!("cannot read module: {e}"));
                return None;
            }
        };
        let module = LocatedModule {
            definition,
            dir: raw.dir.clone(),
            relative_dir: raw.relative_dir.clone(),
            manifest: raw.manifest.clone(),
        };

        if is_utility {
            check_module_name(&module, &entity, report);
            warn_missing_tests(&module, root, layout, &entity, report);
            return Some(module);
        }

        let def = &module.definition;
        if !is_semver(&def.version) {
            report.error(
                &entity,
                ErrorClass::Schema,
                format!("invalid version '{}'; expected MAJOR.MINOR.PATCH", def.version),
            );
        }
        check_module_name(&module, &entity, report);
        check_register_name(def, &entity, report);
        check_parameters(def, &entity, report);
        for feature in &def.compilation_requires {
            if !self.tables.is_known_feature(feature) {
                let known: Vec<&str> =
                    self.tables.compilation_features.iter().map(String::as_str).collect();
                report.error(
                    &entity,
                    ErrorClass::Schema,
                    format!(
                        "unknown compilation_requires entry '{feature}'; expected one of: {}",
                        known.join(", ")
                    ),
                );
            }
        }
        check_declared_sources(&module, &entity, report);
        warn_missing_tests(&module, root, layout, &entity, report);
        check_declared_docs(def, root, &entity, report);
        verify_register_function(&module, &entity, report);

        Some(module)
    }

    fn check_structure(
        &self,
        kind: DocumentKind,
        entity: &str,
        value: &Value,
        report: &mut DiagnosticsReport,
    ) -> bool {
        let violations = self.structural.violations(kind, value);
        for violation in &violations {
            report.error(entity, ErrorClass::Schema, violation.to_string());
        }
        violations.is_empty()
    }
}

fn check_range_and_sentinels(prop: &PropertyDefinition, entity: &str, report: &mut DiagnosticsReport) {
    if let Some(range) = &prop.range {
        match range.as_slice() {
            [min, max] if min > max => report.error(
                entity,
                ErrorClass::Schema,
                format!("range invalid: min ({min}) > max ({max})"),
            ),
            [_, _] => {}
            _ => report.error(entity, ErrorClass::Schema, "range must be [min, max]"),
        }
    }

    let Some(sentinels) = &prop.sentinels else {
        return;
    };
    if !prop.kind.is_scalar_numeric() {
        return;
    }
    for sentinel in sentinels {
        if sentinel.as_f64().is_none() {
            report.error(
                entity,
                ErrorClass::Schema,
                format!("non-numeric sentinel '{sentinel}' for type '{}'", prop.kind),
            );
        } else if prop.kind.is_integer() && !sentinel.is_integral() {
            report.warning(
                entity,
                ErrorClass::Schema,
                format!("non-integer sentinel {sentinel} for type '{}'", prop.kind),
            );
        }
    }
}

fn check_module_name(module: &LocatedModule, entity: &str, report: &mut DiagnosticsReport) {
    let name = module.name();
    if !is_identifier(name) {
        report.error(
            entity,
            ErrorClass::Naming,
            format!("module name '{name}' is not a valid C identifier"),
        );
    } else if name.chars().any(|c| c.is_ascii_uppercase()) {
        report.warning(
            entity,
            ErrorClass::Naming,
            format!("module name '{name}' should be lowercase snake_case"),
        );
    }

    let dir_name = module.dir_name();
    if name != dir_name {
        report.error(
            entity,
            ErrorClass::Naming,
            format!("module name '{name}' does not match directory name '{dir_name}'"),
        );
    }
}

fn check_register_name(def: &ModuleDefinition, entity: &str, report: &mut DiagnosticsReport) {
    let expected = format!("{}_register", def.name);
    match &def.register_function {
        Some(actual) if *actual == expected => {}
        Some(actual) => report.error(
            entity,
            ErrorClass::Naming,
            format!("register_function '{actual}' must be '{expected}'"),
        ),
        None => report.error(
            entity,
            ErrorClass::Naming,
            format!("register_function missing; expected '{expected}'"),
        ),
    }
}

fn check_parameters(def: &ModuleDefinition, entity: &str, report: &mut DiagnosticsReport) {
    let mut seen = std::collections::BTreeSet::new();
    for param in &def.parameters {
        let name = &param.name;
        if !is_identifier(name) {
            report.error(
                entity,
                ErrorClass::Naming,
                format!("parameter name '{name}' is not a valid identifier"),
            );
        }
        if !seen.insert(name.as_str()) {
            report.error(
                entity,
                ErrorClass::Parameter,
                format!("duplicate parameter name '{name}'"),
            );
        }

        if !param.kind.is_recognized() {
            report.error(
                entity,
                ErrorClass::Parameter,
                format!(
                    "parameter '{name}' has invalid type '{}'; expected double, int or string",
                    param.kind
                ),
            );
        } else if !param.kind.accepts(&param.default) {
            report.error(
                entity,
                ErrorClass::Parameter,
                format!(
                    "parameter '{name}' default {} does not match type '{}'",
                    param.default, param.kind
                ),
            );
        }

        let Some(range) = &param.range else {
            continue;
        };
        if param.kind.is_recognized() && !param.kind.is_numeric() {
            report.error(
                entity,
                ErrorClass::Parameter,
                format!("parameter '{name}' has a range but type '{}' is not numeric", param.kind),
            );
            continue;
        }
        match range.as_slice() {
            [min, max] if min > max => report.error(
                entity,
                ErrorClass::Parameter,
                format!("parameter '{name}' range invalid: min ({min}) > max ({max})"),
            ),
            [_, _] => {}
            _ => report.error(
                entity,
                ErrorClass::Parameter,
                format!("parameter '{name}' range must be [min, max]"),
            ),
        }
    }
}

fn check_declared_sources(module: &LocatedModule, entity: &str, report: &mut DiagnosticsReport) {
    let def = &module.definition;
    let declared = def
        .sources
        .iter()
        .map(|f| ("source", f))
        .chain(def.headers.iter().map(|f| ("header", f)));
    for (label, file) in declared {
        if !module.dir.join(file).is_file() {
            report.error(
                entity,
                ErrorClass::FileNotFound,
                format!("{label} file not found: {}", module.dir.join(file).display()),
            );
        }
    }
}

/// Where a declared test file is found, if anywhere.
///
/// Unit tests may live in the module directory or the shared unit-test
/// directory; other kinds only in the module directory.
pub fn locate_test_file(
    kind: TestKind,
    file: &str,
    module_dir: &Path,
    root: &Path,
    layout: &Layout,
) -> Option<PathBuf> {
    let local = module_dir.join(file);
    if local.is_file() {
        return Some(local);
    }
    if kind == TestKind::Unit {
        let shared = root.join(&layout.unit_tests_dir).join(file);
        if shared.is_file() {
            return Some(shared);
        }
    }
    None
}

fn warn_missing_tests(
    module: &LocatedModule,
    root: &Path,
    layout: &Layout,
    entity: &str,
    report: &mut DiagnosticsReport,
) {
    let Some(tests) = &module.definition.tests else {
        return;
    };
    for kind in TestKind::ALL {
        let Some(files) = tests.get(kind) else {
            continue;
        };
        for file in files.paths() {
            if locate_test_file(kind, file, &module.dir, root, layout).is_none() {
                report.warning(
                    entity,
                    ErrorClass::FileNotFound,
                    format!("declared {kind} test not found: {file}"),
                );
            }
        }
    }
}

fn check_declared_docs(def: &ModuleDefinition, root: &Path, entity: &str, report: &mut DiagnosticsReport) {
    let Some(docs) = &def.docs else {
        return;
    };
    for (label, path) in docs.links() {
        if !root.join(path).is_file() {
            report.warning(
                entity,
                ErrorClass::FileNotFound,
                format!("declared {label} doc not found: {path}"),
            );
        }
    }
}

/// Search the declared sources for `void <register_function>(`.
///
/// A textual check: comments and preprocessor tricks can fool it either way.
fn verify_register_function(module: &LocatedModule, entity: &str, report: &mut DiagnosticsReport) {
    let Some(function) = &module.definition.register_function else {
        return;
    };
    let pattern = match Regex::new(&format!(r"\bvoid\s+{}\s*\(", regex::escape(function))) {
        Ok(pattern) => pattern,
        Err(e) => {
            report.error(
                entity,
                ErrorClass::CodeVerification,
                format!("cannot search for register function '{function}': {e}"),
            );
            return;
        }
    };

    let found = module.definition.sources.iter().any(|source| {
        let path = module.dir.join(source);
        match std::fs::read_to_string(&path) {
            Ok(content) => pattern.is_match(&content),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "source not readable");
                false
            }
        }
    });

    if !found {
        report.error(
            entity,
            ErrorClass::CodeVerification,
            format!("register function '{function}' not found in source files"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::SpecLoader;

    struct Repo {
        dir: tempfile::TempDir,
    }

    impl Repo {
        fn new(halo: &str, galaxy: &str) -> Self {
            let repo = Self {
                dir: tempfile::tempdir().unwrap(),
            };
            repo.write("metadata/properties/halo_properties.yaml", halo);
            repo.write("metadata/properties/galaxy_properties.yaml", galaxy);
            std::fs::create_dir_all(repo.root().join("src/modules")).unwrap();
            repo
        }

        fn root(&self) -> &Path {
            self.dir.path()
        }

        fn write(&self, rel: &str, content: &str) {
            let path = self.root().join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }

        fn module(&self, dir: &str, manifest: &str) {
            self.write(&format!("src/modules/{dir}/module_info.yaml"), manifest);
        }

        fn validate(&self) -> Validation {
            let layout = Layout::default();
            let specs = SpecLoader::new(self.root(), &layout).load().unwrap();
            SchemaValidator::new(SchemaTables::standard())
                .unwrap()
                .validate(&specs, &layout)
        }
    }

    const HALO: &str = "\
halo_properties:
  - name: Mvir
    type: float
    units: 1e10 Msun/h
    description: virial mass
    output: true
    output_source: copy-direct
  - name: HotGas
    type: float
    units: 1e10 Msun/h
    description: hot gas
    output: true
    init_source: default
    init_value: 0.0
";

    const GALAXY: &str = "\
galaxy_properties:
  - name: ColdGas
    type: float
    units: 1e10 Msun/h
    description: cold gas
    output: true
";

    fn module_yaml(name: &str, register: &str, requires: &str, provides: &str) -> String {
        format!(
            "module:
  name: {name}
  display_name: Test {name}
  description: test module
  version: 1.0.0
  author: tester
  sources: [{name}.c]
  headers: [{name}.h]
  register_function: {register}
  dependencies:
    requires: [{requires}]
    provides: [{provides}]
  parameters: []
"
        )
    }

    fn add_valid_module(repo: &Repo, name: &str, requires: &str, provides: &str) {
        repo.module(name, &module_yaml(name, &format!("{name}_register"), requires, provides));
        repo.write(
            &format!("src/modules/{name}/{name}.c"),
            &format!("void {name}_register(void) {{}}\n"),
        );
        repo.write(&format!("src/modules/{name}/{name}.h"), "#pragma once\n");
    }

    fn classes(validation: &Validation) -> Vec<ErrorClass> {
        validation.report.errors().map(|d| d.class).collect()
    }

    #[test]
    fn test_valid_repository_yields_model() {
        let repo = Repo::new(HALO, GALAXY);
        add_valid_module(&repo, "cooling", "HotGas", "ColdGas");
        let validation = repo.validate();
        assert_eq!(validation.report.error_count(), 0, "{:?}", validation.report);
        let model = validation.model.unwrap();
        assert_eq!(model.properties.halo.len(), 2);
        assert_eq!(model.modules.len(), 1);
    }

    #[test]
    fn test_missing_required_property_field() {
        let repo = Repo::new(
            "halo_properties:\n  - name: Mvir\n    type: float\n    units: x\n    output: true\n",
            GALAXY,
        );
        let validation = repo.validate();
        assert_eq!(validation.report.exit_code(), 1);
        assert!(validation.report.mentions("Mvir"));
        assert!(validation.model.is_none());
    }

    #[test]
    fn test_conditional_fields_and_enums() {
        let repo = Repo::new(
            "\
halo_properties:
  - name: A
    type: quad
    units: x
    description: d
    output: false
  - name: B
    type: float
    units: x
    description: d
    output: false
    init_source: default
  - name: C
    type: float
    units: x
    description: d
    output: true
    output_source: recompute
    output_function: f
  - name: D
    type: float
    units: x
    description: d
    output: true
    output_source: conditional
  - name: E
    type: float
    units: x
    description: d
    output: true
    output_source: copy-direct-array
  - name: F
    type: float
    units: x
    description: d
    output: true
    init_source: sometimes
",
            "galaxy_properties: []\n",
        );
        let validation = repo.validate();
        let errors: Vec<_> = validation.report.errors().collect();
        let for_entity = |e: &str| errors.iter().filter(|d| d.entity == e).count();
        assert_eq!(for_entity("A"), 1);
        assert_eq!(for_entity("B"), 1);
        assert_eq!(for_entity("C"), 1);
        assert_eq!(for_entity("D"), 3);
        assert_eq!(for_entity("E"), 1);
        assert_eq!(for_entity("F"), 1);
        assert!(errors.iter().all(|d| d.class == ErrorClass::Schema));
    }

    #[test]
    fn test_galaxy_default_needs_no_init_value() {
        let repo = Repo::new(
            HALO,
            "galaxy_properties:\n  - name: Sfr\n    type: float\n    units: x\n    description: d\n    output: false\n    init_source: default\n",
        );
        assert!(!repo.validate().report.has_errors());
    }

    #[test]
    fn test_duplicate_property_across_files() {
        let repo = Repo::new(
            HALO,
            "galaxy_properties:\n  - name: Mvir\n    type: float\n    units: x\n    description: d\n    output: false\n",
        );
        let validation = repo.validate();
        assert_eq!(validation.report.error_count(), 1);
        assert!(validation.report.errors().next().unwrap().message.contains("duplicate"));
    }

    #[test]
    fn test_property_range_rules() {
        let repo = Repo::new(
            "\
halo_properties:
  - name: Bad
    type: float
    units: x
    description: d
    output: true
    range: [5, 1]
  - name: Short
    type: float
    units: x
    description: d
    output: true
    range: [1]
  - name: Count
    type: int
    units: x
    description: d
    output: true
    sentinels: [-1, 0.5]
",
            "galaxy_properties: []\n",
        );
        let validation = repo.validate();
        assert_eq!(validation.report.error_count(), 2);
        assert_eq!(validation.report.warning_count(), 1);
    }

    #[test]
    fn test_invalid_property_identifier_is_naming_error() {
        let repo = Repo::new(
            "halo_properties:\n  - name: 2fast\n    type: float\n    units: x\n    description: d\n    output: false\n",
            "galaxy_properties: []\n",
        );
        assert_eq!(repo.validate().report.exit_code(), 4);
    }

    #[test]
    fn test_register_mismatch_recorded_before_file_errors() {
        let repo = Repo::new(HALO, GALAXY);
        // Manifest says foo_register, directory and name are bar, no sources on disk.
        repo.module("bar", &module_yaml("bar", "foo_register", "", ""));
        let validation = repo.validate();
        let classes = classes(&validation);
        assert_eq!(classes[0], ErrorClass::Naming);
        assert!(classes.contains(&ErrorClass::FileNotFound));
        assert_eq!(validation.report.exit_code(), 4);
    }

    #[test]
    fn test_name_must_match_directory() {
        let repo = Repo::new(HALO, GALAXY);
        add_valid_module(&repo, "cooling", "", "");
        repo.module("heating", &module_yaml("cooling", "cooling_register", "", ""));
        let validation = repo.validate();
        assert!(validation
            .report
            .errors()
            .any(|d| d.class == ErrorClass::Naming && d.message.contains("directory")));
    }

    #[test]
    fn test_parameter_errors() {
        let repo = Repo::new(HALO, GALAXY);
        add_valid_module(&repo, "sfr", "", "");
        repo.module(
            "sfr",
            "module:
  name: sfr
  display_name: SFR
  description: d
  version: 1.0.0
  author: a
  sources: [sfr.c]
  headers: [sfr.h]
  register_function: sfr_register
  dependencies: { requires: [], provides: [] }
  parameters:
    - { name: Eff, type: int, default: 0.5, description: efficiency }
    - { name: Alpha, type: double, default: 1, description: a, range: [5, 1] }
    - { name: Label, type: string, default: x, description: l, range: [0, 1] }
    - { name: Alpha, type: double, default: 0.1, description: dup }
    - { name: Kind, type: float, default: 0.1, description: k }
",
        );
        let validation = repo.validate();
        let classes = classes(&validation);
        assert_eq!(classes.len(), 5);
        assert!(classes.iter().all(|c| *c == ErrorClass::Parameter));
        assert_eq!(validation.report.exit_code(), 5);
    }

    #[test]
    fn test_register_function_not_in_sources() {
        let repo = Repo::new(HALO, GALAXY);
        add_valid_module(&repo, "cooling", "", "");
        repo.write("src/modules/cooling/cooling.c", "int cooling_register(void) { return 0; }\n");
        let validation = repo.validate();
        assert_eq!(classes(&validation), vec![ErrorClass::CodeVerification]);
        assert_eq!(validation.report.exit_code(), 6);
    }

    #[test]
    fn test_register_function_found_with_whitespace() {
        let repo = Repo::new(HALO, GALAXY);
        add_valid_module(&repo, "cooling", "", "");
        repo.write(
            "src/modules/cooling/cooling.c",
            "static int x;\nvoid\ncooling_register  (void)\n{\n}\n",
        );
        assert!(!repo.validate().report.has_errors());
    }

    #[test]
    fn test_missing_tests_and_docs_are_warnings() {
        let repo = Repo::new(HALO, GALAXY);
        add_valid_module(&repo, "cooling", "", "");
        let mut manifest = module_yaml("cooling", "cooling_register", "", "");
        manifest.push_str("  tests:\n    unit: test_unit_cooling.c\n  docs:\n    physics: docs/physics/cooling.md\n");
        repo.module("cooling", &manifest);
        let validation = repo.validate();
        assert!(!validation.report.has_errors());
        assert_eq!(validation.report.warning_count(), 2);
    }

    #[test]
    fn test_unit_test_found_in_shared_directory() {
        let repo = Repo::new(HALO, GALAXY);
        add_valid_module(&repo, "cooling", "", "");
        let mut manifest = module_yaml("cooling", "cooling_register", "", "");
        manifest.push_str("  tests:\n    unit: test_unit_cooling.c\n");
        repo.module("cooling", &manifest);
        repo.write("tests/unit/test_unit_cooling.c", "int main(void) { return 0; }\n");
        assert_eq!(repo.validate().report.warning_count(), 0);
    }

    #[test]
    fn test_unknown_compilation_feature() {
        let repo = Repo::new(HALO, GALAXY);
        add_valid_module(&repo, "cooling", "", "");
        let mut manifest = module_yaml("cooling", "cooling_register", "", "");
        manifest.push_str("  compilation_requires: [HDF5, CUDA]\n");
        repo.module("cooling", &manifest);
        let validation = repo.validate();
        assert_eq!(classes(&validation), vec![ErrorClass::Schema]);
    }

    #[test]
    fn test_unknown_capability_is_dependency_error() {
        let repo = Repo::new(HALO, GALAXY);
        add_valid_module(&repo, "cooling", "Nonexistent", "ColdGas");
        let validation = repo.validate();
        assert_eq!(classes(&validation), vec![ErrorClass::Dependency]);
    }

    #[test]
    fn test_cycle_is_dependency_error() {
        let repo = Repo::new(HALO, GALAXY);
        add_valid_module(&repo, "alpha", "ColdGas", "HotGas");
        add_valid_module(&repo, "beta", "HotGas", "ColdGas");
        let validation = repo.validate();
        let error = validation.report.errors().next().unwrap();
        assert_eq!(error.class, ErrorClass::Dependency);
        assert!(error.message.contains("alpha"));
        assert!(error.message.contains("beta"));
    }

    #[test]
    fn test_utility_module_reduced_checks() {
        let repo = Repo::new(HALO, GALAXY);
        repo.module(
            "_system/test_fixture",
            "module:\n  name: test_fixture\n  is_utility: true\n  tests:\n    unit: test_fixture.c\n",
        );
        let validation = repo.validate();
        assert!(!validation.report.has_errors());
        assert_eq!(validation.report.warning_count(), 1);
        assert!(validation.model.unwrap().modules[0].definition.is_utility);
    }

    #[test]
    fn test_module_without_mapping() {
        let repo = Repo::new(HALO, GALAXY);
        repo.module("ghost", "something_else: true\n");
        let validation = repo.validate();
        assert!(validation.report.mentions("ghost"));
        assert_eq!(validation.report.exit_code(), 1);
    }

    #[test]
    fn test_structural_error_skips_deeper_checks() {
        let repo = Repo::new(HALO, GALAXY);
        repo.module("broken", "module:\n  name: broken\n  version: 1.0\n");
        let validation = repo.validate();
        assert!(validation
            .report
            .errors()
            .all(|d| d.class == ErrorClass::Schema));
    }

    #[test]
    fn test_validation_is_exhaustive_across_modules() {
        let repo = Repo::new(HALO, GALAXY);
        repo.module("one", &module_yaml("one", "one_register", "", ""));
        repo.module("two", &module_yaml("two", "two_register", "", ""));
        let validation = repo.validate();
        assert!(validation.report.mentions("one"));
        assert!(validation.report.mentions("two"));
    }
}
