//! # Property Definitions
//!
//! A property is one named field of the simulation's per-halo state. The two
//! property files (`halo_properties.yaml` and `galaxy_properties.yaml`) share
//! one schema; the category a property came from decides its defaults and
//! which generated record owns it.
//!
//! Enumerated fields (`type`, `init_source`, `output_source`) deserialize from
//! any string. Known spellings, including the snake_case aliases found in
//! older metadata files, map to a variant; anything else becomes
//! `Unrecognized` and is reported by the validator.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Routes a string-spelled enum through its `parse`/`as_str` pair for serde
/// and `Display`. Deserialization never fails for a string input.
macro_rules! impl_spelled_enum {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Ok(Self::parse(&raw))
            }
        }

        impl Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ty {
            /// Whether the spelling mapped to a known variant.
            pub fn is_recognized(&self) -> bool {
                !matches!(self, Self::Unrecognized(_))
            }
        }
    };
}

pub(crate) use impl_spelled_enum;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Storage type of a property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyType {
    /// 32-bit signed integer.
    Int,
    /// Single-precision float.
    Float,
    /// Double-precision float.
    Double,
    /// 64-bit signed integer.
    LongLong,
    /// Three single-precision floats.
    Vec3Float,
    /// Three 32-bit integers.
    Vec3Int,
    /// A spelling that matches no known type.
    Unrecognized(String),
}

impl PropertyType {
    /// Every recognised type, in declaration order.
    pub const ALL: [PropertyType; 6] = [
        Self::Int,
        Self::Float,
        Self::Double,
        Self::LongLong,
        Self::Vec3Float,
        Self::Vec3Int,
    ];

    /// Map a YAML spelling onto a type.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "int" => Self::Int,
            "float" => Self::Float,
            "double" => Self::Double,
            "long-long" | "long_long" | "long long" => Self::LongLong,
            "vec3-float" | "vec3_float" => Self::Vec3Float,
            "vec3-int" | "vec3_int" => Self::Vec3Int,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Canonical spelling.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Double => "double",
            Self::LongLong => "long-long",
            Self::Vec3Float => "vec3-float",
            Self::Vec3Int => "vec3-int",
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Scalar numeric types hold a single number.
    pub fn is_scalar_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::Double | Self::LongLong)
    }

    /// Integer element types, scalar or vector.
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Int | Self::LongLong | Self::Vec3Int)
    }
}

impl_spelled_enum!(PropertyType);

/// How a property is initialised when a halo enters processing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InitSource {
    /// Assign `init_value`.
    Default,
    /// Copy the same-named field of the input tree record.
    CopyFromSource,
    /// Element-wise copy of a vector field of the input tree record.
    CopyFromSourceArray,
    /// Call `init_function(halonr)`.
    Calculate,
    /// Hand-written initialization; emit a comment only.
    Skip,
    /// A spelling that matches no known source.
    Unrecognized(String),
}

impl InitSource {
    /// Map a YAML spelling onto an init source.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "default" => Self::Default,
            "copy-from-source" | "copy_from_source" | "copy_from_tree" => Self::CopyFromSource,
            "copy-from-source-array" | "copy_from_source_array" | "copy_from_tree_array" => {
                Self::CopyFromSourceArray
            }
            "calculate" => Self::Calculate,
            "skip" => Self::Skip,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Canonical spelling.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Default => "default",
            Self::CopyFromSource => "copy-from-source",
            Self::CopyFromSourceArray => "copy-from-source-array",
            Self::Calculate => "calculate",
            Self::Skip => "skip",
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl_spelled_enum!(InitSource);

/// How a property reaches the output record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OutputSource {
    /// `o->X = g->X`.
    CopyDirect,
    /// Element-wise copy of a vector field.
    CopyDirectArray,
    /// Copy a (possibly renamed) field of the input tree record.
    CopyFromSource,
    /// Element-wise copy of a (possibly renamed) input tree vector field.
    CopyFromSourceArray,
    /// `o->X = output_function(output_function_arg)`.
    Recompute,
    /// Two-branch assignment on `output_condition`.
    Conditional,
    /// Hand-written output code; emit a comment only.
    Custom,
    /// Copy from the separately owned galaxy payload.
    DerivedFromOwnedPayload,
    /// A spelling that matches no known source.
    Unrecognized(String),
}

impl OutputSource {
    /// Map a YAML spelling onto an output source.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "copy-direct" | "copy_direct" => Self::CopyDirect,
            "copy-direct-array" | "copy_direct_array" => Self::CopyDirectArray,
            "copy-from-source" | "copy_from_source" | "copy_from_tree" => Self::CopyFromSource,
            "copy-from-source-array" | "copy_from_source_array" | "copy_from_tree_array" => {
                Self::CopyFromSourceArray
            }
            "recompute" | "recalculate" => Self::Recompute,
            "conditional" => Self::Conditional,
            "custom" => Self::Custom,
            "derived-from-owned-payload" | "galaxy_property" => Self::DerivedFromOwnedPayload,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Canonical spelling.
    pub fn as_str(&self) -> &str {
        match self {
            Self::CopyDirect => "copy-direct",
            Self::CopyDirectArray => "copy-direct-array",
            Self::CopyFromSource => "copy-from-source",
            Self::CopyFromSourceArray => "copy-from-source-array",
            Self::Recompute => "recompute",
            Self::Conditional => "conditional",
            Self::Custom => "custom",
            Self::DerivedFromOwnedPayload => "derived-from-owned-payload",
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Variants that copy element-wise and therefore need a vector type.
    pub fn is_array_copy(&self) -> bool {
        matches!(self, Self::CopyDirectArray | Self::CopyFromSourceArray)
    }
}

impl_spelled_enum!(OutputSource);

/// Which property file a definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyCategory {
    /// `halo_properties.yaml`: fields of the processing record.
    Halo,
    /// `galaxy_properties.yaml`: fields of the owned payload record.
    Galaxy,
}

impl PropertyCategory {
    /// Top-level YAML key of the property list.
    pub fn yaml_key(self) -> &'static str {
        match self {
            Self::Halo => "halo_properties",
            Self::Galaxy => "galaxy_properties",
        }
    }

    /// Lowercase label used in reports and the validation manifest.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Halo => "halo",
            Self::Galaxy => "galaxy",
        }
    }
}

impl fmt::Display for PropertyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Scalar values
// ---------------------------------------------------------------------------

/// A YAML scalar that is pasted into generated code: init values, conditional
/// branch values, parameter defaults, sentinels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// `true` / `false`.
    Bool(bool),
    /// An integer literal.
    Int(i64),
    /// A floating point literal.
    Float(f64),
    /// Free text, usually a C expression.
    Text(String),
}

impl Scalar {
    /// Render as a C literal or expression. Floats always keep a decimal
    /// point or exponent, so `0.0` stays `0.0`.
    pub fn to_c_literal(&self) -> String {
        match self {
            Self::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => format!("{f:?}"),
            Self::Text(s) => s.clone(),
        }
    }

    /// Numeric value, if this scalar is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Whether the scalar is numeric and has no fractional part.
    pub fn is_integral(&self) -> bool {
        match self {
            Self::Int(_) => true,
            Self::Float(f) => f.fract() == 0.0,
            _ => false,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_c_literal())
    }
}

// ---------------------------------------------------------------------------
// PropertyDefinition
// ---------------------------------------------------------------------------

/// One entry of a property file.
///
/// Only the five structural fields are required. Everything conditional on
/// `init_source` or `output_source` is optional here and checked by the
/// validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    /// Field name in every generated record.
    pub name: String,
    /// Storage type.
    #[serde(rename = "type")]
    pub kind: PropertyType,
    /// Physical units, free text.
    pub units: String,
    /// Human-readable description.
    pub description: String,
    /// Whether the property is written to the output record.
    pub output: bool,
    /// Initialization strategy; category default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_source: Option<InitSource>,
    /// Constant for `init_source: default`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_value: Option<Scalar>,
    /// Function for `init_source: calculate`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_function: Option<String>,
    /// Output strategy; category default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_source: Option<OutputSource>,
    /// Input tree field for the copy-from-source variants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tree_field: Option<String>,
    /// Function for `output_source: recompute`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_function: Option<String>,
    /// Argument expression for `output_source: recompute`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_function_arg: Option<String>,
    /// Condition expression for `output_source: conditional`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_condition: Option<String>,
    /// Value assigned when the condition holds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_true_value: Option<Scalar>,
    /// Value assigned otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_false_value: Option<Scalar>,
    /// Inclusive `[min, max]` for scientific range checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Vec<f64>>,
    /// Values exempt from range checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentinels: Option<Vec<Scalar>>,
}

impl PropertyDefinition {
    /// Init source with the category default applied.
    ///
    /// Halo properties without an `init_source` are initialised by hand;
    /// galaxy properties default to a constant.
    pub fn init_source_for(&self, category: PropertyCategory) -> InitSource {
        match (&self.init_source, category) {
            (Some(source), _) => source.clone(),
            (None, PropertyCategory::Halo) => InitSource::Skip,
            (None, PropertyCategory::Galaxy) => InitSource::Default,
        }
    }

    /// Output source with the category default applied.
    pub fn output_source_for(&self, category: PropertyCategory) -> OutputSource {
        match (&self.output_source, category) {
            (Some(source), _) => source.clone(),
            (None, PropertyCategory::Halo) => OutputSource::CopyDirect,
            (None, PropertyCategory::Galaxy) => OutputSource::DerivedFromOwnedPayload,
        }
    }

    /// Whether a halo property belongs in the processing record.
    ///
    /// Internal-only properties always do. Output properties do unless they
    /// are explicitly `init_source: skip`, in which case they exist only in
    /// the output record. An absent `init_source` counts as participating.
    pub fn in_processing_record(&self) -> bool {
        !self.output || self.init_source != Some(InitSource::Skip)
    }
}

// ---------------------------------------------------------------------------
// PropertySet
// ---------------------------------------------------------------------------

/// Both property lists, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySet {
    /// Entries of `halo_properties.yaml`.
    pub halo: Vec<PropertyDefinition>,
    /// Entries of `galaxy_properties.yaml`.
    pub galaxy: Vec<PropertyDefinition>,
}

impl PropertySet {
    /// Properties of one category.
    pub fn category(&self, category: PropertyCategory) -> &[PropertyDefinition] {
        match category {
            PropertyCategory::Halo => &self.halo,
            PropertyCategory::Galaxy => &self.galaxy,
        }
    }

    /// Every property tagged with its category, halo first.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyCategory, &PropertyDefinition)> {
        self.halo
            .iter()
            .map(|p| (PropertyCategory::Halo, p))
            .chain(self.galaxy.iter().map(|p| (PropertyCategory::Galaxy, p)))
    }

    /// Output-eligible properties in serialization order (halo, then galaxy).
    pub fn output_properties(&self) -> impl Iterator<Item = (PropertyCategory, &PropertyDefinition)> {
        self.iter().filter(|(_, p)| p.output)
    }

    /// Names of every property in both files.
    pub fn names(&self) -> BTreeSet<&str> {
        self.iter().map(|(_, p)| p.name.as_str()).collect()
    }

    /// Total number of properties.
    pub fn len(&self) -> usize {
        self.halo.len() + self.galaxy.len()
    }

    /// Whether both lists are empty.
    pub fn is_empty(&self) -> bool {
        self.halo.is_empty() && self.galaxy.is_empty()
    }
}
