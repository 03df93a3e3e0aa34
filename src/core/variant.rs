//! Variant declarations and value domains.
//!
//! A [`VariantSchema`] is the catalog of user-selectable options. It is
//! built once and never mutated; every value supplied for a variant goes
//! through [`VariantSchema::validate`] before anything else looks at it.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::errors::ValidationError;

/// Sentinel accepted by path-valued variants meaning "not set".
pub const NONE: &str = "none";

/// A value as supplied by the resolver, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Bool(b) => write!(f, "{}", b),
            RawValue::Int(i) => write!(f, "{}", i),
            RawValue::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Bool(b)
    }
}

impl From<i64> for RawValue {
    fn from(i: i64) -> Self {
        RawValue::Int(i)
    }
}

impl From<i32> for RawValue {
    fn from(i: i32) -> Self {
        RawValue::Int(i64::from(i))
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Str(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Str(s)
    }
}

/// A validated variant value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariantValue {
    Bool(bool),
    Int(i64),
    Str(String),
    Multi(Vec<String>),
}

impl fmt::Display for VariantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantValue::Bool(b) => write!(f, "{}", b),
            VariantValue::Int(i) => write!(f, "{}", i),
            VariantValue::Str(s) => write!(f, "{}", s),
            VariantValue::Multi(values) => write!(f, "{}", values.join(",")),
        }
    }
}

/// Whether a variant holds one value or a set of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cardinality {
    #[default]
    Single,
    Multi,
}

/// A named check over string values that needs more than set membership.
///
/// Implementations may perform I/O. A failure is reported as-is and is
/// never retried.
pub trait DomainValidator: fmt::Debug + Send + Sync {
    /// Short description shown in listings (e.g. "directory or 'none'").
    fn describe(&self) -> &str;

    /// Check `value`, returning a human-readable reason on rejection.
    fn validate(&self, value: &str) -> Result<(), String>;
}

/// Accepts `none` or the path of an existing directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryOrNone;

impl DomainValidator for DirectoryOrNone {
    fn describe(&self) -> &str {
        "directory or 'none'"
    }

    fn validate(&self, value: &str) -> Result<(), String> {
        if value == NONE {
            return Ok(());
        }

        match std::fs::metadata(Path::new(value)) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err("not a directory".to_string()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err("no such directory".to_string()),
            Err(e) => Err(format!("cannot access directory: {}", e)),
        }
    }
}

/// The set of values a variant accepts.
#[derive(Debug, Clone)]
pub enum Domain {
    Bool,
    Enum(Vec<&'static str>),
    /// Integer with optional inclusive bounds.
    Integer { min: Option<i64>, max: Option<i64> },
    Custom(Arc<dyn DomainValidator>),
}

impl Domain {
    pub fn unbounded_integer() -> Self {
        Domain::Integer {
            min: None,
            max: None,
        }
    }

    pub fn custom(validator: impl DomainValidator + 'static) -> Self {
        Domain::Custom(Arc::new(validator))
    }

    /// Allowed values as shown to users.
    pub fn allowed(&self) -> Vec<String> {
        match self {
            Domain::Bool => vec!["true".to_string(), "false".to_string()],
            Domain::Enum(values) => values.iter().map(|v| v.to_string()).collect(),
            Domain::Integer { min, max } => match (min, max) {
                (None, None) => vec!["<integer>".to_string()],
                (min, max) => vec![format!(
                    "{}..={}",
                    min.map(|m| m.to_string()).unwrap_or_default(),
                    max.map(|m| m.to_string()).unwrap_or_default()
                )],
            },
            Domain::Custom(validator) => vec![validator.describe().to_string()],
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Bool => write!(f, "bool"),
            Domain::Enum(values) => write!(f, "{{{}}}", values.join(", ")),
            Domain::Integer { .. } => write!(f, "{}", self.allowed().join("")),
            Domain::Custom(validator) => write!(f, "{}", validator.describe()),
        }
    }
}

/// One configurable option.
#[derive(Debug, Clone)]
pub struct Variant {
    pub name: &'static str,
    pub domain: Domain,
    pub default: VariantValue,
    pub cardinality: Cardinality,
    pub description: &'static str,
}

impl Variant {
    /// Boolean toggle.
    pub fn toggle(name: &'static str, default: bool, description: &'static str) -> Self {
        Variant {
            name,
            domain: Domain::Bool,
            default: VariantValue::Bool(default),
            cardinality: Cardinality::Single,
            description,
        }
    }

    /// Single-valued choice among `values`.
    pub fn choice(
        name: &'static str,
        values: &[&'static str],
        default: &'static str,
        description: &'static str,
    ) -> Self {
        Variant {
            name,
            domain: Domain::Enum(values.to_vec()),
            default: VariantValue::Str(default.to_string()),
            cardinality: Cardinality::Single,
            description,
        }
    }

    pub fn integer(name: &'static str, default: i64, description: &'static str) -> Self {
        Variant {
            name,
            domain: Domain::unbounded_integer(),
            default: VariantValue::Int(default),
            cardinality: Cardinality::Single,
            description,
        }
    }

    pub fn custom(
        name: &'static str,
        validator: impl DomainValidator + 'static,
        default: &'static str,
        description: &'static str,
    ) -> Self {
        Variant {
            name,
            domain: Domain::custom(validator),
            default: VariantValue::Str(default.to_string()),
            cardinality: Cardinality::Single,
            description,
        }
    }

    /// Accept a comma-separated set of values instead of a single one.
    pub fn multi(mut self) -> Self {
        self.cardinality = Cardinality::Multi;
        self
    }

    /// Validate a raw value against this variant's domain.
    pub fn validate(&self, raw: &RawValue) -> Result<VariantValue, ValidationError> {
        let value = self.check_shape(raw)?;
        self.run_validator(&value)?;
        Ok(value)
    }

    /// Run a custom domain's validator on an already shape-checked value.
    ///
    /// A no-op for the built-in domains.
    pub fn run_validator(&self, value: &VariantValue) -> Result<(), ValidationError> {
        let (Domain::Custom(validator), VariantValue::Str(text)) = (&self.domain, value) else {
            return Ok(());
        };

        validator
            .validate(text)
            .map_err(|reason| ValidationError::InvalidPath {
                variant: self.name.to_string(),
                value: text.clone(),
                reason,
            })
    }

    /// Everything [`Variant::validate`] checks except custom validators.
    fn check_shape(&self, raw: &RawValue) -> Result<VariantValue, ValidationError> {
        let invalid = || ValidationError::InvalidDomain {
            variant: self.name.to_string(),
            value: raw.to_string(),
            allowed: self.domain.allowed(),
        };

        match &self.domain {
            Domain::Bool => match raw {
                RawValue::Bool(b) => Ok(VariantValue::Bool(*b)),
                RawValue::Str(s) => parse_toggle(s).map(VariantValue::Bool).ok_or_else(invalid),
                RawValue::Int(_) => Err(invalid()),
            },

            Domain::Enum(values) => {
                let text = match raw {
                    RawValue::Str(s) => s.clone(),
                    RawValue::Int(i) => i.to_string(),
                    RawValue::Bool(_) => return Err(invalid()),
                };

                match self.cardinality {
                    Cardinality::Single => {
                        if values.contains(&text.as_str()) {
                            Ok(VariantValue::Str(text))
                        } else {
                            Err(invalid())
                        }
                    }
                    Cardinality::Multi => {
                        let mut selected = Vec::new();
                        for item in text.split(',').map(str::trim) {
                            if !values.contains(&item) {
                                return Err(invalid());
                            }
                            selected.push(item.to_string());
                        }
                        selected.sort();
                        selected.dedup();
                        Ok(VariantValue::Multi(selected))
                    }
                }
            }

            Domain::Integer { min, max } => {
                let value = match raw {
                    RawValue::Int(i) => *i,
                    RawValue::Str(s) => s.trim().parse::<i64>().map_err(|_| invalid())?,
                    RawValue::Bool(_) => return Err(invalid()),
                };
                if min.is_some_and(|m| value < m) || max.is_some_and(|m| value > m) {
                    return Err(invalid());
                }
                Ok(VariantValue::Int(value))
            }

            Domain::Custom(_) => match raw {
                RawValue::Str(s) => Ok(VariantValue::Str(s.clone())),
                _ => Err(invalid()),
            },
        }
    }
}

fn parse_toggle(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "on" => Some(true),
        "false" | "off" => Some(false),
        _ => None,
    }
}

/// Immutable catalog of variants, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct VariantSchema {
    variants: Vec<Variant>,
}

impl VariantSchema {
    pub fn new(variants: Vec<Variant>) -> Self {
        VariantSchema { variants }
    }

    pub fn get(&self, name: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variant> {
        self.variants.iter()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Validate one assignment.
    pub fn validate(&self, name: &str, raw: &RawValue) -> Result<VariantValue, ValidationError> {
        let variant = self
            .get(name)
            .ok_or_else(|| ValidationError::UnknownVariant {
                variant: name.to_string(),
                value: raw.to_string(),
            })?;
        variant.validate(raw)
    }

    /// Validate every assignment and fill in defaults for the rest.
    ///
    /// Assignments are checked in name order so the first failure reported
    /// for a given input is always the same one.
    pub fn resolve(
        &self,
        assignments: &BTreeMap<String, RawValue>,
    ) -> Result<ResolvedVariants, ValidationError> {
        let resolved = self.resolve_deferred(assignments)?;
        self.run_validators(&resolved)?;
        Ok(resolved)
    }

    /// Like [`VariantSchema::resolve`], but leaves custom validators to a
    /// later [`VariantSchema::run_validators`] call.
    pub fn resolve_deferred(
        &self,
        assignments: &BTreeMap<String, RawValue>,
    ) -> Result<ResolvedVariants, ValidationError> {
        let mut values = BTreeMap::new();

        for (name, raw) in assignments {
            let variant = self
                .get(name)
                .ok_or_else(|| ValidationError::UnknownVariant {
                    variant: name.clone(),
                    value: raw.to_string(),
                })?;
            values.insert(name.clone(), variant.check_shape(raw)?);
        }

        for variant in &self.variants {
            values
                .entry(variant.name.to_string())
                .or_insert_with(|| variant.default.clone());
        }

        Ok(ResolvedVariants { values })
    }

    /// Run the custom validators over `resolved`, in name order.
    pub fn run_validators(&self, resolved: &ResolvedVariants) -> Result<(), ValidationError> {
        for (name, value) in resolved.iter() {
            if let Some(variant) = self.get(name) {
                variant.run_validator(value)?;
            }
        }
        Ok(())
    }
}

/// Every schema variant bound to a validated value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedVariants {
    values: BTreeMap<String, VariantValue>,
}

impl ResolvedVariants {
    pub fn get(&self, name: &str) -> Option<&VariantValue> {
        self.values.get(name)
    }

    /// True only for a boolean variant set to true.
    pub fn enabled(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(VariantValue::Bool(true)))
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(VariantValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(VariantValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Whether `name` holds `value` (or contains it, for multi-valued variants).
    pub fn has_value(&self, name: &str, value: &str) -> bool {
        match self.values.get(name) {
            Some(VariantValue::Str(s)) => s == value,
            Some(VariantValue::Int(i)) => i.to_string() == value,
            Some(VariantValue::Multi(values)) => values.iter().any(|v| v == value),
            Some(VariantValue::Bool(_)) | None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariantValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ValidationErrorKind;
    use tempfile::TempDir;

    fn schema() -> VariantSchema {
        VariantSchema::new(vec![
            Variant::toggle("shared", false, "Build shared libraries."),
            Variant::toggle("zlib", true, "Enable zlib support."),
            Variant::choice("network", &["gasnet", "mpi", "none"], "none", "Transport."),
            Variant::choice("cuda_arch", &["60", "70", "75", "80"], "70", "GPU arch."),
            Variant::integer("max_dims", 3, "Max dims."),
            Variant::custom("gasnet_root", DirectoryOrNone, NONE, "GASNet prefix."),
        ])
    }

    #[test]
    fn test_bool_domain() {
        let schema = schema();
        assert_eq!(
            schema.validate("shared", &RawValue::Bool(true)).unwrap(),
            VariantValue::Bool(true)
        );
        assert_eq!(
            schema.validate("shared", &"False".into()).unwrap(),
            VariantValue::Bool(false)
        );

        let err = schema.validate("shared", &"maybe".into()).unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::InvalidDomain);
        assert_eq!(err.variant(), "shared");
    }

    #[test]
    fn test_enum_domain_is_case_sensitive() {
        let schema = schema();
        assert!(schema.validate("network", &"gasnet".into()).is_ok());

        let err = schema.validate("network", &"GASNet".into()).unwrap_err();
        match err {
            ValidationError::InvalidDomain { allowed, value, .. } => {
                assert_eq!(value, "GASNet");
                assert_eq!(allowed, vec!["gasnet", "mpi", "none"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_enum_accepts_integer_spelling() {
        let schema = schema();
        assert_eq!(
            schema.validate("cuda_arch", &RawValue::Int(80)).unwrap(),
            VariantValue::Str("80".to_string())
        );
        assert!(schema.validate("cuda_arch", &RawValue::Int(90)).is_err());
    }

    #[test]
    fn test_multi_valued_enum() {
        let variant =
            Variant::choice("conduit", &["ibv", "udp", "mpi"], "udp", "Conduits.").multi();
        assert_eq!(
            variant.validate(&"udp,ibv,udp".into()).unwrap(),
            VariantValue::Multi(vec!["ibv".to_string(), "udp".to_string()])
        );
        assert!(variant.validate(&"udp,tcp".into()).is_err());
    }

    #[test]
    fn test_integer_domain() {
        let schema = schema();
        assert_eq!(
            schema.validate("max_dims", &"12".into()).unwrap(),
            VariantValue::Int(12)
        );
        assert_eq!(
            schema.validate("max_dims", &RawValue::Int(-4)).unwrap(),
            VariantValue::Int(-4)
        );
        assert!(schema.validate("max_dims", &"three".into()).is_err());
    }

    #[test]
    fn test_bounded_integer_domain() {
        let variant = Variant {
            domain: Domain::Integer {
                min: Some(1),
                max: Some(9),
            },
            ..Variant::integer("dims", 3, "Dims.")
        };
        assert!(variant.validate(&RawValue::Int(9)).is_ok());
        let err = variant.validate(&RawValue::Int(10)).unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::InvalidDomain);
    }

    #[test]
    fn test_directory_validator() {
        let tmp = TempDir::new().unwrap();
        let schema = schema();

        let dir = tmp.path().to_string_lossy().to_string();
        assert!(schema.validate("gasnet_root", &dir.as_str().into()).is_ok());
        assert!(schema.validate("gasnet_root", &"none".into()).is_ok());

        let missing = tmp.path().join("missing").to_string_lossy().to_string();
        let err = schema
            .validate("gasnet_root", &missing.as_str().into())
            .unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::InvalidPath);
        assert_eq!(err.value(), missing);
        assert!(err.to_string().contains("no such directory"));

        let file = tmp.path().join("file");
        std::fs::write(&file, "").unwrap();
        let file = file.to_string_lossy().to_string();
        let err = schema
            .validate("gasnet_root", &file.as_str().into())
            .unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[derive(Debug)]
    struct RejectAll;

    impl DomainValidator for RejectAll {
        fn describe(&self) -> &str {
            "nothing"
        }

        fn validate(&self, value: &str) -> Result<(), String> {
            Err(format!("{} is unreachable", value))
        }
    }

    #[test]
    fn test_substituted_validator() {
        let variant = Variant::custom("root", RejectAll, NONE, "Remote root.");
        let err = variant.validate(&"host:/opt".into()).unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::InvalidPath);
        assert!(err.to_string().contains("host:/opt is unreachable"));
    }

    #[test]
    fn test_unknown_variant() {
        let err = schema().validate("gpu", &RawValue::Bool(true)).unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::UnknownVariant);
        assert_eq!(err.value(), "true");
    }

    #[test]
    fn test_resolve_deferred_skips_validators() {
        let mut assignments = BTreeMap::new();
        assignments.insert(
            "gasnet_root".to_string(),
            RawValue::from("/opt/gasnet_nonexistent"),
        );

        let schema = schema();
        let resolved = schema.resolve_deferred(&assignments).unwrap();
        assert_eq!(resolved.text("gasnet_root"), Some("/opt/gasnet_nonexistent"));

        let err = schema.run_validators(&resolved).unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::InvalidPath);
        assert_eq!(
            schema.resolve(&assignments).unwrap_err().kind(),
            ValidationErrorKind::InvalidPath
        );
    }

    #[test]
    fn test_resolve_deferred_still_checks_domains() {
        let mut assignments = BTreeMap::new();
        assignments.insert("gasnet_root".to_string(), RawValue::Int(1));
        assignments.insert("network".to_string(), RawValue::from("tcp"));

        let err = schema().resolve_deferred(&assignments).unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::InvalidDomain);
        assert_eq!(err.variant(), "gasnet_root");
    }

    #[test]
    fn test_resolve_fills_defaults() {
        let mut assignments = BTreeMap::new();
        assignments.insert("network".to_string(), RawValue::from("mpi"));

        let resolved = schema().resolve(&assignments).unwrap();
        assert_eq!(resolved.text("network"), Some("mpi"));
        assert!(resolved.enabled("zlib"));
        assert!(!resolved.enabled("shared"));
        assert_eq!(resolved.integer("max_dims"), Some(3));
        assert_eq!(resolved.text("gasnet_root"), Some(NONE));
        assert!(resolved.has_value("cuda_arch", "70"));
    }
}
