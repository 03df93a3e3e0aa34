//! Conditional dependency declarations.
//!
//! Each row says "when this condition holds, the build needs that external
//! package, at this version range, built with these variants". The table is
//! assembled once with the rest of the package definition and can be
//! queried without running a translation.

use std::fmt;

use serde::Serialize;

use crate::core::constraint::Condition;
use crate::core::spec::ResolvedSpec;

/// When the dependency is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyType {
    /// Only while building (e.g. CMake itself).
    Build,
    /// Linked into the result.
    Link,
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyType::Build => write!(f, "build"),
            DependencyType::Link => write!(f, "link"),
        }
    }
}

/// A constraint on one of the dependency's own variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum VariantConstraint {
    On(&'static str),
    Off(&'static str),
    Value(&'static str, &'static str),
}

/// What is required of an external package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyDescriptor {
    pub name: &'static str,
    /// Version range in resolver syntax (`10.0:11.9`, `3.16:`, `3`).
    pub versions: Option<&'static str>,
    pub variants: Vec<VariantConstraint>,
    pub kind: DependencyType,
}

impl DependencyDescriptor {
    pub fn new(name: &'static str) -> Self {
        DependencyDescriptor {
            name,
            versions: None,
            variants: Vec::new(),
            kind: DependencyType::Link,
        }
    }

    pub fn versions(mut self, range: &'static str) -> Self {
        self.versions = Some(range);
        self
    }

    pub fn on(mut self, variant: &'static str) -> Self {
        self.variants.push(VariantConstraint::On(variant));
        self
    }

    pub fn off(mut self, variant: &'static str) -> Self {
        self.variants.push(VariantConstraint::Off(variant));
        self
    }

    pub fn value(mut self, variant: &'static str, value: &'static str) -> Self {
        self.variants.push(VariantConstraint::Value(variant, value));
        self
    }

    pub fn build_only(mut self) -> Self {
        self.kind = DependencyType::Build;
        self
    }

    /// Whether `variant` is required on (`Some(true)`), off, or unconstrained.
    pub fn requires(&self, variant: &str) -> Option<bool> {
        self.variants.iter().find_map(|c| match c {
            VariantConstraint::On(name) if *name == variant => Some(true),
            VariantConstraint::Off(name) if *name == variant => Some(false),
            _ => None,
        })
    }
}

impl fmt::Display for DependencyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(range) = self.versions {
            write!(f, "@{}", range)?;
        }
        for constraint in &self.variants {
            match constraint {
                VariantConstraint::On(name) => write!(f, "+{}", name)?,
                VariantConstraint::Off(name) => write!(f, "~{}", name)?,
                VariantConstraint::Value(name, value) => write!(f, " {}={}", name, value)?,
            }
        }
        Ok(())
    }
}

/// One row of the dependency table.
#[derive(Debug, Clone)]
pub struct ConditionalDependency {
    pub when: Condition,
    pub dependency: DependencyDescriptor,
}

/// All conditional dependencies, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct DependencyTable {
    rows: Vec<ConditionalDependency>,
}

impl DependencyTable {
    pub fn new() -> Self {
        DependencyTable::default()
    }

    /// Add a row.
    pub fn depends_on(mut self, dependency: DependencyDescriptor, when: Condition) -> Self {
        self.rows.push(ConditionalDependency { when, dependency });
        self
    }

    pub fn rows(&self) -> &[ConditionalDependency] {
        &self.rows
    }

    /// Rows whose condition holds for `spec`.
    pub fn active(&self, spec: &ResolvedSpec<'_>) -> Vec<&DependencyDescriptor> {
        self.rows
            .iter()
            .filter(|row| row.when.eval(spec))
            .map(|row| &row.dependency)
            .collect()
    }
}
