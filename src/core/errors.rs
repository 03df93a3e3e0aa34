//! Translation error types and diagnostics.
//!
//! A translation fails in exactly one of two ways: a single variant value
//! is outside its domain ([`ValidationError`]), or a combination of values
//! violates a declared conflict rule ([`ConflictError`]). Both are fatal
//! and neither is retried.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Coarse classification of a [`ValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    UnknownVariant,
    InvalidDomain,
    InvalidPath,
    UnresolvedDependency,
}

/// A single variant value does not satisfy its declared domain.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum ValidationError {
    #[error("unknown variant `{variant}`")]
    #[diagnostic(code(legion::variant::unknown))]
    UnknownVariant { variant: String, value: String },

    #[error("invalid value `{value}` for variant `{variant}`")]
    #[diagnostic(code(legion::variant::invalid_domain))]
    InvalidDomain {
        variant: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("{variant}: `{value}` -- {reason}")]
    #[diagnostic(code(legion::variant::invalid_path))]
    InvalidPath {
        variant: String,
        value: String,
        reason: String,
    },

    #[error("`+{variant}` requires a resolved `{dependency}` providing {missing}")]
    #[diagnostic(code(legion::variant::unresolved_dependency))]
    UnresolvedDependency {
        variant: String,
        value: String,
        dependency: String,
        missing: String,
    },
}

impl ValidationError {
    /// Name of the offending variant.
    pub fn variant(&self) -> &str {
        match self {
            ValidationError::UnknownVariant { variant, .. }
            | ValidationError::InvalidDomain { variant, .. }
            | ValidationError::InvalidPath { variant, .. }
            | ValidationError::UnresolvedDependency { variant, .. } => variant,
        }
    }

    /// The rejected value, as supplied.
    pub fn value(&self) -> &str {
        match self {
            ValidationError::UnknownVariant { value, .. }
            | ValidationError::InvalidDomain { value, .. }
            | ValidationError::InvalidPath { value, .. }
            | ValidationError::UnresolvedDependency { value, .. } => value,
        }
    }

    pub fn kind(&self) -> ValidationErrorKind {
        match self {
            ValidationError::UnknownVariant { .. } => ValidationErrorKind::UnknownVariant,
            ValidationError::InvalidDomain { .. } => ValidationErrorKind::InvalidDomain,
            ValidationError::InvalidPath { .. } => ValidationErrorKind::InvalidPath,
            ValidationError::UnresolvedDependency { .. } => {
                ValidationErrorKind::UnresolvedDependency
            }
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());

        match self {
            ValidationError::UnknownVariant { variant, .. } => diag
                .with_context(format!("`{}` is not a Legion variant", variant))
                .with_suggestion("Run `legion-config variants` to list the known variants"),

            ValidationError::InvalidDomain { variant, allowed, .. } => {
                let diag = if allowed.is_empty() {
                    diag
                } else {
                    diag.with_context(format!("allowed values: {}", allowed.join(", ")))
                };
                diag.with_suggestion(format!(
                    "Pick one of the declared values for `{}`",
                    variant
                ))
            }

            ValidationError::InvalidPath { variant, .. } => diag
                .with_suggestion(format!(
                    "Point `{}` at an existing installation prefix",
                    variant
                ))
                .with_suggestion(format!("Set `{}=none` to use the embedded build", variant)),

            ValidationError::UnresolvedDependency { dependency, .. } => diag.with_suggestion(
                format!("Add a `[dependencies.{}]` entry to the spec file", dependency),
            ),
        }
    }
}

/// Two or more selections are jointly invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
#[error("{message}")]
#[diagnostic(code(legion::conflict))]
pub struct ConflictError {
    /// Stable name of the violated rule.
    pub rule: String,
    /// The rule's condition, rendered in resolver syntax.
    pub when: String,
    pub message: String,
}

impl ConflictError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(format!("conflicting variants: {}", self.message))
            .with_context(format!("rule `{}` matched: {}", self.rule, self.when))
            .with_suggestion("Adjust the selection so the rule no longer matches")
    }
}

/// Any failure of a translation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),
}

impl TranslateError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            TranslateError::Validation(e) => e.to_diagnostic(),
            TranslateError::Conflict(e) => e.to_diagnostic(),
        }
    }
}
