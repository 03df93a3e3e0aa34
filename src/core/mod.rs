//! Core data structures.
//!
//! - Variant declarations and their domains
//! - Build requests (specs) and their resolved form
//! - Conflict rules and conditional dependencies
//! - The Legion package description tying them together

pub mod constraint;
pub mod dependency;
pub mod errors;
pub mod legion;
pub mod spec;
pub mod variant;

pub use constraint::{Condition, ConflictRule, ConstraintSet};
pub use dependency::{DependencyDescriptor, DependencyTable};
pub use errors::{ConflictError, TranslateError, ValidationError, ValidationErrorKind};
pub use legion::LegionPackage;
pub use spec::{BuildType, Compiler, CompilerFamily, ResolvedSpec, Spec};
pub use variant::{Domain, DomainValidator, RawValue, Variant, VariantSchema, VariantValue};
