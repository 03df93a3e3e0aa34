//! legion-config - Build configuration translator for the Legion runtime
//!
//! This crate maps a requested Legion build configuration (version, compiler,
//! build type and variant selections) onto the CMake cache arguments Legion's
//! own build understands, rejecting invalid and conflicting selections along
//! the way.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

pub use builder::translate::{Translation, Translator};
pub use core::{
    errors::{ConflictError, TranslateError, ValidationError},
    legion::LegionPackage,
    spec::Spec,
};
