//! High-level operations.
//!
//! This module contains the host-side steps behind the CLI commands.

pub mod configure;

pub use configure::{apply_env, env_exports, load_spec, SpecFile, SpecOptions};
