//! Host-side configuration steps.
//!
//! Building a [`Spec`] from a spec file, command-line variant tokens and the
//! layered config, and applying a translation's environment overrides.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::builder::translate::Translation;
use crate::core::spec::{BuildType, Compiler, ResolvedDependency, Spec};
use crate::core::variant::RawValue;
use crate::util::config::Config;
use crate::util::diagnostic::suggestions;

/// A spec file as written; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpecFile {
    pub version: Option<String>,
    pub compiler: Option<Compiler>,
    pub build_type: Option<BuildType>,
    pub target: Option<String>,
    pub variants: BTreeMap<String, RawValue>,
    pub dependencies: BTreeMap<String, ResolvedDependency>,
}

impl SpecFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read spec file: {}", path.display()))?;

        toml::from_str(&contents).with_context(|| {
            format!(
                "failed to parse spec file: {}\n{}",
                path.display(),
                suggestions::BAD_SPEC
            )
        })
    }
}

/// Options for [`load_spec`].
#[derive(Debug, Clone, Default)]
pub struct SpecOptions<'a> {
    /// Spec file, if any
    pub path: Option<&'a Path>,
    /// Variant tokens applied on top of the file
    pub tokens: &'a [String],
}

/// Assemble the spec for one request.
///
/// Variant precedence (highest to lowest): tokens, spec file, config
/// `[variants]`, schema defaults. Spec-level fields fall back to the
/// config's `[defaults]`, then to the built-in defaults.
pub fn load_spec(opts: &SpecOptions<'_>, config: &Config) -> Result<Spec> {
    let file = match opts.path {
        Some(path) => SpecFile::load(path)?,
        None if opts.tokens.is_empty() => {
            tracing::debug!("no spec file or variants given; using defaults");
            SpecFile::default()
        }
        None => SpecFile::default(),
    };

    let mut spec = Spec::default();

    if let Some(version) = file.version.or_else(|| config.defaults.version.clone()) {
        spec.version = version;
    }

    spec.compiler = match (file.compiler, &config.defaults.compiler) {
        (Some(compiler), _) => compiler,
        (None, Some(compiler)) => compiler
            .parse()
            .map_err(|e| anyhow!("invalid compiler in config: {}", e))?,
        (None, None) => Compiler::default(),
    };

    spec.build_type = match (file.build_type, &config.defaults.build_type) {
        (Some(build_type), _) => build_type,
        (None, Some(build_type)) => build_type
            .parse()
            .map_err(|e| anyhow!("invalid build type in config: {}", e))?,
        (None, None) => BuildType::default(),
    };

    spec.target = file.target.or_else(|| config.defaults.target.clone());

    spec.variants = config.variants.clone();
    spec.variants.extend(file.variants);
    spec.dependencies = file.dependencies;

    let spec = spec
        .with_tokens(opts.tokens.iter().map(String::as_str))
        .map_err(|e| anyhow!("{}\n{}", e, suggestions::NO_SPEC))?;

    tracing::debug!(spec = %spec, "assembled spec");
    Ok(spec)
}

/// Export a translation's environment overrides into this process.
///
/// Call only with a successful translation, once, before handing the flags
/// to CMake.
pub fn apply_env(translation: &Translation) {
    for (key, value) in &translation.env {
        tracing::info!("setting {}={}", key, value);
        std::env::set_var(key, value);
    }
}

/// Render the overrides as shell `export` lines.
pub fn env_exports(translation: &Translation) -> Vec<String> {
    translation
        .env
        .iter()
        .map(|(key, value)| format!("export {}={}", key, shell_quote(value)))
        .collect()
}

fn shell_quote(value: &str) -> String {
    if value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "/._-+:=@".contains(c))
    {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}
