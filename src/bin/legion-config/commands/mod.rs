//! Command implementations

pub mod check;
pub mod completions;
pub mod deps;
pub mod flags;
pub mod variants;

use anyhow::Result;

use crate::cli::{GlobalOptions, SpecArgs};
use legion_config::core::Spec;
use legion_config::ops::configure::{load_spec, SpecOptions};
use legion_config::util::config::{self, load_config, Config};

/// Load the layered config and assemble the requested spec.
pub fn load_request(global: &GlobalOptions, args: &SpecArgs) -> Result<(Config, Spec)> {
    let cwd = std::env::current_dir()?;
    let global_path = global.config.clone().or_else(config::global_config_path);
    let config = load_config(global_path.as_deref(), &config::project_config_path(&cwd));

    let spec = load_spec(
        &SpecOptions {
            path: args.spec.as_deref(),
            tokens: &args.variants,
        },
        &config,
    )?;

    Ok((config, spec))
}
