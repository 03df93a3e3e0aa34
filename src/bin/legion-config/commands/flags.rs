//! `legion-config flags` command

use anyhow::Result;

use crate::cli::{FlagsArgs, GlobalOptions};
use crate::commands::load_request;
use legion_config::ops::configure::env_exports;
use legion_config::util::config::OutputFormat;
use legion_config::LegionPackage;

pub fn execute(global: &GlobalOptions, args: FlagsArgs) -> Result<()> {
    let (config, spec) = load_request(global, &args.spec)?;

    let package = LegionPackage::new();
    let translation = package.translator().translate(&spec)?;

    if args.json || config.output.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&translation)?);
        return Ok(());
    }

    if args.export_env {
        for line in env_exports(&translation) {
            println!("{}", line);
        }
    } else if !translation.env.is_empty() {
        tracing::warn!(
            "this configuration needs environment variables set; rerun with --export-env"
        );
    }

    for flag in &translation.flags {
        println!("{}", flag);
    }

    Ok(())
}
