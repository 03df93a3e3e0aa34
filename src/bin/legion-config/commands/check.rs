//! `legion-config check` command

use anyhow::Result;

use crate::cli::{GlobalOptions, SpecArgs};
use crate::commands::load_request;
use legion_config::LegionPackage;

pub fn execute(global: &GlobalOptions, args: SpecArgs) -> Result<()> {
    let (_, spec) = load_request(global, &args)?;

    let package = LegionPackage::new();
    package.translator().translate(&spec)?;

    println!("ok: {}", spec);
    Ok(())
}
