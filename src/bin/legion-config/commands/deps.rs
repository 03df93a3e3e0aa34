//! `legion-config deps` command

use anyhow::Result;

use crate::cli::{DepsArgs, GlobalOptions};
use crate::commands::load_request;
use legion_config::LegionPackage;

pub fn execute(global: &GlobalOptions, args: DepsArgs) -> Result<()> {
    let package = LegionPackage::new();

    if args.all {
        for row in package.dependencies.rows() {
            println!(
                "{} ({})    # when: {}",
                row.dependency, row.dependency.kind, row.when
            );
        }
        return Ok(());
    }

    let (_, spec) = load_request(global, &args.spec)?;
    let resolved = package.translator().check(&spec)?;

    for dep in package.dependencies.active(&resolved) {
        println!("{} ({})", dep, dep.kind);
    }

    Ok(())
}
