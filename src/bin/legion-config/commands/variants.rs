//! `legion-config variants` command

use anyhow::Result;
use serde_json::json;

use crate::cli::VariantsArgs;
use legion_config::core::variant::Cardinality;
use legion_config::LegionPackage;

pub fn execute(args: VariantsArgs) -> Result<()> {
    let package = LegionPackage::new();

    if args.json {
        let variants: Vec<_> = package
            .schema
            .iter()
            .map(|v| {
                json!({
                    "name": v.name,
                    "domain": v.domain.to_string(),
                    "allowed": v.domain.allowed(),
                    "default": v.default,
                    "multi": matches!(v.cardinality, Cardinality::Multi),
                    "description": v.description,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&variants)?);
        return Ok(());
    }

    let width = package.schema.iter().map(|v| v.name.len()).max().unwrap_or(0);
    for variant in package.schema.iter() {
        let multi = match variant.cardinality {
            Cardinality::Multi => " (multi)",
            Cardinality::Single => "",
        };
        println!(
            "{:width$}  [{}{}] default={}",
            variant.name,
            variant.domain,
            multi,
            variant.default,
            width = width
        );
        println!("{:width$}  {}", "", variant.description, width = width);
    }

    Ok(())
}
