//! legion-config CLI - Legion build configuration translator

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use legion_config::core::errors::TranslateError;
use legion_config::util::diagnostic;

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<TranslateError>() {
            Some(err) => diagnostic::emit(&err.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("legion_config=debug")
    } else {
        EnvFilter::new("legion_config=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let global = cli.global();

    // Execute command
    match cli.command {
        Commands::Flags(args) => commands::flags::execute(&global, args),
        Commands::Check(args) => commands::check::execute(&global, args),
        Commands::Variants(args) => commands::variants::execute(args),
        Commands::Deps(args) => commands::deps::execute(&global, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
