//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Translate Legion build configurations into CMake arguments
#[derive(Parser)]
#[command(name = "legion-config")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Use this config file instead of ~/.legion-config/config.toml
    #[arg(long, global = true, env = "LEGION_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn global(&self) -> GlobalOptions {
        GlobalOptions {
            config: self.config.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the CMake arguments for a build configuration
    Flags(FlagsArgs),

    /// Validate a build configuration without printing flags
    Check(SpecArgs),

    /// List the known variants
    Variants(VariantsArgs),

    /// Show the dependencies a build configuration needs
    Deps(DepsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// How a build configuration is given on the command line.
#[derive(Args)]
pub struct SpecArgs {
    /// Spec file (TOML)
    pub spec: Option<PathBuf>,

    /// Variant assignment: `+name`, `~name` or `name=value` (repeatable)
    #[arg(short = 'v', long = "variant", value_name = "TOKEN")]
    pub variants: Vec<String>,
}

#[derive(Args)]
pub struct FlagsArgs {
    #[command(flatten)]
    pub spec: SpecArgs,

    /// Print the full translation as JSON
    #[arg(long)]
    pub json: bool,

    /// Print `export` lines for required environment variables first
    #[arg(long)]
    pub export_env: bool,
}

#[derive(Args)]
pub struct VariantsArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct DepsArgs {
    #[command(flatten)]
    pub spec: SpecArgs,

    /// Show every conditional row instead of the active ones
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
