mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vispkg_lib::config::DriverConfig;
use vispkg_lib::consts::RECIPE_FILENAME;

use crate::cmd::{BuildArgs, ProfileArgs, cmd_build, cmd_export, cmd_info, cmd_inspect, cmd_package_info};
use crate::output::{OutputFormat, print_error};

/// vispkg - build and package native CMake libraries from Lua recipes
#[derive(Parser)]
#[command(name = "vispkg")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Workspace holding exported sources and build contexts
  /// (default: $VISPKG_HOME, then the user data directory)
  #[arg(long, global = true)]
  workspace: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Show what a recipe declares
  Inspect {
    /// Path to the recipe
    #[arg(default_value = RECIPE_FILENAME)]
    recipe: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
  },

  /// Snapshot the recipe's exported sources into the workspace
  Export {
    /// Path to the recipe
    #[arg(default_value = RECIPE_FILENAME)]
    recipe: PathBuf,

    /// Source tree to export from (default: the recipe's directory)
    #[arg(long)]
    source: Option<PathBuf>,

    /// Snapshot directory (default: <workspace>/<name>/<version>/export)
    #[arg(long)]
    dest: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
  },

  /// Configure, build and package for one set of settings and options
  Build(BuildArgs),

  /// Print the libraries of an already built package
  PackageInfo {
    /// Path to the recipe
    #[arg(default_value = RECIPE_FILENAME)]
    recipe: PathBuf,

    #[command(flatten)]
    profile: ProfileArgs,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
  },

  /// Show host platform and driver configuration
  Info {
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
  },
}

fn main() {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  if let Err(e) = run(cli) {
    print_error(&format!("{:#}", e));
    std::process::exit(1);
  }
}

fn run(cli: Cli) -> Result<()> {
  let mut config = DriverConfig::from_env();
  if let Some(workspace) = cli.workspace {
    config = config.with_workspace(workspace);
  }

  match cli.command {
    Commands::Inspect { recipe, format } => cmd_inspect(&recipe, format),
    Commands::Export {
      recipe,
      source,
      dest,
      format,
    } => cmd_export(&recipe, source.as_deref(), dest.as_deref(), &config, format),
    Commands::Build(args) => cmd_build(args, config),
    Commands::PackageInfo {
      recipe,
      profile,
      format,
    } => cmd_package_info(&recipe, &profile, &config, format),
    Commands::Info { format } => cmd_info(&config, format),
  }
}
