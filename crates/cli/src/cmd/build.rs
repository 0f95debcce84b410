//! Implementation of the `vispkg build` command.
//!
//! Binds the recipe to the requested settings and options, then drives the
//! descriptor through configure, build and package info. A failed attempt
//! is reported and exits non-zero; nothing is retried.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use clap::Args;

use vispkg_lib::cmake::CMake;
use vispkg_lib::config::DriverConfig;
use vispkg_lib::consts::{INSTALL_TARGET, RECIPE_FILENAME};
use vispkg_lib::descriptor::{BuildContext, BuildReport, Descriptor, build_package, failed_report};

use crate::cmd::{ProfileArgs, read_recipe, recipe_dir};
use crate::output::{OutputFormat, elapsed, print_json, print_stat, print_success, print_warning, short_hash};

#[derive(Args, Debug)]
pub struct BuildArgs {
  /// Path to the recipe
  #[arg(default_value = RECIPE_FILENAME)]
  pub recipe: PathBuf,

  /// Project to build (default: the recipe's directory)
  #[arg(long)]
  pub source: Option<PathBuf>,

  #[command(flatten)]
  pub profile: ProfileArgs,

  /// Build system target
  #[arg(long, default_value = INSTALL_TARGET)]
  pub target: String,

  /// CMake executable (default: $VISPKG_CMAKE, then `cmake` on PATH)
  #[arg(long)]
  pub cmake: Option<PathBuf>,

  /// CMake generator, e.g. "Ninja"
  #[arg(short = 'G', long)]
  pub generator: Option<String>,

  /// Parallel build jobs
  #[arg(short = 'j', long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
  pub jobs: Option<usize>,

  /// Abort the build after this long (e.g., "30m", "1h")
  #[arg(long, value_parser = humantime::parse_duration)]
  pub timeout: Option<Duration>,

  /// Output format
  #[arg(long, value_enum, default_value = "text")]
  pub format: OutputFormat,
}

pub fn cmd_build(args: BuildArgs, mut config: DriverConfig) -> Result<()> {
  let start = Instant::now();

  let recipe = read_recipe(&args.recipe)?;
  let source = args.source.clone().unwrap_or_else(|| recipe_dir(&args.recipe));
  let (settings, options) = args.profile.resolve(&recipe)?;

  if let Some(cmake) = args.cmake {
    config = config.with_cmake(cmake);
  }
  if args.generator.is_some() {
    config.cmake_generator = args.generator;
  }
  if args.jobs.is_some() {
    config.jobs = args.jobs;
  }
  let tool = CMake::from_config(&config);

  let descriptor = Descriptor::new(recipe, settings, options);
  let ctx = BuildContext::new(&descriptor, &tool, &config.workspace);

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let result: Result<BuildReport> = rt.block_on(async {
    let attempt = build_package(ctx, &source, &args.target);
    match args.timeout {
      // Dropping the attempt kills the running build tool
      Some(limit) => match tokio::time::timeout(limit, attempt).await {
        Ok(outcome) => outcome.map_err(anyhow::Error::from),
        Err(_) => Err(anyhow!("build timed out after {}", humantime::format_duration(limit))),
      },
      None => attempt.await.map_err(anyhow::Error::from),
    }
  });

  let report = match result {
    Ok(report) => report,
    Err(e) => {
      if args.format.is_json() {
        print_json(&failed_report(&descriptor))?;
      }
      return Err(e.context(format!("Failed to build {}", descriptor.reference())));
    }
  };

  if args.format.is_json() {
    return print_json(&report);
  }

  print_success(&format!(
    "Packaged {} ({}) in {}",
    report.reference,
    report.options,
    elapsed(start.elapsed())
  ));
  if let Some(id) = &report.package_id {
    print_stat("Package id", id);
  }
  print_stat("Settings", &report.settings.to_string());
  if let Some(dir) = &report.package_dir {
    print_stat("Package", &dir.display().to_string());
  }
  print_stat("Libs", &report.libs.join(" "));
  if let Some(hash) = &report.output_hash {
    print_stat("Output hash", short_hash(hash));
  }
  match report.reproducible {
    Some(false) => print_warning("Staged files differ from the previous build of these settings"),
    Some(true) => print_stat("Reproducible", "yes"),
    None => {}
  }

  Ok(())
}
