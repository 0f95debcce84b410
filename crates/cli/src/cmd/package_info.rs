//! Implementation of the `vispkg package-info` command.
//!
//! Reads the completion marker of an already built context. Text output is
//! one library per line, in link order, for use from scripts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use vispkg_lib::config::DriverConfig;
use vispkg_lib::descriptor::Descriptor;
use vispkg_lib::package::installed_package;

use crate::cmd::{ProfileArgs, read_recipe};
use crate::output::{OutputFormat, print_json};

#[derive(Debug, Serialize)]
struct PackageInfoOutput {
  reference: String,
  package_id: String,
  package_dir: PathBuf,
  libs: Vec<String>,
}

pub fn cmd_package_info(path: &Path, profile: &ProfileArgs, config: &DriverConfig, format: OutputFormat) -> Result<()> {
  let recipe = read_recipe(path)?;
  let (settings, options) = profile.resolve(&recipe)?;
  let descriptor = Descriptor::new(recipe, settings, options);

  let layout = descriptor
    .layout(&config.workspace)
    .context("Failed to compute package id")?;
  let marker = installed_package(&layout)
    .with_context(|| format!("{} ({}, {}) is not packaged", descriptor.reference(), settings, options))?;
  let info = marker.package_info();

  if format.is_json() {
    return print_json(&PackageInfoOutput {
      reference: marker.reference,
      package_id: marker.package_id,
      package_dir: layout.package_dir,
      libs: info.libs,
    });
  }

  for lib in &info.libs {
    println!("{}", lib);
  }
  Ok(())
}
