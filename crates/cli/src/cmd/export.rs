//! Implementation of the `vispkg export` command.
//!
//! Snapshots the files a recipe exports into the workspace, leaving
//! version-control metadata and CMake build trees behind.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use vispkg_lib::config::DriverConfig;
use vispkg_lib::exports::export_sources;
use vispkg_lib::layout::export_dir;

use crate::cmd::{read_recipe, recipe_dir};
use crate::output::{OutputFormat, print_json, print_stat, print_success, print_warning, short_hash};

#[derive(Debug, Serialize)]
struct ExportOutput {
  reference: String,
  dest: PathBuf,
  files: Vec<String>,
  source_hash: String,
}

pub fn cmd_export(
  path: &Path,
  source: Option<&Path>,
  dest: Option<&Path>,
  config: &DriverConfig,
  format: OutputFormat,
) -> Result<()> {
  let recipe = read_recipe(path)?;
  let source = source.map(Path::to_path_buf).unwrap_or_else(|| recipe_dir(path));
  let dest = dest
    .map(Path::to_path_buf)
    .unwrap_or_else(|| export_dir(&config.workspace, &recipe.identity));

  let summary = export_sources(&source, &recipe, &dest)
    .with_context(|| format!("Failed to export sources of {}", recipe.identity))?;

  if format.is_json() {
    return print_json(&ExportOutput {
      reference: recipe.identity.reference(),
      dest: summary.dest,
      files: summary.files,
      source_hash: summary.source_hash.0,
    });
  }

  if summary.files.is_empty() {
    print_warning(&format!("{} exports no files", recipe.identity));
  } else {
    print_success(&format!(
      "Exported {} file(s) of {}",
      summary.files.len(),
      recipe.identity
    ));
  }
  print_stat("Destination", &summary.dest.display().to_string());
  print_stat("Source hash", short_hash(&summary.source_hash.0));

  Ok(())
}
