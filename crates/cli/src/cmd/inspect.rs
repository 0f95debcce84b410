//! Implementation of the `vispkg inspect` command.

use std::path::Path;

use anyhow::Result;

use crate::cmd::read_recipe;
use crate::output::{OutputFormat, print_heading, print_json, print_stat};

pub fn cmd_inspect(path: &Path, format: OutputFormat) -> Result<()> {
  let recipe = read_recipe(path)?;

  if format.is_json() {
    return print_json(&recipe);
  }

  let identity = &recipe.identity;
  print_heading(&identity.reference());
  if !identity.description.is_empty() {
    print_stat("Description", &identity.description);
  }
  if !identity.url.is_empty() {
    print_stat("URL", &identity.url);
  }
  if !identity.license.is_empty() {
    print_stat("License", &identity.license);
  }

  let axes: Vec<&str> = recipe.settings.iter().map(|axis| axis.as_str()).collect();
  print_stat("Settings", &axes.join(", "));
  print_stat("Default options", &recipe.default_options.to_string());

  let generators: Vec<&str> = recipe.generators.iter().map(|g| g.as_str()).collect();
  if generators.is_empty() {
    print_stat("Generators", "none");
  } else {
    print_stat("Generators", &generators.join(", "));
  }

  if recipe.exports_sources.is_empty() {
    print_stat("Exports", "none");
  } else {
    print_stat("Exports", &recipe.exports_sources.join(" "));
  }
  if !recipe.exports_excludes.is_empty() {
    print_stat("Excludes", &recipe.exports_excludes.join(" "));
  }
  print_stat("Libs", &recipe.libs.join(" "));

  Ok(())
}
