mod build;
mod export;
mod info;
mod inspect;
mod package_info;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use vispkg_lib::options::Options;
use vispkg_lib::recipe::{Recipe, load_recipe};
use vispkg_lib::settings::Settings;

pub use build::{BuildArgs, cmd_build};
pub use export::cmd_export;
pub use info::cmd_info;
pub use inspect::cmd_inspect;
pub use package_info::cmd_package_info;

/// Settings and option overrides selecting one build context.
#[derive(Args, Debug, Clone, Default)]
pub struct ProfileArgs {
  /// Override a setting, e.g. `-s build_type=Debug` (repeatable)
  #[arg(short = 's', long = "setting", value_name = "KEY=VALUE")]
  pub settings: Vec<String>,

  /// Override an option, e.g. `-o shared=True` (repeatable)
  #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
  pub options: Vec<String>,
}

impl ProfileArgs {
  /// Host defaults with `-s` applied, recipe defaults with `-o` applied.
  pub fn resolve(&self, recipe: &Recipe) -> Result<(Settings, Options)> {
    let settings = Settings::host()
      .context("Failed to detect host settings")?
      .with_overrides(&self.settings)
      .context("Invalid setting")?;
    let options = recipe
      .default_options
      .with_overrides(&self.options)
      .context("Invalid option")?;
    Ok((settings, options))
  }
}

pub(crate) fn read_recipe(path: &Path) -> Result<Recipe> {
  load_recipe(path).with_context(|| format!("Failed to load recipe: {}", path.display()))
}

/// Directory a recipe lives in; the default source root.
pub(crate) fn recipe_dir(path: &Path) -> PathBuf {
  match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
    _ => PathBuf::from("."),
  }
}
