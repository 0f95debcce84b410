//! Lua recipe evaluation.
//!
//! A recipe file is a Lua chunk returning a table:
//!
//! ```lua
//! return {
//!   name = "visMath",
//!   version = "0.2",
//!   description = "Basic math module for the VIS physics engine.",
//!   settings = { "os", "compiler", "build_type", "arch" },
//!   default_options = { shared = false },
//!   generators = { "cmake" },
//!   exports_sources = "*",
//!   libs = { "visMath" },
//! }
//! ```
//!
//! The chunk runs with a `vispkg` global exposing `vispkg.version`,
//! `vispkg.os` and `vispkg.arch` of the host, so recipes can branch on the
//! platform. The returned table is deserialized through mlua's serde support;
//! unknown keys are errors.

use std::path::Path;

use mlua::prelude::*;
use serde::Deserialize;
use tracing::debug;

use super::types::{Generator, PackageIdentity, Recipe, RecipeError};
use crate::options::Options;
use crate::settings::{Host, SettingAxis};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecipeDecl {
  name: String,
  version: String,
  #[serde(default)]
  url: String,
  #[serde(default)]
  license: String,
  #[serde(default)]
  description: String,
  #[serde(default = "all_axes")]
  settings: Vec<SettingAxis>,
  #[serde(default)]
  default_options: Options,
  #[serde(default)]
  generators: Vec<Generator>,
  #[serde(default)]
  exports_sources: Patterns,
  #[serde(default)]
  exports_excludes: Patterns,
  libs: Vec<String>,
}

/// A single glob or a list of globs.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Patterns {
  One(String),
  Many(Vec<String>),
}

impl Default for Patterns {
  fn default() -> Self {
    Patterns::Many(Vec::new())
  }
}

impl From<Patterns> for Vec<String> {
  fn from(patterns: Patterns) -> Self {
    match patterns {
      Patterns::One(pattern) => vec![pattern],
      Patterns::Many(patterns) => patterns,
    }
  }
}

fn all_axes() -> Vec<SettingAxis> {
  SettingAxis::ALL.to_vec()
}

impl From<RecipeDecl> for Recipe {
  fn from(decl: RecipeDecl) -> Self {
    Recipe {
      identity: PackageIdentity {
        name: decl.name,
        version: decl.version,
        url: decl.url,
        license: decl.license,
        description: decl.description,
      },
      settings: decl.settings,
      default_options: decl.default_options,
      generators: decl.generators,
      exports_sources: decl.exports_sources.into(),
      exports_excludes: decl.exports_excludes.into(),
      libs: decl.libs,
    }
  }
}

/// Load and validate a recipe file.
pub fn load_recipe(path: &Path) -> Result<Recipe, RecipeError> {
  let source = std::fs::read_to_string(path).map_err(|source| RecipeError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  parse_recipe(&source, &format!("@{}", path.display()))
}

/// Evaluate recipe source and validate the result.
///
/// `chunk_name` shows up in Lua error messages.
pub fn parse_recipe(source: &str, chunk_name: &str) -> Result<Recipe, RecipeError> {
  let decl = evaluate(source, chunk_name).map_err(|e| RecipeError::Lua {
    chunk: chunk_name.to_string(),
    message: e.to_string(),
  })?;

  let recipe = Recipe::from(decl);
  recipe.validate()?;

  debug!(package = %recipe.identity, libs = ?recipe.libs, "loaded recipe");
  Ok(recipe)
}

fn evaluate(source: &str, chunk_name: &str) -> LuaResult<RecipeDecl> {
  let lua = Lua::new();
  register_globals(&lua)?;

  let value = lua.load(source).set_name(chunk_name).eval::<LuaValue>()?;
  if !value.is_table() {
    return Err(LuaError::external(format!(
      "recipe must return a table, got {}",
      value.type_name()
    )));
  }

  lua.from_value(value)
}

fn register_globals(lua: &Lua) -> LuaResult<()> {
  let vispkg = lua.create_table()?;
  vispkg.set("version", env!("CARGO_PKG_VERSION"))?;

  // An unknown host still gets to evaluate recipes that don't branch on it
  if let Ok(host) = Host::current() {
    vispkg.set("os", host.os.as_str())?;
    vispkg.set("arch", host.arch.as_str())?;
  }

  lua.globals().set("vispkg", vispkg)?;
  Ok(())
}
