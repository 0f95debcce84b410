use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::options::Options;
use crate::settings::SettingAxis;

#[derive(Debug, Error)]
pub enum RecipeError {
  #[error("failed to read recipe {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("lua error in {chunk}: {message}")]
  Lua { chunk: String, message: String },

  #[error("invalid recipe: {0}")]
  Invalid(String),
}

/// Who a package is. Never mutated after the recipe is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageIdentity {
  pub name: String,
  pub version: String,
  #[serde(default)]
  pub url: String,
  #[serde(default)]
  pub license: String,
  #[serde(default)]
  pub description: String,
}

impl PackageIdentity {
  pub fn new(name: &str, version: &str) -> Self {
    Self {
      name: name.to_string(),
      version: version.to_string(),
      url: String::new(),
      license: String::new(),
      description: String::new(),
    }
  }

  pub fn with_description(mut self, description: &str) -> Self {
    self.description = description.to_string();
    self
  }

  /// `name/version` reference, as downstream recipes write it.
  pub fn reference(&self) -> String {
    format!("{}/{}", self.name, self.version)
  }
}

impl fmt::Display for PackageIdentity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.reference())
  }
}

/// Build-file generators a recipe can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Generator {
  /// `vispkg_buildinfo.cmake`, injected into the CMake project.
  Cmake,
  /// `vispkg_buildinfo.json`, for non-CMake consumers.
  Json,
}

impl Generator {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Cmake => "cmake",
      Self::Json => "json",
    }
  }
}

impl fmt::Display for Generator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// A validated package recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
  pub identity: PackageIdentity,
  /// Settings axes the package varies over.
  pub settings: Vec<SettingAxis>,
  pub default_options: Options,
  pub generators: Vec<Generator>,
  /// Glob patterns, relative to the recipe directory, of files to snapshot.
  pub exports_sources: Vec<String>,
  /// Extra glob patterns removed from the snapshot.
  pub exports_excludes: Vec<String>,
  /// Logical library names consumers link against, in link order.
  pub libs: Vec<String>,
}

impl Recipe {
  /// A recipe that varies over every settings axis and exports nothing.
  pub fn new(identity: PackageIdentity, libs: Vec<String>) -> Self {
    Self {
      identity,
      settings: SettingAxis::ALL.to_vec(),
      default_options: Options::default(),
      generators: Vec::new(),
      exports_sources: Vec::new(),
      exports_excludes: Vec::new(),
      libs,
    }
  }

  pub fn with_generators(mut self, generators: Vec<Generator>) -> Self {
    self.generators = generators;
    self
  }

  pub fn with_exports(mut self, sources: Vec<String>, excludes: Vec<String>) -> Self {
    self.exports_sources = sources;
    self.exports_excludes = excludes;
    self
  }

  pub fn validate(&self) -> Result<(), RecipeError> {
    let invalid = |msg: String| Err(RecipeError::Invalid(msg));

    if !is_valid_name(&self.identity.name) {
      return invalid(format!(
        "name '{}' must be non-empty and use only letters, digits, '_', '-', '+' or '.'",
        self.identity.name
      ));
    }
    if !is_valid_name(&self.identity.version) {
      return invalid(format!(
        "version '{}' must be non-empty and use only letters, digits, '_', '-', '+' or '.'",
        self.identity.version
      ));
    }

    if let Some(axis) = first_duplicate(&self.settings) {
      return invalid(format!("setting '{}' is listed more than once", axis));
    }
    if let Some(generator) = first_duplicate(&self.generators) {
      return invalid(format!("generator '{}' is listed more than once", generator));
    }

    if self.libs.is_empty() {
      return invalid("libs must name at least one library".to_string());
    }
    if let Some(lib) = self.libs.iter().find(|lib| !is_valid_name(lib)) {
      return invalid(format!("library name '{}' is not a valid file stem", lib));
    }
    if let Some(lib) = first_duplicate(&self.libs) {
      return invalid(format!("library '{}' is listed more than once", lib));
    }

    for pattern in self.exports_sources.iter().chain(&self.exports_excludes) {
      if let Err(e) = glob::Pattern::new(pattern) {
        return invalid(format!("bad export pattern '{}': {}", pattern, e));
      }
    }

    Ok(())
  }
}

/// Names and versions become directory names, so `.` and `..` are out.
fn is_valid_name(name: &str) -> bool {
  !matches!(name, "" | "." | "..")
    && name
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+' | '.'))
}

fn first_duplicate<T: Eq + std::hash::Hash>(items: &[T]) -> Option<&T> {
  let mut seen = HashSet::new();
  items.iter().find(|item| !seen.insert(*item))
}
