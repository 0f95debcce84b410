//! Package build options.
//!
//! Options are package-specific toggles, distinct from the global settings.
//! The only recognized option is `shared`; anything else is rejected rather
//! than silently carried along.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::{SettingsError, parse_assignment};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
  #[error("unknown option '{0}' (expected one of: shared)")]
  UnknownOption(String),

  #[error("invalid value '{value}' for option '{option}' (expected True or False)")]
  InvalidValue { option: &'static str, value: String },

  #[error(transparent)]
  Assignment(#[from] SettingsError),
}

/// Typed option set. Unknown keys in a recipe's `options` table fail to
/// deserialize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Options {
  /// Build a shared library instead of a static archive.
  #[serde(default)]
  pub shared: bool,
}

impl Options {
  pub fn linkage(&self) -> Linkage {
    if self.shared { Linkage::Shared } else { Linkage::Static }
  }

  /// Apply `key=value` option entries in order; later entries win.
  pub fn with_overrides<I, S>(mut self, assignments: I) -> Result<Self, OptionsError>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    for assignment in assignments {
      let (key, value) = parse_assignment(assignment.as_ref())?;
      match key {
        "shared" => self.shared = parse_bool("shared", value)?,
        other => return Err(OptionsError::UnknownOption(other.to_string())),
      }
    }
    Ok(self)
  }
}

impl fmt::Display for Options {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "shared={}", if self.shared { "True" } else { "False" })
  }
}

fn parse_bool(option: &'static str, value: &str) -> Result<bool, OptionsError> {
  match value.to_ascii_lowercase().as_str() {
    "true" | "1" | "on" | "yes" => Ok(true),
    "false" | "0" | "off" | "no" => Ok(false),
    _ => Err(OptionsError::InvalidValue {
      option,
      value: value.to_string(),
    }),
  }
}

/// How the produced library is linked by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
  Static,
  Shared,
}

impl Linkage {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Static => "static",
      Self::Shared => "shared",
    }
  }
}

impl fmt::Display for Linkage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
