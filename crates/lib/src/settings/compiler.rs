use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::SettingsError;
use super::os::Os;

/// C/C++ compiler family used for the build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Compiler {
  Gcc,
  Clang,
  AppleClang,
  Msvc,
}

impl Compiler {
  pub const ALL: [Compiler; 4] = [Compiler::Gcc, Compiler::Clang, Compiler::AppleClang, Compiler::Msvc];

  /// The compiler a plain install of `os` ships with.
  pub fn default_for(os: Os) -> Self {
    match os {
      Os::Linux => Self::Gcc,
      Os::Macos => Self::AppleClang,
      Os::Windows => Self::Msvc,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Gcc => "gcc",
      Self::Clang => "clang",
      Self::AppleClang => "apple-clang",
      Self::Msvc => "msvc",
    }
  }

  /// Whether this compiler can run on `os` at all.
  pub fn available_on(&self, os: Os) -> bool {
    match self {
      Self::Gcc | Self::Clang => true,
      Self::AppleClang => os == Os::Macos,
      Self::Msvc => os == Os::Windows,
    }
  }

  /// C and C++ driver names to hand to CMake, if it should not pick its own.
  pub fn drivers(&self) -> Option<(&'static str, &'static str)> {
    match self {
      Self::Gcc => Some(("gcc", "g++")),
      Self::Clang => Some(("clang", "clang++")),
      Self::AppleClang | Self::Msvc => None,
    }
  }
}

impl fmt::Display for Compiler {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Compiler {
  type Err = SettingsError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "gcc" => Ok(Self::Gcc),
      "clang" => Ok(Self::Clang),
      "apple-clang" | "apple_clang" => Ok(Self::AppleClang),
      "msvc" | "visual studio" => Ok(Self::Msvc),
      _ => Err(SettingsError::InvalidValue {
        axis: "compiler",
        value: s.to_string(),
        allowed: "gcc, clang, apple-clang, msvc",
      }),
    }
  }
}
