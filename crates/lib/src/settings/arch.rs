use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::SettingsError;

/// CPU architecture a package is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arch {
  X86,
  X86_64,
  Aarch64,
}

impl Arch {
  pub const ALL: [Arch; 3] = [Arch::X86, Arch::X86_64, Arch::Aarch64];

  /// Detect the current CPU architecture at runtime
  pub fn current() -> Option<Self> {
    match std::env::consts::ARCH {
      "x86" => Some(Self::X86),
      "x86_64" => Some(Self::X86_64),
      "aarch64" => Some(Self::Aarch64),
      _ => None,
    }
  }

  /// Returns the lowercase string identifier for this architecture
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::X86 => "x86",
      Self::X86_64 => "x86_64",
      Self::Aarch64 => "aarch64",
    }
  }

  /// Whether a toolchain running on `host` can target this architecture.
  ///
  /// Only the 32-bit x86 multilib case is treated as reachable from a
  /// different host architecture.
  pub fn buildable_on(&self, host: Arch) -> bool {
    *self == host || (*self == Arch::X86 && host == Arch::X86_64)
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Arch {
  type Err = SettingsError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "x86" | "i686" => Ok(Self::X86),
      "x86_64" | "amd64" => Ok(Self::X86_64),
      "aarch64" | "armv8" | "arm64" => Ok(Self::Aarch64),
      _ => Err(SettingsError::InvalidValue {
        axis: "arch",
        value: s.to_string(),
        allowed: "x86, x86_64, aarch64",
      }),
    }
  }
}
