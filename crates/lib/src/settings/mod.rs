//! Build settings: the externally resolved axes a build is parameterized over.
//!
//! Settings start from the host platform ([`Settings::host`]) and are then
//! overridden by profile entries such as `build_type=Debug`. The descriptor
//! only ever reads them.

pub mod arch;
pub mod build_type;
pub mod compiler;
pub mod os;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use arch::Arch;
use build_type::BuildType;
use compiler::Compiler;
use os::Os;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
  #[error("invalid value '{value}' for setting '{axis}' (expected one of: {allowed})")]
  InvalidValue {
    axis: &'static str,
    value: String,
    allowed: &'static str,
  },

  #[error("unknown setting '{0}' (expected one of: os, compiler, build_type, arch)")]
  UnknownAxis(String),

  #[error("malformed assignment '{0}' (expected key=value)")]
  MalformedAssignment(String),

  #[error("host platform {os}/{arch} is not supported")]
  UnsupportedHost { os: String, arch: String },

  #[error("settings not supported on this platform: {0}")]
  Unsupported(String),
}

/// Name of one settings axis, as written in a recipe's `settings` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingAxis {
  Os,
  Compiler,
  BuildType,
  Arch,
}

impl SettingAxis {
  pub const ALL: [SettingAxis; 4] = [
    SettingAxis::Os,
    SettingAxis::Compiler,
    SettingAxis::BuildType,
    SettingAxis::Arch,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Os => "os",
      Self::Compiler => "compiler",
      Self::BuildType => "build_type",
      Self::Arch => "arch",
    }
  }
}

impl fmt::Display for SettingAxis {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for SettingAxis {
  type Err = SettingsError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "os" => Ok(Self::Os),
      "compiler" => Ok(Self::Compiler),
      "build_type" => Ok(Self::BuildType),
      "arch" => Ok(Self::Arch),
      other => Err(SettingsError::UnknownAxis(other.to_string())),
    }
  }
}

/// The machine the driver itself runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Host {
  pub os: Os,
  pub arch: Arch,
}

impl Host {
  pub fn new(os: Os, arch: Arch) -> Self {
    Self { os, arch }
  }

  /// Detect the current host.
  pub fn current() -> Result<Self, SettingsError> {
    match (Os::current(), Arch::current()) {
      (Some(os), Some(arch)) => Ok(Self { os, arch }),
      _ => Err(SettingsError::UnsupportedHost {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
      }),
    }
  }

  /// Returns the platform triple string (e.g., "x86_64-linux")
  pub fn triple(&self) -> String {
    format!("{}-{}", self.arch, self.os)
  }
}

impl fmt::Display for Host {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.triple())
  }
}

/// Fully resolved build settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Settings {
  pub os: Os,
  pub compiler: Compiler,
  pub build_type: BuildType,
  pub arch: Arch,
}

impl Settings {
  /// Default settings for a host: its native compiler, Release.
  pub fn for_host(host: Host) -> Self {
    Self {
      os: host.os,
      compiler: Compiler::default_for(host.os),
      build_type: BuildType::default(),
      arch: host.arch,
    }
  }

  /// Default settings for the machine we are running on.
  pub fn host() -> Result<Self, SettingsError> {
    Ok(Self::for_host(Host::current()?))
  }

  /// Override a single axis from its textual value.
  pub fn set(&mut self, axis: SettingAxis, value: &str) -> Result<(), SettingsError> {
    match axis {
      SettingAxis::Os => self.os = value.parse()?,
      SettingAxis::Compiler => self.compiler = value.parse()?,
      SettingAxis::BuildType => self.build_type = value.parse()?,
      SettingAxis::Arch => self.arch = value.parse()?,
    }
    Ok(())
  }

  /// Apply `key=value` profile entries in order; later entries win.
  pub fn with_overrides<I, S>(mut self, assignments: I) -> Result<Self, SettingsError>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    for assignment in assignments {
      let (key, value) = parse_assignment(assignment.as_ref())?;
      let axis: SettingAxis = key.parse()?;
      self.set(axis, value)?;
    }
    Ok(self)
  }

  pub fn value(&self, axis: SettingAxis) -> &'static str {
    match axis {
      SettingAxis::Os => self.os.as_str(),
      SettingAxis::Compiler => self.compiler.as_str(),
      SettingAxis::BuildType => self.build_type.as_str(),
      SettingAxis::Arch => self.arch.as_str(),
    }
  }

  /// The values of only the given axes, keyed by axis.
  ///
  /// A package only varies over the axes its recipe declares, so this is
  /// what feeds the package id.
  pub fn scoped(&self, axes: &[SettingAxis]) -> BTreeMap<SettingAxis, &'static str> {
    axes.iter().map(|axis| (*axis, self.value(*axis))).collect()
  }

  /// Reject combinations this host cannot build.
  ///
  /// Cross-compiling to a different OS is not supported; the only
  /// architecture change allowed is 32-bit x86 on an x86_64 host.
  pub fn check_supported(&self, host: Host) -> Result<(), SettingsError> {
    if self.os != host.os {
      return Err(SettingsError::Unsupported(format!(
        "cannot build for os '{}' on a {} host",
        self.os, host.os
      )));
    }
    if !self.compiler.available_on(self.os) {
      return Err(SettingsError::Unsupported(format!(
        "compiler '{}' is not available on {}",
        self.compiler, self.os
      )));
    }
    if !self.arch.buildable_on(host.arch) {
      return Err(SettingsError::Unsupported(format!(
        "cannot build for arch '{}' on a {} host",
        self.arch, host.arch
      )));
    }
    Ok(())
  }
}

impl fmt::Display for Settings {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "os={} compiler={} build_type={} arch={}",
      self.os, self.compiler, self.build_type, self.arch
    )
  }
}

/// Split `key=value`, trimming whitespace around both halves.
pub fn parse_assignment(s: &str) -> Result<(&str, &str), SettingsError> {
  match s.split_once('=') {
    Some((key, value)) if !key.trim().is_empty() && !value.trim().is_empty() => Ok((key.trim(), value.trim())),
    _ => Err(SettingsError::MalformedAssignment(s.to_string())),
  }
}
