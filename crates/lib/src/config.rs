//! Runtime configuration for the build driver.

use std::path::PathBuf;

use tracing::warn;

use crate::paths::workspace_dir;

pub const CMAKE_ENV: &str = "VISPKG_CMAKE";
pub const CMAKE_GENERATOR_ENV: &str = "VISPKG_CMAKE_GENERATOR";
pub const JOBS_ENV: &str = "VISPKG_JOBS";

/// Configuration shared by every build context a driver creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
  /// Root of all settings-scoped working directories.
  pub workspace: PathBuf,

  /// CMake executable. A bare name is looked up on `PATH`.
  pub cmake: PathBuf,

  /// CMake generator (`-G`). If None, CMake picks its platform default.
  pub cmake_generator: Option<String>,

  /// Parallel build jobs passed to `cmake --build`. If None, the native
  /// tool decides.
  pub jobs: Option<usize>,
}

impl Default for DriverConfig {
  fn default() -> Self {
    Self {
      workspace: workspace_dir(),
      cmake: PathBuf::from("cmake"),
      cmake_generator: None,
      jobs: None,
    }
  }
}

impl DriverConfig {
  /// Defaults, overridden by `VISPKG_HOME`, `VISPKG_CMAKE`,
  /// `VISPKG_CMAKE_GENERATOR` and `VISPKG_JOBS`.
  pub fn from_env() -> Self {
    let mut config = Self::default();

    if let Some(cmake) = non_empty_var(CMAKE_ENV) {
      config.cmake = PathBuf::from(cmake);
    }
    config.cmake_generator = non_empty_var(CMAKE_GENERATOR_ENV);
    if let Some(jobs) = non_empty_var(JOBS_ENV) {
      match jobs.parse::<usize>() {
        Ok(n) if n > 0 => config.jobs = Some(n),
        _ => warn!(value = %jobs, "ignoring invalid {}", JOBS_ENV),
      }
    }

    config
  }

  pub fn with_workspace(mut self, workspace: PathBuf) -> Self {
    self.workspace = workspace;
    self
  }

  pub fn with_cmake(mut self, cmake: PathBuf) -> Self {
    self.cmake = cmake;
    self
  }
}

fn non_empty_var(key: &str) -> Option<String> {
  std::env::var(key).ok().filter(|v| !v.is_empty())
}
