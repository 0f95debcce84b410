//! Default locations on disk.

use std::path::PathBuf;

use crate::consts::APP_NAME;

/// Environment variable overriding the workspace root.
pub const HOME_ENV: &str = "VISPKG_HOME";

/// Returns the user's home directory, if the environment names one
#[cfg(windows)]
pub fn home_dir() -> Option<PathBuf> {
  std::env::var_os("USERPROFILE").map(PathBuf::from)
}

/// Returns the user's home directory, if the environment names one
#[cfg(not(windows))]
pub fn home_dir() -> Option<PathBuf> {
  std::env::var_os("HOME").map(PathBuf::from)
}

/// Returns the directory for data files for the application
#[cfg(windows)]
pub fn data_dir() -> PathBuf {
  std::env::var_os("LOCALAPPDATA")
    .map(PathBuf::from)
    .or_else(|| home_dir().map(|home| home.join("AppData").join("Local")))
    .unwrap_or_else(|| PathBuf::from("."))
    .join(APP_NAME)
}

/// Returns the directory for data files for the application
#[cfg(not(windows))]
pub fn data_dir() -> PathBuf {
  std::env::var_os("XDG_DATA_HOME")
    .map(PathBuf::from)
    .or_else(|| home_dir().map(|home| home.join(".local").join("share")))
    .unwrap_or_else(|| PathBuf::from("."))
    .join(APP_NAME)
}

/// Root under which every package's build contexts live.
///
/// `VISPKG_HOME` wins, otherwise the application data directory.
pub fn workspace_dir() -> PathBuf {
  match std::env::var_os(HOME_ENV) {
    Some(dir) if !dir.is_empty() => PathBuf::from(dir),
    _ => data_dir(),
  }
}
