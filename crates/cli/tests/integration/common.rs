//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Isolated test environment.
///
/// Each test gets its own copy of the visMath project, its own workspace
/// and its own fake `cmake`.
pub struct TestEnv {
  pub temp: TempDir,
  pub project: PathBuf,
  pub workspace: PathBuf,
  pub cmake: PathBuf,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("visMath");
    copy_dir(&fixture_path("visMath"), &project);

    let cmake = temp.path().join("bin").join("cmake");
    std::fs::create_dir_all(cmake.parent().unwrap()).unwrap();
    std::fs::copy(fixture_path("fake_cmake.sh"), &cmake).unwrap();
    make_executable(&cmake);

    Self {
      workspace: temp.path().join("ws"),
      temp,
      project,
      cmake,
    }
  }

  pub fn recipe(&self) -> PathBuf {
    self.project.join("recipe.lua")
  }

  /// Write a file relative to the project directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.project.join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// A vispkg command pointed at this environment's workspace, with
  /// ambient configuration cleared.
  pub fn cmd(&self) -> Command {
    let mut cmd = cargo_bin_cmd!("vispkg");
    cmd
      .env_remove("VISPKG_HOME")
      .env_remove("VISPKG_CMAKE")
      .env_remove("VISPKG_CMAKE_GENERATOR")
      .env_remove("VISPKG_JOBS")
      .env_remove("FAKE_CMAKE_FAIL_BUILD")
      .arg("--workspace")
      .arg(&self.workspace);
    cmd
  }

  /// `vispkg build` of this environment's recipe with the fake cmake.
  pub fn build_cmd(&self) -> Command {
    let mut cmd = self.cmd();
    cmd.arg("build").arg(self.recipe()).arg("--cmake").arg(&self.cmake);
    cmd
  }
}

fn copy_dir(from: &Path, to: &Path) {
  std::fs::create_dir_all(to).unwrap();
  for entry in std::fs::read_dir(from).unwrap() {
    let entry = entry.unwrap();
    let target = to.join(entry.file_name());
    if entry.file_type().unwrap().is_dir() {
      copy_dir(&entry.path(), &target);
    } else {
      std::fs::copy(entry.path(), &target).unwrap();
    }
  }
}

#[cfg(unix)]
fn make_executable(path: &Path) {
  use std::os::unix::fs::PermissionsExt;
  std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) {}
