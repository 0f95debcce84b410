//! Test utilities for vispkg-lib.
//!
//! [`FakeTool`] stands in for CMake: it records calls and, on an `install`
//! build, stages the library files a real toolchain would produce.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::cmake::{BuildRequest, BuildTool, ConfigureRequest};
use crate::consts::INSTALL_TARGET;
use crate::options::Options;
use crate::package::library_filename;
use crate::process::ToolError;
use crate::recipe::{PackageIdentity, Recipe};
use crate::settings::Settings;

/// Write a minimal CMake project into `dir`.
pub fn write_project(dir: &Path) {
  std::fs::create_dir_all(dir.join("src")).unwrap();
  std::fs::write(
    dir.join("CMakeLists.txt"),
    "cmake_minimum_required(VERSION 3.15)\nproject(visMath CXX)\nadd_library(visMath src/visMath.cpp)\ninstall(TARGETS visMath)\n",
  )
  .unwrap();
  std::fs::write(dir.join("src/visMath.cpp"), "// Vec3 operator+\n").unwrap();
}

pub fn vismath_recipe() -> Recipe {
  Recipe::new(
    PackageIdentity::new("visMath", "0.2").with_description("Basic math module for the VIS physics engine."),
    vec!["visMath".to_string()],
  )
}

#[derive(Debug, Clone)]
struct Configured {
  prefix: PathBuf,
  settings: Settings,
  options: Options,
}

#[derive(Debug, Default)]
pub struct FakeTool {
  fail_configure: bool,
  fail_build: bool,
  /// Skip staging library files on install.
  skip_staging: bool,
  libs: Vec<String>,
  calls: Mutex<Vec<String>>,
  contexts: Mutex<HashMap<PathBuf, Configured>>,
}

impl FakeTool {
  pub fn new(libs: &[&str]) -> Self {
    Self {
      libs: libs.iter().map(|s| s.to_string()).collect(),
      ..Default::default()
    }
  }

  pub fn failing_configure(mut self) -> Self {
    self.fail_configure = true;
    self
  }

  pub fn failing_build(mut self) -> Self {
    self.fail_build = true;
    self
  }

  pub fn without_staging(mut self) -> Self {
    self.skip_staging = true;
    self
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }
}

#[async_trait]
impl BuildTool for FakeTool {
  async fn configure(&self, request: &ConfigureRequest<'_>) -> Result<(), ToolError> {
    self.calls.lock().unwrap().push("configure".to_string());
    if self.fail_configure {
      return Err(ToolError::Failed {
        cmd: "cmake -S".to_string(),
        code: Some(1),
        output: "CMake Error: The source directory does not appear to contain CMakeLists.txt".to_string(),
      });
    }
    self.contexts.lock().unwrap().insert(
      request.build_dir.to_path_buf(),
      Configured {
        prefix: request.install_prefix.to_path_buf(),
        settings: *request.settings,
        options: *request.options,
      },
    );
    Ok(())
  }

  async fn build(&self, request: &BuildRequest<'_>) -> Result<(), ToolError> {
    self
      .calls
      .lock()
      .unwrap()
      .push(format!("build:{}", request.target));
    if self.fail_build {
      return Err(ToolError::Failed {
        cmd: "cmake --build".to_string(),
        code: Some(2),
        output: "visMath.cpp:(.text+0x1f): undefined reference to `visMath::dot'".to_string(),
      });
    }
    if request.target != INSTALL_TARGET || self.skip_staging {
      return Ok(());
    }

    let ctx = self
      .contexts
      .lock()
      .unwrap()
      .get(request.build_dir)
      .cloned()
      .expect("build before configure");
    let lib_dir = ctx.prefix.join("lib");
    std::fs::create_dir_all(&lib_dir).unwrap();
    for lib in &self.libs {
      let name = library_filename(lib, &ctx.settings, ctx.options.linkage());
      std::fs::write(lib_dir.join(name), format!("{} {}", lib, ctx.settings)).unwrap();
    }
    Ok(())
  }
}
