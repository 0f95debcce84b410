//! The underlying build system.
//!
//! [`BuildTool`] is the seam between the descriptor and whatever actually
//! compiles code. [`CMake`] is the real implementation; tests substitute
//! their own.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::config::DriverConfig;
use crate::options::Options;
use crate::process::{ToolError, run_tool};
use crate::settings::Settings;
use crate::settings::arch::Arch;
use crate::settings::build_type::BuildType;
use crate::settings::compiler::Compiler;
use crate::settings::os::Os;

/// Inputs to a configure step.
#[derive(Debug, Clone, Copy)]
pub struct ConfigureRequest<'a> {
  pub source_dir: &'a Path,
  pub build_dir: &'a Path,
  pub install_prefix: &'a Path,
  pub settings: &'a Settings,
  pub options: &'a Options,
  /// CMake file injected into the project before its first `project()` call.
  pub project_include: Option<&'a Path>,
}

/// Inputs to a build step.
#[derive(Debug, Clone, Copy)]
pub struct BuildRequest<'a> {
  pub build_dir: &'a Path,
  pub target: &'a str,
  pub build_type: BuildType,
}

#[async_trait]
pub trait BuildTool: Send + Sync {
  /// Generate a build tree for `request.source_dir` in `request.build_dir`.
  async fn configure(&self, request: &ConfigureRequest<'_>) -> Result<(), ToolError>;

  /// Build `request.target` in a configured build tree.
  async fn build(&self, request: &BuildRequest<'_>) -> Result<(), ToolError>;
}

/// CMake driven through its command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CMake {
  program: PathBuf,
  generator: Option<String>,
  jobs: Option<usize>,
}

impl CMake {
  pub fn new(program: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      generator: None,
      jobs: None,
    }
  }

  pub fn from_config(config: &DriverConfig) -> Self {
    Self {
      program: config.cmake.clone(),
      generator: config.cmake_generator.clone(),
      jobs: config.jobs,
    }
  }

  pub fn with_generator(mut self, generator: &str) -> Self {
    self.generator = Some(generator.to_string());
    self
  }

  pub fn with_jobs(mut self, jobs: usize) -> Self {
    self.jobs = Some(jobs);
    self
  }

  pub fn program(&self) -> &Path {
    &self.program
  }

  pub fn configure_args(&self, request: &ConfigureRequest<'_>) -> Vec<OsString> {
    let settings = request.settings;
    let mut args: Vec<OsString> = vec![
      "-S".into(),
      request.source_dir.into(),
      "-B".into(),
      request.build_dir.into(),
    ];

    if let Some(generator) = &self.generator {
      args.push("-G".into());
      args.push(generator.into());
      if generator.starts_with("Visual Studio") {
        args.push("-A".into());
        args.push(visual_studio_platform(settings.arch).into());
      }
    }

    args.push(define("CMAKE_BUILD_TYPE", settings.build_type.as_str()));
    args.push(define("BUILD_SHARED_LIBS", if request.options.shared { "ON" } else { "OFF" }));
    args.push(define("CMAKE_INSTALL_PREFIX", request.install_prefix));
    args.push(define("CMAKE_INSTALL_LIBDIR", "lib"));

    if settings.os != Os::Windows {
      args.push(define("CMAKE_POSITION_INDEPENDENT_CODE", "ON"));
    }

    if let Some((cc, cxx)) = settings.compiler.drivers() {
      args.push(define("CMAKE_C_COMPILER", cc));
      args.push(define("CMAKE_CXX_COMPILER", cxx));
    }

    match (settings.os, settings.arch) {
      (Os::Macos, arch) => args.push(define("CMAKE_OSX_ARCHITECTURES", osx_architecture(arch))),
      (_, Arch::X86) if settings.compiler != Compiler::Msvc => {
        args.push(define("CMAKE_C_FLAGS", "-m32"));
        args.push(define("CMAKE_CXX_FLAGS", "-m32"));
      }
      _ => {}
    }

    if let Some(include) = request.project_include {
      args.push(define("CMAKE_PROJECT_INCLUDE", include));
    }

    args
  }

  pub fn build_args(&self, request: &BuildRequest<'_>) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
      "--build".into(),
      request.build_dir.into(),
      "--target".into(),
      request.target.into(),
      "--config".into(),
      request.build_type.as_str().into(),
    ];
    if let Some(jobs) = self.jobs {
      args.push("--parallel".into());
      args.push(jobs.to_string().into());
    }
    args
  }
}

#[async_trait]
impl BuildTool for CMake {
  async fn configure(&self, request: &ConfigureRequest<'_>) -> Result<(), ToolError> {
    let args = self.configure_args(request);
    run_tool(&self.program, &args, request.build_dir).await?;
    Ok(())
  }

  async fn build(&self, request: &BuildRequest<'_>) -> Result<(), ToolError> {
    let args = self.build_args(request);
    run_tool(&self.program, &args, request.build_dir).await?;
    Ok(())
  }
}

/// `-D<name>=<value>`
fn define(name: &str, value: impl AsRef<OsStr>) -> OsString {
  let mut arg = OsString::from(format!("-D{}=", name));
  arg.push(value.as_ref());
  arg
}

fn visual_studio_platform(arch: Arch) -> &'static str {
  match arch {
    Arch::X86 => "Win32",
    Arch::X86_64 => "x64",
    Arch::Aarch64 => "ARM64",
  }
}

fn osx_architecture(arch: Arch) -> &'static str {
  match arch {
    Arch::X86 => "i386",
    Arch::X86_64 => "x86_64",
    Arch::Aarch64 => "arm64",
  }
}
