//! Build-file generators.
//!
//! Generators describe the build context to the project being built. The
//! CMake flavor is picked up automatically through `CMAKE_PROJECT_INCLUDE`;
//! the JSON flavor is for tooling that does not speak CMake.

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::options::{Linkage, Options};
use crate::recipe::{Generator, PackageIdentity};
use crate::settings::{SettingAxis, Settings};

pub const CMAKE_BUILDINFO_FILENAME: &str = "vispkg_buildinfo.cmake";
pub const JSON_BUILDINFO_FILENAME: &str = "vispkg_buildinfo.json";

/// Everything a generator knows about the context.
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo<'a> {
  pub package: &'a PackageIdentity,
  pub package_id: &'a str,
  pub settings: &'a Settings,
  pub options: &'a Options,
  pub linkage: Linkage,
  pub libs: &'a [String],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
  pub generator: Generator,
  pub path: PathBuf,
}

impl Generator {
  pub fn filename(&self) -> &'static str {
    match self {
      Generator::Cmake => CMAKE_BUILDINFO_FILENAME,
      Generator::Json => JSON_BUILDINFO_FILENAME,
    }
  }

  pub fn render(&self, info: &BuildInfo<'_>) -> io::Result<String> {
    match self {
      Generator::Cmake => Ok(render_cmake(info)),
      Generator::Json => serde_json::to_string_pretty(info).map_err(io::Error::other),
    }
  }
}

/// Write one file per requested generator into `dir`.
pub fn write_generators(generators: &[Generator], info: &BuildInfo<'_>, dir: &Path) -> io::Result<Vec<GeneratedFile>> {
  std::fs::create_dir_all(dir)?;

  generators
    .iter()
    .map(|generator| {
      let path = dir.join(generator.filename());
      std::fs::write(&path, generator.render(info)?)?;
      debug!(generator = %generator, path = %path.display(), "generated build info");
      Ok(GeneratedFile {
        generator: *generator,
        path,
      })
    })
    .collect()
}

fn render_cmake(info: &BuildInfo<'_>) -> String {
  let mut out = String::new();
  let mut set = |name: &str, value: &str| {
    let _ = writeln!(out, "set({} \"{}\")", name, escape_cmake(value));
  };

  set("VISPKG_PACKAGE_NAME", &info.package.name);
  set("VISPKG_PACKAGE_VERSION", &info.package.version);
  set("VISPKG_PACKAGE_ID", info.package_id);
  for axis in SettingAxis::ALL {
    let name = format!("VISPKG_SETTINGS_{}", axis.as_str().to_ascii_uppercase());
    set(&name, info.settings.value(axis));
  }
  set("VISPKG_OPTION_SHARED", if info.options.shared { "ON" } else { "OFF" });
  set("VISPKG_LINKAGE", info.linkage.as_str());
  set("VISPKG_LIBS", &info.libs.join(";"));

  format!("# Generated by vispkg for {}. Do not edit.\n{}", info.package, out)
}

/// Escape a value for a quoted CMake argument.
fn escape_cmake(value: &str) -> String {
  let mut escaped = String::with_capacity(value.len());
  for c in value.chars() {
    if matches!(c, '\\' | '"' | '$') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped
}
