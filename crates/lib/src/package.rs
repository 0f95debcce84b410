//! Consumer-facing package metadata.
//!
//! [`PackageInfo`] carries the logical library names a consumer links
//! against. The platform file name for each is derived by
//! [`library_filename`]; the driver uses it to verify the staged files, and
//! consumers use it to find them.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::ContextLayout;
use crate::options::{Linkage, Options};
use crate::settings::Settings;
use crate::settings::compiler::Compiler;
use crate::settings::os::Os;

const MARKER_VERSION: u32 = 1;

/// Libraries downstream packages link against, in link order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
  pub libs: Vec<String>,
}

/// Platform file name of a logical library as staged under `lib/`.
///
/// MSVC-style toolchains stage `X.lib` for both static archives and import
/// libraries of DLLs; GNU-style toolchains use the `lib` prefix.
pub fn library_filename(lib: &str, settings: &Settings, linkage: Linkage) -> String {
  let msvc_style = settings.os == Os::Windows && settings.compiler == Compiler::Msvc;
  if msvc_style {
    return format!("{}.lib", lib);
  }

  match (settings.os, linkage) {
    (_, Linkage::Static) => format!("lib{}.a", lib),
    (Os::Linux, Linkage::Shared) => format!("lib{}.so", lib),
    (Os::Macos, Linkage::Shared) => format!("lib{}.dylib", lib),
    (Os::Windows, Linkage::Shared) => format!("lib{}.dll.a", lib),
  }
}

/// Contents of the completion marker written into a verified package folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMarker {
  pub version: u32,
  pub reference: String,
  pub package_id: String,
  pub settings: Settings,
  pub options: Options,
  pub libs: Vec<String>,
  /// Full SHA-256 of the package folder, excluding the marker itself.
  pub output_hash: String,
}

impl PackageMarker {
  pub fn new(
    reference: String,
    package_id: String,
    settings: Settings,
    options: Options,
    libs: Vec<String>,
    output_hash: String,
  ) -> Self {
    Self {
      version: MARKER_VERSION,
      reference,
      package_id,
      settings,
      options,
      libs,
      output_hash,
    }
  }

  pub fn package_info(&self) -> PackageInfo {
    PackageInfo { libs: self.libs.clone() }
  }
}

#[derive(Debug, Error)]
pub enum PackageError {
  #[error("package at {0} is not complete (no marker); build it first")]
  NotBuilt(PathBuf),

  #[error("failed to read package marker {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("corrupt package marker {path}: {source}")]
  Corrupt {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("unsupported package marker version {0}")]
  UnsupportedVersion(u32),
}

/// Write the marker atomically so readers never see a half-written file.
pub fn write_marker(path: &Path, marker: &PackageMarker) -> io::Result<()> {
  let dir = path.parent().unwrap_or(Path::new("."));
  let mut file = tempfile::NamedTempFile::new_in(dir)?;
  serde_json::to_writer_pretty(&mut file, marker).map_err(io::Error::other)?;
  file.flush()?;
  file.persist(path).map_err(|e| e.error)?;
  Ok(())
}

/// Read the marker at `path`, if there is one.
pub fn read_marker(path: &Path) -> Result<Option<PackageMarker>, PackageError> {
  let content = match std::fs::read_to_string(path) {
    Ok(content) => content,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
    Err(source) => {
      return Err(PackageError::Read {
        path: path.to_path_buf(),
        source,
      });
    }
  };

  let marker: PackageMarker = serde_json::from_str(&content).map_err(|source| PackageError::Corrupt {
    path: path.to_path_buf(),
    source,
  })?;
  if marker.version != MARKER_VERSION {
    return Err(PackageError::UnsupportedVersion(marker.version));
  }
  Ok(Some(marker))
}

/// Package info of an already built context, read back from its marker.
pub fn installed_package(layout: &ContextLayout) -> Result<PackageMarker, PackageError> {
  read_marker(&layout.marker_path())?.ok_or_else(|| PackageError::NotBuilt(layout.package_dir.clone()))
}
