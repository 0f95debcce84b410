//! On-disk layout of build contexts.
//!
//! ```text
//! <workspace>/<name>/<version>/
//!   export/                   source snapshot
//!   <package_id>/
//!     .lock
//!     build/                  CMake build tree, generated build info
//!     package/                install prefix: include/, lib/, bin/
//!       .vispkg-complete
//! ```
//!
//! The package id covers settings and options, so static and shared builds,
//! or Debug and Release builds, never share a directory.

use std::path::{Path, PathBuf};

use crate::consts::PACKAGE_COMPLETE_MARKER;
use crate::recipe::PackageIdentity;
use crate::util::hash::ObjectHash;

/// Directory holding every context of one `name/version`.
pub fn package_root(workspace: &Path, identity: &PackageIdentity) -> PathBuf {
  workspace.join(&identity.name).join(&identity.version)
}

/// Where exported sources of `name/version` are snapshotted.
pub fn export_dir(workspace: &Path, identity: &PackageIdentity) -> PathBuf {
  package_root(workspace, identity).join("export")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextLayout {
  pub root: PathBuf,
  pub build_dir: PathBuf,
  pub package_dir: PathBuf,
}

impl ContextLayout {
  pub fn new(workspace: &Path, identity: &PackageIdentity, package_id: &ObjectHash) -> Self {
    let root = package_root(workspace, identity).join(&package_id.0);
    Self {
      build_dir: root.join("build"),
      package_dir: root.join("package"),
      root,
    }
  }

  pub fn lib_dir(&self) -> PathBuf {
    self.package_dir.join("lib")
  }

  pub fn marker_path(&self) -> PathBuf {
    self.package_dir.join(PACKAGE_COMPLETE_MARKER)
  }
}
