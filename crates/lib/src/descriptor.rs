//! The package descriptor and its build state machine.
//!
//! A [`Descriptor`] is a recipe bound to one set of settings and options.
//! Building it walks a fixed sequence of states:
//!
//! ```text
//! Uninitialized --configure--> Configured --build--> Built --package_info--> Packaged
//!        \                          \
//!         +--------------------------+--> Failed
//! ```
//!
//! Each state is its own type ([`BuildContext`], [`Configured`], [`Built`]),
//! so a build cannot be requested before configure succeeds and package info
//! cannot be read before a build succeeds. Failures are returned as-is; there
//! is no retry and no partially packaged result.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cmake::{BuildRequest, BuildTool, ConfigureRequest};
use crate::consts::{BUILD_DESCRIPTION_FILENAME, INSTALL_TARGET, PACKAGE_COMPLETE_MARKER};
use crate::generators::{BuildInfo, GeneratedFile, write_generators};
use crate::layout::ContextLayout;
use crate::lock::{ContextLock, LockError};
use crate::options::Options;
use crate::package::{PackageInfo, PackageMarker, library_filename, read_marker, write_marker};
use crate::process::ToolError;
use crate::recipe::{Generator, Recipe};
use crate::settings::{Host, SettingAxis, Settings, SettingsError};
use crate::util::hash::{ContentHash, DirHashError, HashError, Hashable, ObjectHash, hash_directory};

/// Errors from the configure step.
#[derive(Debug, Error)]
pub enum ConfigureError {
  #[error("source directory not found: {0}")]
  SourceMissing(PathBuf),

  #[error("source path is not a directory: {0}")]
  NotADirectory(PathBuf),

  #[error("no {file} in {dir}; not a buildable project")]
  MissingBuildDescription { dir: PathBuf, file: &'static str },

  #[error(transparent)]
  Settings(#[from] SettingsError),

  #[error("failed to compute package id: {0}")]
  PackageId(#[source] HashError),

  #[error(transparent)]
  Lock(#[from] LockError),

  #[error("failed to prepare {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write generator files: {0}")]
  Generator(#[source] io::Error),

  #[error("build system configure failed: {0}")]
  Tool(#[source] ToolError),
}

/// Errors from the build step.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error("build target name must not be empty")]
  EmptyTarget,

  #[error("build of target '{target}' failed: {source}")]
  Tool {
    target: String,
    #[source]
    source: ToolError,
  },

  #[error("library '{lib}' was not staged; expected {}", .path.display())]
  MissingArtifact { lib: String, path: PathBuf },

  #[error("failed to hash staged package: {0}")]
  Hash(#[from] DirHashError),

  #[error("failed to write package marker: {0}")]
  Marker(#[source] io::Error),
}

/// Any failure of a build attempt.
#[derive(Debug, Error)]
pub enum DescriptorError {
  #[error("configuration failed: {0}")]
  Configure(#[from] ConfigureError),

  #[error("build failed: {0}")]
  Build(#[from] BuildError),
}

/// Where a build attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildState {
  Uninitialized,
  Configured,
  Built,
  Packaged,
  Failed,
}

impl fmt::Display for BuildState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::Uninitialized => "uninitialized",
      Self::Configured => "configured",
      Self::Built => "built",
      Self::Packaged => "packaged",
      Self::Failed => "failed",
    };
    write!(f, "{}", s)
  }
}

/// What feeds the package id: name, version, the declared settings axes and
/// the options. Metadata like the description does not change binaries.
#[derive(Serialize)]
struct PackageIdInput<'a> {
  name: &'a str,
  version: &'a str,
  settings: BTreeMap<SettingAxis, &'static str>,
  options: &'a Options,
}

impl Hashable for PackageIdInput<'_> {}

/// A recipe bound to concrete settings and options. Immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
  recipe: Recipe,
  settings: Settings,
  options: Options,
}

impl Descriptor {
  pub fn new(recipe: Recipe, settings: Settings, options: Options) -> Self {
    Self {
      recipe,
      settings,
      options,
    }
  }

  /// Bind with the recipe's own default options.
  pub fn with_default_options(recipe: Recipe, settings: Settings) -> Self {
    let options = recipe.default_options;
    Self::new(recipe, settings, options)
  }

  pub fn recipe(&self) -> &Recipe {
    &self.recipe
  }

  pub fn settings(&self) -> &Settings {
    &self.settings
  }

  pub fn options(&self) -> &Options {
    &self.options
  }

  pub fn reference(&self) -> String {
    self.recipe.identity.reference()
  }

  pub fn package_id(&self) -> Result<ObjectHash, HashError> {
    PackageIdInput {
      name: &self.recipe.identity.name,
      version: &self.recipe.identity.version,
      settings: self.settings.scoped(&self.recipe.settings),
      options: &self.options,
    }
    .compute_hash()
  }

  pub fn layout(&self, workspace: &Path) -> Result<ContextLayout, HashError> {
    Ok(ContextLayout::new(workspace, &self.recipe.identity, &self.package_id()?))
  }
}

/// An uninitialized build attempt.
pub struct BuildContext<'a> {
  descriptor: &'a Descriptor,
  tool: &'a dyn BuildTool,
  workspace: PathBuf,
  host: Option<Host>,
}

impl<'a> BuildContext<'a> {
  pub fn new(descriptor: &'a Descriptor, tool: &'a dyn BuildTool, workspace: &Path) -> Self {
    Self {
      descriptor,
      tool,
      workspace: workspace.to_path_buf(),
      host: None,
    }
  }

  /// Check settings against `host` instead of the detected machine.
  pub fn with_host(mut self, host: Host) -> Self {
    self.host = Some(host);
    self
  }

  pub fn state(&self) -> BuildState {
    BuildState::Uninitialized
  }

  /// Prepare a build tree for the project at `source_root`.
  pub async fn configure(self, source_root: &Path) -> Result<Configured<'a>, ConfigureError> {
    let descriptor = self.descriptor;
    let source_dir = check_source_root(source_root)?;

    let host = match self.host {
      Some(host) => host,
      None => Host::current()?,
    };
    descriptor.settings.check_supported(host)?;

    let package_id = descriptor.package_id().map_err(ConfigureError::PackageId)?;
    let layout = ContextLayout::new(&self.workspace, &descriptor.recipe.identity, &package_id);
    let reference = descriptor.reference();

    let lock = ContextLock::acquire(&layout.root, &reference)?;
    debug!(lock = %lock.lock_path().display(), "acquired context lock");

    // Every attempt stages into an empty package folder
    let previous_output_hash = match read_marker(&layout.marker_path()) {
      Ok(marker) => marker.map(|m| m.output_hash),
      Err(e) => {
        warn!(error = %e, "ignoring unreadable marker from a previous build");
        None
      }
    };
    if layout.package_dir.exists() {
      std::fs::remove_dir_all(&layout.package_dir).map_err(|source| ConfigureError::Io {
        path: layout.package_dir.clone(),
        source,
      })?;
    }
    for dir in [&layout.build_dir, &layout.package_dir] {
      std::fs::create_dir_all(dir).map_err(|source| ConfigureError::Io {
        path: dir.clone(),
        source,
      })?;
    }

    let info = BuildInfo {
      package: &descriptor.recipe.identity,
      package_id: &package_id.0,
      settings: &descriptor.settings,
      options: &descriptor.options,
      linkage: descriptor.options.linkage(),
      libs: &descriptor.recipe.libs,
    };
    let generated =
      write_generators(&descriptor.recipe.generators, &info, &layout.build_dir).map_err(ConfigureError::Generator)?;
    let project_include = generated
      .iter()
      .find(|file| file.generator == Generator::Cmake)
      .map(|file| file.path.as_path());

    let request = ConfigureRequest {
      source_dir: &source_dir,
      build_dir: &layout.build_dir,
      install_prefix: &layout.package_dir,
      settings: &descriptor.settings,
      options: &descriptor.options,
      project_include,
    };
    self.tool.configure(&request).await.map_err(ConfigureError::Tool)?;

    info!(
      package = %reference,
      package_id = %package_id,
      settings = %descriptor.settings,
      options = %descriptor.options,
      "configured"
    );

    Ok(Configured {
      descriptor,
      tool: self.tool,
      source_dir,
      layout,
      package_id,
      generated,
      previous_output_hash,
      lock,
    })
  }
}

fn check_source_root(source_root: &Path) -> Result<PathBuf, ConfigureError> {
  if !source_root.exists() {
    return Err(ConfigureError::SourceMissing(source_root.to_path_buf()));
  }
  if !source_root.is_dir() {
    return Err(ConfigureError::NotADirectory(source_root.to_path_buf()));
  }
  let source_dir = dunce::canonicalize(source_root).map_err(|source| ConfigureError::Io {
    path: source_root.to_path_buf(),
    source,
  })?;
  if !source_dir.join(BUILD_DESCRIPTION_FILENAME).is_file() {
    return Err(ConfigureError::MissingBuildDescription {
      dir: source_dir,
      file: BUILD_DESCRIPTION_FILENAME,
    });
  }
  Ok(source_dir)
}

/// A configured build tree, locked for this attempt.
pub struct Configured<'a> {
  descriptor: &'a Descriptor,
  tool: &'a dyn BuildTool,
  source_dir: PathBuf,
  layout: ContextLayout,
  package_id: ObjectHash,
  generated: Vec<GeneratedFile>,
  previous_output_hash: Option<String>,
  lock: ContextLock,
}

impl<'a> Configured<'a> {
  pub fn state(&self) -> BuildState {
    BuildState::Configured
  }

  pub fn layout(&self) -> &ContextLayout {
    &self.layout
  }

  pub fn package_id(&self) -> &ObjectHash {
    &self.package_id
  }

  pub fn source_dir(&self) -> &Path {
    &self.source_dir
  }

  pub fn generated(&self) -> &[GeneratedFile] {
    &self.generated
  }

  /// Build `target`. For [`INSTALL_TARGET`] the staged libraries are
  /// verified and the package folder is sealed with a completion marker.
  pub async fn build(self, target: &str) -> Result<Built<'a>, BuildError> {
    if target.trim().is_empty() {
      return Err(BuildError::EmptyTarget);
    }
    let descriptor = self.descriptor;

    let request = BuildRequest {
      build_dir: &self.layout.build_dir,
      target,
      build_type: descriptor.settings.build_type,
    };
    self.tool.build(&request).await.map_err(|source| BuildError::Tool {
      target: target.to_string(),
      source,
    })?;

    let mut output_hash = None;
    let mut reproducible = None;
    if target == INSTALL_TARGET {
      self.verify_staged()?;

      let hash = hash_directory(&self.layout.package_dir, &[PACKAGE_COMPLETE_MARKER])?;
      if let Some(previous) = &self.previous_output_hash {
        let same = *previous == hash.0;
        if !same {
          warn!(
            package = %descriptor.reference(),
            previous = %previous,
            current = %hash,
            "staged package differs from the previous build of the same settings"
          );
        }
        reproducible = Some(same);
      }

      let marker = PackageMarker::new(
        descriptor.reference(),
        self.package_id.0.clone(),
        descriptor.settings,
        descriptor.options,
        descriptor.recipe.libs.clone(),
        hash.0.clone(),
      );
      write_marker(&self.layout.marker_path(), &marker).map_err(BuildError::Marker)?;
      output_hash = Some(hash);
    }

    info!(package = %descriptor.reference(), target = %target, "built");

    Ok(Built {
      descriptor,
      layout: self.layout,
      package_id: self.package_id,
      target: target.to_string(),
      output_hash,
      reproducible,
      _lock: self.lock,
    })
  }

  fn verify_staged(&self) -> Result<(), BuildError> {
    let linkage = self.descriptor.options.linkage();
    for lib in &self.descriptor.recipe.libs {
      let path = self
        .layout
        .lib_dir()
        .join(library_filename(lib, &self.descriptor.settings, linkage));
      if !path.is_file() {
        return Err(BuildError::MissingArtifact { lib: lib.clone(), path });
      }
      debug!(lib = %lib, path = %path.display(), "verified staged library");
    }
    Ok(())
  }
}

/// A successful build. Holds the context lock until dropped.
pub struct Built<'a> {
  descriptor: &'a Descriptor,
  layout: ContextLayout,
  package_id: ObjectHash,
  target: String,
  output_hash: Option<ContentHash>,
  reproducible: Option<bool>,
  _lock: ContextLock,
}

impl Built<'_> {
  pub fn state(&self) -> BuildState {
    BuildState::Built
  }

  pub fn layout(&self) -> &ContextLayout {
    &self.layout
  }

  pub fn package_id(&self) -> &ObjectHash {
    &self.package_id
  }

  pub fn target(&self) -> &str {
    &self.target
  }

  /// Hash of the staged package folder; set for `install` builds only.
  pub fn output_hash(&self) -> Option<&ContentHash> {
    self.output_hash.as_ref()
  }

  /// Whether the staged folder matched the previous build of these exact
  /// settings. None when there was no previous build to compare against.
  pub fn reproducible(&self) -> Option<bool> {
    self.reproducible
  }

  /// The logical libraries consumers link against, in link order.
  pub fn package_info(&self) -> PackageInfo {
    PackageInfo {
      libs: self.descriptor.recipe.libs.clone(),
    }
  }
}

/// Summary of a completed or failed build attempt.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
  pub reference: String,
  pub package_id: Option<String>,
  pub settings: Settings,
  pub options: Options,
  pub state: BuildState,
  pub package_dir: Option<PathBuf>,
  pub libs: Vec<String>,
  pub output_hash: Option<String>,
  pub reproducible: Option<bool>,
}

/// Drive a context through configure, build and package info.
///
/// On failure the error is returned unchanged; callers that want a
/// [`BuildReport`] for the failed attempt build one with [`failed_report`].
pub async fn build_package(
  ctx: BuildContext<'_>,
  source_root: &Path,
  target: &str,
) -> Result<BuildReport, DescriptorError> {
  let descriptor = ctx.descriptor;
  let reference = descriptor.reference();
  debug!(package = %reference, state = %ctx.state(), "starting build attempt");

  let configured = ctx.configure(source_root).await.inspect_err(|e| {
    warn!(package = %reference, state = %BuildState::Failed, error = %e, "configure failed");
  })?;
  debug!(package = %reference, state = %configured.state(), "transition");

  let built = configured.build(target).await.inspect_err(|e| {
    warn!(package = %reference, state = %BuildState::Failed, error = %e, "build failed");
  })?;
  debug!(package = %reference, state = %built.state(), "transition");

  let info = built.package_info();
  info!(package = %reference, state = %BuildState::Packaged, libs = ?info.libs, "packaged");

  Ok(BuildReport {
    reference,
    package_id: Some(built.package_id().0.clone()),
    settings: descriptor.settings,
    options: descriptor.options,
    state: BuildState::Packaged,
    package_dir: Some(built.layout().package_dir.clone()),
    libs: info.libs,
    output_hash: built.output_hash().map(|h| h.0.clone()),
    reproducible: built.reproducible(),
  })
}

/// Report for an attempt that ended in `Failed`. No libraries are listed.
pub fn failed_report(descriptor: &Descriptor) -> BuildReport {
  BuildReport {
    reference: descriptor.reference(),
    package_id: descriptor.package_id().ok().map(|id| id.0),
    settings: descriptor.settings,
    options: descriptor.options,
    state: BuildState::Failed,
    package_dir: None,
    libs: Vec::new(),
    output_hash: None,
    reproducible: None,
  }
}
