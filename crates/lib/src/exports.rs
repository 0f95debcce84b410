//! Source snapshots.
//!
//! Exporting copies the files selected by a recipe's `exports_sources`
//! patterns into a fresh snapshot directory. Version-control metadata and
//! CMake build trees are never part of a snapshot, whatever the patterns say.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::consts::CMAKE_CACHE_FILENAME;
use crate::recipe::Recipe;
use crate::util::hash::{ContentHash, DirHashError, hash_directory};

/// Directory names skipped at any depth.
pub const ALWAYS_EXCLUDED: &[&str] = &[".git", ".hg", ".svn"];

/// `*` crosses directory separators, so `"*"` selects the whole tree.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
  case_sensitive: true,
  require_literal_separator: false,
  require_literal_leading_dot: false,
};

#[derive(Debug, Error)]
pub enum ExportError {
  #[error("source directory not found: {0}")]
  SourceMissing(PathBuf),

  #[error("export destination {} contains the source tree {}; refusing to replace it", .dest.display(), .source_root.display())]
  DestinationOverlapsSource { dest: PathBuf, source_root: PathBuf },

  #[error("bad export pattern '{pattern}': {message}")]
  Pattern { pattern: String, message: String },

  #[error("failed to walk {path}: {message}")]
  Walk { path: PathBuf, message: String },

  #[error("failed to copy {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to hash snapshot: {0}")]
  Hash(#[from] DirHashError),
}

/// Result of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
  pub dest: PathBuf,
  /// Relative paths of exported files, sorted.
  pub files: Vec<String>,
  pub source_hash: ContentHash,
}

/// Snapshot `source_root` into `dest` according to the recipe's patterns.
///
/// `dest` is emptied first, so the snapshot never carries stale files. A
/// `dest` that is `source_root` or one of its ancestors is refused untouched.
pub fn export_sources(source_root: &Path, recipe: &Recipe, dest: &Path) -> Result<ExportSummary, ExportError> {
  if !source_root.is_dir() {
    return Err(ExportError::SourceMissing(source_root.to_path_buf()));
  }

  let includes = compile(&recipe.exports_sources)?;
  let excludes = compile(&recipe.exports_excludes)?;

  let io_err = |path: &Path| {
    let path = path.to_path_buf();
    move |source| ExportError::Io { path, source }
  };

  let source_canonical = dunce::canonicalize(source_root).map_err(io_err(source_root))?;
  if dest.exists() {
    let dest_existing = dunce::canonicalize(dest).map_err(io_err(dest))?;
    if source_canonical.starts_with(&dest_existing) {
      return Err(ExportError::DestinationOverlapsSource {
        dest: dest.to_path_buf(),
        source_root: source_root.to_path_buf(),
      });
    }
    fs::remove_dir_all(dest).map_err(io_err(dest))?;
  }
  fs::create_dir_all(dest).map_err(io_err(dest))?;

  // The snapshot may live inside the tree it snapshots
  let dest_canonical = dunce::canonicalize(dest).map_err(io_err(dest))?;

  let walker = WalkDir::new(source_root)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|entry| keep_entry(entry, &dest_canonical));

  let mut files = Vec::new();
  for entry in walker {
    let entry = entry.map_err(|e| ExportError::Walk {
      path: source_root.to_path_buf(),
      message: e.to_string(),
    })?;
    if !entry.file_type().is_file() {
      continue;
    }

    let rel = entry.path().strip_prefix(source_root).unwrap_or(entry.path());
    let rel_str = rel.to_string_lossy().replace('\\', "/");

    let included = includes.iter().any(|p| p.matches_with(&rel_str, MATCH_OPTIONS));
    let excluded = excludes.iter().any(|p| p.matches_with(&rel_str, MATCH_OPTIONS));
    if !included || excluded {
      continue;
    }

    let target = dest.join(rel);
    if let Some(parent) = target.parent() {
      fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    fs::copy(entry.path(), &target).map_err(io_err(entry.path()))?;
    debug!(file = %rel_str, "exported");
    files.push(rel_str);
  }

  let source_hash = hash_directory(dest, &[])?;
  info!(files = files.len(), dest = %dest.display(), hash = %source_hash, "exported sources");

  Ok(ExportSummary {
    dest: dest.to_path_buf(),
    files,
    source_hash,
  })
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>, ExportError> {
  patterns
    .iter()
    .map(|pattern| {
      Pattern::new(pattern).map_err(|e| ExportError::Pattern {
        pattern: pattern.clone(),
        message: e.to_string(),
      })
    })
    .collect()
}

fn keep_entry(entry: &DirEntry, dest: &Path) -> bool {
  if entry.depth() == 0 {
    return true;
  }
  let name = entry.file_name().to_string_lossy();
  if ALWAYS_EXCLUDED.contains(&name.as_ref()) {
    return false;
  }
  if entry.file_type().is_dir() {
    if entry.path().join(CMAKE_CACHE_FILENAME).exists() {
      return false;
    }
    if dunce::canonicalize(entry.path()).is_ok_and(|p| p == dest) {
      return false;
    }
  }
  true
}
