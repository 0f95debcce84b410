//! Package ids and tree digests.
//!
//! A package id ([`ObjectHash`]) is a short SHA-256 of a serialized value and
//! names a build context on disk. A tree digest ([`ContentHash`]) covers the
//! files of an export snapshot or a staged package, so two builds with the
//! same settings can be compared.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::consts::PACKAGE_ID_LEN;

pub type HashError = serde_json::Error;

/// Truncated hash of a serialized value, short enough for directory names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectHash(pub String);

impl std::fmt::Display for ObjectHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Anything serializable can be hashed into an [`ObjectHash`]. Field order
/// is part of the hash, so map-like inputs should use ordered maps.
pub trait Hashable: Serialize {
  fn compute_hash(&self) -> Result<ObjectHash, HashError> {
    let serialized = serde_json::to_vec(self)?;
    let mut digest = hex_digest(Sha256::digest(&serialized).as_slice());
    digest.truncate(PACKAGE_ID_LEN);
    Ok(ObjectHash(digest))
  }
}

/// Full 64-character SHA-256 of a directory tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Debug, thiserror::Error)]
pub enum DirHashError {
  #[error("failed to walk {}: {message}", .root.display())]
  Walk { root: PathBuf, message: String },

  #[error("failed to read {}: {source}", .path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Digest the files, directories and symlink targets under `root`.
///
/// Timestamps and permissions are ignored. Paths use `/` on every platform.
/// Names in `exclude` are skipped at any depth, which keeps the completion
/// marker out of the digest of the package it describes.
pub fn hash_directory(root: &Path, exclude: &[&str]) -> Result<ContentHash, DirHashError> {
  let walker = WalkDir::new(root)
    .min_depth(1)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|e| e.file_name().to_str().is_none_or(|name| !exclude.contains(&name)));

  let mut lines = Vec::new();
  for entry in walker {
    let entry = entry.map_err(|e| DirHashError::Walk {
      root: root.to_path_buf(),
      message: e.to_string(),
    })?;
    let path = entry.path();
    let rel = path
      .strip_prefix(root)
      .unwrap_or(path)
      .to_string_lossy()
      .replace('\\', "/");

    let read_err = |source| DirHashError::Read {
      path: path.to_path_buf(),
      source,
    };
    let file_type = entry.file_type();
    if file_type.is_file() {
      lines.push(format!("F:{}:{}", rel, file_digest(path).map_err(read_err)?));
    } else if file_type.is_dir() {
      lines.push(format!("D:{}", rel));
    } else if file_type.is_symlink() {
      let target = fs::read_link(path).map_err(read_err)?;
      lines.push(format!("L:{}:{}", rel, target.to_string_lossy().replace('\\', "/")));
    }
  }
  // sort_by_file_name orders siblings only; sort whole paths for a stable digest
  lines.sort();

  let mut hasher = Sha256::new();
  for line in &lines {
    hasher.update(line.as_bytes());
    hasher.update(b"\n");
  }
  Ok(ContentHash(hex_digest(hasher.finalize().as_slice())))
}

fn file_digest(path: &Path) -> io::Result<String> {
  let mut file = fs::File::open(path)?;
  let mut hasher = Sha256::new();
  io::copy(&mut file, &mut hasher)?;
  Ok(hex_digest(hasher.finalize().as_slice()))
}

fn hex_digest(bytes: &[u8]) -> String {
  bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
