//! Shared helpers for library integration tests.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use vispkg_lib::recipe::{Recipe, parse_recipe};

pub const VISMATH_RECIPE: &str = r#"
return {
  name = "visMath",
  version = "0.2",
  description = "Basic math module for the VIS physics engine.",
  settings = { "os", "compiler", "build_type", "arch" },
  default_options = { shared = false },
  generators = { "cmake", "json" },
  exports_sources = "*",
  libs = { "visMath" },
}
"#;

/// Records its arguments; on `--build <dir> --target install` stages a
/// library named after the configure-time `BUILD_SHARED_LIBS`. A
/// `fail_build` file in the build tree makes the build step fail.
const FAKE_CMAKE: &str = r#"#!/bin/sh
set -e
if [ "$1" = "--build" ]; then
  printf '%s\n' "$@" > "$2/build_args"
  if [ -f "$2/fail_build" ]; then
    echo "ld: undefined symbol: visMath::dot" >&2
    exit 1
  fi
  [ "$4" = "install" ] || exit 0
  prefix=$(cat "$2/prefix")
  if grep -q -- "-DBUILD_SHARED_LIBS=ON" "$2/args"; then name=libvisMath.so; else name=libvisMath.a; fi
  mkdir -p "$prefix/lib"
  printf 'visMath' > "$prefix/lib/$name"
  exit 0
fi
printf '%s\n' "$@" > "$4/args"
for arg in "$@"; do
  case "$arg" in
    -DCMAKE_INSTALL_PREFIX=*) printf '%s' "${arg#-DCMAKE_INSTALL_PREFIX=}" > "$4/prefix" ;;
  esac
done
"#;

pub struct Project {
  pub temp: TempDir,
  pub source: PathBuf,
  pub workspace: PathBuf,
  pub cmake: PathBuf,
}

impl Project {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("visMath");
    std::fs::create_dir_all(source.join("src")).unwrap();
    std::fs::write(
      source.join("CMakeLists.txt"),
      "cmake_minimum_required(VERSION 3.15)\nproject(visMath CXX)\nadd_library(visMath src/visMath.cpp)\ninstall(TARGETS visMath)\n",
    )
    .unwrap();
    std::fs::write(source.join("src/visMath.cpp"), "float dot() { return 0.0f; }\n").unwrap();
    std::fs::write(source.join("recipe.lua"), VISMATH_RECIPE).unwrap();

    let cmake = temp.path().join("cmake");
    std::fs::write(&cmake, FAKE_CMAKE).unwrap();
    make_executable(&cmake);

    Self {
      workspace: temp.path().join("ws"),
      temp,
      source,
      cmake,
    }
  }

  pub fn recipe(&self) -> Recipe {
    parse_recipe(VISMATH_RECIPE, "visMath").unwrap()
  }
}

/// Lines written by the fake cmake into `file` of a build tree.
pub fn recorded_args(build_dir: &Path, file: &str) -> Vec<String> {
  std::fs::read_to_string(build_dir.join(file))
    .unwrap()
    .lines()
    .map(str::to_string)
    .collect()
}

#[cfg(unix)]
fn make_executable(path: &Path) {
  use std::os::unix::fs::PermissionsExt;
  std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) {}
