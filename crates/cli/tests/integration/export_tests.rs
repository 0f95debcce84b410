//! Integration tests for `vispkg export`.

use predicates::prelude::*;
use serde_json::Value;

use super::common::TestEnv;

fn export_json(env: &TestEnv, extra: &[&str]) -> Value {
  let output = env
    .cmd()
    .arg("export")
    .arg(env.recipe())
    .args(extra)
    .args(["--format", "json"])
    .output()
    .unwrap();
  assert!(
    output.status.success(),
    "export failed: {}",
    String::from_utf8_lossy(&output.stderr)
  );
  serde_json::from_slice(&output.stdout).unwrap()
}

fn files(report: &Value) -> Vec<String> {
  report["files"]
    .as_array()
    .unwrap()
    .iter()
    .map(|f| f.as_str().unwrap().to_string())
    .collect()
}

#[test]
fn export_snapshots_into_workspace() {
  let env = TestEnv::new();

  env
    .cmd()
    .arg("export")
    .arg(env.recipe())
    .assert()
    .success()
    .stdout(predicate::str::contains("Exported 4 file(s) of visMath/0.2"));

  let dest = env.workspace.join("visMath").join("0.2").join("export");
  assert!(dest.join("CMakeLists.txt").is_file());
  assert!(dest.join("src").join("visMath.cpp").is_file());
  assert!(dest.join("include").join("visMath").join("vec3.h").is_file());
}

#[test]
fn export_leaves_vcs_metadata_and_build_trees_behind() {
  let env = TestEnv::new();
  env.write_file(".git/HEAD", "ref: refs/heads/main\n");
  env.write_file(".svn/entries", "12\n");
  env.write_file("build/CMakeCache.txt", "CMAKE_BUILD_TYPE:STRING=Release\n");
  env.write_file("build/libvisMath.a", "stale");

  let report = export_json(&env, &[]);

  assert_eq!(
    files(&report),
    vec![
      "CMakeLists.txt",
      "include/visMath/vec3.h",
      "recipe.lua",
      "src/visMath.cpp"
    ]
  );
}

#[test]
fn export_honors_recipe_excludes() {
  let env = TestEnv::new();
  let recipe = std::fs::read_to_string(env.recipe())
    .unwrap()
    .replace("exports_sources = \"*\",", "exports_sources = \"*\",\n  exports_excludes = \"*.md\",");
  env.write_file("recipe.lua", &recipe);
  env.write_file("README.md", "# visMath\n");
  env.write_file("docs/design.md", "notes\n");

  let report = export_json(&env, &[]);

  assert!(files(&report).iter().all(|f| !f.ends_with(".md")));
}

#[test]
fn export_to_custom_destination() {
  let env = TestEnv::new();
  let dest = env.temp.path().join("snapshot");

  let report = export_json(&env, &["--dest", dest.to_str().unwrap()]);

  assert_eq!(report["dest"], dest.to_str().unwrap());
  assert!(dest.join("recipe.lua").is_file());
  assert_eq!(report["source_hash"].as_str().unwrap().len(), 64);
}

#[test]
fn export_onto_project_directory_is_refused() {
  let env = TestEnv::new();

  env
    .cmd()
    .arg("export")
    .arg(env.recipe())
    .arg("--dest")
    .arg(&env.project)
    .assert()
    .failure()
    .stderr(predicate::str::contains("refusing to replace it"));

  assert!(env.recipe().is_file());
  assert!(env.project.join("CMakeLists.txt").is_file());
}

#[test]
fn export_is_stable_across_runs() {
  let env = TestEnv::new();

  let first = export_json(&env, &[]);
  let second = export_json(&env, &[]);

  assert_eq!(first["source_hash"], second["source_hash"]);
}

#[test]
#[cfg(unix)]
fn exported_snapshot_builds() {
  let env = TestEnv::new();
  env.write_file(".git/HEAD", "ref: refs/heads/main\n");
  let report = export_json(&env, &[]);
  let exported_recipe = std::path::Path::new(report["dest"].as_str().unwrap()).join("recipe.lua");

  env
    .cmd()
    .arg("build")
    .arg(&exported_recipe)
    .arg("--cmake")
    .arg(&env.cmake)
    .assert()
    .success()
    .stdout(predicate::str::contains("Packaged visMath/0.2"));
}
