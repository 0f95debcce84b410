//! Integration tests for `vispkg build` and `vispkg package-info`.
//!
//! The build tool is a shell script standing in for cmake, so these only
//! run on unix hosts.

#![cfg(unix)]

use std::path::PathBuf;

use predicates::prelude::*;
use serde_json::Value;

use super::common::TestEnv;

fn build_json(env: &TestEnv, extra: &[&str]) -> Value {
  let output = env.build_cmd().args(extra).args(["--format", "json"]).output().unwrap();
  assert!(
    output.status.success(),
    "build failed: {}",
    String::from_utf8_lossy(&output.stderr)
  );
  serde_json::from_slice(&output.stdout).unwrap()
}

fn package_dir(report: &Value) -> PathBuf {
  PathBuf::from(report["package_dir"].as_str().unwrap())
}

fn configure_args(report: &Value) -> String {
  let args = package_dir(report).parent().unwrap().join("build").join("args");
  std::fs::read_to_string(args).unwrap()
}

#[test]
fn static_build_packages_vismath_archive() {
  let env = TestEnv::new();

  env
    .build_cmd()
    .assert()
    .success()
    .stdout(predicate::str::contains("Packaged visMath/0.2 (shared=False)"))
    .stdout(predicate::str::contains("Libs: visMath"));

  env
    .cmd()
    .arg("package-info")
    .arg(env.recipe())
    .assert()
    .success()
    .stdout("visMath\n");
}

#[test]
fn json_report_points_at_staged_package() {
  let env = TestEnv::new();

  let report = build_json(&env, &[]);

  assert_eq!(report["state"], "packaged");
  assert_eq!(report["libs"], serde_json::json!(["visMath"]));
  assert_eq!(report["options"]["shared"], false);
  let dir = package_dir(&report);
  assert!(dir.starts_with(&env.workspace));
  assert!(dir.join("lib").join("libvisMath.a").is_file());
  assert!(dir.join(".vispkg-complete").is_file());
}

#[test]
fn configure_receives_settings_and_install_prefix() {
  let env = TestEnv::new();

  let report = build_json(&env, &["-s", "build_type=Debug"]);
  let args = configure_args(&report);

  assert!(args.contains("-DCMAKE_BUILD_TYPE=Debug"));
  assert!(args.contains("-DBUILD_SHARED_LIBS=OFF"));
  assert!(args.contains(&format!("-DCMAKE_INSTALL_PREFIX={}", package_dir(&report).display())));
  assert!(args.contains("vispkg_buildinfo.cmake"));
}

#[test]
#[cfg(target_os = "linux")]
fn static_and_shared_land_in_separate_folders() {
  let env = TestEnv::new();

  let static_report = build_json(&env, &[]);
  let shared_report = build_json(&env, &["-o", "shared=True"]);

  assert_ne!(static_report["package_id"], shared_report["package_id"]);
  assert!(package_dir(&static_report).join("lib/libvisMath.a").is_file());
  assert!(package_dir(&shared_report).join("lib/libvisMath.so").is_file());

  env
    .cmd()
    .arg("package-info")
    .arg(env.recipe())
    .args(["-o", "shared=True", "--format", "json"])
    .assert()
    .success()
    .stdout(predicate::str::contains(shared_report["package_id"].as_str().unwrap()));
}

#[test]
fn debug_and_release_land_in_separate_folders() {
  let env = TestEnv::new();

  let release = build_json(&env, &[]);
  let debug = build_json(&env, &["-s", "build_type=Debug"]);

  assert_ne!(package_dir(&release), package_dir(&debug));
}

#[test]
fn rebuild_with_same_settings_is_reproducible() {
  let env = TestEnv::new();

  let first = build_json(&env, &[]);
  let second = build_json(&env, &[]);

  assert_eq!(first["package_dir"], second["package_dir"]);
  assert_eq!(first["output_hash"], second["output_hash"]);
  assert_eq!(second["reproducible"], true);
}

#[test]
fn missing_build_description_fails_before_cmake_runs() {
  let env = TestEnv::new();
  std::fs::remove_file(env.project.join("CMakeLists.txt")).unwrap();

  env
    .build_cmd()
    .assert()
    .failure()
    .stderr(predicate::str::contains("configuration failed"))
    .stderr(predicate::str::contains("CMakeLists.txt"));

  env
    .cmd()
    .arg("package-info")
    .arg(env.recipe())
    .assert()
    .failure();
}

#[test]
fn compile_error_is_reported_and_nothing_is_packaged() {
  let env = TestEnv::new();

  env
    .build_cmd()
    .env("FAKE_CMAKE_FAIL_BUILD", "1")
    .assert()
    .failure()
    .stderr(predicate::str::contains("build failed"))
    .stderr(predicate::str::contains("expected ';'"));

  env
    .cmd()
    .arg("package-info")
    .arg(env.recipe())
    .assert()
    .failure()
    .stderr(predicate::str::contains("is not packaged"));
}

#[test]
fn failed_build_in_json_mode_prints_failed_state() {
  let env = TestEnv::new();

  let output = env
    .build_cmd()
    .env("FAKE_CMAKE_FAIL_BUILD", "1")
    .args(["--format", "json"])
    .output()
    .unwrap();

  assert!(!output.status.success());
  let report: Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(report["state"], "failed");
  assert_eq!(report["libs"], serde_json::json!([]));
}

#[test]
fn cross_os_settings_are_rejected() {
  let env = TestEnv::new();

  env
    .build_cmd()
    .args(["-s", "os=windows", "-s", "compiler=msvc"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("not supported"));
}

#[test]
fn missing_cmake_is_a_configuration_error() {
  let env = TestEnv::new();

  env
    .cmd()
    .arg("build")
    .arg(env.recipe())
    .arg("--cmake")
    .arg(env.temp.path().join("no-such-cmake"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to start"));
}
