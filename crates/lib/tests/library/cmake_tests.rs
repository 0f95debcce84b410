//! The descriptor driving the real `CMake` tool against a stand-in cmake
//! executable.

#![cfg(unix)]

use vispkg_lib::cmake::CMake;
use vispkg_lib::consts::INSTALL_TARGET;
use vispkg_lib::descriptor::{BuildContext, BuildError, BuildState, Descriptor, build_package};
use vispkg_lib::generators::{CMAKE_BUILDINFO_FILENAME, JSON_BUILDINFO_FILENAME};
use vispkg_lib::options::Options;
use vispkg_lib::package::installed_package;
use vispkg_lib::settings::Settings;

use super::common::{Project, recorded_args};

fn host_descriptor(project: &Project, overrides: &[&str], options: Options) -> Descriptor {
  let settings = Settings::host().unwrap().with_overrides(overrides).unwrap();
  Descriptor::new(project.recipe(), settings, options)
}

#[tokio::test]
async fn configure_passes_context_to_cmake() {
  let project = Project::new();
  let cmake = CMake::new(&project.cmake).with_jobs(2);
  let desc = host_descriptor(&project, &["build_type=RelWithDebInfo"], Options::default());

  let configured = BuildContext::new(&desc, &cmake, &project.workspace)
    .configure(&project.source)
    .await
    .unwrap();

  let layout = configured.layout().clone();
  let args = recorded_args(&layout.build_dir, "args");
  assert_eq!(args[0], "-S");
  assert_eq!(args[2], "-B");
  assert!(args.contains(&"-DCMAKE_BUILD_TYPE=RelWithDebInfo".to_string()));
  assert!(args.contains(&format!("-DCMAKE_INSTALL_PREFIX={}", layout.package_dir.display())));
  assert!(args.contains(&format!(
    "-DCMAKE_PROJECT_INCLUDE={}",
    layout.build_dir.join(CMAKE_BUILDINFO_FILENAME).display()
  )));
  assert!(layout.build_dir.join(JSON_BUILDINFO_FILENAME).is_file());

  let built = configured.build(INSTALL_TARGET).await.unwrap();
  let build_args = recorded_args(&built.layout().build_dir, "build_args");
  assert_eq!(
    build_args,
    vec![
      "--build".to_string(),
      built.layout().build_dir.display().to_string(),
      "--target".to_string(),
      "install".to_string(),
      "--config".to_string(),
      "RelWithDebInfo".to_string(),
      "--parallel".to_string(),
      "2".to_string(),
    ]
  );
}

#[tokio::test]
async fn install_build_seals_package() {
  let project = Project::new();
  let cmake = CMake::new(&project.cmake);
  let desc = host_descriptor(&project, &[], Options::default());

  let report = build_package(
    BuildContext::new(&desc, &cmake, &project.workspace),
    &project.source,
    INSTALL_TARGET,
  )
  .await
  .unwrap();

  assert_eq!(report.state, BuildState::Packaged);
  assert_eq!(report.libs, vec!["visMath".to_string()]);

  let marker = installed_package(&desc.layout(&project.workspace).unwrap()).unwrap();
  assert_eq!(marker.package_info().libs, vec!["visMath".to_string()]);
  assert_eq!(marker.settings, *desc.settings());
  assert_eq!(Some(marker.output_hash), report.output_hash);
}

#[tokio::test]
#[cfg(target_os = "linux")]
async fn static_and_shared_build_concurrently() {
  let project = Project::new();
  let cmake = CMake::new(&project.cmake);
  let static_desc = host_descriptor(&project, &[], Options { shared: false });
  let shared_desc = host_descriptor(&project, &[], Options { shared: true });

  let (a, b) = tokio::join!(
    build_package(
      BuildContext::new(&static_desc, &cmake, &project.workspace),
      &project.source,
      INSTALL_TARGET
    ),
    build_package(
      BuildContext::new(&shared_desc, &cmake, &project.workspace),
      &project.source,
      INSTALL_TARGET
    ),
  );
  let (a, b) = (a.unwrap(), b.unwrap());

  assert!(a.package_dir.unwrap().join("lib/libvisMath.a").is_file());
  assert!(b.package_dir.unwrap().join("lib/libvisMath.so").is_file());
}

#[tokio::test]
async fn failing_build_surfaces_tool_output() {
  let project = Project::new();
  let cmake = CMake::new(&project.cmake);
  let desc = host_descriptor(&project, &[], Options::default());

  let configured = BuildContext::new(&desc, &cmake, &project.workspace)
    .configure(&project.source)
    .await
    .unwrap();
  std::fs::write(configured.layout().build_dir.join("fail_build"), "").unwrap();

  match configured.build(INSTALL_TARGET).await {
    Err(BuildError::Tool { target, source }) => {
      assert_eq!(target, "install");
      assert!(source.to_string().contains("undefined symbol"));
    }
    Err(other) => panic!("expected a tool error, got {other}"),
    Ok(_) => panic!("expected the build to fail"),
  }
  assert!(installed_package(&desc.layout(&project.workspace).unwrap()).is_err());
}
