use anyhow::Result;
use serde::Serialize;

use vispkg_lib::config::DriverConfig;
use vispkg_lib::settings::{Host, Settings};

use crate::output::{OutputFormat, print_json, print_stat};

#[derive(Debug, Serialize)]
struct InfoOutput {
  version: &'static str,
  host: Option<String>,
  default_settings: Option<Settings>,
  workspace: String,
  cmake: String,
  cmake_generator: Option<String>,
  jobs: Option<usize>,
}

pub fn cmd_info(config: &DriverConfig, format: OutputFormat) -> Result<()> {
  let host = Host::current().ok();
  let out = InfoOutput {
    version: env!("CARGO_PKG_VERSION"),
    host: host.map(|h| h.triple()),
    default_settings: host.map(Settings::for_host),
    workspace: config.workspace.display().to_string(),
    cmake: config.cmake.display().to_string(),
    cmake_generator: config.cmake_generator.clone(),
    jobs: config.jobs,
  };

  if format.is_json() {
    return print_json(&out);
  }

  println!("vispkg {}", out.version);
  match (&out.host, &out.default_settings) {
    (Some(triple), Some(settings)) => {
      print_stat("Platform", triple);
      print_stat("Default settings", &settings.to_string());
    }
    _ => print_stat("Platform", "unsupported"),
  }
  print_stat("Workspace", &out.workspace);
  print_stat("CMake", &out.cmake);
  print_stat("Generator", out.cmake_generator.as_deref().unwrap_or("default"));
  print_stat(
    "Jobs",
    &out.jobs.map(|j| j.to_string()).unwrap_or_else(|| "default".to_string()),
  );
  Ok(())
}
