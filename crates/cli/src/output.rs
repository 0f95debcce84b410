//! Terminal output for vispkg commands.
//!
//! Human output goes through the `print_*` helpers (status lines with a
//! colored marker, indented `label: value` stats). `--format json` output
//! goes through [`print_json`] and nothing else is written to stdout.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

/// Hash prefix shown in text output; JSON output keeps the full hash.
const SHORT_HASH_LEN: usize = 12;

pub fn short_hash(hash: &str) -> &str {
  hash.get(..SHORT_HASH_LEN).unwrap_or(hash)
}

/// Wall time rounded to milliseconds, e.g. `1s 500ms`.
pub fn elapsed(duration: Duration) -> String {
  let millis = Duration::from_millis(duration.as_millis() as u64);
  humantime::format_duration(millis).to_string()
}

pub fn print_success(message: &str) {
  println!("{} {}", "✓".if_supports_color(Stream::Stdout, |s| s.green()), message);
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    "✗".if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    "⚠".if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

/// A `name/version` title line.
pub fn print_heading(reference: &str) {
  println!("{}", reference.if_supports_color(Stream::Stdout, |s| s.bold()));
}

pub fn print_stat(label: &str, value: &str) {
  println!("  {}: {}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
