//! CLI schema and config merging for the `locus-check` binary.

use std::path::PathBuf;

use clap::Parser;
use locus_verify::compile::ScanReport;
use locus_verify::config::CONFIG_FILE;
use locus_verify::{Config, UnknownPolicy};

/// Sources scanned when no path is given.
const DEFAULT_PATH: &str = "src";

#[derive(Parser, Debug)]
#[command(name = "locus-check")]
#[command(about = "Check that types deriving NonLocalValue hold no task-graph handle")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Files or directories to scan (defaults to `src`)
	pub paths: Vec<PathBuf>,

	/// Configuration file (defaults to `locus.toml` if present)
	#[arg(long, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Number of satisfying types listed in each diagnostic
	#[arg(long, value_name = "N")]
	pub max_examples: Option<usize>,

	/// Show every intermediate requirement
	#[arg(long)]
	pub full_chain: bool,

	/// Fail on types the scan cannot see instead of deferring them
	#[arg(long)]
	pub strict: bool,

	/// Verbose logging
	#[arg(short, long)]
	pub verbose: bool,
}

impl Cli {
	pub fn paths_or_default(&self) -> Vec<PathBuf> {
		if self.paths.is_empty() {
			vec![PathBuf::from(DEFAULT_PATH)]
		} else {
			self.paths.clone()
		}
	}

	/// Loads the configuration and applies flag overrides.
	///
	/// An explicit `--config` must exist; the default file is optional.
	pub fn load_config(&self) -> locus_verify::Result<Config> {
		let mut config = match &self.config {
			Some(path) => Config::load(path)?,
			None => Config::load_or_default(CONFIG_FILE)?,
		};
		self.apply(&mut config);
		Ok(config)
	}

	/// Flags override file values.
	pub fn apply(&self, config: &mut Config) {
		if let Some(max) = self.max_examples {
			config.render.max_examples = max;
		}
		if self.full_chain {
			config.render.full_chain = true;
		}
		if self.strict {
			config.scan.unknown = UnknownPolicy::Deny;
		}
	}
}

/// One-line summary printed after all diagnostics.
pub fn summary(report: &ScanReport) -> String {
	let status = if report.is_clean() { "ok" } else { "FAILED" };
	let mut line = format!(
		"{status}: {} aggregate{} ({} field{}) in {} file{}",
		report.aggregates,
		plural(report.aggregates),
		report.obligations,
		plural(report.obligations),
		report.files,
		plural(report.files),
	);
	if !report.failures.is_empty() {
		line.push_str(&format!(", {} failed", report.failures.len()));
	}
	if !report.deferred.is_empty() {
		line.push_str(&format!(", {} deferred to the compiler", report.deferred.len()));
	}
	line
}

fn plural(n: usize) -> &'static str {
	if n == 1 { "" } else { "s" }
}

#[cfg(test)]
mod tests;
