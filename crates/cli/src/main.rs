//! `locus-check` binary.
//!
//! Scans Rust sources for aggregates deriving `NonLocalValue`, resolves every
//! field obligation and prints a diagnostic for each failure. Exits with 1 if
//! any obligation failed and 2 if the scan itself could not run.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use locus_verify::compile::scan_paths;
use locus_verify::render::render;
use tracing::{debug, info};

mod cli;

use cli::{Cli, summary};

fn main() -> ExitCode {
	let cli = Cli::parse();

	setup_tracing(cli.verbose);

	match run(&cli) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:#}");
			ExitCode::from(2)
		}
	}
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
	let config = cli.load_config().context("failed to load configuration")?;
	let paths = cli.paths_or_default();
	info!(paths = ?paths, "scanning");

	let report = scan_paths(&paths, &config)?;
	let registry = config.registry()?;

	for deferred in &report.deferred {
		debug!(
			field = %deferred.path,
			ty = %deferred.ty,
			location = %deferred.location,
			"deferred to the trait solver"
		);
	}

	let mut out = io::stdout().lock();
	for failure in &report.failures {
		writeln!(out, "{}\n", render(failure, &registry, &config.render))?;
	}
	writeln!(out, "{}", summary(&report))?;

	Ok(if report.is_clean() {
		ExitCode::SUCCESS
	} else {
		ExitCode::FAILURE
	})
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::prelude::*;

	let filter = EnvFilter::try_from_env("LOCUS_LOG").unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("locus_verify=debug,locus_check=debug,info")
		} else {
			EnvFilter::new("warn")
		}
	});

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::fmt::layer()
				.with_writer(io::stderr)
				.with_target(false),
		)
		.with(filter)
		.init();
}
