use std::fs;

use locus_verify::compile::Scan;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use super::*;

fn parse(args: &[&str]) -> Cli {
	Cli::try_parse_from(std::iter::once("locus-check").chain(args.iter().copied())).unwrap()
}

#[test]
fn defaults() {
	let cli = parse(&[]);
	assert_eq!(cli.paths_or_default(), [PathBuf::from("src")]);
	assert_eq!(cli.config, None);
	assert_eq!(cli.max_examples, None);
	assert!(!cli.full_chain && !cli.strict && !cli.verbose);
}

#[test]
fn all_flags() {
	let cli = parse(&[
		"crates/a/src",
		"crates/b/src/lib.rs",
		"--config",
		"ci/locus.toml",
		"--max-examples",
		"3",
		"--full-chain",
		"--strict",
		"-v",
	]);
	assert_eq!(
		cli.paths_or_default(),
		[PathBuf::from("crates/a/src"), PathBuf::from("crates/b/src/lib.rs")]
	);
	assert_eq!(cli.config, Some(PathBuf::from("ci/locus.toml")));
	assert_eq!(cli.max_examples, Some(3));
	assert!(cli.full_chain && cli.strict && cli.verbose);
}

#[test]
fn invalid_max_examples_is_rejected() {
	let result = Cli::try_parse_from(["locus-check", "--max-examples", "many"]);
	assert!(result.is_err());
}

#[test]
fn flags_override_config_values() {
	let mut config = Config::parse("[render]\nmax_examples = 20\n[scan]\nunknown = \"defer\"\n").unwrap();
	parse(&["--max-examples", "0", "--full-chain", "--strict"]).apply(&mut config);
	assert_eq!(config.render.max_examples, 0);
	assert!(config.render.full_chain);
	assert_eq!(config.scan.unknown, UnknownPolicy::Deny);
}

#[test]
fn absent_flags_keep_config_values() {
	let mut config = Config::parse("[render]\nmax_examples = 20\nfull_chain = true\n").unwrap();
	parse(&[]).apply(&mut config);
	assert_eq!(config.render.max_examples, 20);
	assert!(config.render.full_chain);
	assert_eq!(config.scan.unknown, UnknownPolicy::Defer);
}

#[test]
fn explicit_config_is_loaded_and_must_exist() {
	let dir = TempDir::new().unwrap();
	let path = dir.path().join("custom.toml");
	fs::write(&path, "[render]\nmax_examples = 2\n").unwrap();

	let path_arg = path.to_string_lossy().into_owned();
	let config = parse(&["--config", &path_arg, "--strict"]).load_config().unwrap();
	assert_eq!(config.render.max_examples, 2);
	assert_eq!(config.scan.unknown, UnknownPolicy::Deny);

	let missing = dir.path().join("missing.toml").to_string_lossy().into_owned();
	assert!(parse(&["--config", &missing]).load_config().is_err());
}

#[test]
fn summary_line() {
	let mut scan = Scan::new();
	scan.add_source(
		std::path::Path::new("src/lib.rs"),
		"#[derive(NonLocalValue)] struct A { h: Handle<u8>, x: ext::Thing }",
	)
	.unwrap();
	let report = scan.verify(&Config::default()).unwrap();
	assert_eq!(
		summary(&report),
		"FAILED: 1 aggregate (2 fields) in 1 file, 1 failed, 1 deferred to the compiler"
	);

	let report = ScanReport::default();
	assert_eq!(summary(&report), "ok: 0 aggregates (0 fields) in 0 files");
}
