use super::*;
use crate::registry::Entry;

#[test]
fn empty_input_is_default() {
	let config = Config::parse("").unwrap();
	assert_eq!(config, Config::default());
	assert_eq!(config.render.max_examples, 8);
	assert!(!config.render.full_chain);
	assert_eq!(config.scan.unknown, UnknownPolicy::Defer);
}

#[test]
fn full_config() {
	let config = Config::parse(
		r#"
		[registry]
		non_local = ["Uuid"]
		local = ["RawHandle"]

		[render]
		max_examples = 3
		full_chain = true

		[scan]
		unknown = "deny"
		"#,
	)
	.unwrap();

	assert_eq!(config.registry.non_local, ["Uuid"]);
	assert_eq!(config.registry.local, ["RawHandle"]);
	assert_eq!(config.render.max_examples, 3);
	assert!(config.render.full_chain);
	assert_eq!(config.scan.unknown, UnknownPolicy::Deny);

	let registry = config.registry().unwrap();
	assert_eq!(registry.lookup("Uuid"), Some(Entry::Granted));
	assert_eq!(registry.lookup("RawHandle"), Some(Entry::Denied));
}

#[test]
fn partial_section_keeps_other_defaults() {
	let config = Config::parse("[render]\nfull_chain = true\n").unwrap();
	assert!(config.render.full_chain);
	assert_eq!(config.render.max_examples, 8);
}

#[test]
fn unknown_key_is_rejected() {
	let err = Config::parse("[render]\ncolour = true\n").unwrap_err();
	assert!(matches!(err, VerifyError::Config(_)));
}

#[test]
fn unknown_policy_value_is_rejected() {
	assert!(Config::parse("[scan]\nunknown = \"maybe\"\n").is_err());
}

#[test]
fn missing_file_falls_back_to_default() {
	let dir = tempfile::tempdir().unwrap();
	let config = Config::load_or_default(dir.path().join(CONFIG_FILE)).unwrap();
	assert_eq!(config, Config::default());
}

#[test]
fn load_reads_file() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join(CONFIG_FILE);
	std::fs::write(&path, "[registry]\nnon_local = [\"Url\"]\n").unwrap();
	let config = Config::load(&path).unwrap();
	assert_eq!(config.registry.non_local, ["Url"]);
}

#[test]
fn load_missing_file_is_io_error() {
	let dir = tempfile::tempdir().unwrap();
	let err = Config::load(dir.path().join("nope.toml")).unwrap_err();
	assert!(matches!(err, VerifyError::Io { .. }));
}
