//! `locus.toml` configuration.
//!
//! ```toml
//! [registry]
//! non_local = ["Uuid", "Url"]
//! local = ["RawHandle"]
//!
//! [render]
//! max_examples = 8
//! full_chain = false
//!
//! [scan]
//! unknown = "defer"
//! ```
//!
//! Every section and key is optional. A missing file yields [`Config::default`].

use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, VerifyError};
use crate::registry::Registry;

/// Default file name looked up next to `Cargo.toml`.
pub const CONFIG_FILE: &str = "locus.toml";

/// Parsed configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Registry extensions.
	pub registry: RegistryConfig,
	/// Diagnostic rendering.
	pub render: RenderOptions,
	/// Source scanning.
	pub scan: ScanOptions,
}

/// Names added to the built-in registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
	/// Opaque types certified non-local by hand.
	pub non_local: Vec<String>,
	/// Additional handle-like types that are never non-local.
	pub local: Vec<String>,
}

/// Controls how failures are rendered.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderOptions {
	/// How many satisfying types to list before `and N others`. Zero hides the list.
	pub max_examples: usize,
	/// Print every intermediate requirement instead of collapsing them.
	pub full_chain: bool,
}

impl Default for RenderOptions {
	fn default() -> Self {
		Self {
			max_examples: 8,
			full_chain: false,
		}
	}
}

/// Controls the source scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanOptions {
	/// What to do with named types neither the registry nor the scan knows.
	pub unknown: UnknownPolicy,
}

/// Treatment of types the explicit resolver cannot see into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownPolicy {
	/// Leave the type to the compiler's trait solver, which still fails closed.
	#[default]
	Defer,
	/// Fail the obligation.
	Deny,
}

impl Config {
	/// Parse a TOML string into a [`Config`].
	pub fn parse(input: &str) -> Result<Self> {
		Ok(toml::from_str(input)?)
	}

	/// Load configuration from a file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|error| VerifyError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::parse(&content)
	}

	/// Load configuration from a file, falling back to defaults when it does not exist.
	pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		if path.exists() {
			Self::load(path)
		} else {
			Ok(Self::default())
		}
	}

	/// Builds the registry described by this configuration.
	pub fn registry(&self) -> Result<Registry> {
		Registry::with_config(&self.registry)
	}
}

#[cfg(test)]
mod tests;
