//! Error types for verification and configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading configuration or scanning sources.
#[derive(Debug, Error)]
pub enum VerifyError {
	/// Error reading a source or configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// A source file is not valid Rust.
	#[error("failed to parse {path}: {error}")]
	Parse {
		/// Path to the file that failed to parse.
		path: PathBuf,
		/// The underlying parse error.
		error: syn::Error,
	},

	/// Error parsing `locus.toml`.
	#[error("config parse error: {0}")]
	Config(#[from] toml::de::Error),

	/// Configuration tried to certify a handle type.
	#[error("`{0}` is a task-graph handle and cannot be declared non-local")]
	GrantsHandle(String),

	/// Configuration tried to certify a built-in container outright.
	#[error("`{0}` is a built-in container; its non-locality follows its type arguments")]
	GrantsContainer(String),

	/// A name appears in both the `non_local` and `local` lists.
	#[error("`{0}` is listed as both non-local and local")]
	Conflict(String),

	/// At least one obligation failed to resolve.
	#[error("{count} non-locality obligation(s) failed")]
	Failed {
		/// Number of failed obligations.
		count: usize,
	},
}

/// Result type for verification operations.
pub type Result<T> = std::result::Result<T, VerifyError>;
