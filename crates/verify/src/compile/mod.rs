//! Build-time scanning of Rust sources.
//!
//! Gated behind the `compile` feature. A scan parses every `.rs` file under
//! the given roots, catalogs each type deriving `NonLocalValue` and each
//! hand-written `unsafe impl NonLocalValue`, then resolves every derived
//! obligation against the registry and that catalog. Because the catalog is
//! complete before resolution starts, chains follow fields across aggregates.
//!
//! From a build script:
//!
//! ```ignore
//! fn main() {
//!     let report = locus_verify::compile::BuildCtx::new().and_then(|ctx| ctx.enforce());
//!     if let Err(e) = report {
//!         panic!("{e}");
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};

use proc_macro2::Span;
use syn::punctuated::Punctuated;
use syn::{Attribute, DeriveInput, Item, ItemImpl, Token, Type, TypeParamBound, WherePredicate};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use crate::catalog::Catalog;
use crate::config::{CONFIG_FILE, Config};
use crate::error::{Result, VerifyError};
use crate::obligation::Aggregate;
use crate::render::{Location, Report, render};
use crate::resolve::{Resolution, Resolver};

/// An aggregate and the file declaring it.
#[derive(Debug, Clone)]
pub struct Site {
	pub file: PathBuf,
	pub aggregate: Aggregate,
}

/// A field type left to the compiler's trait solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deferred {
	/// Field path, e.g. `Cache.config`.
	pub path: String,
	pub location: Location,
	pub ty: String,
}

/// Result of verifying a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
	pub files: usize,
	pub aggregates: usize,
	pub obligations: usize,
	pub failures: Vec<Report>,
	pub deferred: Vec<Deferred>,
}

impl ScanReport {
	pub fn is_clean(&self) -> bool {
		self.failures.is_empty()
	}
}

/// Parsed sources awaiting verification.
#[derive(Debug, Clone, Default)]
pub struct Scan {
	files: Vec<PathBuf>,
	sites: Vec<Site>,
	catalog: Catalog,
}

impl Scan {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a file, or every `.rs` file below a directory in sorted order.
	pub fn add_path(&mut self, path: &Path) -> Result<()> {
		if path.is_dir() {
			for file in collect_files_sorted(path, "rs")? {
				self.add_file(&file)?;
			}
			Ok(())
		} else {
			self.add_file(path)
		}
	}

	pub fn add_file(&mut self, path: &Path) -> Result<()> {
		let source = std::fs::read_to_string(path).map_err(|error| VerifyError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		self.add_source(path, &source)
	}

	/// Adds already-loaded source text attributed to `path`.
	pub fn add_source(&mut self, path: &Path, source: &str) -> Result<()> {
		let file = syn::parse_file(source).map_err(|error| {
			warn!(path = %path.display(), %error, "failed to parse source file");
			VerifyError::Parse {
				path: path.to_path_buf(),
				error,
			}
		})?;
		let before = self.sites.len();
		self.collect(path, &file.items)?;
		debug!(
			path = %path.display(),
			aggregates = self.sites.len() - before,
			"scanned source file"
		);
		self.files.push(path.to_path_buf());
		Ok(())
	}

	fn collect(&mut self, path: &Path, items: &[Item]) -> Result<()> {
		for item in items {
			match item {
				Item::Struct(item) if derives_non_local(&item.attrs) => {
					self.add_aggregate(path, DeriveInput::from(item.clone()))?;
				}
				Item::Enum(item) if derives_non_local(&item.attrs) => {
					self.add_aggregate(path, DeriveInput::from(item.clone()))?;
				}
				Item::Impl(item) => {
					if let Some((name, checks_arguments)) = manual_impl(item)
						&& !self.catalog.insert_manual(name.clone(), checks_arguments)
					{
						warn!(%name, "duplicate type name in scan; keeping the first declaration");
					}
				}
				Item::Mod(module) => {
					if let Some((_, items)) = &module.content {
						self.collect(path, items)?;
					}
				}
				_ => {}
			}
		}
		Ok(())
	}

	fn add_aggregate(&mut self, path: &Path, input: DeriveInput) -> Result<()> {
		let aggregate = Aggregate::from_derive(&input).map_err(|error| VerifyError::Parse {
			path: path.to_path_buf(),
			error,
		})?;
		if !self.catalog.insert_derived(aggregate.clone()) {
			warn!(name = %aggregate.name, "duplicate type name in scan; keeping the first declaration");
		}
		self.sites.push(Site {
			file: path.to_path_buf(),
			aggregate,
		});
		Ok(())
	}

	pub fn sites(&self) -> &[Site] {
		&self.sites
	}

	pub fn catalog(&self) -> &Catalog {
		&self.catalog
	}

	/// Resolves every collected obligation.
	pub fn verify(&self, config: &Config) -> Result<ScanReport> {
		let registry = config.registry()?;
		let resolver = Resolver::new(&registry)
			.with_catalog(&self.catalog)
			.with_unknown(config.scan.unknown);

		let mut report = ScanReport {
			files: self.files.len(),
			aggregates: self.sites.len(),
			..ScanReport::default()
		};

		for site in &self.sites {
			let aggregate = &site.aggregate;
			let resolutions = resolver.resolve_aggregate(aggregate);
			for (obligation, resolution) in aggregate.obligations.iter().zip(resolutions) {
				report.obligations += 1;
				trace!(obligation = %obligation.path(), ?resolution, "resolved obligation");
				let location = location(&site.file, obligation.span);
				match resolution {
					Resolution::Certified => {}
					Resolution::Deferred(types) => {
						report.deferred.extend(
							types
								.into_iter()
								.filter(|ty| !aggregate.params.contains(ty))
								.map(|ty| Deferred {
									path: obligation.path(),
									location: location.clone(),
									ty,
								}),
						);
					}
					Resolution::Failed(failure) => {
						report
							.failures
							.push(Report::new(obligation, failure).with_location(location));
					}
				}
			}
		}

		debug!(
			files = report.files,
			aggregates = report.aggregates,
			obligations = report.obligations,
			failures = report.failures.len(),
			"verified scan"
		);
		Ok(report)
	}
}

/// Scans every path and verifies the result.
pub fn scan_paths(paths: &[PathBuf], config: &Config) -> Result<ScanReport> {
	let mut scan = Scan::new();
	for path in paths {
		scan.add_path(path)?;
	}
	scan.verify(config)
}

/// Collects all files with the given extension under `root`, sorted by path for determinism.
pub fn collect_files_sorted(root: &Path, ext: &str) -> Result<Vec<PathBuf>> {
	let mut paths = Vec::new();
	for entry in WalkDir::new(root) {
		let entry = entry.map_err(|error| VerifyError::Io {
			path: root.to_path_buf(),
			error: error.into(),
		})?;
		if entry.file_type().is_file() && entry.path().extension().is_some_and(|x| x == ext) {
			paths.push(entry.into_path());
		}
	}
	paths.sort();
	Ok(paths)
}

/// Build script entry point.
pub struct BuildCtx {
	pub manifest_dir: PathBuf,
	pub config: Config,
}

impl BuildCtx {
	/// Reads `CARGO_MANIFEST_DIR` and the `locus.toml` next to it, if any.
	pub fn new() -> Result<Self> {
		let manifest_dir = std::env::var_os("CARGO_MANIFEST_DIR")
			.map(PathBuf::from)
			.unwrap_or_else(|| PathBuf::from("."));
		Self::at(manifest_dir)
	}

	pub fn at(manifest_dir: impl Into<PathBuf>) -> Result<Self> {
		let manifest_dir = manifest_dir.into();
		let config = Config::load_or_default(manifest_dir.join(CONFIG_FILE))?;
		Ok(Self {
			manifest_dir,
			config,
		})
	}

	pub fn rerun_if_changed(&self, path: &Path) {
		println!("cargo:rerun-if-changed={}", path.display());
	}

	/// Scans `src/` and returns the report without failing.
	pub fn verify(&self) -> Result<ScanReport> {
		let src = self.manifest_dir.join("src");
		self.rerun_if_changed(&src);
		self.rerun_if_changed(&self.manifest_dir.join(CONFIG_FILE));
		scan_paths(&[src], &self.config)
	}

	/// Scans `src/`, printing each failure as a cargo warning and erroring if any occurred.
	pub fn enforce(&self) -> Result<ScanReport> {
		let report = self.verify()?;
		if report.is_clean() {
			return Ok(report);
		}
		let registry = self.config.registry()?;
		for failure in &report.failures {
			for line in render(failure, &registry, &self.config.render).lines() {
				println!("cargo:warning={line}");
			}
		}
		Err(VerifyError::Failed {
			count: report.failures.len(),
		})
	}
}

fn location(file: &Path, span: Span) -> Location {
	let start = span.start();
	Location {
		file: Some(file.to_path_buf()),
		line: start.line,
		column: start.column + 1,
	}
}

fn is_non_local_path(path: &syn::Path) -> bool {
	path.segments
		.last()
		.is_some_and(|segment| segment.ident == "NonLocalValue")
}

fn derives_non_local(attrs: &[Attribute]) -> bool {
	attrs
		.iter()
		.filter(|attr| attr.path().is_ident("derive"))
		.any(|attr| {
			attr.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)
				.is_ok_and(|paths| paths.iter().any(is_non_local_path))
		})
}

/// Returns the implementing type's name and whether the impl bounds a type parameter.
fn manual_impl(item: &ItemImpl) -> Option<(String, bool)> {
	let (_, trait_path, _) = item.trait_.as_ref()?;
	if item.unsafety.is_none() || !is_non_local_path(trait_path) {
		return None;
	}
	let Type::Path(self_ty) = &*item.self_ty else {
		return None;
	};
	let name = self_ty.path.segments.last()?.ident.to_string();

	let bounded = |bounds: &Punctuated<TypeParamBound, Token![+]>| {
		bounds.iter().any(|bound| match bound {
			TypeParamBound::Trait(bound) => is_non_local_path(&bound.path),
			_ => false,
		})
	};
	let in_params = item.generics.type_params().any(|param| bounded(&param.bounds));
	let in_where = item.generics.where_clause.as_ref().is_some_and(|clause| {
		clause.predicates.iter().any(|predicate| match predicate {
			WherePredicate::Type(predicate) => bounded(&predicate.bounds),
			_ => false,
		})
	});
	Some((name, in_params || in_where))
}
