//! Explicit non-locality verification.
//!
//! The trait path (`locus::NonLocalValue` and its derive) lets the compiler's
//! trait solver decide whether a type may be cached as a task output. This
//! crate makes the same judgment explicit so failures can be reported precisely:
//!
//! * [`registry`] - statically initialized table of built-in verdicts
//! * [`obligation`] - per-field obligations generated from an aggregate
//! * [`resolve`] - recursive resolution of a field type with a full chain
//! * [`render`] - diagnostic text for failed obligations
//! * [`config`] - `locus.toml` loading
//! * `compile` - source scanning for build scripts (feature `compile`)
//!
//! The derive macro runs the resolver before emitting trait obligations, so a
//! handle buried in wrappers is reported with the field path and the whole
//! wrapper chain instead of only the outermost type.

pub mod catalog;
#[cfg(feature = "compile")]
pub mod compile;
pub mod config;
pub mod display;
pub mod error;
pub mod obligation;
pub mod registry;
pub mod render;
pub mod resolve;

pub use catalog::{Catalog, CatalogItem};
pub use config::{Config, RegistryConfig, RenderOptions, ScanOptions, UnknownPolicy};
pub use error::{Result, VerifyError};
pub use obligation::{Aggregate, Obligation};
pub use registry::{Builtin, Entry, MAX_TUPLE_ARITY, Registry};
pub use render::{Location, Report};
pub use resolve::{Cause, Failure, Link, Resolution, Resolver, Via};
