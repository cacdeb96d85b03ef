//! Diagnostic text for failed obligations.
//!
//! The layout follows rustc's trait-resolution errors: a headline naming the
//! innermost type that lacks the capability, the field it was declared in,
//! the chain of requirements that led there, a sample of types that would
//! satisfy the capability, and a note tying the requirement to the derive.
//!
//! Intermediate requirements are collapsed into `N redundant requirements
//! hidden` unless [`RenderOptions::full_chain`] is set. Collapsing happens here
//! only; [`Failure`] always keeps the complete chain.

use std::fmt::{self, Write};
use std::path::PathBuf;

use crate::config::RenderOptions;
use crate::obligation::Obligation;
use crate::registry::Registry;
use crate::resolve::{Cause, Failure, Link, Via};

/// Source position of a field declaration. Lines and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
	pub file: Option<PathBuf>,
	pub line: usize,
	pub column: usize,
}

impl fmt::Display for Location {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.file {
			Some(file) => write!(f, "{}:{}:{}", file.display(), self.line, self.column),
			None => write!(f, "{}:{}", self.line, self.column),
		}
	}
}

/// A failed obligation attributed to its aggregate and field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
	pub aggregate: String,
	/// Field path, e.g. `Cache.slots`.
	pub path: String,
	pub location: Option<Location>,
	pub failure: Failure,
}

impl Report {
	pub fn new(obligation: &Obligation, failure: Failure) -> Self {
		Self {
			aggregate: obligation.aggregate.clone(),
			path: obligation.path(),
			location: None,
			failure,
		}
	}

	pub fn with_location(mut self, location: Location) -> Self {
		self.location = Some(location);
		self
	}
}

/// Renders a report as a standalone diagnostic, with `error:` prefix and location.
pub fn render(report: &Report, registry: &Registry, options: &RenderOptions) -> String {
	let mut out = format!("error: {}", headline(report));
	if let Some(location) = &report.location {
		let _ = write!(out, "\n  --> {location}");
	}
	push_body(&mut out, report, registry, options);
	out
}

/// Renders a report as a compiler error message; the compiler supplies prefix and location.
pub fn render_message(report: &Report, registry: &Registry, options: &RenderOptions) -> String {
	let mut out = headline(report);
	push_body(&mut out, report, registry, options);
	out
}

/// Splits a report into its headline and body lines, unprefixed by `=`.
pub fn render_lines(report: &Report, registry: &Registry, options: &RenderOptions) -> (String, Vec<String>) {
	(headline(report), body(report, registry, options))
}

fn headline(report: &Report) -> String {
	format!("`{}` is not a non-local value", report.failure.culprit.ty)
}

fn push_body(out: &mut String, report: &Report, registry: &Registry, options: &RenderOptions) {
	for line in body(report, registry, options) {
		out.push_str("\n  = ");
		out.push_str(&line);
	}
}

fn body(report: &Report, registry: &Registry, options: &RenderOptions) -> Vec<String> {
	let failure = &report.failure;
	let culprit = &failure.culprit.ty;
	let mut lines = vec![format!("field `{}`: {}", report.path, failure.root().ty)];

	let hops = failure.hops();
	if !hops.is_empty() {
		let hops: Vec<_> = hops.iter().map(|hop| format!("`{hop}`")).collect();
		lines.push(format!("note: reached through {}", hops.join(" -> ")));
	}

	lines.push(match failure.cause {
		Cause::Local => format!("note: `{culprit}` is a task-graph handle and is never non-local"),
		Cause::NoRule => format!("note: no composition rule makes `{culprit}` non-local"),
		Cause::Unknown => format!("note: `{culprit}` is not declared non-local in the scanned sources"),
	});

	let requirements = requirements(failure);
	if options.full_chain || requirements.len() <= 2 {
		lines.extend(requirements);
	} else if let (Some(first), Some(last)) = (requirements.first(), requirements.last()) {
		let hidden = requirements.len() - 2;
		lines.push(first.clone());
		lines.push(format!(
			"note: {hidden} redundant requirement{} hidden",
			if hidden == 1 { "" } else { "s" }
		));
		lines.push(last.clone());
	}

	if failure.cause == Cause::NoRule {
		lines.push("help: add a manual `unsafe impl NonLocalValue` for a wrapper, or avoid the shape".into());
	}
	if let Some(help) = examples(registry, options.max_examples) {
		lines.push(help);
	}
	lines.push(format!(
		"note: this requirement comes from `#[derive(NonLocalValue)]` on `{}`",
		report.aggregate
	));
	lines
}

/// One `required for` line per parent, innermost first.
fn requirements(failure: &Failure) -> Vec<String> {
	let chain: Vec<&Link> = failure.chain().collect();
	chain
		.windows(2)
		.rev()
		.map(|pair| {
			let (parent, child) = (pair[0], pair[1]);
			match &child.via {
				Via::AggregateField { path, .. } => {
					format!("note: required for `{}` to be non-local (field `{path}`)", parent.ty)
				}
				_ => format!("note: required for `{}` to be non-local", parent.ty),
			}
		})
		.collect()
}

fn examples(registry: &Registry, max: usize) -> Option<String> {
	if max == 0 {
		return None;
	}
	let examples = registry.examples();
	let mut help = String::from("help: the following types are non-local:");
	for example in examples.iter().take(max) {
		let _ = write!(help, "\n            {example}");
	}
	if examples.len() > max {
		let _ = write!(help, "\n          and {} others", examples.len() - max);
	}
	Some(help)
}

#[cfg(test)]
mod tests;
