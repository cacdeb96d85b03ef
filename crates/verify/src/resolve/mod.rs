//! Explicit non-locality resolution.
//!
//! [`Resolver::resolve`] unwinds a field type structurally, consulting the
//! [`Registry`] for named types and the composition rules for tuples, arrays
//! and references. The walk records every layer it passes through, so a
//! failure carries the whole chain from the declared field type down to the
//! innermost type that lacks the capability.
//!
//! Resolution is pure: the same type, registry and catalog always produce the
//! same [`Resolution`]. Components are visited left to right and the first
//! failure wins.

use rustc_hash::FxHashSet;
use syn::{GenericArgument, PathArguments, PathSegment, Type};

use crate::catalog::{Catalog, CatalogItem};
use crate::config::UnknownPolicy;
use crate::display::{path_name, type_name};
use crate::obligation::Aggregate;
use crate::registry::{Entry, MAX_TUPLE_ARITY, Registry};

/// How a link in the chain was reached from its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Via {
	/// The declared field type; root of every chain.
	Field,
	/// Component `n` of a tuple.
	TupleElement(usize),
	/// Element type of a fixed-size array.
	ArrayElement,
	/// Type argument of a registry wrapper (`Option`, `Box`).
	Argument,
	/// Field of a catalogued aggregate.
	AggregateField {
		aggregate: String,
		/// Full field path, e.g. `Inner.handle`.
		path: String,
	},
	/// Type argument of a catalogued aggregate or manual impl.
	Parameter { aggregate: String, index: usize },
}

/// One layer of an obligation chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
	/// Display form of the type at this layer.
	pub ty: String,
	pub via: Via,
}

/// Why the innermost type lacks the capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cause {
	/// A task-graph handle.
	Local,
	/// No composition rule covers this shape.
	NoRule,
	/// Not declared anywhere the resolver can see, under [`UnknownPolicy::Deny`].
	Unknown,
}

/// A failed obligation with its full chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
	pub cause: Cause,
	/// Layers above the culprit, outermost first.
	pub parents: Vec<Link>,
	/// The innermost type lacking the capability.
	pub culprit: Link,
}

impl Failure {
	/// Every layer from the field type down to the culprit.
	pub fn chain(&self) -> impl Iterator<Item = &Link> {
		self.parents.iter().chain(std::iter::once(&self.culprit))
	}

	/// The declared field type.
	pub fn root(&self) -> &Link {
		self.parents.first().unwrap_or(&self.culprit)
	}

	/// Field paths crossed inside catalogued aggregates, outermost first.
	pub fn hops(&self) -> Vec<&str> {
		self.chain()
			.filter_map(|link| match &link.via {
				Via::AggregateField { path, .. } => Some(path.as_str()),
				_ => None,
			})
			.collect()
	}
}

/// Outcome of resolving one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
	/// Non-local with no remaining obligations.
	Certified,
	/// Nothing failed, but these types are left to the trait solver.
	Deferred(Vec<String>),
	Failed(Failure),
}

impl Resolution {
	pub fn is_certified(&self) -> bool {
		matches!(self, Self::Certified)
	}

	pub fn is_failed(&self) -> bool {
		matches!(self, Self::Failed(_))
	}

	pub fn failure(&self) -> Option<&Failure> {
		match self {
			Self::Failed(failure) => Some(failure),
			_ => None,
		}
	}
}

/// Resolves field types against a registry and, optionally, a catalog.
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
	registry: &'a Registry,
	catalog: Option<&'a Catalog>,
	params: Vec<String>,
	unknown: UnknownPolicy,
	/// Aggregate whose fields are being resolved; self references are not re-entered.
	within: Option<String>,
}

impl<'a> Resolver<'a> {
	pub fn new(registry: &'a Registry) -> Self {
		Self {
			registry,
			catalog: None,
			params: Vec::new(),
			unknown: UnknownPolicy::Defer,
			within: None,
		}
	}

	/// Lets the resolver descend into aggregates and manual impls found by a scan.
	pub fn with_catalog(mut self, catalog: &'a Catalog) -> Self {
		self.catalog = Some(catalog);
		self
	}

	/// Type parameters in scope. They are deferred: the derive bounds each one.
	pub fn with_params(mut self, params: &[String]) -> Self {
		self.params = params.to_vec();
		self
	}

	pub fn with_unknown(mut self, policy: UnknownPolicy) -> Self {
		self.unknown = policy;
		self
	}

	/// Resolves `ty` as the declared type of a field.
	pub fn resolve(&self, ty: &Type) -> Resolution {
		let mut walk = Walk {
			resolver: self,
			chain: Vec::new(),
			visiting: FxHashSet::default(),
			deferred: Vec::new(),
		};
		if let Some(name) = &self.within {
			walk.visiting.insert(name.clone());
		}
		let root = Frame {
			params: &self.params,
			certified: false,
		};
		match walk.visit(ty, Via::Field, &root) {
			Err(failure) => Resolution::Failed(failure),
			Ok(()) if walk.deferred.is_empty() => Resolution::Certified,
			Ok(()) => Resolution::Deferred(walk.deferred),
		}
	}

	/// Resolves every obligation of `aggregate` with its type parameters in scope.
	pub fn resolve_aggregate(&self, aggregate: &Aggregate) -> Vec<Resolution> {
		let mut scoped = self.clone().with_params(&aggregate.params);
		scoped.within = Some(aggregate.name.clone());
		aggregate
			.obligations
			.iter()
			.map(|obligation| scoped.resolve(&obligation.ty))
			.collect()
	}
}

/// Type parameters visible at the current depth.
struct Frame<'p> {
	params: &'p [String],
	/// Parameters were already checked through the aggregate's type arguments.
	certified: bool,
}

/// Failure raised while visiting a layer.
enum Fault {
	/// The layer being visited is the culprit.
	Here(Cause),
	/// A nested layer failed; its chain is complete.
	Below(Failure),
}

impl From<Failure> for Fault {
	fn from(failure: Failure) -> Self {
		Self::Below(failure)
	}
}

struct Walk<'r, 'a> {
	resolver: &'r Resolver<'a>,
	chain: Vec<Link>,
	/// Aggregates whose fields are being unwound; revisits only check their arguments.
	visiting: FxHashSet<String>,
	deferred: Vec<String>,
}

impl Walk<'_, '_> {
	fn visit(&mut self, ty: &Type, via: Via, frame: &Frame<'_>) -> Result<(), Failure> {
		match ty {
			Type::Paren(paren) => return self.visit(&paren.elem, via, frame),
			Type::Group(group) => return self.visit(&group.elem, via, frame),
			_ => {}
		}

		let link = Link {
			ty: type_name(ty),
			via,
		};
		self.chain.push(link.clone());
		let outcome = self.visit_shape(ty, frame);
		self.chain.pop();

		match outcome {
			Ok(()) => Ok(()),
			Err(Fault::Below(failure)) => Err(failure),
			Err(Fault::Here(cause)) => Err(Failure {
				cause,
				parents: self.chain.clone(),
				culprit: link,
			}),
		}
	}

	fn visit_shape(&mut self, ty: &Type, frame: &Frame<'_>) -> Result<(), Fault> {
		match ty {
			Type::Reference(_) => Ok(()),
			Type::Tuple(tuple) => {
				if tuple.elems.len() > MAX_TUPLE_ARITY {
					return Err(Fault::Here(Cause::NoRule));
				}
				for (index, elem) in tuple.elems.iter().enumerate() {
					self.visit(elem, Via::TupleElement(index), frame)?;
				}
				Ok(())
			}
			Type::Array(array) => Ok(self.visit(&array.elem, Via::ArrayElement, frame)?),
			Type::Path(path) if path.qself.is_none() => self.visit_path(&path.path, frame),
			Type::Path(_) | Type::Macro(_) | Type::Verbatim(_) => {
				self.defer(type_name(ty));
				Ok(())
			}
			_ => Err(Fault::Here(Cause::NoRule)),
		}
	}

	fn visit_path(&mut self, path: &syn::Path, frame: &Frame<'_>) -> Result<(), Fault> {
		let Some(last) = path.segments.last() else {
			return Ok(());
		};
		let name = last.ident.to_string();

		if path.segments.len() == 1 && last.arguments.is_none() {
			if name == "Self" {
				return Ok(());
			}
			if frame.params.contains(&name) {
				if !frame.certified {
					self.defer(name);
				}
				return Ok(());
			}
		}

		// A scanned declaration shadows a registry name unless the path names a library crate.
		if !names_library(path)
			&& let Some(item) = self.resolver.catalog.and_then(|catalog| catalog.get(&name))
		{
			return self.visit_catalogued(item, &name, last, frame);
		}

		match self.resolver.registry.lookup(&name) {
			Some(Entry::Granted) => Ok(()),
			Some(Entry::Denied) => Err(Fault::Here(Cause::Local)),
			Some(Entry::Unsupported) => Err(Fault::Here(Cause::NoRule)),
			Some(Entry::Wrapper) => match type_arguments(last).as_slice() {
				[inner] => Ok(self.visit(inner, Via::Argument, frame)?),
				_ => Err(Fault::Here(Cause::NoRule)),
			},
			None => match self.resolver.unknown {
				UnknownPolicy::Defer => {
					self.defer(path_name(path));
					Ok(())
				}
				UnknownPolicy::Deny => Err(Fault::Here(Cause::Unknown)),
			},
		}
	}

	fn visit_catalogued(
		&mut self,
		item: &CatalogItem,
		name: &str,
		segment: &PathSegment,
		frame: &Frame<'_>,
	) -> Result<(), Fault> {
		match item {
			CatalogItem::Derived(aggregate) => Ok(self.visit_aggregate(aggregate, segment, frame)?),
			CatalogItem::Manual { checks_arguments: true } => Ok(self.visit_arguments(name, segment, usize::MAX, frame)?),
			CatalogItem::Manual { checks_arguments: false } => Ok(()),
		}
	}

	/// Checks the aggregate's type arguments, then its fields with its parameters certified.
	///
	/// An aggregate already being unwound is not re-entered: its fields hold
	/// for any arguments that are non-local, so only the arguments are checked.
	fn visit_aggregate(
		&mut self,
		aggregate: &Aggregate,
		segment: &PathSegment,
		frame: &Frame<'_>,
	) -> Result<(), Failure> {
		self.visit_arguments(&aggregate.name, segment, aggregate.params.len(), frame)?;
		if !self.visiting.insert(aggregate.name.clone()) {
			return Ok(());
		}
		let result = self.visit_fields(aggregate);
		self.visiting.remove(&aggregate.name);
		result
	}

	fn visit_arguments(
		&mut self,
		name: &str,
		segment: &PathSegment,
		limit: usize,
		frame: &Frame<'_>,
	) -> Result<(), Failure> {
		for (index, arg) in type_arguments(segment).into_iter().take(limit).enumerate() {
			let via = Via::Parameter {
				aggregate: name.to_string(),
				index,
			};
			self.visit(arg, via, frame)?;
		}
		Ok(())
	}

	fn visit_fields(&mut self, aggregate: &Aggregate) -> Result<(), Failure> {
		let inner = Frame {
			params: &aggregate.params,
			certified: true,
		};
		for obligation in &aggregate.obligations {
			let via = Via::AggregateField {
				aggregate: aggregate.name.clone(),
				path: obligation.path(),
			};
			self.visit(&obligation.ty, via, &inner)?;
		}
		Ok(())
	}

	fn defer(&mut self, ty: String) {
		if !self.deferred.contains(&ty) {
			self.deferred.push(ty);
		}
	}
}

/// Paths rooted at `std`, `core`, `alloc` or `locus` always mean the library type.
fn names_library(path: &syn::Path) -> bool {
	path.segments.len() > 1
		&& path
			.segments
			.first()
			.is_some_and(|first| ["std", "core", "alloc", "locus"].iter().any(|root| first.ident == root))
}

fn type_arguments(segment: &PathSegment) -> Vec<&Type> {
	match &segment.arguments {
		PathArguments::AngleBracketed(args) => args
			.args
			.iter()
			.filter_map(|arg| match arg {
				GenericArgument::Type(ty) => Some(ty),
				_ => None,
			})
			.collect(),
		_ => Vec::new(),
	}
}
