//! Aggregates and manual impls discovered in scanned sources.

use rustc_hash::FxHashMap;

use crate::obligation::Aggregate;

/// How a catalogued type obtained the capability.
#[derive(Debug, Clone)]
pub enum CatalogItem {
	/// `#[derive(NonLocalValue)]`; non-local iff its fields and type arguments are.
	Derived(Aggregate),
	/// Hand-written `unsafe impl NonLocalValue`.
	Manual {
		/// The impl bounds at least one type parameter by `NonLocalValue`.
		checks_arguments: bool,
	},
}

/// Types the resolver may descend into, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
	items: FxHashMap<String, CatalogItem>,
}

impl Catalog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records a derived aggregate. Returns `false` if the name was already taken.
	pub fn insert_derived(&mut self, aggregate: Aggregate) -> bool {
		let name = aggregate.name.clone();
		self.insert(name, CatalogItem::Derived(aggregate))
	}

	/// Records a manual impl. Returns `false` if the name was already taken.
	pub fn insert_manual(&mut self, name: impl Into<String>, checks_arguments: bool) -> bool {
		self.insert(name.into(), CatalogItem::Manual { checks_arguments })
	}

	fn insert(&mut self, name: String, item: CatalogItem) -> bool {
		if self.items.contains_key(&name) {
			return false;
		}
		self.items.insert(name, item);
		true
	}

	pub fn get(&self, name: &str) -> Option<&CatalogItem> {
		self.items.get(name)
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}
