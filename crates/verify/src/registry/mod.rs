//! Built-in non-locality verdicts.
//!
//! The registry is the explicit form of the trait impls in `locus`: every
//! named type the trait table grants, denies, composes or deliberately leaves
//! without a rule has an entry here. Structural shapes (tuples, arrays,
//! references) are rules in the resolver rather than entries.
//!
//! Lookups are by the final path segment, so `std::option::Option<T>` and
//! `Option<T>` resolve to the same entry.

use std::sync::LazyLock;

use indexmap::IndexMap;

use crate::config::RegistryConfig;
use crate::error::{Result, VerifyError};

/// Largest tuple arity with a composition rule.
pub const MAX_TUPLE_ARITY: usize = 13;

/// Verdict attached to a named type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entry {
	/// Non-local regardless of any type arguments.
	Granted,
	/// A task-graph handle. Never non-local, whatever it is parameterized by.
	Denied,
	/// Non-local iff its single type argument is.
	Wrapper,
	/// A known container with no composition rule.
	Unsupported,
}

/// A statically declared registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Builtin {
	pub name: &'static str,
	pub entry: Entry,
}

const fn builtin(name: &'static str, entry: Entry) -> Builtin {
	Builtin { name, entry }
}

/// The built-in table, in the order examples are listed in diagnostics.
pub const BUILTINS: &[Builtin] = &[
	builtin("()", Entry::Granted),
	builtin("bool", Entry::Granted),
	builtin("char", Entry::Granted),
	builtin("u8", Entry::Granted),
	builtin("u16", Entry::Granted),
	builtin("u32", Entry::Granted),
	builtin("u64", Entry::Granted),
	builtin("u128", Entry::Granted),
	builtin("usize", Entry::Granted),
	builtin("i8", Entry::Granted),
	builtin("i16", Entry::Granted),
	builtin("i32", Entry::Granted),
	builtin("i64", Entry::Granted),
	builtin("i128", Entry::Granted),
	builtin("isize", Entry::Granted),
	builtin("f32", Entry::Granted),
	builtin("f64", Entry::Granted),
	builtin("str", Entry::Granted),
	builtin("String", Entry::Granted),
	builtin("Duration", Entry::Granted),
	builtin("Option", Entry::Wrapper),
	builtin("Box", Entry::Wrapper),
	builtin("Handle", Entry::Denied),
	builtin("Vec", Entry::Unsupported),
	builtin("VecDeque", Entry::Unsupported),
	builtin("HashMap", Entry::Unsupported),
	builtin("HashSet", Entry::Unsupported),
	builtin("BTreeMap", Entry::Unsupported),
	builtin("BTreeSet", Entry::Unsupported),
	builtin("Rc", Entry::Unsupported),
	builtin("Arc", Entry::Unsupported),
	builtin("Weak", Entry::Unsupported),
	builtin("Cell", Entry::Unsupported),
	builtin("RefCell", Entry::Unsupported),
	builtin("Mutex", Entry::Unsupported),
	builtin("RwLock", Entry::Unsupported),
	builtin("PhantomData", Entry::Unsupported),
];

/// Structural shapes that compose non-locality, listed after named grants.
const STRUCTURAL_EXAMPLES: &[&str] = &["&T", "&mut T", "[T; N]", "(A, B, ..)"];

static SHARED: LazyLock<Registry> = LazyLock::new(Registry::builtin);

/// Name-keyed verdict table.
#[derive(Debug, Clone)]
pub struct Registry {
	entries: IndexMap<Box<str>, Entry>,
}

impl Default for Registry {
	fn default() -> Self {
		Self::builtin()
	}
}

impl Registry {
	/// Builds a registry holding exactly [`BUILTINS`].
	pub fn builtin() -> Self {
		let entries = BUILTINS
			.iter()
			.map(|b| (Box::<str>::from(b.name), b.entry))
			.collect();
		Self { entries }
	}

	/// Returns the process-wide built-in registry.
	pub fn shared() -> &'static Registry {
		&SHARED
	}

	/// Builds a registry from [`BUILTINS`] extended by configuration.
	///
	/// Configuration can certify opaque names and add handle-like names, but
	/// can never certify a name the registry denies or a built-in container.
	pub fn with_config(config: &RegistryConfig) -> Result<Self> {
		let mut registry = Self::builtin();
		for name in &config.local {
			if config.non_local.contains(name) {
				return Err(VerifyError::Conflict(name.clone()));
			}
			registry.deny(name);
		}
		for name in &config.non_local {
			registry.grant(name)?;
		}
		Ok(registry)
	}

	/// Looks up a type by its final path segment.
	pub fn lookup(&self, name: &str) -> Option<Entry> {
		self.entries.get(name).copied()
	}

	/// Certifies `name` as non-local, ignoring any type arguments it carries.
	///
	/// Refused for handles, and for wrappers and unsupported containers: a
	/// grant would certify `Option<Handle<T>>` or `Vec<Handle<T>>`.
	pub fn grant(&mut self, name: &str) -> Result<()> {
		match self.lookup(name) {
			Some(Entry::Denied) => Err(VerifyError::GrantsHandle(name.to_string())),
			Some(Entry::Wrapper | Entry::Unsupported) => Err(VerifyError::GrantsContainer(name.to_string())),
			Some(Entry::Granted) | None => {
				self.entries.insert(name.into(), Entry::Granted);
				Ok(())
			}
		}
	}

	/// Marks `name` as a handle. Denial always wins over earlier entries.
	pub fn deny(&mut self, name: &str) {
		self.entries.insert(name.into(), Entry::Denied);
	}

	/// Iterates over all entries in declaration order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, Entry)> {
		self.entries.iter().map(|(name, entry)| (&**name, *entry))
	}

	/// Types that satisfy the capability, for the diagnostic help list.
	pub fn examples(&self) -> Vec<String> {
		let granted = self
			.iter()
			.filter(|(_, entry)| *entry == Entry::Granted)
			.map(|(name, _)| name.to_string());
		let wrappers = self
			.iter()
			.filter(|(_, entry)| *entry == Entry::Wrapper)
			.map(|(name, _)| format!("{name}<T>"));
		granted
			.chain(wrappers)
			.chain(STRUCTURAL_EXAMPLES.iter().map(|s| s.to_string()))
			.collect()
	}
}
