//! Task-graph handles.
//!
//! A [`Handle`] names a slot owned by one task in one graph generation. It is
//! meaningless outside that generation, so it can never appear in a value the
//! engine caches.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Identifies a task within a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u32);

impl TaskId {
	pub const fn new(raw: u32) -> Self {
		Self(raw)
	}

	pub const fn get(self) -> u32 {
		self.0
	}
}

/// Reference to a `T` stored in a task's slot.
///
/// Never [`NonLocalValue`](crate::NonLocalValue), whatever `T` is.
pub struct Handle<T> {
	task: TaskId,
	index: u32,
	_marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
	pub const fn new(task: TaskId, index: u32) -> Self {
		Self {
			task,
			index,
			_marker: PhantomData,
		}
	}

	/// The task owning the slot.
	pub const fn task(self) -> TaskId {
		self.task
	}

	/// Slot index within the task's storage.
	pub const fn index(self) -> u32 {
		self.index
	}
}

impl<T> Clone for Handle<T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
	fn eq(&self, other: &Self) -> bool {
		self.task == other.task && self.index == other.index
	}
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.task.hash(state);
		self.index.hash(state);
	}
}

impl<T> fmt::Debug for Handle<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Handle({}:{})", self.task.0, self.index)
	}
}

// Fails to compile if any `Handle<T>` ever gains the capability.
const _: fn() = || {
	trait AmbiguousIfNonLocal<A> {
		fn some_item() {}
	}
	impl<T: ?Sized> AmbiguousIfNonLocal<()> for T {}
	struct Invalid;
	impl<T: ?Sized + crate::NonLocalValue> AmbiguousIfNonLocal<Invalid> for T {}

	let _ = <Handle<u8> as AmbiguousIfNonLocal<_>>::some_item;
	let _ = <Handle<String> as AmbiguousIfNonLocal<_>>::some_item;
};

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn handles_compare_by_slot() {
		let a: Handle<u8> = Handle::new(TaskId::new(3), 7);
		let b = a;
		assert_eq!(a, b);
		assert_ne!(a, Handle::new(TaskId::new(3), 8));
		assert_eq!(a.task().get(), 3);
		assert_eq!(a.index(), 7);
		assert_eq!(format!("{a:?}"), "Handle(3:7)");
	}
}
