//! The non-local capability and its built-in implementations.
//!
//! Built-in grants cover primitives, `str`, `String`, `Duration` and every
//! reference. Composition rules cover tuples up to arity 13, fixed-size
//! arrays, `Option` and `Box`. Nothing else is non-local unless an aggregate
//! derives it or a manual `unsafe impl` certifies an opaque type.
//!
//! A handle is rejected however deeply it is nested:
//!
//! ```compile_fail
//! fn cache<T: locus::NonLocalValue>(_: T) {}
//! cache(Some(Box::new([locus::Handle::<i32>::new(locus::TaskId::new(0), 0); 4])));
//! ```
//!
//! Containers without a rule fail closed:
//!
//! ```compile_fail
//! fn cache<T: locus::NonLocalValue>(_: T) {}
//! cache(vec![1u8, 2, 3]);
//! ```
//!
//! Deriving for an aggregate with a handle-bearing field fails at that field:
//!
//! ```compile_fail
//! use locus::{Handle, NonLocalValue};
//!
//! #[derive(NonLocalValue)]
//! struct Cache {
//!     id: u64,
//!     slots: Option<Box<[Handle<i32>; 4]>>,
//! }
//! ```
//!
//! Including through a type parameter:
//!
//! ```compile_fail
//! use locus::{Handle, NonLocalValue};
//!
//! #[derive(NonLocalValue)]
//! struct Slot<T>(Option<T>);
//!
//! fn cache<T: NonLocalValue>(_: T) {}
//! cache(Slot::<Handle<u8>>(None));
//! ```

use std::time::Duration;

/// A value that holds no task-graph handle, directly or transitively.
///
/// Values of such types may be cached as task outputs, shared between
/// concurrent readers, kept across graph generations and moved between slots.
///
/// # Safety
///
/// Implementors must not contain a [`Handle`](crate::Handle) anywhere in
/// their representation, including behind pointers they own. Prefer
/// `#[derive(NonLocalValue)]`, which checks every field; implement manually
/// only for opaque types the derive cannot see into.
#[diagnostic::on_unimplemented(
	message = "`{Self}` is not a non-local value",
	label = "`{Self}` may hold a task-graph handle",
	note = "a type holding a `Handle` anywhere in its fields is never non-local",
	note = "non-local values are primitives, `String`, references, tuples, arrays, `Option`, `Box` and types deriving `NonLocalValue`"
)]
pub unsafe trait NonLocalValue {}

macro_rules! granted {
	($($ty:ty),* $(,)?) => {
		$(unsafe impl NonLocalValue for $ty {})*

		#[cfg(test)]
		pub(crate) const GRANTED: &[&str] = &[$(stringify!($ty)),*];
	};
}

granted![
	(),
	bool,
	char,
	u8,
	u16,
	u32,
	u64,
	u128,
	usize,
	i8,
	i16,
	i32,
	i64,
	i128,
	isize,
	f32,
	f64,
	str,
	String,
	Duration,
];

unsafe impl<T: ?Sized> NonLocalValue for &T {}
unsafe impl<T: ?Sized> NonLocalValue for &mut T {}

unsafe impl<T: NonLocalValue, const N: usize> NonLocalValue for [T; N] {}

unsafe impl<T: NonLocalValue> NonLocalValue for Option<T> {}
unsafe impl<T: ?Sized + NonLocalValue> NonLocalValue for Box<T> {}

macro_rules! tuples {
	($head:ident $(, $tail:ident)*) => {
		unsafe impl<$head: NonLocalValue $(, $tail: NonLocalValue)*> NonLocalValue for ($head, $($tail,)*) {}
		tuples!($($tail),*);
	};
	() => {};
}

tuples!(A, B, C, D, E, F, G, H, I, J, K, L, M);
