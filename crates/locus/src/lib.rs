//! Non-local values for task-graph outputs.
//!
//! A task's output may be cached, read by later tasks concurrently, retained
//! across generations and relocated between storage slots. That is only sound
//! if the output holds no [`Handle`] into the task graph's slot storage.
//! [`NonLocalValue`] marks types proven to hold none, and the compiler checks
//! the proof at every aggregate deriving it.
//!
//! ```
//! use std::time::Duration;
//!
//! use locus::NonLocalValue;
//!
//! #[derive(Clone, NonLocalValue)]
//! pub struct Fetched {
//!     url: String,
//!     elapsed: Duration,
//!     body: Option<Box<[u8; 64]>>,
//! }
//! ```
//!
//! The `locus-verify` crate repeats the same judgment explicitly, so failures
//! can be reported with the field and wrapper chain that led to the handle.

extern crate self as locus;

mod handle;
mod non_local;

pub use handle::{Handle, TaskId};
pub use locus_macros::NonLocalValue;
pub use non_local::NonLocalValue;

#[doc(hidden)]
pub mod __private {
	use std::marker::PhantomData;

	use crate::NonLocalValue;

	/// Target of the per-field assertions emitted by `#[derive(NonLocalValue)]`.
	#[inline(always)]
	pub fn assert_non_local<T: ?Sized + NonLocalValue>() {}

	/// Verdict for a field type the trait solver certifies.
	pub struct NonLocal;

	/// Verdict for a field type the trait solver rejects.
	pub struct Local;

	/// Asks the trait solver about `T` without failing when it says no.
	///
	/// `(&&Query::<T>::new()).verdict()` selects [`ViaNonLocal`] when
	/// `T: NonLocalValue` holds and falls back to [`ViaLocal`] otherwise. The
	/// derive requires the verdict to be [`NonLocal`] through a trait whose
	/// diagnostic carries the explicit resolver's chain.
	pub struct Query<T: ?Sized>(PhantomData<T>);

	impl<T: ?Sized> Query<T> {
		#[inline(always)]
		pub const fn new() -> Self {
			Self(PhantomData)
		}
	}

	pub trait ViaNonLocal {
		#[inline(always)]
		fn verdict(&self) -> NonLocal {
			NonLocal
		}
	}

	impl<T: ?Sized + NonLocalValue> ViaNonLocal for &Query<T> {}

	pub trait ViaLocal {
		#[inline(always)]
		fn verdict(&self) -> Local {
			Local
		}
	}

	impl<T: ?Sized> ViaLocal for Query<T> {}
}
