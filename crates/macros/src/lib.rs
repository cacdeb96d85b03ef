//! Procedural macros for locus.
//!
//! Provides `#[derive(NonLocalValue)]`. Use it through the re-export in the
//! `locus` crate; the generated code refers to `::locus` paths.

use proc_macro::TokenStream;

/// NonLocalValue derive implementation.
mod non_local;

/// Certifies that an aggregate holds no task-graph handle.
///
/// Every field type, including each enum variant's payload fields, must
/// itself be `NonLocalValue`. Type parameters are bounded by
/// `NonLocalValue` on the generated impl.
///
/// ```ignore
/// #[derive(NonLocalValue)]
/// pub struct Snapshot<T> {
///     revision: u64,
///     entries: Option<Box<[T; 4]>>,
/// }
/// ```
///
/// Generates:
/// * `unsafe impl<T: NonLocalValue> NonLocalValue for Snapshot<T> {}`
/// * one hidden assertion per field, spanned at the field type
///
/// Field types are also resolved explicitly while expanding. When the trait
/// solver confirms a rejection, the error is reported at the field with the
/// whole wrapper chain:
///
/// ```text
/// error: `Handle<i32>` is not a non-local value
///   = field `Cache.slots`: Option<Box<[Handle<i32>; 4]>>
///   = note: `Handle<i32>` is a task-graph handle and is never non-local
///   ...
/// ```
///
/// Unions are rejected. The derive takes no attributes and does not change
/// the aggregate's layout or API.
#[proc_macro_derive(NonLocalValue)]
pub fn derive_non_local_value(input: TokenStream) -> TokenStream {
	non_local::derive_non_local_value(input)
}
