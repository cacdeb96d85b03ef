//! Per-field obligations generated from an aggregate declaration.
//!
//! Each field of a struct, and each payload field of every enum variant,
//! yields one [`Obligation`]: "this field's type is non-local". The obligation
//! remembers which aggregate and field it came from so a failure can be
//! attributed to the declaration that caused it.

use std::fmt;

use proc_macro2::Span;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, Type};

use crate::display::type_name;

/// Demand that one field type carries the non-local capability.
#[derive(Clone)]
pub struct Obligation {
	/// Aggregate the obligation is attributed to.
	pub aggregate: String,
	/// Enum variant holding the field, if any.
	pub variant: Option<String>,
	/// Field name, or its position for tuple fields.
	pub member: String,
	/// The declared field type.
	pub ty: Type,
	/// Span of the field type.
	pub span: Span,
}

impl Obligation {
	/// Field path as shown in diagnostics: `Cache.slots`, `Cache.0` or `Event::Moved.to`.
	pub fn path(&self) -> String {
		match &self.variant {
			Some(variant) => format!("{}::{}.{}", self.aggregate, variant, self.member),
			None => format!("{}.{}", self.aggregate, self.member),
		}
	}

	/// Identifier-safe field label: `slots`, `0` or `Moved_to`.
	pub fn label(&self) -> String {
		match &self.variant {
			Some(variant) => format!("{}_{}", variant, self.member),
			None => self.member.clone(),
		}
	}
}

impl fmt::Debug for Obligation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Obligation")
			.field("path", &self.path())
			.field("ty", &type_name(&self.ty))
			.finish()
	}
}

/// A struct or enum with the obligations its fields generate.
#[derive(Debug, Clone)]
pub struct Aggregate {
	pub name: String,
	/// Names of the aggregate's type parameters, in declaration order.
	pub params: Vec<String>,
	pub obligations: Vec<Obligation>,
}

impl Aggregate {
	/// Generates one obligation per field or variant payload field.
	///
	/// Unions are rejected: their fields overlap, so no single field type
	/// describes what is stored.
	pub fn from_derive(input: &DeriveInput) -> syn::Result<Self> {
		let name = input.ident.unraw().to_string();
		let params = input
			.generics
			.type_params()
			.map(|param| param.ident.to_string())
			.collect();

		let mut obligations = Vec::new();
		match &input.data {
			Data::Struct(data) => {
				push_fields(&mut obligations, &name, None, &data.fields);
			}
			Data::Enum(data) => {
				for variant in &data.variants {
					let variant_name = variant.ident.unraw().to_string();
					push_fields(&mut obligations, &name, Some(&variant_name), &variant.fields);
				}
			}
			Data::Union(_) => {
				return Err(syn::Error::new_spanned(
					&input.ident,
					"NonLocalValue cannot be derived for unions",
				));
			}
		}

		Ok(Self {
			name,
			params,
			obligations,
		})
	}
}

fn push_fields(out: &mut Vec<Obligation>, aggregate: &str, variant: Option<&str>, fields: &Fields) {
	for (index, field) in fields.iter().enumerate() {
		let member = match &field.ident {
			Some(ident) => ident.unraw().to_string(),
			None => index.to_string(),
		};
		out.push(Obligation {
			aggregate: aggregate.to_string(),
			variant: variant.map(str::to_string),
			member,
			ty: field.ty.clone(),
			span: field.ty.span(),
		});
	}
}

#[cfg(test)]
mod tests {
	use syn::parse_quote;

	use super::*;

	#[test]
	fn struct_fields_in_order() {
		let input: DeriveInput = parse_quote! {
			struct Cache<T> {
				id: u32,
				r#type: Option<T>,
			}
		};
		let aggregate = Aggregate::from_derive(&input).unwrap();
		assert_eq!(aggregate.name, "Cache");
		assert_eq!(aggregate.params, ["T"]);
		let paths: Vec<_> = aggregate.obligations.iter().map(Obligation::path).collect();
		assert_eq!(paths, ["Cache.id", "Cache.type"]);
		assert_eq!(type_name(&aggregate.obligations[1].ty), "Option<T>");
	}

	#[test]
	fn tuple_struct_uses_positions() {
		let input: DeriveInput = parse_quote! { struct Pair(u8, bool); };
		let aggregate = Aggregate::from_derive(&input).unwrap();
		let labels: Vec<_> = aggregate.obligations.iter().map(Obligation::label).collect();
		assert_eq!(labels, ["0", "1"]);
	}

	#[test]
	fn enum_variants_contribute_payload_fields() {
		let input: DeriveInput = parse_quote! {
			enum Event {
				Started,
				Moved { from: u32, to: u32 },
				Tagged(String),
			}
		};
		let aggregate = Aggregate::from_derive(&input).unwrap();
		let paths: Vec<_> = aggregate.obligations.iter().map(Obligation::path).collect();
		assert_eq!(paths, ["Event::Moved.from", "Event::Moved.to", "Event::Tagged.0"]);
		assert_eq!(aggregate.obligations[1].label(), "Moved_to");
	}

	#[test]
	fn zero_fields_yield_no_obligations() {
		let unit: DeriveInput = parse_quote! { struct Marker; };
		assert!(Aggregate::from_derive(&unit).unwrap().obligations.is_empty());

		let empty: DeriveInput = parse_quote! { enum Never {} };
		assert!(Aggregate::from_derive(&empty).unwrap().obligations.is_empty());
	}

	#[test]
	fn unions_are_rejected() {
		let input: DeriveInput = parse_quote! { union Bits { a: u32, b: f32 } };
		let err = Aggregate::from_derive(&input).unwrap_err();
		assert_eq!(err.to_string(), "NonLocalValue cannot be derived for unions");
	}
}
