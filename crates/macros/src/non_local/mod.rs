use locus_verify::render::render_lines;
use locus_verify::{Aggregate, Cause, Obligation, Registry, RenderOptions, Report, Resolution, Resolver};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote, quote_spanned};
use syn::{DeriveInput, Generics, LitStr, parse_macro_input, parse_quote};

pub fn derive_non_local_value(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);
	expand(&input)
		.unwrap_or_else(syn::Error::into_compile_error)
		.into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
	let aggregate = Aggregate::from_derive(input)?;
	let registry = Registry::shared();
	let resolutions = Resolver::new(registry).resolve_aggregate(&aggregate);

	let mut names: Vec<String> = Vec::new();
	let mut assertions = Vec::new();
	for (obligation, resolution) in aggregate.obligations.iter().zip(resolutions) {
		let name = unique_name(&names, format!("__non_local_{}_{}", aggregate.name, obligation.label()));
		assertions.push(match resolution {
			Resolution::Failed(failure) => {
				let report = Report::new(obligation, failure);
				checked_assertion(&name, obligation, &report, registry)
			}
			Resolution::Certified | Resolution::Deferred(_) => assertion(&name, obligation),
		});
		names.push(name);
	}

	let ident = &input.ident;
	let generics = bounded(&input.generics);
	let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

	let checks = if assertions.is_empty() {
		TokenStream2::new()
	} else {
		quote! {
			const _: () = {
				impl #impl_generics #ident #ty_generics #where_clause {
					#(#assertions)*
				}
			};
		}
	};

	Ok(quote! {
		unsafe impl #impl_generics ::locus::NonLocalValue for #ident #ty_generics #where_clause {}

		#checks
	})
}

/// `A { b_c }` and `A_b { c }` share a label; later ones get a counter.
fn unique_name(taken: &[String], base: String) -> String {
	let mut name = base.clone();
	let mut counter = 1;
	while taken.contains(&name) {
		name = format!("{base}_{counter}");
		counter += 1;
	}
	name
}

/// Adds `T: NonLocalValue` for every type parameter.
fn bounded(generics: &Generics) -> Generics {
	let mut generics = generics.clone();
	let params: Vec<_> = generics.type_params().map(|param| param.ident.clone()).collect();
	let where_clause = generics.make_where_clause();
	for param in params {
		where_clause
			.predicates
			.push(parse_quote!(#param: ::locus::NonLocalValue));
	}
	generics
}

fn assertion(name: &str, obligation: &Obligation) -> TokenStream2 {
	let name = format_ident!("{}", name);
	let ty = &obligation.ty;
	quote_spanned! {obligation.span=>
		#[allow(non_snake_case, dead_code)]
		#[doc(hidden)]
		fn #name() {
			::locus::__private::assert_non_local::<#ty>();
		}
	}
}

/// Assertion for a field type the explicit resolver rejected.
///
/// Matching names by their last segment can misjudge a user type called
/// `Cell` or `Handle`, so the trait solver still decides. When it agrees the
/// error carries the rendered chain; when it does not, the field compiles.
fn checked_assertion(name: &str, obligation: &Obligation, report: &Report, registry: &Registry) -> TokenStream2 {
	let name = format_ident!("{}", name);
	let ty = &obligation.ty;
	let (headline, lines) = render_lines(report, registry, &RenderOptions::default());
	let message = diagnostic_literal(&headline, obligation);
	let label = diagnostic_literal(
		&match report.failure.cause {
			Cause::Local => format!("`{}` holds a task-graph handle", report.failure.root().ty),
			Cause::NoRule | Cause::Unknown => format!("`{}` is not non-local", report.failure.root().ty),
		},
		obligation,
	);
	let notes = lines.iter().map(|line| {
		let line = line.as_str();
		let line = line
			.strip_prefix("note: ")
			.or_else(|| line.strip_prefix("help: "))
			.unwrap_or(line);
		diagnostic_literal(line, obligation)
	});

	quote_spanned! {obligation.span=>
		#[allow(non_snake_case, dead_code)]
		#[doc(hidden)]
		fn #name() {
			#[allow(unused_imports)]
			use ::locus::__private::{ViaLocal as _, ViaNonLocal as _};

			#[diagnostic::on_unimplemented(message = #message, label = #label #(, note = #notes)*)]
			trait NonLocalField {}
			impl NonLocalField for ::locus::__private::NonLocal {}
			fn require<V: NonLocalField>(_: V) {}

			require((&&::locus::__private::Query::<#ty>::new()).verdict());
		}
	}
}

/// Escapes braces, which `on_unimplemented` treats as format arguments.
fn diagnostic_literal(text: &str, obligation: &Obligation) -> LitStr {
	LitStr::new(&text.replace('{', "{{").replace('}', "}}"), obligation.span)
}
