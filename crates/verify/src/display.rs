//! Compact display of `syn` types, matching how rustc prints them.

use quote::ToTokens;
use syn::{Expr, GenericArgument, PathArguments, ReturnType, Type};

/// Formats a type the way it would appear in a compiler diagnostic.
///
/// `Option < Box < [Handle < i32 > ; 4] > >` becomes `Option<Box<[Handle<i32>; 4]>>`.
pub fn type_name(ty: &Type) -> String {
	let mut out = String::new();
	write_type(&mut out, ty);
	out
}

/// Formats a path (without qualified self) the same way as [`type_name`].
pub fn path_name(path: &syn::Path) -> String {
	let mut out = String::new();
	write_path(&mut out, path);
	out
}

fn write_type(out: &mut String, ty: &Type) {
	match ty {
		Type::Path(path) if path.qself.is_none() => write_path(out, &path.path),
		Type::Reference(reference) => {
			out.push('&');
			if let Some(lifetime) = &reference.lifetime {
				out.push_str(&lifetime.to_string());
				out.push(' ');
			}
			if reference.mutability.is_some() {
				out.push_str("mut ");
			}
			write_type(out, &reference.elem);
		}
		Type::Tuple(tuple) => {
			out.push('(');
			for (i, elem) in tuple.elems.iter().enumerate() {
				if i > 0 {
					out.push_str(", ");
				}
				write_type(out, elem);
			}
			if tuple.elems.len() == 1 {
				out.push(',');
			}
			out.push(')');
		}
		Type::Array(array) => {
			out.push('[');
			write_type(out, &array.elem);
			out.push_str("; ");
			out.push_str(&expr_text(&array.len));
			out.push(']');
		}
		Type::Slice(slice) => {
			out.push('[');
			write_type(out, &slice.elem);
			out.push(']');
		}
		Type::Paren(paren) => {
			out.push('(');
			write_type(out, &paren.elem);
			out.push(')');
		}
		Type::Group(group) => write_type(out, &group.elem),
		Type::Ptr(ptr) => {
			out.push_str(if ptr.mutability.is_some() { "*mut " } else { "*const " });
			write_type(out, &ptr.elem);
		}
		Type::Never(_) => out.push('!'),
		other => out.push_str(&compact(&other.to_token_stream().to_string())),
	}
}

fn write_path(out: &mut String, path: &syn::Path) {
	if path.leading_colon.is_some() {
		out.push_str("::");
	}
	for (i, segment) in path.segments.iter().enumerate() {
		if i > 0 {
			out.push_str("::");
		}
		out.push_str(&segment.ident.to_string());
		match &segment.arguments {
			PathArguments::None => {}
			PathArguments::AngleBracketed(args) => {
				out.push('<');
				for (j, arg) in args.args.iter().enumerate() {
					if j > 0 {
						out.push_str(", ");
					}
					write_argument(out, arg);
				}
				out.push('>');
			}
			PathArguments::Parenthesized(args) => {
				out.push('(');
				for (j, input) in args.inputs.iter().enumerate() {
					if j > 0 {
						out.push_str(", ");
					}
					write_type(out, input);
				}
				out.push(')');
				if let ReturnType::Type(_, ty) = &args.output {
					out.push_str(" -> ");
					write_type(out, ty);
				}
			}
		}
	}
}

fn write_argument(out: &mut String, arg: &GenericArgument) {
	match arg {
		GenericArgument::Lifetime(lifetime) => out.push_str(&lifetime.to_string()),
		GenericArgument::Type(ty) => write_type(out, ty),
		GenericArgument::Const(expr) => out.push_str(&expr_text(expr)),
		GenericArgument::AssocType(assoc) => {
			out.push_str(&assoc.ident.to_string());
			out.push_str(" = ");
			write_type(out, &assoc.ty);
		}
		other => out.push_str(&compact(&other.to_token_stream().to_string())),
	}
}

fn expr_text(expr: &Expr) -> String {
	compact(&expr.to_token_stream().to_string())
}

/// Drops the spaces `proc_macro2` puts around punctuation.
fn compact(tokens: &str) -> String {
	let chars: Vec<char> = tokens.chars().collect();
	let mut out = String::with_capacity(tokens.len());
	for (i, &c) in chars.iter().enumerate() {
		if c == ' ' {
			let prev = out.chars().last();
			let next = chars.get(i + 1).copied();
			let call = next == Some('(') && prev.is_some_and(|p| p.is_alphanumeric() || p == '_');
			if call
				|| matches!(prev, Some('<' | '(' | '[' | '&' | ':'))
				|| matches!(next, Some('<' | '>' | ')' | ']' | ',' | ';' | ':'))
			{
				continue;
			}
		}
		out.push(c);
	}
	out
}
