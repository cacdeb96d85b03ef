use pretty_assertions::assert_eq;
use syn::{DeriveInput, parse_quote};

use super::*;
use crate::catalog::Catalog;
use crate::obligation::Aggregate;
use crate::resolve::{Resolution, Resolver};

fn report_for(input: DeriveInput, catalog: Option<&Catalog>) -> Report {
	let aggregate = Aggregate::from_derive(&input).unwrap();
	let mut resolver = Resolver::new(Registry::shared()).with_params(&aggregate.params);
	if let Some(catalog) = catalog {
		resolver = resolver.with_catalog(catalog);
	}
	for obligation in &aggregate.obligations {
		if let Resolution::Failed(failure) = resolver.resolve(&obligation.ty) {
			return Report::new(obligation, failure);
		}
	}
	panic!("no failing obligation in {}", aggregate.name);
}

fn options(max_examples: usize, full_chain: bool) -> RenderOptions {
	RenderOptions {
		max_examples,
		full_chain,
	}
}

#[test]
fn nested_handle_collapses_intermediate_requirements() {
	let report = report_for(
		parse_quote! {
			struct Cache {
				id: u64,
				slots: Option<Box<[Handle<i32>; 4]>>,
			}
		},
		None,
	)
	.with_location(Location {
		file: Some("src/lib.rs".into()),
		line: 12,
		column: 5,
	});

	let expected = [
		"error: `Handle<i32>` is not a non-local value",
		"  --> src/lib.rs:12:5",
		"  = field `Cache.slots`: Option<Box<[Handle<i32>; 4]>>",
		"  = note: `Handle<i32>` is a task-graph handle and is never non-local",
		"  = note: required for `[Handle<i32>; 4]` to be non-local",
		"  = note: 1 redundant requirement hidden",
		"  = note: required for `Option<Box<[Handle<i32>; 4]>>` to be non-local",
		"  = help: the following types are non-local:",
		"            ()",
		"            bool",
		"            char",
		"          and 23 others",
		"  = note: this requirement comes from `#[derive(NonLocalValue)]` on `Cache`",
	]
	.join("\n");
	assert_eq!(render(&report, Registry::shared(), &options(3, false)), expected);
}

#[test]
fn full_chain_shows_every_requirement() {
	let report = report_for(
		parse_quote! { struct Cache { slots: Option<Box<[Handle<i32>; 4]>> } },
		None,
	);
	let expected = [
		"`Handle<i32>` is not a non-local value",
		"  = field `Cache.slots`: Option<Box<[Handle<i32>; 4]>>",
		"  = note: `Handle<i32>` is a task-graph handle and is never non-local",
		"  = note: required for `[Handle<i32>; 4]` to be non-local",
		"  = note: required for `Box<[Handle<i32>; 4]>` to be non-local",
		"  = note: required for `Option<Box<[Handle<i32>; 4]>>` to be non-local",
		"  = note: this requirement comes from `#[derive(NonLocalValue)]` on `Cache`",
	]
	.join("\n");
	assert_eq!(render_message(&report, Registry::shared(), &options(0, true)), expected);
}

#[test]
fn lines_match_the_message_layout() {
	let report = report_for(
		parse_quote! { struct Cache { slots: Option<Box<[Handle<i32>; 4]>> } },
		None,
	);
	let (headline, lines) = render_lines(&report, Registry::shared(), &options(0, false));
	assert_eq!(headline, "`Handle<i32>` is not a non-local value");
	assert_eq!(lines.first().map(String::as_str), Some("field `Cache.slots`: Option<Box<[Handle<i32>; 4]>>"));
	let joined: String = lines.iter().map(|line| format!("\n  = {line}")).collect();
	assert_eq!(
		format!("{headline}{joined}"),
		render_message(&report, Registry::shared(), &options(0, false))
	);
}

#[test]
fn hidden_count_is_plural() {
	let report = report_for(
		parse_quote! { struct Deep(Option<Box<Option<Box<Handle<u8>>>>>); },
		None,
	);
	let message = render_message(&report, Registry::shared(), &options(0, false));
	assert!(message.contains("  = note: 2 redundant requirements hidden\n"), "{message}");
	assert!(message.contains("field `Deep.0`"));
}

#[test]
fn missing_rule_names_the_container() {
	let report = report_for(
		parse_quote! {
			enum Event {
				Idle,
				Batch(Option<Vec<Handle<u8>>>),
			}
		},
		None,
	);
	let expected = [
		"`Vec<Handle<u8>>` is not a non-local value",
		"  = field `Event::Batch.0`: Option<Vec<Handle<u8>>>",
		"  = note: no composition rule makes `Vec<Handle<u8>>` non-local",
		"  = note: required for `Option<Vec<Handle<u8>>>` to be non-local",
		"  = help: add a manual `unsafe impl NonLocalValue` for a wrapper, or avoid the shape",
		"  = note: this requirement comes from `#[derive(NonLocalValue)]` on `Event`",
	]
	.join("\n");
	assert_eq!(render_message(&report, Registry::shared(), &options(0, false)), expected);
}

#[test]
fn chain_through_catalogued_aggregates() {
	let mut catalog = Catalog::new();
	catalog.insert_derived(
		Aggregate::from_derive(&parse_quote! {
			struct Inner { slot: Option<Handle<u8>> }
		})
		.unwrap(),
	);
	let report = report_for(
		parse_quote! { struct Outer { inner: Box<Inner> } },
		Some(&catalog),
	);
	let expected = [
		"`Handle<u8>` is not a non-local value",
		"  = field `Outer.inner`: Box<Inner>",
		"  = note: reached through `Inner.slot`",
		"  = note: `Handle<u8>` is a task-graph handle and is never non-local",
		"  = note: required for `Option<Handle<u8>>` to be non-local",
		"  = note: required for `Inner` to be non-local (field `Inner.slot`)",
		"  = note: required for `Box<Inner>` to be non-local",
		"  = note: this requirement comes from `#[derive(NonLocalValue)]` on `Outer`",
	]
	.join("\n");
	assert_eq!(render_message(&report, Registry::shared(), &options(0, true)), expected);
}

#[test]
fn short_example_list_is_not_truncated() {
	let report = report_for(parse_quote! { struct Direct { handle: Handle<u8> } }, None);
	let message = render_message(&report, Registry::shared(), &options(100, false));
	assert!(message.contains("            (A, B, ..)"));
	assert!(!message.contains(" others"));
	assert!(!message.contains("required for"));
}

#[test]
fn location_without_file() {
	let location = Location {
		file: None,
		line: 3,
		column: 9,
	};
	assert_eq!(location.to_string(), "3:9");
}
