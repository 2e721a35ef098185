//! Contextual resolvers nested inside a record's plain sub-objects.

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use statica_lazy::{ContextView, LazyOptions, Node, ResolveError, Value, fields, lazy_tree};

use crate::{Registry, RegistryOptions};

fn text(view: &ContextView, path: &[&str]) -> Result<String, ResolveError> {
	let value = view.lookup(path.iter().copied())?;
	Ok(match value {
		Value::Str(s) => s.to_string(),
		other => format!("{other:?}"),
	})
}

fn define_dan(people: &Registry, parent_key: &'static str) -> Node {
	people
		.define("DAN", move |_| {
			Ok(fields! {
				"name" => "Dan",
				"extra" => fields! {
					"id" => "abc",
					"slug" => lazy_tree(|parent, root| {
						Ok(fields! {
							"slug_id" => format!("slugId: {}", text(parent, &["id"])?),
							"root_name" => format!("rootName: {}", text(root, &["name"])?),
						})
					}),
					"deep" => fields! {
						"property" => lazy_tree(move |parent, root| {
							Ok(fields! {
								"id_from_parent" => format!("idFromParent: {}", text(parent, &[parent_key, "id"])?),
								"id_from_root" => format!("idFromRoot: {}", text(root, &["extra", "id"])?),
								"child" => fields! {
									"even" => lazy_tree(move |parent, _| {
										Ok(fields! {
											"deeper" => fields! {
												"id_from_ancestor" => format!(
													"idFromAncestor: {}",
													text(parent, &[parent_key, "id_from_parent"])?,
												),
											},
										})
									}),
								},
							})
						}),
					},
				},
			})
		})
		.unwrap()
}

#[rstest]
#[case::default_parent_key(LazyOptions::default(), "parent")]
#[case::custom_parent_key(LazyOptions::default().parent_key("__parent"), "__parent")]
fn lazy_tree_reads_ancestors_and_root(#[case] options: LazyOptions, #[case] parent_key: &'static str) {
	let people = Registry::with_options("Person", RegistryOptions::new().lazy(options));
	let dan = define_dan(&people, parent_key);
	people.lock().unwrap();

	let dan = Value::from(&dan);
	let read = |path: &[&str]| dan.lookup(path.iter().copied()).unwrap();
	assert_eq!(read(&["extra", "slug", "slug_id"]), "slugId: abc");
	assert_eq!(read(&["extra", "slug", "root_name"]), "rootName: Dan");
	assert_eq!(read(&["extra", "deep", "property", "id_from_parent"]), "idFromParent: abc");
	assert_eq!(read(&["extra", "deep", "property", "id_from_root"]), "idFromRoot: abc");
	assert_eq!(
		read(&["extra", "deep", "property", "child", "even", "deeper", "id_from_ancestor"]),
		"idFromAncestor: idFromParent: abc"
	);
}

#[test]
fn resolved_tree_exports_as_json() {
	let people = Registry::with_options("Person", RegistryOptions::new().lazy(LazyOptions::default()));
	let dan = define_dan(&people, "parent");
	people.lock().unwrap();

	dan.resolve_all().unwrap();
	assert!(dan.is_frozen());
	assert_eq!(
		dan.to_json().unwrap(),
		json!({
			"id": "DAN",
			"name": "Dan",
			"extra": {
				"id": "abc",
				"slug": { "slug_id": "slugId: abc", "root_name": "rootName: Dan" },
				"deep": {
					"property": {
						"id_from_parent": "idFromParent: abc",
						"id_from_root": "idFromRoot: abc",
						"child": {
							"even": { "deeper": { "id_from_ancestor": "idFromAncestor: idFromParent: abc" } },
						},
					},
				},
			},
		})
	);
}

#[test]
fn tree_resolvers_can_be_disabled() {
	let options = LazyOptions::default().allow_tree_resolvers(false);
	let people = Registry::with_options("Person", RegistryOptions::new().lazy(options));
	define_dan(&people, "parent");

	let err = people.lock().unwrap_err();
	assert_eq!(
		err.to_string(),
		"failed to bind record \"DAN\": contextual resolver found on field \"slug\" with tree resolvers disabled"
	);
}
