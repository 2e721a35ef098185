use pretty_assertions::assert_eq;

use super::*;
use crate::{LazyOptions, bind, fields, lazy};

fn parent_key() -> Option<Rc<str>> {
	Some(Rc::from("parent"))
}

fn view(node: &Node, parent: Option<&ContextView>, masked: Option<&str>) -> ContextView {
	ContextView::new(node.clone(), parent.cloned(), masked.map(Key::from), ViewRole::Parent, parent_key())
}

#[test]
fn parent_key_yields_parent_view() {
	let outer = Node::from_fields(fields! { "id" => "outer" });
	let inner = Node::from_fields(fields! { "id" => "inner" });
	let top = view(&outer, None, Some("inner"));
	let below = view(&inner, Some(&top), None);

	let parent = below.get("parent").unwrap();
	assert!(parent.as_view().unwrap().ptr_eq(&top));
	assert_eq!(below.lookup(["parent", "id"]).unwrap(), Value::from("outer"));
	assert_eq!(top.get("parent").unwrap(), Value::Null);
}

#[test]
fn masked_field_reads_null() {
	let node = Node::from_fields(fields! { "id" => "DAN", "location" => "kept" });
	let masked = view(&node, None, Some("location"));

	assert_eq!(masked.get("location").unwrap(), Value::Null);
	assert_eq!(masked.get("id").unwrap(), Value::from("DAN"));
	assert_eq!(node.get("location").unwrap(), Value::from("kept"));
}

#[test]
fn keys_list_parent_first_and_keep_masked_key() {
	let node = Node::from_fields(fields! { "id" => "DAN", "name" => "Dan", "location" => 1 });
	let masked = view(&node, None, Some("location"));

	assert_eq!(
		masked.keys(),
		vec![Key::from("parent"), Key::from("id"), Key::from("name"), Key::from("location")]
	);
	assert_eq!(
		masked.entries().unwrap(),
		vec![
			(Key::from("parent"), Value::Null),
			(Key::from("id"), Value::from("DAN")),
			(Key::from("name"), Value::from("Dan")),
			(Key::from("location"), Value::Null),
		]
	);
}

/// A real field named like the parent key is shadowed by the parent link.
#[test]
fn parent_link_shadows_real_field() {
	let outer = Node::from_fields(fields! { "id" => "outer" });
	let node = Node::from_fields(fields! { "parent" => "real" });
	let top = view(&outer, None, None);
	let below = view(&node, Some(&top), None);

	assert_eq!(below.keys(), vec![Key::from("parent")]);
	assert!(below.get("parent").unwrap().as_view().is_some());
}

#[test]
fn custom_parent_key() {
	let outer = Node::from_fields(fields! { "id" => "outer" });
	let node = Node::from_fields(fields! { "parent" => "real" });
	let top = ContextView::new(outer, None, None, ViewRole::Parent, Some(Rc::from("__parent")));
	let below = ContextView::new(node, Some(top), None, ViewRole::Parent, Some(Rc::from("__parent")));

	assert_eq!(below.get("parent").unwrap(), Value::from("real"));
	assert_eq!(below.lookup(["__parent", "id"]).unwrap(), Value::from("outer"));
	assert_eq!(below.keys(), vec![Key::from("__parent"), Key::from("parent")]);
}

#[test]
fn suppressed_parent_key() {
	let outer = Node::object();
	let node = Node::from_fields(fields! { "id" => "inner" });
	let top = ContextView::new(outer, None, None, ViewRole::Parent, None);
	let below = ContextView::new(node, Some(top), None, ViewRole::Parent, None);

	assert_eq!(below.get("parent").unwrap(), Value::Null);
	assert_eq!(below.keys(), vec![Key::from("id")]);
	assert!(below.parent().is_some());
}

#[test]
fn reads_deferred_fields_through_view() {
	let node = Node::from_fields(fields! { "car" => lazy(|| Ok("Mustang")) });
	bind(&node, &LazyOptions::default()).unwrap();
	let through = ContextView::new(node.clone(), None, None, ViewRole::Root, parent_key());

	assert!(node.is_deferred("car"));
	assert_eq!(through.get("car").unwrap(), Value::from("Mustang"));
	assert!(!node.is_deferred("car"));
	assert_eq!(through.role(), ViewRole::Root);
}

#[test]
fn lookup_stops_at_missing_links() {
	let node = Node::from_fields(fields! { "a" => fields! { "b" => 1 } });
	let top = view(&node, None, None);

	assert_eq!(top.lookup(["a", "b"]).unwrap(), Value::Int(1));
	assert_eq!(top.lookup(["a", "missing", "deeper"]).unwrap(), Value::Null);
	assert_eq!(top.lookup(["parent", "a"]).unwrap(), Value::Null);
}
