use std::cell::Cell;
use std::rc::Rc;

use super::*;
use crate::{LazyOptions, bind, deep_freeze, fields, lazy};

#[test]
fn test_insert_and_get() {
	let node = Node::object();
	assert_eq!(node.insert("name", "Dan").unwrap(), None);
	assert_eq!(node.insert("name", "Sue").unwrap(), Some(Value::from("Dan")));
	assert_eq!(node.get("name").unwrap(), "Sue");
	assert_eq!(node.len(), 1);
}

#[test]
fn test_missing_field_reads_null() {
	let node = Node::object();
	assert_eq!(node.get("nope").unwrap(), Value::Null);
	assert!(!node.contains_key("nope"));
	assert_eq!(node.peek("nope"), None);
}

#[test]
fn test_list_push() {
	let list = Node::list_from(["a", "b"]);
	list.push("c").unwrap();

	assert_eq!(list.shape(), Shape::List);
	assert_eq!(list.keys(), vec![Key::Index(0), Key::Index(1), Key::Index(2)]);
	assert_eq!(list.get(2).unwrap(), "c");
	assert_eq!(list.keys()[2].as_index(), Some(2));
	assert_eq!(Key::from("c").as_index(), None);
	assert_eq!(Node::object().push(1), Err(MutationError::NotAList));
}

#[test]
fn test_record_tag() {
	let record = Node::record(RecordTag::new("DAN", "PEOPLE"));

	assert!(record.is_record());
	assert_eq!(record.id(), Some("DAN"));
	assert_eq!(record.record_type(), Some("PEOPLE"));
	assert!(record.is_empty());
	assert!(!Node::object().is_record());
}

#[test]
fn test_merge_keeps_first_position() {
	let node = Node::from_fields(fields! { "a" => 1, "b" => 2 });
	node.merge(fields! { "b" => 3, "c" => 4 }).unwrap();

	assert_eq!(node.keys(), vec![Key::from("a"), Key::from("b"), Key::from("c")]);
	assert_eq!(node.get("b").unwrap(), Value::Int(3));
}

#[test]
fn test_frozen_rejects_writes() {
	let node = Node::from_fields(fields! { "a" => 1 });
	deep_freeze(&node);

	assert_eq!(node.insert("a", 2), Err(MutationError::Frozen { field: "a".into() }));
	assert_eq!(node.insert("b", 2), Err(MutationError::Frozen { field: "b".into() }));
	assert_eq!(node.get("a").unwrap(), Value::Int(1));
}

#[test]
fn test_sealed_rejects_writes() {
	let node = Node::from_fields(fields! { "a" => 1, "b" => lazy(|| Ok(2)) });
	bind(&node, &LazyOptions::default()).unwrap();

	assert!(node.is_sealed());
	assert_eq!(node.insert("a", 5), Err(MutationError::Sealed { field: "a".into() }));
	assert_eq!(node.insert("c", 5), Err(MutationError::Sealed { field: "c".into() }));
}

#[test]
fn test_pending_slot_rejects_overwrite() {
	let node = Node::from_fields(fields! { "b" => lazy(|| Ok(2)) });
	bind(&node, &LazyOptions::default().freeze(false)).unwrap();

	assert_eq!(node.insert("b", 5), Err(MutationError::Deferred { field: "b".into() }));
	assert_eq!(node.get("b").unwrap(), Value::Int(2));
	assert_eq!(node.insert("b", 5).unwrap(), Some(Value::Int(2)));
}

#[test]
fn test_introspection_does_not_evaluate() {
	let calls = Rc::new(Cell::new(0));
	let counter = calls.clone();
	let node = Node::from_fields(fields! {
		"lazy" => lazy(move || {
			counter.set(counter.get() + 1);
			Ok(1)
		}),
	});
	bind(&node, &LazyOptions::default()).unwrap();

	let _ = format!("{node:?}");
	assert_eq!(node.keys(), vec![Key::from("lazy")]);
	assert_eq!(node.peek("lazy"), Some(FieldState::Deferred(ResolverKind::Simple)));
	assert!(node.is_deferred("lazy"));
	assert_eq!(calls.get(), 0);
}

#[test]
fn test_resolve_all_forces_nested_fields() {
	let calls = Rc::new(Cell::new(0));
	let counter = calls.clone();
	let other = Node::record(RecordTag::new("SUE", "PEOPLE"));
	other.insert("untouched", lazy(|| Ok(0))).unwrap();

	let node = Node::from_fields(fields! {
		"friend" => other.clone(),
		"outer" => lazy(move || {
			counter.set(counter.get() + 1);
			Ok(fields! { "inner" => lazy(|| Ok("deep")) })
		}),
	});
	bind(&node, &LazyOptions::default().freeze(false)).unwrap();
	node.resolve_all().unwrap();

	assert_eq!(calls.get(), 1);
	let outer = node.get("outer").unwrap();
	assert!(!outer.as_node().unwrap().is_deferred("inner"));
	assert_eq!(outer.get("inner").unwrap(), "deep");
	assert!(other.get("untouched").unwrap().is_resolver());
}
