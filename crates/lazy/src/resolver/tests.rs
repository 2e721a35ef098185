use super::*;
use crate::{Function, Key, LazyOptions, Node, bind, fields};

#[test]
fn test_resolver_kinds() {
	assert_eq!(lazy(|| Ok(1)).resolver_kind(), Some(ResolverKind::Simple));
	assert_eq!(lazy_tree(|_, _| Ok(1)).resolver_kind(), Some(ResolverKind::Contextual));
}

#[test]
fn test_non_resolvers_report_none() {
	let values = [
		Value::Null,
		Value::from(3),
		Value::from("text"),
		Value::from(Node::object()),
		Value::from(Function::new(|_| Value::Null)),
	];
	for value in values {
		assert!(!value.is_resolver(), "{value:?} must not be a resolver");
		assert_eq!(value.resolver_kind(), None);
	}
}

#[test]
fn test_mark_function_as_resolver() {
	let f = Function::new(|args| Value::from(args.len() as i64));

	let simple = Value::from(f.clone()).mark_resolver(ResolverKind::Simple);
	assert_eq!(simple.resolver_kind(), Some(ResolverKind::Simple));

	let contextual = Value::from(f).mark_resolver(ResolverKind::Contextual);
	assert_eq!(contextual.resolver_kind(), Some(ResolverKind::Contextual));
}

/// Tagging an existing resolver hands back the same resolver, kind included.
#[test]
fn test_mark_is_idempotent() {
	let value = lazy(|| Ok("x"));
	let again = value.clone().mark_resolver(ResolverKind::Contextual);

	assert_eq!(value, again);
	assert_eq!(again.resolver_kind(), Some(ResolverKind::Simple));
}

#[test]
fn test_tag_is_not_a_field() {
	let node = Node::from_fields(fields! { "a" => lazy(|| Ok(1)), "b" => 2 });
	assert_eq!(node.keys(), vec![Key::from("a"), Key::from("b")]);
}

#[test]
fn test_marked_contextual_function_receives_views() {
	let f = Function::new(|args| Value::from(args.iter().filter(|arg| arg.as_view().is_some()).count() as i64));
	let node = Node::from_fields(fields! { "views" => Value::from(f).mark_resolver(ResolverKind::Contextual) });
	bind(&node, &LazyOptions::default()).unwrap();

	assert_eq!(node.get("views").unwrap(), Value::Int(2));
}

/// A plain function value survives binding untouched and stays callable.
#[test]
fn test_function_values_are_data() {
	let f = Function::new(|_| Value::from("called"));
	let node = Node::from_fields(fields! { "format" => f.clone() });
	bind(&node, &LazyOptions::default()).unwrap();

	let stored = node.get("format").unwrap();
	assert_eq!(stored, Value::Function(f));
	assert_eq!(stored.as_function().unwrap().call(&[]), "called");
}
