//! Field keys, values, and ordered field sets.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::ResolveError;
use crate::node::Node;
use crate::resolver::{Resolver, ResolverKind};
use crate::view::ContextView;

/// Key of a field on a [`Node`].
///
/// Object nodes use names, list nodes use positions.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Key {
	/// Named field.
	Name(Rc<str>),
	/// List position.
	Index(usize),
}

impl Key {
	/// Returns the name if this is a `Name` key.
	pub fn as_name(&self) -> Option<&str> {
		match self {
			Key::Name(name) => Some(name),
			Key::Index(_) => None,
		}
	}

	/// Returns the position if this is an `Index` key.
	pub fn as_index(&self) -> Option<usize> {
		match self {
			Key::Name(_) => None,
			Key::Index(index) => Some(*index),
		}
	}
}

impl fmt::Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Key::Name(name) => f.write_str(name),
			Key::Index(index) => write!(f, "{index}"),
		}
	}
}

impl fmt::Debug for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Key::Name(name) => write!(f, "{name:?}"),
			Key::Index(index) => write!(f, "[{index}]"),
		}
	}
}

impl From<&str> for Key {
	fn from(v: &str) -> Self {
		Key::Name(Rc::from(v))
	}
}

impl From<String> for Key {
	fn from(v: String) -> Self {
		Key::Name(Rc::from(v))
	}
}

impl From<Rc<str>> for Key {
	fn from(v: Rc<str>) -> Self {
		Key::Name(v)
	}
}

impl From<usize> for Key {
	fn from(v: usize) -> Self {
		Key::Index(v)
	}
}

impl From<&Key> for Key {
	fn from(v: &Key) -> Self {
		v.clone()
	}
}

impl PartialEq<&str> for Key {
	fn eq(&self, other: &&str) -> bool {
		self.as_name() == Some(*other)
	}
}

/// An untagged callable stored as data.
///
/// Functions are ordinary values: the engine never invokes them. Tag one with
/// [`Function::mark`] to turn it into a deferred [`Resolver`].
#[derive(Clone)]
pub struct Function(Rc<dyn Fn(&[Value]) -> Value>);

impl Function {
	/// Wraps a closure as a function value.
	pub fn new<F>(f: F) -> Self
	where
		F: Fn(&[Value]) -> Value + 'static,
	{
		Self(Rc::new(f))
	}

	/// Invokes the function.
	pub fn call(&self, args: &[Value]) -> Value {
		(self.0)(args)
	}

	/// Tags this function as a resolver of the given kind.
	///
	/// A contextual resolver built this way receives the parent and root views
	/// as its two arguments, each wrapped in [`Value::View`].
	pub fn mark(self, kind: ResolverKind) -> Resolver {
		match kind {
			ResolverKind::Simple => Resolver::simple(move || Ok(self.call(&[]))),
			ResolverKind::Contextual => Resolver::contextual(move |parent, root| {
				Ok(self.call(&[Value::View(parent.clone()), Value::View(root.clone())]))
			}),
		}
	}

	/// Returns true if both handles point at the same closure.
	pub fn ptr_eq(&self, other: &Function) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for Function {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Function(..)")
	}
}

/// A field value.
///
/// Scalars compare by value; nodes, functions, resolvers and views compare by
/// identity.
#[derive(Clone, Default)]
pub enum Value {
	/// Absent value. Also what masked and missing fields read as.
	#[default]
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(Rc<str>),
	/// Composite value (object or list), possibly a record.
	Node(Node),
	/// Callable stored as data.
	Function(Function),
	/// Deferred computation standing in for the field's value.
	Resolver(Resolver),
	/// Context view, produced by reading a view's parent key.
	View(ContextView),
}

impl Value {
	/// Returns true for [`Value::Null`].
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// Returns the boolean value if this is a `Bool` variant.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(v) => Some(*v),
			_ => None,
		}
	}

	/// Returns the integer value if this is an `Int` variant.
	pub fn as_int(&self) -> Option<i64> {
		match self {
			Value::Int(v) => Some(*v),
			_ => None,
		}
	}

	/// Returns the float value if this is a `Float` variant.
	pub fn as_float(&self) -> Option<f64> {
		match self {
			Value::Float(v) => Some(*v),
			_ => None,
		}
	}

	/// Returns the string value if this is a `Str` variant.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Str(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_node(&self) -> Option<&Node> {
		match self {
			Value::Node(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_view(&self) -> Option<&ContextView> {
		match self {
			Value::View(v) => Some(v),
			_ => None,
		}
	}

	pub fn as_function(&self) -> Option<&Function> {
		match self {
			Value::Function(v) => Some(v),
			_ => None,
		}
	}

	/// Returns true if this value is a deferred computation.
	///
	/// Plain [`Value::Function`]s are not resolvers.
	pub fn is_resolver(&self) -> bool {
		matches!(self, Value::Resolver(_))
	}

	/// Returns the resolver tag, or `None` for any non-resolver value.
	pub fn resolver_kind(&self) -> Option<ResolverKind> {
		match self {
			Value::Resolver(r) => Some(r.kind()),
			_ => None,
		}
	}

	/// Tags a function value as a resolver.
	///
	/// Resolvers are returned unchanged, so tagging is idempotent. Any other
	/// value is returned as is.
	pub fn mark_resolver(self, kind: ResolverKind) -> Value {
		match self {
			Value::Function(f) => Value::Resolver(f.mark(kind)),
			other => other,
		}
	}

	/// Returns the type name of this value.
	pub fn type_name(&self) -> &'static str {
		match self {
			Value::Null => "null",
			Value::Bool(_) => "bool",
			Value::Int(_) => "int",
			Value::Float(_) => "float",
			Value::Str(_) => "string",
			Value::Node(n) if n.is_record() => "record",
			Value::Node(_) => "node",
			Value::Function(_) => "function",
			Value::Resolver(_) => "resolver",
			Value::View(_) => "view",
		}
	}

	/// Reads a field through a node or view. Every other value yields `Null`.
	pub fn get(&self, key: impl Into<Key>) -> Result<Value, ResolveError> {
		match self {
			Value::Node(node) => node.get(key),
			Value::View(view) => view.get(key),
			_ => Ok(Value::Null),
		}
	}

	/// Follows `path` through nodes and views, stopping at the first absent value.
	pub fn lookup<I, K>(&self, path: I) -> Result<Value, ResolveError>
	where
		I: IntoIterator<Item = K>,
		K: Into<Key>,
	{
		let mut current = self.clone();
		for key in path {
			if current.is_null() {
				break;
			}
			current = current.get(key)?;
		}
		Ok(current)
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Null, Value::Null) => true,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::Int(a), Value::Int(b)) => a == b,
			(Value::Float(a), Value::Float(b)) => a == b,
			(Value::Str(a), Value::Str(b)) => a == b,
			(Value::Node(a), Value::Node(b)) => a.ptr_eq(b),
			(Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
			(Value::Resolver(a), Value::Resolver(b)) => a.ptr_eq(b),
			(Value::View(a), Value::View(b)) => a.ptr_eq(b),
			_ => false,
		}
	}
}

impl PartialEq<&str> for Value {
	fn eq(&self, other: &&str) -> bool {
		self.as_str() == Some(*other)
	}
}

impl fmt::Debug for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Null => f.write_str("null"),
			Value::Bool(v) => write!(f, "{v}"),
			Value::Int(v) => write!(f, "{v}"),
			Value::Float(v) => write!(f, "{v:?}"),
			Value::Str(v) => write!(f, "{v:?}"),
			Value::Node(v) => v.fmt(f),
			Value::Function(v) => v.fmt(f),
			Value::Resolver(v) => v.fmt(f),
			Value::View(v) => v.fmt(f),
		}
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::Bool(v)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Int(v)
	}
}

impl From<i32> for Value {
	fn from(v: i32) -> Self {
		Value::Int(i64::from(v))
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Value::Float(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::Str(Rc::from(v))
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::Str(Rc::from(v))
	}
}

impl From<Rc<str>> for Value {
	fn from(v: Rc<str>) -> Self {
		Value::Str(v)
	}
}

impl From<Node> for Value {
	fn from(v: Node) -> Self {
		Value::Node(v)
	}
}

impl From<&Node> for Value {
	fn from(v: &Node) -> Self {
		Value::Node(v.clone())
	}
}

impl From<Fields> for Value {
	fn from(v: Fields) -> Self {
		Value::Node(Node::from_fields(v))
	}
}

impl From<Function> for Value {
	fn from(v: Function) -> Self {
		Value::Function(v)
	}
}

impl From<Resolver> for Value {
	fn from(v: Resolver) -> Self {
		Value::Resolver(v)
	}
}

impl From<ContextView> for Value {
	fn from(v: ContextView) -> Self {
		Value::View(v)
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(v: Option<T>) -> Self {
		v.map_or(Value::Null, Into::into)
	}
}

impl<T: Into<Value>> From<Vec<T>> for Value {
	fn from(v: Vec<T>) -> Self {
		Value::Node(Node::list_from(v))
	}
}

/// Ordered field set produced by factories and consumed by fillers.
///
/// Inserting an existing key replaces its value in place, so merging keeps
/// first-insertion order.
#[derive(Clone, Debug, Default)]
pub struct Fields(IndexMap<Key, Value>);

impl Fields {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a field and returns the set, for chaining.
	pub fn with(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
		self.insert(key, value);
		self
	}

	/// Adds or replaces a field, returning the previous value.
	pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
		self.0.insert(key.into(), value.into())
	}

	pub fn get(&self, key: impl Into<Key>) -> Option<&Value> {
		self.0.get(&key.into())
	}

	/// Merges `other` over `self`; later values win.
	pub fn merge(mut self, other: Fields) -> Self {
		self.0.extend(other.0);
		self
	}

	pub fn keys(&self) -> impl Iterator<Item = &Key> {
		self.0.keys()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
		self.0.iter()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl IntoIterator for Fields {
	type Item = (Key, Value);
	type IntoIter = indexmap::map::IntoIter<Key, Value>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl<K: Into<Key>, V: Into<Value>> FromIterator<(K, V)> for Fields {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}
