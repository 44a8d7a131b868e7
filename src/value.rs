//! The value model compared by the differ.
//!
//! Every value is either a primitive, an ordered collection, an
//! insertion-ordered hash, or a structured [`Object`] whose fields keep
//! their declared order. Composite values expose their comparable parts
//! through [`Value::facets`].
//!
//! # Examples
//!
//! ```
//! use valdiff::Value;
//!
//! let person = Value::object("Person", [("name", Value::from("Alice")), ("age", Value::from(30))]);
//! assert_eq!(person.type_name(), "Person");
//! assert_eq!(person.facets().unwrap().len(), 2);
//! ```

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

/// A structured value with a class name and ordered fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub class_name: String,
    pub fields: IndexMap<String, Value>,
}

/// A value that can be compared and inspected.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Symbol(String),
    Array(Vec<Value>),
    Hash(IndexMap<String, Value>),
    Object(Object),
}

/// Identifies a single facet of a composite value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "name", rename_all = "lowercase")]
pub enum FacetKey {
    /// An attribute of a structured object
    Field(String),
    /// A key of a hash
    Key(String),
    /// A position in an array
    Index(usize),
    /// The compared value itself, for values without facets of their own
    Whole,
}

impl fmt::Display for FacetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacetKey::Field(name) | FacetKey::Key(name) => f.write_str(name),
            FacetKey::Index(i) => write!(f, "[{}]", i),
            FacetKey::Whole => f.write_str("self"),
        }
    }
}

impl Value {
    /// Builds a structured object from `(field, value)` pairs, keeping their order.
    pub fn object<K, I>(class_name: impl Into<String>, fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(Object {
            class_name: class_name.into(),
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        })
    }

    /// Builds a hash from `(key, value)` pairs, keeping insertion order.
    pub fn hash<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Hash(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Value::Symbol(name.into())
    }

    /// Short name of the value's type; objects report their class name.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Array(_) => "array",
            Value::Hash(_) => "hash",
            Value::Object(object) => &object.class_name,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// True for arrays, hashes and objects.
    pub fn is_composite(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Hash(_) | Value::Object(_))
    }

    /// Ordered enumeration of the comparable parts of a composite value.
    ///
    /// Returns `None` for primitives, which are compared as opaque scalars.
    pub fn facets(&self) -> Option<Vec<(FacetKey, &Value)>> {
        match self {
            Value::Array(items) => Some(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (FacetKey::Index(i), v))
                    .collect(),
            ),
            Value::Hash(map) => Some(
                map.iter()
                    .map(|(k, v)| (FacetKey::Key(k.clone()), v))
                    .collect(),
            ),
            Value::Object(object) => Some(
                object
                    .fields
                    .iter()
                    .map(|(k, v)| (FacetKey::Field(k.clone()), v))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Value equality: integers and floats compare numerically, hashes ignore
    /// key order, objects must share a class name. `NaN` equals `NaN`.
    pub fn semantic_equals(&self, other: &Value) -> bool {
        self.equals_by(other, |a, b| a == b)
    }

    /// [`Value::semantic_equals`] with a caller-supplied string comparison.
    ///
    /// The walk keeps its own stack, so arbitrarily deep values compare
    /// without recursion.
    pub fn equals_by<'a, F>(&'a self, other: &'a Value, strings_equal: F) -> bool
    where
        F: Fn(&str, &str) -> bool,
    {
        let mut pending = vec![(self, other)];
        while let Some(pair) = pending.pop() {
            let equal = match pair {
                (Value::Nil, Value::Nil) => true,
                (Value::Bool(a), Value::Bool(b)) => a == b,
                (Value::Integer(a), Value::Integer(b)) => a == b,
                (Value::Float(a), Value::Float(b)) => floats_equal(*a, *b),
                (Value::Integer(i), Value::Float(f)) | (Value::Float(f), Value::Integer(i)) => {
                    integer_equals_float(*i, *f)
                }
                (Value::String(a), Value::String(b)) => strings_equal(a, b),
                (Value::Symbol(a), Value::Symbol(b)) => a == b,
                (Value::Array(a), Value::Array(b)) => {
                    pending.extend(a.iter().zip(b.iter()));
                    a.len() == b.len()
                }
                (Value::Hash(a), Value::Hash(b)) => push_entries(a, b, &mut pending),
                (Value::Object(a), Value::Object(b)) => {
                    a.class_name == b.class_name && push_entries(&a.fields, &b.fields, &mut pending)
                }
                _ => false,
            };
            if !equal {
                return false;
            }
        }
        true
    }
}

/// Relative tolerance of a few ulps; non-finite values must match exactly.
fn floats_equal(a: f64, b: f64) -> bool {
    const ULPS: f64 = 4.0;
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    if !a.is_finite() || !b.is_finite() {
        return a == b;
    }
    a == b || (a - b).abs() <= ULPS * f64::EPSILON * a.abs().max(b.abs())
}

/// Exact: the float must hold an integral value that round-trips to `i`.
fn integer_equals_float(i: i64, f: f64) -> bool {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f) && f as i64 == i
}

/// Queues the entry pairs of two maps; false when their key sets differ.
fn push_entries<'a>(
    a: &'a IndexMap<String, Value>,
    b: &'a IndexMap<String, Value>,
    pending: &mut Vec<(&'a Value, &'a Value)>,
) -> bool {
    if a.len() != b.len() {
        return false;
    }
    for (key, value) in a {
        match b.get(key) {
            Some(other) => pending.push((value, other)),
            None => return false,
        }
    }
    true
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Nil, Into::into)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Nil => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(n) => serializer.serialize_i64(*n),
            Value::Float(n) => serializer.serialize_f64(*n),
            Value::String(s) | Value::Symbol(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Hash(map) => serialize_fields(serializer, map),
            Value::Object(object) => serialize_fields(serializer, &object.fields),
        }
    }
}

fn serialize_fields<S: Serializer>(
    serializer: S,
    fields: &IndexMap<String, Value>,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(fields.len()))?;
    for (key, value) in fields {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_name() {
        assert_eq!(Value::Nil.type_name(), "nil");
        assert_eq!(Value::from(1).type_name(), "integer");
        assert_eq!(Value::from(1.5).type_name(), "float");
        assert_eq!(Value::symbol("a").type_name(), "symbol");
        assert_eq!(Value::hash::<&str, _>([]).type_name(), "hash");
        assert_eq!(Value::object::<&str, _>("Person", []).type_name(), "Person");
    }

    #[test]
    fn test_facets_keep_declared_order() {
        let value = Value::object("Point", [("y", Value::from(2)), ("x", Value::from(1))]);
        let keys: Vec<FacetKey> = value
            .facets()
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(
            keys,
            vec![FacetKey::Field("y".into()), FacetKey::Field("x".into())]
        );
    }

    #[test]
    fn test_primitives_have_no_facets() {
        assert!(Value::from("a").facets().is_none());
        assert!(Value::Nil.facets().is_none());
    }

    #[test]
    fn test_semantic_equals_numbers() {
        assert!(Value::from(1).semantic_equals(&Value::from(1.0)));
        assert!(Value::from(0.1 + 0.2).semantic_equals(&Value::from(0.3)));
        assert!(!Value::from(1).semantic_equals(&Value::from(1.1)));
    }

    #[test]
    fn test_small_floats_use_relative_tolerance() {
        assert!(!Value::from(1e-12).semantic_equals(&Value::from(2e-12)));
        assert!(Value::from(1e-300).semantic_equals(&Value::from(1e-300)));
        assert!(!Value::from(f64::INFINITY).semantic_equals(&Value::from(f64::NEG_INFINITY)));
        assert!(Value::from(f64::INFINITY).semantic_equals(&Value::from(f64::INFINITY)));
    }

    #[test]
    fn test_integer_float_comparison_is_exact() {
        let big = Value::Integer(9_007_199_254_740_993);
        assert!(!big.semantic_equals(&Value::Float(9_007_199_254_740_992.0)));
        assert!(!Value::Float(9_007_199_254_740_992.0).semantic_equals(&big));
        assert!(Value::Integer(9_007_199_254_740_992)
            .semantic_equals(&Value::Float(9_007_199_254_740_992.0)));
        assert!(!Value::Integer(i64::MAX).semantic_equals(&Value::Float(9.3e18)));
        assert!(!Value::Integer(1).semantic_equals(&Value::Float(1.5)));
    }

    #[test]
    fn test_nan_equals_nan() {
        let value = Value::hash([("x", Value::Float(f64::NAN))]);
        assert!(value.semantic_equals(&value.clone()));
        assert!(!Value::Float(f64::NAN).semantic_equals(&Value::Float(0.0)));
    }

    #[test]
    fn test_equals_by_custom_strings() {
        let a = Value::from(vec!["A", "b"]);
        let b = Value::from(vec!["a", "B"]);
        assert!(!a.semantic_equals(&b));
        assert!(a.equals_by(&b, |x, y| x.eq_ignore_ascii_case(y)));
    }

    #[test]
    fn test_semantic_equals_deep_values() {
        let nest = |leaf: i32| {
            let mut value = Value::from(leaf);
            for _ in 0..2_000 {
                value = Value::Array(vec![value]);
            }
            value
        };
        let (a, b) = (nest(1), nest(2));
        assert!(a.semantic_equals(&a));
        assert!(!a.semantic_equals(&b));
    }

    #[test]
    fn test_arrays_of_different_length() {
        let a = Value::from(vec![1, 2]);
        let b = Value::from(vec![1, 2, 3]);
        assert!(!a.semantic_equals(&b));
        assert!(!b.semantic_equals(&a));
    }

    #[test]
    fn test_semantic_equals_hash_ignores_order() {
        let a = Value::hash([("a", Value::from(1)), ("b", Value::from(2))]);
        let b = Value::hash([("b", Value::from(2)), ("a", Value::from(1))]);
        assert!(a.semantic_equals(&b));
    }

    #[test]
    fn test_semantic_equals_objects_need_same_class() {
        let a = Value::object("A", [("x", Value::from(1))]);
        let b = Value::object("B", [("x", Value::from(1))]);
        assert!(!a.semantic_equals(&b));
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<i32>), Value::Nil);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }

    #[test]
    fn test_facet_key_display() {
        assert_eq!(FacetKey::Field("name".into()).to_string(), "name");
        assert_eq!(FacetKey::Index(3).to_string(), "[3]");
        assert_eq!(FacetKey::Whole.to_string(), "self");
    }
}
