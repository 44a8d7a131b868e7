//! Conversion of any `T: Serialize` into a [`Value`].
//!
//! Structs become [`Value::Object`]s named after the Rust type, with fields in
//! declaration order. Maps become insertion-ordered hashes and sequences
//! become arrays. Enum variants carrying data become objects named
//! `Enum::Variant`.
//!
//! # Examples
//!
//! ```
//! use serde::Serialize;
//! use valdiff::{to_value, Value};
//!
//! #[derive(Serialize)]
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! let value = to_value(&Person { name: "Alice".into(), age: 30 }).unwrap();
//! assert_eq!(value.type_name(), "Person");
//! ```

use crate::error::ValueError;
use crate::value::{Object, Value};
use indexmap::IndexMap;
use serde::ser::{self, Serialize};

/// Serializes `value` into a [`Value`].
pub fn to_value<T>(value: &T) -> Result<Value, ValueError>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer)
}

/// A serde `Serializer` producing [`Value`]s.
pub struct ValueSerializer;

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = ValueError;

    type SerializeSeq = SerializeArray;
    type SerializeTuple = SerializeArray;
    type SerializeTupleStruct = SerializeObject;
    type SerializeTupleVariant = SerializeObject;
    type SerializeMap = SerializeHash;
    type SerializeStruct = SerializeObject;
    type SerializeStructVariant = SerializeObject;

    fn serialize_bool(self, v: bool) -> Result<Value, ValueError> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, ValueError> {
        Ok(Value::Integer(v.into()))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, ValueError> {
        Ok(Value::Integer(v.into()))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, ValueError> {
        Ok(Value::Integer(v.into()))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, ValueError> {
        Ok(Value::Integer(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value, ValueError> {
        Ok(Value::Integer(v.into()))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, ValueError> {
        Ok(Value::Integer(v.into()))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, ValueError> {
        Ok(Value::Integer(v.into()))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, ValueError> {
        // Values beyond i64 keep their magnitude as a float
        Ok(i64::try_from(v).map_or(Value::Float(v as f64), Value::Integer))
    }

    fn serialize_f32(self, v: f32) -> Result<Value, ValueError> {
        Ok(Value::Float(v.into()))
    }

    fn serialize_f64(self, v: f64) -> Result<Value, ValueError> {
        Ok(Value::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<Value, ValueError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, ValueError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, ValueError> {
        Ok(Value::Array(
            v.iter().map(|b| Value::Integer((*b).into())).collect(),
        ))
    }

    fn serialize_none(self) -> Result<Value, ValueError> {
        Ok(Value::Nil)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value, ValueError>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, ValueError> {
        Ok(Value::Nil)
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Value, ValueError> {
        Ok(Value::Object(Object {
            class_name: name.to_string(),
            fields: IndexMap::new(),
        }))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value, ValueError> {
        Ok(Value::Symbol(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value, ValueError>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, ValueError>
    where
        T: ?Sized + Serialize,
    {
        let mut fields = IndexMap::new();
        fields.insert("0".to_string(), to_value(value)?);
        Ok(Value::Object(Object {
            class_name: variant_name(name, variant),
            fields,
        }))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeArray, ValueError> {
        Ok(SerializeArray {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeArray, ValueError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<SerializeObject, ValueError> {
        Ok(SerializeObject::new(name.to_string()))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeObject, ValueError> {
        Ok(SerializeObject::new(variant_name(name, variant)))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeHash, ValueError> {
        Ok(SerializeHash {
            entries: IndexMap::new(),
            next_key: None,
        })
    }

    fn serialize_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<SerializeObject, ValueError> {
        Ok(SerializeObject::new(name.to_string()))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeObject, ValueError> {
        Ok(SerializeObject::new(variant_name(name, variant)))
    }
}

fn variant_name(name: &str, variant: &str) -> String {
    format!("{}::{}", name, variant)
}

/// Converts a serialized map key into the string used by [`Value::Hash`].
fn key_to_string(key: Value) -> Result<String, ValueError> {
    match key {
        Value::String(s) | Value::Symbol(s) => Ok(s),
        Value::Integer(n) => Ok(n.to_string()),
        Value::Float(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(ValueError::KeyMustBeScalar {
            found: other.type_name().to_string(),
        }),
    }
}

pub struct SerializeArray {
    items: Vec<Value>,
}

impl ser::SerializeSeq for SerializeArray {
    type Ok = Value;
    type Error = ValueError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), ValueError>
    where
        T: ?Sized + Serialize,
    {
        self.items.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, ValueError> {
        Ok(Value::Array(self.items))
    }
}

impl ser::SerializeTuple for SerializeArray {
    type Ok = Value;
    type Error = ValueError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), ValueError>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, ValueError> {
        ser::SerializeSeq::end(self)
    }
}

pub struct SerializeHash {
    entries: IndexMap<String, Value>,
    next_key: Option<String>,
}

impl ser::SerializeMap for SerializeHash {
    type Ok = Value;
    type Error = ValueError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), ValueError>
    where
        T: ?Sized + Serialize,
    {
        self.next_key = Some(key_to_string(to_value(key)?)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), ValueError>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| ValueError::Custom("map value serialized before its key".into()))?;
        self.entries.insert(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, ValueError> {
        Ok(Value::Hash(self.entries))
    }
}

/// Collects named or positional fields of a struct-like value.
pub struct SerializeObject {
    class_name: String,
    fields: IndexMap<String, Value>,
}

impl SerializeObject {
    fn new(class_name: String) -> Self {
        Self {
            class_name,
            fields: IndexMap::new(),
        }
    }

    fn push_positional<T>(&mut self, value: &T) -> Result<(), ValueError>
    where
        T: ?Sized + Serialize,
    {
        let index = self.fields.len().to_string();
        self.fields.insert(index, to_value(value)?);
        Ok(())
    }

    fn finish(self) -> Value {
        Value::Object(Object {
            class_name: self.class_name,
            fields: self.fields,
        })
    }
}

impl ser::SerializeStruct for SerializeObject {
    type Ok = Value;
    type Error = ValueError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), ValueError>
    where
        T: ?Sized + Serialize,
    {
        self.fields.insert(key.to_string(), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, ValueError> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for SerializeObject {
    type Ok = Value;
    type Error = ValueError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), ValueError>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeStruct::serialize_field(self, key, value)
    }

    fn end(self) -> Result<Value, ValueError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeObject {
    type Ok = Value;
    type Error = ValueError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), ValueError>
    where
        T: ?Sized + Serialize,
    {
        self.push_positional(value)
    }

    fn end(self) -> Result<Value, ValueError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SerializeObject {
    type Ok = Value;
    type Error = ValueError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), ValueError>
    where
        T: ?Sized + Serialize,
    {
        self.push_positional(value)
    }

    fn end(self) -> Result<Value, ValueError> {
        Ok(self.finish())
    }
}
