//! Conversion from any `Serialize` type into a [`Value`].
//!
//! This is the bridge behind [`to_value`](crate::to_value),
//! [`to_vec`](crate::to_vec) and friends: serde drives [`ValueSerializer`],
//! which builds the tree the encoder then writes.
//!
//! The mapping follows the usual JSON conventions:
//!
//! - structs and maps become objects, sequences and tuples become arrays
//! - enum variants are externally tagged (`{"Variant": ...}`), unit variants
//!   are plain strings
//! - `Option::None` and `()` become `null`
//! - integer map keys and boolean map keys are written as strings
//! - 128-bit integers that do not fit in 64 bits become [`Value::BigInt`]
//!
//! ## Examples
//!
//! ```rust
//! use json_gen::{to_value, Value};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! enum Shape {
//!     Circle { r: u32 },
//!     Empty,
//! }
//!
//! let value = to_value(&vec![Shape::Circle { r: 2 }, Shape::Empty]).unwrap();
//! assert_eq!(value.to_string(), r#"[{"Circle":{"r":2}},"Empty"]"#);
//! ```

use crate::{Error, Map, Result, Value};
use serde::{ser, Serialize};

/// Serializer producing a [`Value`] tree.
pub struct ValueSerializer;

pub struct SerializeVec {
    vec: Vec<Value>,
}

pub struct SerializeTupleVariant {
    name: &'static str,
    vec: Vec<Value>,
}

pub struct SerializeMap {
    map: Map,
    current_key: Option<String>,
}

pub struct SerializeStructVariant {
    name: &'static str,
    map: Map,
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Array(v.iter().map(|&b| Value::from(b)).collect()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        let mut map = Map::with_capacity(1);
        map.insert(variant.to_string(), to_value(value)?);
        Ok(Value::Object(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::with_capacity(len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::with_capacity(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::with_capacity(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            name: variant,
            vec: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::with_capacity(len.unwrap_or(0)))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeMap> {
        Ok(SerializeMap::with_capacity(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeStructVariant> {
        Ok(SerializeStructVariant {
            name: variant,
            map: Map::with_capacity(len),
        })
    }
}

impl SerializeVec {
    fn with_capacity(len: usize) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(len),
        }
    }
}

impl SerializeMap {
    fn with_capacity(len: usize) -> Self {
        SerializeMap {
            map: Map::with_capacity(len),
            current_key: None,
        }
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Array(self.vec))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let mut map = Map::with_capacity(1);
        map.insert(self.name.to_string(), Value::Array(self.vec));
        Ok(Value::Object(map))
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.current_key = Some(key_to_string(to_value(key)?)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.map.insert(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Object(self.map))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key.to_string(), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Object(self.map))
    }
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key.to_string(), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let mut outer = Map::with_capacity(1);
        outer.insert(self.name.to_string(), Value::Object(self.map));
        Ok(Value::Object(outer))
    }
}

/// Object keys must be text; numbers and booleans are converted.
fn key_to_string(key: Value) -> Result<String> {
    match key {
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) if n.is_integer() => Ok(n.to_string()),
        Value::BigInt(bi) => Ok(bi.to_string()),
        other => Err(Error::custom(format!(
            "map keys must be strings, found {:?}",
            other
        ))),
    }
}

pub(crate) fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(ValueSerializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Number;
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    enum Event {
        Ping,
        Move(i32, i32),
        Rename(String),
        Resize { w: u32, h: u32 },
    }

    #[test]
    fn test_enum_variants_are_externally_tagged() {
        let events = vec![
            Event::Ping,
            Event::Move(1, -1),
            Event::Rename("x".into()),
            Event::Resize { w: 3, h: 4 },
        ];
        let value = to_value(&events).unwrap();
        assert_eq!(
            value.to_string(),
            r#"["Ping",{"Move":[1,-1]},{"Rename":"x"},{"Resize":{"w":3,"h":4}}]"#
        );
    }

    #[test]
    fn test_non_string_keys() {
        let mut map = BTreeMap::new();
        map.insert(2u8, "two");
        map.insert(10u8, "ten");
        let value = to_value(&map).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["2", "10"]);

        let mut bad = BTreeMap::new();
        bad.insert(vec![1], 1);
        assert!(to_value(&bad).is_err());
    }

    #[test]
    fn test_wide_integers() {
        assert_eq!(
            to_value(&u64::MAX).unwrap(),
            Value::Number(Number::Unsigned(u64::MAX))
        );
        assert!(to_value(&i128::MIN).unwrap().as_bigint().is_some());
        assert_eq!(to_value(&5i128).unwrap(), Value::from(5));
    }

    #[test]
    fn test_tuples_and_options() {
        let value = to_value(&(vec![1u8, 2], None::<bool>, ())).unwrap();
        assert_eq!(value.to_string(), "[[1,2],null,null]");
    }
}
