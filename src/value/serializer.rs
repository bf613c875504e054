use crate::error::OsqlError;
use crate::value::Value;
use serde::Serialize;
use serde::ser::*;

use std::collections::HashMap;

/// Converts any serde-serializable value into a template [`Value`].
///
/// Structs and maps become `Value::Map` (usable as a render value-mapping),
/// sequences and tuples become `Value::List`, `None` becomes `Value::Null`.
pub fn to_value<T: ?Sized + Serialize>(value: &T) -> Result<Value, OsqlError> {
    value.serialize(ValueSerializer)
}

pub struct ValueSerializer;

/// Scalars map one-to-one onto a `Value` variant of the same width.
macro_rules! serialize_scalars {
    ($($method:ident($ty:ty) => $variant:ident),* $(,)?) => {
        $(
            fn $method(self, v: $ty) -> Result<Value, OsqlError> {
                Ok(Value::$variant(v))
            }
        )*
    };
}

impl Serializer for ValueSerializer {
    type Ok = Value;
    type Error = OsqlError;
    type SerializeSeq = ListSerializer;
    type SerializeTuple = ListSerializer;
    type SerializeTupleStruct = ListSerializer;
    type SerializeTupleVariant = ListSerializer;
    type SerializeMap = MapSerializer;
    type SerializeStruct = MapSerializer;
    type SerializeStructVariant = MapSerializer;

    serialize_scalars! {
        serialize_bool(bool) => Bool,
        serialize_i8(i8) => I8,
        serialize_i16(i16) => I16,
        serialize_i32(i32) => I32,
        serialize_i64(i64) => I64,
        serialize_i128(i128) => I128,
        serialize_u8(u8) => U8,
        serialize_u16(u16) => U16,
        serialize_u32(u32) => U32,
        serialize_u64(u64) => U64,
        serialize_u128(u128) => U128,
        serialize_f32(f32) => F32,
        serialize_f64(f64) => F64,
        serialize_char(char) => Char,
    }

    fn serialize_str(self, v: &str) -> Result<Value, OsqlError> {
        Ok(Value::Str(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, OsqlError> {
        Ok(Value::Bytes(v.to_vec()))
    }

    // None, `()` and unit structs all leave a name absent.
    fn serialize_none(self) -> Result<Value, OsqlError> {
        Ok(Value::Null)
    }

    fn serialize_unit(self) -> Result<Value, OsqlError> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, OsqlError> {
        Ok(Value::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value, OsqlError> {
        value.serialize(self)
    }

    /// Fieldless enum variants bind as their name, e.g. a status column.
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<Value, OsqlError> {
        Ok(Value::Str(variant.to_owned()))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, OsqlError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<Value, OsqlError> {
        value.serialize(self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<ListSerializer, OsqlError> {
        Ok(ListSerializer::with_capacity(len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<ListSerializer, OsqlError> {
        Ok(ListSerializer::with_capacity(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<ListSerializer, OsqlError> {
        Ok(ListSerializer::with_capacity(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        len: usize,
    ) -> Result<ListSerializer, OsqlError> {
        Ok(ListSerializer::with_capacity(len))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapSerializer, OsqlError> {
        Ok(MapSerializer::with_capacity(len.unwrap_or(0)))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<MapSerializer, OsqlError> {
        Ok(MapSerializer::with_capacity(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        len: usize,
    ) -> Result<MapSerializer, OsqlError> {
        Ok(MapSerializer::with_capacity(len))
    }
}

/// Collects sequence and tuple elements into a `Value::List`.
pub struct ListSerializer {
    items: Vec<Value>,
}

impl ListSerializer {
    fn with_capacity(len: usize) -> Self {
        Self {
            items: Vec::with_capacity(len),
        }
    }
}

macro_rules! impl_list_serializer {
    ($($trait:ident :: $method:ident),*) => {
        $(
            impl $trait for ListSerializer {
                type Ok = Value;
                type Error = OsqlError;

                fn $method<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), OsqlError> {
                    self.items.push(value.serialize(ValueSerializer)?);
                    Ok(())
                }

                fn end(self) -> Result<Value, OsqlError> {
                    Ok(Value::List(self.items))
                }
            }
        )*
    };
}

impl_list_serializer!(
    SerializeSeq::serialize_element,
    SerializeTuple::serialize_element,
    SerializeTupleStruct::serialize_field,
    SerializeTupleVariant::serialize_field
);

/// Collects map entries and struct fields into a `Value::Map` keyed by
/// template name.
pub struct MapSerializer {
    entries: HashMap<String, Value>,
    pending_key: Option<String>,
}

impl MapSerializer {
    fn with_capacity(len: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(len),
            pending_key: None,
        }
    }
}

/// Template names are `[A-Za-z0-9_]+`, so integer and char keys are usable
/// names once printed; anything else cannot be referenced from a template.
fn key_name(key: Value) -> Result<String, OsqlError> {
    match key {
        Value::Str(s) => Ok(s),
        Value::Char(c) => Ok(c.to_string()),
        Value::I8(n) => Ok(n.to_string()),
        Value::I16(n) => Ok(n.to_string()),
        Value::I32(n) => Ok(n.to_string()),
        Value::I64(n) => Ok(n.to_string()),
        Value::I128(n) => Ok(n.to_string()),
        Value::U8(n) => Ok(n.to_string()),
        Value::U16(n) => Ok(n.to_string()),
        Value::U32(n) => Ok(n.to_string()),
        Value::U64(n) => Ok(n.to_string()),
        Value::U128(n) => Ok(n.to_string()),
        other => Err(OsqlError::SerializationError(format!(
            "Map key must be a string or integer, got {}",
            other.type_name()
        ))),
    }
}

impl SerializeMap for MapSerializer {
    type Ok = Value;
    type Error = OsqlError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), OsqlError> {
        self.pending_key = Some(key_name(key.serialize(ValueSerializer)?)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), OsqlError> {
        let key = self.pending_key.take().ok_or_else(|| {
            OsqlError::SerializationError("Map value serialized before its key".to_string())
        })?;
        self.entries.insert(key, value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, OsqlError> {
        Ok(Value::Map(self.entries))
    }
}

macro_rules! impl_struct_serializer {
    ($($trait:ident),*) => {
        $(
            impl $trait for MapSerializer {
                type Ok = Value;
                type Error = OsqlError;

                fn serialize_field<T: ?Sized + Serialize>(
                    &mut self,
                    key: &'static str,
                    value: &T,
                ) -> Result<(), OsqlError> {
                    self.entries
                        .insert(key.to_owned(), value.serialize(ValueSerializer)?);
                    Ok(())
                }

                fn end(self) -> Result<Value, OsqlError> {
                    Ok(Value::Map(self.entries))
                }
            }
        )*
    };
}

impl_struct_serializer!(SerializeStruct, SerializeStructVariant);

#[cfg(test)]
mod tests {
    use super::to_value;
    use crate::value::Value;
    use serde::Serialize;
    use std::collections::{BTreeMap, HashMap};

    /// Unit carries no values at all
    #[test]
    fn test_to_value_unit() {
        assert_eq!(to_value(&()).unwrap(), Value::Null);
    }

    /// Tuple should be converted into multiple values in order
    #[test]
    fn test_to_value_tuple() {
        let values = to_value(&(1, "hello")).unwrap();
        if let Value::List(list) = values {
            assert_eq!(list.len(), 2);
            assert_eq!(list[0], Value::I32(1));
            assert_eq!(list[1], Value::Str("hello".to_string()));
        } else {
            panic!("Expected Value::List, got {:?}", values);
        }
    }

    #[derive(Serialize)]
    enum Status {
        Active,
    }

    #[derive(Serialize)]
    struct Filter {
        id: Option<i64>,
        ids: Vec<u32>,
        name: &'static str,
        status: Status,
    }

    #[test]
    fn test_to_value_struct() {
        let filter = Filter {
            id: None,
            ids: vec![2, 3],
            name: "bob",
            status: Status::Active,
        };
        let value = to_value(&filter).unwrap();
        let Value::Map(map) = value else {
            panic!("Expected Value::Map, got {:?}", value);
        };
        assert_eq!(map.get("id"), Some(&Value::Null));
        assert_eq!(
            map.get("ids"),
            Some(&Value::List(vec![Value::U32(2), Value::U32(3)]))
        );
        assert_eq!(map.get("name"), Some(&Value::Str("bob".to_string())));
        assert_eq!(map.get("status"), Some(&Value::Str("Active".to_string())));
    }

    #[test]
    fn test_integer_map_keys_become_names() {
        let mut m = BTreeMap::new();
        m.insert(1u8, "x");
        let Value::Map(map) = to_value(&m).unwrap() else {
            panic!("Expected Value::Map");
        };
        assert_eq!(map.get("1"), Some(&Value::Str("x".to_string())));
    }

    #[test]
    fn test_float_map_key_is_rejected() {
        let mut m = HashMap::new();
        m.insert("k", 1);
        assert!(to_value(&m).is_ok());

        let pairs = vec![(1.5f64, "x")];
        let err = to_value(&FloatKeyed(pairs)).unwrap_err();
        assert!(err.to_string().contains("float"));
    }

    struct FloatKeyed(Vec<(f64, &'static str)>);

    impl Serialize for FloatKeyed {
        fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
        }
    }
}
