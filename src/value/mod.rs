mod serializer;

pub use serializer::{ValueSerializer, to_value};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// A value bound to a template name at render time.
///
/// The value-mapping handed to a render call is a `Value::Map`; bound
/// placeholder values come back out as a `Vec<Value>`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Char(char),
    Str(String),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    F32(f32),
    F64(f64),
    Bytes(Vec<u8>),
    /// Date without time zone
    Date(NaiveDate),

    /// Time without date
    Time(NaiveTime),

    /// Date and time without time zone
    DateTime(NaiveDateTime),

    /// Date and time in UTC
    DateTimeUtc(DateTime<Utc>),

    /// Arbitrary-precision decimal number
    Decimal(Decimal),

    /// Ordered list of values; the only shape a spread insertion accepts
    List(Vec<Value>),

    /// Key-value map (e.g. structs, JSON objects)
    Map(HashMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in type-mismatch messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::Str(_) => "string",
            Value::I8(_)
            | Value::I16(_)
            | Value::I32(_)
            | Value::I64(_)
            | Value::I128(_)
            | Value::U8(_)
            | Value::U16(_)
            | Value::U32(_)
            | Value::U64(_)
            | Value::U128(_) => "integer",
            Value::F32(_) | Value::F64(_) => "float",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) | Value::DateTimeUtc(_) => "datetime",
            Value::Decimal(_) => "decimal",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }
}

/// Any type that can be turned into a template value.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

macro_rules! impl_to_value_primitive {
    ($rust_type:ty, $variant:ident) => {
        impl ToValue for $rust_type {
            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }
        }
    };
}

impl_to_value_primitive!(bool, Bool);
impl_to_value_primitive!(char, Char);
impl_to_value_primitive!(String, Str);

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Str(self.to_string())
    }
}

impl_to_value_primitive!(i8, I8);
impl_to_value_primitive!(i16, I16);
impl_to_value_primitive!(i32, I32);
impl_to_value_primitive!(i64, I64);
impl_to_value_primitive!(i128, I128);
impl_to_value_primitive!(u8, U8);
impl_to_value_primitive!(u16, U16);
impl_to_value_primitive!(u32, U32);
impl_to_value_primitive!(u64, U64);
impl_to_value_primitive!(u128, U128);
impl_to_value_primitive!(f32, F32);
impl_to_value_primitive!(f64, F64);

impl_to_value_primitive!(NaiveDate, Date);
impl_to_value_primitive!(NaiveTime, Time);
impl_to_value_primitive!(NaiveDateTime, DateTime);
impl_to_value_primitive!(DateTime<Utc>, DateTimeUtc);
impl_to_value_primitive!(Decimal, Decimal);

// Allow Value to be passed as argument
impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for () {
    fn to_value(&self) -> Value {
        Value::Null
    }
}

// Blanket implementation for references
impl<T> ToValue for &T
where
    T: ToValue + ?Sized,
{
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

// None is an absent value
impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(|v| v.to_value()).collect())
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(|v| v.to_value()).collect())
    }
}

impl<T: ToValue> ToValue for HashMap<String, T> {
    fn to_value(&self) -> Value {
        let mut map = HashMap::with_capacity(self.len());
        for (k, v) in self {
            map.insert(k.clone(), v.to_value());
        }
        Value::Map(map)
    }
}

impl<T: ToValue> ToValue for HashMap<&str, T> {
    fn to_value(&self) -> Value {
        let mut map = HashMap::with_capacity(self.len());
        for (k, v) in self {
            map.insert((*k).to_string(), v.to_value());
        }
        Value::Map(map)
    }
}
