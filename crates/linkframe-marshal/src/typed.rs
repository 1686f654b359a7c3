//! Statically typed access on top of [`Value`].
//!
//! Implementors pick their own wire format, so `u16` always travels as two
//! bytes and `f64` as eight, while [`Value`] writes use the dynamic defaults.

use crate::error::{MarshalError, Result};
use crate::format::ScalarFormat;
use crate::value::{Value, ValueType};

/// A Rust type with a fixed payload representation.
pub trait Marshal: Sized {
    /// How the type is read back from a buffer.
    fn value_type() -> ValueType;

    /// Scalar format of the type, or of its elements for lists.
    fn scalar_format() -> Option<ScalarFormat> {
        None
    }

    /// Convert to a dynamic value for writing.
    fn to_value(&self) -> Value;

    /// Convert a decoded value back.
    fn from_value(value: Value) -> Result<Self>;
}

fn mismatch(expected: &str, found: &Value) -> MarshalError {
    MarshalError::UnsupportedType(format!("expected {expected}, found {}", found.kind()))
}

macro_rules! marshal_int {
    ($($ty:ty => $format:ident),* $(,)?) => {
        $(
            impl Marshal for $ty {
                fn value_type() -> ValueType {
                    ValueType::Scalar(ScalarFormat::$format)
                }

                fn scalar_format() -> Option<ScalarFormat> {
                    Some(ScalarFormat::$format)
                }

                fn to_value(&self) -> Value {
                    Value::Int(i128::from(*self))
                }

                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::Int(n) => <$ty>::try_from(n).map_err(|_| MarshalError::OutOfRange {
                            value: n.to_string(),
                            format: ScalarFormat::$format.code(),
                        }),
                        other => Err(mismatch("integer", &other)),
                    }
                }
            }

            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Int(i128::from(n))
                }
            }
        )*
    };
}

marshal_int!(
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
);

impl Marshal for f32 {
    fn value_type() -> ValueType {
        ValueType::Float
    }

    fn scalar_format() -> Option<ScalarFormat> {
        Some(ScalarFormat::F32)
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float(f) => Ok(f as f32),
            other => Err(mismatch("float", &other)),
        }
    }
}

impl Marshal for f64 {
    fn value_type() -> ValueType {
        ValueType::Scalar(ScalarFormat::F64)
    }

    fn scalar_format() -> Option<ScalarFormat> {
        Some(ScalarFormat::F64)
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float(f) => Ok(f),
            other => Err(mismatch("float", &other)),
        }
    }
}

impl Marshal for bool {
    fn value_type() -> ValueType {
        ValueType::Bool
    }

    fn scalar_format() -> Option<ScalarFormat> {
        Some(ScalarFormat::Bool)
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch("bool", &other)),
        }
    }
}

impl Marshal for char {
    fn value_type() -> ValueType {
        ValueType::Char
    }

    fn scalar_format() -> Option<ScalarFormat> {
        Some(ScalarFormat::Char)
    }

    fn to_value(&self) -> Value {
        Value::Char(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Char(c) => Ok(c),
            other => Err(mismatch("char", &other)),
        }
    }
}

impl Marshal for String {
    fn value_type() -> ValueType {
        ValueType::Text
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(mismatch("text", &other)),
        }
    }
}

impl Marshal for serde_json::Value {
    fn value_type() -> ValueType {
        ValueType::Json
    }

    fn to_value(&self) -> Value {
        Value::Json(self.clone())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Json(j) => Ok(j),
            other => Err(mismatch("json", &other)),
        }
    }
}

impl<T: Marshal> Marshal for Vec<T> {
    fn value_type() -> ValueType {
        ValueType::List
    }

    fn scalar_format() -> Option<ScalarFormat> {
        T::scalar_format()
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(Marshal::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch("list", &other)),
        }
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f64::from(f))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<serde_json::Value> for Value {
    fn from(j: serde_json::Value) -> Self {
        Value::Json(j)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_order::ByteOrder;
    use crate::value::{read_value, write_value};

    fn roundtrip<T: Marshal>(value: &T, byte_size: Option<usize>) -> T {
        let mut buf = [0u8; 64];
        let order = ByteOrder::LittleEndian;
        let end = write_value(&mut buf, 0, &value.to_value(), order, T::scalar_format()).unwrap();
        let size = byte_size.or(Some(end));
        let decoded = read_value(&buf, T::value_type(), 0, size, T::scalar_format(), order).unwrap();
        T::from_value(decoded).unwrap()
    }

    #[test]
    fn scalars_keep_their_width() {
        let mut buf = [0u8; 8];
        let order = ByteOrder::LittleEndian;
        let end = write_value(&mut buf, 0, &7u16.to_value(), order, u16::scalar_format()).unwrap();
        assert_eq!(end, 2);
        let end = write_value(&mut buf, 0, &7u64.to_value(), order, u64::scalar_format()).unwrap();
        assert_eq!(end, 8);
    }

    #[test]
    fn typed_roundtrips() {
        assert_eq!(roundtrip(&-5i8, None), -5);
        assert_eq!(roundtrip(&40_000u16, None), 40_000);
        assert_eq!(roundtrip(&i64::MIN, None), i64::MIN);
        assert_eq!(roundtrip(&0.25f32, None), 0.25);
        assert_eq!(roundtrip(&1e300f64, None), 1e300);
        assert!(roundtrip(&true, None));
        assert_eq!(roundtrip(&'z', None), 'z');
        assert_eq!(roundtrip(&"hello".to_string(), None), "hello");
        assert_eq!(
            roundtrip(&serde_json::json!({"k": [1, 2]}), None),
            serde_json::json!({"k": [1, 2]})
        );
        assert_eq!(roundtrip(&vec![1u8, 2, 0x7E, 4], None), vec![1, 2, 0x7E, 4]);
        assert_eq!(roundtrip(&vec![-1i16, 300], None), vec![-1, 300]);
    }

    #[test]
    fn conversion_errors() {
        assert!(matches!(
            u8::from_value(Value::Int(256)),
            Err(MarshalError::OutOfRange { format: 'B', .. })
        ));
        assert!(matches!(
            String::from_value(Value::Bool(true)),
            Err(MarshalError::UnsupportedType(_))
        ));
        assert!(Vec::<i32>::from_value(Value::List(vec![Value::Float(1.0)])).is_err());
    }

    #[test]
    fn from_impls() {
        assert_eq!(Value::from(3u8), Value::Int(3));
        assert_eq!(Value::from("x"), Value::Text("x".into()));
        assert_eq!(
            Value::from(vec![1.5f64, 2.5]),
            Value::List(vec![Value::Float(1.5), Value::Float(2.5)])
        );
    }
}
