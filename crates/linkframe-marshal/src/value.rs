use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use tracing::trace;

use crate::byte_order::ByteOrder;
use crate::error::{MarshalError, Result};
use crate::format::ScalarFormat;

/// A dynamically typed value that can be placed in a payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// UTF-8 text, written without terminator or padding.
    Text(String),
    /// Structured data, written as JSON text.
    Json(serde_json::Value),
    /// Floating point; written as single precision unless overridden.
    Float(f64),
    /// Written as one byte, 0 or 1.
    Bool(bool),
    /// Whole number; written as a 4-byte signed integer unless overridden.
    Int(i128),
    /// Single character, written as one byte.
    Char(char),
    /// Homogeneous sequence, written element by element.
    List(Vec<Value>),
}

impl Value {
    /// Short name of the variant, for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Json(_) => "json",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Char(_) => "char",
            Value::List(_) => "list",
        }
    }

    /// Scalar format used when no override is given.
    pub fn default_format(&self) -> Option<ScalarFormat> {
        match self {
            Value::Float(_) => Some(ScalarFormat::F32),
            Value::Bool(_) => Some(ScalarFormat::Bool),
            Value::Int(_) => Some(ScalarFormat::I32),
            Value::Char(_) => Some(ScalarFormat::Char),
            Value::Text(_) | Value::Json(_) | Value::List(_) => None,
        }
    }

    fn as_integer(&self) -> Option<i128> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(i128::from(*b)),
            _ => None,
        }
    }

    fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            Value::Bool(b) => Some(f64::from(u8::from(*b))),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Json(j) => write!(f, "{j}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// What to decode when reading from a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// UTF-8 text of an explicit byte size.
    Text,
    /// JSON text of an explicit byte size.
    Json,
    /// Single-precision float.
    Float,
    /// One-byte boolean.
    Bool,
    /// 4-byte signed integer.
    Int,
    /// One-byte character.
    Char,
    /// Homogeneous run of scalars; needs a byte size and element format.
    List,
    /// An explicit scalar format.
    Scalar(ScalarFormat),
}

impl ValueType {
    fn scalar_format(self) -> Option<ScalarFormat> {
        match self {
            ValueType::Float => Some(ScalarFormat::F32),
            ValueType::Bool => Some(ScalarFormat::Bool),
            ValueType::Int => Some(ScalarFormat::I32),
            ValueType::Char => Some(ScalarFormat::Char),
            ValueType::Scalar(format) => Some(format),
            ValueType::Text | ValueType::Json | ValueType::List => None,
        }
    }
}

impl FromStr for ValueType {
    type Err = MarshalError;

    /// Accepts a type name (`text`, `json`, `float`, `bool`, `int`, `char`,
    /// `list`) or a single format code.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" | "str" => Ok(ValueType::Text),
            "json" | "dict" => Ok(ValueType::Json),
            "float" => Ok(ValueType::Float),
            "bool" => Ok(ValueType::Bool),
            "int" => Ok(ValueType::Int),
            "char" => Ok(ValueType::Char),
            "list" => Ok(ValueType::List),
            _ => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(code), None) => ScalarFormat::from_code(code).map(ValueType::Scalar),
                    _ => Err(MarshalError::UnsupportedType(s.to_string())),
                }
            }
        }
    }
}

macro_rules! put {
    ($out:expr, $value:expr, $order:expr) => {{
        let value = $value;
        if $order.is_big_endian() {
            $out.extend_from_slice(&value.to_be_bytes());
        } else {
            $out.extend_from_slice(&value.to_le_bytes());
        }
    }};
}

macro_rules! get {
    ($ty:ty, $bytes:expr, $order:expr) => {{
        let mut raw = [0u8; std::mem::size_of::<$ty>()];
        raw.copy_from_slice($bytes);
        if $order.is_big_endian() {
            <$ty>::from_be_bytes(raw)
        } else {
            <$ty>::from_le_bytes(raw)
        }
    }};
}

/// Encode `value` to bytes.
///
/// `format` overrides the default scalar format of numbers, booleans and
/// characters; for lists it applies to every element.
pub fn encode_value(value: &Value, order: ByteOrder, format: Option<ScalarFormat>) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode_into(value, order, format, &mut out)?;
    Ok(out)
}

fn encode_into(
    value: &Value,
    order: ByteOrder,
    format: Option<ScalarFormat>,
    out: &mut Vec<u8>,
) -> Result<()> {
    match (value, format.or_else(|| value.default_format())) {
        (Value::List(items), _) => {
            for item in items {
                encode_into(item, order, format, out)?;
            }
            Ok(())
        }
        (Value::Text(s), None) => {
            out.extend_from_slice(s.as_bytes());
            Ok(())
        }
        (Value::Json(j), None) => {
            serde_json::to_writer(&mut *out, j)?;
            Ok(())
        }
        (_, Some(format)) => encode_scalar(format, value, order, out),
        (_, None) => Err(MarshalError::UnsupportedType(value.kind().to_string())),
    }
}

fn encode_scalar(
    format: ScalarFormat,
    value: &Value,
    order: ByteOrder,
    out: &mut Vec<u8>,
) -> Result<()> {
    match format {
        ScalarFormat::Char => {
            let Value::Char(c) = value else {
                return Err(unsupported(value, format));
            };
            let byte = u8::try_from(u32::from(*c)).map_err(|_| MarshalError::OutOfRange {
                value: format!("{c:?}"),
                format: format.code(),
            })?;
            out.push(byte);
        }
        ScalarFormat::Bool => {
            let truthy = match value {
                Value::Bool(b) => *b,
                Value::Int(n) => *n != 0,
                Value::Float(f) => *f != 0.0,
                _ => return Err(unsupported(value, format)),
            };
            out.push(u8::from(truthy));
        }
        ScalarFormat::I8 => put!(out, integer::<i8>(value, format)?, order),
        ScalarFormat::U8 => put!(out, integer::<u8>(value, format)?, order),
        ScalarFormat::I16 => put!(out, integer::<i16>(value, format)?, order),
        ScalarFormat::U16 => put!(out, integer::<u16>(value, format)?, order),
        ScalarFormat::I32 => put!(out, integer::<i32>(value, format)?, order),
        ScalarFormat::U32 => put!(out, integer::<u32>(value, format)?, order),
        ScalarFormat::I64 => put!(out, integer::<i64>(value, format)?, order),
        ScalarFormat::U64 => put!(out, integer::<u64>(value, format)?, order),
        ScalarFormat::F32 => {
            let f = value.as_float().ok_or_else(|| unsupported(value, format))?;
            put!(out, f as f32, order);
        }
        ScalarFormat::F64 => {
            let f = value.as_float().ok_or_else(|| unsupported(value, format))?;
            put!(out, f, order);
        }
    }
    Ok(())
}

fn integer<T: TryFrom<i128>>(value: &Value, format: ScalarFormat) -> Result<T> {
    let n = value.as_integer().ok_or_else(|| unsupported(value, format))?;
    T::try_from(n).map_err(|_| MarshalError::OutOfRange {
        value: n.to_string(),
        format: format.code(),
    })
}

fn unsupported(value: &Value, format: ScalarFormat) -> MarshalError {
    MarshalError::UnsupportedType(format!("{} as '{}'", value.kind(), format.code()))
}

fn decode_scalar(format: ScalarFormat, bytes: &[u8], order: ByteOrder) -> Value {
    match format {
        ScalarFormat::Char => Value::Char(char::from(bytes[0])),
        ScalarFormat::Bool => Value::Bool(bytes[0] != 0),
        ScalarFormat::I8 => Value::Int(i128::from(get!(i8, bytes, order))),
        ScalarFormat::U8 => Value::Int(i128::from(bytes[0])),
        ScalarFormat::I16 => Value::Int(i128::from(get!(i16, bytes, order))),
        ScalarFormat::U16 => Value::Int(i128::from(get!(u16, bytes, order))),
        ScalarFormat::I32 => Value::Int(i128::from(get!(i32, bytes, order))),
        ScalarFormat::U32 => Value::Int(i128::from(get!(u32, bytes, order))),
        ScalarFormat::I64 => Value::Int(i128::from(get!(i64, bytes, order))),
        ScalarFormat::U64 => Value::Int(i128::from(get!(u64, bytes, order))),
        ScalarFormat::F32 => Value::Float(f64::from(get!(f32, bytes, order))),
        ScalarFormat::F64 => Value::Float(get!(f64, bytes, order)),
    }
}

fn span(capacity: usize, start: usize, len: usize) -> Result<Range<usize>> {
    start
        .checked_add(len)
        .filter(|&end| end <= capacity)
        .map(|end| start..end)
        .ok_or(MarshalError::OutOfBounds {
            start,
            len,
            capacity,
        })
}

/// Copy pre-encoded bytes into `buf` at `start`. Returns the end offset.
pub fn write_raw(buf: &mut [u8], start: usize, bytes: &[u8]) -> Result<usize> {
    let range = span(buf.len(), start, bytes.len())?;
    let end = range.end;
    buf[range].copy_from_slice(bytes);
    Ok(end)
}

/// Encode `value` into `buf` at `start`. Returns the end offset.
///
/// Nothing is written unless the whole value encodes and fits.
pub fn write_value(
    buf: &mut [u8],
    start: usize,
    value: &Value,
    order: ByteOrder,
    format: Option<ScalarFormat>,
) -> Result<usize> {
    let bytes = encode_value(value, order, format)?;
    let end = write_raw(buf, start, &bytes)?;
    trace!(kind = value.kind(), start, end, "value written");
    Ok(end)
}

/// Decode a value of type `ty` from `buf` at `start`.
///
/// Text and JSON read `byte_size` bytes and drop everything from the first
/// zero byte on. Lists read `byte_size` bytes as elements of `list_format`.
/// Scalars read their fixed width and ignore `byte_size`.
pub fn read_value(
    buf: &[u8],
    ty: ValueType,
    start: usize,
    byte_size: Option<usize>,
    list_format: Option<ScalarFormat>,
    order: ByteOrder,
) -> Result<Value> {
    if let Some(format) = ty.scalar_format() {
        let range = span(buf.len(), start, format.size())?;
        return Ok(decode_scalar(format, &buf[range], order));
    }

    let size = byte_size.ok_or(MarshalError::MissingByteSize)?;
    let bytes = &buf[span(buf.len(), start, size)?];

    match ty {
        ValueType::Text => Ok(Value::Text(decode_text(bytes)?.to_string())),
        ValueType::Json => Ok(Value::Json(serde_json::from_str(decode_text(bytes)?)?)),
        _ => {
            let format = list_format.ok_or(MarshalError::MissingListFormat)?;
            let element_size = format.size();
            if size % element_size != 0 {
                return Err(MarshalError::MisalignedList {
                    byte_size: size,
                    element_size,
                });
            }
            Ok(Value::List(
                bytes
                    .chunks_exact(element_size)
                    .map(|chunk| decode_scalar(format, chunk, order))
                    .collect(),
            ))
        }
    }
}

fn decode_text(bytes: &[u8]) -> Result<&str> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    Ok(std::str::from_utf8(&bytes[..end])?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const LE: ByteOrder = ByteOrder::LittleEndian;

    fn written(value: &Value, order: ByteOrder, format: Option<ScalarFormat>) -> Vec<u8> {
        let mut buf = [0u8; 32];
        let end = write_value(&mut buf, 0, value, order, format).unwrap();
        buf[..end].to_vec()
    }

    #[test]
    fn text_roundtrip() {
        let mut buf = [0u8; 254];
        let end = write_value(&mut buf, 0, &Value::Text("test".into()), LE, None).unwrap();
        assert_eq!(end, 4);
        assert_eq!(&buf[..4], b"test");

        let value = read_value(&buf, ValueType::Text, 0, Some(4), None, LE).unwrap();
        assert_eq!(value, Value::Text("test".into()));
    }

    #[test]
    fn text_stops_at_first_zero() {
        let buf = *b"hi\0\0junk";
        let value = read_value(&buf, ValueType::Text, 0, Some(8), None, LE).unwrap();
        assert_eq!(value, Value::Text("hi".into()));
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let buf = [0xC3, 0x28];
        assert!(matches!(
            read_value(&buf, ValueType::Text, 0, Some(2), None, LE),
            Err(MarshalError::Utf8(_))
        ));
    }

    #[test]
    fn json_roundtrip() {
        let doc = json!({"mode": "auto", "gain": 3, "on": true});
        let mut buf = [0u8; 64];
        let end = write_value(&mut buf, 2, &Value::Json(doc.clone()), LE, None).unwrap();

        let value = read_value(&buf, ValueType::Json, 2, Some(end - 2 + 5), None, LE).unwrap();
        assert_eq!(value, Value::Json(doc));
    }

    #[test]
    fn float_is_single_precision() {
        assert_eq!(written(&Value::Float(1.23), LE, None), [0xa4, 0x70, 0x9d, 0x3f]);

        let mut buf = [0u8; 4];
        write_value(&mut buf, 0, &Value::Float(1.23), LE, None).unwrap();
        let Value::Float(back) = read_value(&buf, ValueType::Float, 0, None, None, LE).unwrap()
        else {
            panic!("expected float");
        };
        assert!((back - 1.23).abs() < 1e-6);
    }

    #[test]
    fn int_defaults_to_four_bytes() {
        assert_eq!(written(&Value::Int(123), LE, None), [0x7b, 0, 0, 0]);
        assert_eq!(written(&Value::Int(-1), LE, None), [0xff; 4]);
    }

    #[test]
    fn override_changes_width_and_order() {
        assert_eq!(
            written(&Value::Int(-2), ByteOrder::BigEndian, Some(ScalarFormat::I16)),
            [0xff, 0xfe]
        );
        assert_eq!(
            written(&Value::Int(0x0102), ByteOrder::Network, Some(ScalarFormat::U32)),
            [0, 0, 1, 2]
        );
        assert_eq!(
            written(&Value::Float(1.5), LE, Some(ScalarFormat::F64)),
            1.5f64.to_le_bytes()
        );
    }

    #[test]
    fn out_of_range_integer() {
        let mut buf = [0u8; 8];
        let err = write_value(&mut buf, 0, &Value::Int(1 << 40), LE, None).unwrap_err();
        assert!(matches!(err, MarshalError::OutOfRange { format: 'i', .. }));

        let err = write_value(&mut buf, 0, &Value::Int(-1), LE, Some(ScalarFormat::U8)).unwrap_err();
        assert!(matches!(err, MarshalError::OutOfRange { format: 'B', .. }));
        assert_eq!(buf, [0u8; 8]);
    }

    #[test]
    fn bool_is_one_byte() {
        assert_eq!(written(&Value::Bool(true), LE, None), [1]);
        assert_eq!(written(&Value::Bool(false), LE, None), [0]);
        assert_eq!(written(&Value::Int(7), LE, Some(ScalarFormat::Bool)), [1]);

        let value = read_value(&[2], ValueType::Bool, 0, None, None, LE).unwrap();
        assert_eq!(value, Value::Bool(true));
    }

    #[test]
    fn char_is_one_byte() {
        assert_eq!(written(&Value::Char('A'), LE, None), [b'A']);
        let value = read_value(b"xyz", ValueType::Char, 1, None, None, LE).unwrap();
        assert_eq!(value, Value::Char('y'));

        let mut buf = [0u8; 4];
        assert!(matches!(
            write_value(&mut buf, 0, &Value::Char('€'), LE, None),
            Err(MarshalError::OutOfRange { format: 'c', .. })
        ));
    }

    #[test]
    fn float_cannot_become_integer() {
        let mut buf = [0u8; 4];
        assert!(matches!(
            write_value(&mut buf, 0, &Value::Float(1.5), LE, Some(ScalarFormat::I32)),
            Err(MarshalError::UnsupportedType(_))
        ));
    }

    #[test]
    fn text_with_scalar_override_is_unsupported() {
        let mut buf = [0u8; 4];
        assert!(matches!(
            write_value(&mut buf, 0, &Value::Text("a".into()), LE, Some(ScalarFormat::U8)),
            Err(MarshalError::UnsupportedType(_))
        ));
    }

    #[test]
    fn list_is_written_element_by_element() {
        let list = Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        let mut buf = [0u8; 16];
        let end = write_value(&mut buf, 1, &list, LE, None).unwrap();
        assert_eq!(end, 13);
        assert_eq!(&buf[1..5], &[1, 0, 0, 0]);

        let back = read_value(&buf, ValueType::List, 1, Some(12), Some(ScalarFormat::I32), LE).unwrap();
        assert_eq!(back, list);
    }

    #[test]
    fn list_override_applies_to_elements() {
        let list = Value::List(vec![Value::Int(1), Value::Int(-1)]);
        assert_eq!(
            written(&list, ByteOrder::BigEndian, Some(ScalarFormat::I16)),
            [0, 1, 0xff, 0xff]
        );
    }

    #[test]
    fn list_of_floats() {
        let list = Value::List(vec![Value::Float(0.5), Value::Float(-2.0)]);
        let mut buf = [0u8; 8];
        write_value(&mut buf, 0, &list, LE, None).unwrap();

        let back = read_value(&buf, ValueType::List, 0, Some(8), Some(ScalarFormat::F32), LE).unwrap();
        assert_eq!(back, list);
    }

    #[test]
    fn list_read_requires_format_and_alignment() {
        let buf = [0u8; 8];
        assert!(matches!(
            read_value(&buf, ValueType::List, 0, Some(8), None, LE),
            Err(MarshalError::MissingListFormat)
        ));
        assert!(matches!(
            read_value(&buf, ValueType::List, 0, Some(6), Some(ScalarFormat::I32), LE),
            Err(MarshalError::MisalignedList {
                byte_size: 6,
                element_size: 4
            })
        ));
        assert!(matches!(
            read_value(&buf, ValueType::Text, 0, None, None, LE),
            Err(MarshalError::MissingByteSize)
        ));
    }

    #[test]
    fn failed_list_write_leaves_buffer_untouched() {
        let list = Value::List(vec![Value::Int(1), Value::Text("x".into()), Value::Json(json!(null))]);
        let list = Value::List(vec![list, Value::Int(i128::MAX)]);
        let mut buf = [0xAAu8; 32];
        assert!(write_value(&mut buf, 0, &list, LE, None).is_err());
        assert_eq!(buf, [0xAA; 32]);
    }

    #[test]
    fn bounds_are_checked() {
        let mut buf = [0u8; 4];
        assert!(matches!(
            write_value(&mut buf, 2, &Value::Int(1), LE, None),
            Err(MarshalError::OutOfBounds {
                start: 2,
                len: 4,
                capacity: 4
            })
        ));
        assert!(matches!(
            read_value(&buf, ValueType::Int, 1, None, None, LE),
            Err(MarshalError::OutOfBounds { .. })
        ));
        assert!(matches!(
            write_raw(&mut buf, usize::MAX, &[1]),
            Err(MarshalError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn raw_write_returns_end_offset() {
        let mut buf = [0u8; 8];
        assert_eq!(write_raw(&mut buf, 3, &[9, 8, 7]).unwrap(), 6);
        assert_eq!(buf, [0, 0, 0, 9, 8, 7, 0, 0]);
    }

    #[test]
    fn unsigned_64_bit_full_range() {
        let value = Value::Int(i128::from(u64::MAX));
        let bytes = written(&value, LE, Some(ScalarFormat::U64));
        assert_eq!(bytes, [0xff; 8]);

        let back = read_value(&bytes, ValueType::Scalar(ScalarFormat::U64), 0, None, None, LE).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn native_order_matches_host() {
        let bytes = written(&Value::Int(0x01020304), ByteOrder::Native, None);
        assert_eq!(bytes, 0x01020304i32.to_ne_bytes());
    }

    #[test]
    fn value_type_from_str() {
        assert_eq!("text".parse::<ValueType>().unwrap(), ValueType::Text);
        assert_eq!("dict".parse::<ValueType>().unwrap(), ValueType::Json);
        assert_eq!(
            "H".parse::<ValueType>().unwrap(),
            ValueType::Scalar(ScalarFormat::U16)
        );
        assert!(matches!(
            "e".parse::<ValueType>(),
            Err(MarshalError::UnsupportedType(_))
        ));
        assert!("complex".parse::<ValueType>().is_err());
    }

    #[test]
    fn display_renders_nested_lists() {
        let value = Value::List(vec![Value::Int(1), Value::Text("a".into())]);
        assert_eq!(value.to_string(), "[1, a]");
    }
}
