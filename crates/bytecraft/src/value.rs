//! Materialized field values.

use crate::record::Record;

/// A value held by a [Record] field.
///
/// Integers are stored widened to 64 bits; the field's [crate::types::Primitive]
/// decides the width on the wire. Sequences are arrays of scalar values and
/// nested records carry their own [Record].
///
/// Floats compare by bit pattern, so a NaN equals the same NaN read back from
/// the wire and `0.0` differs from `-0.0`.
#[derive(Debug, Clone)]
pub enum Value {
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
    Array(Vec<Value>),
    Record(Record),
}

impl Value {
    /// Builds an array from anything convertible into values.
    pub fn array<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    /// Returns the value as an unsigned integer if it is a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::U64(v) => Some(v),
            Value::I64(v) => u64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Returns the value as a signed integer if it is an integer within `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I64(v) => Some(v),
            Value::U64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F32(v) => Some(f64::from(v)),
            Value::F64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Collects an array of byte-sized integers into raw bytes.
    pub fn to_bytes(&self) -> Option<Vec<u8>> {
        self.as_array()?
            .iter()
            .map(|v| v.as_u64().and_then(|b| u8::try_from(b).ok()))
            .collect()
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a.to_bits() == b.to_bits(),
            (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            _ => false,
        }
    }
}

macro_rules! value_from {
    ($variant:ident, $target:ty, $($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value as $target)
                }
            }
        )+
    };
}

value_from!(U64, u64, u8, u16, u32, u64, usize);
value_from!(I64, i64, i8, i16, i32, i64);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::F32(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::array(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::array(value.iter().copied())
    }
}

impl<const N: usize> From<[u8; N]> for Value {
    fn from(value: [u8; N]) -> Self {
        Value::array(value)
    }
}

impl<const N: usize> From<&[u8; N]> for Value {
    fn from(value: &[u8; N]) -> Self {
        Value::array(value.iter().copied())
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Record(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_accessors() {
        assert_eq!(Value::from(7u8).as_u64(), Some(7));
        assert_eq!(Value::from(-1i32).as_u64(), None);
        assert_eq!(Value::from(-1i32).as_i64(), Some(-1));
        assert_eq!(Value::U64(u64::MAX).as_i64(), None);
    }

    #[test]
    fn test_bytes_conversion() {
        let value = Value::from(b"deAd");
        assert_eq!(
            value,
            Value::Array(vec![
                Value::U64(0x64),
                Value::U64(0x65),
                Value::U64(0x41),
                Value::U64(0x64)
            ])
        );
        assert_eq!(value.to_bytes(), Some(b"deAd".to_vec()));
    }

    #[test]
    fn test_to_bytes_rejects_wide_elements() {
        let value = Value::array([1u16, 300]);
        assert_eq!(value.to_bytes(), None);
        assert_eq!(Value::U64(1).to_bytes(), None);
    }

    #[test]
    fn test_float_accessor() {
        assert_eq!(Value::from(1.5f32).as_f64(), Some(1.5));
        assert_eq!(Value::U64(1).as_f64(), None);
    }

    #[test]
    fn test_floats_compare_by_bits() {
        assert_eq!(Value::F32(f32::NAN), Value::F32(f32::NAN));
        assert_eq!(Value::F64(f64::NAN), Value::F64(f64::NAN));
        assert_ne!(Value::F64(0.0), Value::F64(-0.0));
        assert_ne!(Value::F32(1.0), Value::F64(1.0));
        assert_eq!(Value::array([1.5f32]), Value::array([1.5f32]));
    }
}
