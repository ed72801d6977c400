use std::sync::Arc;

use crate::{
    config::{ElementCheck, SchemaConfig},
    errors::{CompileError, ResolveError, ValueError, WriteError},
    field::{Count, Field, FieldKind},
    producer::{Producer, Selector},
    schema::Schema,
    types::{ByteOrder, Class, Primitive},
    value::Value,
    wire::{get_uint, put_uint, sign_extend},
};

/// A field after compilation: byte orders are concrete and counts validated.
#[derive(Debug, Clone)]
pub struct CompiledField {
    pub name: String,
    pub kind: CompiledKind,
    pub default: Option<Producer>,
    pub count: Option<Count>,
}

#[derive(Debug, Clone)]
pub enum CompiledKind {
    Scalar(CompiledScalar),
    Sequence(CompiledScalar),
    Record(Arc<Schema>),
    Select(Selector),
}

impl CompiledKind {
    pub(crate) fn compile(kind: &FieldKind, config: &SchemaConfig) -> Self {
        match kind {
            FieldKind::Scalar(s) => CompiledKind::Scalar(CompiledScalar::compile(s, config)),
            FieldKind::Sequence(s) => CompiledKind::Sequence(CompiledScalar::compile(s, config)),
            FieldKind::Record(schema) => CompiledKind::Record(Arc::clone(schema)),
            FieldKind::Select(selector) => CompiledKind::Select(selector.clone()),
        }
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            CompiledKind::Scalar(s) => s.primitive.name(),
            CompiledKind::Sequence(_) => "an array",
            CompiledKind::Record(_) => "a record of the field's schema",
            CompiledKind::Select(_) => "a selected kind",
        }
    }

    /// Normalizes `value` to this kind without range checks.
    ///
    /// Sequence elements are conformed only under [ElementCheck::Strict].
    pub(crate) fn conform(&self, value: Value, check: ElementCheck) -> Option<Value> {
        match (self, value) {
            (CompiledKind::Scalar(s), value) => s.conform(value),
            (CompiledKind::Sequence(s), Value::Array(values)) => match check {
                ElementCheck::Strict => values
                    .into_iter()
                    .map(|v| s.conform(v))
                    .collect::<Option<Vec<_>>>()
                    .map(Value::Array),
                ElementCheck::Lenient => Some(Value::Array(values)),
            },
            (CompiledKind::Record(schema), Value::Record(record))
                if Arc::ptr_eq(schema, record.schema()) =>
            {
                Some(Value::Record(record))
            }
            (CompiledKind::Select(_), value) => Some(value),
            _ => None,
        }
    }

    /// Checks that an already conformed value fits its wire width.
    pub(crate) fn fits(&self, value: &Value, check: ElementCheck) -> bool {
        match (self, value) {
            (CompiledKind::Scalar(s), value) => s.fits(value),
            (CompiledKind::Sequence(s), Value::Array(values)) => {
                check == ElementCheck::Lenient || values.iter().all(|v| s.fits(v))
            }
            _ => true,
        }
    }
}

impl CompiledField {
    pub(crate) fn compile(field: &Field, config: &SchemaConfig) -> Result<Self, CompileError> {
        if field.name.trim().is_empty() {
            return Err(CompileError::InvalidFieldName);
        }

        match (&field.kind, &field.count) {
            (FieldKind::Scalar(_) | FieldKind::Record(_), Some(_)) => {
                return Err(CompileError::UnexpectedCount(field.name.clone()));
            }
            (_, Some(Count::Fixed(0))) => {
                return Err(CompileError::InvalidArrayCount(field.name.clone()));
            }
            _ => {}
        }

        Ok(CompiledField {
            name: field.name.clone(),
            kind: CompiledKind::compile(&field.kind, config),
            default: field.default.clone(),
            count: field.count.clone(),
        })
    }

    /// Validates and normalizes an explicitly assigned value.
    pub(crate) fn accept(&self, value: Value, check: ElementCheck) -> Result<Value, ValueError> {
        let value = self
            .kind
            .conform(value, check)
            .ok_or_else(|| ValueError::TypeMismatch {
                field: self.name.clone(),
                expected: self.kind.describe(),
            })?;

        if !self.kind.fits(&value, check) {
            return Err(ValueError::OutOfRange {
                field: self.name.clone(),
                ty: self.kind.describe_element(),
            });
        }

        if let (Some(Count::Fixed(expected)), Value::Array(values)) = (&self.count, &value) {
            if values.len() != *expected {
                return Err(ValueError::CountMismatch {
                    field: self.name.clone(),
                    expected: *expected,
                    actual: values.len(),
                });
            }
        }

        Ok(value)
    }

    /// Normalizes a value computed by a default producer. Range is checked when packing.
    pub(crate) fn conform_produced(
        &self,
        value: Value,
        check: ElementCheck,
    ) -> Result<Value, ResolveError> {
        self.kind.conform(value, check).ok_or_else(|| {
            ResolveError::Value(ValueError::TypeMismatch {
                field: self.name.clone(),
                expected: self.kind.describe(),
            })
        })
    }
}

impl CompiledKind {
    fn describe_element(&self) -> &'static str {
        match self {
            CompiledKind::Scalar(s) | CompiledKind::Sequence(s) => s.primitive.name(),
            other => other.describe(),
        }
    }
}

/// A scalar with a concrete byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompiledScalar {
    pub primitive: Primitive,
    pub byte_order: ByteOrder,
}

impl CompiledScalar {
    pub(crate) fn compile(scalar: &crate::types::Scalar, config: &SchemaConfig) -> Self {
        CompiledScalar {
            primitive: scalar.primitive,
            byte_order: scalar.byte_order.unwrap_or(config.byte_order).concrete(),
        }
    }

    pub fn width(&self) -> usize {
        self.primitive.width()
    }

    /// Normalizes integer sign representation and float width. Returns `None` on a shape mismatch.
    pub(crate) fn conform(&self, value: Value) -> Option<Value> {
        match (self.primitive.class(), value) {
            (Class::Unsigned, Value::I64(v)) if v >= 0 => Some(Value::U64(v as u64)),
            (Class::Signed, Value::U64(v)) if v <= i64::MAX as u64 => Some(Value::I64(v as i64)),
            (Class::Unsigned | Class::Signed, v @ (Value::U64(_) | Value::I64(_))) => Some(v),
            (Class::Float, Value::F32(v)) if self.primitive == Primitive::F64 => {
                Some(Value::F64(f64::from(v)))
            }
            // An f64 beyond f32 range stays wide so the range check rejects it.
            (Class::Float, Value::F64(v)) if self.primitive == Primitive::F32 => {
                Some(narrow(v).map_or(Value::F64(v), Value::F32))
            }
            (Class::Float, v @ (Value::F32(_) | Value::F64(_))) => Some(v),
            _ => None,
        }
    }

    pub(crate) fn fits(&self, value: &Value) -> bool {
        self.bits(value).is_some()
    }

    /// Wire bits of a conformed value, or `None` if it does not fit.
    fn bits(&self, value: &Value) -> Option<u64> {
        match (self.primitive.class(), value) {
            (Class::Unsigned, value) => value
                .as_u64()
                .filter(|v| *v <= self.primitive.unsigned_max()),
            (Class::Signed, value) => {
                let (min, max) = self.primitive.signed_range();
                value
                    .as_i64()
                    .filter(|v| (min..=max).contains(v))
                    .map(|v| v as u64)
            }
            (Class::Float, Value::F32(v)) if self.primitive == Primitive::F32 => {
                Some(u64::from(v.to_bits()))
            }
            (Class::Float, value) => match self.primitive {
                Primitive::F32 => value
                    .as_f64()
                    .and_then(narrow)
                    .map(|v| u64::from(v.to_bits())),
                _ => value.as_f64().map(f64::to_bits),
            },
        }
    }

    pub(crate) fn encode(&self, field: &str, value: &Value, out: &mut Vec<u8>) -> Result<(), WriteError> {
        let conformed = self.conform(value.clone()).ok_or_else(|| WriteError::TypeMismatch {
            field: field.to_string(),
            expected: self.primitive.name(),
        })?;
        let bits = self.bits(&conformed).ok_or_else(|| WriteError::EncodingOverflow {
            field: field.to_string(),
            ty: self.primitive.name(),
        })?;

        put_uint(out, bits, self.width(), self.byte_order);

        Ok(())
    }

    /// Decodes exactly [CompiledScalar::width] bytes.
    pub(crate) fn decode(&self, bytes: &[u8]) -> Value {
        let raw = get_uint(bytes, self.byte_order);

        match self.primitive.class() {
            Class::Unsigned => Value::U64(raw),
            Class::Signed => Value::I64(sign_extend(raw, self.width() * 8)),
            Class::Float if self.primitive == Primitive::F32 => Value::F32(f32::from_bits(raw as u32)),
            Class::Float => Value::F64(f64::from_bits(raw)),
        }
    }
}

/// `v` as an `f32`, unless a finite `v` overflows to infinity.
fn narrow(v: f64) -> Option<f32> {
    let narrowed = v as f32;
    (narrowed.is_finite() || !v.is_finite()).then_some(narrowed)
}
