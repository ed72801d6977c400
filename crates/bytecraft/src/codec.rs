//! Pack and unpack drivers.
//!
//! Both directions walk the schema in declaration order. Packing resolves each
//! field (running defaults) and appends its encoding; unpacking reads each
//! field at the cursor, asking count producers and selectors about the fields
//! decoded so far.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::{
    compiled::{CompiledField, CompiledKind},
    errors::{ReadError, ResolveError, ValueError, WriteError},
    field::Count,
    record::Record,
    resolver::{Mode, Resolver},
    schema::Schema,
    value::Value,
    wire::ByteReader,
};

pub(crate) fn encode_record(record: &mut Record, out: &mut Vec<u8>) -> Result<(), WriteError> {
    let schema = Arc::clone(record.schema());
    let start = out.len();

    for (idx, field) in schema.fields.iter().enumerate() {
        let kind = {
            let mut resolver = Resolver::new(record, Mode::Encode);
            resolver.ensure(idx)?;
            resolver.kind_of(idx)?
        };

        trace!(field = %field.name, offset = out.len() - start, "encoding field");

        let value = record.values[idx]
            .as_mut()
            .ok_or_else(|| ResolveError::MissingValue(field.name.clone()))?;
        encode_value(field, &kind, value, out)?;
    }

    debug!(fields = schema.len(), len = out.len() - start, "packed record");

    Ok(())
}

fn encode_value(
    field: &CompiledField,
    kind: &CompiledKind,
    value: &mut Value,
    out: &mut Vec<u8>,
) -> Result<(), WriteError> {
    match (kind, value) {
        (CompiledKind::Scalar(scalar), value) => scalar.encode(&field.name, value, out),
        (CompiledKind::Sequence(element), Value::Array(values)) => {
            if let Some(Count::Fixed(expected)) = &field.count {
                if values.len() != *expected {
                    return Err(WriteError::CountMismatch {
                        field: field.name.clone(),
                        expected: *expected,
                        actual: values.len(),
                    });
                }
            }

            for v in values.iter() {
                element.encode(&field.name, v, out)?;
            }

            Ok(())
        }
        (CompiledKind::Record(schema), Value::Record(inner))
            if Arc::ptr_eq(schema, inner.schema()) =>
        {
            encode_record(inner, out)
        }
        (kind, _) => Err(WriteError::TypeMismatch {
            field: field.name.clone(),
            expected: kind.describe(),
        }),
    }
}

pub(crate) fn decode_record(
    schema: &Arc<Schema>,
    reader: &mut ByteReader<'_>,
) -> Result<Record, ReadError> {
    let mut record = Record::new(schema);

    for (idx, field) in schema.fields.iter().enumerate() {
        trace!(field = %field.name, offset = reader.position(), "decoding field");

        let value = {
            let mut resolver = Resolver::new(&mut record, Mode::Decode);
            decode_value(field, idx, &mut resolver, reader)?
        };
        record.values[idx] = Some(value);
    }

    Ok(record)
}

fn decode_value(
    field: &CompiledField,
    idx: usize,
    resolver: &mut Resolver<'_>,
    reader: &mut ByteReader<'_>,
) -> Result<Value, ReadError> {
    match resolver.kind_of(idx)? {
        CompiledKind::Scalar(scalar) => Ok(scalar.decode(reader.take(&field.name, scalar.width())?)),
        CompiledKind::Sequence(element) => {
            let count = resolver
                .element_count(idx)?
                .as_u64()
                .and_then(|c| usize::try_from(c).ok())
                .ok_or_else(|| ReadError::InvalidCount(field.name.clone()))?;

            let needed = count
                .checked_mul(element.width())
                .ok_or_else(|| ReadError::TruncatedInput {
                    field: field.name.clone(),
                    needed: usize::MAX,
                    remaining: reader.remaining(),
                })?;

            let bytes = reader.take(&field.name, needed)?;
            Ok(Value::Array(
                bytes
                    .chunks_exact(element.width())
                    .map(|chunk| element.decode(chunk))
                    .collect(),
            ))
        }
        CompiledKind::Record(inner) => Ok(Value::Record(decode_record(&inner, reader)?)),
        CompiledKind::Select(_) => Err(ResolveError::InvalidSelection(field.name.clone()).into()),
    }
}

/// Packed size of `record`, resolving defaults along the way.
pub(crate) fn record_len(record: &mut Record) -> Result<usize, ResolveError> {
    let mut total = 0;

    for idx in 0..record.schema().len() {
        total += Resolver::new(record, Mode::Encode).size_at(idx)?;
    }

    Ok(total)
}

/// Encoded length of one resolved value of the concrete `kind`.
pub(crate) fn encoded_len(
    kind: &CompiledKind,
    field: &str,
    value: &mut Value,
) -> Result<usize, ResolveError> {
    match (kind, value) {
        (CompiledKind::Scalar(scalar), _) => Ok(scalar.width()),
        (CompiledKind::Sequence(element), Value::Array(values)) => Ok(values.len() * element.width()),
        (CompiledKind::Record(_), Value::Record(inner)) => record_len(inner),
        (kind, _) => Err(ValueError::TypeMismatch {
            field: field.to_string(),
            expected: kind.describe(),
        }
        .into()),
    }
}
