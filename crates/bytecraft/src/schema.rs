//! Schema: compiled, ordered set of fields used to pack and unpack records.

use std::{collections::HashMap, sync::Arc};

use tracing::debug;

use crate::{
    codec,
    compiled::{CompiledField, CompiledKind},
    config::SchemaConfig,
    errors::{CompileError, ReadError},
    field::{Count, Field},
    record::Record,
    wire::ByteReader,
};

/// A compiled schema. Use [Schema::compile] to build from [Field]s, wrap it in an
/// [Arc], then create records with [Schema::record] or decode them with [Schema::unpack].
///
/// Schemas are immutable and can be shared across threads.
#[derive(Debug)]
pub struct Schema {
    /// Compiled fields in wire order.
    pub fields: Vec<CompiledField>,
    index: HashMap<String, usize>,
    config: SchemaConfig,
}

impl Schema {
    /// Compiles a slice of [Field]s with the default [SchemaConfig].
    pub fn compile(fields: &[Field]) -> Result<Self, CompileError> {
        Self::compile_with(fields, SchemaConfig::default())
    }

    /// Compiles a slice of [Field]s. Fails on empty or duplicate names, misplaced
    /// counts, and count producers that read fields not decoded before theirs.
    pub fn compile_with(fields: &[Field], config: SchemaConfig) -> Result<Self, CompileError> {
        let mut compiled_fields: Vec<CompiledField> = Vec::with_capacity(fields.len());
        let mut index: HashMap<String, usize> = HashMap::with_capacity(fields.len());

        for field in fields {
            let compiled_field = CompiledField::compile(field, &config)?;

            if let Some(Count::Counted(producer)) = &field.count {
                if let Some(target) = producer.reads().iter().find(|r| !index.contains_key(*r)) {
                    return Err(CompileError::ForwardReference {
                        field: field.name.clone(),
                        target: target.clone(),
                    });
                }
            }

            if index.contains_key(&field.name) {
                return Err(CompileError::DuplicateFieldName(field.name.clone()));
            }

            index.insert(field.name.clone(), compiled_fields.len());
            compiled_fields.push(compiled_field);
        }

        debug!(fields = compiled_fields.len(), "compiled schema");

        Ok(Self {
            fields: compiled_fields,
            index,
            config,
        })
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn field(&self, name: &str) -> Option<&CompiledField> {
        self.index_of(name).map(|i| &self.fields[i])
    }

    /// Field names in wire order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Packed size when every field has a fixed width.
    pub fn fixed_size(&self) -> Option<usize> {
        self.fields.iter().try_fold(0, |acc, field| {
            let len = match (&field.kind, &field.count) {
                (CompiledKind::Scalar(s), _) => s.width(),
                (CompiledKind::Sequence(s), Some(Count::Fixed(n))) => s.width() * n,
                (CompiledKind::Record(inner), _) => inner.fixed_size()?,
                _ => return None,
            };
            Some(acc + len)
        })
    }

    /// Creates an empty record of this schema.
    pub fn record(self: &Arc<Self>) -> Record {
        Record::new(self)
    }

    /// Decodes a record from the start of `data`. Trailing bytes are ignored.
    pub fn unpack(self: &Arc<Self>, data: &[u8]) -> Result<Record, ReadError> {
        self.unpack_from(data, 0).map(|(record, _)| record)
    }

    /// Decodes a record starting at `offset`. Returns the record and the number of bytes consumed.
    pub fn unpack_from(
        self: &Arc<Self>,
        data: &[u8],
        offset: usize,
    ) -> Result<(Record, usize), ReadError> {
        let mut reader = ByteReader::at(data, offset)?;
        let record = codec::decode_record(self, &mut reader)?;
        let consumed = reader.position() - offset;

        debug!(offset, consumed, "unpacked record");

        Ok((record, consumed))
    }
}

#[cfg(feature = "serde")]
impl TryFrom<crate::serde::SchemaDef> for Schema {
    type Error = CompileError;

    fn try_from(value: crate::serde::SchemaDef) -> Result<Self, Self::Error> {
        let config: SchemaConfig = value.config.map(Into::into).unwrap_or_default();
        let fields = value
            .fields
            .into_iter()
            .map(|def| Field::from_def(def, &config))
            .collect::<Result<Vec<_>, _>>()?;

        Schema::compile_with(&fields, config)
    }
}
