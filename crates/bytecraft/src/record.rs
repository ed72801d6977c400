//! Record: the value container bound to one schema.

use std::{fmt, sync::Arc};

use crate::{
    codec,
    errors::{ResolveError, ValueError, WriteError},
    resolver::{Mode, Resolver},
    schema::Schema,
    value::Value,
};

/// Field values of one record, kept in schema order.
///
/// Fields start unset. They are filled by [Record::set], by default producers
/// while packing or resolving, or by [Schema::unpack].
#[derive(Clone)]
pub struct Record {
    pub(crate) schema: Arc<Schema>,
    pub(crate) values: Vec<Option<Value>>,
}

impl Record {
    pub fn new(schema: &Arc<Schema>) -> Self {
        Record {
            schema: Arc::clone(schema),
            values: vec![None; schema.len()],
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Assigns a value after checking it against the field's type.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ValueError> {
        let idx = self.index_of(name)?;
        let field = &self.schema.fields[idx];
        let value = field.accept(value.into(), self.schema.config().element_check)?;
        self.values[idx] = Some(value);

        Ok(())
    }

    /// Builder-style [Record::set].
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self, ValueError> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Explicitly set (or already resolved) value of `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema
            .index_of(name)
            .and_then(|idx| self.values[idx].as_ref())
    }

    /// Mutable access to a nested record held by `name`.
    pub fn record_mut(&mut self, name: &str) -> Option<&mut Record> {
        let idx = self.schema.index_of(name)?;
        self.values[idx].as_mut()?.as_record_mut()
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Unsets `name`, returning its previous value.
    pub fn clear(&mut self, name: &str) -> Option<Value> {
        let idx = self.schema.index_of(name)?;
        self.values[idx].take()
    }

    /// Resolves `name`, running default producers as needed and keeping their results.
    ///
    /// On failure no default is kept.
    pub fn resolve(&mut self, name: &str) -> Result<Value, ResolveError> {
        self.transact(|record| Resolver::new(record, Mode::Encode).get(name))
    }

    /// Resolves `name` without storing anything in this record.
    pub fn peek(&self, name: &str) -> Result<Value, ResolveError> {
        if let Some(value) = self.get(name) {
            return Ok(value.clone());
        }

        self.clone().resolve(name)
    }

    /// Field names and values in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.schema.names().zip(self.values.iter().map(Option::as_ref))
    }

    /// Encodes the record. Defaults resolved on the way stay set afterwards,
    /// unless packing fails.
    pub fn pack(&mut self) -> Result<Vec<u8>, WriteError> {
        self.transact(|record| {
            let mut out = Vec::new();
            codec::encode_record(record, &mut out)?;
            Ok(out)
        })
    }

    /// Encodes the record into `buf` at `offset`. Returns the number of bytes written.
    ///
    /// Nothing is written, and no default is kept, if the record does not fit.
    pub fn pack_into(&mut self, buf: &mut [u8], offset: usize) -> Result<usize, WriteError> {
        self.transact(|record| {
            let mut out = Vec::new();
            codec::encode_record(record, &mut out)?;
            let available = buf.len().saturating_sub(offset);

            if out.len() > available {
                return Err(WriteError::BufferTooSmall {
                    needed: out.len(),
                    available,
                });
            }

            buf[offset..offset + out.len()].copy_from_slice(&out);
            Ok(out.len())
        })
    }

    /// Packed size in bytes. Resolves defaults the same way [Record::pack] does.
    pub fn size(&mut self) -> Result<usize, ResolveError> {
        self.transact(codec::record_len)
    }

    /// Runs `op`, unsetting again every field (nested ones included) it filled
    /// in if it fails.
    fn transact<T, E>(&mut self, op: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E> {
        let unset = Unset::of(self);
        let result = op(self);

        if result.is_err() {
            unset.restore(self);
        }

        result
    }

    fn index_of(&self, name: &str) -> Result<usize, ValueError> {
        self.schema
            .index_of(name)
            .ok_or_else(|| ValueError::UnknownField(name.to_string()))
    }
}

/// Which fields of a record, and of the records nested in it, hold no value.
struct Unset(Vec<Slot>);

enum Slot {
    Unset,
    Set,
    Nested(Unset),
}

impl Unset {
    fn of(record: &Record) -> Self {
        Unset(
            record
                .values
                .iter()
                .map(|value| match value {
                    None => Slot::Unset,
                    Some(Value::Record(inner)) => Slot::Nested(Unset::of(inner)),
                    Some(_) => Slot::Set,
                })
                .collect(),
        )
    }

    fn restore(&self, record: &mut Record) {
        for (slot, value) in self.0.iter().zip(record.values.iter_mut()) {
            match (slot, value) {
                (Slot::Unset, value) => *value = None,
                (Slot::Nested(inner), Some(Value::Record(nested))) => inner.restore(nested),
                _ => {}
            }
        }
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.schema, &other.schema) && self.values == other.values
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
