//! Demand-driven resolution of field values.
//!
//! A [Resolver] walks producer chains recursively: resolving a field runs its
//! default producer, which may resolve further fields through the same
//! resolver. Fields currently being produced sit on a stack; asking for one of
//! them again is a [ResolveError::CyclicDependency] carrying the whole loop.
//! Resolved defaults are cached in the record so later reads and packs see the
//! same value.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::{
    codec,
    compiled::CompiledKind,
    errors::ResolveError,
    field::Count,
    record::Record,
    schema::Schema,
    value::Value,
};

/// What a resolver is allowed to do with unset fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Packing: unset fields run their default producer.
    Encode,
    /// Unpacking: only fields decoded so far can be read.
    Decode,
}

/// Resolves fields of one record on behalf of producers and the codec.
pub struct Resolver<'a> {
    record: &'a mut Record,
    mode: Mode,
    stack: Vec<usize>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(record: &'a mut Record, mode: Mode) -> Self {
        Resolver {
            record,
            mode,
            stack: Vec::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn schema(&self) -> &Arc<Schema> {
        self.record.schema()
    }

    /// Name of the field whose producer or selector is running.
    pub fn current(&self) -> Option<&str> {
        self.stack
            .last()
            .map(|&idx| self.record.schema().fields[idx].name.as_str())
    }

    /// Resolves `name` and returns a copy of its value.
    pub fn get(&mut self, name: &str) -> Result<Value, ResolveError> {
        let idx = self.index_of(name)?;
        self.ensure(idx)?;
        self.value(idx).cloned()
    }

    /// Element count of `name` if it holds an array, otherwise its encoded size.
    pub fn count_of(&mut self, name: &str) -> Result<usize, ResolveError> {
        let idx = self.index_of(name)?;
        self.ensure(idx)?;

        if let Value::Array(values) = self.value(idx)? {
            return Ok(values.len());
        }

        self.encoded_len_at(idx)
    }

    /// Encoded byte length of `name`.
    pub fn size_of(&mut self, name: &str) -> Result<usize, ResolveError> {
        let idx = self.index_of(name)?;
        self.size_at(idx)
    }

    pub(crate) fn size_at(&mut self, idx: usize) -> Result<usize, ResolveError> {
        self.ensure(idx)?;
        self.encoded_len_at(idx)
    }

    /// Makes sure field `idx` holds a value, running its default producer if allowed.
    pub(crate) fn ensure(&mut self, idx: usize) -> Result<(), ResolveError> {
        if self.record.values[idx].is_some() {
            return Ok(());
        }

        let schema = Arc::clone(self.record.schema());
        let field = &schema.fields[idx];

        let producer = match (&field.default, self.mode) {
            (Some(producer), Mode::Encode) => producer,
            _ => return Err(ResolveError::MissingValue(field.name.clone())),
        };

        self.enter(idx)?;
        let produced = producer.produce(self);
        self.stack.pop();

        let value = field.conform_produced(produced?, schema.config().element_check)?;
        trace!(field = %field.name, "resolved default");
        self.record.values[idx] = Some(value);

        Ok(())
    }

    /// Concrete kind of field `idx`, running its selector for [CompiledKind::Select].
    pub(crate) fn kind_of(&mut self, idx: usize) -> Result<CompiledKind, ResolveError> {
        let schema = Arc::clone(self.record.schema());
        let field = &schema.fields[idx];

        let CompiledKind::Select(selector) = &field.kind else {
            return Ok(field.kind.clone());
        };

        self.enter(idx)?;
        let selected = selector.select(self);
        self.stack.pop();

        match CompiledKind::compile(&selected?, schema.config()) {
            CompiledKind::Select(_) => Err(ResolveError::InvalidSelection(field.name.clone())),
            kind => Ok(kind),
        }
    }

    /// Element count of field `idx` from its fixed count or count producer.
    pub(crate) fn element_count(&mut self, idx: usize) -> Result<Value, ResolveError> {
        let schema = Arc::clone(self.record.schema());
        let field = &schema.fields[idx];

        match &field.count {
            Some(Count::Fixed(n)) => Ok(Value::from(*n)),
            Some(Count::Counted(producer)) => {
                self.enter(idx)?;
                let count = producer.produce(self);
                self.stack.pop();
                count
            }
            None => Err(ResolveError::MissingCount(field.name.clone())),
        }
    }

    fn index_of(&self, name: &str) -> Result<usize, ResolveError> {
        self.record
            .schema()
            .index_of(name)
            .ok_or_else(|| ResolveError::UnknownField(name.to_string()))
    }

    fn value(&self, idx: usize) -> Result<&Value, ResolveError> {
        self.record.values[idx]
            .as_ref()
            .ok_or_else(|| ResolveError::MissingValue(self.record.schema().fields[idx].name.clone()))
    }

    fn encoded_len_at(&mut self, idx: usize) -> Result<usize, ResolveError> {
        let kind = self.kind_of(idx)?;
        let schema = Arc::clone(self.record.schema());
        let name = &schema.fields[idx].name;

        let value = self.record.values[idx]
            .as_mut()
            .ok_or_else(|| ResolveError::MissingValue(name.clone()))?;

        codec::encoded_len(&kind, name, value)
    }

    /// Pushes `idx` on the resolution stack, failing if it is already there.
    fn enter(&mut self, idx: usize) -> Result<(), ResolveError> {
        if let Some(pos) = self.stack.iter().position(|&i| i == idx) {
            let fields = &self.record.schema().fields;
            let cycle: Vec<String> = self.stack[pos..]
                .iter()
                .chain(std::iter::once(&idx))
                .map(|&i| fields[i].name.clone())
                .collect();

            debug!(cycle = ?cycle, "cyclic dependency");
            return Err(ResolveError::CyclicDependency(cycle));
        }

        self.stack.push(idx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        field::Field,
        producer::{Producer, constant, count_of, counted_by, size_of},
        types::Scalar,
    };

    use super::*;

    fn length_prefixed() -> Arc<Schema> {
        Arc::new(
            Schema::compile(&[
                Field::scalar("len", Scalar::U8).with_default(count_of("data")),
                Field::sequence("data", Scalar::U16).with_count(counted_by("len")),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_explicit_value_wins() {
        let schema = length_prefixed();
        let mut record = schema.record();
        record.set("len", 9u8).unwrap();
        record.set("data", Value::array([1u16, 2])).unwrap();

        let mut resolver = Resolver::new(&mut record, Mode::Encode);
        assert_eq!(resolver.get("len").unwrap(), Value::U64(9));
    }

    #[test]
    fn test_default_is_cached() {
        let schema = length_prefixed();
        let mut record = schema.record();
        record.set("data", Value::array([1u16, 2, 3])).unwrap();

        let mut resolver = Resolver::new(&mut record, Mode::Encode);
        assert_eq!(resolver.get("len").unwrap(), Value::U64(3));
        assert_eq!(record.get("len"), Some(&Value::U64(3)));
    }

    #[test]
    fn test_size_of_sequence() {
        let schema = length_prefixed();
        let mut record = schema.record();
        record.set("data", Value::array([1u16, 2, 3])).unwrap();

        let mut resolver = Resolver::new(&mut record, Mode::Encode);
        assert_eq!(resolver.size_of("data").unwrap(), 6);
        assert_eq!(resolver.count_of("data").unwrap(), 3);
        assert_eq!(resolver.count_of("len").unwrap(), 1);
    }

    #[test]
    fn test_missing_value() {
        let schema = length_prefixed();
        let mut record = schema.record();

        let mut resolver = Resolver::new(&mut record, Mode::Encode);
        assert_eq!(
            resolver.get("len").unwrap_err(),
            ResolveError::MissingValue("data".to_string())
        );
        assert!(!record.is_set("len"));
    }

    #[test]
    fn test_decode_mode_skips_defaults() {
        let schema = Arc::new(
            Schema::compile(&[Field::scalar("version", Scalar::U8).with_default(constant(1u8))])
                .unwrap(),
        );
        let mut record = schema.record();

        let mut resolver = Resolver::new(&mut record, Mode::Decode);
        assert_eq!(
            resolver.get("version").unwrap_err(),
            ResolveError::MissingValue("version".to_string())
        );

        let mut resolver = Resolver::new(&mut record, Mode::Encode);
        assert_eq!(resolver.get("version").unwrap(), Value::U64(1));
    }

    #[test]
    fn test_two_field_cycle() {
        let schema = Arc::new(
            Schema::compile(&[
                Field::scalar("a", Scalar::U8).with_default(size_of("b")),
                Field::scalar("b", Scalar::U8).with_default(Producer::new(|r| r.get("a"))),
            ])
            .unwrap(),
        );
        let mut record = schema.record();

        let mut resolver = Resolver::new(&mut record, Mode::Encode);
        assert_eq!(
            resolver.get("a").unwrap_err(),
            ResolveError::CyclicDependency(vec!["a".to_string(), "b".to_string(), "a".to_string()])
        );
        assert!(resolver.stack.is_empty());
    }

    #[test]
    fn test_self_cycle() {
        let schema = Arc::new(
            Schema::compile(&[Field::scalar("a", Scalar::U8).with_default(count_of("a"))]).unwrap(),
        );
        let mut record = schema.record();

        let mut resolver = Resolver::new(&mut record, Mode::Encode);
        assert_eq!(
            resolver.get("a").unwrap_err(),
            ResolveError::CyclicDependency(vec!["a".to_string(), "a".to_string()])
        );
    }

    #[test]
    fn test_unknown_field() {
        let schema = length_prefixed();
        let mut record = schema.record();

        let mut resolver = Resolver::new(&mut record, Mode::Encode);
        assert_eq!(
            resolver.get("nope").unwrap_err(),
            ResolveError::UnknownField("nope".to_string())
        );
    }

    #[test]
    fn test_produced_value_shape_checked() {
        let schema = Arc::new(
            Schema::compile(&[Field::scalar("a", Scalar::U8).with_default(constant(vec![1u8]))])
                .unwrap(),
        );
        let mut record = schema.record();

        let mut resolver = Resolver::new(&mut record, Mode::Encode);
        assert!(matches!(
            resolver.get("a").unwrap_err(),
            ResolveError::Value(crate::errors::ValueError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_current_reports_running_field() {
        let schema = Arc::new(
            Schema::compile(&[Field::scalar("a", Scalar::U8).with_default(Producer::new(|r| {
                assert_eq!(r.current(), Some("a"));
                Ok(Value::U64(1))
            }))])
            .unwrap(),
        );
        let mut record = schema.record();

        let mut resolver = Resolver::new(&mut record, Mode::Encode);
        assert_eq!(resolver.current(), None);
        assert_eq!(resolver.get("a").unwrap(), Value::U64(1));
    }
}
