//! Producers derive a field's value (or element count) from other fields.
//!
//! A [Producer] is a pure function of the record being packed or unpacked. It
//! reads other fields through a [Resolver], which resolves them on demand and
//! detects cycles. Built-in producers cover the usual length-prefix patterns:
//!
//! - [count_of]: element count (or encoded size) of another field, used as a default;
//! - [size_of]: encoded byte length of another field, used as a default;
//! - [counted_by]: integer value of an earlier field, used as a count;
//! - [constant]: a fixed value.

use std::{fmt, sync::Arc};

use crate::{errors::ResolveError, field::FieldKind, resolver::Resolver, value::Value};

type ProduceFn = dyn Fn(&mut Resolver<'_>) -> Result<Value, ResolveError> + Send + Sync;
type SelectFn = dyn Fn(&mut Resolver<'_>) -> Result<FieldKind, ResolveError> + Send + Sync;

/// A derived value attached to a field as its default or its count.
#[derive(Clone)]
pub struct Producer {
    func: Arc<ProduceFn>,
    reads: Vec<String>,
    label: String,
}

impl Producer {
    /// Wraps an arbitrary function. Its reads are unknown to the schema.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&mut Resolver<'_>) -> Result<Value, ResolveError> + Send + Sync + 'static,
    {
        Producer {
            func: Arc::new(func),
            reads: Vec::new(),
            label: "custom".to_string(),
        }
    }

    /// Wraps a function and declares which fields it reads.
    ///
    /// Declared reads let [crate::schema::Schema::compile] reject count
    /// producers that look at fields decoded after the counted one.
    pub fn reading<F>(reads: &[&str], func: F) -> Self
    where
        F: Fn(&mut Resolver<'_>) -> Result<Value, ResolveError> + Send + Sync + 'static,
    {
        Producer {
            func: Arc::new(func),
            reads: reads.iter().map(|s| s.to_string()).collect(),
            label: format!("custom({})", reads.join(", ")),
        }
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        let value = value.into();
        let label = format!("constant({:?})", value);
        Producer {
            func: Arc::new(move |_| Ok(value.clone())),
            reads: Vec::new(),
            label,
        }
    }

    /// Fields this producer declared it reads.
    pub fn reads(&self) -> &[String] {
        &self.reads
    }

    pub fn produce(&self, resolver: &mut Resolver<'_>) -> Result<Value, ResolveError> {
        (self.func)(resolver)
    }

    fn labelled(mut self, label: String) -> Self {
        self.label = label;
        self
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Producer({})", self.label)
    }
}

/// Default producer: number of elements of `name`, or its encoded size when it is not a sequence.
pub fn count_of(name: &str) -> Producer {
    let target = name.to_string();
    Producer::reading(&[name], move |r| r.count_of(&target).map(Value::from))
        .labelled(format!("count_of({})", name))
}

/// Default producer: encoded byte length of `name`.
pub fn size_of(name: &str) -> Producer {
    let target = name.to_string();
    Producer::reading(&[name], move |r| r.size_of(&target).map(Value::from))
        .labelled(format!("size_of({})", name))
}

/// Count producer: the value of the earlier field `name`.
pub fn counted_by(name: &str) -> Producer {
    let target = name.to_string();
    Producer::reading(&[name], move |r| r.get(&target)).labelled(format!("counted_by({})", name))
}

pub fn constant(value: impl Into<Value>) -> Producer {
    Producer::constant(value)
}

/// Chooses the concrete kind of a [FieldKind::Select] field from other fields.
#[derive(Clone)]
pub struct Selector {
    func: Arc<SelectFn>,
}

impl Selector {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&mut Resolver<'_>) -> Result<FieldKind, ResolveError> + Send + Sync + 'static,
    {
        Selector {
            func: Arc::new(func),
        }
    }

    pub fn select(&self, resolver: &mut Resolver<'_>) -> Result<FieldKind, ResolveError> {
        (self.func)(resolver)
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Selector")
    }
}
