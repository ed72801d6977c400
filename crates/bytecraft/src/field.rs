//! Definition of logical fields used to build a [crate::schema::Schema].

use std::sync::Arc;

use crate::{
    producer::{Producer, Selector},
    schema::Schema,
    types::Scalar,
};

/// A single named slot in a record layout.
#[derive(Debug, Clone)]
pub struct Field {
    /// Name used to address the value in a [crate::record::Record].
    pub name: String,
    /// Wire type of the field.
    pub kind: FieldKind,
    /// Computes the value when the field is left unset at pack time.
    pub default: Option<Producer>,
    /// Number of elements for sequence fields.
    pub count: Option<Count>,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Field {
            name: name.into(),
            kind,
            default: None,
            count: None,
        }
    }

    pub fn scalar(name: impl Into<String>, scalar: Scalar) -> Self {
        Field::new(name, FieldKind::Scalar(scalar))
    }

    /// Variable-length sequence; attach a count with [Field::with_count] to make it decodable.
    pub fn sequence(name: impl Into<String>, element: Scalar) -> Self {
        Field::new(name, FieldKind::Sequence(element))
    }

    /// Sequence with a fixed number of elements.
    pub fn array(name: impl Into<String>, element: Scalar, count: usize) -> Self {
        Field::sequence(name, element).with_count(Count::Fixed(count))
    }

    pub fn record(name: impl Into<String>, schema: &Arc<Schema>) -> Self {
        Field::new(name, FieldKind::Record(Arc::clone(schema)))
    }

    pub fn select(name: impl Into<String>, selector: Selector) -> Self {
        Field::new(name, FieldKind::Select(selector))
    }

    pub fn with_default(mut self, default: Producer) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_count(mut self, count: impl Into<Count>) -> Self {
        self.count = Some(count.into());
        self
    }
}

/// Wire type of a field.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Single fixed-width value.
    Scalar(Scalar),
    /// Elements of one fixed-width type written back to back.
    Sequence(Scalar),
    /// Nested record encoded in place.
    Record(Arc<Schema>),
    /// Kind chosen at pack/unpack time from other fields.
    Select(Selector),
}

/// Element count of a sequence field.
#[derive(Debug, Clone)]
pub enum Count {
    Fixed(usize),
    /// Computed from earlier fields while unpacking.
    Counted(Producer),
}

impl From<usize> for Count {
    fn from(value: usize) -> Self {
        Count::Fixed(value)
    }
}

impl From<Producer> for Count {
    fn from(value: Producer) -> Self {
        Count::Counted(value)
    }
}

#[cfg(feature = "serde")]
impl Field {
    /// Converts a JSON field definition; nested records are compiled with `config`.
    pub(crate) fn from_def(
        def: crate::serde::FieldDef,
        config: &crate::config::SchemaConfig,
    ) -> Result<Self, crate::errors::CompileError> {
        use crate::{
            producer,
            serde::{ByteOrderDef, CountDef, DefaultDef, FieldKindDef, PrimitiveDef},
        };

        let scalar = |primitive: PrimitiveDef, byte_order: Option<ByteOrderDef>| Scalar {
            primitive: primitive.into(),
            byte_order: byte_order.map(Into::into),
        };

        let kind = match def.kind {
            FieldKindDef::Scalar {
                primitive,
                byte_order,
            } => FieldKind::Scalar(scalar(primitive, byte_order)),
            FieldKindDef::Sequence {
                element,
                byte_order,
            } => FieldKind::Sequence(scalar(element, byte_order)),
            FieldKindDef::Record { fields } => {
                let fields = fields
                    .into_iter()
                    .map(|f| Field::from_def(f, config))
                    .collect::<Result<Vec<_>, _>>()?;
                FieldKind::Record(Arc::new(Schema::compile_with(&fields, *config)?))
            }
        };

        Ok(Field {
            name: def.name,
            kind,
            default: def.default.map(|d| match d {
                DefaultDef::CountOf(target) => producer::count_of(&target),
                DefaultDef::SizeOf(target) => producer::size_of(&target),
                DefaultDef::Constant(value) => producer::constant(crate::value::Value::from(value)),
            }),
            count: def.count.map(|c| match c {
                CountDef::Fixed(n) => Count::Fixed(n),
                CountDef::CountedBy(target) => Count::Counted(producer::counted_by(&target)),
            }),
        })
    }
}
