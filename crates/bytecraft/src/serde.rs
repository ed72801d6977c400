//! JSON-deserializable schema description.
//!
//! These types describe the *shape* of a record layout. They are intended to be
//! constructed from JSON (for example a layout file shipped with your
//! application) and then converted into a [`crate::schema::Schema`] with
//! `Schema::try_from(def)`.
//!
//! Only built-in producers can be described here; layouts needing custom
//! producers or selectors are built in code with [`crate::field::Field`].
//!
//! [`Value`] and [`Record`] also implement `Serialize`, so decoded records can
//! be dumped as JSON objects in field order.

use serde::{Deserialize, Serialize, ser::SerializeMap};

use crate::{record::Record, value::Value};

/// Byte order of a scalar.
#[derive(Debug, Deserialize, Serialize, Default, Clone, Copy)]
pub enum ByteOrderDef {
    Big,
    #[default]
    Little,
    Native,
}

/// Sequence element checking on assignment.
#[derive(Debug, Deserialize, Serialize, Default, Clone, Copy)]
pub enum ElementCheckDef {
    #[default]
    Strict,
    Lenient,
}

/// Schema-wide settings.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct ConfigDef {
    #[serde(default)]
    pub byte_order: ByteOrderDef,
    #[serde(default)]
    pub element_check: ElementCheckDef,
}

/// Top-level schema definition consisting of a list of fields.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchemaDef {
    /// Fields in wire order.
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub config: Option<ConfigDef>,
}

/// Description of a single field.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKindDef,
    /// Value used when the field is left unset while packing.
    #[serde(default)]
    pub default: Option<DefaultDef>,
    /// Element count for sequence fields.
    #[serde(default)]
    pub count: Option<CountDef>,
}

/// Wire type of a field.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "type")]
pub enum FieldKindDef {
    Scalar {
        primitive: PrimitiveDef,
        #[serde(default)]
        byte_order: Option<ByteOrderDef>,
    },
    Sequence {
        element: PrimitiveDef,
        #[serde(default)]
        byte_order: Option<ByteOrderDef>,
    },
    /// Nested record; compiled with the enclosing schema's config.
    Record { fields: Vec<FieldDef> },
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveDef {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

/// Built-in default producers.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub enum DefaultDef {
    /// Element count (or size) of the named field.
    CountOf(String),
    /// Encoded byte length of the named field.
    SizeOf(String),
    Constant(ValueDef),
}

/// Built-in counts.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub enum CountDef {
    Fixed(usize),
    /// Value of the named earlier field.
    CountedBy(String),
}

/// Literal value for constant defaults.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(untagged)]
pub enum ValueDef {
    U64(u64),
    I64(i64),
    F64(f64),
    Array(Vec<ValueDef>),
}

impl From<ValueDef> for Value {
    fn from(value: ValueDef) -> Self {
        match value {
            ValueDef::U64(v) => Value::U64(v),
            ValueDef::I64(v) => Value::I64(v),
            ValueDef::F64(v) => Value::F64(v),
            ValueDef::Array(values) => Value::array(values),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::U64(v) => serializer.serialize_u64(*v),
            Value::I64(v) => serializer.serialize_i64(*v),
            Value::F32(v) => serializer.serialize_f32(*v),
            Value::F64(v) => serializer.serialize_f64(*v),
            Value::Array(values) => values.serialize(serializer),
            Value::Record(record) => record.serialize(serializer),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.schema().len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}
