//! Error types for schema compilation, value assignment, resolution, packing and unpacking.

use thiserror::Error;

/// Errors produced when compiling [crate::field::Field]s into a [crate::schema::Schema].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Field name is empty.
    #[error("field name must not be empty")]
    InvalidFieldName,
    /// Two fields share a name.
    #[error("duplicate field name `{0}`")]
    DuplicateFieldName(String),
    /// Fixed array count is zero.
    #[error("field `{0}` has a fixed count of zero")]
    InvalidArrayCount(String),
    /// A count was attached to a scalar or record field.
    #[error("field `{0}` cannot carry a count")]
    UnexpectedCount(String),
    /// A count producer reads a field that is not decoded before it.
    #[error("count of field `{field}` reads `{target}`, which is not an earlier field")]
    ForwardReference { field: String, target: String },
}

/// Errors produced when assigning a value to a [crate::record::Record] field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("unknown field `{0}`")]
    UnknownField(String),
    /// Value shape does not match the field kind.
    #[error("field `{field}` expects {expected}")]
    TypeMismatch { field: String, expected: &'static str },
    /// Value does not fit the declared primitive.
    #[error("value for field `{field}` does not fit {ty}")]
    OutOfRange { field: String, ty: &'static str },
    /// Fixed array assigned with the wrong number of elements.
    #[error("field `{field}` needs {expected} values, but got {actual}")]
    CountMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },
}

/// Errors produced while resolving a field value through its producers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unknown field `{0}`")]
    UnknownField(String),
    /// Field has neither an explicit value nor a default producer.
    #[error("field `{0}` has no value and no default")]
    MissingValue(String),
    /// Sequence field has no way to determine its element count.
    #[error("field `{0}` has no count")]
    MissingCount(String),
    /// Producer chain revisited a field; the cycle starts and ends with that field.
    #[error("cyclic dependency: {}", .0.join(" -> "))]
    CyclicDependency(Vec<String>),
    /// Selector returned another selectable kind.
    #[error("selector for field `{0}` returned an unusable kind")]
    InvalidSelection(String),
    /// A custom producer failed.
    #[error("producer for field `{field}` failed: {reason}")]
    Producer { field: String, reason: String },
    #[error(transparent)]
    Value(#[from] ValueError),
}

/// Errors produced when packing a record into bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// Resolved value does not fit its wire width.
    #[error("value of field `{field}` does not fit {ty}")]
    EncodingOverflow { field: String, ty: &'static str },
    /// Resolved value has the wrong shape for its kind.
    #[error("field `{field}` expects {expected}")]
    TypeMismatch { field: String, expected: &'static str },
    /// Fixed array has the wrong number of elements.
    #[error("field `{field}` needs {expected} values, but got {actual}")]
    CountMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },
    /// Destination buffer is too short.
    #[error("packing needs {needed} bytes of space, but only got {available}")]
    BufferTooSmall { needed: usize, available: usize },
}

/// Errors produced when unpacking bytes into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// Input ends before a field's declared or computed size.
    #[error("field `{field}` needs {needed} bytes, but only {remaining} remain")]
    TruncatedInput {
        field: String,
        needed: usize,
        remaining: usize,
    },
    /// Count producer yielded something that is not a non-negative integer.
    #[error("count for field `{0}` is not a non-negative integer")]
    InvalidCount(String),
    /// Start offset lies beyond the input.
    #[error("offset {offset} is beyond input of {len} bytes")]
    OffsetOutOfBounds { offset: usize, len: usize },
}

impl From<ValueError> for WriteError {
    fn from(value: ValueError) -> Self {
        WriteError::Resolve(ResolveError::Value(value))
    }
}

impl From<ValueError> for ReadError {
    fn from(value: ValueError) -> Self {
        ReadError::Resolve(ResolveError::Value(value))
    }
}
