//! Wire type descriptors: fixed-width primitives and their byte order.

/// Byte order used when a scalar is written to or read from the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Most significant byte first.
    Big,
    /// Least significant byte first.
    #[default]
    Little,
    /// Whatever the host uses.
    Native,
}

impl ByteOrder {
    /// Maps [`ByteOrder::Native`] to the concrete order of the host.
    pub fn concrete(self) -> ByteOrder {
        match self {
            ByteOrder::Native if cfg!(target_endian = "big") => ByteOrder::Big,
            ByteOrder::Native => ByteOrder::Little,
            order => order,
        }
    }
}

/// Fixed-width primitive encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
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

/// Numeric family of a [`Primitive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Unsigned,
    Signed,
    Float,
}

impl Primitive {
    /// Encoded width in bytes.
    pub fn width(self) -> usize {
        match self {
            Primitive::U8 | Primitive::I8 => 1,
            Primitive::U16 | Primitive::I16 => 2,
            Primitive::U32 | Primitive::I32 | Primitive::F32 => 4,
            Primitive::U64 | Primitive::I64 | Primitive::F64 => 8,
        }
    }

    pub fn class(self) -> Class {
        match self {
            Primitive::U8 | Primitive::U16 | Primitive::U32 | Primitive::U64 => Class::Unsigned,
            Primitive::I8 | Primitive::I16 | Primitive::I32 | Primitive::I64 => Class::Signed,
            Primitive::F32 | Primitive::F64 => Class::Float,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::U8 => "u8",
            Primitive::I8 => "i8",
            Primitive::U16 => "u16",
            Primitive::I16 => "i16",
            Primitive::U32 => "u32",
            Primitive::I32 => "i32",
            Primitive::U64 => "u64",
            Primitive::I64 => "i64",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
        }
    }

    /// Largest unsigned value representable, for unsigned primitives.
    pub(crate) fn unsigned_max(self) -> u64 {
        match self.width() {
            8 => u64::MAX,
            w => (1u64 << (w * 8)) - 1,
        }
    }

    /// Inclusive signed range, for signed primitives.
    pub(crate) fn signed_range(self) -> (i64, i64) {
        match self.width() {
            8 => (i64::MIN, i64::MAX),
            w => {
                let half = 1i64 << (w * 8 - 1);
                (-half, half - 1)
            }
        }
    }
}

/// A scalar wire type: a primitive plus an optional byte order.
///
/// When `byte_order` is `None` the schema-wide default from
/// [`crate::config::SchemaConfig`] applies at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scalar {
    pub primitive: Primitive,
    pub byte_order: Option<ByteOrder>,
}

impl Scalar {
    pub const U8: Scalar = Scalar::new(Primitive::U8);
    pub const I8: Scalar = Scalar::new(Primitive::I8);
    pub const U16: Scalar = Scalar::new(Primitive::U16);
    pub const I16: Scalar = Scalar::new(Primitive::I16);
    pub const U32: Scalar = Scalar::new(Primitive::U32);
    pub const I32: Scalar = Scalar::new(Primitive::I32);
    pub const U64: Scalar = Scalar::new(Primitive::U64);
    pub const I64: Scalar = Scalar::new(Primitive::I64);
    pub const F32: Scalar = Scalar::new(Primitive::F32);
    pub const F64: Scalar = Scalar::new(Primitive::F64);

    pub const fn new(primitive: Primitive) -> Self {
        Scalar {
            primitive,
            byte_order: None,
        }
    }

    pub const fn with_byte_order(self, byte_order: ByteOrder) -> Self {
        Scalar {
            primitive: self.primitive,
            byte_order: Some(byte_order),
        }
    }

    pub const fn big_endian(self) -> Self {
        self.with_byte_order(ByteOrder::Big)
    }

    pub const fn little_endian(self) -> Self {
        self.with_byte_order(ByteOrder::Little)
    }

    pub fn width(&self) -> usize {
        self.primitive.width()
    }
}

impl From<Primitive> for Scalar {
    fn from(value: Primitive) -> Self {
        Scalar::new(value)
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::ByteOrderDef> for ByteOrder {
    fn from(value: crate::serde::ByteOrderDef) -> Self {
        match value {
            crate::serde::ByteOrderDef::Big => ByteOrder::Big,
            crate::serde::ByteOrderDef::Little => ByteOrder::Little,
            crate::serde::ByteOrderDef::Native => ByteOrder::Native,
        }
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::PrimitiveDef> for Primitive {
    fn from(value: crate::serde::PrimitiveDef) -> Self {
        use crate::serde::PrimitiveDef;

        match value {
            PrimitiveDef::U8 => Primitive::U8,
            PrimitiveDef::I8 => Primitive::I8,
            PrimitiveDef::U16 => Primitive::U16,
            PrimitiveDef::I16 => Primitive::I16,
            PrimitiveDef::U32 => Primitive::U32,
            PrimitiveDef::I32 => Primitive::I32,
            PrimitiveDef::U64 => Primitive::U64,
            PrimitiveDef::I64 => Primitive::I64,
            PrimitiveDef::F32 => Primitive::F32,
            PrimitiveDef::F64 => Primitive::F64,
        }
    }
}
