//! Schema-wide settings applied when fields are compiled.

use crate::types::ByteOrder;

/// How thoroughly sequence elements are checked when a value is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementCheck {
    /// Every element must conform to the element type and fit its width.
    #[default]
    Strict,
    /// Only the container shape is checked; bad elements surface when packing.
    Lenient,
}

/// Settings shared by every field of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchemaConfig {
    /// Byte order for scalars that do not name one.
    pub byte_order: ByteOrder,
    pub element_check: ElementCheck,
}

impl SchemaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_byte_order(&mut self, byte_order: ByteOrder) -> &mut Self {
        self.byte_order = byte_order;
        self
    }

    pub fn set_element_check(&mut self, element_check: ElementCheck) -> &mut Self {
        self.element_check = element_check;
        self
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::ConfigDef> for SchemaConfig {
    fn from(value: crate::serde::ConfigDef) -> Self {
        SchemaConfig {
            byte_order: value.byte_order.into(),
            element_check: match value.element_check {
                crate::serde::ElementCheckDef::Strict => ElementCheck::Strict,
                crate::serde::ElementCheckDef::Lenient => ElementCheck::Lenient,
            },
        }
    }
}
