//! # bytecraft
//!
//! A library for byte-level record layouts described by declarative schemas.
//!
//! Define fields as fixed-width scalars, sequences, nested records or
//! selectable kinds, then pack [record::Record]s into bytes and unpack bytes
//! back into records. Fields can derive their value from other fields when left
//! unset (a length prefix computed from a payload), and sequences can read their
//! element count from a field decoded before them.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use bytecraft::field::Field;
//! use bytecraft::producer::{count_of, counted_by};
//! use bytecraft::schema::Schema;
//! use bytecraft::types::Scalar;
//! use bytecraft::value::Value;
//!
//! let schema = Arc::new(
//!     Schema::compile(&[
//!         Field::scalar("len", Scalar::U8).with_default(count_of("data")),
//!         Field::sequence("data", Scalar::U8).with_count(counted_by("len")),
//!     ])
//!     .unwrap(),
//! );
//!
//! let mut record = schema.record();
//! record.set("data", vec![1u8, 2, 3, 4]).unwrap();
//! let bytes = record.pack().unwrap();
//! assert_eq!(bytes, [0x04, 0x01, 0x02, 0x03, 0x04]);
//!
//! let parsed = schema.unpack(&bytes).unwrap();
//! assert_eq!(parsed.get("len"), Some(&Value::U64(4)));
//! ```

mod codec;
pub mod compiled;
pub mod config;
pub mod errors;
pub mod field;
pub mod producer;
pub mod record;
pub mod resolver;
pub mod schema;
pub mod types;
pub mod value;
pub mod wire;

#[cfg(feature = "serde")]
pub mod serde;
