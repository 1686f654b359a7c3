//! Typed value marshalling into fixed packet payload buffers.
//!
//! Values are written at caller-chosen offsets and read back by type:
//! - text and JSON as raw UTF-8, sized by content on write and by an explicit
//!   byte count on read
//! - numbers, booleans and characters as fixed-width scalars, selectable by
//!   format code and [`ByteOrder`]
//! - homogeneous lists as consecutive scalars
//!
//! [`Value`] carries the dynamic rules; [`Marshal`] maps Rust types onto them.

pub mod byte_order;
pub mod error;
pub mod format;
pub mod typed;
pub mod value;

pub use byte_order::ByteOrder;
pub use error::{MarshalError, Result};
pub use format::ScalarFormat;
pub use typed::Marshal;
pub use value::{encode_value, read_value, write_raw, write_value, Value, ValueType};
