#![warn(clippy::pedantic)]

pub mod base_type;
pub mod decimal;
pub mod error;
pub mod field;
pub mod sql_types;
pub mod value;

pub use base_type::BaseType;
pub use error::TypeError;
pub use field::FieldDescriptor;
pub use value::RawValue;
