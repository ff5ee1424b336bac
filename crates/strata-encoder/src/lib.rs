#![warn(clippy::pedantic)]

pub mod encode;
pub mod encoder;
pub mod error;
pub mod sink;

pub use encode::Encode;
pub use encoder::{SqlWrite, StructEncoder};
pub use error::EncodeError;
pub use sink::FieldSink;
