#![warn(clippy::pedantic)]

pub mod array;
pub mod config;
pub mod decode;
pub mod decoder;
pub mod error;
pub mod input;
pub mod registry;
pub mod result_set;
pub mod value;

mod map;
mod primitive;

pub use array::ElementSources;
pub use config::DecoderConfig;
pub use decode::Decode;
pub use decoder::{DecodeContext, StructDecoder};
pub use error::{DecodeError, ErrorKind};
pub use input::{FieldSource, SqlData};
pub use registry::{Factory, FactoryRegistry};
pub use result_set::{Chunk, ChunkSource, MemoryChunks, ResultSet, Row};
pub use value::DecodedValue;
