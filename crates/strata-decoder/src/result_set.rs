use std::borrow::Cow;
use std::collections::VecDeque;
use std::vec;

use strata_types::{FieldDescriptor, RawValue};
use tracing::debug;

use crate::array::ElementSources;
use crate::decode::Decode;
use crate::decoder::StructDecoder;
use crate::error::DecodeError;
use crate::input::{NULL, SqlData};
use crate::value::DecodedValue;

/// One result row: a raw cell per column, in column order.
pub type Row = Vec<RawValue>;

/// A batch of rows as delivered by the row-fetching layer.
pub type Chunk = Vec<Row>;

/// Supplier of result chunks.
///
/// Implemented by whatever fetches rows from the server; the result set
/// only pulls. `Ok(None)` marks the end of the result.
pub trait ChunkSource {
    /// # Errors
    ///
    /// Any failure fetching the next chunk, typically wrapped with
    /// [`DecodeError::row_source`].
    fn next_chunk(&mut self) -> Result<Option<Chunk>, DecodeError>;
}

impl<S: ChunkSource + ?Sized> ChunkSource for Box<S> {
    fn next_chunk(&mut self) -> Result<Option<Chunk>, DecodeError> {
        (**self).next_chunk()
    }
}

/// Chunks held in memory, handed out in order.
#[derive(Clone, Debug, Default)]
pub struct MemoryChunks {
    chunks: VecDeque<Chunk>,
}

impl MemoryChunks {
    pub fn new(chunks: impl IntoIterator<Item = Chunk>) -> Self {
        Self {
            chunks: chunks.into_iter().collect(),
        }
    }

    /// Split `rows` into chunks of at most `chunk_size` rows. A zero
    /// size is treated as one.
    #[must_use]
    pub fn split(rows: Vec<Row>, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        let mut chunks = VecDeque::with_capacity(rows.len().div_ceil(chunk_size));
        let mut rows = rows.into_iter().peekable();
        while rows.peek().is_some() {
            chunks.push_back(rows.by_ref().take(chunk_size).collect());
        }
        Self { chunks }
    }

    /// Chunks not yet handed out.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

impl ChunkSource for MemoryChunks {
    fn next_chunk(&mut self) -> Result<Option<Chunk>, DecodeError> {
        Ok(self.chunks.pop_front())
    }
}

/// Forward-only cursor over a chunked result.
///
/// Mirrors the SQL result API shape: call [`next`](Self::next) to
/// advance, then read columns of the current row by 1-based index.
/// Chunk boundaries are invisible to the caller; empty chunks are
/// skipped.
///
/// ```text
///   chunk 1          chunk 2 (empty)    chunk 3
///   ┌─────┬─────┐    ┌┐                 ┌─────┐
///   │ r1  │ r2  │    ││                 │ r3  │
///   └─────┴─────┘    └┘                 └─────┘
///   next() → r1, next() → r2, next() → r3, next() → false
/// ```
///
/// Structured cells may arrive either already demarshalled or as JSON
/// text (JSON result format); text under an OBJECT, ARRAY or MAP column
/// is parsed before decoding.
pub struct ResultSet<S> {
    columns: Vec<FieldDescriptor>,
    decoder: StructDecoder,
    source: S,
    chunk: vec::IntoIter<Row>,
    current: Option<Row>,
    row_number: usize,
    chunks_fetched: usize,
    exhausted: bool,
}

impl<S: ChunkSource> ResultSet<S> {
    pub fn new(columns: Vec<FieldDescriptor>, decoder: StructDecoder, source: S) -> Self {
        Self {
            columns,
            decoder,
            source,
            chunk: Vec::new().into_iter(),
            current: None,
            row_number: 0,
            chunks_fetched: 0,
            exhausted: false,
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[FieldDescriptor] {
        &self.columns
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// 1-based number of the current row; 0 before the first `next()`.
    #[must_use]
    pub fn row_number(&self) -> usize {
        self.row_number
    }

    /// Advance to the next row. Returns `false` once the result is
    /// exhausted; further calls keep returning `false`.
    ///
    /// # Errors
    ///
    /// Propagates the chunk source's failure.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<bool, DecodeError> {
        loop {
            if let Some(row) = self.chunk.next() {
                self.current = Some(row);
                self.row_number += 1;
                return Ok(true);
            }
            self.current = None;
            if self.exhausted {
                return Ok(false);
            }
            match self.source.next_chunk()? {
                Some(chunk) => {
                    self.chunks_fetched += 1;
                    debug!(
                        chunk = self.chunks_fetched,
                        rows = chunk.len(),
                        "advanced to next chunk"
                    );
                    self.chunk = chunk.into_iter();
                }
                None => {
                    self.exhausted = true;
                    debug!(
                        rows = self.row_number,
                        chunks = self.chunks_fetched,
                        "result set exhausted"
                    );
                }
            }
        }
    }

    /// Decode column `column` of the current row into `T`.
    ///
    /// # Errors
    ///
    /// [`DecodeError::NoCurrentRow`], [`DecodeError::ColumnOutOfRange`],
    /// a JSON parse failure for a text-encoded structured cell, or any
    /// decode failure.
    pub fn get<T: Decode>(&self, column: usize) -> Result<T, DecodeError> {
        let (raw, schema) = self.cell(column)?;
        self.decoder.decode(&raw, schema)
    }

    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub fn get_object<T: SqlData>(&self, column: usize) -> Result<Option<T>, DecodeError> {
        self.get(column)
    }

    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub fn get_array<T: Decode>(&self, column: usize) -> Result<Option<Vec<T>>, DecodeError> {
        self.get(column)
    }

    /// One [`FieldSource`](crate::FieldSource) per element of an ARRAY of
    /// OBJECT column, for callers that build their own instances.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get) and [`StructDecoder::element_sources`].
    pub fn get_array_sources(
        &self,
        column: usize,
    ) -> Result<Option<ElementSources<'_>>, DecodeError> {
        let (raw, schema) = self.cell(column)?;
        ElementSources::new(&self.decoder, raw, schema)
    }

    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub fn get_value(&self, column: usize) -> Result<DecodedValue, DecodeError> {
        self.get(column)
    }

    fn cell(&self, column: usize) -> Result<(Cow<'_, RawValue>, &FieldDescriptor), DecodeError> {
        let row = self.current.as_ref().ok_or(DecodeError::NoCurrentRow)?;
        let Some(schema) = column.checked_sub(1).and_then(|i| self.columns.get(i)) else {
            return Err(DecodeError::ColumnOutOfRange {
                index: column,
                count: self.columns.len(),
            });
        };
        // A short row reads as null in the missing columns.
        let raw = row.get(column - 1).unwrap_or(&NULL);
        let raw = match raw {
            RawValue::Text(text) if schema.base().is_composite() => {
                Cow::Owned(RawValue::parse_json(text)?)
            }
            other => Cow::Borrowed(other),
        };
        Ok((raw, schema))
    }
}
