//! RowBinary decoding and metric path reversal for time-series ingestion.
//!
//! [`RowReader`] turns a byte stream into typed values (varints, fixed-width
//! integers and floats, length-prefixed strings, dates, string lists).
//! [`RowWriter`] produces the same layout. The [`reverse`] module flips the
//! dot-delimited segments of a metric path so related paths sort together.

pub mod config;
pub mod date;
pub mod error;
pub mod reader;
pub mod reverse;
pub mod row;
pub mod source;
pub mod writer;

pub use config::{ReaderConfig, DEFAULT_SCRATCH_CAPACITY};
pub use error::{Error, Result};
pub use reader::RowReader;
pub use reverse::{reverse_bytes, reverse_in_place, reverse_to};
pub use row::{IndexRow, PointRow, Row, RowSchema, TaggedRow};
pub use source::FillSource;
pub use writer::RowWriter;
