//! Conversion of untyped tables into typed batches
//!
//! Each column is converted to its schema type independently:
//!
//! - numbers that cannot be parsed become zero and are counted
//! - booleans accept `true`/`false` in any case and 0/1
//! - dates and timestamps read epochs or the supported string formats
//! - a column that still cannot be converted is written as string and
//!   reported as a [`ColumnDegradation`]

mod batch;
mod coercer;
mod error;
mod report;
mod value;

pub use batch::{Batch, Column};
pub use coercer::{CoercedColumn, SchemaCoercer};
pub use error::CoercionError;
pub use report::{CoercionReport, ColumnDegradation};
pub use value::Value;
