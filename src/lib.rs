//! DDB Lake Core - schema coercion for key-value change streams
//!
//! Turns schemaless records from a NoSQL change stream or table scan into
//! typed, columnar batches that match a catalog schema:
//! - Flattening of nested attribute maps (typed wrappers kept as metadata)
//! - Canonical column naming and column pruning
//! - Type inference when the catalog has no schema
//! - Per-column coercion that degrades to string instead of failing
//! - Batch assembly with partition and bookkeeping columns

pub mod catalog;
pub mod coercion;
pub mod flatten;
pub mod inference;
pub mod naming;
pub mod pipeline;
pub mod schema;

// Re-export commonly used types
pub use catalog::{CatalogError, FileCatalog, InMemoryCatalog, SchemaCatalog};
pub use coercion::{Batch, CoercionReport, Column, ColumnDegradation, SchemaCoercer, Value};
pub use flatten::{FlatRecord, FlatValue, Flattener, RawRecord, RawTable, Scalar};
pub use inference::{DateParseError, InferenceConfig, SchemaInferrer};
pub use naming::{NameNormalizer, normalize_name};
pub use pipeline::{AssembledBatch, BatchAssembler, PipelineConfig, PipelineError, PipelineResult};
pub use schema::{Schema, TypeTag};
