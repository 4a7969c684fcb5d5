//! Batch assembly pipeline
//!
//! Runs one page of raw records through every stage and returns a typed
//! batch with its effective schema and a coercion report.
//!
//! ## Stages
//!
//! 1. **Flatten** - record shape resolved, old image dropped, partition key
//!    copied into the key section
//! 2. **Normalize** - canonical column names
//! 3. **Prune** - duplicate, index-artifact and empty columns removed
//! 4. **Schema** - catalog lookup, or inference in auto-schema mode
//! 5. **Coerce** - every column converted, failures degraded to string
//! 6. **Bookkeeping** - `date`, `timestamp_extracted` and `event_source`
//!
//! ## Example
//!
//! ```rust
//! use ddb_lake_core::catalog::InMemoryCatalog;
//! use ddb_lake_core::pipeline::{BatchAssembler, PipelineConfig};
//! use serde_json::json;
//!
//! let config = PipelineConfig::new("orders", "id").with_auto_schema(true);
//! let assembler = BatchAssembler::new(config, InMemoryCatalog::new()).unwrap();
//!
//! let record = json!({"id": {"S": "a1"}, "total": {"N": "12.5"}});
//! let out = assembler.assemble(&[record.as_object().unwrap().clone()]).unwrap();
//! assert_eq!(out.row_count(), 1);
//! ```

mod assembler;
mod config;
mod error;
mod keys;

pub use assembler::{
    AssembledBatch, AssemblyStage, BatchAssembler, DATE_COLUMN, EVENT_SOURCE_COLUMN,
    SchemaSource, TIMESTAMP_EXTRACTED_COLUMN,
};
pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use keys::{KeyPaths, partition_dates};
