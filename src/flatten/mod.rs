//! Record flattening
//!
//! Turns nested attribute maps, as emitted by a key-value store's change
//! stream or table scan, into single-level records keyed by path.
//!
//! ## Example
//!
//! ```rust
//! use ddb_lake_core::flatten::{Flattener, Scalar};
//!
//! let record = serde_json::json!({"id": {"S": "42"}, "tags": []});
//! let flat = Flattener::new().flatten(record.as_object().unwrap());
//!
//! assert_eq!(flat.get("id_S").unwrap().scalar, Scalar::Text("42".into()));
//! assert!(flat.get("tags").unwrap().is_null());
//! ```

mod error;
mod event;
mod flattener;
mod table;
mod value;

pub use error::FlattenError;
pub use event::{RecordLayout, RecordShape, decode_stream_event, decode_stream_record};
pub use flattener::{FlatRecord, FlattenConfig, Flattener, RawRecord};
pub use table::{RawColumn, RawTable};
pub use value::{AttributeType, FlatValue, Scalar};
