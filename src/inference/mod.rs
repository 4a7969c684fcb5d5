//! Type inference for schemaless columns
//!
//! Used when no catalog schema exists for a table and auto-schema mode is
//! on. Each column is classified from a sample of its values:
//!
//! - **Literal evaluation** - capitalised samples read as integers, floats
//!   or `True`/`False`
//! - **Date detection** - epoch numbers (seconds or milliseconds) and a fixed
//!   list of string formats
//! - **Fallback** - anything mixed or unrecognised is `string`
//!
//! ## Example
//!
//! ```rust
//! use ddb_lake_core::flatten::{FlatValue, Scalar};
//! use ddb_lake_core::inference::SchemaInferrer;
//! use ddb_lake_core::schema::TypeTag;
//!
//! let values = vec![
//!     FlatValue::new(Scalar::Text("42".into())),
//!     FlatValue::new(Scalar::Text("7".into())),
//! ];
//! let result = SchemaInferrer::new().infer_column("count", &values);
//! assert_eq!(result.type_tag, TypeTag::Int32);
//! ```

mod config;
pub mod dates;
mod error;
mod inferrer;
mod literal;

pub use config::{InferenceConfig, InferenceConfigBuilder};
pub use dates::{DateFormat, ParsedInstant, is_epoch, parse_datetime, parse_datetime_str, parse_epoch};
pub use error::{DateParseError, InferenceError};
pub use inferrer::{
    ColumnInference, InferenceEvidence, InferenceStats, InferredSchema, SchemaInferrer, infer_type,
};
pub use literal::{Literal, capitalize, eval_literal, eval_sample};
