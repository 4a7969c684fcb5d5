//! Column naming and pruning
//!
//! Canonicalises flattened keys (`dynamodb_NewImage_updatedAt_N` becomes
//! `dynamodb_new_image_updated_at_n`) and reconciles a batch's columns with a
//! schema: duplicate and exploded-index columns are dropped, unknown columns
//! are added as string.

mod normalize;
mod prune;

pub use normalize::{NameNormalizer, normalize_name};
pub use prune::{
    PruneReport, drop_duplicate_columns, drop_empty_columns, drop_index_artifacts,
    extend_with_unknown, prune_table, reconcile_schema,
};
