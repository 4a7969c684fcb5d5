//! Partition key propagation and partition dates

use chrono::NaiveDate;

use crate::flatten::{AttributeType, FlatRecord, RawTable};
use crate::inference::{is_epoch, parse_epoch};
use crate::naming::NameNormalizer;

/// Key prefixes of one flattened record layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPaths {
    /// Prefix of new-image keys, e.g. `dynamodb_NewImage_`
    pub image_prefix: String,
    /// Prefix of key-section keys, e.g. `dynamodb_Keys_`
    pub keys_prefix: String,
    pub separator: String,
}

impl KeyPaths {
    /// Copy the partition key from the new image into the key section
    ///
    /// An existing key-section value is never overwritten. Returns whether
    /// the record carries the partition key in either place.
    pub fn copy_partition_key(&self, record: &mut FlatRecord, partition_key: &str) -> bool {
        let image_base = format!("{}{}", self.image_prefix, partition_key);
        let keys_base = format!("{}{}", self.keys_prefix, partition_key);

        let found = record
            .find_key(|key| self.matches_attribute(key, &image_base))
            .map(str::to_string);

        match found {
            Some(image_key) => {
                let suffix = &image_key[image_base.len()..];
                let target = format!("{}{}", keys_base, suffix);
                if let Some(value) = record.get(&image_key).cloned() {
                    record.insert_if_absent(target, value);
                }
                true
            }
            None => record
                .find_key(|key| self.matches_attribute(key, &keys_base))
                .is_some(),
        }
    }

    /// `base` itself or `base` followed by a separator and a type descriptor
    fn matches_attribute(&self, key: &str, base: &str) -> bool {
        match key.strip_prefix(base) {
            Some("") => true,
            Some(rest) => rest
                .strip_prefix(self.separator.as_str())
                .and_then(AttributeType::from_descriptor)
                .is_some(),
            None => false,
        }
    }
}

/// Partition date of every row
///
/// Rows whose updated-at attribute holds an epoch get that epoch's UTC
/// date; every other row gets `fallback`.
pub fn partition_dates(
    table: &RawTable,
    normalizer: &NameNormalizer,
    updated_at_key: &str,
    fallback: NaiveDate,
) -> Vec<NaiveDate> {
    let base = normalizer.normalize(updated_at_key);
    let separator = normalizer.separator();

    let column = table.columns().iter().find(|c| {
        c.name == base
            || c.name
                .strip_prefix(base.as_str())
                .and_then(|rest| rest.strip_prefix(separator))
                .and_then(|rest| AttributeType::from_descriptor(&rest.to_uppercase()))
                .is_some()
    });

    match column {
        Some(column) => column
            .values
            .iter()
            .map(|value| {
                if value.is_null() || !is_epoch(&value.scalar) {
                    return fallback;
                }
                parse_epoch(&value.scalar)
                    .map(|parsed| parsed.instant.date_naive())
                    .unwrap_or(fallback)
            })
            .collect(),
        None => vec![fallback; table.row_count()],
    }
}
