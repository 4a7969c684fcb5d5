//! Canonical column naming

use std::collections::HashSet;

use crate::flatten::{FlatRecord, RawTable};
use crate::schema::Schema;

/// Rewrites keys into lower-case, separator-delimited, dash-free names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameNormalizer {
    separator: char,
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self { separator: '_' }
    }
}

impl NameNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_separator(separator: char) -> Self {
        Self { separator }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Canonical form of a single name
    ///
    /// A separator goes in front of every run of ASCII capitals except at the
    /// start of the string; the result is lower-cased, stripped of dashes and
    /// has repeated separators collapsed. The transform is idempotent.
    pub fn normalize(&self, name: &str) -> String {
        let mut split = String::with_capacity(name.len() + 8);
        let mut previous_upper = false;
        for (index, ch) in name.chars().enumerate() {
            let upper = ch.is_ascii_uppercase();
            if upper && !previous_upper && index > 0 {
                split.push(self.separator);
            }
            previous_upper = upper;
            split.push(ch);
        }

        let mut out = String::with_capacity(split.len());
        for ch in split.to_lowercase().chars() {
            if ch == '-' {
                continue;
            }
            if ch == self.separator && out.ends_with(self.separator) {
                continue;
            }
            out.push(ch);
        }
        out
    }

    /// Normalise every key of a record; on collision the first key wins
    pub fn normalize_record(&self, record: FlatRecord) -> FlatRecord {
        record
            .into_iter()
            .map(|(key, value)| (self.normalize(&key), value))
            .collect()
    }

    /// Normalise every column name of a table, keeping collisions for pruning
    pub fn normalize_table(&self, table: &mut RawTable) {
        table.rename_columns(|name| self.normalize(name));
    }

    /// Normalise a schema's column names; on collision the first name in key
    /// order wins
    pub fn normalize_schema(&self, schema: &Schema) -> Schema {
        let mut seen = HashSet::new();
        schema
            .iter()
            .map(|(column, tag)| (self.normalize(column), tag))
            .filter(|(name, _)| seen.insert(name.clone()))
            .collect()
    }

    /// Whether a name contains a separator-bounded run of three or more digits
    ///
    /// Such names come from exploding arrays into one column per index.
    pub fn is_index_artifact(&self, name: &str) -> bool {
        let segments: Vec<&str> = name.split(self.separator).collect();
        if segments.len() < 3 {
            return false;
        }
        segments[1..segments.len() - 1]
            .iter()
            .any(|s| s.len() >= 3 && s.chars().all(|c| c.is_ascii_digit()))
    }
}

/// Normalise a name with the default `_` separator
pub fn normalize_name(name: &str) -> String {
    NameNormalizer::default().normalize(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::{FlatValue, Scalar};
    use crate::schema::TypeTag;

    #[test]
    fn test_camel_to_snake() {
        assert_eq!(normalize_name("CamelCase"), "camel_case");
        assert_eq!(normalize_name("camelCase"), "camel_case");
        assert_eq!(normalize_name("Already_snake_case"), "already_snake_case");
        assert_eq!(normalize_name("NoChange"), "no_change");
        assert_eq!(normalize_name("eventID"), "event_id");
        assert_eq!(
            normalize_name("dynamodb_NewImage_updatedAt_N"),
            "dynamodb_new_image_updated_at_n"
        );
    }

    #[test]
    fn test_dashes_removed() {
        assert_eq!(normalize_name("x-ray_Id"), "xray_id");
        assert_eq!(normalize_name("a_-_b"), "a_b");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "dynamodb_NewImage_id_S",
            "ABCDef",
            "a__B__c",
            "__Lead",
            "trail-_-",
            "mixed-Case_With-DASHES",
            "ümlautÄB",
            "",
        ];
        for input in inputs {
            let once = normalize_name(input);
            assert_eq!(normalize_name(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_no_repeated_separators() {
        let name = normalize_name("a_B__C___d");
        assert!(!name.contains("__"));
        assert_eq!(name, "a_b_c_d");
    }

    #[test]
    fn test_custom_separator() {
        let normalizer = NameNormalizer::with_separator('/');
        assert_eq!(normalizer.normalize("dynamodb/NewImage/id/S"), "dynamodb/new/image/id/s");
    }

    #[test]
    fn test_normalize_record_first_wins() {
        let record: FlatRecord = vec![
            ("fooBar".to_string(), FlatValue::new(Scalar::Int(1))),
            ("foo_bar".to_string(), FlatValue::new(Scalar::Int(2))),
        ]
        .into_iter()
        .collect();

        let normalized = NameNormalizer::new().normalize_record(record);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized.get("foo_bar").unwrap().scalar, Scalar::Int(1));
    }

    #[test]
    fn test_normalize_schema() {
        let schema: Schema = [("updatedAt", TypeTag::Int64), ("Name", TypeTag::String)]
            .into_iter()
            .collect();
        let normalized = NameNormalizer::new().normalize_schema(&schema);
        assert_eq!(normalized.get("updated_at"), Some(TypeTag::Int64));
        assert_eq!(normalized.get("name"), Some(TypeTag::String));
    }

    #[test]
    fn test_index_artifact_detection() {
        let normalizer = NameNormalizer::new();
        assert!(normalizer.is_index_artifact("list_003_value"));
        assert!(normalizer.is_index_artifact("items_1234_name_s"));
        assert!(!normalizer.is_index_artifact("list_03_value"));
        assert!(!normalizer.is_index_artifact("list_3_value"));
        assert!(!normalizer.is_index_artifact("list_003"));
        assert!(!normalizer.is_index_artifact("003_value"));
        assert!(!normalizer.is_index_artifact("list_a003_value"));
    }
}
