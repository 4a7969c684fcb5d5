//! Per-column type inference

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::config::InferenceConfig;
use super::dates::{is_midnight, parse_datetime_str};
use super::literal::{Literal, eval_sample};
use crate::flatten::{FlatValue, RawTable};
use crate::schema::{Schema, TypeTag};

/// What decided a column's type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InferenceEvidence {
    /// No usable value in the sample
    Empty,
    /// Every sample evaluated to a literal of one kind
    Literal,
    /// Every sample parsed as a date or timestamp
    Temporal,
    /// Mixed or unrecognised samples
    Fallback,
}

/// Inference outcome for one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInference {
    pub name: String,
    pub type_tag: TypeTag,
    /// Number of values actually examined
    pub sampled: usize,
    pub evidence: InferenceEvidence,
}

/// Statistics from inferring a table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceStats {
    /// Columns examined
    pub columns_inferred: usize,
    /// Total values sampled across columns
    pub values_sampled: usize,
    /// Inferred type (catalog spelling) -> column count
    pub type_distribution: BTreeMap<String, usize>,
    /// Columns that fell back to string
    pub fallback_columns: Vec<String>,
}

/// Inferred schema for a table together with per-column detail
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferredSchema {
    pub schema: Schema,
    pub columns: Vec<ColumnInference>,
    pub stats: InferenceStats,
}

/// Heuristic type inference over untyped columns
///
/// Inference never fails: anything that cannot be classified is `string`.
#[derive(Debug, Clone, Default)]
pub struct SchemaInferrer {
    config: InferenceConfig,
}

impl SchemaInferrer {
    /// Create a new inferrer with default configuration
    pub fn new() -> Self {
        Self::with_config(InferenceConfig::default())
    }

    /// Create a new inferrer with custom configuration
    pub fn with_config(config: InferenceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Infer a type for every column of the table
    ///
    /// If a name repeats, the first column decides its type.
    pub fn infer_table(&self, table: &RawTable) -> InferredSchema {
        let mut inferred = InferredSchema::default();
        let mut seen = HashSet::new();

        for column in table.columns() {
            if !seen.insert(column.name.as_str()) {
                continue;
            }
            let result = self.infer_column(&column.name, &column.values);

            inferred.stats.columns_inferred += 1;
            inferred.stats.values_sampled += result.sampled;
            *inferred
                .stats
                .type_distribution
                .entry(result.type_tag.catalog_name().to_string())
                .or_insert(0) += 1;
            if result.evidence == InferenceEvidence::Fallback {
                inferred.stats.fallback_columns.push(result.name.clone());
            }

            inferred.columns.push(result);
        }
        inferred.schema = inferred
            .columns
            .iter()
            .map(|c| (c.name.clone(), c.type_tag))
            .collect();

        info!(
            columns = inferred.stats.columns_inferred,
            sampled = inferred.stats.values_sampled,
            fallbacks = inferred.stats.fallback_columns.len(),
            "Inferred schema from batch"
        );
        inferred
    }

    /// Infer the type of a single column
    pub fn infer_column(&self, name: &str, values: &[FlatValue]) -> ColumnInference {
        let samples = self.sample(values);
        let sampled = samples.len();

        let (type_tag, evidence) = if samples.is_empty() {
            (TypeTag::String, InferenceEvidence::Empty)
        } else if self.config.is_date_named(name) {
            classify_temporal(&samples)
        } else {
            match evaluate_all(&samples) {
                Some(literals) => classify_literals(&literals),
                None => classify_temporal(&samples),
            }
        };

        debug!(
            column = name,
            sampled,
            type_tag = %type_tag,
            evidence = ?evidence,
            "Inferred column type"
        );
        ColumnInference {
            name: name.to_string(),
            type_tag,
            sampled,
            evidence,
        }
    }

    fn sample(&self, values: &[FlatValue]) -> Vec<String> {
        let limit = if self.config.sample_size == 0 {
            usize::MAX
        } else {
            self.config.sample_size
        };
        values
            .iter()
            .filter(|v| !v.scalar.is_blank())
            .filter_map(|v| v.scalar.to_text())
            .filter(|text| !(self.config.none_text_is_null && text == "None"))
            .take(limit)
            .collect()
    }
}

/// Evaluate every sample; `None` as soon as one is not a literal
fn evaluate_all(samples: &[String]) -> Option<Vec<Literal>> {
    samples.iter().map(|s| eval_sample(s)).collect()
}

fn classify_literals(literals: &[Literal]) -> (TypeTag, InferenceEvidence) {
    if literals.iter().all(|l| matches!(l, Literal::Bool(_))) {
        return (TypeTag::Boolean, InferenceEvidence::Literal);
    }

    let mut min = i64::MAX;
    let mut max = i64::MIN;
    let mut saw_float = false;
    for literal in literals {
        match literal {
            Literal::Int(i) => {
                min = min.min(*i);
                max = max.max(*i);
            }
            Literal::Float(_) => saw_float = true,
            _ => return (TypeTag::String, InferenceEvidence::Fallback),
        }
    }

    let tag = if saw_float {
        TypeTag::Double
    } else if min >= i64::from(i32::MIN) && max <= i64::from(i32::MAX) {
        TypeTag::Int32
    } else {
        TypeTag::Int64
    };
    (tag, InferenceEvidence::Literal)
}

fn classify_temporal(samples: &[String]) -> (TypeTag, InferenceEvidence) {
    let mut all_midnight = true;
    for sample in samples {
        match parse_datetime_str(sample) {
            Ok(parsed) => all_midnight &= is_midnight(&parsed.instant),
            Err(_) => return (TypeTag::String, InferenceEvidence::Fallback),
        }
    }
    let tag = if all_midnight {
        TypeTag::Date
    } else {
        TypeTag::Timestamp
    };
    (tag, InferenceEvidence::Temporal)
}

/// Infer with the default configuration
pub fn infer_type(name: &str, values: &[FlatValue]) -> TypeTag {
    SchemaInferrer::new().infer_column(name, values).type_tag
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::{AttributeType, RawColumn, Scalar};

    fn texts(values: &[&str]) -> Vec<FlatValue> {
        values
            .iter()
            .map(|v| FlatValue::new(Scalar::Text(v.to_string())))
            .collect()
    }

    #[test]
    fn test_int32_boundaries() {
        let values = vec![
            FlatValue::new(Scalar::Int(i64::from(i32::MIN))),
            FlatValue::new(Scalar::Int(i64::from(i32::MAX))),
        ];
        assert_eq!(infer_type("n", &values), TypeTag::Int32);

        let values = vec![FlatValue::new(Scalar::Int(1)), FlatValue::new(Scalar::Int(2_147_483_648))];
        assert_eq!(infer_type("n", &values), TypeTag::Int64);

        let values = vec![FlatValue::new(Scalar::Int(-2_147_483_649))];
        assert_eq!(infer_type("n", &values), TypeTag::Int64);
    }

    #[test]
    fn test_numeric_text_with_descriptor() {
        let values = vec![
            FlatValue::typed(Scalar::Text("12".into()), AttributeType::N),
            FlatValue::typed(Scalar::Text("7".into()), AttributeType::N),
        ];
        assert_eq!(infer_type("count_n", &values), TypeTag::Int32);
    }

    #[test]
    fn test_double_and_mixed_numbers() {
        assert_eq!(infer_type("x", &texts(&["1.5", "2.25"])), TypeTag::Double);
        assert_eq!(infer_type("x", &texts(&["1", "2.5"])), TypeTag::Double);
        assert_eq!(
            infer_type("x", &[FlatValue::new(Scalar::Float(2.0))]),
            TypeTag::Double
        );
    }

    #[test]
    fn test_booleans() {
        assert_eq!(infer_type("flag", &texts(&["true", "False", "TRUE"])), TypeTag::Boolean);
        let native = vec![FlatValue::new(Scalar::Bool(true)), FlatValue::new(Scalar::Bool(false))];
        assert_eq!(infer_type("flag", &native), TypeTag::Boolean);
        // bool mixed with int is not a single kind
        assert_eq!(infer_type("flag", &texts(&["true", "1"])), TypeTag::String);
    }

    #[test]
    fn test_dates_and_timestamps() {
        assert_eq!(
            infer_type("created", &texts(&["2024-07-30", "2024-07-31T00:00:00Z"])),
            TypeTag::Date
        );
        assert_eq!(
            infer_type("created", &texts(&["2024-07-30 18:27:00", "7/30/2024 6:27:00 PM"])),
            TypeTag::Timestamp
        );
    }

    #[test]
    fn test_date_named_column_skips_literals() {
        // digits would be integers anywhere else
        let values = texts(&["1700000000", "1700003600"]);
        assert_eq!(infer_type("update_date", &values), TypeTag::Timestamp);
        // `updated` carries the hint as a substring
        assert_eq!(infer_type("updated_at", &values), TypeTag::Timestamp);
        assert_eq!(infer_type("amount", &values), TypeTag::Int32);
    }

    #[test]
    fn test_string_fallback() {
        assert_eq!(infer_type("name", &texts(&["alice", "bob"])), TypeTag::String);
        assert_eq!(infer_type("mixed", &texts(&["1", "abc"])), TypeTag::String);
        assert_eq!(
            infer_type("when_date", &texts(&["2024-07-30", "later"])),
            TypeTag::String
        );
    }

    #[test]
    fn test_empty_sample_is_string() {
        let values = vec![
            FlatValue::null(),
            FlatValue::new(Scalar::Text(String::new())),
            FlatValue::new(Scalar::Text("None".into())),
        ];
        let result = SchemaInferrer::new().infer_column("x", &values);
        assert_eq!(result.type_tag, TypeTag::String);
        assert_eq!(result.evidence, InferenceEvidence::Empty);
        assert_eq!(result.sampled, 0);
    }

    #[test]
    fn test_nulls_excluded_from_sample() {
        let values = vec![
            FlatValue::null(),
            FlatValue::new(Scalar::Text("None".into())),
            FlatValue::new(Scalar::Int(5)),
        ];
        assert_eq!(infer_type("x", &values), TypeTag::Int32);
    }

    #[test]
    fn test_sample_size_limits_values() {
        let inferrer = SchemaInferrer::with_config(InferenceConfig::builder().sample_size(2).build());
        let result = inferrer.infer_column("x", &texts(&["1", "2", "not a number"]));
        assert_eq!(result.sampled, 2);
        assert_eq!(result.type_tag, TypeTag::Int32);
    }

    #[test]
    fn test_infer_table_stats() {
        let mut table = RawTable::new();
        table.push_column(RawColumn::new("id", texts(&["1", "2"])));
        table.push_column(RawColumn::new("name", texts(&["a", "b"])));
        table.push_column(RawColumn::new("id", texts(&["x", "y"])));

        let inferred = SchemaInferrer::new().infer_table(&table);
        assert_eq!(inferred.schema.get("id"), Some(TypeTag::Int32));
        assert_eq!(inferred.schema.get("name"), Some(TypeTag::String));
        assert_eq!(inferred.stats.columns_inferred, 2);
        assert_eq!(inferred.stats.values_sampled, 4);
        assert_eq!(inferred.stats.fallback_columns, vec!["name".to_string()]);
        assert_eq!(inferred.stats.type_distribution.get("int"), Some(&1));
    }
}
