//! Column coercion with per-column failure isolation

use std::collections::HashSet;

use tracing::{debug, warn};

use super::batch::{Batch, Column};
use super::error::CoercionError;
use super::report::{CoercionReport, ColumnDegradation};
use super::value::Value;
use crate::flatten::{AttributeType, FlatValue, RawColumn, RawTable, Scalar};
use crate::inference::{ParsedInstant, parse_datetime, parse_epoch};
use crate::schema::{Schema, TypeTag};

/// A coerced column and how many of its values were defaulted
#[derive(Debug, Clone, PartialEq)]
pub struct CoercedColumn {
    pub column: Column,
    pub defaulted: usize,
}

/// Converts untyped columns to a schema
///
/// A column that cannot be converted is written as string and reported; one
/// bad column never fails the batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaCoercer;

impl SchemaCoercer {
    pub fn new() -> Self {
        Self
    }

    /// Coerce every column of a pruned table
    ///
    /// Columns the schema does not define are written as string. Schema
    /// columns absent from the table are reported as missing and left out
    /// of the batch.
    pub fn coerce(&self, table: &RawTable, schema: &Schema) -> (Batch, CoercionReport) {
        let mut batch = Batch::new(table.row_count());
        let mut report = CoercionReport::default();

        for raw in table.columns() {
            let declared = schema.get(&raw.name).unwrap_or(TypeTag::String);
            let coerced = match self.coerce_column(raw, declared) {
                Ok(coerced) => coerced,
                Err(error) => {
                    warn!(
                        column = %raw.name,
                        declared = %declared,
                        value = error.value(),
                        error = %error,
                        "Column could not be coerced, writing as string"
                    );
                    report.degraded_columns.push(ColumnDegradation {
                        column: raw.name.clone(),
                        declared,
                        effective: TypeTag::String,
                        reason: error.to_string(),
                        offending_value: error.value().to_string(),
                    });
                    to_string_column(raw)
                }
            };

            if coerced.defaulted > 0 {
                debug!(
                    column = %raw.name,
                    count = coerced.defaulted,
                    "Replaced unparseable or missing numbers with zero"
                );
            }
            report.record_defaults(&raw.name, coerced.defaulted);
            batch.push_column(coerced.column);
        }

        let present: HashSet<&str> = table.column_names().collect();
        report.missing_columns = schema
            .column_names()
            .filter(|name| !present.contains(name))
            .map(str::to_string)
            .collect();
        if !report.missing_columns.is_empty() {
            debug!(columns = ?report.missing_columns, "Schema columns absent from batch");
        }

        (batch, report)
    }

    /// Coerce one column to a type
    pub fn coerce_column(
        &self,
        column: &RawColumn,
        tag: TypeTag,
    ) -> Result<CoercedColumn, CoercionError> {
        match tag {
            TypeTag::Int32 => Ok(numeric_column(column, tag, |n| match n {
                Number::Int(i) => i32::try_from(i).ok().map(Value::Int32),
                Number::Float(f) => float_to_int(f, i32::MIN.into(), i32::MAX.into())
                    .map(|i| Value::Int32(i as i32)),
            })),
            TypeTag::Int64 => Ok(numeric_column(column, tag, |n| match n {
                Number::Int(i) => Some(Value::Int64(i)),
                Number::Float(f) => float_to_int(f, i64::MIN, i64::MAX).map(Value::Int64),
            })),
            TypeTag::Double => Ok(numeric_column(column, tag, |n| match n {
                Number::Int(i) => Some(Value::Double(i as f64)),
                Number::Float(f) if f.is_nan() => None,
                Number::Float(f) => Some(Value::Double(f)),
            })),
            TypeTag::Boolean => boolean_column(column),
            TypeTag::Date | TypeTag::Timestamp => temporal_column(column, tag),
            TypeTag::String => Ok(to_string_column(column)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

fn parse_number(value: &FlatValue) -> Option<Number> {
    match &value.scalar {
        Scalar::Null => None,
        Scalar::Bool(b) => Some(Number::Int(i64::from(*b))),
        Scalar::Int(i) => Some(Number::Int(*i)),
        Scalar::Float(f) => Some(Number::Float(*f)),
        Scalar::Text(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .map(Number::Int)
                .or_else(|_| trimmed.parse::<f64>().map(Number::Float))
                .ok()
        }
    }
}

fn float_to_int(value: f64, min: i64, max: i64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    if truncated < min as f64 || truncated > max as f64 {
        return None;
    }
    Some(truncated as i64)
}

fn zero(tag: TypeTag) -> Value {
    match tag {
        TypeTag::Int32 => Value::Int32(0),
        TypeTag::Int64 => Value::Int64(0),
        _ => Value::Double(0.0),
    }
}

/// Numeric coercion never fails: anything unusable becomes zero
fn numeric_column(
    column: &RawColumn,
    tag: TypeTag,
    convert: impl Fn(Number) -> Option<Value>,
) -> CoercedColumn {
    let mut defaulted = 0;
    let values = column
        .values
        .iter()
        .map(|value| match parse_number(value).and_then(&convert) {
            Some(v) => v,
            None => {
                defaulted += 1;
                zero(tag)
            }
        })
        .collect();
    CoercedColumn {
        column: Column::new(&column.name, tag, values),
        defaulted,
    }
}

fn boolean_column(column: &RawColumn) -> Result<CoercedColumn, CoercionError> {
    let values = column
        .values
        .iter()
        .map(parse_boolean)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CoercedColumn {
        column: Column::new(&column.name, TypeTag::Boolean, values),
        defaulted: 0,
    })
}

fn parse_boolean(value: &FlatValue) -> Result<Value, CoercionError> {
    if value.scalar.is_blank() {
        return Ok(Value::Null);
    }
    let parsed = match &value.scalar {
        Scalar::Null => None,
        Scalar::Bool(b) => Some(*b),
        Scalar::Int(i) => zero_or_one(*i as f64),
        Scalar::Float(f) => zero_or_one(*f),
        Scalar::Text(s) => {
            let trimmed = s.trim();
            if trimmed.eq_ignore_ascii_case("true") {
                Some(true)
            } else if trimmed.eq_ignore_ascii_case("false") {
                Some(false)
            } else if value.attribute_type == Some(AttributeType::N) {
                trimmed.parse::<f64>().ok().and_then(zero_or_one)
            } else {
                None
            }
        }
    };
    parsed.map(Value::Boolean).ok_or_else(|| CoercionError::NotBoolean {
        value: value.scalar.to_string(),
    })
}

fn zero_or_one(value: f64) -> Option<bool> {
    if value == 0.0 {
        Some(false)
    } else if value == 1.0 {
        Some(true)
    } else {
        None
    }
}

fn temporal_column(column: &RawColumn, tag: TypeTag) -> Result<CoercedColumn, CoercionError> {
    let epoch_only = column.is_numeric();
    let mut values = Vec::with_capacity(column.values.len());
    for value in &column.values {
        if value.scalar.is_blank() {
            values.push(Value::Null);
            continue;
        }
        let parsed: ParsedInstant = if epoch_only {
            parse_epoch(&value.scalar)?
        } else {
            parse_datetime(&value.scalar)?
        };
        values.push(match tag {
            TypeTag::Date => Value::Date(parsed.instant.date_naive()),
            _ => Value::Timestamp(parsed.instant),
        });
    }
    Ok(CoercedColumn {
        column: Column::new(&column.name, tag, values),
        defaulted: 0,
    })
}

fn to_string_column(column: &RawColumn) -> CoercedColumn {
    let values = column
        .values
        .iter()
        .map(|v| v.scalar.to_text().map_or(Value::Null, Value::String))
        .collect();
    CoercedColumn {
        column: Column::new(&column.name, TypeTag::String, values),
        defaulted: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn raw(name: &str, values: Vec<Scalar>) -> RawColumn {
        RawColumn::new(name, values.into_iter().map(FlatValue::new).collect())
    }

    fn text(s: &str) -> Scalar {
        Scalar::Text(s.to_string())
    }

    #[test]
    fn test_unparseable_numbers_become_zero() {
        let coercer = SchemaCoercer::new();
        let column = raw("amount", vec![text("not-a-number"), text("2.5"), Scalar::Null]);

        let double = coercer.coerce_column(&column, TypeTag::Double).unwrap();
        assert_eq!(
            double.column.values,
            vec![Value::Double(0.0), Value::Double(2.5), Value::Double(0.0)]
        );
        assert_eq!(double.defaulted, 2);

        let int = coercer.coerce_column(&column, TypeTag::Int32).unwrap();
        assert_eq!(int.column.values[0], Value::Int32(0));
        assert_eq!(int.column.values[1], Value::Int32(2));

        let long = coercer.coerce_column(&column, TypeTag::Int64).unwrap();
        assert_eq!(long.column.values[0], Value::Int64(0));
    }

    #[test]
    fn test_int32_out_of_range_defaults() {
        let column = raw("n", vec![Scalar::Int(2_147_483_648), Scalar::Int(-5)]);
        let coerced = SchemaCoercer::new().coerce_column(&column, TypeTag::Int32).unwrap();
        assert_eq!(coerced.column.values, vec![Value::Int32(0), Value::Int32(-5)]);
        assert_eq!(coerced.defaulted, 1);
    }

    #[test]
    fn test_boolean_coercion() {
        let column = raw(
            "flag",
            vec![
                Scalar::Bool(true),
                text("FALSE"),
                Scalar::Int(1),
                Scalar::Float(0.0),
                Scalar::Null,
            ],
        );
        let coerced = SchemaCoercer::new().coerce_column(&column, TypeTag::Boolean).unwrap();
        assert_eq!(
            coerced.column.values,
            vec![
                Value::Boolean(true),
                Value::Boolean(false),
                Value::Boolean(true),
                Value::Boolean(false),
                Value::Null,
            ]
        );
    }

    #[test]
    fn test_boolean_numeric_text_needs_descriptor() {
        let tagged = RawColumn::new(
            "flag",
            vec![FlatValue::typed(text("1"), AttributeType::N)],
        );
        assert!(SchemaCoercer::new().coerce_column(&tagged, TypeTag::Boolean).is_ok());

        let untagged = raw("flag", vec![text("1")]);
        assert!(matches!(
            SchemaCoercer::new().coerce_column(&untagged, TypeTag::Boolean),
            Err(CoercionError::NotBoolean { .. })
        ));
    }

    #[test]
    fn test_epoch_columns_to_date_and_timestamp() {
        let column = RawColumn::new(
            "updated_at",
            vec![
                FlatValue::typed(text("1700000000"), AttributeType::N),
                FlatValue::typed(text("1700000000000"), AttributeType::N),
                FlatValue::null(),
            ],
        );
        let coercer = SchemaCoercer::new();

        let date = coercer.coerce_column(&column, TypeTag::Date).unwrap();
        let expected = NaiveDate::from_ymd_opt(2023, 11, 14).unwrap();
        assert_eq!(date.column.values[0], Value::Date(expected));
        assert_eq!(date.column.values[1], Value::Date(expected));
        assert_eq!(date.column.values[2], Value::Null);

        let ts = coercer.coerce_column(&column, TypeTag::Timestamp).unwrap();
        assert_eq!(
            ts.column.values[0],
            Value::Timestamp(Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap())
        );
    }

    #[test]
    fn test_string_dates_parse_per_value() {
        let column = raw("created", vec![text("2024-07-30 18:27:00"), text("30-07-2024 18:27:00")]);
        let coerced = SchemaCoercer::new().coerce_column(&column, TypeTag::Timestamp).unwrap();
        assert_eq!(coerced.column.values[0], coerced.column.values[1]);
    }

    #[test]
    fn test_unparseable_date_fails_column() {
        let column = raw("created", vec![text("2024-07-30"), text("invalid-date")]);
        let err = SchemaCoercer::new()
            .coerce_column(&column, TypeTag::Date)
            .unwrap_err();
        assert_eq!(err.value(), "invalid-date");
    }

    #[test]
    fn test_coerce_degrades_instead_of_failing() {
        let mut table = RawTable::new();
        table.push_column(raw("id", vec![text("1"), text("2")]));
        table.push_column(raw("created", vec![text("2024-07-30"), text("invalid-date")]));

        let schema: Schema = [
            ("id", TypeTag::Int32),
            ("created", TypeTag::Date),
            ("gone", TypeTag::String),
        ]
        .into_iter()
        .collect();

        let (batch, report) = SchemaCoercer::new().coerce(&table, &schema);

        assert_eq!(batch.schema().get("created"), Some(TypeTag::String));
        assert_eq!(batch.value("created", 1), Some(&Value::String("invalid-date".into())));
        assert_eq!(batch.value("id", 1), Some(&Value::Int32(2)));
        assert!(report.is_degraded("created"));
        assert_eq!(report.degraded_columns[0].declared, TypeTag::Date);
        assert_eq!(report.missing_columns, vec!["gone".to_string()]);
        assert!(!batch.contains("gone"));
    }

    #[test]
    fn test_string_rendering() {
        let column = raw(
            "s",
            vec![Scalar::Bool(true), Scalar::Float(2.0), Scalar::Int(3), Scalar::Null],
        );
        let coerced = SchemaCoercer::new().coerce_column(&column, TypeTag::String).unwrap();
        assert_eq!(
            coerced.column.values,
            vec![
                Value::String("true".into()),
                Value::String("2.0".into()),
                Value::String("3".into()),
                Value::Null,
            ]
        );
    }
}
