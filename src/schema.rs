//! Column types and schemas

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Concrete type of an output column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeTag {
    /// Signed 32-bit integer (`int`)
    Int32,
    /// Signed 64-bit integer (`bigint`)
    Int64,
    /// 64-bit float
    Double,
    Boolean,
    String,
    /// Calendar date, a timestamp with zero time-of-day
    Date,
    /// UTC instant with time-of-day
    Timestamp,
}

impl TypeTag {
    /// Catalog spelling of this type
    pub fn catalog_name(&self) -> &'static str {
        match self {
            TypeTag::Int32 => "int",
            TypeTag::Int64 => "bigint",
            TypeTag::Double => "double",
            TypeTag::Boolean => "boolean",
            TypeTag::String => "string",
            TypeTag::Date => "date",
            TypeTag::Timestamp => "timestamp",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, TypeTag::Int32 | TypeTag::Int64 | TypeTag::Double)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, TypeTag::Date | TypeTag::Timestamp)
    }

    /// Lenient catalog parsing: unrecognised spellings fall back to string
    pub fn from_catalog(name: &str) -> TypeTag {
        name.parse().unwrap_or(TypeTag::String)
    }
}

impl FromStr for TypeTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "int" | "int32" | "integer" => Ok(TypeTag::Int32),
            "bigint" | "int64" | "long" => Ok(TypeTag::Int64),
            "double" | "float" | "float64" | "float32" => Ok(TypeTag::Double),
            "boolean" | "bool" => Ok(TypeTag::Boolean),
            "string" | "varchar" => Ok(TypeTag::String),
            "date" => Ok(TypeTag::Date),
            "timestamp" => Ok(TypeTag::Timestamp),
            _ => Err(format!("Unknown column type: {}", s)),
        }
    }
}

impl From<String> for TypeTag {
    fn from(value: String) -> Self {
        TypeTag::from_catalog(&value)
    }
}

impl From<TypeTag> for String {
    fn from(value: TypeTag) -> Self {
        value.catalog_name().to_string()
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.catalog_name())
    }
}

/// Mapping from column name to type
///
/// Schemas are values: operations that add or remove columns return a new
/// schema and leave the receiver untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    columns: BTreeMap<String, TypeTag>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<TypeTag> {
        self.columns.get(column).copied()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, TypeTag)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Copy of this schema with one column set
    pub fn with_column(&self, column: impl Into<String>, tag: TypeTag) -> Schema {
        let mut next = self.clone();
        next.columns.insert(column.into(), tag);
        next
    }

    /// Copy of this schema without the given columns
    pub fn without<'a>(&self, columns: impl IntoIterator<Item = &'a str>) -> Schema {
        let mut next = self.clone();
        for column in columns {
            next.columns.remove(column);
        }
        next
    }

    /// Copy of this schema restricted to the given columns
    pub fn restricted_to<'a>(&self, columns: impl IntoIterator<Item = &'a str>) -> Schema {
        columns
            .into_iter()
            .filter_map(|c| self.get(c).map(|t| (c.to_string(), t)))
            .collect()
    }

    /// Add every column of `other` that this schema does not define yet
    pub fn merged_with(&self, other: &Schema) -> Schema {
        let mut next = self.clone();
        for (column, tag) in other.iter() {
            next.columns.entry(column.to_string()).or_insert(tag);
        }
        next
    }
}

impl FromIterator<(String, TypeTag)> for Schema {
    fn from_iter<I: IntoIterator<Item = (String, TypeTag)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, TypeTag)> for Schema {
    fn from_iter<I: IntoIterator<Item = (&'a str, TypeTag)>>(iter: I) -> Self {
        iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_spellings() {
        assert_eq!(TypeTag::from_catalog("int"), TypeTag::Int32);
        assert_eq!(TypeTag::from_catalog("BIGINT"), TypeTag::Int64);
        assert_eq!(TypeTag::from_catalog("float"), TypeTag::Double);
        assert_eq!(TypeTag::from_catalog("array<string>"), TypeTag::String);
        assert_eq!(TypeTag::Int64.to_string(), "bigint");
    }

    #[test]
    fn test_schema_json_roundtrip() {
        let schema: Schema =
            serde_json::from_str(r#"{"id": "int", "name": "string", "amount": "double"}"#).unwrap();
        assert_eq!(schema.get("id"), Some(TypeTag::Int32));
        assert_eq!(schema.get("amount"), Some(TypeTag::Double));

        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["id"], "int");
    }

    #[test]
    fn test_schema_operations_return_new_values() {
        let declared: Schema = [("a", TypeTag::Int32), ("b", TypeTag::String)]
            .into_iter()
            .collect();

        let extended = declared.with_column("c", TypeTag::String);
        let pruned = declared.without(["a"]);

        assert_eq!(declared.len(), 2);
        assert_eq!(extended.len(), 3);
        assert_eq!(pruned.column_names().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_merged_with_keeps_existing_types() {
        let left: Schema = [("a", TypeTag::Int32)].into_iter().collect();
        let right: Schema = [("a", TypeTag::String), ("b", TypeTag::Date)]
            .into_iter()
            .collect();

        let merged = left.merged_with(&right);
        assert_eq!(merged.get("a"), Some(TypeTag::Int32));
        assert_eq!(merged.get("b"), Some(TypeTag::Date));
    }
}
