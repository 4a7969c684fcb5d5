//! Nested record flattening

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::event::{RecordLayout, RecordShape};
use super::value::{AttributeType, FlatValue, Scalar};

/// A record as received from the source, with insertion order preserved
pub type RawRecord = serde_json::Map<String, Value>;

/// A single-level record: path-joined key to scalar value
///
/// Keys are unique and keep the order in which the flattener produced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatRecord {
    entries: IndexMap<String, FlatValue>,
}

impl FlatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&FlatValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace a value, keeping the original position on replace
    pub fn insert(&mut self, key: impl Into<String>, value: FlatValue) {
        self.entries.insert(key.into(), value);
    }

    /// Insert only if the key is not present yet
    ///
    /// Returns `true` when the value was inserted.
    pub fn insert_if_absent(&mut self, key: impl Into<String>, value: FlatValue) -> bool {
        match self.entries.entry(key.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlatValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Find the first key accepted by the predicate
    pub fn find_key(&self, mut predicate: impl FnMut(&str) -> bool) -> Option<&str> {
        self.keys().find(|k| predicate(k))
    }
}

impl IntoIterator for FlatRecord {
    type Item = (String, FlatValue);
    type IntoIter = indexmap::map::IntoIter<String, FlatValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, FlatValue)> for FlatRecord {
    fn from_iter<I: IntoIterator<Item = (String, FlatValue)>>(iter: I) -> Self {
        let mut record = FlatRecord::new();
        for (k, v) in iter {
            record.insert_if_absent(k, v);
        }
        record
    }
}

/// Flattening options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlattenConfig {
    /// Path separator, `_` or `/`
    pub separator: String,
    /// Prefix prepended verbatim to every produced key
    pub prefix: String,
    /// Report empty strings as null
    pub empty_strings_as_null: bool,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            separator: "_".to_string(),
            prefix: String::new(),
            empty_strings_as_null: true,
        }
    }
}

/// Turns nested attribute maps into [`FlatRecord`]s
#[derive(Debug, Clone, Default)]
pub struct Flattener {
    config: FlattenConfig,
}

impl Flattener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FlattenConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FlattenConfig {
        &self.config
    }

    /// Flatten a record using the configured prefix
    pub fn flatten(&self, record: &RawRecord) -> FlatRecord {
        self.flatten_with_prefix(record, &self.config.prefix)
    }

    /// Flatten a record with an explicit key prefix
    pub fn flatten_with_prefix(&self, record: &RawRecord, prefix: &str) -> FlatRecord {
        let mut out = FlatRecord::new();
        for (key, value) in record {
            self.walk(value, key, None, &mut out);
        }
        if prefix.is_empty() {
            return out;
        }
        out.into_iter()
            .map(|(k, v)| (format!("{}{}", prefix, k), v))
            .collect()
    }

    /// Flatten a source record according to its shape
    ///
    /// Change events keep their envelope, section bodies are placed under the
    /// record section and scanned items under the new-image section. Old
    /// images are always discarded first.
    pub fn flatten_source(&self, layout: &RecordLayout, record: &RawRecord) -> FlatRecord {
        let sep = &self.config.separator;
        let stripped = layout.strip_old_image(record);
        let shape_prefix = match layout.shape(record) {
            RecordShape::ChangeEvent => String::new(),
            RecordShape::SectionBody => format!("{}{}", layout.section, sep),
            RecordShape::Item => layout.image_prefix(sep),
        };
        let prefix = format!("{}{}", self.config.prefix, shape_prefix);
        self.flatten_with_prefix(&stripped, &prefix)
    }

    fn join(&self, path: &str, key: &str) -> String {
        if path.is_empty() {
            key.to_string()
        } else {
            format!("{}{}{}", path, self.config.separator, key)
        }
    }

    fn walk(
        &self,
        value: &Value,
        path: &str,
        hint: Option<AttributeType>,
        out: &mut FlatRecord,
    ) {
        match value {
            Value::Object(map) if map.is_empty() => {
                out.insert_if_absent(path, leaf(Scalar::Null, hint));
            }
            Value::Array(items) if items.is_empty() => {
                out.insert_if_absent(path, leaf(Scalar::Null, hint));
            }
            Value::Object(map) => {
                let wrapper = if map.len() == 1 {
                    map.keys().next().and_then(|k| AttributeType::from_descriptor(k))
                } else {
                    None
                };
                for (key, child) in map {
                    let child_hint = match wrapper {
                        // Nested containers describe their own children
                        Some(AttributeType::Map) | Some(AttributeType::List) => None,
                        other => other,
                    };
                    self.walk(child, &self.join(path, key), child_hint, out);
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    self.walk(child, &self.join(path, &index.to_string()), hint, out);
                }
            }
            _ => {
                let mut scalar = Scalar::from_json(value);
                if hint == Some(AttributeType::Null)
                    || (self.config.empty_strings_as_null && scalar.is_blank())
                {
                    scalar = Scalar::Null;
                }
                out.insert_if_absent(path, leaf(scalar, hint));
            }
        }
    }
}

fn leaf(scalar: Scalar, hint: Option<AttributeType>) -> FlatValue {
    FlatValue {
        scalar,
        attribute_type: hint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_flatten_nested_paths() {
        let record = raw(json!({"a": {"b": {"c": 1}}, "d": "x"}));
        let flat = Flattener::new().flatten(&record);

        assert_eq!(flat.get("a_b_c").unwrap().scalar, Scalar::Int(1));
        assert_eq!(flat.get("d").unwrap().scalar, Scalar::Text("x".into()));
        assert_eq!(flat.keys().collect::<Vec<_>>(), vec!["a_b_c", "d"]);
    }

    #[test]
    fn test_empty_containers_become_null() {
        let record = raw(json!({"empty_list": [], "empty_dict": {}, "empty_string": ""}));
        let flat = Flattener::new().flatten(&record);

        assert!(flat.get("empty_list").unwrap().is_null());
        assert!(flat.get("empty_dict").unwrap().is_null());
        assert!(flat.get("empty_string").unwrap().is_null());
    }

    #[test]
    fn test_lists_use_index_segments() {
        let record = raw(json!({"tags": ["a", "b"]}));
        let flat = Flattener::new().flatten(&record);
        assert_eq!(flat.get("tags_0").unwrap().scalar, Scalar::Text("a".into()));
        assert_eq!(flat.get("tags_1").unwrap().scalar, Scalar::Text("b".into()));
    }

    #[test]
    fn test_typed_wrappers_keep_descriptor() {
        let record = raw(json!({
            "id": {"S": "42"},
            "count": {"N": "7"},
            "flags": {"SS": ["x", "y"]},
            "nested": {"M": {"inner": {"BOOL": true}}}
        }));
        let flat = Flattener::new().flatten(&record);

        let id = flat.get("id_S").unwrap();
        assert_eq!(id.scalar, Scalar::Text("42".into()));
        assert_eq!(id.attribute_type, Some(AttributeType::S));

        assert_eq!(flat.get("count_N").unwrap().attribute_type, Some(AttributeType::N));
        assert_eq!(
            flat.get("flags_SS_1").unwrap().attribute_type,
            Some(AttributeType::StringSet)
        );

        let inner = flat.get("nested_M_inner_BOOL").unwrap();
        assert_eq!(inner.scalar, Scalar::Bool(true));
        assert_eq!(inner.attribute_type, Some(AttributeType::Bool));
    }

    #[test]
    fn test_flatten_wide_list() {
        let readings: Vec<Value> = (0..20_000).map(|i| json!({"N": i.to_string()})).collect();
        let record = raw(json!({"readings": {"L": readings}}));
        let flat = Flattener::new().flatten(&record);

        assert_eq!(flat.len(), 20_000);
        assert_eq!(flat.keys().next(), Some("readings_L_0_N"));
        assert_eq!(flat.keys().last(), Some("readings_L_19999_N"));
        assert_eq!(
            flat.get("readings_L_12345_N").unwrap().scalar,
            Scalar::Text("12345".into())
        );
    }

    #[test]
    fn test_record_insert_keeps_position() {
        let mut record = FlatRecord::new();
        record.insert("a", FlatValue::new(Scalar::Int(1)));
        record.insert("b", FlatValue::new(Scalar::Int(2)));
        assert!(!record.insert_if_absent("a", FlatValue::new(Scalar::Int(9))));
        record.insert("a", FlatValue::new(Scalar::Int(3)));

        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(record.get("a").unwrap().scalar, Scalar::Int(3));
    }

    #[test]
    fn test_prefix_and_separator() {
        let config = FlattenConfig {
            separator: "/".to_string(),
            prefix: "img/".to_string(),
            ..Default::default()
        };
        let record = raw(json!({"a": {"b": 1}}));
        let flat = Flattener::with_config(config).flatten(&record);
        assert!(flat.contains_key("img/a/b"));
    }

    #[test]
    fn test_flatten_source_shapes() {
        let layout = RecordLayout::default();
        let flattener = Flattener::new();

        let item = raw(json!({"id": {"S": "1"}}));
        let flat = flattener.flatten_source(&layout, &item);
        assert!(flat.contains_key("dynamodb_NewImage_id_S"));

        let body = raw(json!({"NewImage": {"id": {"S": "1"}}, "OldImage": {"id": {"S": "0"}}}));
        let flat = flattener.flatten_source(&layout, &body);
        assert!(flat.contains_key("dynamodb_NewImage_id_S"));
        assert!(!flat.contains_key("dynamodb_OldImage_id_S"));

        let event = raw(json!({
            "eventName": "MODIFY",
            "dynamodb": {
                "Keys": {"id": {"S": "1"}},
                "NewImage": {"id": {"S": "1"}},
                "OldImage": {"id": {"S": "0"}}
            }
        }));
        let flat = flattener.flatten_source(&layout, &event);
        assert!(flat.contains_key("eventName"));
        assert!(flat.contains_key("dynamodb_Keys_id_S"));
        assert!(flat.contains_key("dynamodb_NewImage_id_S"));
        assert!(flat.keys().all(|k| !k.contains("OldImage")));
    }
}
