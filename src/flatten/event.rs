//! Change-event envelopes and stream payload decoding

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::FlattenError;
use super::flattener::RawRecord;

/// Names of the sections inside a change record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordLayout {
    /// Envelope key holding the images (`dynamodb`)
    pub section: String,
    /// Image retained for output
    pub new_image: String,
    /// Image discarded before flattening
    pub old_image: String,
    /// Primary key section
    pub keys: String,
}

impl Default for RecordLayout {
    fn default() -> Self {
        Self {
            section: "dynamodb".to_string(),
            new_image: "NewImage".to_string(),
            old_image: "OldImage".to_string(),
            keys: "Keys".to_string(),
        }
    }
}

/// How a raw record is shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// Full stream event with the section envelope
    ChangeEvent,
    /// The section body alone (`{"NewImage": ..., "Keys": ...}`)
    SectionBody,
    /// A plain item from a table scan
    Item,
}

impl RecordLayout {
    pub fn shape(&self, record: &RawRecord) -> RecordShape {
        if record.get(&self.section).is_some_and(Value::is_object) {
            RecordShape::ChangeEvent
        } else if record.contains_key(&self.new_image) || record.contains_key(&self.old_image) {
            RecordShape::SectionBody
        } else {
            RecordShape::Item
        }
    }

    /// Copy of the record without its old image
    pub fn strip_old_image(&self, record: &RawRecord) -> RawRecord {
        let mut stripped = record.clone();
        match self.shape(record) {
            RecordShape::ChangeEvent => {
                if let Some(Value::Object(section)) = stripped.get_mut(&self.section) {
                    section.remove(&self.old_image);
                }
            }
            RecordShape::SectionBody => {
                stripped.remove(&self.old_image);
            }
            RecordShape::Item => {}
        }
        stripped
    }

    /// Flattened key prefix of the new image, e.g. `dynamodb_NewImage_`
    pub fn image_prefix(&self, separator: &str) -> String {
        format!("{}{sep}{}{sep}", self.section, self.new_image, sep = separator)
    }

    /// Flattened key prefix of the key section, e.g. `dynamodb_Keys_`
    pub fn keys_prefix(&self, separator: &str) -> String {
        format!("{}{sep}{}{sep}", self.section, self.keys, sep = separator)
    }
}

/// Decode one base64 stream payload into a raw record
///
/// Empty `{}` and `[]` values are kept as-is here; [`Flattener`] turns them
/// into null leaves.
///
/// [`Flattener`]: super::Flattener
pub fn decode_stream_record(data: &str) -> Result<RawRecord, FlattenError> {
    let bytes = STANDARD.decode(data.trim())?;
    let text = String::from_utf8(bytes)?;
    match serde_json::from_str::<Value>(&text)? {
        Value::Object(map) => Ok(map),
        other => Err(FlattenError::InvalidStructure(json_type_name(&other).to_string())),
    }
}

/// Decode every record of a stream delivery (`{"Records": [{"kinesis": {"data": ...}}]}`)
pub fn decode_stream_event(event: &Value) -> Result<Vec<RawRecord>, FlattenError> {
    let records = event
        .get("Records")
        .and_then(Value::as_array)
        .ok_or(FlattenError::MissingField("Records"))?;

    records
        .iter()
        .map(|record| {
            let data = record
                .get("kinesis")
                .and_then(|k| k.get("data"))
                .and_then(Value::as_str)
                .ok_or(FlattenError::MissingField("kinesis.data"))?;
            decode_stream_record(data)
        })
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
