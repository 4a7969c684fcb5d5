//! Scalar values produced by flattening

use std::fmt;

use serde::{Deserialize, Serialize};

/// Type descriptor attached to an attribute by the key-value store
///
/// A mapping with exactly one of these keys (`{"S": "text"}`, `{"N": "12"}`)
/// is a typed wrapper. The descriptor travels with the flattened leaf so that
/// later stages never have to guess intent from a column suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeType {
    /// String
    #[serde(rename = "S")]
    S,
    /// Number, transported as a decimal string
    #[serde(rename = "N")]
    N,
    /// Binary, base64 encoded
    #[serde(rename = "B")]
    B,
    /// Boolean
    #[serde(rename = "BOOL")]
    Bool,
    /// Explicit null marker
    #[serde(rename = "NULL")]
    Null,
    /// String set
    #[serde(rename = "SS")]
    StringSet,
    /// Number set
    #[serde(rename = "NS")]
    NumberSet,
    /// Binary set
    #[serde(rename = "BS")]
    BinarySet,
    /// Nested map
    #[serde(rename = "M")]
    Map,
    /// Nested list
    #[serde(rename = "L")]
    List,
}

impl AttributeType {
    /// Recognise a descriptor key
    pub fn from_descriptor(key: &str) -> Option<Self> {
        match key {
            "S" => Some(AttributeType::S),
            "N" => Some(AttributeType::N),
            "B" => Some(AttributeType::B),
            "BOOL" => Some(AttributeType::Bool),
            "NULL" => Some(AttributeType::Null),
            "SS" => Some(AttributeType::StringSet),
            "NS" => Some(AttributeType::NumberSet),
            "BS" => Some(AttributeType::BinarySet),
            "M" => Some(AttributeType::Map),
            "L" => Some(AttributeType::List),
            _ => None,
        }
    }

    /// The descriptor key as it appears on the wire
    pub fn descriptor(&self) -> &'static str {
        match self {
            AttributeType::S => "S",
            AttributeType::N => "N",
            AttributeType::B => "B",
            AttributeType::Bool => "BOOL",
            AttributeType::Null => "NULL",
            AttributeType::StringSet => "SS",
            AttributeType::NumberSet => "NS",
            AttributeType::BinarySet => "BS",
            AttributeType::Map => "M",
            AttributeType::List => "L",
        }
    }

    /// Whether the descriptor announces numeric content
    pub fn is_numeric(&self) -> bool {
        matches!(self, AttributeType::N | AttributeType::NumberSet)
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor())
    }
}

/// A leaf value after flattening
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Null or the empty string
    pub fn is_blank(&self) -> bool {
        match self {
            Scalar::Null => true,
            Scalar::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Scalar::Int(_) | Scalar::Float(_))
    }

    /// Textual rendering used for sampling and string coercion
    ///
    /// Returns `None` for nulls.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Scalar::Null => None,
            Scalar::Bool(b) => Some(b.to_string()),
            Scalar::Int(i) => Some(i.to_string()),
            Scalar::Float(f) => Some(format_float(*f)),
            Scalar::Text(s) => Some(s.clone()),
        }
    }

    /// Convert a JSON leaf into a scalar
    ///
    /// Containers are not leaves; callers flatten them first. An empty
    /// container is reported as null.
    pub fn from_json(value: &serde_json::Value) -> Scalar {
        match value {
            serde_json::Value::Null => Scalar::Null,
            serde_json::Value::Bool(b) => Scalar::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Scalar::Int(i)
                } else {
                    n.as_f64().map(Scalar::Float).unwrap_or(Scalar::Null)
                }
            }
            serde_json::Value::String(s) => Scalar::Text(s.clone()),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => Scalar::Null,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Some(text) => f.write_str(&text),
            None => f.write_str("null"),
        }
    }
}

/// Render floats the way the source system prints them (`2.0`, not `2`)
pub(crate) fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// A flattened value together with the descriptor it arrived under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatValue {
    pub scalar: Scalar,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_type: Option<AttributeType>,
}

impl FlatValue {
    pub fn new(scalar: Scalar) -> Self {
        Self {
            scalar,
            attribute_type: None,
        }
    }

    pub fn typed(scalar: Scalar, attribute_type: AttributeType) -> Self {
        Self {
            scalar,
            attribute_type: Some(attribute_type),
        }
    }

    pub fn null() -> Self {
        Self::new(Scalar::Null)
    }

    pub fn is_null(&self) -> bool {
        self.scalar.is_null()
    }

    /// Whether this value is numeric either natively or by declaration
    pub fn is_numeric(&self) -> bool {
        match &self.scalar {
            Scalar::Int(_) | Scalar::Float(_) => true,
            Scalar::Text(s) => {
                self.attribute_type.is_some_and(|t| t.is_numeric())
                    && s.trim().parse::<f64>().is_ok()
            }
            _ => false,
        }
    }
}

impl From<Scalar> for FlatValue {
    fn from(scalar: Scalar) -> Self {
        FlatValue::new(scalar)
    }
}
