// Provider snapshot domain model, as returned by the metrics backend
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Sample columns that never become part of a series key
pub const RESERVED_FIELDS: [&str; 3] = ["id", "timestamp", "counter"];

/// One row of raw provider data.
///
/// `id`, `counter` and `timestamp` are bound to fixed columns; every other key
/// the backend sends lands in `fields`, in the order it appeared on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderSample {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub counter: f64,
    /// Epoch seconds
    #[serde(default, deserialize_with = "lenient_i64")]
    pub timestamp: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ProviderSample {
    #[cfg(test)]
    pub fn new(id: i64, counter: f64, timestamp: i64) -> Self {
        Self {
            id,
            counter,
            timestamp,
            fields: Map::new(),
        }
    }

    #[cfg(test)]
    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Non-reserved fields in wire order
    pub fn value_fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields
            .iter()
            .filter(|(name, _)| !is_reserved(name))
            .map(|(name, value)| (name.as_str(), value))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub name: String,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub data: Vec<ProviderSample>,
}

#[cfg(test)]
impl Provider {
    pub fn new(name: impl Into<String>, is_custom: bool, data: Vec<ProviderSample>) -> Self {
        Self {
            name: name.into(),
            is_custom,
            data,
        }
    }
}

/// One server response: the latest window of samples across all providers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvidersSnapshot {
    /// Epoch millis hint for the next poll, display only
    #[serde(default)]
    pub next_update_time: i64,
    #[serde(default)]
    pub providers: Vec<Provider>,
}

pub fn is_reserved(field: &str) -> bool {
    RESERVED_FIELDS.contains(&field)
}

/// Coerce a raw field value to a number; anything that is not a number reads as 0
pub fn coerce_numeric(value: &Value) -> f64 {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    };

    number.filter(|n| !n.is_nan()).unwrap_or(0.0)
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Value::deserialize(deserializer).map(|value| coerce_numeric(&value))
}

// Fractions truncate, out-of-range values saturate
fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    lenient_f64(deserializer).map(|n| n as i64)
}
