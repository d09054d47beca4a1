// Per-series aggregate lookup model
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SEPARATOR: char = '.';

/// A series key resolved into the provider/column pair the backend expects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesRef {
    BuiltIn { provider: String, field: String },
    Custom { provider: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeriesRefError {
    #[error("series key is empty")]
    Empty,
    #[error("series key '{0}' has an empty provider or field")]
    EmptySegment(String),
}

impl SeriesRef {
    /// Split on the last separator; a key without one names a custom provider
    pub fn parse(key: &str) -> Result<Self, SeriesRefError> {
        if key.is_empty() {
            return Err(SeriesRefError::Empty);
        }

        match key.rfind(SEPARATOR) {
            None => Ok(Self::Custom {
                provider: key.to_string(),
            }),
            Some(idx) => {
                let (provider, field) = (&key[..idx], &key[idx + 1..]);
                if provider.is_empty() || field.is_empty() {
                    return Err(SeriesRefError::EmptySegment(key.to_string()));
                }
                Ok(Self::BuiltIn {
                    provider: provider.to_string(),
                    field: field.to_string(),
                })
            }
        }
    }

    pub fn to_query(&self) -> AggregateQuery {
        match self {
            Self::BuiltIn { provider, field } => AggregateQuery {
                is_custom: 0,
                name: provider.clone(),
                column: Some(field.clone()),
            },
            Self::Custom { provider } => AggregateQuery {
                is_custom: 1,
                name: provider.clone(),
                column: None,
            },
        }
    }
}

/// Query parameters of `/api/provider/aggregate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateQuery {
    pub is_custom: u8,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
}

impl AggregateQuery {
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("isCustom".to_string(), self.is_custom.to_string()),
            ("name".to_string(), self.name.clone()),
        ];
        if let Some(column) = &self.column {
            pairs.push(("column".to_string(), column.clone()));
        }
        pairs
    }
}

/// Server-computed summary statistics for one series
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderAggregate {
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
    #[serde(default)]
    pub avg: f64,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub count: f64,
}

#[derive(Debug, Deserialize)]
pub struct AggregateEnvelope {
    pub data: ProviderAggregate,
}
