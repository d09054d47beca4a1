// Custom metric scripts authored by the user and run by the backend
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on counter suggestions offered while typing a metric name
pub const MAX_COUNTER_SUGGESTIONS: usize = 400;

pub const DEFAULT_SCRIPT_TEXT: &str = r#"/**
 * This function is called on each cycle of the metrics runner.
 * To get the current metric value from PDH for this cycle, use the function `getCounterValue`.
 * It returns a `double` value which is the counter value for this cycle.
 * You can save metric values to the database by calling `persist` which accepts a `double` value.
 *
 * Ideally, you should save a value for this custom script provider on each cycle.
 *
 * @returns {void} There is no return value from this function.
 */
function execute() {

};"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    pub name: String,
    pub script_text: String,
    /// PDH counter path the script reads through `getCounterValue()`
    pub metric_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ScriptList {
    #[serde(default)]
    pub scripts: Vec<Script>,
}

#[derive(Debug, Deserialize)]
pub struct CounterList {
    #[serde(default)]
    pub counters: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("script name is required")]
    MissingName,
    #[error("metric name is required")]
    MissingMetric,
    #[error("script text is required")]
    MissingText,
    #[error("script text is unchanged from the template")]
    Unchanged,
    #[error("script '{0}' not found")]
    NotFound(String),
}

impl Script {
    pub fn new(name: impl Into<String>, script_text: impl Into<String>, metric_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script_text: script_text.into(),
            metric_name: metric_name.into(),
        }
    }

    /// A new script must be named, bound to a metric and differ from the template
    pub fn validate_new(&self) -> Result<(), ScriptError> {
        self.validate_fields()?;
        if self.script_text == DEFAULT_SCRIPT_TEXT {
            return Err(ScriptError::Unchanged);
        }
        Ok(())
    }

    pub fn validate_update(&self) -> Result<(), ScriptError> {
        self.validate_fields()
    }

    fn validate_fields(&self) -> Result<(), ScriptError> {
        if self.name.trim().is_empty() {
            return Err(ScriptError::MissingName);
        }
        if self.metric_name.trim().is_empty() {
            return Err(ScriptError::MissingMetric);
        }
        if self.script_text.is_empty() {
            return Err(ScriptError::MissingText);
        }
        Ok(())
    }
}

/// Case-insensitive substring filter over counter paths, capped at `limit`
pub fn filter_counters<'a>(counters: &'a [String], filter: &str, limit: usize) -> Vec<&'a str> {
    let needle = filter.to_lowercase();
    counters
        .iter()
        .filter(|c| needle.is_empty() || c.to_lowercase().contains(&needle))
        .take(limit)
        .map(String::as_str)
        .collect()
}
