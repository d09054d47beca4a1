// Server configuration document as edited by the user
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigDiagnostic {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// JSON diagnostics for a draft; empty when the draft parses
pub fn diagnose(text: &str) -> Vec<ConfigDiagnostic> {
    match serde_json::from_str::<Value>(text) {
        Ok(_) => Vec::new(),
        Err(e) => vec![ConfigDiagnostic {
            message: e.to_string(),
            line: e.line(),
            column: e.column(),
        }],
    }
}

/// The document as last loaded from or saved to the backend
#[derive(Debug, Clone, Default)]
pub struct ConfigBaseline {
    text: String,
    value: Option<Value>,
}

impl ConfigBaseline {
    pub fn new(text: String) -> Self {
        let value = serde_json::from_str(&text).ok();
        Self { text, value }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// True only for a valid draft that differs semantically from the baseline.
    /// Whitespace and formatting changes do not count.
    pub fn has_changed(&self, draft: &str) -> bool {
        let Some(baseline) = &self.value else {
            return false;
        };
        match serde_json::from_str::<Value>(draft) {
            Ok(value) => &value != baseline,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnose_reports_position() {
        assert!(diagnose(r#"{"a": 1}"#).is_empty());

        let diagnostics = diagnose("{\n  \"a\": 1,\n}");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 3);
    }

    #[test]
    fn test_has_changed_ignores_formatting() {
        let baseline = ConfigBaseline::new(r#"{"interval": 5, "db": "metrics.db"}"#.to_string());

        assert!(!baseline.has_changed("{\r\n  \"interval\": 5,\r\n  \"db\": \"metrics.db\"\r\n}"));
        assert!(baseline.has_changed(r#"{"interval": 10, "db": "metrics.db"}"#));
        assert!(!baseline.has_changed(r#"{"interval": "#));
    }

    #[test]
    fn test_unloaded_baseline_never_changes() {
        let baseline = ConfigBaseline::default();
        assert!(!baseline.has_changed(r#"{"a": 1}"#));
    }
}
