//! Output formatting for the command-line client.
//!
//! CHANGELOG:
//! - 10/14/2026 - Event lines for --follow; char-safe truncation
//! - 10/12/2026 - Initial implementation

use serde::Serialize;
use serde_json::{json, Value};

use crate::bridge::EventFrame;

/// Output control settings from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct OutputControls {
    pub compact: bool,
    /// Comma-separated field allowlist
    pub fields: Option<String>,
    pub max_text_chars: Option<usize>,
}

impl OutputControls {
    /// Render data according to output controls.
    pub fn emit<T: Serialize>(&self, data: &T) -> String {
        let value = serde_json::to_value(data).unwrap_or(json!(null));

        let filtered = match self.fields {
            Some(ref fields) => filter_fields(&value, fields),
            None => value,
        };

        let truncated = match self.max_text_chars {
            Some(max_chars) => truncate_text_fields(&filtered, max_chars),
            None => filtered,
        };

        if self.compact {
            serde_json::to_string(&truncated).unwrap_or_else(|_| "{}".to_string())
        } else {
            serde_json::to_string_pretty(&truncated).unwrap_or_else(|_| "{}".to_string())
        }
    }

    /// Print data to stdout according to output controls.
    pub fn print<T: Serialize>(&self, data: &T) {
        println!("{}", self.emit(data));
    }

    /// One line per pushed event: `[node-log] Core initialized OK`.
    pub fn format_event(&self, frame: &EventFrame) -> String {
        let data = match frame.data {
            Value::Null => String::new(),
            Value::String(ref line) => line.clone(),
            ref other => serde_json::to_string(other).unwrap_or_default(),
        };
        let data = match self.max_text_chars {
            Some(max_chars) => truncate(&data, max_chars),
            None => data,
        };
        if data.is_empty() {
            format!("[{}]", frame.event)
        } else {
            format!("[{}] {}", frame.event, data)
        }
    }
}

/// Filter JSON value to only include specified fields.
fn filter_fields(value: &Value, fields: &str) -> Value {
    let field_list: Vec<&str> = fields.split(',').map(|s| s.trim()).collect();

    match value {
        Value::Array(arr) => {
            Value::Array(arr.iter().map(|v| filter_fields(v, fields)).collect())
        }
        Value::Object(map) => {
            let mut filtered = serde_json::Map::new();
            for field in &field_list {
                if let Some(v) = map.get(*field) {
                    filtered.insert(field.to_string(), v.clone());
                }
            }
            Value::Object(filtered)
        }
        _ => value.clone(),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &s[..cut]),
        None => s.to_string(),
    }
}

/// Truncate string fields in JSON value.
fn truncate_text_fields(value: &Value, max_chars: usize) -> Value {
    match value {
        Value::String(s) => Value::String(truncate(s, max_chars)),
        Value::Array(arr) => {
            Value::Array(arr.iter().map(|v| truncate_text_fields(v, max_chars)).collect())
        }
        Value::Object(map) => {
            let mut truncated = serde_json::Map::new();
            for (k, v) in map {
                truncated.insert(k.clone(), truncate_text_fields(v, max_chars));
            }
            Value::Object(truncated)
        }
        _ => value.clone(),
    }
}

/// Format error as JSON.
pub fn format_error(code: &str, message: &str) -> String {
    json!({ "ok": false, "code": code, "error": message }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_filter() {
        let controls = OutputControls {
            compact: true,
            fields: Some("available".to_string()),
            ..Default::default()
        };
        assert_eq!(
            controls.emit(&json!({"available": 1.5, "locked": 0})),
            r#"{"available":1.5}"#
        );
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        assert_eq!(truncate("héllo wörld", 4), "héll...");
        assert_eq!(truncate("abc", 10), "abc");
    }

    #[test]
    fn test_event_line() {
        let controls = OutputControls::default();
        let log = EventFrame {
            event: "node-log".to_string(),
            data: json!("Core initialized OK"),
        };
        assert_eq!(controls.format_event(&log), "[node-log] Core initialized OK");

        let ready = EventFrame {
            event: "wallet-ready".to_string(),
            data: Value::Null,
        };
        assert_eq!(controls.format_event(&ready), "[wallet-ready]");
    }

    #[test]
    fn test_format_error() {
        let line = format_error("UNKNOWN_METHOD", "Unknown method: x");
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["code"], "UNKNOWN_METHOD");
        assert_eq!(value["ok"], json!(false));
    }
}
