//! `{{ key }}` placeholder substitution.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};

fn placeholder() -> Option<&'static Regex> {
    static PLACEHOLDER: OnceLock<Option<Regex>> = OnceLock::new();
    PLACEHOLDER
        .get_or_init(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").ok())
        .as_ref()
}

/// Values substituted into a template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateData {
    values: Map<String, Value>,
}

impl TemplateData {
    /// No values; placeholders stay as written.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON value. Only objects contribute keys.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(values) => Self { values },
            _ => Self::default(),
        }
    }

    /// Parse raw JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::from_value(serde_json::from_str(text)?))
    }

    /// Set one value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Replacement text for `key`, if present.
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    /// Whether there are no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Value> for TemplateData {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

/// Replace every `{{ key }}` that has a value. Unknown keys are left as
/// written.
pub fn render_template(template: &str, data: &TemplateData) -> String {
    let Some(pattern) = placeholder().filter(|_| !data.is_empty()) else {
        return template.to_string();
    };
    pattern
        .replace_all(template, |caps: &Captures<'_>| {
            data.lookup(&caps[1])
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
