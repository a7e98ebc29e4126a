use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::field::FieldType;

/// A candidate value extracted from free text, typed by field kind. The
/// formatter matches exhaustively over this instead of probing raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    /// ISO date text (YYYY-MM-DD), or free text a date can be extracted from.
    Date(String),
    Select(String),
    Multiselect(Vec<String>),
    User(String),
    Project(String),
    #[serde(rename = "issuetype")]
    IssueType(String),
    Priority(String),
}

impl FieldValue {
    /// Canonical text form, used for option matching and display.
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Text(s)
            | FieldValue::Date(s)
            | FieldValue::Select(s)
            | FieldValue::User(s)
            | FieldValue::Project(s)
            | FieldValue::IssueType(s)
            | FieldValue::Priority(s) => s.clone(),
            FieldValue::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            FieldValue::Multiselect(items) => items.join(", "),
        }
    }

    /// Empty candidates are treated as "no value" throughout the pipeline.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Number(_) => false,
            FieldValue::Multiselect(items) => items.is_empty() || items.iter().all(|s| s.is_empty()),
            other => other.as_text().is_empty(),
        }
    }

    /// Coerce an untyped JSON candidate into the variant a descriptor calls
    /// for. Returns `None` for null or shape mismatches that can't be
    /// stringified.
    pub fn from_json(raw: &serde_json::Value, field_type: FieldType) -> Option<FieldValue> {
        if raw.is_null() {
            return None;
        }
        let text = |v: &serde_json::Value| -> Option<String> {
            match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                serde_json::Value::Bool(b) => Some(b.to_string()),
                _ => None,
            }
        };
        match field_type {
            FieldType::Number => match raw {
                serde_json::Value::Number(n) => n.as_f64().map(FieldValue::Number),
                serde_json::Value::String(s) => s.trim().parse().ok().map(FieldValue::Number),
                _ => None,
            },
            FieldType::Multiselect | FieldType::Checkbox => match raw {
                serde_json::Value::Array(items) => {
                    let items: Vec<String> = items.iter().filter_map(text).collect();
                    if items.is_empty() {
                        None
                    } else {
                        Some(FieldValue::Multiselect(items))
                    }
                }
                other => text(other).map(|s| FieldValue::Multiselect(vec![s])),
            },
            FieldType::Date => text(raw).map(FieldValue::Date),
            FieldType::Select | FieldType::Radio => text(raw).map(FieldValue::Select),
            FieldType::User => text(raw).map(FieldValue::User),
            FieldType::Project => text(raw).map(FieldValue::Project),
            FieldType::IssueType => text(raw).map(FieldValue::IssueType),
            FieldType::Priority => text(raw).map(FieldValue::Priority),
            FieldType::Text | FieldType::Textarea => text(raw).map(FieldValue::Text),
        }
    }
}

/// How a candidate value was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    Ai,
    Pattern,
    Default,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedFieldValue {
    pub field_id: String,
    pub value: FieldValue,
    /// Always within [0, 1].
    pub confidence: f64,
    pub method: ExtractionMethod,
}

/// Outcome of one extraction run over a field mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldExtractionResult {
    /// At most one entry per field id.
    pub extracted_fields: Vec<ExtractedFieldValue>,
    /// Required fields with no extracted entry; disjoint from the above.
    pub missing_fields: Vec<String>,
    /// Ranked candidate option labels per enumerated field, resolved or not.
    pub suggestions: HashMap<String, Vec<String>>,
}

impl FieldExtractionResult {
    pub fn value_for(&self, field_id: &str) -> Option<&ExtractedFieldValue> {
        self.extracted_fields.iter().find(|e| e.field_id == field_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_text_form_drops_trailing_zero() {
        assert_eq!(FieldValue::Number(5.0).as_text(), "5");
        assert_eq!(FieldValue::Number(2.5).as_text(), "2.5");
    }

    #[test]
    fn empty_detection() {
        assert!(FieldValue::Text(String::new()).is_empty());
        assert!(FieldValue::Multiselect(vec![]).is_empty());
        assert!(!FieldValue::Number(0.0).is_empty());
        assert!(!FieldValue::Select("Q3 2025".into()).is_empty());
    }

    #[test]
    fn from_json_coerces_by_field_type() {
        let five = serde_json::json!("5");
        assert_eq!(
            FieldValue::from_json(&five, FieldType::Number),
            Some(FieldValue::Number(5.0))
        );
        let scalar = serde_json::json!("Internal");
        assert_eq!(
            FieldValue::from_json(&scalar, FieldType::Multiselect),
            Some(FieldValue::Multiselect(vec!["Internal".into()]))
        );
        assert_eq!(FieldValue::from_json(&serde_json::Value::Null, FieldType::Text), None);
    }
}
