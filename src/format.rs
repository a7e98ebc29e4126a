//! Pure value formatting: turns an extracted candidate into the exact JSON
//! shape the tracker's write API expects. No I/O; "no value" is `None`,
//! never an empty shape.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Value};

use crate::fields::{DELIVERY_QUARTER_FIELD, ROADMAP_FLAG_FIELD};
use crate::model::field::{FieldDescriptor, FieldOption, FieldType};
use crate::model::value::FieldValue;

/// Everything the formatter needs to know about a field, projected out of a
/// descriptor so formatting stays decoupled from discovery.
#[derive(Debug, Clone)]
pub struct FormatInfo {
    pub field_id: String,
    pub field_type: FieldType,
    pub schema: Option<Value>,
    pub allowed_values: Vec<FieldOption>,
    pub is_array: bool,
    pub is_required: bool,
}

impl From<&FieldDescriptor> for FormatInfo {
    fn from(field: &FieldDescriptor) -> Self {
        let schema_array = field
            .schema
            .as_ref()
            .and_then(|s| s.get("type"))
            .and_then(Value::as_str)
            == Some("array");
        Self {
            field_id: field.id.clone(),
            field_type: field.field_type,
            schema: field.schema.clone(),
            allowed_values: field.allowed_values.clone(),
            is_array: schema_array
                || matches!(field.field_type, FieldType::Multiselect | FieldType::Checkbox),
            is_required: field.required,
        }
    }
}

fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap())
}

/// Format one candidate for the wire. Empty candidates always come back as
/// `None` regardless of field type.
pub fn format(info: &FormatInfo, value: Option<&FieldValue>) -> Option<Value> {
    let value = value?;
    if value.is_empty() {
        return None;
    }

    // Deployment-specific overrides are checked before anything else: the
    // roadmap flag is always an option array, the delivery quarter always a
    // single option, whatever the schema claims.
    if info.field_id == ROADMAP_FLAG_FIELD {
        return Some(option_array(value, &info.allowed_values));
    }
    if info.field_id == DELIVERY_QUARTER_FIELD {
        return Some(single_option(value, &info.allowed_values));
    }

    if let Some(schema_type) = info
        .schema
        .as_ref()
        .and_then(|s| s.get("type"))
        .and_then(Value::as_str)
    {
        match schema_type {
            "array" => return Some(option_array(value, &info.allowed_values)),
            "option" => return Some(single_option(value, &info.allowed_values)),
            "user" => return Some(user_shape(&value.as_text())),
            "project" => return Some(json!({ "key": value.as_text() })),
            "issuetype" => return Some(json!({ "name": value.as_text() })),
            "priority" => return Some(json!({ "name": value.as_text() })),
            "string" => return Some(Value::String(value.as_text())),
            "number" => return format_number(value),
            "date" | "datetime" => return format_date(value),
            _ => {}
        }
    }

    match info.field_type {
        FieldType::Select | FieldType::Radio => Some(single_option(value, &info.allowed_values)),
        FieldType::Multiselect | FieldType::Checkbox => {
            Some(option_array(value, &info.allowed_values))
        }
        _ if info.is_array => Some(option_array(value, &info.allowed_values)),
        _ => Some(identity(value)),
    }
}

fn format_number(value: &FieldValue) -> Option<Value> {
    let n = match value {
        FieldValue::Number(n) => *n,
        other => other.as_text().trim().parse::<f64>().ok()?,
    };
    if n.fract() == 0.0 {
        Some(json!(n as i64))
    } else {
        Some(json!(n))
    }
}

/// Pull the first ISO date out of the candidate's text form.
fn format_date(value: &FieldValue) -> Option<Value> {
    let text = value.as_text();
    date_re()
        .find(&text)
        .map(|m| Value::String(m.as_str().to_string()))
}

fn user_shape(text: &str) -> Value {
    if text.contains('@') {
        json!({ "emailAddress": text })
    } else {
        json!({ "accountId": text })
    }
}

/// Last-resort passthrough for fields nothing else claimed.
fn identity(value: &FieldValue) -> Value {
    match value {
        FieldValue::Number(n) => {
            if n.fract() == 0.0 {
                json!(*n as i64)
            } else {
                json!(n)
            }
        }
        FieldValue::Multiselect(items) => {
            Value::Array(items.iter().map(|s| Value::String(s.clone())).collect())
        }
        other => Value::String(other.as_text()),
    }
}

/// Resolve one raw label against the allowed values: exact case-insensitive
/// match on value/name/id first, then substring, then a literal fallback.
fn match_option(raw: &str, allowed: &[FieldOption]) -> Value {
    let raw_lower = raw.to_lowercase();

    let exact = allowed.iter().find(|opt| {
        [&opt.value, &opt.name, &opt.id]
            .into_iter()
            .flatten()
            .any(|s| s.to_lowercase() == raw_lower)
    });
    let matched = exact.or_else(|| {
        allowed.iter().find(|opt| {
            [&opt.value, &opt.name, &opt.id].into_iter().flatten().any(|s| {
                let s_lower = s.to_lowercase();
                s_lower.contains(&raw_lower) || raw_lower.contains(&s_lower)
            })
        })
    });

    match matched {
        Some(opt) => {
            let label = opt
                .value
                .as_deref()
                .or(opt.name.as_deref())
                .unwrap_or(raw);
            match &opt.id {
                Some(id) => json!({ "id": id, "value": label }),
                None => json!({ "value": label }),
            }
        }
        None => json!({ "value": raw }),
    }
}

fn single_option(value: &FieldValue, allowed: &[FieldOption]) -> Value {
    match_option(&value.as_text(), allowed)
}

/// Option-array shape; a scalar candidate becomes a one-element array.
fn option_array(value: &FieldValue, allowed: &[FieldOption]) -> Value {
    let elements: Vec<String> = match value {
        FieldValue::Multiselect(items) => items.clone(),
        other => vec![other.as_text()],
    };
    Value::Array(
        elements
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| match_option(s, allowed))
            .collect(),
    )
}
