use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of field kinds the pipeline understands. Anything the tracker
/// reports that doesn't map onto one of these is treated as `Text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Date,
    Select,
    Multiselect,
    Checkbox,
    Radio,
    User,
    Project,
    #[serde(rename = "issuetype")]
    IssueType,
    Priority,
}

/// One allowed value of an enumerated field. Trackers are inconsistent about
/// which of the three keys they populate, so all are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl FieldOption {
    pub fn named(id: &str, name: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            value: None,
        }
    }

    pub fn value_only(value: &str) -> Self {
        Self {
            id: None,
            name: None,
            value: Some(value.to_string()),
        }
    }

    /// Display label, preferring name over value over id.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.value.as_deref())
            .or(self.id.as_deref())
            .unwrap_or("")
    }
}

/// Discovered shape of one tracker field. Immutable once built; a new
/// discovery run produces a wholly new list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub id: String,
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    #[serde(default)]
    pub allowed_values: Vec<FieldOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Raw type metadata from the tracker, consumed only by the formatter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,
}

impl FieldDescriptor {
    pub fn new(id: &str, name: &str, field_type: FieldType, required: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            field_type,
            required,
            allowed_values: Vec::new(),
            description: None,
            schema: None,
        }
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.allowed_values = options;
        self
    }
}

/// The field list discovered for one work-item category, persisted between
/// runs and superseded wholesale on rediscovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMapping {
    pub work_item_category: String,
    pub issue_type_name: String,
    pub fields: Vec<FieldDescriptor>,
    pub discovered_at: DateTime<Utc>,
}

impl FieldMapping {
    pub fn new(category: &str, issue_type_name: &str, mut fields: Vec<FieldDescriptor>) -> Self {
        sort_fields(&mut fields);
        Self {
            work_item_category: category.to_string(),
            issue_type_name: issue_type_name.to_string(),
            fields,
            discovered_at: Utc::now(),
        }
    }

    pub fn field(&self, id: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.id == id)
    }
}

/// Required fields first, then name ascending (ordinal).
pub fn sort_fields(fields: &mut [FieldDescriptor]) {
    fields.sort_by(|a, b| {
        b.required
            .cmp(&a.required)
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_puts_required_first_then_name() {
        let mut fields = vec![
            FieldDescriptor::new("c", "Components", FieldType::Multiselect, false),
            FieldDescriptor::new("s", "Summary", FieldType::Text, true),
            FieldDescriptor::new("a", "Assignee", FieldType::User, false),
            FieldDescriptor::new("p", "Priority", FieldType::Priority, true),
        ];
        sort_fields(&mut fields);
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Priority", "Summary", "Assignee", "Components"]);
    }

    #[test]
    fn option_label_prefers_name() {
        let opt = FieldOption {
            id: Some("1".into()),
            name: Some("High".into()),
            value: Some("high".into()),
        };
        assert_eq!(opt.label(), "High");
        assert_eq!(FieldOption::value_only("Q3 2025").label(), "Q3 2025");
    }

    #[test]
    fn mapping_roundtrips_through_json() {
        let mapping = FieldMapping::new(
            "epic",
            "Epic",
            vec![FieldDescriptor::new("summary", "Summary", FieldType::Text, true)],
        );
        let json = serde_json::to_string(&mapping).unwrap();
        let back: FieldMapping = serde_json::from_str(&json).unwrap();
        assert_eq!(back.work_item_category, "epic");
        assert_eq!(back.fields.len(), 1);
        assert!(back.fields[0].required);
    }
}
