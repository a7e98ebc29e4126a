//! Deployment-specific custom field knowledge: the two custom fields this
//! tool special-cases, plus a best-effort id → display-name table used when
//! the tracker's metadata is unavailable.

/// "Delivery quarter" custom field. Always formatted as a single option.
pub const DELIVERY_QUARTER_FIELD: &str = "customfield_10058";

/// "Include on roadmap" visibility flag. Always formatted as an option array.
pub const ROADMAP_FLAG_FIELD: &str = "customfield_10056";

/// Known field ids and their display names, used by error-mining discovery
/// when the tracker gives back nothing but a field id.
pub const KNOWN_FIELD_NAMES: &[(&str, &str)] = &[
    ("summary", "Summary"),
    ("description", "Description"),
    ("issuetype", "Issue Type"),
    ("project", "Project"),
    ("priority", "Priority"),
    ("assignee", "Assignee"),
    ("components", "Components"),
    ("duedate", "Due Date"),
    ("labels", "Labels"),
    (DELIVERY_QUARTER_FIELD, "Delivery Quarter"),
    (ROADMAP_FLAG_FIELD, "Include on Roadmap"),
];

pub fn known_field_name(id: &str) -> Option<&'static str> {
    KNOWN_FIELD_NAMES
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, name)| *name)
}

/// Fallback display name for an unrecognized field id: strip the
/// customfield prefix and title-case what's left.
pub fn prettify_field_id(id: &str) -> String {
    let stripped = id.strip_prefix("customfield_").unwrap_or(id);
    let mut out = String::with_capacity(stripped.len());
    let mut start_of_word = true;
    for ch in stripped.chars() {
        if ch == '_' || ch == '-' {
            out.push(' ');
            start_of_word = true;
        } else if start_of_word {
            out.extend(ch.to_uppercase());
            start_of_word = false;
        } else {
            out.push(ch);
        }
    }
    out
}
