use serde_json::{json, Value};

/// Render plain text as a minimal Atlassian Document Format body: one
/// paragraph per non-empty line. Rich-text conversion is out of scope; the
/// pipeline only guarantees the discrete field values.
pub fn text_to_adf(text: &str) -> Value {
    let paragraphs: Vec<Value> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            json!({
                "type": "paragraph",
                "content": [{ "type": "text", "text": line.trim() }]
            })
        })
        .collect();

    json!({
        "type": "doc",
        "version": 1,
        "content": paragraphs,
    })
}
