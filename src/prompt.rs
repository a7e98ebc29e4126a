use crate::model::field::FieldDescriptor;

/// How many allowed values to list per field before truncating. Keeps the
/// prompt bounded for fields with large option sets.
const MAX_OPTIONS_IN_PROMPT: usize = 10;

/// Build the single structured prompt the AI extraction tier sends. The
/// response contract is a bare JSON array of {fieldId, value, confidence}.
pub fn build_extraction_prompt(text: &str, fields: &[FieldDescriptor]) -> String {
    let mut field_lines = String::new();
    for field in fields {
        let required = if field.required { "required" } else { "optional" };
        field_lines.push_str(&format!(
            "- {} (id: {}, type: {:?}, {required})",
            field.name, field.id, field.field_type
        ));
        if !field.allowed_values.is_empty() {
            let mut labels: Vec<&str> = field
                .allowed_values
                .iter()
                .take(MAX_OPTIONS_IN_PROMPT)
                .map(|o| o.label())
                .collect();
            if field.allowed_values.len() > MAX_OPTIONS_IN_PROMPT {
                labels.push("...");
            }
            field_lines.push_str(&format!(" [allowed: {}]", labels.join(", ")));
        }
        field_lines.push('\n');
    }

    format!(
        r#"You are extracting issue-tracker field values from a work item description.

## Description
{text}

## Fields
{field_lines}
## Instructions
1. For each field whose value is clearly stated or strongly implied in the description, produce one extraction.
2. For fields with an allowed list, the value must be one of the allowed labels.
3. Skip fields the description says nothing about. Do not guess.
4. Respond with ONLY a JSON array, no prose, of objects shaped:
   {{"fieldId": "<id>", "value": <value>, "confidence": <0.0-1.0>}}

Use arrays for multi-value fields and numbers for numeric fields."#
    )
}
