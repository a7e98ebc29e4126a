//! End-to-end orchestration: discover the field mapping, extract values
//! from the free text, format each one, and push the issue. Required fields
//! that could not be resolved come back as gaps for the caller to fill.

use std::sync::Arc;

use anyhow::Result;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::info;

use crate::discovery::DiscoveryEngine;
use crate::extract::Extractor;
use crate::format::{format, FormatInfo};
use crate::model::category::WorkItemCategory;
use crate::tracker::{CreateOutcome, TrackerApi};
use crate::util::adf::text_to_adf;

const MAX_SUMMARY_LEN: usize = 120;

/// Fields the pipeline always fills itself; extraction results for these
/// never override the derived values.
const PIPELINE_OWNED_FIELDS: &[&str] = &["project", "issuetype", "summary", "description"];

/// Caller-input and tracker-rejection failures. Everything else inside the
/// pipeline degrades through fallbacks instead of erroring.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No Jira connection configured. Add a [jira] section to ~/.autoissue/config.toml")]
    MissingTrackerConfig,
    #[error("Work item text cannot be empty")]
    EmptyText,
    #[error("Tracker rejected the issue: {0}")]
    CreateRejected(String),
}

#[derive(Debug)]
pub struct FilledField {
    pub name: String,
    pub value: String,
}

#[derive(Debug)]
pub struct GapField {
    pub id: String,
    pub name: String,
    /// Ranked option labels to offer the user, when the field has any.
    pub suggestions: Vec<String>,
}

#[derive(Debug)]
pub struct CreateReport {
    pub key: String,
    pub url: String,
    pub issue_type: String,
    pub filled: Vec<FilledField>,
    pub gaps: Vec<GapField>,
}

pub struct IssuePipeline {
    tracker: Arc<dyn TrackerApi>,
    discovery: DiscoveryEngine,
    extractor: Extractor,
}

impl IssuePipeline {
    pub fn new(tracker: Arc<dyn TrackerApi>, discovery: DiscoveryEngine, extractor: Extractor) -> Self {
        Self {
            tracker,
            discovery,
            extractor,
        }
    }

    pub async fn create(
        &self,
        category: WorkItemCategory,
        text: &str,
        summary_override: Option<&str>,
    ) -> Result<CreateReport> {
        if text.trim().is_empty() {
            return Err(PipelineError::EmptyText.into());
        }

        let mapping = self.discovery.mapping(category).await?;
        let extraction = self.extractor.extract(text, &mapping.fields).await;

        let summary = summary_override
            .map(String::from)
            .unwrap_or_else(|| derive_summary(text));

        let mut fields = Map::new();
        fields.insert("project".into(), json!({ "key": self.tracker.project_key() }));
        fields.insert("issuetype".into(), json!({ "name": mapping.issue_type_name }));
        fields.insert("summary".into(), Value::String(summary));
        fields.insert("description".into(), text_to_adf(text));

        let mut filled = Vec::new();
        for entry in &extraction.extracted_fields {
            if PIPELINE_OWNED_FIELDS.contains(&entry.field_id.as_str()) {
                continue;
            }
            let Some(descriptor) = mapping.field(&entry.field_id) else {
                continue;
            };
            let info = FormatInfo::from(descriptor);
            if let Some(wire) = format(&info, Some(&entry.value)) {
                fields.insert(entry.field_id.clone(), wire);
                filled.push(FilledField {
                    name: descriptor.name.clone(),
                    value: entry.value.as_text(),
                });
            }
        }

        let gaps: Vec<GapField> = extraction
            .missing_fields
            .iter()
            .filter(|id| !PIPELINE_OWNED_FIELDS.contains(&id.as_str()))
            .filter_map(|id| mapping.field(id))
            .map(|descriptor| GapField {
                id: descriptor.id.clone(),
                name: descriptor.name.clone(),
                suggestions: extraction
                    .suggestions
                    .get(&descriptor.id)
                    .cloned()
                    .unwrap_or_default(),
            })
            .collect();

        match self.tracker.create_issue(&Value::Object(fields)).await? {
            CreateOutcome::Created { key } => {
                info!("created {key} as {}", mapping.issue_type_name);
                Ok(CreateReport {
                    url: self.tracker.browse_url(&key),
                    key,
                    issue_type: mapping.issue_type_name,
                    filled,
                    gaps,
                })
            }
            CreateOutcome::Rejected { errors, messages } => {
                let mut parts = messages;
                parts.extend(errors.into_iter().map(|(id, msg)| format!("{id}: {msg}")));
                Err(PipelineError::CreateRejected(parts.join("; ")).into())
            }
        }
    }
}

/// Issue summary derived from the text: first sentence or line, truncated.
pub fn derive_summary(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or("").trim();
    let sentence = first_line
        .split_once(". ")
        .map(|(head, _)| head)
        .unwrap_or(first_line)
        .trim_end_matches('.');
    let mut summary: String = sentence.chars().take(MAX_SUMMARY_LEN).collect();
    if summary.is_empty() {
        summary = text.trim().chars().take(MAX_SUMMARY_LEN).collect();
    }
    summary
}
