//! Two-tier field value extraction: an optional completion-provider pass,
//! then built-in pattern rules over whatever the first pass left
//! unresolved. Provider failures never surface past this module.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use chrono::Datelike;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::complete::CompletionProvider;
use crate::fields::{DELIVERY_QUARTER_FIELD, ROADMAP_FLAG_FIELD};
use crate::model::field::FieldDescriptor;
use crate::model::value::{
    ExtractedFieldValue, ExtractionMethod, FieldExtractionResult, FieldValue,
};
use crate::prompt::build_extraction_prompt;

const CONF_PRIORITY: f64 = 0.8;
const CONF_QUARTER_EXACT: f64 = 0.8;
const CONF_QUARTER_YEAR_GUESS: f64 = 0.6;
const CONF_QUARTER_DEFAULT: f64 = 0.4;
const CONF_ROADMAP: f64 = 0.8;
const CONF_STORY_POINTS: f64 = 0.9;
const CONF_COMPONENT: f64 = 0.7;
const CONF_EPIC_LINK: f64 = 0.8;

/// Minimum confidence for an AI-sourced extraction to be kept.
const AI_CONFIDENCE_FLOOR: f64 = 0.5;

const INTERNAL_WORDS: &[&str] = &["internal", "private", "confidential", "company", "team", "staff"];
const EXTERNAL_WORDS: &[&str] = &[
    "external", "public", "customer", "client", "visible", "roadmap", "showcase",
];

pub struct Extractor {
    completion: Option<Arc<dyn CompletionProvider>>,
}

impl Extractor {
    pub fn new(completion: Option<Arc<dyn CompletionProvider>>) -> Self {
        Self { completion }
    }

    pub async fn extract(&self, text: &str, fields: &[FieldDescriptor]) -> FieldExtractionResult {
        let mut extracted: Vec<ExtractedFieldValue> = Vec::new();

        if let Some(provider) = &self.completion {
            match ai_extract(provider.as_ref(), text, fields).await {
                Ok(values) => extracted = values,
                Err(e) => warn!("AI extraction tier failed, using pattern rules only: {e:#}"),
            }
        }

        let resolved: HashSet<String> = extracted.iter().map(|e| e.field_id.clone()).collect();
        for field in fields {
            if resolved.contains(&field.id) {
                continue;
            }
            if let Some(entry) = pattern_extract(text, field) {
                extracted.push(entry);
            }
        }
        debug!("extracted {} of {} fields", extracted.len(), fields.len());

        let extracted_ids: HashSet<&str> =
            extracted.iter().map(|e| e.field_id.as_str()).collect();
        let missing_fields: Vec<String> = fields
            .iter()
            .filter(|f| f.required && !extracted_ids.contains(f.id.as_str()))
            .map(|f| f.id.clone())
            .collect();

        let mut suggestions = std::collections::HashMap::new();
        for field in fields {
            if field.allowed_values.is_empty() {
                continue;
            }
            let ranked = rank_options(text, field);
            if !ranked.is_empty() {
                suggestions.insert(field.id.clone(), ranked);
            }
        }

        FieldExtractionResult {
            extracted_fields: extracted,
            missing_fields,
            suggestions,
        }
    }
}

#[derive(Deserialize)]
struct RawExtraction {
    #[serde(rename = "fieldId")]
    field_id: String,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    confidence: f64,
}

/// Run the completion provider over a structured prompt and keep only
/// confident, well-typed extractions for known fields.
async fn ai_extract(
    provider: &dyn CompletionProvider,
    text: &str,
    fields: &[FieldDescriptor],
) -> Result<Vec<ExtractedFieldValue>> {
    let prompt = build_extraction_prompt(text, fields);
    let response = provider.complete(&prompt).await?;
    let raw: Vec<RawExtraction> = serde_json::from_str(strip_code_fences(&response))
        .context("Completion response was not a JSON extraction array")?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for entry in raw {
        if entry.confidence <= AI_CONFIDENCE_FLOOR {
            continue;
        }
        let Some(field) = fields.iter().find(|f| f.id == entry.field_id) else {
            continue;
        };
        if !seen.insert(entry.field_id.clone()) {
            continue;
        }
        let Some(value) = FieldValue::from_json(&entry.value, field.field_type) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        out.push(ExtractedFieldValue {
            field_id: entry.field_id,
            value,
            confidence: entry.confidence.clamp(0.0, 1.0),
            method: ExtractionMethod::Ai,
        });
    }
    Ok(out)
}

/// Models like to wrap JSON in markdown fences; tolerate that.
fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn priority_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(highest|lowest|high|medium|low|critical|blocker|urgent|major|minor|trivial)\b")
            .unwrap()
    })
}

fn quarter_year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bq([1-4])\s*,?\s*(\d{4})\b").unwrap())
}

fn quarter_word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bquarter\s+([1-4])\s*,?\s*(\d{4})\b").unwrap())
}

fn quarter_ordinal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(first|second|third|fourth)\s+quarter(?:\s+(?:of\s+)?(\d{4}))?")
            .unwrap()
    })
}

fn quarter_bare_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bq([1-4])\b").unwrap())
}

fn story_points_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(\d+)\s*(?:story\s*)?points?\b").unwrap())
}

fn issue_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b([A-Z][A-Z0-9]*-\d+)\b").unwrap())
}

/// Ordered pattern rules; the first rule that applies to a field wins.
fn pattern_extract(text: &str, field: &FieldDescriptor) -> Option<ExtractedFieldValue> {
    let name = field.name.to_lowercase();

    if name.contains("priority") {
        return extract_priority(text, field);
    }
    if name.contains("quarter") || field.id == DELIVERY_QUARTER_FIELD {
        return extract_quarter(text, field);
    }
    if name.contains("roadmap") || field.id == ROADMAP_FLAG_FIELD {
        return extract_roadmap(text, field);
    }
    if name.contains("story") && name.contains("point") {
        return extract_story_points(text, field);
    }
    if name.contains("component") {
        return extract_component(text, field);
    }
    if name.contains("epic") {
        return extract_epic_link(text, field);
    }
    None
}

/// Canonical priority label for a matched word.
fn priority_synonym(word: &str) -> &'static str {
    match word.to_lowercase().as_str() {
        "critical" | "blocker" | "highest" => "Highest",
        "urgent" | "major" | "high" => "High",
        "medium" => "Medium",
        "minor" | "low" => "Low",
        "trivial" | "lowest" => "Lowest",
        _ => "Medium",
    }
}

fn extract_priority(text: &str, field: &FieldDescriptor) -> Option<ExtractedFieldValue> {
    let word = priority_re().find(text)?.as_str();
    let canonical = priority_synonym(word);
    let canonical_lower = canonical.to_lowercase();

    // Map to the closest allowed value: exact label first, then substring.
    let label = field
        .allowed_values
        .iter()
        .find(|opt| opt.label().to_lowercase() == canonical_lower)
        .or_else(|| {
            field
                .allowed_values
                .iter()
                .find(|opt| opt.label().to_lowercase().contains(&canonical_lower))
        })
        .map(|opt| opt.label().to_string())
        .unwrap_or_else(|| canonical.to_string());

    Some(ExtractedFieldValue {
        field_id: field.id.clone(),
        value: FieldValue::Priority(label),
        confidence: CONF_PRIORITY,
        method: ExtractionMethod::Pattern,
    })
}

fn current_quarter_year() -> (u32, i32) {
    let now = chrono::Local::now();
    ((now.month() - 1) / 3 + 1, now.year())
}

fn ordinal_quarter(word: &str) -> u32 {
    match word.to_lowercase().as_str() {
        "first" => 1,
        "second" => 2,
        "third" => 3,
        _ => 4,
    }
}

fn has_allowed_value(field: &FieldDescriptor, label: &str) -> bool {
    field
        .allowed_values
        .iter()
        .any(|opt| opt.label().eq_ignore_ascii_case(label))
}

/// Delivery-quarter extraction: explicit "Q3 2025" forms first, then forms
/// without a year, then the current quarter as a low-confidence default.
fn extract_quarter(text: &str, field: &FieldDescriptor) -> Option<ExtractedFieldValue> {
    let (current_q, current_year) = current_quarter_year();

    let matched: Option<(u32, Option<i32>)> = quarter_year_re()
        .captures(text)
        .or_else(|| quarter_word_re().captures(text))
        .map(|c| (c[1].parse().unwrap_or(1), c[2].parse().ok()))
        .or_else(|| {
            quarter_ordinal_re().captures(text).map(|c| {
                let year = c.get(2).and_then(|m| m.as_str().parse().ok());
                (ordinal_quarter(&c[1]), year)
            })
        })
        .or_else(|| {
            quarter_bare_re()
                .captures(text)
                .map(|c| (c[1].parse().unwrap_or(1), None))
        });

    let entry = |label: String, confidence: f64, method: ExtractionMethod| ExtractedFieldValue {
        field_id: field.id.clone(),
        value: FieldValue::Select(label),
        confidence,
        method,
    };

    if let Some((quarter, year)) = matched {
        if let Some(year) = year {
            let exact = format!("Q{quarter} {year}");
            if has_allowed_value(field, &exact) {
                return Some(entry(exact, CONF_QUARTER_EXACT, ExtractionMethod::Pattern));
            }
        }
        // No usable year: assume the current one if the tracker offers it.
        let guessed = format!("Q{quarter} {current_year}");
        if has_allowed_value(field, &guessed) {
            return Some(entry(guessed, CONF_QUARTER_YEAR_GUESS, ExtractionMethod::Pattern));
        }
    }

    Some(entry(
        format!("Q{current_q} {current_year}"),
        CONF_QUARTER_DEFAULT,
        ExtractionMethod::Default,
    ))
}

/// Roadmap visibility: emit the subset of {Internal, External} whose
/// indicator words appear in the text.
fn extract_roadmap(text: &str, field: &FieldDescriptor) -> Option<ExtractedFieldValue> {
    let lower = text.to_lowercase();
    let has_any = |words: &[&str]| {
        words
            .iter()
            .any(|w| lower.split(|c: char| !c.is_alphanumeric()).any(|t| t == *w))
    };

    let mut labels = Vec::new();
    if has_any(INTERNAL_WORDS) {
        labels.push("Internal".to_string());
    }
    if has_any(EXTERNAL_WORDS) {
        labels.push("External".to_string());
    }
    if labels.is_empty() {
        return None;
    }

    Some(ExtractedFieldValue {
        field_id: field.id.clone(),
        value: FieldValue::Multiselect(labels),
        confidence: CONF_ROADMAP,
        method: ExtractionMethod::Pattern,
    })
}

fn extract_story_points(text: &str, field: &FieldDescriptor) -> Option<ExtractedFieldValue> {
    let captures = story_points_re().captures(text)?;
    let points: i64 = captures[1].parse().ok()?;
    Some(ExtractedFieldValue {
        field_id: field.id.clone(),
        value: FieldValue::Number(points as f64),
        confidence: CONF_STORY_POINTS,
        method: ExtractionMethod::Pattern,
    })
}

fn extract_component(text: &str, field: &FieldDescriptor) -> Option<ExtractedFieldValue> {
    let lower = text.to_lowercase();
    let label = field
        .allowed_values
        .iter()
        .map(|opt| opt.label())
        .find(|label| label.len() > 2 && lower.contains(&label.to_lowercase()))?;
    Some(ExtractedFieldValue {
        field_id: field.id.clone(),
        value: FieldValue::Select(label.to_string()),
        confidence: CONF_COMPONENT,
        method: ExtractionMethod::Pattern,
    })
}

fn extract_epic_link(text: &str, field: &FieldDescriptor) -> Option<ExtractedFieldValue> {
    let key = issue_key_re().captures(text)?;
    Some(ExtractedFieldValue {
        field_id: field.id.clone(),
        value: FieldValue::Text(key[1].to_string()),
        confidence: CONF_EPIC_LINK,
        method: ExtractionMethod::Pattern,
    })
}

/// Score every allowed value of a field against the text and return the top
/// five labels, best first. Runs whether or not the field was resolved.
fn rank_options(text: &str, field: &FieldDescriptor) -> Vec<String> {
    let lower = text.to_lowercase();
    let name = field.name.to_lowercase();

    let urgent_hint = ["urgent", "important", "asap", "critical"]
        .iter()
        .any(|w| lower.contains(w));
    let later_hint = ["later", "eventually", "someday", "whenever"]
        .iter()
        .any(|w| lower.contains(w));

    let mut scored: Vec<(i32, &str)> = field
        .allowed_values
        .iter()
        .filter_map(|opt| {
            let label = opt.label();
            if label.is_empty() {
                return None;
            }
            let label_lower = label.to_lowercase();
            let mut score = 0;
            if lower.contains(&label_lower) {
                score += 10;
            }
            for word in label_lower.split_whitespace() {
                if word.len() > 2 && lower.contains(word) {
                    score += 3;
                }
            }
            if name.contains("priority") {
                if urgent_hint && label_lower.contains("high") {
                    score += 5;
                }
                if later_hint && label_lower.contains("low") {
                    score += 5;
                }
            }
            if score > 0 {
                Some((score, label))
            } else {
                None
            }
        })
        .collect();

    // Stable sort keeps original option order on ties.
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().take(5).map(|(_, l)| l.to_string()).collect()
}
