//! Three-tier field discovery: tracker create-metadata, a disposable probe
//! issue, then mining the probe's rejection errors. Every tier's failure is
//! swallowed and the next tier runs; the terminal fallback is a hardcoded
//! minimal field set that cannot fail.

use std::sync::Arc;

use anyhow::Result;
use chrono::Datelike;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::MappingStore;
use crate::fields::{known_field_name, prettify_field_id};
use crate::model::category::WorkItemCategory;
use crate::model::field::{FieldDescriptor, FieldMapping, FieldOption, FieldType};
use crate::tracker::{CreateOutcome, TrackerApi};
use crate::util::adf::text_to_adf;

const PROBE_SUMMARY: &str = "autoissue discovery probe (safe to delete)";

pub struct DiscoveryEngine {
    tracker: Arc<dyn TrackerApi>,
    store: Box<dyn MappingStore>,
}

impl DiscoveryEngine {
    pub fn new(tracker: Arc<dyn TrackerApi>, store: Box<dyn MappingStore>) -> Self {
        Self { tracker, store }
    }

    /// Cache-checked front door: return the stored mapping for a category
    /// if one exists, otherwise discover and persist a fresh one. Store
    /// failures count as misses.
    pub async fn mapping(&self, category: WorkItemCategory) -> Result<FieldMapping> {
        match self.store.get(category.as_str()) {
            Ok(Some(mapping)) => {
                debug!("using cached field mapping for {category}");
                return Ok(mapping);
            }
            Ok(None) => {}
            Err(e) => warn!("mapping cache read failed, rediscovering: {e:#}"),
        }
        self.discover(category).await
    }

    /// Run the tiered discovery and persist the result, replacing any prior
    /// mapping for the category.
    pub async fn discover(&self, category: WorkItemCategory) -> Result<FieldMapping> {
        let issue_type = self.resolve_issue_type(category).await;
        let issue_type_name = issue_type
            .as_ref()
            .map(|(_, name)| name.clone())
            .unwrap_or_else(|| category.issue_type_candidates()[0].to_string());

        let mut fields = match &issue_type {
            Some((id, _)) => self.metadata_tier(id).await,
            None => Vec::new(),
        };
        if fields.is_empty() {
            debug!("metadata tier produced no fields for {category}, probing");
            fields = self.probe_tier(&issue_type_name).await;
        }

        let mapping = FieldMapping::new(category.as_str(), &issue_type_name, dedupe(fields));
        if let Err(e) = self.store.set(category.as_str(), &mapping) {
            warn!("failed to persist field mapping for {category}: {e:#}");
        }
        Ok(mapping)
    }

    /// First issue type from the category's ordered candidate list that the
    /// tracker actually has. Lookup failure means no resolution, not an
    /// error.
    async fn resolve_issue_type(&self, category: WorkItemCategory) -> Option<(String, String)> {
        let types = match self.tracker.list_issue_types().await {
            Ok(types) => types,
            Err(e) => {
                warn!("issue type listing failed: {e:#}");
                return None;
            }
        };
        for candidate in category.issue_type_candidates() {
            if let Some(t) = types.iter().find(|t| t.name.eq_ignore_ascii_case(candidate)) {
                return Some((t.id.clone(), t.name.clone()));
            }
        }
        None
    }

    /// Tier 1: the tracker's create-metadata, when it exposes any.
    async fn metadata_tier(&self, issue_type_id: &str) -> Vec<FieldDescriptor> {
        let mut fields = match self.tracker.create_metadata_fields(issue_type_id).await {
            Ok(raw) => raw
                .iter()
                .filter_map(|(id, schema)| parse_metadata_field(id, schema))
                .collect::<Vec<_>>(),
            Err(e) => {
                warn!("create metadata lookup failed: {e:#}");
                return Vec::new();
            }
        };
        // Some deployments list enumerated custom fields without their
        // options; fetch those separately when we can.
        for field in &mut fields {
            let enumerated = matches!(
                field.field_type,
                FieldType::Select | FieldType::Multiselect | FieldType::Radio | FieldType::Checkbox
            );
            if enumerated
                && field.allowed_values.is_empty()
                && field.id.starts_with("customfield_")
            {
                match self.tracker.field_options(&field.id).await {
                    Ok(options) if !options.is_empty() => field.allowed_values = options,
                    Ok(_) => {}
                    Err(e) => debug!("option lookup for {} failed: {e:#}", field.id),
                }
            }
        }
        fields
    }

    /// Tier 2: create a minimal disposable issue and see what the tracker
    /// says. Acceptance implies {summary, description} is enough; the probe
    /// is deleted on a detached task whose failure is logged and ignored.
    /// Rejection hands its structured errors to tier 3.
    async fn probe_tier(&self, issue_type_name: &str) -> Vec<FieldDescriptor> {
        let payload = serde_json::json!({
            "project": { "key": self.tracker.project_key() },
            "issuetype": { "name": issue_type_name },
            "summary": PROBE_SUMMARY,
            "description": text_to_adf("Created by autoissue field discovery."),
        });

        match self.tracker.create_issue(&payload).await {
            Ok(CreateOutcome::Created { key }) => {
                info!("discovery probe {key} accepted, deleting it");
                let tracker = Arc::clone(&self.tracker);
                tokio::spawn(async move {
                    if let Err(e) = tracker.delete_issue(&key).await {
                        warn!("failed to delete discovery probe {key}: {e:#}");
                    }
                });
                vec![
                    FieldDescriptor::new("summary", "Summary", FieldType::Text, true),
                    FieldDescriptor::new("description", "Description", FieldType::Textarea, false),
                ]
            }
            Ok(CreateOutcome::Rejected { errors, .. }) => {
                debug!("discovery probe rejected with {} field errors", errors.len());
                let mut fields = mine_errors(&errors);
                self.enrich_mined(&mut fields).await;
                fields
            }
            Err(e) => {
                warn!("discovery probe failed outright: {e:#}");
                default_fields()
            }
        }
    }

    /// Best-effort upgrade of error-mined custom fields with the tracker's
    /// real name, schema, and options. Failures leave the guesses in place.
    async fn enrich_mined(&self, fields: &mut [FieldDescriptor]) {
        for field in fields {
            if !field.id.starts_with("customfield_") {
                continue;
            }
            if let Ok(raw) = self.tracker.get_field(&field.id).await {
                if let Some(name) = raw.get("name").and_then(Value::as_str) {
                    field.name = name.to_string();
                }
                if let Some(schema) = raw.get("schema") {
                    field.schema = Some(schema.clone());
                }
            }
            if field.allowed_values.is_empty() {
                if let Ok(options) = self.tracker.field_options(&field.id).await {
                    if !options.is_empty() {
                        field.allowed_values = options;
                    }
                }
            }
        }
    }
}

fn dedupe(fields: Vec<FieldDescriptor>) -> Vec<FieldDescriptor> {
    let mut seen = std::collections::HashSet::new();
    fields
        .into_iter()
        .filter(|f| seen.insert(f.id.clone()))
        .collect()
}

/// Tier 3: synthesize required-field descriptors from the tracker's
/// per-field rejection messages. No parseable message at all means the
/// hardcoded minimal default.
fn mine_errors(errors: &std::collections::HashMap<String, String>) -> Vec<FieldDescriptor> {
    let mut fields: Vec<FieldDescriptor> = errors
        .iter()
        .filter(|(_, message)| message.to_lowercase().contains("required"))
        .map(|(id, message)| synthesize_field(id, message))
        .collect();

    if fields.is_empty() {
        fields = default_fields();
    }
    fields
}

fn synthesize_field(id: &str, message: &str) -> FieldDescriptor {
    let name = known_field_name(id)
        .map(String::from)
        .or_else(|| name_from_message(message))
        .unwrap_or_else(|| prettify_field_id(id));
    let field_type = guess_type(id, &name);
    let allowed = guess_allowed_values(id, &name);

    FieldDescriptor::new(id, &name, field_type, true).with_options(allowed)
}

/// "Delivery Quarter is required" -> "Delivery Quarter".
fn name_from_message(message: &str) -> Option<String> {
    let lower = message.to_lowercase();
    let idx = lower.find(" is required")?;
    let name = message[..idx].trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn guess_type(id: &str, name: &str) -> FieldType {
    let haystack = format!("{} {}", id.to_lowercase(), name.to_lowercase());
    if haystack.contains("date") || haystack.contains("due") {
        FieldType::Date
    } else if haystack.contains("number")
        || haystack.contains("point")
        || haystack.contains("estimate")
    {
        FieldType::Number
    } else if haystack.contains("priority")
        || haystack.contains("quarter")
        || haystack.contains("select")
        || haystack.contains("option")
        || haystack.contains("issuetype")
        || haystack.contains("project")
    {
        FieldType::Select
    } else if haystack.contains("description") {
        FieldType::Textarea
    } else {
        FieldType::Text
    }
}

/// Plausible option sets for recognized field-name patterns; empty for
/// anything unrecognized.
fn guess_allowed_values(id: &str, name: &str) -> Vec<FieldOption> {
    let haystack = format!("{} {}", id.to_lowercase(), name.to_lowercase());
    if haystack.contains("priority") {
        return ["Highest", "High", "Medium", "Low", "Lowest"]
            .iter()
            .map(|n| FieldOption::value_only(n))
            .collect();
    }
    if haystack.contains("quarter") {
        let year = chrono::Local::now().year();
        let mut options = Vec::new();
        for y in [year, year + 1] {
            for q in 1..=4 {
                options.push(FieldOption::value_only(&format!("Q{q} {y}")));
            }
        }
        return options;
    }
    if haystack.contains("roadmap") || haystack.contains("include") || haystack.contains("flag") {
        return vec![FieldOption::value_only("Yes"), FieldOption::value_only("No")];
    }
    Vec::new()
}

/// Terminal fallback when nothing observable about the tracker helped.
fn default_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("summary", "Summary", FieldType::Text, true),
        FieldDescriptor::new("description", "Description", FieldType::Textarea, false),
        FieldDescriptor::new("issuetype", "Issue Type", FieldType::Select, true),
        FieldDescriptor::new("project", "Project", FieldType::Select, true),
    ]
}

/// Parse one raw create-metadata field schema into a descriptor.
fn parse_metadata_field(id: &str, raw: &Value) -> Option<FieldDescriptor> {
    let obj = raw.as_object()?;
    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| prettify_field_id(id));
    let required = obj.get("required").and_then(Value::as_bool).unwrap_or(false);
    let schema = obj.get("schema").cloned();
    let field_type = field_type_from_schema(schema.as_ref(), &name);

    let allowed_values = obj
        .get("allowedValues")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(|v| {
                    let o = v.as_object()?;
                    let get =
                        |key: &str| o.get(key).and_then(Value::as_str).map(String::from);
                    let opt = FieldOption {
                        id: get("id"),
                        name: get("name"),
                        value: get("value"),
                    };
                    if opt.id.is_none() && opt.name.is_none() && opt.value.is_none() {
                        None
                    } else {
                        Some(opt)
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    Some(FieldDescriptor {
        id: id.to_string(),
        name,
        field_type,
        required,
        allowed_values,
        description: obj.get("description").and_then(Value::as_str).map(String::from),
        schema,
    })
}

fn field_type_from_schema(schema: Option<&Value>, name: &str) -> FieldType {
    let schema_type = schema
        .and_then(|s| s.get("type"))
        .and_then(Value::as_str)
        .unwrap_or("");
    let custom = schema
        .and_then(|s| s.get("custom"))
        .and_then(Value::as_str)
        .unwrap_or("");

    match schema_type {
        "user" => FieldType::User,
        "project" => FieldType::Project,
        "issuetype" => FieldType::IssueType,
        "priority" => FieldType::Priority,
        "number" => FieldType::Number,
        "date" | "datetime" => FieldType::Date,
        "array" => {
            if custom.contains("checkbox") {
                FieldType::Checkbox
            } else {
                FieldType::Multiselect
            }
        }
        "option" => {
            if custom.contains("radio") {
                FieldType::Radio
            } else {
                FieldType::Select
            }
        }
        "string" => {
            if custom.contains("textarea") || name.to_lowercase().contains("description") {
                FieldType::Textarea
            } else {
                FieldType::Text
            }
        }
        _ => FieldType::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::field::FieldMapping;
    use crate::tracker::IssueType;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory store so tests don't touch the filesystem.
    #[derive(Default)]
    struct MemoryStore {
        data: Mutex<HashMap<String, FieldMapping>>,
    }

    impl MappingStore for Arc<MemoryStore> {
        fn get(&self, category: &str) -> Result<Option<FieldMapping>> {
            Ok(self.data.lock().unwrap().get(category).cloned())
        }

        fn set(&self, category: &str, mapping: &FieldMapping) -> Result<()> {
            self.data
                .lock()
                .unwrap()
                .insert(category.to_string(), mapping.clone());
            Ok(())
        }

        fn clear(&self) -> Result<()> {
            self.data.lock().unwrap().clear();
            Ok(())
        }
    }

    /// Scriptable tracker fake, in the spirit of the mock provider the
    /// real tracker tests use.
    struct MockTracker {
        issue_types: Vec<IssueType>,
        metadata: HashMap<String, Value>,
        create_outcome: Option<CreateOutcome>,
        field_details: HashMap<String, Value>,
        field_option_sets: HashMap<String, Vec<FieldOption>>,
        deleted: Mutex<Vec<String>>,
        fail_listing: bool,
    }

    impl Default for MockTracker {
        fn default() -> Self {
            Self {
                issue_types: vec![
                    IssueType { id: "1".into(), name: "Epic".into() },
                    IssueType { id: "2".into(), name: "Story".into() },
                ],
                metadata: HashMap::new(),
                create_outcome: None,
                field_details: HashMap::new(),
                field_option_sets: HashMap::new(),
                deleted: Mutex::new(Vec::new()),
                fail_listing: false,
            }
        }
    }

    #[async_trait]
    impl TrackerApi for Arc<MockTracker> {
        fn project_key(&self) -> &str {
            "ENG"
        }

        async fn list_issue_types(&self) -> Result<Vec<IssueType>> {
            if self.fail_listing {
                anyhow::bail!("connection refused");
            }
            Ok(self.issue_types.clone())
        }

        async fn create_metadata_fields(&self, _: &str) -> Result<HashMap<String, Value>> {
            Ok(self.metadata.clone())
        }

        async fn get_field(&self, field_id: &str) -> Result<Value> {
            self.field_details
                .get(field_id)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no such field"))
        }

        async fn field_options(&self, field_id: &str) -> Result<Vec<FieldOption>> {
            Ok(self.field_option_sets.get(field_id).cloned().unwrap_or_default())
        }

        async fn create_issue(&self, _: &Value) -> Result<CreateOutcome> {
            match &self.create_outcome {
                Some(outcome) => Ok(outcome.clone()),
                None => anyhow::bail!("create unavailable"),
            }
        }

        async fn delete_issue(&self, key: &str) -> Result<()> {
            self.deleted.lock().unwrap().push(key.to_string());
            Ok(())
        }

        fn browse_url(&self, key: &str) -> String {
            format!("https://acme.atlassian.net/browse/{key}")
        }
    }

    fn engine(tracker: Arc<MockTracker>, store: Arc<MemoryStore>) -> DiscoveryEngine {
        DiscoveryEngine::new(Arc::new(tracker), Box::new(store))
    }

    fn summary_meta() -> (String, Value) {
        (
            "summary".to_string(),
            serde_json::json!({
                "name": "Summary",
                "required": true,
                "schema": { "type": "string" }
            }),
        )
    }

    #[tokio::test]
    async fn metadata_tier_wins_when_it_has_fields() {
        let mut tracker = MockTracker::default();
        tracker.metadata = HashMap::from([
            summary_meta(),
            (
                "priority".to_string(),
                serde_json::json!({
                    "name": "Priority",
                    "required": false,
                    "schema": { "type": "priority" },
                    "allowedValues": [
                        { "id": "1", "name": "High" },
                        { "id": "2", "name": "Low" }
                    ]
                }),
            ),
        ]);
        let engine = engine(Arc::new(tracker), Arc::new(MemoryStore::default()));

        let mapping = engine.discover(WorkItemCategory::Epic).await.unwrap();
        assert_eq!(mapping.issue_type_name, "Epic");
        assert_eq!(mapping.fields.len(), 2);

        let priority = mapping.field("priority").unwrap();
        assert_eq!(priority.field_type, FieldType::Priority);
        assert_eq!(priority.allowed_values.len(), 2);
        assert!(mapping.field("summary").unwrap().required);
    }

    #[tokio::test]
    async fn accepted_probe_yields_minimal_set_and_deletes() {
        let mut tracker = MockTracker::default();
        tracker.create_outcome = Some(CreateOutcome::Created { key: "ENG-99".into() });
        let tracker = Arc::new(tracker);
        let engine = engine(Arc::clone(&tracker), Arc::new(MemoryStore::default()));

        let mapping = engine.discover(WorkItemCategory::Story).await.unwrap();
        let ids: Vec<&str> = mapping.fields.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["summary", "description"]);
        assert!(mapping.field("summary").unwrap().required);
        assert!(!mapping.field("description").unwrap().required);

        // The compensating delete runs on a spawned task.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(tracker.deleted.lock().unwrap().as_slice(), &["ENG-99"]);
    }

    #[tokio::test]
    async fn rejected_probe_mines_required_fields_only() {
        let mut tracker = MockTracker::default();
        tracker.create_outcome = Some(CreateOutcome::Rejected {
            errors: HashMap::from([("summary".to_string(), "Summary is required".to_string())]),
            messages: vec![],
        });
        let engine = engine(Arc::new(tracker), Arc::new(MemoryStore::default()));

        let mapping = engine.discover(WorkItemCategory::Epic).await.unwrap();
        assert_eq!(mapping.fields.len(), 1);
        assert_eq!(mapping.fields[0].id, "summary");
        assert!(mapping.fields[0].required);
    }

    #[tokio::test]
    async fn mined_custom_fields_are_enriched_from_the_tracker() {
        let mut tracker = MockTracker::default();
        tracker.create_outcome = Some(CreateOutcome::Rejected {
            errors: HashMap::from([(
                "customfield_10070".to_string(),
                "Field is required".to_string(),
            )]),
            messages: vec![],
        });
        tracker.field_details.insert(
            "customfield_10070".to_string(),
            serde_json::json!({"name": "Team", "schema": {"type": "option"}}),
        );
        tracker.field_option_sets.insert(
            "customfield_10070".to_string(),
            vec![FieldOption::named("1", "Platform"), FieldOption::named("2", "Growth")],
        );
        let engine = engine(Arc::new(tracker), Arc::new(MemoryStore::default()));

        let mapping = engine.discover(WorkItemCategory::Epic).await.unwrap();
        let field = mapping.field("customfield_10070").unwrap();
        assert_eq!(field.name, "Team");
        assert_eq!(field.allowed_values.len(), 2);
        assert_eq!(field.schema, Some(serde_json::json!({"type": "option"})));
        assert!(field.required);
    }

    #[tokio::test]
    async fn metadata_fields_without_options_get_them_fetched() {
        let mut tracker = MockTracker::default();
        tracker.metadata = HashMap::from([(
            "customfield_10058".to_string(),
            serde_json::json!({
                "name": "Delivery Quarter",
                "required": true,
                "schema": {"type": "option"}
            }),
        )]);
        tracker.field_option_sets.insert(
            "customfield_10058".to_string(),
            vec![FieldOption::named("10", "Q3 2025")],
        );
        let engine = engine(Arc::new(tracker), Arc::new(MemoryStore::default()));

        let mapping = engine.discover(WorkItemCategory::Epic).await.unwrap();
        let field = mapping.field("customfield_10058").unwrap();
        assert_eq!(field.allowed_values.len(), 1);
        assert_eq!(field.allowed_values[0].label(), "Q3 2025");
    }

    #[tokio::test]
    async fn unparseable_rejection_uses_hardcoded_default() {
        let mut tracker = MockTracker::default();
        tracker.create_outcome = Some(CreateOutcome::Rejected {
            errors: HashMap::new(),
            messages: vec!["Internal server error".to_string()],
        });
        let engine = engine(Arc::new(tracker), Arc::new(MemoryStore::default()));

        let mapping = engine.discover(WorkItemCategory::Task).await.unwrap();
        let mut ids: Vec<&str> = mapping.fields.iter().map(|f| f.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["description", "issuetype", "project", "summary"]);
    }

    #[tokio::test]
    async fn total_tracker_failure_still_produces_default() {
        let mut tracker = MockTracker::default();
        tracker.fail_listing = true;
        // create_outcome None -> probe errors too
        let engine = engine(Arc::new(tracker), Arc::new(MemoryStore::default()));

        let mapping = engine.discover(WorkItemCategory::Bug).await.unwrap();
        assert_eq!(mapping.fields.len(), 4);
        // No resolved issue type: first candidate name is used.
        assert_eq!(mapping.issue_type_name, "Bug");
    }

    #[tokio::test]
    async fn fields_are_sorted_required_first_then_name() {
        let mut tracker = MockTracker::default();
        tracker.metadata = HashMap::from([
            summary_meta(),
            (
                "assignee".to_string(),
                serde_json::json!({"name": "Assignee", "required": false, "schema": {"type": "user"}}),
            ),
            (
                "zlast".to_string(),
                serde_json::json!({"name": "Approver", "required": true, "schema": {"type": "user"}}),
            ),
        ]);
        let engine = engine(Arc::new(tracker), Arc::new(MemoryStore::default()));

        let mapping = engine.discover(WorkItemCategory::Epic).await.unwrap();
        let names: Vec<&str> = mapping.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Approver", "Summary", "Assignee"]);

        let mut ids: Vec<&str> = mapping.fields.iter().map(|f| f.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), mapping.fields.len());
    }

    #[tokio::test]
    async fn discovery_is_idempotent_against_stable_tracker() {
        let mut tracker = MockTracker::default();
        tracker.metadata = HashMap::from([summary_meta()]);
        let tracker = Arc::new(tracker);
        let store = Arc::new(MemoryStore::default());
        let engine = engine(Arc::clone(&tracker), Arc::clone(&store));

        let first = engine.discover(WorkItemCategory::Epic).await.unwrap();
        let second = engine.discover(WorkItemCategory::Epic).await.unwrap();
        assert_eq!(
            serde_json::to_value(&first.fields).unwrap(),
            serde_json::to_value(&second.fields).unwrap()
        );
    }

    #[tokio::test]
    async fn mapping_prefers_cache_and_discover_replaces_it() {
        let mut tracker = MockTracker::default();
        tracker.metadata = HashMap::from([summary_meta()]);
        let store = Arc::new(MemoryStore::default());
        let engine = engine(Arc::new(tracker), Arc::clone(&store));

        let discovered = engine.mapping(WorkItemCategory::Epic).await.unwrap();
        assert!(store.get("epic").unwrap().is_some());

        let cached = engine.mapping(WorkItemCategory::Epic).await.unwrap();
        assert_eq!(cached.discovered_at, discovered.discovered_at);
    }

    #[tokio::test]
    async fn initiative_falls_back_to_epic_issue_type() {
        let mut tracker = MockTracker::default();
        tracker.metadata = HashMap::from([summary_meta()]);
        let engine = engine(Arc::new(tracker), Arc::new(MemoryStore::default()));

        // No "Initiative" type configured; "Epic" is next in the candidate list.
        let mapping = engine.discover(WorkItemCategory::Initiative).await.unwrap();
        assert_eq!(mapping.issue_type_name, "Epic");
        assert_eq!(mapping.work_item_category, "initiative");
    }

    #[test]
    fn synthesized_fields_guess_types_and_options() {
        let quarter = synthesize_field("customfield_10058", "Delivery Quarter is required");
        assert_eq!(quarter.name, "Delivery Quarter");
        assert_eq!(quarter.field_type, FieldType::Select);
        assert_eq!(quarter.allowed_values.len(), 8);
        assert!(quarter.required);

        let due = synthesize_field("duedate", "Due Date is required");
        assert_eq!(due.field_type, FieldType::Date);

        let points = synthesize_field("customfield_10016", "Story Points is required");
        assert_eq!(points.field_type, FieldType::Number);

        let mystery = synthesize_field("customfield_10099", "cannot be empty, required");
        assert_eq!(mystery.name, "10099");
        assert_eq!(mystery.field_type, FieldType::Text);
        assert!(mystery.allowed_values.is_empty());
    }

    #[test]
    fn priority_error_guesses_priority_ladder() {
        let field = synthesize_field("priority", "priority is required");
        assert_eq!(field.name, "Priority");
        let labels: Vec<&str> = field.allowed_values.iter().map(|o| o.label()).collect();
        assert_eq!(labels, vec!["Highest", "High", "Medium", "Low", "Lowest"]);
    }
}
