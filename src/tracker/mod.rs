pub mod jira;

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::field::FieldOption;

#[derive(Debug, Clone, PartialEq)]
pub struct IssueType {
    pub id: String,
    pub name: String,
}

/// What the tracker said when asked to create an issue. A rejection is a
/// normal outcome for the discovery probe, so it is data, not an error.
#[derive(Debug, Clone)]
pub enum CreateOutcome {
    Created {
        key: String,
    },
    Rejected {
        /// Per-field validation messages, keyed by field id.
        errors: HashMap<String, String>,
        /// Free-form messages not tied to a field.
        messages: Vec<String>,
    },
}

/// Metadata and write surface of the issue tracker. Everything the pipeline
/// needs from the tracker goes through this trait so tests can substitute a
/// fake.
#[async_trait]
pub trait TrackerApi: Send + Sync {
    /// Project key issues are created under.
    fn project_key(&self) -> &str;

    async fn list_issue_types(&self) -> Result<Vec<IssueType>>;

    /// Create-screen field schemas for one issue type, keyed by field id.
    /// May legitimately be empty: some deployments expose no create
    /// metadata at all.
    async fn create_metadata_fields(
        &self,
        issue_type_id: &str,
    ) -> Result<HashMap<String, serde_json::Value>>;

    async fn get_field(&self, field_id: &str) -> Result<serde_json::Value>;

    async fn field_options(&self, field_id: &str) -> Result<Vec<FieldOption>>;

    async fn create_issue(&self, fields: &serde_json::Value) -> Result<CreateOutcome>;

    async fn delete_issue(&self, key: &str) -> Result<()>;

    /// Browse URL for a created issue, shown to the user.
    fn browse_url(&self, key: &str) -> String;
}
