use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::Value;

use super::{CreateOutcome, IssueType, TrackerApi};
use crate::model::field::FieldOption;

/// Jira Cloud REST v3 client with basic auth.
pub struct JiraClient {
    base_url: String,
    auth_header: String,
    project_key: String,
    client: reqwest::Client,
}

impl JiraClient {
    pub fn new(domain: String, email: String, api_token: String, project_key: String) -> Self {
        let creds = format!("{email}:{api_token}");
        let encoded = base64::engine::general_purpose::STANDARD.encode(creds);
        Self {
            base_url: format!("https://{domain}.atlassian.net"),
            auth_header: format!("Basic {encoded}"),
            project_key,
            client: reqwest::Client::new(),
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{path}", self.base_url))
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
    }
}

#[derive(Deserialize)]
struct JiraIssueType {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct CreateMetaResponse {
    #[serde(default)]
    projects: Vec<CreateMetaProject>,
}

#[derive(Deserialize)]
struct CreateMetaProject {
    #[serde(default)]
    issuetypes: Vec<CreateMetaIssueType>,
}

#[derive(Deserialize)]
struct CreateMetaIssueType {
    #[serde(default)]
    fields: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct CreatedIssue {
    key: String,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default, rename = "errorMessages")]
    error_messages: Vec<String>,
    #[serde(default)]
    errors: HashMap<String, String>,
}

fn option_from_value(value: &Value) -> Option<FieldOption> {
    let obj = value.as_object()?;
    let get = |key: &str| obj.get(key).and_then(Value::as_str).map(String::from);
    let option = FieldOption {
        id: get("id"),
        name: get("name"),
        value: get("value"),
    };
    if option.id.is_none() && option.name.is_none() && option.value.is_none() {
        None
    } else {
        Some(option)
    }
}

#[async_trait]
impl TrackerApi for JiraClient {
    fn project_key(&self) -> &str {
        &self.project_key
    }

    async fn list_issue_types(&self) -> Result<Vec<IssueType>> {
        let types: Vec<JiraIssueType> = self
            .get("/rest/api/3/issuetype")
            .send()
            .await
            .context("Jira issuetype request failed")?
            .error_for_status()
            .context("Jira issuetype request rejected")?
            .json()
            .await
            .context("Failed to parse Jira issue types")?;

        Ok(types
            .into_iter()
            .map(|t| IssueType { id: t.id, name: t.name })
            .collect())
    }

    async fn create_metadata_fields(&self, issue_type_id: &str) -> Result<HashMap<String, Value>> {
        let path = format!(
            "/rest/api/3/issue/createmeta?projectKeys={}&issuetypeIds={}&expand=projects.issuetypes.fields",
            self.project_key, issue_type_id
        );
        let meta: CreateMetaResponse = self
            .get(&path)
            .send()
            .await
            .context("Jira createmeta request failed")?
            .error_for_status()
            .context("Jira createmeta request rejected")?
            .json()
            .await
            .context("Failed to parse Jira create metadata")?;

        Ok(meta
            .projects
            .into_iter()
            .flat_map(|p| p.issuetypes)
            .next()
            .map(|it| it.fields)
            .unwrap_or_default())
    }

    async fn get_field(&self, field_id: &str) -> Result<Value> {
        let resp = self
            .get(&format!("/rest/api/3/field/{field_id}"))
            .send()
            .await
            .context("Jira field request failed")?
            .error_for_status()
            .context("Jira field request rejected")?;
        resp.json().await.context("Failed to parse Jira field")
    }

    async fn field_options(&self, field_id: &str) -> Result<Vec<FieldOption>> {
        // Numeric custom field id, e.g. "customfield_10058" -> "10058".
        let numeric = field_id.strip_prefix("customfield_").unwrap_or(field_id);
        let body: Value = self
            .get(&format!("/rest/api/3/customField/{numeric}/option"))
            .send()
            .await
            .context("Jira field options request failed")?
            .error_for_status()
            .context("Jira field options request rejected")?
            .json()
            .await
            .context("Failed to parse Jira field options")?;

        Ok(body
            .get("values")
            .and_then(Value::as_array)
            .map(|values| values.iter().filter_map(option_from_value).collect())
            .unwrap_or_default())
    }

    async fn create_issue(&self, fields: &Value) -> Result<CreateOutcome> {
        let resp = self
            .client
            .post(format!("{}/rest/api/3/issue", self.base_url))
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .json(&serde_json::json!({ "fields": fields }))
            .send()
            .await
            .context("Jira create issue request failed")?;

        let status = resp.status();
        if status.is_success() {
            let created: CreatedIssue = resp
                .json()
                .await
                .context("Failed to parse Jira create response")?;
            return Ok(CreateOutcome::Created { key: created.key });
        }

        // 400-class responses carry structured validation errors that the
        // discovery engine mines; anything else is a genuine failure.
        if status.as_u16() == 400 {
            let body: ErrorBody = resp.json().await.unwrap_or_default();
            return Ok(CreateOutcome::Rejected {
                errors: body.errors,
                messages: body.error_messages,
            });
        }

        Err(anyhow!("Jira create issue failed with status {status}"))
    }

    async fn delete_issue(&self, key: &str) -> Result<()> {
        self.client
            .delete(format!("{}/rest/api/3/issue/{key}", self.base_url))
            .header("Authorization", &self.auth_header)
            .send()
            .await
            .context("Jira delete issue request failed")?
            .error_for_status()
            .context("Jira delete issue rejected")?;
        Ok(())
    }

    fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{key}", self.base_url)
    }
}
