use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub jira: Option<JiraConfig>,
    pub completion: Option<CompletionConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JiraConfig {
    pub domain: String,
    pub email: String,
    pub api_token: String,
    /// Project key new issues are created under (e.g. "ENG").
    pub project_key: String,
}

/// Optional completion provider used by the AI extraction tier. Any
/// OpenAI-compatible chat-completions endpoint works.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    pub api_key: String,
    pub model: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".autoissue")
        .join("config.toml")
}

pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".autoissue")
}

pub fn load_config() -> Result<AppConfig> {
    let path = config_path();
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: AppConfig =
        toml::from_str(&contents).with_context(|| "Failed to parse config.toml")?;
    Ok(config)
}
