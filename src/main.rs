mod cache;
mod cli;
mod complete;
mod config;
mod discovery;
mod extract;
mod fields;
mod format;
mod model;
mod pipeline;
mod prompt;
mod tracker;
mod util;

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use cache::{FileMappingStore, MappingStore};
use cli::Command;
use complete::{CompletionProvider, HttpCompletionProvider};
use discovery::DiscoveryEngine;
use extract::Extractor;
use model::category::WorkItemCategory;
use pipeline::{IssuePipeline, PipelineError};
use tracker::jira::JiraClient;
use tracker::TrackerApi;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("autoissue=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match cli::parse_args(&args)? {
        Command::Create {
            category,
            text,
            summary,
        } => create(category, &text, summary.as_deref()).await,
        Command::Discover { category } => discover(category).await,
        Command::CacheClear => {
            FileMappingStore::new().clear()?;
            println!("Cleared cached field mappings.");
            Ok(())
        }
        Command::Help => {
            cli::print_help();
            Ok(())
        }
    }
}

fn build_tracker() -> Result<Arc<dyn TrackerApi>> {
    let config = config::load_config()?;
    let jira = config.jira.ok_or(PipelineError::MissingTrackerConfig)?;
    Ok(Arc::new(JiraClient::new(
        jira.domain,
        jira.email,
        jira.api_token,
        jira.project_key,
    )))
}

async fn create(category: WorkItemCategory, text: &str, summary: Option<&str>) -> Result<()> {
    let tracker = build_tracker()?;
    let completion: Option<Arc<dyn CompletionProvider>> = config::load_config()?
        .completion
        .map(|c| Arc::new(HttpCompletionProvider::new(&c)) as Arc<dyn CompletionProvider>);
    let discovery = DiscoveryEngine::new(Arc::clone(&tracker), Box::new(FileMappingStore::new()));
    let extractor = Extractor::new(completion);
    let pipeline = IssuePipeline::new(tracker, discovery, extractor);

    let report = pipeline.create(category, text, summary).await?;

    println!("Created {} ({}): {}", report.key, report.issue_type, report.url);
    for field in &report.filled {
        println!("  {} = {}", field.name, field.value);
    }
    if !report.gaps.is_empty() {
        println!("\nStill needed (fill these in the tracker):");
        for gap in &report.gaps {
            if gap.suggestions.is_empty() {
                println!("  {}", gap.name);
            } else {
                println!("  {} (try: {})", gap.name, gap.suggestions.join(", "));
            }
        }
    }
    Ok(())
}

async fn discover(category: WorkItemCategory) -> Result<()> {
    let tracker = build_tracker()?;
    let discovery = DiscoveryEngine::new(tracker, Box::new(FileMappingStore::new()));

    let mapping = discovery.discover(category).await?;
    println!(
        "{} -> issue type '{}', {} fields:",
        mapping.work_item_category,
        mapping.issue_type_name,
        mapping.fields.len()
    );
    for field in &mapping.fields {
        let required = if field.required { "required" } else { "optional" };
        let options = if field.allowed_values.is_empty() {
            String::new()
        } else {
            format!(
                " [{} options]",
                field.allowed_values.len()
            )
        };
        println!(
            "  {:<28} {:<12} {required}{options}",
            field.name,
            format!("{:?}", field.field_type).to_lowercase()
        );
    }
    Ok(())
}
