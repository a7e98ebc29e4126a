use anyhow::{bail, Result};

use crate::model::category::WorkItemCategory;

/// Parsed invocation.
#[derive(Debug, PartialEq)]
pub enum Command {
    /// Run the full pipeline and create an issue.
    Create {
        category: WorkItemCategory,
        text: String,
        summary: Option<String>,
    },
    /// Force rediscovery for a category and print the field table.
    Discover { category: WorkItemCategory },
    /// Drop all persisted field mappings.
    CacheClear,
    Help,
}

/// Parse process arguments (without argv[0]).
///
/// Supported forms:
///   autoissue create epic "Rework checkout, needed by Q3 2025"
///   autoissue create story Ship the new login -s "New login"
///   autoissue discover epic
///   autoissue cache clear
pub fn parse_args(args: &[String]) -> Result<Command> {
    let Some(command) = args.first() else {
        return Ok(Command::Help);
    };

    match command.as_str() {
        "create" => parse_create(&args[1..]),
        "discover" => {
            let Some(category) = args.get(1) else {
                bail!("Usage: autoissue discover <category>");
            };
            let category = category.parse().map_err(anyhow::Error::msg)?;
            Ok(Command::Discover { category })
        }
        "cache" => match args.get(1).map(String::as_str) {
            Some("clear") => Ok(Command::CacheClear),
            _ => bail!("Usage: autoissue cache clear"),
        },
        "help" | "-h" | "--help" => Ok(Command::Help),
        other => bail!("Unknown command '{other}'. Run 'autoissue help' for usage."),
    }
}

fn parse_create(args: &[String]) -> Result<Command> {
    let Some(category) = args.first() else {
        bail!("Usage: autoissue create <category> <description> [-s <summary>]");
    };
    let category: WorkItemCategory = category.parse().map_err(anyhow::Error::msg)?;

    let mut text_parts: Vec<String> = Vec::new();
    let mut summary: Option<String> = None;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-s" | "--summary" => {
                i += 1;
                if i < args.len() {
                    summary = Some(args[i].clone());
                } else {
                    bail!("Missing value for -s/--summary flag");
                }
            }
            _ => text_parts.push(args[i].clone()),
        }
        i += 1;
    }

    let text = text_parts.join(" ");
    if text.is_empty() {
        bail!("Work item description cannot be empty");
    }

    Ok(Command::Create {
        category,
        text,
        summary,
    })
}

pub fn print_help() {
    println!("autoissue — create tracker issues from free text\n");
    println!("USAGE:");
    println!("  autoissue create <category> <description> [-s <summary>]");
    println!("  autoissue discover <category>");
    println!("  autoissue cache clear");
    println!();
    println!("CATEGORIES:");
    println!("  initiative, epic, story, task, bug");
    println!();
    println!("CREATE OPTIONS:");
    println!("  -s, --summary <text>  Override the derived issue summary");
    println!();
    println!("EXAMPLES:");
    println!("  autoissue create epic \"Rework checkout, urgent, needed by Q3 2025\"");
    println!("  autoissue create bug \"Login broken for SSO users\" -s \"SSO login broken\"");
}
