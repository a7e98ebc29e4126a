use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Abstract kind of work item being created, independent of the tracker's
/// own issue-type naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkItemCategory {
    Initiative,
    Epic,
    Story,
    Task,
    Bug,
}

impl WorkItemCategory {
    pub const ALL: [WorkItemCategory; 5] = [
        WorkItemCategory::Initiative,
        WorkItemCategory::Epic,
        WorkItemCategory::Story,
        WorkItemCategory::Task,
        WorkItemCategory::Bug,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkItemCategory::Initiative => "initiative",
            WorkItemCategory::Epic => "epic",
            WorkItemCategory::Story => "story",
            WorkItemCategory::Task => "task",
            WorkItemCategory::Bug => "bug",
        }
    }

    /// Tracker issue-type names to try for this category, in order; the
    /// first one the tracker actually has wins.
    pub fn issue_type_candidates(&self) -> &'static [&'static str] {
        match self {
            WorkItemCategory::Initiative => &["Initiative", "Epic", "Story"],
            WorkItemCategory::Epic => &["Epic"],
            WorkItemCategory::Story => &["Story", "Task"],
            WorkItemCategory::Task => &["Task"],
            WorkItemCategory::Bug => &["Bug", "Task"],
        }
    }
}

impl fmt::Display for WorkItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkItemCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "initiative" => Ok(WorkItemCategory::Initiative),
            "epic" => Ok(WorkItemCategory::Epic),
            "story" => Ok(WorkItemCategory::Story),
            "task" => Ok(WorkItemCategory::Task),
            "bug" => Ok(WorkItemCategory::Bug),
            other => Err(format!(
                "Unknown category '{other}'. Expected one of: initiative, epic, story, task, bug"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Epic".parse::<WorkItemCategory>().unwrap(), WorkItemCategory::Epic);
        assert_eq!("BUG".parse::<WorkItemCategory>().unwrap(), WorkItemCategory::Bug);
        assert!("widget".parse::<WorkItemCategory>().is_err());
    }

    #[test]
    fn initiative_falls_back_through_epic_to_story() {
        assert_eq!(
            WorkItemCategory::Initiative.issue_type_candidates(),
            &["Initiative", "Epic", "Story"]
        );
    }
}
