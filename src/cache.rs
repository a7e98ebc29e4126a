use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::data_dir;
use crate::model::field::FieldMapping;

/// Durable store of the last discovered field mapping per work-item
/// category. Last write wins; entries are replaced wholesale.
pub trait MappingStore: Send + Sync {
    fn get(&self, category: &str) -> Result<Option<FieldMapping>>;
    fn set(&self, category: &str, mapping: &FieldMapping) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    mappings: HashMap<String, FieldMapping>,
}

/// File-backed store: one JSON document holding every category's mapping.
/// Reads go to disk every time so concurrent processes see each other's
/// writes.
pub struct FileMappingStore {
    path: PathBuf,
}

impl FileMappingStore {
    pub fn new() -> Self {
        Self {
            path: data_dir().join("mappings.json"),
        }
    }

    #[cfg(test)]
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    fn load(&self) -> StoreData {
        if !self.path.exists() {
            return StoreData::default();
        }
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default()
    }

    fn save(&self, data: &StoreData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}

impl MappingStore for FileMappingStore {
    fn get(&self, category: &str) -> Result<Option<FieldMapping>> {
        Ok(self.load().mappings.get(category).cloned())
    }

    fn set(&self, category: &str, mapping: &FieldMapping) -> Result<()> {
        let mut data = self.load();
        data.mappings.insert(category.to_string(), mapping.clone());
        self.save(&data)
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::field::{FieldDescriptor, FieldType};

    fn mapping(category: &str, field_name: &str) -> FieldMapping {
        FieldMapping::new(
            category,
            "Epic",
            vec![FieldDescriptor::new("summary", field_name, FieldType::Text, true)],
        )
    }

    #[test]
    fn set_then_get_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMappingStore::at(dir.path().join("mappings.json"));

        assert!(store.get("epic").unwrap().is_none());
        store.set("epic", &mapping("epic", "Summary")).unwrap();

        let loaded = store.get("epic").unwrap().unwrap();
        assert_eq!(loaded.work_item_category, "epic");
        assert_eq!(loaded.fields[0].name, "Summary");
    }

    #[test]
    fn rediscovery_replaces_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMappingStore::at(dir.path().join("mappings.json"));

        store.set("epic", &mapping("epic", "Old")).unwrap();
        store.set("epic", &mapping("epic", "New")).unwrap();

        let loaded = store.get("epic").unwrap().unwrap();
        assert_eq!(loaded.fields[0].name, "New");
    }

    #[test]
    fn categories_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMappingStore::at(dir.path().join("mappings.json"));

        store.set("epic", &mapping("epic", "Summary")).unwrap();
        store.set("story", &mapping("story", "Summary")).unwrap();

        assert!(store.get("epic").unwrap().is_some());
        assert!(store.get("story").unwrap().is_some());
        assert!(store.get("bug").unwrap().is_none());
    }

    #[test]
    fn clear_removes_everything() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMappingStore::at(dir.path().join("mappings.json"));

        store.set("epic", &mapping("epic", "Summary")).unwrap();
        store.clear().unwrap();
        assert!(store.get("epic").unwrap().is_none());
        // Clearing an already-empty store is fine too.
        store.clear().unwrap();
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mappings.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = FileMappingStore::at(path);
        assert!(store.get("epic").unwrap().is_none());
    }
}
