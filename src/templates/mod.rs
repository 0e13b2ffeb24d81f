//! Template registry - store and reuse operation lists.
//!
//! A template is a named, ordered list of operations saved as a JSON file,
//! so a cleanup recipe built once can be replayed against new uploads.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{TemplateError, TemplateResult};
use crate::transform::ops::Operation;

/// Directory where templates are stored (relative to current dir)
const DEFAULT_REGISTRY_DIR: &str = ".tablemill/templates";

/// A stored operation list with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTemplate {
    /// Unique identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// The ordered operation list
    pub operations: Vec<Operation>,
    /// Creation timestamp
    pub created_at: String,
    /// Last time this template was used
    pub last_used: Option<String>,
    /// Number of times used
    pub use_count: u32,
}

/// Registry for managing operation templates.
pub struct TemplateRegistry {
    registry_dir: PathBuf,
    templates: HashMap<String, StoredTemplate>,
}

impl TemplateRegistry {
    /// Create a new registry, loading existing templates from disk.
    pub fn new() -> Self {
        Self::with_dir(DEFAULT_REGISTRY_DIR)
    }

    /// Create a registry with a custom directory.
    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        let registry_dir = PathBuf::from(dir.as_ref());
        let mut registry = Self { registry_dir, templates: HashMap::new() };
        registry.load_all();
        registry
    }

    /// Load all templates from the registry directory. Unreadable or
    /// malformed files are skipped.
    fn load_all(&mut self) {
        if !self.registry_dir.exists() {
            return;
        }

        let entries = match fs::read_dir(&self.registry_dir) {
            Ok(e) => e,
            Err(_) => return,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Ok(content) = fs::read_to_string(&path) {
                    if let Ok(template) = serde_json::from_str::<StoredTemplate>(&content) {
                        self.templates.insert(template.id.clone(), template);
                    }
                }
            }
        }
    }

    /// Get all stored templates, newest first.
    pub fn list(&self) -> Vec<&StoredTemplate> {
        let mut templates: Vec<_> = self.templates.values().collect();
        templates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        templates
    }

    /// Get a template by ID.
    pub fn get(&self, id: &str) -> Option<&StoredTemplate> {
        self.templates.get(id)
    }

    /// Save a new template to the registry.
    pub fn save(&mut self, name: &str, operations: Vec<Operation>) -> TemplateResult<String> {
        fs::create_dir_all(&self.registry_dir)?;

        let id = self.generate_id(name);
        let stored = StoredTemplate {
            id: id.clone(),
            name: name.to_string(),
            operations,
            created_at: chrono::Utc::now().to_rfc3339(),
            last_used: None,
            use_count: 0,
        };

        let path = self.registry_dir.join(format!("{}.json", id));
        let content = serde_json::to_string_pretty(&stored)?;
        fs::write(&path, content)?;

        self.templates.insert(id.clone(), stored);
        Ok(id)
    }

    /// Import an operation list from a JSON file.
    pub fn import(&mut self, path: &Path, name: Option<&str>) -> TemplateResult<String> {
        let content = fs::read_to_string(path)?;
        let operations: Vec<Operation> = serde_json::from_str(&content)?;

        let template_name = name.unwrap_or_else(|| {
            path.file_stem().and_then(|s| s.to_str()).unwrap_or("imported")
        });

        self.save(template_name, operations)
    }

    /// Record a use of the template.
    pub fn touch(&mut self, id: &str) {
        if let Some(template) = self.templates.get_mut(id) {
            template.last_used = Some(chrono::Utc::now().to_rfc3339());
            template.use_count += 1;

            let path = self.registry_dir.join(format!("{}.json", id));
            if let Ok(content) = serde_json::to_string_pretty(template) {
                let _ = fs::write(&path, content);
            }
        }
    }

    /// Delete a template from the registry.
    pub fn delete(&mut self, id: &str) -> TemplateResult<()> {
        if self.templates.remove(id).is_some() {
            let path = self.registry_dir.join(format!("{}.json", id));
            fs::remove_file(&path)?;
            Ok(())
        } else {
            Err(TemplateError::NotFound(id.to_string()))
        }
    }

    /// Generate a unique ID from a name.
    fn generate_id(&self, name: &str) -> String {
        let slug: String = name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-");

        let timestamp = chrono::Utc::now().timestamp_millis();
        format!("{}-{}", slug, timestamp)
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_ops() -> Vec<Operation> {
        vec![
            Operation::TrimSpaces { columns: vec!["name".into()] },
            Operation::RemoveDuplicates { columns: vec!["name".into()] },
        ]
    }

    #[test]
    fn test_save_and_get() {
        let dir = tempdir().unwrap();
        let mut registry = TemplateRegistry::with_dir(dir.path());

        let id = registry.save("Weekly Cleanup", sample_ops()).unwrap();
        assert!(id.starts_with("weekly-cleanup-"));

        let stored = registry.get(&id).unwrap();
        assert_eq!(stored.name, "Weekly Cleanup");
        assert_eq!(stored.operations.len(), 2);
        assert_eq!(stored.use_count, 0);
    }

    #[test]
    fn test_persists_across_instances() {
        let dir = tempdir().unwrap();
        let id = {
            let mut registry = TemplateRegistry::with_dir(dir.path());
            registry.save("cleanup", sample_ops()).unwrap()
        };

        let reloaded = TemplateRegistry::with_dir(dir.path());
        assert!(reloaded.get(&id).is_some());
        assert_eq!(reloaded.list().len(), 1);
    }

    #[test]
    fn test_touch_updates_stats() {
        let dir = tempdir().unwrap();
        let mut registry = TemplateRegistry::with_dir(dir.path());
        let id = registry.save("cleanup", sample_ops()).unwrap();

        registry.touch(&id);
        let stored = registry.get(&id).unwrap();
        assert_eq!(stored.use_count, 1);
        assert!(stored.last_used.is_some());
    }

    #[test]
    fn test_delete() {
        let dir = tempdir().unwrap();
        let mut registry = TemplateRegistry::with_dir(dir.path());
        let id = registry.save("cleanup", sample_ops()).unwrap();

        registry.delete(&id).unwrap();
        assert!(registry.get(&id).is_none());

        let err = registry.delete("missing").unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(_)));
    }

    #[test]
    fn test_import_operation_list() {
        let dir = tempdir().unwrap();
        let ops_file = dir.path().join("ops.json");
        std::fs::write(
            &ops_file,
            r#"[{"type": "trimSpaces", "columns": ["name"]}]"#,
        )
        .unwrap();

        let mut registry = TemplateRegistry::with_dir(dir.path().join("registry"));
        let id = registry.import(&ops_file, None).unwrap();

        let stored = registry.get(&id).unwrap();
        assert_eq!(stored.name, "ops");
        assert_eq!(stored.operations.len(), 1);
    }
}
