pub mod models;

use indexmap::IndexMap;
use models::{AiModelConfig, Folder, ModelKind, NewSource, Source, SourceKind};
use std::collections::HashSet;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Model configuration not found: {0}")]
    ModelNotFound(String),
    #[error("Custom endpoint '{0}' cannot be activated: custom endpoints are not supported yet")]
    UnsupportedEndpoint(String),
}

/// In-memory library of sources and folders, the current selection, and the
/// configured model connections.
///
/// `selected` only ever holds ids present in `sources`.
#[derive(Debug, Clone)]
pub struct LibraryStore {
    folders: IndexMap<String, Folder>,
    sources: IndexMap<String, Source>,
    selected: HashSet<String>,
    model_configs: Vec<AiModelConfig>,
}

impl Default for LibraryStore {
    fn default() -> Self {
        Self {
            folders: IndexMap::new(),
            sources: IndexMap::new(),
            selected: HashSet::new(),
            model_configs: vec![AiModelConfig::gemini_default()],
        }
    }
}

impl LibraryStore {
    /// A store seeded with the starter URL source, already selected.
    pub fn with_defaults() -> Self {
        let mut store = Self::default();
        let docs = store.add_source(NewSource {
            name: "Gemini API Docs".to_string(),
            folder_id: None,
            kind: SourceKind::Url {
                address: "https://ai.google.dev/docs".to_string(),
            },
        });
        store.selected.insert(docs.id);
        store
    }

    // ── Folders ──

    pub fn add_folder(&mut self, name: &str) -> Folder {
        let folder = Folder {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
        };
        self.folders.insert(folder.id.clone(), folder.clone());
        folder
    }

    /// Removes the folder and every source filed under it. Returns the ids of
    /// the removed sources.
    pub fn delete_folder(&mut self, id: &str) -> Vec<String> {
        if self.folders.shift_remove(id).is_none() {
            return Vec::new();
        }
        let removed: Vec<String> = self
            .sources
            .values()
            .filter(|s| s.folder_id.as_deref() == Some(id))
            .map(|s| s.id.clone())
            .collect();
        for source_id in &removed {
            self.sources.shift_remove(source_id);
            self.selected.remove(source_id);
        }
        tracing::debug!(folder_id = id, removed = removed.len(), "folder deleted");
        removed
    }

    pub fn folders(&self) -> Vec<Folder> {
        self.folders.values().cloned().collect()
    }

    // ── Sources ──

    pub fn add_source(&mut self, new: NewSource) -> Source {
        let source = Source {
            id: uuid::Uuid::new_v4().to_string(),
            name: new.name,
            folder_id: self.known_folder(new.folder_id),
            kind: new.kind,
        };
        self.sources.insert(source.id.clone(), source.clone());
        source
    }

    pub fn delete_source(&mut self, id: &str) -> bool {
        self.selected.remove(id);
        self.sources.shift_remove(id).is_some()
    }

    /// Flips selection of `id`. Returns whether it is selected afterwards.
    pub fn toggle_source(&mut self, id: &str) -> bool {
        if !self.sources.contains_key(id) {
            return false;
        }
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.to_string());
            true
        }
    }

    /// Replaces the stored source with the same id wholesale.
    pub fn update_source(&mut self, mut source: Source) -> bool {
        source.folder_id = self.known_folder(source.folder_id);
        match self.sources.get_mut(&source.id) {
            Some(slot) => {
                *slot = source;
                true
            }
            None => false,
        }
    }

    /// Rename and/or refile a source.
    pub fn edit_source(&mut self, id: &str, name: &str, folder_id: Option<String>) -> Option<Source> {
        let mut source = self.sources.get(id)?.clone();
        source.name = name.to_string();
        source.folder_id = folder_id;
        self.update_source(source);
        self.sources.get(id).cloned()
    }

    pub fn source(&self, id: &str) -> Option<&Source> {
        self.sources.get(id)
    }

    pub fn sources(&self) -> Vec<Source> {
        self.sources.values().cloned().collect()
    }

    pub fn sources_in_folder(&self, folder_id: &str) -> Vec<Source> {
        self.sources
            .values()
            .filter(|s| s.folder_id.as_deref() == Some(folder_id))
            .cloned()
            .collect()
    }

    pub fn unfiled_sources(&self) -> Vec<Source> {
        self.sources
            .values()
            .filter(|s| s.folder_id.is_none())
            .cloned()
            .collect()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Selected sources in library order.
    pub fn selected_sources(&self) -> Vec<Source> {
        self.sources
            .values()
            .filter(|s| self.selected.contains(&s.id))
            .cloned()
            .collect()
    }

    fn known_folder(&self, folder_id: Option<String>) -> Option<String> {
        folder_id.filter(|id| self.folders.contains_key(id))
    }

    // ── Model configurations ──

    pub fn model_configs(&self) -> &[AiModelConfig] {
        &self.model_configs
    }

    /// Whether the environment-credentialed Gemini backend is switched on.
    pub fn primary_model_active(&self) -> bool {
        self.model_configs
            .iter()
            .any(|m| m.kind == ModelKind::Gemini && m.is_active)
    }

    pub fn replace_model_configs(&mut self, configs: Vec<AiModelConfig>) -> Result<(), StoreError> {
        if let Some(custom) = configs
            .iter()
            .find(|m| m.is_active && matches!(m.kind, ModelKind::Custom { .. }))
        {
            return Err(StoreError::UnsupportedEndpoint(custom.name.clone()));
        }
        self.model_configs = configs;
        Ok(())
    }

    pub fn set_model_active(&mut self, id: &str, active: bool) -> Result<(), StoreError> {
        let config = self
            .model_configs
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StoreError::ModelNotFound(id.to_string()))?;
        if active && matches!(config.kind, ModelKind::Custom { .. }) {
            return Err(StoreError::UnsupportedEndpoint(config.name.clone()));
        }
        config.is_active = active;
        Ok(())
    }

    /// Registers a custom endpoint. It is stored inactive.
    pub fn add_custom_endpoint(&mut self, name: &str, url: &str) -> AiModelConfig {
        let config = AiModelConfig {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            kind: ModelKind::Custom {
                url: url.to_string(),
            },
            is_active: false,
        };
        self.model_configs.push(config.clone());
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(name: &str, folder_id: Option<String>) -> NewSource {
        NewSource {
            name: name.to_string(),
            folder_id,
            kind: SourceKind::Url {
                address: format!("https://{name}.example"),
            },
        }
    }

    fn assert_selection_is_subset(store: &LibraryStore) {
        for id in &store.selected {
            assert!(store.sources.contains_key(id), "dangling selection {id}");
        }
    }

    #[test]
    fn test_selection_stays_subset_of_sources() {
        let mut store = LibraryStore::default();
        let a = store.add_source(url("a", None));
        let b = store.add_source(url("b", None));
        let c = store.add_source(url("c", None));

        assert!(store.toggle_source(&a.id));
        assert!(store.toggle_source(&b.id));
        assert_selection_is_subset(&store);

        assert!(store.delete_source(&a.id));
        assert_selection_is_subset(&store);
        assert!(!store.toggle_source(&a.id));
        assert_selection_is_subset(&store);

        assert!(!store.toggle_source("missing"));
        assert!(store.toggle_source(&c.id));
        assert!(!store.toggle_source(&b.id));
        assert_selection_is_subset(&store);
        assert_eq!(store.selected_sources(), vec![c]);
    }

    #[test]
    fn test_delete_folder_cascades_only_its_sources() {
        let mut store = LibraryStore::default();
        let research = store.add_folder("research");
        let news = store.add_folder("news");
        let r1 = store.add_source(url("r1", Some(research.id.clone())));
        let r2 = store.add_source(url("r2", Some(research.id.clone())));
        let n1 = store.add_source(url("n1", Some(news.id.clone())));
        let loose = store.add_source(url("loose", None));
        for id in [&r1.id, &r2.id, &n1.id, &loose.id] {
            store.toggle_source(id);
        }

        let mut removed = store.delete_folder(&research.id);
        removed.sort();
        let mut expected = vec![r1.id.clone(), r2.id.clone()];
        expected.sort();
        assert_eq!(removed, expected);

        assert_eq!(store.folders(), vec![news.clone()]);
        assert_eq!(store.sources(), vec![n1.clone(), loose.clone()]);
        assert!(!store.is_selected(&r1.id));
        assert!(!store.is_selected(&r2.id));
        assert!(store.is_selected(&n1.id));
        assert!(store.is_selected(&loose.id));
    }

    #[test]
    fn test_delete_unknown_folder_is_noop() {
        let mut store = LibraryStore::default();
        store.add_source(url("a", None));
        assert!(store.delete_folder("nope").is_empty());
        assert_eq!(store.sources().len(), 1);
    }

    #[test]
    fn test_update_source_replaces_whole_record() {
        let mut store = LibraryStore::default();
        let folder = store.add_folder("docs");
        let original = store.add_source(url("a", Some(folder.id.clone())));

        let replacement = Source {
            id: original.id.clone(),
            name: "renamed".into(),
            folder_id: None,
            kind: SourceKind::Telegram {
                handle: "@channel".into(),
            },
        };
        assert!(store.update_source(replacement.clone()));
        assert_eq!(store.source(&original.id), Some(&replacement));

        let stranger = Source {
            id: "unknown".into(),
            ..replacement
        };
        assert!(!store.update_source(stranger));
        assert_eq!(store.sources().len(), 1);
    }

    #[test]
    fn test_edit_source_moves_between_folders() {
        let mut store = LibraryStore::default();
        let folder = store.add_folder("docs");
        let source = store.add_source(url("a", None));

        let edited = store
            .edit_source(&source.id, "Alpha", Some(folder.id.clone()))
            .unwrap();
        assert_eq!(edited.name, "Alpha");
        assert_eq!(store.sources_in_folder(&folder.id), vec![edited]);
        assert!(store.unfiled_sources().is_empty());

        let stale = store
            .edit_source(&source.id, "Alpha", Some("gone".into()))
            .unwrap();
        assert_eq!(stale.folder_id, None);
    }

    #[test]
    fn test_defaults_seed_selected_docs_source() {
        let store = LibraryStore::with_defaults();
        let selected = store.selected_sources();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "Gemini API Docs");
        assert!(store.primary_model_active());
    }

    #[test]
    fn test_custom_endpoint_cannot_be_activated() {
        let mut store = LibraryStore::default();
        let custom = store.add_custom_endpoint("local", "https://my-model.example/generate");
        assert!(!custom.is_active);
        assert_eq!(
            store.set_model_active(&custom.id, true),
            Err(StoreError::UnsupportedEndpoint("local".into()))
        );

        let mut configs = store.model_configs().to_vec();
        configs[1].is_active = true;
        assert!(store.replace_model_configs(configs).is_err());
    }

    #[test]
    fn test_primary_model_can_be_switched_off() {
        let mut store = LibraryStore::default();
        store.set_model_active("gemini-default", false).unwrap();
        assert!(!store.primary_model_active());
        assert_eq!(
            store.set_model_active("missing", true),
            Err(StoreError::ModelNotFound("missing".into()))
        );
    }
}
