//! The live document, its view state, and write-through persistence.
//!
//! Every change goes: mutate in place → reconcile the active section → write the whole
//! document to the slot → publish to subscribers. Slot failures are logged and swallowed.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::document::entries::{with_new_entry, without_entry, EntryCollection};
use crate::document::models::{Language, ResumeDocument, SectionId};
use crate::document::modules::{reconcile_active, MoveDirection};
use crate::document::mutation::{dispatch, DispatchOutcome, MutationError};
use crate::document::persistence::PersistenceSlot;
use crate::document::seed::seed_document;
use crate::document::snapshot::{self, ImportError};

/// Presentation state the core still has to keep consistent. Not persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub active_section: Option<SectionId>,
    pub language: Language,
    pub editing: bool,
}

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("Section {0:?} is hidden")]
    SectionHidden(SectionId),
}

pub struct Store {
    document: ResumeDocument,
    view: ViewState,
    slot: Arc<dyn PersistenceSlot>,
    changes: watch::Sender<Arc<ResumeDocument>>,
}

impl Store {
    /// Loads from `slot`, falling back to `lang` seed defaults, and writes the result back.
    pub async fn open(slot: Arc<dyn PersistenceSlot>, lang: Language) -> Self {
        let raw = match slot.read().await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to read {}: {e}", slot.describe());
                None
            }
        };
        let document = snapshot::load(raw.as_deref(), lang);
        info!(
            "Document loaded from {} ({} experience, {} projects)",
            slot.describe(),
            document.experience.len(),
            document.projects.len()
        );

        let view = ViewState {
            active_section: reconcile_active(None, &document.config.modules),
            language: lang,
            editing: false,
        };
        let (changes, _) = watch::channel(Arc::new(document.clone()));

        let store = Self {
            document,
            view,
            slot,
            changes,
        };
        store.save().await;
        store
    }

    pub fn document(&self) -> &ResumeDocument {
        &self.document
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Observes every committed document, starting with the current one.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ResumeDocument>> {
        self.changes.subscribe()
    }

    /// Serializes the full document into the slot. Failures are logged, never returned.
    async fn save(&self) {
        let contents = match serde_json::to_string(&self.document) {
            Ok(contents) => contents,
            Err(e) => {
                error!("Failed to serialize document: {e}");
                return;
            }
        };
        if let Err(e) = self.slot.write(&contents).await {
            error!("Failed to persist document to {}: {e}", self.slot.describe());
        }
    }

    async fn commit(&mut self) {
        self.view.active_section =
            reconcile_active(self.view.active_section, &self.document.config.modules);
        self.save().await;
        self.changes.send_replace(Arc::new(self.document.clone()));
    }

    /// Runs the dispatcher. Ignored tags cause no write.
    pub async fn mutate(
        &mut self,
        tag: &str,
        data: Value,
    ) -> Result<DispatchOutcome, MutationError> {
        let outcome = dispatch(&mut self.document, tag, data)?;
        match outcome {
            DispatchOutcome::Applied(kind) => {
                info!("Applied {kind}");
                self.commit().await;
            }
            DispatchOutcome::Ignored => warn!("Ignored unknown mutation tag '{tag}'"),
        }
        Ok(outcome)
    }

    /// Prepends a blank entry with a fresh id and returns that id.
    pub async fn add_entry(
        &mut self,
        collection: EntryCollection,
    ) -> Result<String, MutationError> {
        let kind = collection.mutation();
        let (id, data) = with_new_entry(&self.document, collection)
            .map_err(|source| MutationError::Malformed { kind, source })?;
        self.mutate(kind.tag(), data).await?;
        Ok(id)
    }

    /// Returns `false` when no entry carries `id`.
    pub async fn remove_entry(
        &mut self,
        collection: EntryCollection,
        id: &str,
    ) -> Result<bool, MutationError> {
        let kind = collection.mutation();
        let Some(data) = without_entry(&self.document, collection, id) else {
            return Ok(false);
        };
        let data = data.map_err(|source| MutationError::Malformed { kind, source })?;
        self.mutate(kind.tag(), data).await?;
        Ok(true)
    }

    pub async fn toggle_visibility(&mut self, section: SectionId) {
        self.document.config.toggle_visibility(section);
        self.commit().await;
    }

    /// Returns whether anything moved; boundary moves do not write.
    pub async fn move_module(&mut self, index: usize, direction: MoveDirection) -> bool {
        let moved = self.document.config.move_module(index, direction);
        if moved {
            self.commit().await;
        }
        moved
    }

    /// Replaces the document wholesale. On error the live document is untouched.
    pub async fn import(&mut self, raw: &[u8]) -> Result<(), ImportError> {
        let document = snapshot::import(raw)?;
        info!("Imported document for '{}'", document.profile.name);
        self.document = document;
        self.commit().await;
        Ok(())
    }

    pub async fn reset(&mut self, lang: Language) {
        info!("Resetting document to {lang} seed defaults");
        self.document = seed_document(lang);
        self.view.language = lang;
        self.commit().await;
    }

    pub fn set_active_section(&mut self, section: SectionId) -> Result<(), ViewError> {
        if !self.document.config.is_visible(section) {
            return Err(ViewError::SectionHidden(section));
        }
        self.view.active_section = Some(section);
        Ok(())
    }

    pub fn set_language(&mut self, lang: Language) {
        self.view.language = lang;
    }

    pub fn set_editing(&mut self, editing: bool) {
        self.view.editing = editing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::persistence::{FileSlot, StorageError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// In-memory slot that records every write.
    #[derive(Default)]
    struct MemorySlot {
        initial: Option<String>,
        writes: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PersistenceSlot for MemorySlot {
        async fn read(&self) -> Result<Option<String>, StorageError> {
            Ok(self.initial.clone())
        }

        async fn write(&self, contents: &str) -> Result<(), StorageError> {
            self.writes.lock().unwrap().push(contents.to_string());
            Ok(())
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    impl MemorySlot {
        fn write_count(&self) -> usize {
            self.writes.lock().unwrap().len()
        }

        fn last(&self) -> ResumeDocument {
            let writes = self.writes.lock().unwrap();
            serde_json::from_str(writes.last().unwrap()).unwrap()
        }
    }

    async fn memory_store() -> (Store, Arc<MemorySlot>) {
        let slot = Arc::new(MemorySlot::default());
        let store = Store::open(slot.clone(), Language::En).await;
        (store, slot)
    }

    #[tokio::test]
    async fn test_open_empty_slot_seeds_and_persists() {
        let (store, slot) = memory_store().await;
        assert_eq!(store.document(), &seed_document(Language::En));
        assert_eq!(store.view().active_section, Some(SectionId::Stats));
        assert_eq!(slot.write_count(), 1);
    }

    #[tokio::test]
    async fn test_open_corrupt_slot_falls_back_to_seed() {
        let slot = Arc::new(MemorySlot {
            initial: Some("]]]".to_string()),
            ..Default::default()
        });
        let store = Store::open(slot, Language::Zh).await;
        assert_eq!(store.document(), &seed_document(Language::Zh));
    }

    #[tokio::test]
    async fn test_open_keeps_stored_document_with_null_fields() {
        let slot = Arc::new(MemorySlot {
            initial: Some(
                r#"{"profile": {"name": "Mine", "level": null}, "experience": []}"#.to_string(),
            ),
            ..Default::default()
        });
        let store = Store::open(slot.clone(), Language::En).await;
        assert_eq!(store.document().profile.name, "Mine");
        assert_eq!(slot.last().profile.name, "Mine");
    }

    #[tokio::test]
    async fn test_every_mutation_writes_through() {
        let (mut store, slot) = memory_store().await;
        store
            .mutate("UPDATE_PROFILE", json!({ "name": "Neo" }))
            .await
            .unwrap();
        assert_eq!(slot.write_count(), 2);
        assert_eq!(slot.last().profile.name, "Neo");

        store.mutate("UPDATE_SKILLS", json!([])).await.unwrap();
        assert_eq!(slot.write_count(), 3);
        assert!(slot.last().skills.is_empty());
    }

    #[tokio::test]
    async fn test_ignored_tag_does_not_write() {
        let (mut store, slot) = memory_store().await;
        let outcome = store.mutate("UPDATE_MOOD", json!({})).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Ignored);
        assert_eq!(slot.write_count(), 1);
    }

    #[tokio::test]
    async fn test_rejected_payload_does_not_write() {
        let (mut store, slot) = memory_store().await;
        assert!(store.mutate("UPDATE_PROJECTS", json!("nope")).await.is_err());
        assert_eq!(slot.write_count(), 1);
        assert_eq!(store.document(), &seed_document(Language::En));
    }

    #[tokio::test]
    async fn test_subscribers_see_commits() {
        let (mut store, _slot) = memory_store().await;
        let mut rx = store.subscribe();
        store
            .mutate("UPDATE_PROFILE", json!({ "title": "Netrunner" }))
            .await
            .unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().profile.title, "Netrunner");
    }

    #[tokio::test]
    async fn test_hiding_active_section_reassigns_it() {
        let (mut store, _slot) = memory_store().await;
        store.set_active_section(SectionId::Education).unwrap();
        store.toggle_visibility(SectionId::Education).await;
        assert_eq!(store.view().active_section, Some(SectionId::Stats));
    }

    #[tokio::test]
    async fn test_hiding_everything_unsets_active() {
        let (mut store, _slot) = memory_store().await;
        for section in SectionId::ALL {
            store.toggle_visibility(section).await;
        }
        assert!(store.document().config.modules.is_empty());
        assert_eq!(store.view().active_section, None);

        store.toggle_visibility(SectionId::Projects).await;
        assert_eq!(store.view().active_section, Some(SectionId::Projects));
    }

    #[tokio::test]
    async fn test_cannot_activate_hidden_section() {
        let (mut store, _slot) = memory_store().await;
        store.toggle_visibility(SectionId::Timeline).await;
        assert!(matches!(
            store.set_active_section(SectionId::Timeline),
            Err(ViewError::SectionHidden(SectionId::Timeline))
        ));
    }

    #[tokio::test]
    async fn test_boundary_move_does_not_write() {
        let (mut store, slot) = memory_store().await;
        assert!(!store.move_module(0, MoveDirection::Up).await);
        assert_eq!(slot.write_count(), 1);
        assert!(store.move_module(0, MoveDirection::Down).await);
        assert_eq!(slot.write_count(), 2);
        assert_eq!(slot.last().config.modules[0], SectionId::Timeline);
    }

    #[tokio::test]
    async fn test_failed_import_preserves_document() {
        let (mut store, slot) = memory_store().await;
        assert!(store.import(b"{\"skills\": []}").await.is_err());
        assert!(store.import(b"not json at all").await.is_err());
        assert_eq!(store.document(), &seed_document(Language::En));
        assert_eq!(slot.write_count(), 1);
    }

    #[tokio::test]
    async fn test_import_replaces_document() {
        let (mut store, slot) = memory_store().await;
        store
            .import(
                br#"{"profile": {"name": "Imported"}, "config": {
                    "modules": ["PROJECTS"],
                    "hiddenModules": ["STATS", "TIMELINE", "EDUCATION"]
                }}"#,
            )
            .await
            .unwrap();
        assert_eq!(store.document().profile.name, "Imported");
        assert_eq!(store.view().active_section, Some(SectionId::Projects));
        assert_eq!(slot.last().profile.name, "Imported");
    }

    #[tokio::test]
    async fn test_reset_switches_language() {
        let (mut store, _slot) = memory_store().await;
        store
            .mutate("UPDATE_PROFILE", json!({ "name": "Temp" }))
            .await
            .unwrap();
        store.reset(Language::Zh).await;
        assert_eq!(store.document(), &seed_document(Language::Zh));
        assert_eq!(store.view().language, Language::Zh);
    }

    #[tokio::test]
    async fn test_add_and_remove_entry() {
        let (mut store, _slot) = memory_store().await;
        let id = store.add_entry(EntryCollection::Education).await.unwrap();
        assert_eq!(store.document().education[0].id, id);
        assert_eq!(store.document().education.len(), 2);

        assert!(store.remove_entry(EntryCollection::Education, &id).await.unwrap());
        assert_eq!(store.document().education.len(), 1);
        assert!(!store.remove_entry(EntryCollection::Education, &id).await.unwrap());
    }

    #[tokio::test]
    async fn test_file_slot_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        {
            let slot = Arc::new(FileSlot::in_dir(dir.path()));
            let mut store = Store::open(slot, Language::En).await;
            store
                .mutate("UPDATE_PROFILE", json!({ "bio": "Persisted." }))
                .await
                .unwrap();
        }
        let slot = Arc::new(FileSlot::in_dir(dir.path()));
        let store = Store::open(slot, Language::Zh).await;
        assert_eq!(store.document().profile.bio, "Persisted.");
    }
}
