//! CMS write path for page copy.
//!
//! Every successful write is followed by a forced cache refresh so the next
//! read in this process observes it.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::repos::{ContentStore, StoreError};
use crate::cache::{CacheError, ContentCache, ContentSnapshot, PageContent, SectionKind, StoreKey};

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("page `{0}` is not part of the page catalog")]
    UnknownPage(String),
    #[error("{0}")]
    ConstraintViolation(&'static str),
    #[error("expected SECTION=VALUE, got `{0}`")]
    InvalidAssignment(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("write stored but cache refresh failed: {0}")]
    Refresh(#[source] CacheError),
}

#[derive(Debug, Clone)]
pub struct UpdateSectionsCommand {
    pub page_id: String,
    pub kind: SectionKind,
    pub fields: BTreeMap<String, String>,
}

impl UpdateSectionsCommand {
    /// Build a command from `SECTION=VALUE` pairs; the value may itself contain `=`.
    pub fn from_assignments<S: AsRef<str>>(
        page_id: impl Into<String>,
        kind: SectionKind,
        assignments: &[S],
    ) -> Result<Self, EditorError> {
        let mut fields = BTreeMap::new();
        for assignment in assignments {
            let assignment = assignment.as_ref();
            let (section, value) = assignment
                .split_once('=')
                .ok_or_else(|| EditorError::InvalidAssignment(assignment.to_string()))?;
            fields.insert(section.trim().to_string(), value.to_string());
        }

        Ok(Self {
            page_id: page_id.into(),
            kind,
            fields,
        })
    }
}

#[derive(Clone)]
pub struct ContentEditor {
    store: Arc<dyn ContentStore>,
    cache: Arc<ContentCache>,
}

impl ContentEditor {
    pub fn new(store: Arc<dyn ContentStore>, cache: Arc<ContentCache>) -> Self {
        Self { store, cache }
    }

    /// Write one page's sections and return that page as the cache now sees it.
    pub async fn update_sections(
        &self,
        command: UpdateSectionsCommand,
    ) -> Result<PageContent, EditorError> {
        let page_id = command.page_id.clone();
        let snapshot = self.apply(vec![command]).await?;
        Ok(snapshot.page(&page_id).cloned().unwrap_or_default())
    }

    /// Write several section updates, then refresh the cache once.
    ///
    /// Every command is validated before anything is written. A store failure
    /// midway leaves the earlier writes in place.
    pub async fn apply(
        &self,
        commands: Vec<UpdateSectionsCommand>,
    ) -> Result<Arc<ContentSnapshot>, EditorError> {
        for command in &commands {
            self.validate(command)?;
        }

        for command in &commands {
            let key = StoreKey::new(command.kind, command.page_id.as_str());
            self.store.hash_set(&key.render(), &command.fields).await?;

            info!(
                target = "pagecopy::editor",
                page_id = %command.page_id,
                kind = command.kind.as_str(),
                sections = command.fields.len(),
                "Page sections written"
            );
        }

        self.cache.force_refresh().await.map_err(EditorError::Refresh)
    }

    fn validate(&self, command: &UpdateSectionsCommand) -> Result<(), EditorError> {
        if !self.cache.catalog().contains(&command.page_id) {
            return Err(EditorError::UnknownPage(command.page_id.clone()));
        }
        if command.fields.is_empty() {
            return Err(EditorError::ConstraintViolation(
                "at least one section must be provided",
            ));
        }
        if command.fields.keys().any(|section| section.trim().is_empty()) {
            return Err(EditorError::ConstraintViolation(
                "section names must not be blank",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::cache::{CacheConfig, PageCatalog};
    use crate::infra::memory::MemoryStore;

    /// Accepts writes but can be switched to fail every read.
    #[derive(Default)]
    struct ReadFailingStore {
        inner: MemoryStore,
        failing_reads: AtomicBool,
    }

    #[async_trait]
    impl ContentStore for ReadFailingStore {
        async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
            if self.failing_reads.load(Ordering::SeqCst) {
                return Err(StoreError::Connection("connection reset".to_string()));
            }
            self.inner.hash_get_all(key).await
        }

        async fn hash_set(
            &self,
            key: &str,
            fields: &BTreeMap<String, String>,
        ) -> Result<(), StoreError> {
            self.inner.hash_set(key, fields).await
        }
    }

    fn editor_over(store: Arc<MemoryStore>) -> ContentEditor {
        let cache = Arc::new(ContentCache::new(
            store.clone(),
            PageCatalog::new(["home", "about"]),
            CacheConfig::default(),
        ));
        ContentEditor::new(store, cache)
    }

    fn command(page_id: &str, kind: SectionKind, pairs: &[(&str, &str)]) -> UpdateSectionsCommand {
        UpdateSectionsCommand {
            page_id: page_id.to_string(),
            kind,
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[tokio::test]
    async fn write_is_visible_to_the_next_read() {
        let store = Arc::new(MemoryStore::new().with_hash("page:home", [("title", "Old")]));
        let editor = editor_over(Arc::clone(&store));

        assert_eq!(
            editor.cache.get_page("home").await.expect("warm")["title"],
            "Old"
        );

        let page = editor
            .update_sections(command("home", SectionKind::Content, &[("title", "New")]))
            .await
            .expect("update");
        assert_eq!(page["title"], "New");
        assert_eq!(
            editor.cache.get_page("home").await.expect("read")["title"],
            "New"
        );
    }

    #[tokio::test]
    async fn metadata_write_lands_in_metadata_hash() {
        let store = Arc::new(MemoryStore::new());
        let editor = editor_over(Arc::clone(&store));

        editor
            .update_sections(command(
                "about",
                SectionKind::Metadata,
                &[("description", "Who we are")],
            ))
            .await
            .expect("update");

        let metadata = store.hash_get_all("metadata:about").await.expect("read");
        assert_eq!(
            metadata.get("description").map(String::as_str),
            Some("Who we are")
        );
        assert!(store.hash_get_all("page:about").await.expect("read").is_empty());
    }

    #[tokio::test]
    async fn rejects_unknown_pages_before_writing() {
        let store = Arc::new(MemoryStore::new());
        let editor = editor_over(Arc::clone(&store));

        let error = editor
            .apply(vec![
                command("home", SectionKind::Content, &[("title", "Ok")]),
                command("pricing", SectionKind::Content, &[("title", "Nope")]),
            ])
            .await
            .expect_err("unknown page");

        assert!(matches!(error, EditorError::UnknownPage(page) if page == "pricing"));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn rejects_empty_updates() {
        let store = Arc::new(MemoryStore::new());
        let editor = editor_over(Arc::clone(&store));

        let error = editor
            .update_sections(command("home", SectionKind::Content, &[]))
            .await
            .expect_err("empty update");
        assert!(matches!(error, EditorError::ConstraintViolation(_)));
    }

    #[test]
    fn assignments_split_on_first_equals() {
        let command = UpdateSectionsCommand::from_assignments(
            "home",
            SectionKind::Content,
            &["title=Home", "body=<a href=\"/x\">x</a>"],
        )
        .expect("valid assignments");

        assert_eq!(command.fields["title"], "Home");
        assert_eq!(command.fields["body"], "<a href=\"/x\">x</a>");

        let error =
            UpdateSectionsCommand::from_assignments("home", SectionKind::Content, &["title"])
                .expect_err("missing separator");
        assert!(matches!(error, EditorError::InvalidAssignment(raw) if raw == "title"));
    }

    #[tokio::test]
    async fn failed_refresh_after_write_keeps_write_and_stale_copy() {
        let store = Arc::new(ReadFailingStore::default());
        let cache = Arc::new(ContentCache::new(
            store.clone(),
            PageCatalog::new(["home", "about"]),
            CacheConfig::default(),
        ));
        let editor = ContentEditor::new(store.clone(), Arc::clone(&cache));

        editor
            .update_sections(command("home", SectionKind::Content, &[("title", "Old")]))
            .await
            .expect("first write");

        store.failing_reads.store(true, Ordering::SeqCst);
        let error = editor
            .update_sections(command("home", SectionKind::Content, &[("title", "New")]))
            .await
            .expect_err("refresh should fail");
        assert!(matches!(
            error,
            EditorError::Refresh(CacheError::StoreUnavailable { .. })
        ));

        let stored = store.inner.hash_get_all("page:home").await.expect("read");
        assert_eq!(stored.get("title").map(String::as_str), Some("New"));

        let stale = cache.last_known().expect("stale snapshot kept");
        assert_eq!(
            stale
                .page("home")
                .and_then(|page| page.get("title"))
                .map(String::as_str),
            Some("Old")
        );
    }

    #[tokio::test]
    async fn batch_refreshes_once() {
        let store = Arc::new(MemoryStore::new());
        let editor = editor_over(Arc::clone(&store));

        editor
            .apply(vec![
                command("home", SectionKind::Content, &[("title", "Home")]),
                command("about", SectionKind::Metadata, &[("title", "About")]),
            ])
            .await
            .expect("batch");

        assert_eq!(store.writes(), 2);
        assert_eq!(store.reads(), 4);
    }
}
