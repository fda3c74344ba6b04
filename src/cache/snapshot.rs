//! Snapshot types held by the content cache.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

/// Section key → section value for one page.
pub type PageContent = BTreeMap<String, String>;

/// Immutable view of every catalog page at one point in time.
///
/// Built once per refresh and shared behind an `Arc`; a refresh replaces the
/// whole snapshot instead of mutating it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ContentSnapshot {
    pages: BTreeMap<String, PageContent>,
}

impl ContentSnapshot {
    /// Assemble a snapshot from per-page fetch results.
    pub fn from_pages(pages: impl IntoIterator<Item = (String, PageContent)>) -> Self {
        Self {
            pages: pages.into_iter().collect(),
        }
    }

    /// Content for one page, `None` when the id is not part of the snapshot.
    pub fn page(&self, page_id: &str) -> Option<&PageContent> {
        self.pages.get(page_id)
    }

    pub fn pages(&self) -> impl Iterator<Item = (&str, &PageContent)> {
        self.pages
            .iter()
            .map(|(id, content)| (id.as_str(), content))
    }

    pub fn page_ids(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Merge the content and metadata hashes of one page.
///
/// Metadata is applied last, so it wins on key collision.
pub fn merge_sections(
    content: HashMap<String, String>,
    metadata: HashMap<String, String>,
) -> PageContent {
    let mut merged: PageContent = content.into_iter().collect();
    merged.extend(metadata);
    merged
}
