//! Store key definitions.
//!
//! Every page owns two hashes in the key-value store: the editable copy under
//! `page:<id>` and the page metadata under `metadata:<id>`.

use std::fmt;

const CONTENT_PREFIX: &str = "page:";
const METADATA_PREFIX: &str = "metadata:";

/// Which of the two per-page hashes a section lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// Editable copy (titles, bodies, call-to-action text).
    Content,
    /// Page metadata; wins over content when both define a section.
    Metadata,
}

impl SectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Content => "content",
            SectionKind::Metadata => "metadata",
        }
    }
}

/// A fully qualified key in the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey {
    kind: SectionKind,
    page_id: String,
}

impl StoreKey {
    pub fn new(kind: SectionKind, page_id: impl Into<String>) -> Self {
        Self {
            kind,
            page_id: page_id.into(),
        }
    }

    pub fn content(page_id: impl Into<String>) -> Self {
        Self::new(SectionKind::Content, page_id)
    }

    pub fn metadata(page_id: impl Into<String>) -> Self {
        Self::new(SectionKind::Metadata, page_id)
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    /// Render the key in the store's `<prefix><page-id>` layout.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            SectionKind::Content => CONTENT_PREFIX,
            SectionKind::Metadata => METADATA_PREFIX,
        };
        write!(f, "{prefix}{}", self.page_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_store_layout() {
        assert_eq!(StoreKey::content("home").render(), "page:home");
        assert_eq!(StoreKey::metadata("home").render(), "metadata:home");
    }

    #[test]
    fn display_matches_render() {
        let key = StoreKey::metadata("about");
        assert_eq!(key.to_string(), key.render());
        assert_eq!(key.kind(), SectionKind::Metadata);
        assert_eq!(key.page_id(), "about");
    }
}
