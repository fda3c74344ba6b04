use std::sync::Arc;

/// Page ids shipped by default when the configuration does not list any.
pub const DEFAULT_PAGES: [&str; 5] = ["home", "about", "contact", "privacy", "terms"];

/// The fixed set of page ids a cache instance snapshots.
///
/// Enumerated once at construction; every snapshot covers exactly these ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCatalog {
    pages: Arc<[String]>,
}

impl PageCatalog {
    /// Build a catalog, dropping duplicate ids while keeping first-seen order.
    pub fn new<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for page in pages {
            let page = page.into();
            if !unique.contains(&page) {
                unique.push(page);
            }
        }
        Self {
            pages: unique.into(),
        }
    }

    pub fn contains(&self, page_id: &str) -> bool {
        self.pages.iter().any(|page| page == page_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl Default for PageCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_PAGES)
    }
}
