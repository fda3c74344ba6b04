//! Render-side access to page copy.

use tracing::warn;

use crate::cache::{ContentCache, PageContent};
use crate::sanitize::sanitize;

/// One page's sections as the rendering layer consumes them.
///
/// When the cache cannot be read the copy is empty and marked degraded, so
/// every accessor falls back to the built-in text supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct PageCopy {
    content: PageContent,
    degraded: bool,
}

impl PageCopy {
    pub fn new(content: PageContent) -> Self {
        Self {
            content,
            degraded: false,
        }
    }

    pub async fn load(cache: &ContentCache, page_id: &str) -> Self {
        match cache.get_page(page_id).await {
            Ok(content) => Self::new(content),
            Err(error) => {
                warn!(
                    target = "pagecopy::copy",
                    page_id,
                    error = %error,
                    "Page copy unavailable; rendering fallback copy"
                );
                Self {
                    content: PageContent::new(),
                    degraded: true,
                }
            }
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Plain section value, or `fallback` when the section is missing or blank.
    pub fn text<'a>(&'a self, section: &str, fallback: &'a str) -> &'a str {
        self.content
            .get(section)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(fallback)
    }

    /// Sanitized rich-text section; the fallback goes through the same policy.
    pub fn rich(&self, section: &str, fallback: &str) -> String {
        sanitize(Some(self.text(section, fallback)))
    }
}
