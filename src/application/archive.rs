//! Import/export of page copy as a TOML archive.
//!
//! The archive keeps the store's split between the content and metadata
//! hashes so an export can be imported without changing which section wins a
//! collision:
//!
//! ```toml
//! exported_at = "2024-05-01T12:00:00Z"
//!
//! [pages.home.content]
//! title = "Text tools"
//!
//! [pages.home.metadata]
//! description = "Free online text utilities"
//! ```

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

use crate::{
    application::{
        editor::UpdateSectionsCommand,
        repos::{ContentStore, StoreError},
    },
    cache::{PageCatalog, SectionKind, StoreKey},
};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to read archive `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write archive `{path}`: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid archive: {0}")]
    Decode(#[from] toml::de::Error),
    #[error("failed to encode archive: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyArchive {
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub exported_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub pages: BTreeMap<String, ArchivedPage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedPage {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub content: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl CopyArchive {
    /// Read both hashes of every catalog page straight from the store.
    pub async fn gather(
        store: &dyn ContentStore,
        catalog: &PageCatalog,
    ) -> Result<Self, ArchiveError> {
        let mut pages = BTreeMap::new();

        for page_id in catalog.iter() {
            let content = store
                .hash_get_all(&StoreKey::content(page_id).render())
                .await?;
            let metadata = store
                .hash_get_all(&StoreKey::metadata(page_id).render())
                .await?;

            pages.insert(
                page_id.to_string(),
                ArchivedPage {
                    content: content.into_iter().collect(),
                    metadata: metadata.into_iter().collect(),
                },
            );
        }

        Ok(Self {
            exported_at: Some(OffsetDateTime::now_utc()),
            pages,
        })
    }

    pub fn from_toml(data: &str) -> Result<Self, ArchiveError> {
        Ok(toml::from_str(data)?)
    }

    pub fn to_toml(&self) -> Result<String, ArchiveError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn read(path: &Path) -> Result<Self, ArchiveError> {
        let data = fs::read_to_string(path).map_err(|source| ArchiveError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&data)
    }

    pub fn write(&self, path: &Path) -> Result<(), ArchiveError> {
        let encoded = self.to_toml()?;
        fs::write(path, encoded).map_err(|source| ArchiveError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// One write command per non-empty table, content before metadata.
    pub fn into_commands(self) -> Vec<UpdateSectionsCommand> {
        let mut commands = Vec::new();

        for (page_id, page) in self.pages {
            if !page.content.is_empty() {
                commands.push(UpdateSectionsCommand {
                    page_id: page_id.clone(),
                    kind: SectionKind::Content,
                    fields: page.content,
                });
            }
            if !page.metadata.is_empty() {
                commands.push(UpdateSectionsCommand {
                    page_id,
                    kind: SectionKind::Metadata,
                    fields: page.metadata,
                });
            }
        }

        commands
    }
}
