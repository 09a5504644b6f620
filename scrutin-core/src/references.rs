//! Reference document catalog

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::config::{Config, ReferenceEntry};
use crate::model::{ReferenceDocument, ReferenceKind};
use crate::{Error, Result};

/// Reference contents keyed by catalog id, as stored between steps
pub type ReferenceContents = BTreeMap<String, String>;

/// Configured reference documents the reviewer can attach
#[derive(Debug, Clone, Default)]
pub struct ReferenceCatalog {
    entries: Vec<ReferenceEntry>,
}

impl ReferenceCatalog {
    pub fn new(entries: Vec<ReferenceEntry>) -> Self {
        Self { entries }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.references.clone())
    }

    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&ReferenceEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Read the content of each selected reference
    ///
    /// Reference paths come from configuration and are not subject to the
    /// file picker allowlist.
    pub async fn load(&self, ids: &[String]) -> Result<ReferenceContents> {
        let mut contents = ReferenceContents::new();

        for id in ids {
            let entry = self
                .get(id)
                .ok_or_else(|| Error::Input(format!("Unknown reference id: {}", id)))?;

            let content = tokio::fs::read_to_string(&entry.path)
                .await
                .map_err(|e| match e.kind() {
                    std::io::ErrorKind::NotFound => {
                        Error::NotFound(entry.path.display().to_string())
                    }
                    _ => Error::Io(e),
                })?;

            debug!(id = %entry.id, chars = content.len(), "Loaded reference");
            contents.insert(entry.id.clone(), content);
        }

        info!(count = contents.len(), "Loaded reference contents");
        Ok(contents)
    }

    /// Turn stored contents into documents for the prompt
    ///
    /// Ids missing from the catalog keep their content, with kind `unknown`
    /// and the id as the display name.
    pub fn resolve_documents(&self, contents: &ReferenceContents) -> Vec<ReferenceDocument> {
        contents
            .iter()
            .map(|(id, content)| match self.get(id) {
                Some(entry) => ReferenceDocument::new(
                    id.as_str(),
                    entry.kind.clone(),
                    entry.name.as_str(),
                    content.as_str(),
                ),
                None => ReferenceDocument::new(
                    id.as_str(),
                    ReferenceKind::Other("unknown".to_string()),
                    id.as_str(),
                    content.as_str(),
                ),
            })
            .collect()
    }
}
