//! Local file access for the file picker
//!
//! Every path is canonicalized and must fall under one of the allowed roots
//! before it is read. An empty root list allows any path.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::FilesConfig;
use crate::{Error, Result};

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    /// Full path of the entry
    pub id: String,
    pub name: String,
    pub is_directory: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileNode>>,
}

fn map_io(path: &Path, err: std::io::Error) -> Error {
    if err.kind() == ErrorKind::NotFound {
        Error::NotFound(path.display().to_string())
    } else {
        Error::Io(err)
    }
}

fn walk(dir: &Path) -> std::io::Result<Vec<FileNode>> {
    let mut nodes = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_directory = entry.file_type()?.is_dir();
        let children = if is_directory { Some(walk(&path)?) } else { None };
        nodes.push(FileNode {
            id: path.display().to_string(),
            name,
            is_directory,
            children,
        });
    }
    nodes.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(nodes)
}

/// Format one file as a delimited block
pub fn file_block(path: &str, content: &str) -> String {
    format!("=== {} ===\n{}\n=== End {} ===", path, content, path)
}

/// Reads files and directory trees under a set of allowed roots
#[derive(Debug, Clone, Default)]
pub struct FileReader {
    allowed_roots: Vec<PathBuf>,
}

impl FileReader {
    pub fn new(allowed_roots: Vec<PathBuf>) -> Self {
        Self { allowed_roots }
    }

    pub fn from_config(config: &FilesConfig) -> Self {
        Self::new(config.allowed_roots.clone())
    }

    /// Canonicalize `path` and check it against the allowlist
    pub async fn resolve(&self, path: &Path) -> Result<PathBuf> {
        let resolved = tokio::fs::canonicalize(path)
            .await
            .map_err(|e| map_io(path, e))?;

        if self.allowed_roots.is_empty() {
            return Ok(resolved);
        }

        for root in &self.allowed_roots {
            // A root that does not exist cannot contain anything
            if let Ok(root) = tokio::fs::canonicalize(root).await {
                if resolved.starts_with(&root) {
                    return Ok(resolved);
                }
            }
        }

        warn!(path = %path.display(), "Rejected path outside allowed roots");
        Err(Error::Input(format!(
            "Path is outside the allowed roots: {}",
            path.display()
        )))
    }

    /// Read a UTF-8 file
    pub async fn read_file(&self, path: &Path) -> Result<String> {
        let resolved = self.resolve(path).await?;
        debug!(path = %resolved.display(), "Reading file");
        tokio::fs::read_to_string(&resolved)
            .await
            .map_err(|e| map_io(path, e))
    }

    /// Recursive listing of `dir`, entries sorted by name at every level
    pub async fn read_tree(&self, dir: &Path) -> Result<Vec<FileNode>> {
        let resolved = self.resolve(dir).await?;
        let metadata = tokio::fs::metadata(&resolved)
            .await
            .map_err(|e| map_io(dir, e))?;
        if !metadata.is_dir() {
            return Err(Error::Input(format!(
                "Path is not a directory: {}",
                dir.display()
            )));
        }

        let nodes = tokio::task::spawn_blocking(move || walk(&resolved))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))?
            .map_err(|e| map_io(dir, e))?;
        Ok(nodes)
    }

    /// Concatenate the selected files into delimited blocks
    ///
    /// A file that cannot be read is inlined as an error line instead of
    /// failing the whole selection.
    pub async fn concatenate(&self, paths: &[PathBuf]) -> Result<String> {
        if paths.is_empty() {
            return Err(Error::Input("Please select at least one file".to_string()));
        }

        let mut blocks = Vec::with_capacity(paths.len());
        for path in paths {
            let label = path.display().to_string();
            let content = match self.read_file(path).await {
                Ok(content) => content,
                Err(e) => {
                    warn!(path = %label, error = %e, "Failed to load file for concatenation");
                    format!("// Error loading content for {}: {}", label, e)
                }
            };
            blocks.push(file_block(&label, &content));
        }

        debug!(files = paths.len(), "Concatenated files");
        Ok(blocks.join("\n\n"))
    }
}
