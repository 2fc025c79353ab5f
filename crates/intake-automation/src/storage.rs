//! Storage paths and the filesystem object store

use crate::collaborators::ObjectStore;
use intake_core::{CaseId, CoreError, CoreResult};
use std::path::{Component, Path, PathBuf};

/// Object path for a generated document
///
/// `client_<case id>/<sanitized type>_<unix millis>.pdf`; characters
/// outside `[A-Za-z0-9._-]` in the type become `_`.
#[must_use]
pub fn document_path(case_id: CaseId, document_type: &str, unix_millis: i64) -> String {
    let sanitized: String = document_type
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("client_{case_id}/{sanitized}_{unix_millis}.pdf")
}

/// Object store rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// Create store under `root`; directories are created on write
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> CoreResult<PathBuf> {
        let relative = Path::new(path);
        let clean = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(CoreError::Validation(format!("invalid storage path: {path}")));
        }
        Ok(self.root.join(relative))
    }
}

fn storage_error(path: &Path, e: &std::io::Error) -> CoreError {
    CoreError::collaborator("storage", format!("{}: {e}", path.display()))
}

#[async_trait::async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> CoreResult<String> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error(parent, &e))?;
        }
        let size = bytes.len();
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| storage_error(&target, &e))?;
        tracing::debug!(path, content_type, bytes = size, "stored object");
        Ok(path.to_string())
    }

    async fn get(&self, path: &str) -> CoreResult<Vec<u8>> {
        let target = self.resolve(path)?;
        tokio::fs::read(&target).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::not_found("stored object", path)
            } else {
                storage_error(&target, &e)
            }
        })
    }

    async fn remove(&self, paths: Vec<String>) -> CoreResult<()> {
        for path in paths {
            let target = self.resolve(&path)?;
            match tokio::fs::remove_file(&target).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(storage_error(&target, &e)),
            }
        }
        Ok(())
    }
}
