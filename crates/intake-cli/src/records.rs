//! Local collaborators for offline runs
//!
//! Records are kept as one JSON file per entity under a data directory:
//! `cases/<id>.json`, `tasks/<id>.json`, `documents/<id>.json`.

use chrono::Utc;
use intake_automation::{CaseRepository, CompletionRequest, TaskUpdate, TextGenerator};
use intake_core::{Case, CaseId, CoreError, CoreResult, Document, DocumentId, Task, TaskId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

const CASES: &str = "cases";
const TASKS: &str = "tasks";
const DOCUMENTS: &str = "documents";

/// Repository persisting records as JSON files
#[derive(Debug)]
pub(crate) struct JsonRepository {
    root: PathBuf,
    // serializes read-modify-write cycles within this process
    writes: Mutex<()>,
}

impl JsonRepository {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            writes: Mutex::new(()),
        }
    }

    fn file(&self, kind: &str, id: &impl ToString) -> PathBuf {
        self.root.join(kind).join(format!("{}.json", id.to_string()))
    }

    async fn read<T: DeserializeOwned>(&self, path: &Path) -> CoreResult<Option<T>> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(database_error(path, &e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| CoreError::collaborator("database", format!("{}: {e}", path.display())))
    }

    async fn write<T: Serialize>(&self, path: &Path, value: &T) -> CoreResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| database_error(parent, &e))?;
        }
        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|e| CoreError::collaborator("database", e.to_string()))?;
        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| database_error(path, &e))
    }

    async fn read_all<T: DeserializeOwned>(&self, kind: &str) -> CoreResult<Vec<T>> {
        let dir = self.root.join(kind);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(database_error(&dir, &e)),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| database_error(&dir, &e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(record) = self.read(&path).await? {
                    records.push(record);
                }
            }
        }
        Ok(records)
    }
}

fn database_error(path: &Path, e: &std::io::Error) -> CoreError {
    CoreError::collaborator("database", format!("{}: {e}", path.display()))
}

#[async_trait::async_trait]
impl CaseRepository for JsonRepository {
    async fn create_case(&self, case: Case) -> CoreResult<Case> {
        self.write(&self.file(CASES, &case.id), &case).await?;
        Ok(case)
    }

    async fn get_case(&self, id: CaseId) -> CoreResult<Option<Case>> {
        self.read(&self.file(CASES, &id)).await
    }

    async fn create_tasks(&self, tasks: Vec<Task>) -> CoreResult<Vec<Task>> {
        for task in &tasks {
            self.write(&self.file(TASKS, &task.id), task).await?;
        }
        Ok(tasks)
    }

    async fn get_task(&self, id: TaskId) -> CoreResult<Option<Task>> {
        self.read(&self.file(TASKS, &id)).await
    }

    async fn list_tasks(&self, case_id: CaseId) -> CoreResult<Vec<Task>> {
        let mut tasks: Vec<Task> = self.read_all(TASKS).await?;
        tasks.retain(|t| t.case_id == case_id);
        tasks.sort_by_key(|t| t.created_at);
        Ok(tasks)
    }

    async fn update_task(&self, update: TaskUpdate) -> CoreResult<Task> {
        let _guard = self.writes.lock().await;
        let path = self.file(TASKS, &update.task_id);
        let mut task: Task = self
            .read(&path)
            .await?
            .ok_or_else(|| CoreError::not_found("task", update.task_id))?;
        if task.revision != update.expected_revision {
            return Err(CoreError::Conflict(format!(
                "task {} is at revision {}, expected {}",
                update.task_id, task.revision, update.expected_revision
            )));
        }
        update.apply_to(&mut task);
        self.write(&path, &task).await?;
        Ok(task)
    }

    async fn create_document(&self, document: Document) -> CoreResult<Document> {
        self.write(&self.file(DOCUMENTS, &document.id), &document)
            .await?;
        Ok(document)
    }

    async fn get_document(&self, id: DocumentId) -> CoreResult<Option<Document>> {
        self.read(&self.file(DOCUMENTS, &id)).await
    }

    async fn list_documents(&self, case_id: CaseId) -> CoreResult<Vec<Document>> {
        let mut documents: Vec<Document> = self.read_all(DOCUMENTS).await?;
        documents.retain(|d| d.case_id == case_id);
        documents.sort_by_key(|d| d.created_at);
        Ok(documents)
    }

    async fn touch_document(&self, id: DocumentId) -> CoreResult<Document> {
        let _guard = self.writes.lock().await;
        let path = self.file(DOCUMENTS, &id);
        let mut document: Document = self
            .read(&path)
            .await?
            .ok_or_else(|| CoreError::not_found("document", id))?;
        document.updated_at = Utc::now();
        self.write(&path, &document).await?;
        Ok(document)
    }
}

/// Text generator for runs without a model provider
///
/// Every completion fails as unavailable, so suggestion automations
/// report 503 while email drafts and documents still work.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct OfflineTextGenerator;

#[async_trait::async_trait]
impl TextGenerator for OfflineTextGenerator {
    async fn complete(&self, _request: CompletionRequest) -> CoreResult<String> {
        Err(CoreError::Unavailable("text generator"))
    }
}
