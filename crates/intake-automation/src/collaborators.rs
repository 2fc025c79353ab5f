//! External collaborators
//!
//! Persistence, object storage, mail delivery and text generation are
//! injected as trait objects. Implementations map their own failures onto
//! [`CoreError`](intake_core::CoreError), usually `Collaborator`.

use crate::prompts::CompletionRequest;
use intake_core::{Case, CaseId, CoreResult, Document, DocumentId, Task, TaskId, TaskStatus};
use serde::{Deserialize, Serialize};

/// Conditional task write
///
/// Applied only while the stored task still has `expected_revision`;
/// otherwise the repository returns `CoreError::Conflict` and leaves the
/// task untouched. Fields left `None` keep their stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub task_id: TaskId,
    pub expected_revision: u64,
    pub status: Option<TaskStatus>,
    pub notes: Option<String>,
}

impl TaskUpdate {
    /// Update guarded by the revision `task` was read at
    #[must_use]
    pub fn for_task(task: &Task) -> Self {
        Self {
            task_id: task.id,
            expected_revision: task.revision,
            status: None,
            notes: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    /// Apply to a task that passed the revision check
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(notes) = &self.notes {
            task.notes = Some(notes.clone());
        }
        task.revision += 1;
        task.updated_at = chrono::Utc::now();
    }
}

/// File attached to an outgoing email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Email handed to a [`Mailer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub attachments: Vec<Attachment>,
}

/// Case, task and document records
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CaseRepository: Send + Sync {
    async fn create_case(&self, case: Case) -> CoreResult<Case>;

    async fn get_case(&self, id: CaseId) -> CoreResult<Option<Case>>;

    async fn create_tasks(&self, tasks: Vec<Task>) -> CoreResult<Vec<Task>>;

    async fn get_task(&self, id: TaskId) -> CoreResult<Option<Task>>;

    async fn list_tasks(&self, case_id: CaseId) -> CoreResult<Vec<Task>>;

    /// Conditional update, see [`TaskUpdate`]
    async fn update_task(&self, update: TaskUpdate) -> CoreResult<Task>;

    async fn create_document(&self, document: Document) -> CoreResult<Document>;

    async fn get_document(&self, id: DocumentId) -> CoreResult<Option<Document>>;

    async fn list_documents(&self, case_id: CaseId) -> CoreResult<Vec<Document>>;

    /// Bump `updated_at` after the stored object was overwritten
    async fn touch_document(&self, id: DocumentId) -> CoreResult<Document>;
}

/// Blob storage for generated documents
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store (or overwrite) `path`, returning the stored path
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> CoreResult<String>;

    async fn get(&self, path: &str) -> CoreResult<Vec<u8>>;

    async fn remove(&self, paths: Vec<String>) -> CoreResult<()>;
}

/// Outbound mail delivery
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    /// Send and return the provider's message id
    async fn send(&self, email: OutgoingEmail) -> CoreResult<String>;
}

/// Language-model completions
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> CoreResult<String>;
}
