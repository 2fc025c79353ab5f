use dashmap::DashMap;
use intake_automation::{
    CaseRepository, CompletionRequest, Mailer, ObjectStore, OutgoingEmail, TaskUpdate,
    TextGenerator,
};
use intake_core::{Case, CaseId, CoreError, CoreResult, Document, DocumentId, Task, TaskId};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Repository backed by concurrent maps
///
/// Task updates honor the revision check under the entry lock, so
/// concurrent writers observe `Conflict` the way a real store would.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    cases: DashMap<CaseId, Case>,
    tasks: DashMap<TaskId, Task>,
    documents: DashMap<DocumentId, Document>,
    fail_task_creation: Mutex<bool>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `create_tasks` call fail
    pub fn fail_task_creation(&self) {
        *self.fail_task_creation.lock() = true;
    }

    pub fn insert_case(&self, case: Case) {
        self.cases.insert(case.id, case);
    }

    pub fn insert_task(&self, task: Task) {
        self.tasks.insert(task.id, task);
    }

    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<Task> {
        self.tasks.get(&id).map(|t| t.value().clone())
    }

    #[must_use]
    pub fn document(&self, id: DocumentId) -> Option<Document> {
        self.documents.get(&id).map(|d| d.value().clone())
    }

    #[must_use]
    pub fn case_count(&self) -> usize {
        self.cases.len()
    }

    #[must_use]
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }
}

#[async_trait::async_trait]
impl CaseRepository for InMemoryRepository {
    async fn create_case(&self, case: Case) -> CoreResult<Case> {
        self.cases.insert(case.id, case.clone());
        Ok(case)
    }

    async fn get_case(&self, id: CaseId) -> CoreResult<Option<Case>> {
        Ok(self.cases.get(&id).map(|c| c.value().clone()))
    }

    async fn create_tasks(&self, tasks: Vec<Task>) -> CoreResult<Vec<Task>> {
        if *self.fail_task_creation.lock() {
            return Err(CoreError::collaborator("database", "task insert rejected"));
        }
        for task in &tasks {
            self.tasks.insert(task.id, task.clone());
        }
        Ok(tasks)
    }

    async fn get_task(&self, id: TaskId) -> CoreResult<Option<Task>> {
        Ok(self.task(id))
    }

    async fn list_tasks(&self, case_id: CaseId) -> CoreResult<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| t.case_id == case_id)
            .map(|t| t.value().clone())
            .collect();
        tasks.sort_by_key(|t| t.created_at);
        Ok(tasks)
    }

    async fn update_task(&self, update: TaskUpdate) -> CoreResult<Task> {
        let mut entry = self
            .tasks
            .get_mut(&update.task_id)
            .ok_or_else(|| CoreError::not_found("task", update.task_id))?;
        if entry.revision != update.expected_revision {
            return Err(CoreError::Conflict(format!(
                "task {} is at revision {}, expected {}",
                update.task_id, entry.revision, update.expected_revision
            )));
        }
        update.apply_to(&mut *entry);
        Ok(entry.value().clone())
    }

    async fn create_document(&self, document: Document) -> CoreResult<Document> {
        self.documents.insert(document.id, document.clone());
        Ok(document)
    }

    async fn get_document(&self, id: DocumentId) -> CoreResult<Option<Document>> {
        Ok(self.document(id))
    }

    async fn list_documents(&self, case_id: CaseId) -> CoreResult<Vec<Document>> {
        let mut documents: Vec<Document> = self
            .documents
            .iter()
            .filter(|d| d.case_id == case_id)
            .map(|d| d.value().clone())
            .collect();
        documents.sort_by(|a, b| a.document_type.cmp(&b.document_type));
        Ok(documents)
    }

    async fn touch_document(&self, id: DocumentId) -> CoreResult<Document> {
        let mut entry = self
            .documents
            .get_mut(&id)
            .ok_or_else(|| CoreError::not_found("document", id))?;
        entry.updated_at = chrono::Utc::now();
        Ok(entry.value().clone())
    }
}

/// Object store keeping bytes in memory
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: DashMap<String, Vec<u8>>,
    puts: AtomicUsize,
    fail_paths_containing: Mutex<Option<String>>,
}

impl MemoryObjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes whose path contains `fragment`
    pub fn fail_paths_containing(&self, fragment: impl Into<String>) {
        *self.fail_paths_containing.lock() = Some(fragment.into());
    }

    #[must_use]
    pub fn object(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.get(path).map(|o| o.value().clone())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of successful writes, overwrites included
    #[must_use]
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, path: &str, bytes: Vec<u8>, _content_type: &str) -> CoreResult<String> {
        if let Some(fragment) = self.fail_paths_containing.lock().as_deref() {
            if path.contains(fragment) {
                return Err(CoreError::collaborator("storage", format!("write refused: {path}")));
            }
        }
        self.objects.insert(path.to_string(), bytes);
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(path.to_string())
    }

    async fn get(&self, path: &str) -> CoreResult<Vec<u8>> {
        self.object(path)
            .ok_or_else(|| CoreError::not_found("stored object", path))
    }

    async fn remove(&self, paths: Vec<String>) -> CoreResult<()> {
        for path in paths {
            self.objects.remove(&path);
        }
        Ok(())
    }
}

/// Mailer that records instead of sending
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().clone()
    }
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> CoreResult<String> {
        let mut sent = self.sent.lock();
        sent.push(email);
        Ok(format!("message-{}", sent.len()))
    }
}

/// Text generator replaying scripted completions
///
/// Queued responses are served first; afterwards every call returns the
/// default response.
#[derive(Debug)]
pub struct ScriptedTextGenerator {
    queued: Mutex<VecDeque<CoreResult<String>>>,
    default: String,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedTextGenerator {
    /// Generator answering every prompt with `response`
    #[must_use]
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            default: response.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Serve `response` before falling back to the default
    #[must_use]
    pub fn then(self, response: CoreResult<String>) -> Self {
        self.queued.lock().push_back(response);
        self
    }

    /// Prompts received so far
    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }
}

impl Default for ScriptedTextGenerator {
    fn default() -> Self {
        Self::new("- Review the police report\n- Confirm treating physicians")
    }
}

#[async_trait::async_trait]
impl TextGenerator for ScriptedTextGenerator {
    async fn complete(&self, request: CompletionRequest) -> CoreResult<String> {
        self.requests.lock().push(request);
        let queued = self.queued.lock().pop_front();
        queued.unwrap_or_else(|| Ok(self.default.clone()))
    }
}
