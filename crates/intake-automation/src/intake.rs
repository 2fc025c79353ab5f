//! Case onboarding
//!
//! Persists a new case, seeds its tasks from the resolved checklists and
//! generates its initial documents. Only case creation can fail the intake;
//! checklist and document failures are logged and reported in the
//! [`IntakeReport`].

use crate::collaborators::CaseRepository;
use crate::documents::DocumentService;
use crate::error::PipelineResult;
use crate::rules::{descriptor_for, AutomationRule};
use intake_core::{Case, Document, NewCase, Task};
use intake_templates::{dedup_seeds, parse_checklist, TaskSeed, TemplateCatalog, TemplateResolver};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Intake step a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStage {
    Checklist,
    Tasks,
    Document,
}

/// Non-fatal failure during intake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeFailure {
    pub stage: IntakeStage,
    pub template: Option<String>,
    pub message: String,
}

/// What an intake produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeReport {
    pub case: Case,
    pub tasks: Vec<Task>,
    pub documents: Vec<Document>,
    pub failures: Vec<IntakeFailure>,
}

impl IntakeReport {
    /// True when every checklist and document succeeded
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Onboards new cases
pub struct IntakeService {
    repository: Arc<dyn CaseRepository>,
    catalog: Arc<dyn TemplateCatalog>,
    documents: Arc<DocumentService>,
    document_resolver: TemplateResolver,
    checklist_resolver: TemplateResolver,
    rules: Vec<AutomationRule>,
}

impl std::fmt::Debug for IntakeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntakeService")
            .field("catalog", &self.catalog.name())
            .field("document_resolver", &self.document_resolver)
            .field("checklist_resolver", &self.checklist_resolver)
            .field("rules", &self.rules.len())
            .finish_non_exhaustive()
    }
}

impl IntakeService {
    /// Create service
    #[must_use]
    pub fn new(
        repository: Arc<dyn CaseRepository>,
        catalog: Arc<dyn TemplateCatalog>,
        documents: Arc<DocumentService>,
        document_resolver: TemplateResolver,
        checklist_resolver: TemplateResolver,
    ) -> Self {
        Self {
            repository,
            catalog,
            documents,
            document_resolver,
            checklist_resolver,
            rules: Vec::new(),
        }
    }

    /// With automation rules applied to seeded tasks
    #[inline]
    #[must_use]
    pub fn with_rules(mut self, rules: Vec<AutomationRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Onboard a new case
    ///
    /// # Errors
    /// - `CoreError::Validation` if required fields are missing
    /// - `CoreError::Collaborator` if the case cannot be stored
    pub async fn onboard(&self, new_case: NewCase) -> PipelineResult<IntakeReport> {
        let case = self.repository.create_case(Case::from_new(new_case)?).await?;
        let category = case.case_category();
        let quality = case.quality_tier();
        tracing::info!(
            case_id = %case.id,
            category = %case.category,
            quality = %case.verbal_quality,
            "onboarding case"
        );

        let mut failures = Vec::new();

        let tasks = self
            .seed_tasks(&case, self.checklist_resolver.resolve(category, quality), &mut failures)
            .await;

        let templates = self.document_resolver.resolve(category, quality);
        let results = futures::future::join_all(
            templates
                .iter()
                .map(|template| self.documents.generate(&case, template)),
        )
        .await;

        let mut documents = Vec::with_capacity(results.len());
        for (template, result) in templates.into_iter().zip(results) {
            match result {
                Ok(generated) => documents.push(generated.document),
                Err(e) => {
                    tracing::error!(case_id = %case.id, template = %template, error = %e, "document generation failed");
                    failures.push(IntakeFailure {
                        stage: IntakeStage::Document,
                        template: Some(template),
                        message: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            case_id = %case.id,
            tasks = tasks.len(),
            documents = documents.len(),
            failures = failures.len(),
            "case onboarded"
        );
        Ok(IntakeReport {
            case,
            tasks,
            documents,
            failures,
        })
    }

    async fn seed_tasks(
        &self,
        case: &Case,
        checklists: Vec<String>,
        failures: &mut Vec<IntakeFailure>,
    ) -> Vec<Task> {
        let mut seeds: Vec<TaskSeed> = Vec::new();
        for checklist in checklists {
            match self.catalog.load(&checklist).await {
                Ok(source) => seeds.extend(parse_checklist(&source)),
                Err(e) => {
                    tracing::warn!(case_id = %case.id, checklist = %checklist, error = %e, "checklist unavailable");
                    failures.push(IntakeFailure {
                        stage: IntakeStage::Checklist,
                        template: Some(checklist),
                        message: e.to_string(),
                    });
                }
            }
        }

        let tasks: Vec<Task> = dedup_seeds(seeds)
            .into_iter()
            .map(|seed| self.task_from(case, seed))
            .collect();
        if tasks.is_empty() {
            return tasks;
        }

        match self.repository.create_tasks(tasks).await {
            Ok(created) => created,
            Err(e) => {
                tracing::error!(case_id = %case.id, error = %e, "task creation failed");
                failures.push(IntakeFailure {
                    stage: IntakeStage::Tasks,
                    template: None,
                    message: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    fn task_from(&self, case: &Case, seed: TaskSeed) -> Task {
        let task = Task::new(case.id, seed.description).with_due_date(seed.due_date);
        match descriptor_for(&self.rules, &task.description) {
            Some(descriptor) => task.with_automation(descriptor),
            None => task,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{MockCaseRepository, MockObjectStore};
    use crate::rules::builtin_rules;
    use intake_compose::{Compositor, Letterhead};
    use intake_core::{AutomationKind, CoreError, FirmProfile, TaskStatus};
    use intake_templates::{EmbeddedCatalog, TemplateRenderer, TierTable};

    fn service(repository: MockCaseRepository, store: MockObjectStore, catalog: EmbeddedCatalog) -> IntakeService {
        let repository: Arc<dyn CaseRepository> = Arc::new(repository);
        let catalog: Arc<dyn TemplateCatalog> = Arc::new(catalog);
        let documents = Arc::new(DocumentService::new(
            Arc::clone(&repository),
            Arc::new(store),
            Arc::new(TemplateRenderer::new(Arc::clone(&catalog), FirmProfile::default())),
            Compositor::default(),
            Arc::new(Letterhead::generated("Firm", 1).unwrap()),
        ));
        IntakeService::new(
            repository,
            catalog,
            documents,
            TemplateResolver::new(TierTable::documents()),
            TemplateResolver::new(TierTable::checklists()),
        )
        .with_rules(builtin_rules())
    }

    #[tokio::test]
    async fn invalid_case_touches_nothing() {
        let mut repository = MockCaseRepository::new();
        repository.expect_create_case().never();

        let err = service(repository, MockObjectStore::new(), EmbeddedCatalog::new())
            .onboard(NewCase::new("", "not-an-email", "MVA", "Good"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn unknown_category_gets_generic_tasks_with_rules() {
        let mut repository = MockCaseRepository::new();
        repository.expect_create_case().returning(Ok);
        repository
            .expect_create_tasks()
            .times(1)
            .returning(Ok);
        repository.expect_create_document().returning(Ok);

        let mut store = MockObjectStore::new();
        store.expect_put().returning(|path, _, _| Ok(path.to_string()));

        let report = service(repository, store, EmbeddedCatalog::new())
            .onboard(NewCase::new("Jane Roe", "jane@example.com", "Maritime", "N/A"))
            .await
            .unwrap();

        let descriptions: Vec<&str> = report.tasks.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec![
                "Send letter of representation",
                "Collect signed retainer agreement",
                "Client follow-up",
                "Research statute of limitations",
            ]
        );
        assert!(report.tasks.iter().all(|t| t.status == TaskStatus::Pending));
        assert_eq!(
            report.tasks[0].automation.as_ref().map(|a| a.kind),
            Some(AutomationKind::DocumentGeneration)
        );
        assert!(report.tasks[1].automation.is_none());
        assert_eq!(report.documents.len(), 1);
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn task_store_failure_is_reported_not_fatal() {
        let mut repository = MockCaseRepository::new();
        repository.expect_create_case().returning(Ok);
        repository
            .expect_create_tasks()
            .returning(|_| Err(CoreError::collaborator("database", "write failed")));
        repository.expect_create_document().returning(Ok);

        let mut store = MockObjectStore::new();
        store.expect_put().returning(|path, _, _| Ok(path.to_string()));

        let report = service(repository, store, EmbeddedCatalog::new())
            .onboard(NewCase::new("Jane Roe", "jane@example.com", "Other", "Average"))
            .await
            .unwrap();
        assert!(report.tasks.is_empty());
        assert_eq!(report.documents.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].stage, IntakeStage::Tasks);
    }
}
