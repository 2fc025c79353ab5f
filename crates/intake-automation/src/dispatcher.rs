//! Task automation dispatch
//!
//! One invocation validates the request against the stored task and case,
//! runs the automation for the task's kind, then commits notes and status in
//! a single conditional update. Validation failures have no side effects;
//! the status write is always last.

use crate::collaborators::{CaseRepository, Mailer, OutgoingEmail, TaskUpdate, TextGenerator};
use crate::documents::DocumentService;
use crate::email::{self, EmailDraft};
use crate::error::{PipelineError, PipelineResult};
use crate::prompts::{self, CompletionRequest};
use intake_core::{
    AutomationKind, AutomationPlan, Case, CaseId, ConsultVariant, CoreError, DocumentId,
    EmailTemplate, SuggestionTopic, Task, TaskId, TaskStatus,
};
use intake_templates::TemplateRenderer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Template drafted for an initial consultation
pub const CONSULT_TEMPLATE: &str = "initial-consult-email";
/// Template drafted for a witness interview
pub const WITNESS_TEMPLATE: &str = "interview-witness";

const CONSULT_RECIPIENT: &str = "[Enter Email Here]";
const GENERIC_FALLBACK: &str = "Review client file and proceed.";

/// Request to run a task's automation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationRequest {
    pub task_id: TaskId,
    #[serde(alias = "clientId")]
    pub case_id: CaseId,
    #[serde(alias = "automationType")]
    pub kind: AutomationKind,
    #[serde(default, alias = "automationConfig")]
    pub config: Option<String>,
}

impl AutomationRequest {
    /// Request mirroring the task's own descriptor
    ///
    /// # Errors
    /// `CoreError::Validation` if the task has no automation
    pub fn for_task(task: &Task) -> Result<Self, CoreError> {
        let automation = task
            .automation
            .as_ref()
            .ok_or_else(|| CoreError::Validation("task has no automation".to_string()))?;
        Ok(Self {
            task_id: task.id,
            case_id: task.case_id,
            kind: automation.kind,
            config: automation.config.clone(),
        })
    }
}

/// Generated document reference in an outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub status: String,
    pub template: String,
    pub file_path: String,
    pub document_id: DocumentId,
}

/// Result payload of a successful automation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationOutcome {
    pub success: bool,
    pub message: String,
    pub action: AutomationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<EmailDraft>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mailto_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_info: Option<DocumentInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_markdown: Option<String>,
    /// Task as committed
    pub task: Task,
}

/// Payload plus the pending task write
struct Effect {
    message: String,
    draft: Option<EmailDraft>,
    suggestions: Option<Vec<String>>,
    mailto_link: Option<String>,
    document_info: Option<DocumentInfo>,
    generated_markdown: Option<String>,
    status: TaskStatus,
    notes: Option<String>,
}

impl Effect {
    fn completed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            draft: None,
            suggestions: None,
            mailto_link: None,
            document_info: None,
            generated_markdown: None,
            status: TaskStatus::Completed,
            notes: None,
        }
    }
}

/// Dispatcher settings
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchSettings {
    pub from_address: String,
    pub model: String,
    pub generic_model: String,
    pub timeout: Duration,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            from_address: "onboarding@localhost".to_string(),
            model: "gpt-4o".to_string(),
            generic_model: "gpt-3.5-turbo".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Runs task automations
pub struct AutomationDispatcher {
    repository: Arc<dyn CaseRepository>,
    renderer: Arc<TemplateRenderer>,
    documents: Arc<DocumentService>,
    text: Arc<dyn TextGenerator>,
    mailer: Option<Arc<dyn Mailer>>,
    settings: DispatchSettings,
}

impl std::fmt::Debug for AutomationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutomationDispatcher")
            .field("renderer", &self.renderer)
            .field("mailer", &self.mailer.is_some())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl AutomationDispatcher {
    /// Create dispatcher without a mailer
    #[must_use]
    pub fn new(
        repository: Arc<dyn CaseRepository>,
        renderer: Arc<TemplateRenderer>,
        documents: Arc<DocumentService>,
        text: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            repository,
            renderer,
            documents,
            text,
            mailer: None,
            settings: DispatchSettings::default(),
        }
    }

    /// With mail delivery; email drafts are then sent instead of linked
    #[inline]
    #[must_use]
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_settings(mut self, settings: DispatchSettings) -> Self {
        self.settings = settings;
        self
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Run the automation described by `request`
    ///
    /// # Errors
    /// - 404: task or case missing
    /// - 403: task belongs to another case
    /// - 400: kind differs from the stored one, or config is unusable
    /// - 409: the task changed while the automation ran
    /// - 500: a collaborator failed
    /// - 504: the invocation exceeded the configured timeout
    pub async fn dispatch(&self, request: AutomationRequest) -> PipelineResult<AutomationOutcome> {
        let AutomationRequest {
            task_id,
            case_id,
            kind,
            ..
        } = request;
        tracing::info!(%task_id, %case_id, %kind, "dispatching automation");

        let result = match tokio::time::timeout(self.settings.timeout, self.run(request)).await {
            Ok(result) => result,
            Err(_) => Err(PipelineError::Timeout {
                duration_secs: self.settings.timeout.as_secs(),
            }),
        };

        match &result {
            Ok(outcome) => {
                tracing::info!(%task_id, %case_id, %kind, status = %outcome.task.status, "automation completed");
            }
            Err(e) => {
                tracing::error!(%task_id, %case_id, %kind, status_code = e.status_code(), error = %e, "automation failed");
            }
        }
        result
    }

    async fn run(&self, request: AutomationRequest) -> PipelineResult<AutomationOutcome> {
        let (task, case) = tokio::try_join!(
            self.repository.get_task(request.task_id),
            self.repository.get_case(request.case_id),
        )?;
        let task = task.ok_or_else(|| CoreError::not_found("task", request.task_id))?;
        let case = case.ok_or_else(|| CoreError::not_found("case", request.case_id))?;

        if task.case_id != case.id {
            return Err(CoreError::Forbidden(
                "Task does not belong to the specified client".to_string(),
            )
            .into());
        }
        if task.automation.as_ref().map(|a| a.kind) != Some(request.kind) {
            return Err(CoreError::Validation(
                "Mismatched automation type for the task".to_string(),
            )
            .into());
        }

        let plan = AutomationPlan::from_request(request.kind, request.config.as_deref())?;
        tracing::debug!(task_id = %task.id, ?plan, "resolved automation plan");

        let effect = match plan {
            AutomationPlan::InitialConsult(variant) => self.consult(variant, &task, &case).await?,
            AutomationPlan::EmailDraft(template) => self.email(template, &task, &case).await?,
            AutomationPlan::AiSuggestion(topic) => self.suggest(topic, &task, &case).await?,
            AutomationPlan::DocumentGeneration(template) => self.document(&template, &case).await?,
        };

        let update = TaskUpdate::for_task(&task)
            .with_status(effect.status)
            .with_notes(effect.notes);
        let committed = self.repository.update_task(update).await?;

        Ok(AutomationOutcome {
            success: true,
            message: effect.message,
            action: request.kind,
            draft: effect.draft,
            suggestions: effect.suggestions,
            mailto_link: effect.mailto_link,
            document_info: effect.document_info,
            generated_markdown: effect.generated_markdown,
            task: committed,
        })
    }

    async fn ask(&self, request: CompletionRequest) -> PipelineResult<Vec<String>> {
        let request = request.with_model(self.settings.model.clone());
        let text = self.text.complete(request).await?;
        Ok(prompts::parse_suggestions(&text)?)
    }

    async fn consult(&self, variant: ConsultVariant, task: &Task, case: &Case) -> PipelineResult<Effect> {
        let jurisdiction = &self.renderer.firm().jurisdiction;
        let (template, subject, request) = match variant {
            ConsultVariant::Consult => (
                CONSULT_TEMPLATE,
                format!("Initial Consultation Request - {}", case.name),
                prompts::consult_questions(&prompts::consult_context(case), jurisdiction),
            ),
            ConsultVariant::WitnessInterviewPrep => (
                WITNESS_TEMPLATE,
                format!("Witness Interview Request - {} Case", case.name),
                prompts::witness_questions(case, jurisdiction),
            ),
        };

        let suggestions = self.ask(request).await?;
        let body = self.renderer.render(template, case).await?;

        let (message, notes) = match variant {
            ConsultVariant::Consult => (
                "Initial consult email drafted and suggestions generated.",
                None,
            ),
            ConsultVariant::WitnessInterviewPrep => {
                let entry = format!(
                    "--- AI Suggested Witness Questions --- \n{}",
                    suggestions.join("\n")
                );
                (
                    "Witness interview email drafted and questions generated.",
                    Some(task.notes_with(&entry, "\n\n")),
                )
            }
        };

        Ok(Effect {
            draft: Some(EmailDraft {
                to: CONSULT_RECIPIENT.to_string(),
                subject,
                body,
            }),
            suggestions: Some(suggestions),
            notes,
            ..Effect::completed(message)
        })
    }

    async fn email(&self, template: EmailTemplate, task: &Task, case: &Case) -> PipelineResult<Effect> {
        let firm = self.renderer.firm();
        let draft = email::follow_up(template, task, case, firm);

        let (status, mailto_link, message) = match &self.mailer {
            Some(mailer) => {
                let message_id = mailer
                    .send(OutgoingEmail {
                        from: self.settings.from_address.clone(),
                        to: draft.to.clone(),
                        subject: draft.subject.clone(),
                        html_body: email::html_body(firm, &draft.body),
                        attachments: Vec::new(),
                    })
                    .await?;
                tracing::debug!(task_id = %task.id, message_id = %message_id, "follow-up email sent");
                (TaskStatus::Completed, None, "Email sent to client.".to_string())
            }
            None => (
                TaskStatus::AwaitingUserAction,
                Some(email::mailto_link(&draft)),
                "Email draft ready. Click link to open in your mail client.".to_string(),
            ),
        };

        let log = format!(
            "[{}] {}",
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            email::log_line(template, self.mailer.is_some())
        );

        Ok(Effect {
            draft: Some(draft),
            mailto_link,
            status,
            notes: Some(task.notes_with(&log, "\n")),
            ..Effect::completed(message)
        })
    }

    async fn suggest(&self, topic: SuggestionTopic, task: &Task, case: &Case) -> PipelineResult<Effect> {
        let jurisdiction = &self.renderer.firm().jurisdiction;
        let (suggestions, message) = match topic {
            SuggestionTopic::LegalResearch => (
                self.ask(prompts::legal_research(case, jurisdiction)).await?,
                "Legal research suggestions generated.",
            ),
            SuggestionTopic::CaseLawResearch => (
                self.ask(prompts::consult_questions(
                    &prompts::similar_case_context(case),
                    jurisdiction,
                ))
                .await?,
                "Similar case suggestions generated.",
            ),
            SuggestionTopic::EvidenceChecklist => (
                self.ask(prompts::evidence_checklist(case, jurisdiction)).await?,
                "Evidence checklist generated.",
            ),
            SuggestionTopic::Generic => {
                let request = prompts::generic_suggestion(task, case)
                    .with_model(self.settings.generic_model.clone());
                let text = self.text.complete(request).await?;
                let mut items = prompts::split_suggestions(&text);
                if items.is_empty() {
                    items.push(GENERIC_FALLBACK.to_string());
                }
                (items, "Generic suggestion generated.")
            }
        };

        Ok(Effect {
            suggestions: Some(suggestions),
            ..Effect::completed(message)
        })
    }

    async fn document(&self, template: &str, case: &Case) -> PipelineResult<Effect> {
        let generated = self.documents.generate(case, template).await?;
        Ok(Effect {
            document_info: Some(DocumentInfo {
                status: "Generated".to_string(),
                template: template.to_string(),
                file_path: generated.document.storage_path.clone(),
                document_id: generated.document.id,
            }),
            generated_markdown: Some(generated.markdown),
            ..Effect::completed(format!("Document '{template}' generated successfully."))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{
        MockCaseRepository, MockMailer, MockObjectStore, MockTextGenerator,
    };
    use intake_compose::{Compositor, Letterhead};
    use intake_core::{AutomationDescriptor, FirmProfile, NewCase};
    use intake_templates::EmbeddedCatalog;

    fn case() -> Case {
        Case::from_new(
            NewCase::new("Jane Roe", "jane@example.com", "MVA", "Good")
                .with_injury_details("Whiplash after a rear-end collision"),
        )
        .unwrap()
    }

    fn task_for(case: &Case, kind: AutomationKind, config: Option<&str>) -> Task {
        Task::new(case.id, "Automated task")
            .with_automation(AutomationDescriptor::new(kind, config.map(ToString::to_string)))
    }

    fn repository_with(case: &Case, task: &Task) -> MockCaseRepository {
        let mut repository = MockCaseRepository::new();
        let stored_task = task.clone();
        repository
            .expect_get_task()
            .returning(move |_| Ok(Some(stored_task.clone())));
        let stored_case = case.clone();
        repository
            .expect_get_case()
            .returning(move |_| Ok(Some(stored_case.clone())));
        repository
    }

    fn expect_commit(repository: &mut MockCaseRepository, task: &Task) {
        let mut stored = task.clone();
        repository
            .expect_update_task()
            .times(1)
            .returning(move |update| {
                update.apply_to(&mut stored);
                Ok(stored.clone())
            });
    }

    fn dispatcher(repository: MockCaseRepository, text: MockTextGenerator) -> AutomationDispatcher {
        let repository: Arc<dyn CaseRepository> = Arc::new(repository);
        let renderer = Arc::new(TemplateRenderer::new(
            Arc::new(EmbeddedCatalog::new()),
            FirmProfile::default(),
        ));
        let documents = Arc::new(DocumentService::new(
            Arc::clone(&repository),
            Arc::new(MockObjectStore::new()),
            Arc::clone(&renderer),
            Compositor::default(),
            Arc::new(Letterhead::generated("Firm", 1).unwrap()),
        ));
        AutomationDispatcher::new(repository, renderer, documents, Arc::new(text))
    }

    fn request(task: &Task, kind: AutomationKind, config: Option<&str>) -> AutomationRequest {
        AutomationRequest {
            task_id: task.id,
            case_id: task.case_id,
            kind,
            config: config.map(ToString::to_string),
        }
    }

    #[tokio::test]
    async fn consult_drafts_email_with_suggestions() {
        let c = case();
        let task = task_for(&c, AutomationKind::InitialConsult, None);
        let mut repository = repository_with(&c, &task);
        expect_commit(&mut repository, &task);

        let mut text = MockTextGenerator::new();
        text.expect_complete()
            .withf(|r| r.max_tokens == 250 && r.prompt.contains("Injury Details: Whiplash"))
            .times(1)
            .returning(|_| Ok("- When did it happen?\n- Were you treated?".to_string()));

        let outcome = dispatcher(repository, text)
            .dispatch(request(&task, AutomationKind::InitialConsult, None))
            .await
            .unwrap();

        assert_eq!(outcome.message, "Initial consult email drafted and suggestions generated.");
        let draft = outcome.draft.unwrap();
        assert_eq!(draft.to, "[Enter Email Here]");
        assert_eq!(draft.subject, "Initial Consultation Request - Jane Roe");
        assert!(draft.body.contains("Jane Roe"));
        assert_eq!(
            outcome.suggestions.unwrap(),
            vec!["When did it happen?", "Were you treated?"]
        );
        assert_eq!(outcome.task.status, TaskStatus::Completed);
        assert_eq!(outcome.task.notes, None);
    }

    #[tokio::test]
    async fn witness_prep_appends_questions_to_notes() {
        let c = case();
        let mut task = task_for(&c, AutomationKind::InitialConsult, Some("witness_interview_prep"));
        task.notes = Some("Witness: neighbor".to_string());
        let mut repository = repository_with(&c, &task);
        expect_commit(&mut repository, &task);

        let mut text = MockTextGenerator::new();
        text.expect_complete()
            .returning(|_| Ok("- What did you see?\n- Where were you standing?".to_string()));

        let outcome = dispatcher(repository, text)
            .dispatch(request(&task, AutomationKind::InitialConsult, Some("witness_interview_prep")))
            .await
            .unwrap();

        assert_eq!(
            outcome.task.notes.as_deref(),
            Some(
                "Witness: neighbor\n\n--- AI Suggested Witness Questions --- \n\
                 What did you see?\nWhere were you standing?"
            )
        );
        assert_eq!(outcome.draft.unwrap().subject, "Witness Interview Request - Jane Roe Case");
    }

    #[tokio::test]
    async fn email_without_mailer_awaits_user() {
        let c = case();
        let task = task_for(&c, AutomationKind::EmailDraft, Some("client_follow_up"));
        let mut repository = repository_with(&c, &task);
        expect_commit(&mut repository, &task);

        let outcome = dispatcher(repository, MockTextGenerator::new())
            .dispatch(request(&task, AutomationKind::EmailDraft, Some("client_follow_up")))
            .await
            .unwrap();

        assert_eq!(outcome.task.status, TaskStatus::AwaitingUserAction);
        let link = outcome.mailto_link.unwrap();
        assert!(link.starts_with("mailto:jane@example.com?subject=Following%20Up%3A%20Jane%20Roe"));
        let notes = outcome.task.notes.unwrap();
        assert!(notes.starts_with('['));
        assert!(notes.ends_with("] Client follow-up email drafted (mailto)."));
    }

    #[tokio::test]
    async fn email_with_mailer_sends_and_completes() {
        let c = case();
        let mut task = task_for(&c, AutomationKind::EmailDraft, Some("insurance_contact"));
        task.notes = Some("first note".to_string());
        let mut repository = repository_with(&c, &task);
        expect_commit(&mut repository, &task);

        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|email| {
                email.to == "jane@example.com"
                    && email.subject.starts_with("Insurance Claim Follow Up: Jane Roe")
                    && email.html_body.contains("To Whom It May Concern,")
            })
            .times(1)
            .returning(|_| Ok("msg-1".to_string()));

        let outcome = dispatcher(repository, MockTextGenerator::new())
            .with_mailer(Arc::new(mailer))
            .dispatch(request(&task, AutomationKind::EmailDraft, Some("insurance_contact")))
            .await
            .unwrap();

        assert_eq!(outcome.task.status, TaskStatus::Completed);
        assert!(outcome.mailto_link.is_none());
        let notes = outcome.task.notes.unwrap();
        assert!(notes.starts_with("first note\n["));
        assert!(notes.ends_with("Insurance contact email sent."));
    }

    #[tokio::test]
    async fn generic_suggestion_falls_back_on_empty_completion() {
        let c = case();
        let task = task_for(&c, AutomationKind::AiSuggestion, Some("something_else"));
        let mut repository = repository_with(&c, &task);
        expect_commit(&mut repository, &task);

        let mut text = MockTextGenerator::new();
        text.expect_complete()
            .withf(|r| r.model.as_deref() == Some("gpt-3.5-turbo") && r.max_tokens == 80)
            .returning(|_| Ok("   ".to_string()));

        let outcome = dispatcher(repository, text)
            .dispatch(request(&task, AutomationKind::AiSuggestion, Some("something_else")))
            .await
            .unwrap();
        assert_eq!(outcome.suggestions.unwrap(), vec!["Review client file and proceed."]);
    }

    #[tokio::test]
    async fn empty_research_completion_fails_without_update() {
        let c = case();
        let task = task_for(&c, AutomationKind::AiSuggestion, Some("legal_research"));
        let mut repository = repository_with(&c, &task);
        repository.expect_update_task().never();

        let mut text = MockTextGenerator::new();
        text.expect_complete().returning(|_| Ok(String::new()));

        let err = dispatcher(repository, text)
            .dispatch(request(&task, AutomationKind::AiSuggestion, Some("legal_research")))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn task_of_other_case_is_forbidden() {
        let c = case();
        let task = Task::new(CaseId::new(), "Automated task").with_automation(
            AutomationDescriptor::new(AutomationKind::EmailDraft, None),
        );
        let mut repository = repository_with(&c, &task);
        repository.expect_update_task().never();

        let mut req = request(&task, AutomationKind::EmailDraft, None);
        req.case_id = c.id;
        let err = dispatcher(repository, MockTextGenerator::new())
            .dispatch(req)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn kind_mismatch_is_rejected() {
        let c = case();
        let task = task_for(&c, AutomationKind::EmailDraft, None);
        let mut repository = repository_with(&c, &task);
        repository.expect_update_task().never();

        let err = dispatcher(repository, MockTextGenerator::new())
            .dispatch(request(&task, AutomationKind::AiSuggestion, None))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("Mismatched automation type"));
    }

    #[tokio::test]
    async fn missing_task_is_not_found() {
        let c = case();
        let mut repository = MockCaseRepository::new();
        repository.expect_get_task().returning(|_| Ok(None));
        let stored_case = c.clone();
        repository
            .expect_get_case()
            .returning(move |_| Ok(Some(stored_case.clone())));

        let err = dispatcher(repository, MockTextGenerator::new())
            .dispatch(AutomationRequest {
                task_id: TaskId::new(),
                case_id: c.id,
                kind: AutomationKind::EmailDraft,
                config: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn document_generation_without_template_is_configuration_error() {
        let c = case();
        let task = task_for(&c, AutomationKind::DocumentGeneration, None);
        let mut repository = repository_with(&c, &task);
        repository.expect_update_task().never();

        let err = dispatcher(repository, MockTextGenerator::new())
            .dispatch(request(&task, AutomationKind::DocumentGeneration, Some("  ")))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn stale_revision_surfaces_conflict() {
        let c = case();
        let task = task_for(&c, AutomationKind::EmailDraft, None);
        let mut repository = repository_with(&c, &task);
        repository
            .expect_update_task()
            .returning(|_| Err(CoreError::Conflict("task changed".to_string())));

        let err = dispatcher(repository, MockTextGenerator::new())
            .dispatch(request(&task, AutomationKind::EmailDraft, None))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);
        assert!(err.is_retryable());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_generator_times_out() {
        struct Stalled;

        #[async_trait::async_trait]
        impl TextGenerator for Stalled {
            async fn complete(&self, _: CompletionRequest) -> intake_core::CoreResult<String> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(String::new())
            }
        }

        let c = case();
        let task = task_for(&c, AutomationKind::AiSuggestion, Some("legal_research"));
        let mut repository = repository_with(&c, &task);
        repository.expect_update_task().never();

        let mut dispatcher = dispatcher(repository, MockTextGenerator::new());
        dispatcher.text = Arc::new(Stalled);
        let dispatcher = dispatcher.with_settings(DispatchSettings {
            timeout: Duration::from_secs(5),
            ..DispatchSettings::default()
        });

        let err = dispatcher
            .dispatch(request(&task, AutomationKind::AiSuggestion, Some("legal_research")))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Timeout { duration_secs: 5 }));
    }

    #[test]
    fn outcome_serializes_camel_case() {
        let c = case();
        let outcome = AutomationOutcome {
            success: true,
            message: "ok".into(),
            action: AutomationKind::EmailDraft,
            draft: None,
            suggestions: None,
            mailto_link: Some("mailto:x".into()),
            document_info: None,
            generated_markdown: None,
            task: Task::new(c.id, "t"),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["mailtoLink"], "mailto:x");
        assert_eq!(json["action"], "EMAIL_DRAFT");
        assert!(json.get("draft").is_none());
    }

    #[test]
    fn request_accepts_route_field_names() {
        let task_id = TaskId::new();
        let case_id = CaseId::new();
        let json = format!(
            r#"{{"taskId":"{task_id}","clientId":"{case_id}","automationType":"DOC_GENERATION","automationConfig":"demand-letter"}}"#
        );
        let request: AutomationRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request.case_id, case_id);
        assert_eq!(request.kind, AutomationKind::DocumentGeneration);
        assert_eq!(request.config.as_deref(), Some("demand-letter"));
    }
}
