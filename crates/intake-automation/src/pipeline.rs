//! Pipeline façade
//!
//! Wires configuration and collaborators into the intake, document and
//! automation services.

use crate::collaborators::{CaseRepository, Mailer, ObjectStore, TextGenerator};
use crate::config::PipelineConfig;
use crate::dispatcher::{AutomationDispatcher, AutomationOutcome, AutomationRequest, DispatchSettings};
use crate::documents::{
    BundleSelection, DocumentBundle, DocumentDownload, DocumentService, GeneratedDocument,
    SentDocument,
};
use crate::error::PipelineResult;
use crate::intake::{IntakeReport, IntakeService};
use intake_compose::{Compositor, Letterhead};
use intake_core::{CaseId, CoreError, Document, DocumentId, NewCase, Task};
use intake_templates::{
    CachedCatalog, EmbeddedCatalog, LayeredCatalog, TemplateCatalog, TemplateRenderer,
    TemplateResolver,
};
use std::sync::Arc;

/// Injected collaborators
#[derive(Clone)]
pub struct Collaborators {
    pub repository: Arc<dyn CaseRepository>,
    pub store: Arc<dyn ObjectStore>,
    pub text: Arc<dyn TextGenerator>,
    pub mailer: Option<Arc<dyn Mailer>>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("mailer", &self.mailer.is_some())
            .finish_non_exhaustive()
    }
}

impl Collaborators {
    /// Collaborators without mail delivery
    #[must_use]
    pub fn new(
        repository: Arc<dyn CaseRepository>,
        store: Arc<dyn ObjectStore>,
        text: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            repository,
            store,
            text,
            mailer: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }
}

/// Case intake pipeline
pub struct CasePipeline {
    config: PipelineConfig,
    catalog: Arc<CachedCatalog>,
    renderer: Arc<TemplateRenderer>,
    intake: IntakeService,
    documents: Arc<DocumentService>,
    dispatcher: AutomationDispatcher,
    repository: Arc<dyn CaseRepository>,
}

impl std::fmt::Debug for CasePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CasePipeline")
            .field("config", &self.config)
            .field("intake", &self.intake)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

impl CasePipeline {
    /// Build the pipeline
    ///
    /// Loads the configured letterhead, or generates a plain one carrying
    /// the firm name when none is configured.
    ///
    /// # Errors
    /// `PipelineError::Compose` if the letterhead is missing or unreadable
    pub async fn new(config: PipelineConfig, collaborators: Collaborators) -> PipelineResult<Self> {
        let letterhead = match &config.letterhead_path {
            Some(path) => Letterhead::from_path(path).await?,
            None => Letterhead::generated(&config.firm.name, 1)?,
        };
        Ok(Self::with_letterhead(config, collaborators, letterhead))
    }

    /// Build the pipeline around an already loaded letterhead
    #[must_use]
    pub fn with_letterhead(
        config: PipelineConfig,
        collaborators: Collaborators,
        letterhead: Letterhead,
    ) -> Self {
        let base: Arc<dyn TemplateCatalog> = match &config.template_dir {
            Some(dir) => Arc::new(LayeredCatalog::overlay(dir.clone())),
            None => Arc::new(EmbeddedCatalog::new()),
        };
        let catalog = Arc::new(CachedCatalog::new(base, config.template_cache_capacity));
        let shared_catalog: Arc<dyn TemplateCatalog> = Arc::<CachedCatalog>::clone(&catalog);

        let renderer = Arc::new(TemplateRenderer::new(
            Arc::clone(&shared_catalog),
            config.firm.clone(),
        ));
        let mut documents = DocumentService::new(
            Arc::clone(&collaborators.repository),
            Arc::clone(&collaborators.store),
            Arc::clone(&renderer),
            Compositor::new(config.layout),
            Arc::new(letterhead),
        );
        if let Some(mailer) = &collaborators.mailer {
            documents = documents.with_mailer(Arc::clone(mailer), config.email.from_address.clone());
        }
        let documents = Arc::new(documents);

        let intake = IntakeService::new(
            Arc::clone(&collaborators.repository),
            shared_catalog,
            Arc::clone(&documents),
            TemplateResolver::new(config.document_table()),
            TemplateResolver::new(config.checklist_table()),
        )
        .with_rules(config.automation_rules.clone());

        let mut dispatcher = AutomationDispatcher::new(
            Arc::clone(&collaborators.repository),
            Arc::clone(&renderer),
            Arc::clone(&documents),
            Arc::clone(&collaborators.text),
        )
        .with_settings(DispatchSettings {
            from_address: config.email.from_address.clone(),
            model: config.ai.model.clone(),
            generic_model: config.ai.generic_model.clone(),
            timeout: config.request_timeout(),
        });
        if let Some(mailer) = collaborators.mailer {
            dispatcher = dispatcher.with_mailer(mailer);
        }

        tracing::info!(
            firm = %config.firm.name,
            catalog = catalog.name(),
            rules = config.automation_rules.len(),
            timeout_secs = config.request_timeout_secs,
            "case pipeline ready"
        );

        Self {
            config,
            catalog,
            renderer,
            intake,
            documents,
            dispatcher,
            repository: collaborators.repository,
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }

    /// Template cache, for invalidation after template edits
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &CachedCatalog {
        &self.catalog
    }

    /// Onboard a new case
    ///
    /// # Errors
    /// See [`IntakeService::onboard`]
    pub async fn onboard(&self, new_case: NewCase) -> PipelineResult<IntakeReport> {
        self.intake.onboard(new_case).await
    }

    /// Run a task automation
    ///
    /// # Errors
    /// See [`AutomationDispatcher::dispatch`]
    pub async fn dispatch(&self, request: AutomationRequest) -> PipelineResult<AutomationOutcome> {
        self.dispatcher.dispatch(request).await
    }

    /// Generate a document for a stored case
    ///
    /// # Errors
    /// See [`DocumentService::generate_for`]
    pub async fn generate_document(&self, case_id: CaseId, template_id: &str) -> PipelineResult<GeneratedDocument> {
        self.documents.generate_for(case_id, template_id).await
    }

    /// Regenerate a stored document in place
    ///
    /// # Errors
    /// See [`DocumentService::regenerate`]
    pub async fn regenerate_document(&self, document_id: DocumentId) -> PipelineResult<GeneratedDocument> {
        self.documents.regenerate(document_id).await
    }

    /// Fetch stored document bytes
    ///
    /// # Errors
    /// See [`DocumentService::download`]
    pub async fn download_document(&self, document_id: DocumentId) -> PipelineResult<DocumentDownload> {
        self.documents.download(document_id).await
    }

    /// Mail a stored document as a PDF attachment
    ///
    /// # Errors
    /// See [`DocumentService::send`]
    pub async fn send_document(
        &self,
        document_id: DocumentId,
        to: &str,
        subject: &str,
        message: &str,
    ) -> PipelineResult<SentDocument> {
        self.documents.send(document_id, to, subject, message).await
    }

    /// Zip stored documents of a case or a hand-picked list
    ///
    /// # Errors
    /// See [`DocumentService::bundle`]
    pub async fn bundle_documents(&self, selection: BundleSelection) -> PipelineResult<DocumentBundle> {
        self.documents.bundle(selection).await
    }

    /// Tasks of a case
    ///
    /// # Errors
    /// `CoreError::NotFound` for an unknown case
    pub async fn tasks(&self, case_id: CaseId) -> PipelineResult<Vec<Task>> {
        self.require_case(case_id).await?;
        Ok(self.repository.list_tasks(case_id).await?)
    }

    /// Documents of a case
    ///
    /// # Errors
    /// `CoreError::NotFound` for an unknown case
    pub async fn documents(&self, case_id: CaseId) -> PipelineResult<Vec<Document>> {
        self.require_case(case_id).await?;
        Ok(self.repository.list_documents(case_id).await?)
    }

    async fn require_case(&self, case_id: CaseId) -> PipelineResult<()> {
        match self.repository.get_case(case_id).await? {
            Some(_) => Ok(()),
            None => Err(CoreError::not_found("case", case_id).into()),
        }
    }
}
