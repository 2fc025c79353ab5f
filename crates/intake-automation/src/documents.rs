//! Document generation, regeneration, download and delivery
//!
//! Generation renders a template for a case, composes it onto the
//! letterhead, stores the PDF and records a [`Document`]. The stored object
//! is written before the record; if recording fails the object is removed
//! again.
//!
//! Stored documents can also be bundled into a zip archive or mailed as a
//! PDF attachment.

use crate::collaborators::{Attachment, CaseRepository, Mailer, ObjectStore, OutgoingEmail};
use crate::error::PipelineResult;
use crate::storage::document_path;
use handlebars::html_escape;
use intake_compose::{Compositor, Letterhead, PDF_CONTENT_TYPE};
use intake_core::{is_email_address, Case, CaseId, CoreError, Document, DocumentId};
use intake_templates::TemplateRenderer;
use std::io::{Cursor, Write};
use std::sync::Arc;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Content type of a document bundle
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

const BUNDLE_COMPRESSION_LEVEL: i64 = 6;

/// A stored document plus the prose it was composed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    pub document: Document,
    pub markdown: String,
}

/// Stored document contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDownload {
    pub document: Document,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Which stored documents go into a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleSelection {
    /// Every document of a case, newest first
    Case(CaseId),
    /// Hand-picked documents, in the given order
    Documents(Vec<DocumentId>),
}

/// Zip archive of stored documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBundle {
    pub filename: String,
    pub content_type: &'static str,
    /// Archive entry names, in archive order
    pub entries: Vec<String>,
    pub bytes: Vec<u8>,
}

/// A document handed to the mailer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentDocument {
    pub document: Document,
    pub message_id: String,
}

/// Renders, composes and stores documents
pub struct DocumentService {
    repository: Arc<dyn CaseRepository>,
    store: Arc<dyn ObjectStore>,
    renderer: Arc<TemplateRenderer>,
    compositor: Compositor,
    letterhead: Arc<Letterhead>,
    mailer: Option<Arc<dyn Mailer>>,
    from_address: String,
}

impl std::fmt::Debug for DocumentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentService")
            .field("renderer", &self.renderer)
            .field("compositor", &self.compositor)
            .field("letterhead_pages", &self.letterhead.page_count())
            .field("mailer", &self.mailer.is_some())
            .finish_non_exhaustive()
    }
}

impl DocumentService {
    /// Create service
    #[must_use]
    pub fn new(
        repository: Arc<dyn CaseRepository>,
        store: Arc<dyn ObjectStore>,
        renderer: Arc<TemplateRenderer>,
        compositor: Compositor,
        letterhead: Arc<Letterhead>,
    ) -> Self {
        Self {
            repository,
            store,
            renderer,
            compositor,
            letterhead,
            mailer: None,
            from_address: String::new(),
        }
    }

    /// Enable [`DocumentService::send`] through `mailer`
    #[must_use]
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>, from_address: impl Into<String>) -> Self {
        self.mailer = Some(mailer);
        self.from_address = from_address.into();
        self
    }

    async fn compose(&self, case: &Case, template_id: &str) -> PipelineResult<(String, Vec<u8>)> {
        let markdown = self.renderer.render(template_id, case).await?;
        let bytes = self.compositor.compose_markup(&markdown, &self.letterhead)?;
        Ok((markdown, bytes))
    }

    /// Generate `template_id` for `case` and record it
    ///
    /// # Errors
    /// - `PipelineError::Template` if the template is missing or malformed
    /// - `PipelineError::Compose` if the PDF cannot be written
    /// - `PipelineError::Core` if storage or the repository fails
    pub async fn generate(&self, case: &Case, template_id: &str) -> PipelineResult<GeneratedDocument> {
        let (markdown, bytes) = self.compose(case, template_id).await?;

        let path = document_path(case.id, template_id, chrono::Utc::now().timestamp_millis());
        let stored = self.store.put(&path, bytes, PDF_CONTENT_TYPE).await?;

        let document = match self
            .repository
            .create_document(Document::new(case.id, template_id, stored.clone()))
            .await
        {
            Ok(document) => document,
            Err(e) => {
                if let Err(cleanup) = self.store.remove(vec![stored.clone()]).await {
                    tracing::warn!(path = %stored, error = %cleanup, "orphaned stored document");
                }
                return Err(e.into());
            }
        };

        tracing::info!(
            case_id = %case.id,
            document_id = %document.id,
            template = template_id,
            path = %document.storage_path,
            "generated document"
        );
        Ok(GeneratedDocument { document, markdown })
    }

    /// Generate for a stored case
    ///
    /// # Errors
    /// `CoreError::NotFound` for an unknown case, plus everything
    /// [`DocumentService::generate`] returns
    pub async fn generate_for(&self, case_id: CaseId, template_id: &str) -> PipelineResult<GeneratedDocument> {
        let case = self
            .repository
            .get_case(case_id)
            .await?
            .ok_or_else(|| CoreError::not_found("case", case_id))?;
        self.generate(&case, template_id).await
    }

    /// Re-render a document from current case data
    ///
    /// The stored object is overwritten at the same path; the record keeps
    /// its id and only `updated_at` changes.
    ///
    /// # Errors
    /// `CoreError::NotFound` for an unknown document or case, plus
    /// everything [`DocumentService::generate`] returns
    pub async fn regenerate(&self, document_id: DocumentId) -> PipelineResult<GeneratedDocument> {
        let existing = self.find(document_id).await?;
        let case = self
            .repository
            .get_case(existing.case_id)
            .await?
            .ok_or_else(|| CoreError::not_found("case", existing.case_id))?;

        let (markdown, bytes) = self.compose(&case, &existing.document_type).await?;
        self.store
            .put(&existing.storage_path, bytes, PDF_CONTENT_TYPE)
            .await?;
        let document = self.repository.touch_document(document_id).await?;

        tracing::info!(
            case_id = %case.id,
            document_id = %document.id,
            template = %document.document_type,
            "regenerated document"
        );
        Ok(GeneratedDocument { document, markdown })
    }

    /// Stored bytes of a document
    ///
    /// # Errors
    /// `CoreError::NotFound` for an unknown document or missing object
    pub async fn download(&self, document_id: DocumentId) -> PipelineResult<DocumentDownload> {
        let document = self.find(document_id).await?;
        let bytes = self.store.get(&document.storage_path).await?;
        Ok(DocumentDownload {
            document,
            content_type: PDF_CONTENT_TYPE,
            bytes,
        })
    }

    /// Mail a stored document as a PDF attachment
    ///
    /// The message body is HTML-escaped and line breaks become `<br>`.
    ///
    /// # Errors
    /// - `CoreError::Unavailable` when no mailer is configured
    /// - `CoreError::Validation` for a malformed recipient or an empty
    ///   subject or message
    /// - `CoreError::NotFound` for an unknown document, case or object
    pub async fn send(
        &self,
        document_id: DocumentId,
        to: &str,
        subject: &str,
        message: &str,
    ) -> PipelineResult<SentDocument> {
        let Some(mailer) = &self.mailer else {
            return Err(CoreError::Unavailable("mailer").into());
        };
        let to = to.trim();
        if !is_email_address(to) {
            return Err(CoreError::Validation(format!("invalid recipient address: {to:?}")).into());
        }
        if subject.trim().is_empty() {
            return Err(CoreError::Validation("subject is required".into()).into());
        }
        if message.trim().is_empty() {
            return Err(CoreError::Validation("message is required".into()).into());
        }

        let document = self.find(document_id).await?;
        let case = self
            .repository
            .get_case(document.case_id)
            .await?
            .ok_or_else(|| CoreError::not_found("case", document.case_id))?;
        let bytes = self.store.get(&document.storage_path).await?;

        let email = OutgoingEmail {
            from: self.from_address.clone(),
            to: to.to_string(),
            subject: subject.to_string(),
            html_body: format!("<p>{}</p>", html_escape(message).replace('\n', "<br>")),
            attachments: vec![Attachment {
                filename: attachment_name(&document, &case),
                content_type: PDF_CONTENT_TYPE.to_string(),
                bytes,
            }],
        };
        let message_id = mailer.send(email).await?;

        tracing::info!(
            case_id = %case.id,
            document_id = %document.id,
            message_id = %message_id,
            "sent document"
        );
        Ok(SentDocument {
            document,
            message_id,
        })
    }

    /// Pack stored documents into a zip archive
    ///
    /// Objects that cannot be fetched are skipped with a warning.
    ///
    /// # Errors
    /// - `CoreError::Validation` for an empty document list
    /// - `CoreError::NotFound` for an unknown case, a case without
    ///   documents, or when none of the listed documents exist
    /// - `CoreError::Collaborator` when no object could be fetched
    /// - `PipelineError::Archive` if the archive cannot be written
    pub async fn bundle(&self, selection: BundleSelection) -> PipelineResult<DocumentBundle> {
        let (label, documents) = match selection {
            BundleSelection::Case(case_id) => {
                let case = self
                    .repository
                    .get_case(case_id)
                    .await?
                    .ok_or_else(|| CoreError::not_found("case", case_id))?;
                let mut documents = self.repository.list_documents(case_id).await?;
                if documents.is_empty() {
                    return Err(CoreError::not_found("documents for case", case_id).into());
                }
                documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                (case.name, documents)
            }
            BundleSelection::Documents(ids) => {
                if ids.is_empty() {
                    return Err(CoreError::Validation("no documents selected".into()).into());
                }
                let mut documents = Vec::with_capacity(ids.len());
                for id in &ids {
                    match self.repository.get_document(*id).await? {
                        Some(document) => documents.push(document),
                        None => tracing::warn!(document_id = %id, "bundled document not found"),
                    }
                }
                if documents.is_empty() {
                    return Err(CoreError::not_found("documents", format!("{} requested", ids.len())).into());
                }
                ("Selected".to_string(), documents)
            }
        };

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(BUNDLE_COMPRESSION_LEVEL));
        let mut archive = ZipWriter::new(Cursor::new(Vec::new()));
        let mut entries = Vec::with_capacity(documents.len());

        for document in &documents {
            let bytes = match self.store.get(&document.storage_path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(
                        document_id = %document.id,
                        path = %document.storage_path,
                        error = %e,
                        "skipping unreadable document"
                    );
                    continue;
                }
            };
            let name = entry_name(document);
            archive.start_file(name.as_str(), options)?;
            archive.write_all(&bytes).map_err(zip::result::ZipError::from)?;
            entries.push(name);
        }

        if entries.is_empty() {
            return Err(CoreError::collaborator("storage", "no bundled document could be read").into());
        }
        let bytes = archive.finish()?.into_inner();

        let filename = format!(
            "{}_Documents_{}.zip",
            bundle_label(&label),
            chrono::Utc::now().format("%Y-%m-%d")
        );
        tracing::info!(filename = %filename, entries = entries.len(), bytes = bytes.len(), "bundled documents");
        Ok(DocumentBundle {
            filename,
            content_type: ZIP_CONTENT_TYPE,
            entries,
            bytes,
        })
    }

    async fn find(&self, document_id: DocumentId) -> PipelineResult<Document> {
        self.repository
            .get_document(document_id)
            .await?
            .ok_or_else(|| CoreError::not_found("document", document_id).into())
    }
}

fn short_id(document: &Document) -> String {
    document.id.to_string().chars().take(8).collect()
}

/// `<type>_<short id>.pdf` with anything outside `[A-Za-z0-9_-]` replaced
fn entry_name(document: &Document) -> String {
    let kind: String = document
        .document_type
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    format!("{kind}_{}.pdf", short_id(document))
}

fn attachment_name(document: &Document, case: &Case) -> String {
    format!(
        "{}_{}_{}.pdf",
        document.document_type,
        case.name.replace(' ', "_"),
        short_id(document)
    )
}

/// Filename-safe label: unsafe characters become `_`, whitespace runs collapse to `_`
fn bundle_label(name: &str) -> String {
    let mut label = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_space {
                label.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        label.push(if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' });
    }
    label
}
