//! Intake Automation - services over the case intake pipeline
//!
//! Ties the template and composition crates to injected collaborators:
//! - **Intake**: create a case, seed its tasks, generate its documents
//! - **Documents**: generate, regenerate in place, download, bundle and mail
//! - **Dispatch**: run a task's automation and commit the result
//!
//! # Example
//!
//! ```rust,ignore
//! use intake_automation::{CasePipeline, Collaborators, PipelineConfig};
//!
//! let config = PipelineConfig::load("pipeline.toml").await?;
//! let pipeline = CasePipeline::new(config, Collaborators::new(repo, store, ai)).await?;
//! let report = pipeline.onboard(new_case).await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod collaborators;
pub mod config;
pub mod dispatcher;
pub mod documents;
pub mod email;
pub mod error;
pub mod intake;
pub mod pipeline;
pub mod prompts;
pub mod rules;
pub mod storage;

pub use collaborators::{
    Attachment, CaseRepository, Mailer, ObjectStore, OutgoingEmail, TaskUpdate, TextGenerator,
};
pub use config::{AiSettings, EmailSettings, PipelineConfig};
pub use dispatcher::{
    AutomationDispatcher, AutomationOutcome, AutomationRequest, DispatchSettings, DocumentInfo,
};
pub use documents::{
    BundleSelection, DocumentBundle, DocumentDownload, DocumentService, GeneratedDocument,
    SentDocument, ZIP_CONTENT_TYPE,
};
pub use email::EmailDraft;
pub use error::{PipelineError, PipelineResult};
pub use intake::{IntakeFailure, IntakeReport, IntakeService, IntakeStage};
pub use pipeline::{CasePipeline, Collaborators};
pub use prompts::CompletionRequest;
pub use rules::{builtin_rules, AutomationRule};
pub use storage::{document_path, LocalObjectStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
