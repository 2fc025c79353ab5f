//! Intake Core - domain model for case onboarding
//!
//! Defines the records the pipeline operates on:
//! - Cases (clients) with their category and verbal quality tier
//! - Tasks with status, notes and an optional automation descriptor
//! - Stored documents generated from templates
//! - The shared error taxonomy surfaced to the request layer
//!
//! # Example
//!
//! ```rust,ignore
//! use intake_core::{Case, NewCase, Task};
//!
//! let case = Case::from_new(NewCase::new("Jane Roe", "jane@example.com", "MVA", "Good"))?;
//! let task = Task::new(case.id, "Initial Client Consult");
//! assert!(!task.is_overdue(chrono::Utc::now().date_naive()));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod automation;
pub mod error;
pub mod types;

pub use automation::{
    AutomationDescriptor, AutomationKind, AutomationPlan, ConsultVariant, EmailTemplate,
    SuggestionTopic,
};
pub use error::{CoreError, CoreResult};
pub use types::{
    is_email_address, Case, CaseCategory, CaseId, Document, DocumentId, FirmProfile, NewCase,
    QualityTier, Task, TaskId, TaskStatus,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
