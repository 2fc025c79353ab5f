//! Task automation descriptors
//!
//! A task may carry an [`AutomationDescriptor`] naming what kind of work can
//! be executed on its behalf. The free-text `config` is resolved into a closed
//! [`AutomationPlan`] before anything runs, so unknown configurations fall
//! back to the generic behavior of their kind.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Automation categories a task may request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutomationKind {
    /// Consultation or witness-interview email draft
    InitialConsult,
    /// Follow-up email draft
    EmailDraft,
    /// AI-generated suggestion list
    #[serde(rename = "CHATGPT_SUGGESTION", alias = "AI_SUGGESTION")]
    AiSuggestion,
    /// Template document generation
    #[serde(rename = "DOC_GENERATION")]
    DocumentGeneration,
}

impl AutomationKind {
    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InitialConsult => "INITIAL_CONSULT",
            Self::EmailDraft => "EMAIL_DRAFT",
            Self::AiSuggestion => "CHATGPT_SUGGESTION",
            Self::DocumentGeneration => "DOC_GENERATION",
        }
    }

    /// Parse the wire name, case-insensitively
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "INITIAL_CONSULT" => Some(Self::InitialConsult),
            "EMAIL_DRAFT" => Some(Self::EmailDraft),
            "CHATGPT_SUGGESTION" | "AI_SUGGESTION" => Some(Self::AiSuggestion),
            "DOC_GENERATION" | "DOCUMENT_GENERATION" => Some(Self::DocumentGeneration),
            _ => None,
        }
    }
}

impl fmt::Display for AutomationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Automation attached to a task at creation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationDescriptor {
    pub kind: AutomationKind,
    #[serde(default)]
    pub config: Option<String>,
    /// Task needs uploaded client documents before it can complete
    #[serde(default)]
    pub requires_docs: bool,
}

impl AutomationDescriptor {
    /// Create descriptor
    #[inline]
    #[must_use]
    pub fn new(kind: AutomationKind, config: Option<String>) -> Self {
        Self {
            kind,
            config,
            requires_docs: false,
        }
    }

    /// With documents-required flag
    #[inline]
    #[must_use]
    pub fn with_requires_docs(mut self, requires_docs: bool) -> Self {
        self.requires_docs = requires_docs;
        self
    }

    /// Resolve into a closed plan
    ///
    /// # Errors
    /// See [`AutomationPlan::from_request`]
    pub fn plan(&self) -> Result<AutomationPlan, CoreError> {
        AutomationPlan::from_request(self.kind, self.config.as_deref())
    }
}

/// Which consultation email to draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsultVariant {
    Consult,
    WitnessInterviewPrep,
}

/// Which follow-up email to draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmailTemplate {
    ClientFollowUp,
    InsuranceContact,
    Generic,
}

/// What the AI collaborator is asked about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuggestionTopic {
    LegalResearch,
    CaseLawResearch,
    EvidenceChecklist,
    Generic,
}

/// Fully resolved automation: kind plus closed configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AutomationPlan {
    InitialConsult(ConsultVariant),
    EmailDraft(EmailTemplate),
    AiSuggestion(SuggestionTopic),
    /// Template identifier to render
    DocumentGeneration(String),
}

impl AutomationPlan {
    /// Resolve a kind and free-text config
    ///
    /// Unrecognized configs fall back to the generic variant of the kind.
    ///
    /// # Errors
    /// `CoreError::Configuration` for document generation without a
    /// template name
    pub fn from_request(kind: AutomationKind, config: Option<&str>) -> Result<Self, CoreError> {
        let config = config.map(str::trim).filter(|c| !c.is_empty());
        let normalized = config.map(str::to_ascii_lowercase);
        let key = normalized.as_deref();

        Ok(match kind {
            AutomationKind::InitialConsult => Self::InitialConsult(match key {
                Some("witness_interview_prep") => ConsultVariant::WitnessInterviewPrep,
                _ => ConsultVariant::Consult,
            }),
            AutomationKind::EmailDraft => Self::EmailDraft(match key {
                Some("client_follow_up") => EmailTemplate::ClientFollowUp,
                Some("insurance_contact") => EmailTemplate::InsuranceContact,
                _ => EmailTemplate::Generic,
            }),
            AutomationKind::AiSuggestion => Self::AiSuggestion(match key {
                Some("legal_research") => SuggestionTopic::LegalResearch,
                Some("case_law_research") => SuggestionTopic::CaseLawResearch,
                Some("evidence_checklist") => SuggestionTopic::EvidenceChecklist,
                _ => SuggestionTopic::Generic,
            }),
            AutomationKind::DocumentGeneration => match config {
                Some(template) => Self::DocumentGeneration(template.to_string()),
                None => {
                    return Err(CoreError::Configuration(
                        "document generation requires a template name".to_string(),
                    ))
                }
            },
        })
    }

    /// Kind this plan belongs to
    #[must_use]
    pub fn kind(&self) -> AutomationKind {
        match self {
            Self::InitialConsult(_) => AutomationKind::InitialConsult,
            Self::EmailDraft(_) => AutomationKind::EmailDraft,
            Self::AiSuggestion(_) => AutomationKind::AiSuggestion,
            Self::DocumentGeneration(_) => AutomationKind::DocumentGeneration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_wire_names() {
        let json = serde_json::to_string(&AutomationKind::AiSuggestion).unwrap();
        assert_eq!(json, "\"CHATGPT_SUGGESTION\"");
        let json = serde_json::to_string(&AutomationKind::InitialConsult).unwrap();
        assert_eq!(json, "\"INITIAL_CONSULT\"");
        let kind: AutomationKind = serde_json::from_str("\"DOC_GENERATION\"").unwrap();
        assert_eq!(kind, AutomationKind::DocumentGeneration);
        assert_eq!(AutomationKind::parse("email_draft"), Some(AutomationKind::EmailDraft));
        assert_eq!(AutomationKind::parse("FAX"), None);
    }

    #[test]
    fn unknown_config_falls_back_to_generic() {
        let plan = AutomationPlan::from_request(AutomationKind::EmailDraft, Some("carrier_pigeon"))
            .unwrap();
        assert_eq!(plan, AutomationPlan::EmailDraft(EmailTemplate::Generic));

        let plan = AutomationPlan::from_request(AutomationKind::AiSuggestion, None).unwrap();
        assert_eq!(plan, AutomationPlan::AiSuggestion(SuggestionTopic::Generic));
    }

    #[test]
    fn known_configs_resolve() {
        let plan = AutomationPlan::from_request(
            AutomationKind::InitialConsult,
            Some("witness_interview_prep"),
        )
        .unwrap();
        assert_eq!(
            plan,
            AutomationPlan::InitialConsult(ConsultVariant::WitnessInterviewPrep)
        );

        let plan =
            AutomationPlan::from_request(AutomationKind::AiSuggestion, Some("Legal_Research"))
                .unwrap();
        assert_eq!(plan, AutomationPlan::AiSuggestion(SuggestionTopic::LegalResearch));
    }

    #[test]
    fn document_generation_requires_template() {
        let err = AutomationPlan::from_request(AutomationKind::DocumentGeneration, Some("  "))
            .unwrap_err();
        assert_eq!(err.status_code(), 400);

        let plan = AutomationPlan::from_request(
            AutomationKind::DocumentGeneration,
            Some("representation-letter"),
        )
        .unwrap();
        assert_eq!(
            plan,
            AutomationPlan::DocumentGeneration("representation-letter".to_string())
        );
        assert_eq!(plan.kind(), AutomationKind::DocumentGeneration);
    }

    #[test]
    fn descriptor_plan() {
        let descriptor =
            AutomationDescriptor::new(AutomationKind::EmailDraft, Some("client_follow_up".into()))
                .with_requires_docs(true);
        assert!(descriptor.requires_docs);
        assert_eq!(
            descriptor.plan().unwrap(),
            AutomationPlan::EmailDraft(EmailTemplate::ClientFollowUp)
        );
    }
}
