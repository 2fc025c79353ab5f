//! Automation rules for seeded tasks
//!
//! Checklist lines are plain text. A rule whose description equals a task
//! description (ignoring case and surrounding whitespace) attaches its
//! automation descriptor to that task during intake.

use intake_core::{AutomationDescriptor, AutomationKind};
use serde::{Deserialize, Serialize};

/// Description match → automation descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationRule {
    pub description: String,
    pub kind: AutomationKind,
    #[serde(default)]
    pub config: Option<String>,
    #[serde(default)]
    pub requires_docs: bool,
}

impl AutomationRule {
    /// Create rule
    #[must_use]
    pub fn new(description: impl Into<String>, kind: AutomationKind, config: Option<&str>) -> Self {
        Self {
            description: description.into(),
            kind,
            config: config.map(ToString::to_string),
            requires_docs: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn requiring_docs(mut self) -> Self {
        self.requires_docs = true;
        self
    }

    /// Does this rule apply to a task description?
    #[must_use]
    pub fn matches(&self, description: &str) -> bool {
        self.description.trim().eq_ignore_ascii_case(description.trim())
    }

    /// Descriptor attached to matching tasks
    #[must_use]
    pub fn descriptor(&self) -> AutomationDescriptor {
        AutomationDescriptor::new(self.kind, self.config.clone())
            .with_requires_docs(self.requires_docs)
    }
}

/// Rules shipped with the pipeline, matching the built-in checklists
#[must_use]
pub fn builtin_rules() -> Vec<AutomationRule> {
    use AutomationKind::{AiSuggestion, DocumentGeneration, EmailDraft, InitialConsult};
    vec![
        AutomationRule::new("Initial Client Consult", InitialConsult, None),
        AutomationRule::new(
            "Send letter of representation",
            DocumentGeneration,
            Some("representation-letter"),
        ),
        AutomationRule::new("Prepare witness interview", InitialConsult, Some("witness_interview_prep")),
        AutomationRule::new("Client follow-up", EmailDraft, Some("client_follow_up")),
        AutomationRule::new("Contact insurance carrier", EmailDraft, Some("insurance_contact")),
        AutomationRule::new("Research statute of limitations", AiSuggestion, Some("legal_research")),
        AutomationRule::new("Build evidence checklist", AiSuggestion, Some("evidence_checklist")),
    ]
}

/// First rule matching `description`
#[must_use]
pub fn descriptor_for(rules: &[AutomationRule], description: &str) -> Option<AutomationDescriptor> {
    rules
        .iter()
        .find(|rule| rule.matches(description))
        .map(AutomationRule::descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_ignores_case_and_padding() {
        let rules = builtin_rules();
        let descriptor = descriptor_for(&rules, "  client FOLLOW-UP ").unwrap();
        assert_eq!(descriptor.kind, AutomationKind::EmailDraft);
        assert_eq!(descriptor.config.as_deref(), Some("client_follow_up"));
    }

    #[test]
    fn unmatched_description_has_no_automation() {
        assert!(descriptor_for(&builtin_rules(), "Photograph vehicle damage").is_none());
        assert!(descriptor_for(&builtin_rules(), "Client follow-up call").is_none());
    }

    #[test]
    fn first_rule_wins() {
        let rules = vec![
            AutomationRule::new("Call client", AutomationKind::EmailDraft, None).requiring_docs(),
            AutomationRule::new("call client", AutomationKind::AiSuggestion, None),
        ];
        let descriptor = descriptor_for(&rules, "Call client").unwrap();
        assert_eq!(descriptor.kind, AutomationKind::EmailDraft);
        assert!(descriptor.requires_docs);
    }

    #[test]
    fn every_builtin_rule_plans() {
        for rule in builtin_rules() {
            assert!(rule.descriptor().plan().is_ok(), "{}", rule.description);
        }
    }

    #[test]
    fn rules_deserialize_with_defaults() {
        let rule: AutomationRule = serde_json::from_str(
            r#"{"description":"Order records","kind":"DOC_GENERATION","config":"records-request"}"#,
        )
        .unwrap();
        assert_eq!(rule.kind, AutomationKind::DocumentGeneration);
        assert!(!rule.requires_docs);
    }
}
