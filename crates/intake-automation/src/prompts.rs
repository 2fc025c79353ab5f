//! Prompts sent to the text generator
//!
//! Every prompt ends with a disclaimer line; the caller never relies on the
//! model to add one.

use intake_core::{Case, CoreError, CoreResult, Task};
use serde::{Deserialize, Serialize};

/// One completion call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    /// `None` leaves the model default in place
    pub temperature: Option<f32>,
    /// `None` uses the generator's configured model
    pub model: Option<String>,
}

impl CompletionRequest {
    /// Create request with the model's default temperature
    #[must_use]
    pub fn new(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens,
            temperature: None,
            model: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

fn snippet(text: Option<&str>, max_chars: usize) -> Option<String> {
    let text = text.map(str::trim).filter(|t| !t.is_empty())?;
    Some(text.chars().take(max_chars).collect())
}

/// Short case summary fed to the consultation prompt
#[must_use]
pub fn consult_context(case: &Case) -> String {
    let injury = snippet(case.injury_details.as_deref(), 100)
        .map_or_else(|| "N/A".to_string(), |s| format!("{s}..."));
    format!("Case Type: {}, Injury Details: {injury}", case.category)
}

/// Shorter summary used when looking for similar cases
#[must_use]
pub fn similar_case_context(case: &Case) -> String {
    let injury = snippet(case.injury_details.as_deref(), 50).unwrap_or_else(|| "N/A".to_string());
    format!("Case Type: {}, Injury: {injury}", case.category)
}

/// Questions for an initial consultation
#[must_use]
pub fn consult_questions(context: &str, jurisdiction: &str) -> CompletionRequest {
    let prompt = format!(
        "You are an assistant for a personal injury law firm in {jurisdiction}.\n\
         Given the client context: \"{context}\"\n\n\
         List essential questions for the initial consultation and include a standard brief \
         disclaimer about the consultation not forming an attorney-client relationship.\n\
         Format as a bulleted list (using '-').\n\n\
         Disclaimer: AI-generated information for internal use only. Does not constitute legal \
         advice. Verify all information."
    );
    CompletionRequest::new(prompt, 250).with_temperature(0.3)
}

/// Questions for a witness interview
#[must_use]
pub fn witness_questions(case: &Case, jurisdiction: &str) -> CompletionRequest {
    let details = case
        .injury_details
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or("limited details available");
    let prompt = format!(
        "You are an assistant for a personal injury law firm in {jurisdiction}.\n\
         Case Type: \"{}\".\n\
         Incident Details: \"{details}\"\n\n\
         Generate a list of key questions to ask a potential witness. Focus on perspective, \
         observations, conditions, actions, conversations, other witnesses.\n\
         Format as a bulleted list (using '-').\n\n\
         Disclaimer: AI-generated suggestions for internal use only. Adapt questions based on \
         the actual interview flow.",
        non_empty(&case.category, "an incident"),
    );
    CompletionRequest::new(prompt, 300).with_temperature(0.4)
}

/// Research outline for the case's jurisdiction
#[must_use]
pub fn legal_research(case: &Case, jurisdiction: &str) -> CompletionRequest {
    let details = case
        .injury_details
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or("Not specified");
    let prompt = format!(
        "You are a legal research assistant for a law firm in {jurisdiction}.\n\
         Case Type: \"{}\".\n\
         Incident Details: \"{details}\"\n\n\
         Provide a concise overview of key legal points for this case in {jurisdiction}. \
         Include sections (use ### markdown headings) for:\n\
         1.  Potential Statutes of Limitations\n\
         2.  Relevant Negligence Standards (e.g., comparative/contributory)\n\
         3.  Key Statutes or Case Law Precedents (cite if possible)\n\
         4.  Potential Damage Considerations (including caps if applicable)\n\n\
         Disclaimer: AI-generated research outline for internal review only. Does not \
         constitute legal advice. Verify all statutes, case law, and deadlines independently.",
        non_empty(&case.category, "general personal injury"),
    );
    CompletionRequest::new(prompt, 400).with_temperature(0.3)
}

/// Evidence items to collect
#[must_use]
pub fn evidence_checklist(case: &Case, jurisdiction: &str) -> CompletionRequest {
    let details = case
        .injury_details
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or("Not specified");
    let prompt = format!(
        "You are an assistant for a personal injury law firm in {jurisdiction}.\n\
         Case Type: \"{}\".\n\
         Incident Details: \"{details}\"\n\n\
         Generate a checklist of standard evidence items (police reports, photos/videos, \
         witness statements, medical records, bills, lost wages, etc.). Tailor slightly to \
         case type.\n\
         Format as a bulleted list (using '-').\n\n\
         Disclaimer: AI-generated list for internal planning. Ensure all relevant evidence is \
         collected based on specific case facts.",
        non_empty(&case.category, "general personal injury"),
    );
    CompletionRequest::new(prompt, 250).with_temperature(0.3)
}

/// One-line suggestion for an arbitrary task
#[must_use]
pub fn generic_suggestion(task: &Task, case: &Case) -> CompletionRequest {
    let prompt = format!(
        "Provide a brief, generic suggestion for how to approach the task: \"{}\" for a client \
         named {}.\n\
         Disclaimer: AI-generated suggestion for internal consideration only.",
        task.description, case.name
    );
    CompletionRequest::new(prompt, 80)
}

fn non_empty<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

/// Split a completion into list items
///
/// Lines are trimmed, a leading `- ` is removed and blank lines dropped.
#[must_use]
pub fn split_suggestions(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .map(|line| line.strip_prefix("- ").unwrap_or(line).trim())
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Like [`split_suggestions`], but an empty completion is an error
///
/// # Errors
/// `CoreError::Collaborator` when the completion holds no items
pub fn parse_suggestions(text: &str) -> CoreResult<Vec<String>> {
    let items = split_suggestions(text);
    if items.is_empty() {
        return Err(CoreError::collaborator(
            "text generator",
            "completion contained no content",
        ));
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::NewCase;
    use pretty_assertions::assert_eq;

    fn case(details: Option<&str>) -> Case {
        let mut new = NewCase::new("Jane Roe", "jane@example.com", "MVA", "Good");
        if let Some(details) = details {
            new = new.with_injury_details(details);
        }
        Case::from_new(new).unwrap()
    }

    #[test]
    fn consult_context_truncates_details() {
        let long = "a".repeat(150);
        let context = consult_context(&case(Some(&long)));
        assert_eq!(
            context,
            format!("Case Type: MVA, Injury Details: {}...", "a".repeat(100))
        );
        assert_eq!(consult_context(&case(None)), "Case Type: MVA, Injury Details: N/A");
    }

    #[test]
    fn similar_case_context_uses_shorter_snippet() {
        let context = similar_case_context(&case(Some(&"b".repeat(80))));
        assert_eq!(context, format!("Case Type: MVA, Injury: {}", "b".repeat(50)));
    }

    #[test]
    fn prompt_parameters() {
        let c = case(Some("rear-ended at a light"));
        let consult = consult_questions(&consult_context(&c), "NJ");
        assert_eq!((consult.max_tokens, consult.temperature), (250, Some(0.3)));
        assert!(consult.prompt.contains("law firm in NJ"));

        let witness = witness_questions(&c, "NJ");
        assert_eq!((witness.max_tokens, witness.temperature), (300, Some(0.4)));
        assert!(witness.prompt.contains("Incident Details: \"rear-ended at a light\""));

        let research = legal_research(&c, "New York");
        assert_eq!(research.max_tokens, 400);
        assert!(research.prompt.contains("key legal points for this case in New York"));

        let evidence = evidence_checklist(&case(None), "NJ");
        assert!(evidence.prompt.contains("Incident Details: \"Not specified\""));
    }

    #[test]
    fn generic_prompt_names_task_and_client() {
        let c = case(None);
        let task = Task::new(c.id, "Call the adjuster");
        let request = generic_suggestion(&task, &c);
        assert_eq!(request.max_tokens, 80);
        assert!(request.prompt.contains("\"Call the adjuster\" for a client named Jane Roe"));
    }

    #[test]
    fn suggestions_are_cleaned() {
        let text = "- Where were you?\n\n  - What did you see?  \nAnything else\n-  \n";
        assert_eq!(
            parse_suggestions(text).unwrap(),
            vec!["Where were you?", "What did you see?", "Anything else", "-"]
        );
    }

    #[test]
    fn empty_completion_is_collaborator_error() {
        let err = parse_suggestions(" \n\n ").unwrap_err();
        assert!(matches!(err, CoreError::Collaborator { .. }));
    }
}
