//! Follow-up email drafts

use handlebars::html_escape;
use intake_core::{Case, EmailTemplate, FirmProfile, Task};
use serde::{Deserialize, Serialize};

/// Placeholder recipient when the case has no email address
pub const MISSING_EMAIL: &str = "[Client Email Missing]";

/// Subject and body of an email, before sending
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailDraft {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Follow-up draft for `template`, addressed to the client
#[must_use]
pub fn follow_up(template: EmailTemplate, task: &Task, case: &Case, firm: &FirmProfile) -> EmailDraft {
    let name = &case.name;
    let (subject, body) = match template {
        EmailTemplate::ClientFollowUp => {
            let case_type = if case.category.trim().is_empty() {
                "Your Case"
            } else {
                &case.category
            };
            (
                format!("Following Up: {name} - {case_type}"),
                format!(
                    "Dear {name},\n\n\
                     This is a friendly follow-up regarding your case.\n\n\
                     Could you please provide an update on [Specify information needed - e.g., \
                     your recent doctor's appointment, status of requested documents]?\n\n\
                     Let us know if you have any questions.\n\n\
                     Sincerely,\n{}",
                    firm.name
                ),
            )
        }
        EmailTemplate::InsuranceContact => {
            let subject_date = case
                .incident_date
                .map_or_else(|| "N/A".to_string(), |d| d.format("%-m/%-d/%Y").to_string());
            let body_date = case
                .incident_date
                .map_or_else(|| "[Date Missing]".to_string(), |d| d.format("%-m/%-d/%Y").to_string());
            (
                format!("Insurance Claim Follow Up: {name} - Incident {subject_date}"),
                format!(
                    "To Whom It May Concern,\n\n\
                     Please provide an update on the status of the claim for our client, {name}, \
                     regarding the incident on {body_date}.\n\n\
                     Client Name: {name}\n\
                     Date of Incident: {body_date}\n\
                     [Reference Number if available]\n\n\
                     Thank you,\n{}",
                    firm.name
                ),
            )
        }
        EmailTemplate::Generic => (
            format!("Regarding Task: {}", task.description),
            format!(
                "Placeholder email for {}.\nClient: {name} ({})",
                task.description, case.email
            ),
        ),
    };

    EmailDraft {
        to: recipient(case),
        subject,
        body,
    }
}

/// Client address, or a placeholder when absent
#[must_use]
pub fn recipient(case: &Case) -> String {
    let email = case.email.trim();
    if email.is_empty() {
        MISSING_EMAIL.to_string()
    } else {
        email.to_string()
    }
}

/// Communication-log wording for a follow-up
#[must_use]
pub fn log_line(template: EmailTemplate, sent: bool) -> &'static str {
    match (template, sent) {
        (EmailTemplate::ClientFollowUp, true) => "Client follow-up email sent.",
        (EmailTemplate::ClientFollowUp, false) => "Client follow-up email drafted (mailto).",
        (EmailTemplate::InsuranceContact, true) => "Insurance contact email sent.",
        (EmailTemplate::InsuranceContact, false) => "Insurance contact email drafted (mailto).",
        (EmailTemplate::Generic, true) => "Generic email sent.",
        (EmailTemplate::Generic, false) => "Generic email drafted (mailto).",
    }
}

/// `mailto:` link opening the draft in a local mail client
#[must_use]
pub fn mailto_link(draft: &EmailDraft) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        draft.to,
        urlencoding::encode(&draft.subject),
        urlencoding::encode(&draft.body)
    )
}

/// HTML rendering of a plain-text body under a firm banner
#[must_use]
pub fn html_body(firm: &FirmProfile, body: &str) -> String {
    let paragraphs: Vec<String> = body
        .split("\n\n")
        .map(|p| format!("<p>{}</p>", html_escape(p).replace('\n', "<br>")))
        .collect();
    format!(
        "<div style=\"font-family: Helvetica, Arial, sans-serif\">\
         <div style=\"border-bottom: 2px solid #26407a; padding-bottom: 8px\"><strong>{}</strong></div>\
         {}\
         </div>",
        html_escape(&firm.name),
        paragraphs.join("")
    )
}
