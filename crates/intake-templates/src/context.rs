//! Template context built from a case
//!
//! The context is the complete set of placeholders a template may use.
//! Field names are serialized in camelCase, e.g. `{{clientName}}`.

use chrono::{NaiveDate, Utc};
use intake_core::{Case, FirmProfile};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Bumped whenever a placeholder is added, renamed or removed
pub const CONTEXT_VERSION: u32 = 1;

const NOT_PROVIDED: &str = "[Not Provided]";
const DATE_NOT_PROVIDED: &str = "[Date Not Provided]";
const AMOUNT_NOT_PROVIDED: &str = "[Amount Not Provided]";

/// Placeholders available to document templates
///
/// Optional text fields hold `[Not Provided]` when absent so a rendered
/// letter never has a silent gap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseContext {
    pub context_version: u32,
    pub client_name: String,
    pub email: String,
    pub phone: String,
    pub case_type: String,
    pub verbal_quality: String,
    pub incident_location: String,
    pub injury_details: String,
    pub insurance_company: String,
    pub lawyer_notes: String,
    /// e.g. `March 1, 2024`
    pub current_date: String,
    pub incident_date_formatted: String,
    /// e.g. `$12,345.67`
    pub medical_expenses_formatted: String,
    pub firm_name: String,
    pub firm_address: String,
    pub firm_phone: String,
    pub firm_email: String,
    pub attorney_name: String,
}

impl CaseContext {
    /// Build context dated today
    #[must_use]
    pub fn new(case: &Case, firm: &FirmProfile) -> Self {
        Self::on(case, firm, Utc::now().date_naive())
    }

    /// Build context with an explicit current date
    #[must_use]
    pub fn on(case: &Case, firm: &FirmProfile, today: NaiveDate) -> Self {
        Self {
            context_version: CONTEXT_VERSION,
            client_name: case.name.clone(),
            email: case.email.clone(),
            phone: or_placeholder(case.phone.as_deref()),
            case_type: or_placeholder(Some(&case.category)),
            verbal_quality: or_placeholder(Some(&case.verbal_quality)),
            incident_location: or_placeholder(case.incident_location.as_deref()),
            injury_details: or_placeholder(case.injury_details.as_deref()),
            insurance_company: or_placeholder(case.insurance_company.as_deref()),
            lawyer_notes: or_placeholder(case.lawyer_notes.as_deref()),
            current_date: format_date(today),
            incident_date_formatted: case
                .incident_date
                .map_or_else(|| DATE_NOT_PROVIDED.to_string(), format_date),
            medical_expenses_formatted: case
                .medical_expenses
                .map_or_else(|| AMOUNT_NOT_PROVIDED.to_string(), format_currency),
            firm_name: firm.name.clone(),
            firm_address: firm.address.clone(),
            firm_phone: firm.phone.clone(),
            firm_email: firm.email.clone(),
            attorney_name: firm.attorney.clone(),
        }
    }
}

fn or_placeholder(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_PROVIDED.to_string(),
    }
}

/// Long US date, e.g. `March 1, 2024`
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// US dollars with thousands separators, e.g. `$1,234.50`
#[must_use]
pub fn format_currency(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = rounded.abs().to_string();
    let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    format!("{sign}${}.{cents}", group_thousands(whole))
}

/// Comma-separate an ASCII digit run in groups of three from the right
fn group_thousands(digits: &str) -> String {
    let mut groups: Vec<&[u8]> = digits.as_bytes().rchunks(3).collect();
    groups.reverse();
    groups
        .iter()
        .map(|group| String::from_utf8_lossy(group))
        .collect::<Vec<_>>()
        .join(",")
}
