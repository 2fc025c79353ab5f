//! Core records for the intake pipeline
//!
//! Defines the fundamental types:
//! - Identifiers for cases, tasks and documents
//! - Case categories and verbal quality tiers
//! - The case, task and document records themselves
//! - Firm identity used when rendering letters

use crate::automation::AutomationDescriptor;
use crate::error::CoreError;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident, $entity:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random identifier
            #[inline]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self).map_err(|_| {
                    CoreError::Validation(format!("invalid {} id format: '{}'", $entity, s))
                })
            }
        }
    };
}

record_id!(
    /// Unique case (client) identifier
    CaseId,
    "case"
);
record_id!(
    /// Unique task identifier
    TaskId,
    "task"
);
record_id!(
    /// Unique document identifier
    DocumentId,
    "document"
);

/// Case category driving template selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CaseCategory {
    /// Motor vehicle accident
    #[serde(rename = "MVA", alias = "Motor Vehicle Accident")]
    MotorVehicle,
    /// Slip, trip or fall incident
    #[serde(rename = "Fall", alias = "Slip and Fall")]
    Fall,
    /// Defective product
    #[serde(rename = "Product Liability")]
    ProductLiability,
    /// Anything else the practice takes on
    #[serde(rename = "Other")]
    Other,
}

impl CaseCategory {
    /// All known categories
    pub const ALL: [CaseCategory; 4] = [
        Self::MotorVehicle,
        Self::Fall,
        Self::ProductLiability,
        Self::Other,
    ];

    /// Parse the free-text value captured at intake
    ///
    /// Returns `None` for values the practice has no rules for.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mva" | "motor vehicle accident" | "motor vehicle" => Some(Self::MotorVehicle),
            "fall" | "slip and fall" => Some(Self::Fall),
            "product liability" | "product_liability" => Some(Self::ProductLiability),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Canonical stored value
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MotorVehicle => "MVA",
            Self::Fall => "Fall",
            Self::ProductLiability => "Product Liability",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for CaseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected ease of favorable resolution, from client communication quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityTier {
    Excellent,
    Good,
    Average,
    #[serde(alias = "Bad")]
    Poor,
    Zero,
}

impl QualityTier {
    /// All known tiers
    pub const ALL: [QualityTier; 5] = [
        Self::Excellent,
        Self::Good,
        Self::Average,
        Self::Poor,
        Self::Zero,
    ];

    /// Parse the free-text verbal quality captured at intake
    ///
    /// `Bad` is accepted as an alias of [`QualityTier::Poor`]; `N/A` and
    /// unknown values yield `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "excellent" => Some(Self::Excellent),
            "good" => Some(Self::Good),
            "average" => Some(Self::Average),
            "poor" | "bad" => Some(Self::Poor),
            "zero" => Some(Self::Zero),
            _ => None,
        }
    }

    /// Canonical stored value
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Average => "Average",
            Self::Poor => "Poor",
            Self::Zero => "Zero",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intake form payload
///
/// Category and verbal quality are kept as free text; unknown values are
/// stored verbatim and simply match fewer template rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCase {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(alias = "case_type")]
    pub category: String,
    #[serde(alias = "quality")]
    pub verbal_quality: String,
    #[serde(default)]
    pub incident_date: Option<NaiveDate>,
    #[serde(default, alias = "location")]
    pub incident_location: Option<String>,
    #[serde(default)]
    pub injury_details: Option<String>,
    #[serde(default)]
    pub medical_expenses: Option<Decimal>,
    #[serde(default)]
    pub insurance_company: Option<String>,
    #[serde(default)]
    pub lawyer_notes: Option<String>,
}

impl NewCase {
    /// Create payload with the required fields only
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        category: impl Into<String>,
        verbal_quality: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
            category: category.into(),
            verbal_quality: verbal_quality.into(),
            incident_date: None,
            incident_location: None,
            injury_details: None,
            medical_expenses: None,
            insurance_company: None,
            lawyer_notes: None,
        }
    }

    /// With incident date
    #[inline]
    #[must_use]
    pub fn with_incident_date(mut self, date: NaiveDate) -> Self {
        self.incident_date = Some(date);
        self
    }

    /// With injury narrative
    #[inline]
    #[must_use]
    pub fn with_injury_details(mut self, details: impl Into<String>) -> Self {
        self.injury_details = Some(details.into());
        self
    }

    /// With medical expense estimate
    #[inline]
    #[must_use]
    pub fn with_medical_expenses(mut self, amount: Decimal) -> Self {
        self.medical_expenses = Some(amount);
        self
    }

    /// With insurance carrier
    #[inline]
    #[must_use]
    pub fn with_insurance_company(mut self, company: impl Into<String>) -> Self {
        self.insurance_company = Some(company.into());
        self
    }

    /// Check required fields
    ///
    /// # Errors
    /// `CoreError::Validation` naming every offending field
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut problems = Vec::new();
        if self.name.trim().is_empty() {
            problems.push("name is required");
        }
        if !is_email_address(&self.email) {
            problems.push("invalid email address");
        }
        if self.category.trim().is_empty() {
            problems.push("case type is required");
        }
        if self.verbal_quality.trim().is_empty() {
            problems.push("verbal quality is required");
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(problems.join(", ")))
        }
    }
}

/// Loose shape check: `local@domain.tld`, no whitespace
#[must_use]
pub fn is_email_address(raw: &str) -> bool {
    let raw = raw.trim();
    match raw.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !raw.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// A legal matter and its primary contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: CaseId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub category: String,
    pub verbal_quality: String,
    pub incident_date: Option<NaiveDate>,
    pub incident_location: Option<String>,
    pub injury_details: Option<String>,
    pub medical_expenses: Option<Decimal>,
    pub insurance_company: Option<String>,
    pub lawyer_notes: Option<String>,
    pub onboarded_at: DateTime<Utc>,
}

impl Case {
    /// Build a case from a validated intake payload
    ///
    /// # Errors
    /// `CoreError::Validation` if required fields are missing
    pub fn from_new(new: NewCase) -> Result<Self, CoreError> {
        new.validate()?;
        Ok(Self {
            id: CaseId::new(),
            name: new.name.trim().to_string(),
            email: new.email.trim().to_string(),
            phone: new.phone,
            category: new.category.trim().to_string(),
            verbal_quality: new.verbal_quality.trim().to_string(),
            incident_date: new.incident_date,
            incident_location: new.incident_location,
            injury_details: new.injury_details,
            medical_expenses: new.medical_expenses,
            insurance_company: new.insurance_company,
            lawyer_notes: new.lawyer_notes,
            onboarded_at: Utc::now(),
        })
    }

    /// Parsed category, if the practice knows it
    #[inline]
    #[must_use]
    pub fn case_category(&self) -> Option<CaseCategory> {
        CaseCategory::parse(&self.category)
    }

    /// Parsed quality tier, if specified
    #[inline]
    #[must_use]
    pub fn quality_tier(&self) -> Option<QualityTier> {
        QualityTier::parse(&self.verbal_quality)
    }
}

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Awaiting User Action")]
    AwaitingUserAction,
    Completed,
}

impl TaskStatus {
    /// Stored value
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::AwaitingUserAction => "Awaiting User Action",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit of onboarding work belonging to exactly one case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub case_id: CaseId,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub status: TaskStatus,
    /// Append-only log
    pub notes: Option<String>,
    pub automation: Option<AutomationDescriptor>,
    /// Bumped on every committed update; guards conditional writes
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a pending task without due date or automation
    #[must_use]
    pub fn new(case_id: CaseId, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::new(),
            case_id,
            description: description.into(),
            due_date: None,
            status: TaskStatus::Pending,
            notes: None,
            automation: None,
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// With due date
    #[inline]
    #[must_use]
    pub fn with_due_date(mut self, due: Option<NaiveDate>) -> Self {
        self.due_date = due;
        self
    }

    /// With automation descriptor
    #[inline]
    #[must_use]
    pub fn with_automation(mut self, automation: AutomationDescriptor) -> Self {
        self.automation = Some(automation);
        self
    }

    /// Overdue is derived, never stored
    #[inline]
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != TaskStatus::Completed && self.due_date.is_some_and(|due| due < today)
    }

    /// Notes with `entry` appended after `separator`
    #[must_use]
    pub fn notes_with(&self, entry: &str, separator: &str) -> String {
        match self.notes.as_deref() {
            Some(existing) if !existing.is_empty() => format!("{existing}{separator}{entry}"),
            _ => entry.to_string(),
        }
    }
}

/// Generated document stored for a case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub case_id: CaseId,
    /// Template identifier the document was generated from
    pub document_type: String,
    /// Opaque object-storage path, never a public URL
    pub storage_path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Create record for a freshly stored object
    #[must_use]
    pub fn new(
        case_id: CaseId,
        document_type: impl Into<String>,
        storage_path: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: DocumentId::new(),
            case_id,
            document_type: document_type.into(),
            storage_path: storage_path.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Firm identity rendered into letters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirmProfile {
    pub name: String,
    pub attorney: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    /// Jurisdiction named in research prompts
    pub jurisdiction: String,
}

impl Default for FirmProfile {
    fn default() -> Self {
        Self {
            name: "[Your Law Firm Name]".to_string(),
            attorney: "[Attorney Name]".to_string(),
            address: "[Firm Address]".to_string(),
            phone: "[Firm Phone]".to_string(),
            email: "[Firm Email]".to_string(),
            jurisdiction: "NJ".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn category_parse_accepts_intake_values() {
        assert_eq!(CaseCategory::parse("MVA"), Some(CaseCategory::MotorVehicle));
        assert_eq!(CaseCategory::parse(" fall "), Some(CaseCategory::Fall));
        assert_eq!(
            CaseCategory::parse("Product Liability"),
            Some(CaseCategory::ProductLiability)
        );
        assert_eq!(CaseCategory::parse("Dog Bite"), None);
    }

    #[test]
    fn quality_parse_aliases() {
        assert_eq!(QualityTier::parse("Bad"), Some(QualityTier::Poor));
        assert_eq!(QualityTier::parse("excellent"), Some(QualityTier::Excellent));
        assert_eq!(QualityTier::parse("N/A"), None);
    }

    #[test]
    fn new_case_validation_reports_all_fields() {
        let err = NewCase::new("", "not-an-email", "", "")
            .validate()
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("name is required"));
        assert!(message.contains("invalid email address"));
        assert!(message.contains("case type is required"));
        assert!(message.contains("verbal quality is required"));
    }

    #[test]
    fn case_keeps_unknown_category_verbatim() {
        let case = Case::from_new(NewCase::new("Jane Roe", "jane@example.com", "Dog Bite", "N/A"))
            .unwrap();
        assert_eq!(case.category, "Dog Bite");
        assert_eq!(case.case_category(), None);
        assert_eq!(case.quality_tier(), None);
    }

    #[test]
    fn overdue_is_derived() {
        let case_id = CaseId::new();
        let today = date(2024, 3, 10);

        let task = Task::new(case_id, "Obtain police report").with_due_date(Some(date(2024, 3, 1)));
        assert!(task.is_overdue(today));

        let mut done = task.clone();
        done.status = TaskStatus::Completed;
        assert!(!done.is_overdue(today));

        let undated = Task::new(case_id, "Collect photos");
        assert!(!undated.is_overdue(today));
    }

    #[test]
    fn notes_append() {
        let mut task = Task::new(CaseId::new(), "Follow up");
        assert_eq!(task.notes_with("first", "\n"), "first");
        task.notes = Some("first".to_string());
        assert_eq!(task.notes_with("second", "\n"), "first\nsecond");
    }

    #[test]
    fn task_status_serializes_display_strings() {
        let json = serde_json::to_string(&TaskStatus::AwaitingUserAction).unwrap();
        assert_eq!(json, "\"Awaiting User Action\"");
        let back: TaskStatus = serde_json::from_str("\"In Progress\"").unwrap();
        assert_eq!(back, TaskStatus::InProgress);
    }

    #[test]
    fn id_parse_rejects_garbage() {
        assert!("not-a-uuid".parse::<TaskId>().is_err());
        let id = CaseId::new();
        assert_eq!(id.to_string().parse::<CaseId>().unwrap(), id);
    }

    #[test]
    fn new_case_from_toml() {
        let raw = r#"
            name = "John Doe"
            email = "john@example.com"
            case_type = "MVA"
            verbal_quality = "Good"
            incident_date = "2024-01-15"
            medical_expenses = 1234.5
        "#;
        let new: NewCase = toml::from_str(raw).unwrap();
        assert_eq!(new.category, "MVA");
        assert_eq!(new.incident_date, Some(date(2024, 1, 15)));
        assert!(new.medical_expenses.is_some());
        assert!(new.validate().is_ok());
    }

    #[test]
    fn email_address_shape() {
        assert!(is_email_address("jane.roe@example.com"));
        assert!(is_email_address("  jane@example.co.uk "));
        assert!(!is_email_address("jane@localhost"));
        assert!(!is_email_address("jane roe@example.com"));
        assert!(!is_email_address("@example.com"));
        assert!(!is_email_address("jane@example."));
    }
}
