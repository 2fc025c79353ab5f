use crate::fakes::{InMemoryRepository, MemoryObjectStore, RecordingMailer, ScriptedTextGenerator};
use chrono::NaiveDate;
use intake_automation::Collaborators;
use intake_compose::Letterhead;
use intake_core::{FirmProfile, NewCase};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Firm used across tests
#[must_use]
pub fn firm() -> FirmProfile {
    FirmProfile {
        name: "Roe & Partners LLP".to_string(),
        attorney: "Alex Roe, Esq.".to_string(),
        address: "1 Broad Street, Newark, NJ".to_string(),
        phone: "(973) 555-0100".to_string(),
        email: "intake@roepartners.example".to_string(),
        jurisdiction: "NJ".to_string(),
    }
}

/// Fully populated motor-vehicle case with a good verbal account
#[must_use]
pub fn mva_good_case() -> NewCase {
    let mut case = NewCase::new("Jane Roe", "jane.roe@example.com", "MVA", "Good")
        .with_injury_details("Rear-ended at a red light; neck and shoulder pain")
        .with_medical_expenses(Decimal::new(123_450, 2))
        .with_insurance_company("Garden State Mutual");
    if let Some(date) = NaiveDate::from_ymd_opt(2024, 3, 9) {
        case = case.with_incident_date(date);
    }
    case.phone = Some("(201) 555-0199".to_string());
    case.incident_location = Some("Route 1 and Main Street, Edison".to_string());
    case
}

/// Case with only the required fields
#[must_use]
pub fn minimal_case(category: &str, quality: &str) -> NewCase {
    NewCase::new("John Doe", "john.doe@example.com", category, quality)
}

/// One-page generated letterhead
///
/// # Panics
/// Never for the fixed arguments used here
#[must_use]
pub fn letterhead() -> Letterhead {
    Letterhead::generated(&firm().name, 1).expect("one-page letterhead")
}

/// Fakes plus the collaborator bundle built from them
#[derive(Debug, Clone)]
pub struct TestCollaborators {
    pub repository: Arc<InMemoryRepository>,
    pub store: Arc<MemoryObjectStore>,
    pub text: Arc<ScriptedTextGenerator>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestCollaborators {
    /// Bundle without the mailer
    #[must_use]
    pub fn without_mailer(&self) -> Collaborators {
        Collaborators::new(
            Arc::clone(&self.repository) as _,
            Arc::clone(&self.store) as _,
            Arc::clone(&self.text) as _,
        )
    }

    /// Bundle including the recording mailer
    #[must_use]
    pub fn with_mailer(&self) -> Collaborators {
        self.without_mailer()
            .with_mailer(Arc::clone(&self.mailer) as _)
    }
}

/// Fresh fakes with the default scripted completion
#[must_use]
pub fn test_collaborators() -> TestCollaborators {
    test_collaborators_with(ScriptedTextGenerator::default())
}

/// Fresh fakes around a specific text generator
#[must_use]
pub fn test_collaborators_with(text: ScriptedTextGenerator) -> TestCollaborators {
    TestCollaborators {
        repository: Arc::new(InMemoryRepository::new()),
        store: Arc::new(MemoryObjectStore::new()),
        text: Arc::new(text),
        mailer: Arc::new(RecordingMailer::new()),
    }
}
