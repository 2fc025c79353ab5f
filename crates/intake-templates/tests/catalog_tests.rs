//! Built-in catalog coverage and directory overrides

use chrono::NaiveDate;
use intake_core::{Case, CaseCategory, FirmProfile, NewCase, QualityTier};
use intake_templates::{
    parse_checklist, CachedCatalog, EmbeddedCatalog, LayeredCatalog, TemplateCatalog,
    TemplateRenderer, TemplateResolver, TierTable,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use std::sync::Arc;

fn full_case(category: CaseCategory, quality: QualityTier) -> Case {
    let mut new = NewCase::new("Jane Roe", "jane@example.com", category.as_str(), quality.as_str())
        .with_injury_details("Fractured wrist")
        .with_medical_expenses(Decimal::new(123_450, 2))
        .with_insurance_company("Garden State Mutual");
    if let Some(date) = NaiveDate::from_ymd_opt(2024, 3, 9) {
        new = new.with_incident_date(date);
    }
    Case::from_new(new).unwrap()
}

#[tokio::test]
async fn every_resolved_document_renders() {
    let renderer = TemplateRenderer::new(Arc::new(EmbeddedCatalog::new()), FirmProfile::default());
    let resolver = TemplateResolver::new(TierTable::documents());

    for category in CaseCategory::ALL {
        for quality in QualityTier::ALL {
            let case = full_case(category, quality);
            for id in resolver.resolve(Some(category), Some(quality)) {
                let prose = renderer.render(&id, &case).await.unwrap();
                assert!(!prose.contains("{{"), "{id} left a placeholder");
                assert!(prose.contains("Jane Roe"), "{id} lacks the client name");
            }
        }
    }
}

#[tokio::test]
async fn every_resolved_checklist_yields_tasks() {
    let catalog = EmbeddedCatalog::new();
    let resolver = TemplateResolver::new(TierTable::checklists());

    for category in CaseCategory::ALL {
        for quality in QualityTier::ALL {
            for id in resolver.resolve(Some(category), Some(quality)) {
                let source = catalog.load(&id).await.unwrap();
                assert!(!parse_checklist(&source).is_empty(), "{id} has no tasks");
            }
        }
    }
}

#[tokio::test]
async fn rendered_letter_carries_derived_fields() {
    let renderer = TemplateRenderer::new(Arc::new(EmbeddedCatalog::new()), FirmProfile::default());
    let case = full_case(CaseCategory::MotorVehicle, QualityTier::Good);

    let prose = renderer.render("demand-letter", &case).await.unwrap();
    assert!(prose.contains("$1,234.50"));
    assert!(prose.contains("March 9, 2024"));
}

#[tokio::test]
async fn directory_template_overrides_builtin() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(
        dir.path().join("representation-letter.md"),
        "Custom letter for {{clientName}}",
    )
    .await
    .unwrap();

    let layered: Arc<dyn TemplateCatalog> = Arc::new(LayeredCatalog::overlay(dir.path()));
    let catalog = Arc::new(CachedCatalog::new(layered, 16));
    let renderer = TemplateRenderer::new(catalog.clone(), FirmProfile::default());
    let case = full_case(CaseCategory::Other, QualityTier::Average);

    let custom = renderer.render("representation-letter", &case).await.unwrap();
    assert_eq!(custom, "Custom letter for Jane Roe");

    let builtin = renderer.render("demand-letter", &case).await.unwrap();
    assert!(builtin.contains("Jane Roe"));
    assert!(catalog.load("settlement-brochure").await.is_err());
}
