//! Subcommand implementations

use crate::records::{JsonRepository, OfflineTextGenerator};
use anyhow::Context;
use intake_automation::{
    AutomationRequest, BundleSelection, CasePipeline, CaseRepository, Collaborators,
    LocalObjectStore, PipelineConfig,
};
use intake_compose::{Compositor, Letterhead};
use intake_core::{Case, CaseCategory, CaseId, DocumentId, NewCase, QualityTier, TaskId};
use intake_templates::{
    parse_checklist as parse_seeds, EmbeddedCatalog, LayeredCatalog, TemplateCatalog,
    TemplateRenderer, TemplateResolver,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn load_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::load(path)
            .await
            .with_context(|| format!("loading configuration {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn catalog(config: &PipelineConfig) -> Arc<dyn TemplateCatalog> {
    match &config.template_dir {
        Some(dir) => Arc::new(LayeredCatalog::overlay(dir.clone())),
        None => Arc::new(EmbeddedCatalog::new()),
    }
}

async fn read_case(path: &Path) -> anyhow::Result<NewCase> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading case file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing case file {}", path.display()))
}

async fn open_pipeline(config: PipelineConfig, data_dir: &Path) -> anyhow::Result<CasePipeline> {
    let collaborators = Collaborators::new(
        Arc::new(JsonRepository::new(data_dir.join("records"))),
        Arc::new(LocalObjectStore::new(data_dir.join("documents"))),
        Arc::new(OfflineTextGenerator),
    );
    Ok(CasePipeline::new(config, collaborators).await?)
}

pub(crate) fn resolve(
    config: &PipelineConfig,
    category: &str,
    quality: &str,
    checklists: bool,
) -> anyhow::Result<()> {
    let table = if checklists {
        config.checklist_table()
    } else {
        config.document_table()
    };
    let ids = TemplateResolver::new(table)
        .resolve(CaseCategory::parse(category), QualityTier::parse(quality));
    print_json(&ids)
}

pub(crate) async fn parse_checklist(
    config: &PipelineConfig,
    file: Option<&Path>,
    template: Option<&str>,
) -> anyhow::Result<()> {
    let text = match (file, template) {
        (Some(path), _) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading checklist {}", path.display()))?,
        (None, Some(id)) => catalog(config).load(id).await?.to_string(),
        (None, None) => anyhow::bail!("either a checklist file or --template is required"),
    };
    print_json(&parse_seeds(&text))
}

pub(crate) async fn render(
    config: &PipelineConfig,
    template: &str,
    case_file: &Path,
) -> anyhow::Result<()> {
    let case = Case::from_new(read_case(case_file).await?)?;
    let renderer = TemplateRenderer::new(catalog(config), config.firm.clone());
    println!("{}", renderer.render(template, &case).await?);
    Ok(())
}

pub(crate) async fn compose(
    config: &PipelineConfig,
    input: &Path,
    letterhead: Option<&Path>,
    output: &Path,
) -> anyhow::Result<()> {
    let markup = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("reading {}", input.display()))?;
    let letterhead = match letterhead.or(config.letterhead_path.as_deref()) {
        Some(path) => Letterhead::from_path(path).await?,
        None => Letterhead::generated(&config.firm.name, 1)?,
    };

    let bytes = Compositor::new(config.layout).compose_markup(&markup, &letterhead)?;
    tokio::fs::write(output, &bytes)
        .await
        .with_context(|| format!("writing {}", output.display()))?;
    info!(output = %output.display(), bytes = bytes.len(), "composed document");
    Ok(())
}

pub(crate) async fn intake(
    config: PipelineConfig,
    case_file: &Path,
    data_dir: &Path,
) -> anyhow::Result<()> {
    let new_case = read_case(case_file).await?;
    let pipeline = open_pipeline(config, data_dir).await?;
    let report = pipeline.onboard(new_case).await?;

    for failure in &report.failures {
        warn!(
            case_id = %report.case.id,
            stage = ?failure.stage,
            template = failure.template.as_deref().unwrap_or("-"),
            "{}",
            failure.message
        );
    }
    print_json(&report)
}

pub(crate) async fn tasks(
    config: PipelineConfig,
    case_id: CaseId,
    data_dir: &Path,
) -> anyhow::Result<()> {
    let pipeline = open_pipeline(config, data_dir).await?;
    print_json(&pipeline.tasks(case_id).await?)
}

pub(crate) async fn dispatch(
    config: PipelineConfig,
    task_id: TaskId,
    data_dir: &Path,
) -> anyhow::Result<()> {
    let repository = JsonRepository::new(data_dir.join("records"));
    let task = repository
        .get_task(task_id)
        .await?
        .with_context(|| format!("task {task_id} not found"))?;
    let request = AutomationRequest::for_task(&task)?;

    let pipeline = open_pipeline(config, data_dir).await?;
    print_json(&pipeline.dispatch(request).await?)
}

pub(crate) async fn regenerate(
    config: PipelineConfig,
    document_id: DocumentId,
    data_dir: &Path,
) -> anyhow::Result<()> {
    let pipeline = open_pipeline(config, data_dir).await?;
    let regenerated = pipeline.regenerate_document(document_id).await?;
    print_json(&regenerated.document)
}

pub(crate) async fn bundle(
    config: PipelineConfig,
    selection: BundleSelection,
    output: Option<&Path>,
    data_dir: &Path,
) -> anyhow::Result<()> {
    let pipeline = open_pipeline(config, data_dir).await?;
    let bundle = pipeline.bundle_documents(selection).await?;
    let output = output.map_or_else(|| Path::new(&bundle.filename).to_path_buf(), Path::to_path_buf);
    tokio::fs::write(&output, &bundle.bytes)
        .await
        .with_context(|| format!("writing {}", output.display()))?;
    info!(output = %output.display(), entries = bundle.entries.len(), "wrote document bundle");
    print_json(&bundle.entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CASE_TOML: &str = r#"
name = "Jane Roe"
email = "jane.roe@example.com"
category = "MVA"
verbal_quality = "Good"
incident_date = "2024-03-09"
injury_details = "Rear-ended at a red light"
"#;

    #[tokio::test]
    async fn case_file_parses_into_new_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case.toml");
        tokio::fs::write(&path, CASE_TOML).await.unwrap();

        let case = read_case(&path).await.unwrap();
        assert_eq!(case.name, "Jane Roe");
        assert_eq!(case.category, "MVA");
        assert!(case.incident_date.is_some());
    }

    #[tokio::test]
    async fn intake_writes_records_and_documents() {
        let dir = tempfile::tempdir().unwrap();
        let case_path = dir.path().join("case.toml");
        tokio::fs::write(&case_path, CASE_TOML).await.unwrap();
        let data_dir = dir.path().join("data");

        let pipeline = open_pipeline(PipelineConfig::default(), &data_dir)
            .await
            .unwrap();
        let report = pipeline
            .onboard(read_case(&case_path).await.unwrap())
            .await
            .unwrap();

        assert!(report.is_complete(), "{:?}", report.failures);
        assert_eq!(report.documents.len(), 4);
        for document in &report.documents {
            let stored = data_dir.join("documents").join(&document.storage_path);
            assert!(stored.is_file(), "{}", stored.display());
        }
        assert_eq!(
            pipeline.tasks(report.case.id).await.unwrap().len(),
            report.tasks.len()
        );
    }

    #[tokio::test]
    async fn suggestion_dispatch_is_unavailable_offline() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = open_pipeline(PipelineConfig::default(), dir.path())
            .await
            .unwrap();
        let report = pipeline
            .onboard(NewCase::new("John Doe", "john@example.com", "Other", "N/A"))
            .await
            .unwrap();
        let task = report
            .tasks
            .iter()
            .find(|t| t.description == "Research statute of limitations")
            .unwrap();

        let err = pipeline
            .dispatch(AutomationRequest::for_task(task).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 503);
    }

    #[tokio::test]
    async fn bundle_writes_archive_of_case_documents() {
        let dir = tempfile::tempdir().unwrap();
        let case_path = dir.path().join("case.toml");
        tokio::fs::write(&case_path, CASE_TOML).await.unwrap();
        let data_dir = dir.path().join("data");

        let pipeline = open_pipeline(PipelineConfig::default(), &data_dir)
            .await
            .unwrap();
        let report = pipeline
            .onboard(read_case(&case_path).await.unwrap())
            .await
            .unwrap();

        let output = dir.path().join("bundle.zip");
        bundle(
            PipelineConfig::default(),
            BundleSelection::Case(report.case.id),
            Some(&output),
            &data_dir,
        )
        .await
        .unwrap();

        let file = std::fs::File::open(&output).unwrap();
        let archive = zip::ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), report.documents.len());
    }
}
