//! Pipeline configuration
//!
//! Loaded from TOML (or YAML by file extension). Every field has a default,
//! so an empty file yields the built-in pipeline.

use crate::error::{PipelineError, PipelineResult};
use crate::rules::{builtin_rules, AutomationRule};
use intake_compose::LayoutSettings;
use intake_core::FirmProfile;
use intake_templates::TierTable;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for the whole pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Firm identity rendered into letters and prompts
    pub firm: FirmProfile,
    /// Directory overriding built-in templates (`<id>.md`)
    pub template_dir: Option<PathBuf>,
    /// Letterhead PDF; a plain generated letterhead is used when unset
    pub letterhead_path: Option<PathBuf>,
    pub layout: LayoutSettings,
    pub email: EmailSettings,
    pub ai: AiSettings,
    /// Upper bound for one automation invocation
    pub request_timeout_secs: u64,
    /// Maximum cached template sources
    pub template_cache_capacity: u64,
    /// Replaces the built-in document tier table
    pub document_tiers: Option<TierTable>,
    /// Replaces the built-in checklist tier table
    pub checklist_tiers: Option<TierTable>,
    pub automation_rules: Vec<AutomationRule>,
}

/// Outbound mail settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    pub from_address: String,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            from_address: "onboarding@localhost".to_string(),
        }
    }
}

/// Text generator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    /// Model for consultation, research and checklist prompts
    pub model: String,
    /// Cheaper model for one-line generic suggestions
    pub generic_model: String,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            generic_model: "gpt-3.5-turbo".to_string(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            firm: FirmProfile::default(),
            template_dir: None,
            letterhead_path: None,
            layout: LayoutSettings::default(),
            email: EmailSettings::default(),
            ai: AiSettings::default(),
            request_timeout_secs: 60,
            template_cache_capacity: 256,
            document_tiers: None,
            checklist_tiers: None,
            automation_rules: builtin_rules(),
        }
    }
}

impl PipelineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// `PipelineError::Config` on malformed TOML
    pub fn from_toml_str(text: &str) -> PipelineResult<Self> {
        toml::from_str(text).map_err(|e| PipelineError::config("<inline>", e))
    }

    /// Load from a `.toml`, `.yaml` or `.yml` file
    ///
    /// # Errors
    /// `PipelineError::Config` if the file cannot be read or parsed
    pub async fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PipelineError::config(path, e))?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        let config: Self = if is_yaml {
            serde_yaml::from_str(&text).map_err(|e| PipelineError::config(path, e))?
        } else {
            toml::from_str(&text).map_err(|e| PipelineError::config(path, e))?
        };

        tracing::info!(
            path = %path.display(),
            rules = config.automation_rules.len(),
            "loaded pipeline configuration"
        );
        Ok(config)
    }

    /// With firm identity
    #[inline]
    #[must_use]
    pub fn with_firm(mut self, firm: FirmProfile) -> Self {
        self.firm = firm;
        self
    }

    /// With template override directory
    #[inline]
    #[must_use]
    pub fn with_template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dir = Some(dir.into());
        self
    }

    /// With letterhead file
    #[inline]
    #[must_use]
    pub fn with_letterhead(mut self, path: impl Into<PathBuf>) -> Self {
        self.letterhead_path = Some(path.into());
        self
    }

    /// With layout parameters
    #[inline]
    #[must_use]
    pub fn with_layout(mut self, layout: LayoutSettings) -> Self {
        self.layout = layout;
        self
    }

    /// With sender address
    #[inline]
    #[must_use]
    pub fn with_from_address(mut self, from: impl Into<String>) -> Self {
        self.email.from_address = from.into();
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// With document tier table
    #[inline]
    #[must_use]
    pub fn with_document_tiers(mut self, table: TierTable) -> Self {
        self.document_tiers = Some(table);
        self
    }

    /// With checklist tier table
    #[inline]
    #[must_use]
    pub fn with_checklist_tiers(mut self, table: TierTable) -> Self {
        self.checklist_tiers = Some(table);
        self
    }

    /// With automation rules, replacing the built-in set
    #[inline]
    #[must_use]
    pub fn with_automation_rules(mut self, rules: Vec<AutomationRule>) -> Self {
        self.automation_rules = rules;
        self
    }

    /// Request timeout as a duration
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Document tier table in effect
    #[must_use]
    pub fn document_table(&self) -> TierTable {
        self.document_tiers.clone().unwrap_or_else(TierTable::documents)
    }

    /// Checklist tier table in effect
    #[must_use]
    pub fn checklist_table(&self) -> TierTable {
        self.checklist_tiers.clone().unwrap_or_else(TierTable::checklists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::AutomationKind;
    use tempfile::TempDir;

    #[test]
    fn empty_toml_is_default() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.automation_rules.len(), builtin_rules().len());
    }

    #[test]
    fn partial_toml_overrides() {
        let config = PipelineConfig::from_toml_str(
            r#"
            request_timeout_secs = 5
            letterhead_path = "assets/letterhead.pdf"

            [firm]
            name = "Roe & Partners LLP"
            jurisdiction = "New York"

            [layout]
            font_size = 12.0

            [[automation_rules]]
            description = "Order hospital records"
            kind = "DOC_GENERATION"
            config = "records-request"
            "#,
        )
        .unwrap();

        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.firm.name, "Roe & Partners LLP");
        assert_eq!(config.firm.attorney, "[Attorney Name]");
        assert!((config.layout.font_size - 12.0).abs() < f64::EPSILON);
        assert!((config.layout.margin_top - 100.0).abs() < f64::EPSILON);
        assert_eq!(config.automation_rules.len(), 1);
        assert_eq!(config.automation_rules[0].kind, AutomationKind::DocumentGeneration);
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = PipelineConfig::from_toml_str("request_timeout_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, PipelineError::Config { .. }));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn builders() {
        let config = PipelineConfig::new()
            .with_from_address("intake@roe.law")
            .with_request_timeout_secs(10)
            .with_template_dir("/srv/templates")
            .with_automation_rules(Vec::new());
        assert_eq!(config.email.from_address, "intake@roe.law");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(config.automation_rules.is_empty());
        assert_eq!(config.document_table(), TierTable::documents());
    }

    #[tokio::test]
    async fn loads_yaml_by_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pipeline.yaml");
        std::fs::write(&path, "firm:\n  name: Doe Law\nrequest_timeout_secs: 30\n").unwrap();

        let config = PipelineConfig::load(&path).await.unwrap();
        assert_eq!(config.firm.name, "Doe Law");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[tokio::test]
    async fn missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let err = PipelineConfig::load(dir.path().join("absent.toml")).await.unwrap_err();
        assert!(matches!(err, PipelineError::Config { .. }));
    }
}
