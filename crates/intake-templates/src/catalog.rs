//! Template catalogs
//!
//! A catalog maps a template id to its source text. Three implementations:
//! - [`FsCatalog`]: `<root>/<id>.md` on disk
//! - [`EmbeddedCatalog`]: templates compiled into the binary
//! - [`LayeredCatalog`]: first catalog that knows the id wins

use crate::error::{TemplateError, TemplateResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Template identifier, e.g. `demand-letter`
pub type TemplateId = String;

/// Source of template text
#[async_trait::async_trait]
pub trait TemplateCatalog: Send + Sync {
    /// Load template source by id
    ///
    /// # Errors
    /// `TemplateError::NotFound` when no resource backs the id
    async fn load(&self, id: &str) -> TemplateResult<Arc<str>>;

    /// Short name for logging
    fn name(&self) -> &'static str;
}

/// Reject ids that could escape the catalog root
///
/// # Errors
/// `TemplateError::InvalidId` unless the id is non-empty `[A-Za-z0-9_-]`
pub fn validate_id(id: &str) -> TemplateResult<()> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(TemplateError::InvalidId(id.to_string()))
    }
}

/// Templates stored as markdown files under a directory
#[derive(Debug, Clone)]
pub struct FsCatalog {
    root: PathBuf,
}

impl FsCatalog {
    /// Create catalog rooted at `root`
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Catalog root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.md"))
    }
}

#[async_trait::async_trait]
impl TemplateCatalog for FsCatalog {
    async fn load(&self, id: &str) -> TemplateResult<Arc<str>> {
        validate_id(id)?;
        let path = self.path_for(id);
        match tokio::fs::read_to_string(&path).await {
            Ok(source) => {
                tracing::debug!(template = id, path = %path.display(), "loaded template from disk");
                Ok(Arc::from(source))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(TemplateError::NotFound(id.to_string()))
            }
            Err(e) => Err(TemplateError::io_error(path, e)),
        }
    }

    fn name(&self) -> &'static str {
        "fs"
    }
}

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (
        "representation-letter",
        include_str!("../templates/representation-letter.md"),
    ),
    (
        "insurance-notice-letter",
        include_str!("../templates/insurance-notice-letter.md"),
    ),
    ("demand-letter", include_str!("../templates/demand-letter.md")),
    (
        "demand-letter-high-estimate",
        include_str!("../templates/demand-letter-high-estimate.md"),
    ),
    (
        "evidence-preservation-letter",
        include_str!("../templates/evidence-preservation-letter.md"),
    ),
    (
        "initial-consult-email",
        include_str!("../templates/initial-consult-email.md"),
    ),
    (
        "interview-witness",
        include_str!("../templates/interview-witness.md"),
    ),
    ("tasks-generic", include_str!("../templates/tasks-generic.md")),
    (
        "tasks-initial-mva-good-verbal",
        include_str!("../templates/tasks-initial-mva-good-verbal.md"),
    ),
    (
        "tasks-initial-mva-bad-verbal",
        include_str!("../templates/tasks-initial-mva-bad-verbal.md"),
    ),
    (
        "tasks-initial-mva-zero",
        include_str!("../templates/tasks-initial-mva-zero.md"),
    ),
    (
        "tasks-initial-good-verbal",
        include_str!("../templates/tasks-initial-good-verbal.md"),
    ),
];

/// In-memory templates, seeded with the built-in set
#[derive(Debug, Clone)]
pub struct EmbeddedCatalog {
    templates: HashMap<TemplateId, Arc<str>>,
}

impl EmbeddedCatalog {
    /// Create catalog holding the built-in templates
    #[must_use]
    pub fn new() -> Self {
        Self {
            templates: BUILTIN_TEMPLATES
                .iter()
                .map(|(id, source)| ((*id).to_string(), Arc::from(*source)))
                .collect(),
        }
    }

    /// Create catalog with no templates
    #[must_use]
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Add or replace a template
    #[must_use]
    pub fn with_template(mut self, id: impl Into<TemplateId>, source: impl AsRef<str>) -> Self {
        self.templates.insert(id.into(), Arc::from(source.as_ref()));
        self
    }

    /// Known template ids, sorted
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for EmbeddedCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TemplateCatalog for EmbeddedCatalog {
    async fn load(&self, id: &str) -> TemplateResult<Arc<str>> {
        self.templates
            .get(id)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))
    }

    fn name(&self) -> &'static str {
        "embedded"
    }
}

/// Catalogs consulted in order until one knows the id
#[derive(Clone, Default)]
pub struct LayeredCatalog {
    layers: Vec<Arc<dyn TemplateCatalog>>,
}

impl std::fmt::Debug for LayeredCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayeredCatalog")
            .field(
                "layers",
                &self.layers.iter().map(|l| l.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl LayeredCatalog {
    /// Create catalog with no layers
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a lower-priority layer
    #[must_use]
    pub fn with_layer(mut self, layer: Arc<dyn TemplateCatalog>) -> Self {
        self.layers.push(layer);
        self
    }

    /// Directory overrides on top of the built-in templates
    #[must_use]
    pub fn overlay(root: impl Into<PathBuf>) -> Self {
        Self::new()
            .with_layer(Arc::new(FsCatalog::new(root)))
            .with_layer(Arc::new(EmbeddedCatalog::new()))
    }
}

#[async_trait::async_trait]
impl TemplateCatalog for LayeredCatalog {
    async fn load(&self, id: &str) -> TemplateResult<Arc<str>> {
        for layer in &self.layers {
            match layer.load(id).await {
                Err(TemplateError::NotFound(_)) => continue,
                other => return other,
            }
        }
        Err(TemplateError::NotFound(id.to_string()))
    }

    fn name(&self) -> &'static str {
        "layered"
    }
}
