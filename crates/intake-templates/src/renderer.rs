//! Handlebars rendering of document templates
//!
//! Output is prose, not HTML, so escaping is disabled.

use crate::catalog::TemplateCatalog;
use crate::context::CaseContext;
use crate::error::{TemplateError, TemplateResult};
use handlebars::Handlebars;
use intake_core::{Case, FirmProfile};
use serde::Serialize;
use std::sync::Arc;

/// Renders catalog templates against a case context
pub struct TemplateRenderer {
    catalog: Arc<dyn TemplateCatalog>,
    firm: FirmProfile,
    handlebars: Handlebars<'static>,
}

impl std::fmt::Debug for TemplateRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRenderer")
            .field("catalog", &self.catalog.name())
            .field("firm", &self.firm.name)
            .finish_non_exhaustive()
    }
}

impl TemplateRenderer {
    /// Create renderer over a catalog
    #[must_use]
    pub fn new(catalog: Arc<dyn TemplateCatalog>, firm: FirmProfile) -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_helper("uppercase", Box::new(uppercase_helper));
        handlebars.register_helper("lowercase", Box::new(lowercase_helper));

        Self {
            catalog,
            firm,
            handlebars,
        }
    }

    /// Template catalog in use
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &Arc<dyn TemplateCatalog> {
        &self.catalog
    }

    /// Firm identity placed into every context
    #[inline]
    #[must_use]
    pub fn firm(&self) -> &FirmProfile {
        &self.firm
    }

    /// Context for a case, dated today
    #[inline]
    #[must_use]
    pub fn context(&self, case: &Case) -> CaseContext {
        CaseContext::new(case, &self.firm)
    }

    /// Render template `id` for `case`
    ///
    /// # Errors
    /// - `TemplateError::NotFound` if no template backs the id
    /// - `TemplateError::Render` on malformed template syntax
    pub async fn render(&self, id: &str, case: &Case) -> TemplateResult<String> {
        self.render_with(id, &self.context(case)).await
    }

    /// Render template `id` against any serializable context
    ///
    /// # Errors
    /// See [`TemplateRenderer::render`]
    pub async fn render_with<C>(&self, id: &str, context: &C) -> TemplateResult<String>
    where
        C: Serialize + Sync,
    {
        let source = self.catalog.load(id).await?;
        let rendered = self.render_source(id, &source, context)?;
        tracing::debug!(template = id, bytes = rendered.len(), "rendered template");
        Ok(rendered)
    }

    /// Render raw template text
    ///
    /// # Errors
    /// `TemplateError::Render` on malformed template syntax
    pub fn render_source<C: Serialize>(
        &self,
        id: &str,
        source: &str,
        context: &C,
    ) -> TemplateResult<String> {
        self.handlebars
            .render_template(source, context)
            .map_err(|e| TemplateError::render(id, e))
    }
}

fn uppercase_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let param = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    out.write(&param.to_uppercase())?;
    Ok(())
}

fn lowercase_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let param = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    out.write(&param.to_lowercase())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EmbeddedCatalog;
    use intake_core::NewCase;
    use pretty_assertions::assert_eq;

    fn renderer(catalog: EmbeddedCatalog) -> TemplateRenderer {
        TemplateRenderer::new(Arc::new(catalog), FirmProfile::default())
    }

    fn case() -> Case {
        Case::from_new(NewCase::new("Jane O'Roe", "jane@example.com", "MVA", "Good")).unwrap()
    }

    #[tokio::test]
    async fn absent_field_renders_placeholder() {
        let renderer = renderer(
            EmbeddedCatalog::empty().with_template("t", "Injuries: {{injuryDetails}}"),
        );
        let out = renderer.render("t", &case()).await.unwrap();
        assert_eq!(out, "Injuries: [Not Provided]");
    }

    #[tokio::test]
    async fn no_html_escaping() {
        let renderer = renderer(
            EmbeddedCatalog::empty().with_template("t", "Dear {{clientName}} & family"),
        );
        let out = renderer.render("t", &case()).await.unwrap();
        assert_eq!(out, "Dear Jane O'Roe & family");
    }

    #[tokio::test]
    async fn unknown_template_is_not_found() {
        let renderer = renderer(EmbeddedCatalog::empty());
        let err = renderer.render("ghost", &case()).await.unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(id) if id == "ghost"));
    }

    #[tokio::test]
    async fn malformed_template_is_render_error() {
        let renderer = renderer(EmbeddedCatalog::empty().with_template("bad", "{{#if clientName}}open"));
        let err = renderer.render("bad", &case()).await.unwrap_err();
        assert!(matches!(err, TemplateError::Render { template, .. } if template == "bad"));
    }

    #[tokio::test]
    async fn uppercase_helper_applies() {
        let renderer =
            renderer(EmbeddedCatalog::empty().with_template("t", "RE: {{uppercase caseType}}"));
        let out = renderer.render("t", &case()).await.unwrap();
        assert_eq!(out, "RE: MVA");
    }

    #[tokio::test]
    async fn builtin_representation_letter_renders() {
        let renderer = renderer(EmbeddedCatalog::new());
        let out = renderer.render("representation-letter", &case()).await.unwrap();
        assert!(out.contains("Jane O'Roe"));
        assert!(!out.contains("{{"));
    }
}
