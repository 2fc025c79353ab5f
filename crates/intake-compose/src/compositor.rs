//! Text onto letterhead
//!
//! Composition runs in two steps: [`layout::plan`](crate::layout::plan)
//! places the lines, then the plan is drawn into a copy of the letterhead.

use crate::error::ComposeResult;
use crate::layout::{self, LayoutPlan, LayoutSettings, PageSource};
use crate::letterhead::Letterhead;
use crate::normalize::normalize;
use crate::pdf;

/// MIME type of composed documents
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Draws plain text onto letterhead pages
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    settings: LayoutSettings,
}

impl Compositor {
    #[inline]
    #[must_use]
    pub fn new(settings: LayoutSettings) -> Self {
        Self { settings }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    /// Line placement for `plain` on `letterhead`
    #[must_use]
    pub fn plan(&self, plain: &str, letterhead: &Letterhead) -> LayoutPlan {
        layout::plan(plain, letterhead.page_sizes(), &self.settings)
    }

    /// Compose plain text into PDF bytes
    ///
    /// Letterhead pages are used in order; overflow goes to appended pages
    /// without the header graphic.
    ///
    /// # Errors
    /// `ComposeError` if the letterhead page tree cannot be extended or the
    /// document cannot be serialized
    pub fn compose(&self, plain: &str, letterhead: &Letterhead) -> ComposeResult<Vec<u8>> {
        let plan = self.plan(plain, letterhead);
        let mut doc = letterhead.document();
        let letterhead_pages = pdf::page_ids(&doc);
        let font_id = pdf::add_helvetica(&mut doc, "Helvetica");

        for page in &plan.pages {
            let page_id = match page.source {
                PageSource::Letterhead(i) => letterhead_pages[i],
                PageSource::Blank => pdf::append_page(&mut doc, page.size)?,
            };
            if page.lines.is_empty() && page.source != PageSource::Blank {
                continue;
            }

            pdf::ensure_font(&mut doc, page_id, font_id)?;
            let mut ops = vec![lopdf::content::Operation::new(
                "rg",
                vec![pdf::real(0.0), pdf::real(0.0), pdf::real(0.0)],
            )];
            for line in &page.lines {
                ops.extend(pdf::text_line(
                    pdf::BODY_FONT,
                    self.settings.font_size,
                    line.x,
                    line.y,
                    &line.text,
                ));
            }
            pdf::append_content(&mut doc, page_id, ops)?;
        }

        let mut out = Vec::new();
        doc.save_to(&mut out).map_err(lopdf::Error::from)?;
        tracing::debug!(
            pages = plan.pages.len(),
            blank_pages = plan.blank_pages(),
            lines = plan.line_count(),
            bytes = out.len(),
            "composed document"
        );
        Ok(out)
    }

    /// Normalize markup, then compose
    ///
    /// # Errors
    /// See [`Compositor::compose`]
    pub fn compose_markup(&self, markup: &str, letterhead: &Letterhead) -> ComposeResult<Vec<u8>> {
        self.compose(&normalize(markup), letterhead)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PageSize;

    fn letterhead(pages: usize) -> Letterhead {
        Letterhead::generated("Roe & Partners LLP", pages).unwrap()
    }

    fn page_count(bytes: &[u8]) -> usize {
        lopdf::Document::load_mem(bytes).unwrap().get_pages().len()
    }

    #[test]
    fn short_text_keeps_page_count() {
        let bytes = Compositor::default()
            .compose("Dear Adjuster, please see enclosed.", &letterhead(1))
            .unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert_eq!(page_count(&bytes), 1);
    }

    #[test]
    fn long_text_adds_blank_pages() {
        let compositor = Compositor::default();
        let word = "x".repeat(compositor.settings().chars_per_line(612.0));
        let text = vec![word.as_str(); 100].join(" ");

        let bytes = compositor.compose(&text, &letterhead(1)).unwrap();
        assert_eq!(page_count(&bytes), 3);

        let reparsed = Letterhead::from_bytes(&bytes).unwrap();
        assert!(reparsed.page_sizes().iter().all(|s| *s == PageSize::LETTER));
    }

    #[test]
    fn second_letterhead_page_used_before_blank() {
        let compositor = Compositor::default();
        let word = "x".repeat(compositor.settings().chars_per_line(612.0));
        let text = vec![word.as_str(); 60].join(" ");

        let plan = compositor.plan(&text, &letterhead(2));
        assert_eq!(plan.blank_pages(), 0);

        let bytes = compositor.compose(&text, &letterhead(2)).unwrap();
        assert_eq!(page_count(&bytes), 2);
    }

    #[test]
    fn drawn_text_is_in_content() {
        let bytes = Compositor::default()
            .compose_markup("# Notice\n\n- item one", &letterhead(1))
            .unwrap();
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let content = doc.get_page_content(page_id).unwrap();
        let text = String::from_utf8_lossy(&content);
        assert!(text.contains("NOTICE"));
        assert!(text.contains("item one"));
    }

    #[test]
    fn empty_text_composes_untouched_letterhead() {
        let bytes = Compositor::default().compose("", &letterhead(2)).unwrap();
        assert_eq!(page_count(&bytes), 2);
    }
}
