//! Letterhead page sets
//!
//! A letterhead is an existing PDF whose pages carry the firm's header
//! graphic. Generated prose is drawn beneath the reserved top margin.

use crate::error::{ComposeError, ComposeResult};
use crate::layout::PageSize;
use crate::pdf;
use lopdf::content::Operation;
use lopdf::{dictionary, Document, Object};
use std::path::Path;

/// Parsed letterhead document and its page sizes
#[derive(Debug, Clone)]
pub struct Letterhead {
    document: Document,
    pages: Vec<PageSize>,
}

impl Letterhead {
    /// Parse letterhead from PDF bytes
    ///
    /// # Errors
    /// - `ComposeError::Pdf` if the bytes are not a readable PDF
    /// - `ComposeError::EmptyLetterhead` if it has no pages
    pub fn from_bytes(bytes: &[u8]) -> ComposeResult<Self> {
        Self::from_document(Document::load_mem(bytes)?)
    }

    /// Read and parse a letterhead file
    ///
    /// # Errors
    /// `ComposeError::LetterheadMissing` if the file does not exist, plus
    /// everything [`Letterhead::from_bytes`] returns
    pub async fn from_path(path: impl AsRef<Path>) -> ComposeResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ComposeError::LetterheadMissing(path.to_path_buf())
            } else {
                ComposeError::io_error(path, e)
            }
        })?;
        let letterhead = Self::from_bytes(&bytes)?;
        tracing::info!(
            path = %path.display(),
            pages = letterhead.page_count(),
            "loaded letterhead"
        );
        Ok(letterhead)
    }

    /// Build a simple letterhead: a colored band with the firm name
    ///
    /// # Errors
    /// `ComposeError::EmptyLetterhead` when `page_count` is zero
    pub fn generated(firm_name: &str, page_count: usize) -> ComposeResult<Self> {
        if page_count == 0 {
            return Err(ComposeError::EmptyLetterhead);
        }

        let size = PageSize::LETTER;
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = pdf::add_helvetica(&mut doc, "Helvetica-Bold");

        let mut kids = Vec::with_capacity(page_count);
        for _ in 0..page_count {
            let band = size.height - 72.0;
            let mut ops = vec![
                Operation::new(
                    "rg",
                    vec![pdf::real(0.15), pdf::real(0.25), pdf::real(0.45)],
                ),
                Operation::new(
                    "re",
                    vec![pdf::real(0.0), pdf::real(band), pdf::real(size.width), pdf::real(72.0)],
                ),
                Operation::new("f", vec![]),
                Operation::new("rg", vec![pdf::real(1.0), pdf::real(1.0), pdf::real(1.0)]),
            ];
            ops.extend(pdf::text_line(b"FHead", 18.0, 72.0, band + 28.0, firm_name));

            let content_id = doc.add_object(pdf::stream(ops)?);
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        #[allow(clippy::cast_possible_wrap)]
        let count = page_count as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    pdf::real(size.width),
                    pdf::real(size.height),
                ],
                "Resources" => dictionary! {
                    "Font" => dictionary! { "FHead" => font_id },
                },
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Self::from_document(doc)
    }

    fn from_document(document: Document) -> ComposeResult<Self> {
        let pages = pdf::page_ids(&document)
            .into_iter()
            .map(|id| pdf::page_size(&document, id))
            .collect::<ComposeResult<Vec<_>>>()?;
        if pages.is_empty() {
            return Err(ComposeError::EmptyLetterhead);
        }
        Ok(Self { document, pages })
    }

    /// Sizes of the letterhead pages, in order
    #[inline]
    #[must_use]
    pub fn page_sizes(&self) -> &[PageSize] {
        &self.pages
    }

    #[inline]
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Fresh copy of the document to draw on
    #[inline]
    pub(crate) fn document(&self) -> Document {
        self.document.clone()
    }

    /// Serialized letterhead
    ///
    /// # Errors
    /// `ComposeError::Pdf` if serialization fails
    pub fn to_bytes(&self) -> ComposeResult<Vec<u8>> {
        let mut doc = self.document();
        let mut out = Vec::new();
        doc.save_to(&mut out).map_err(lopdf::Error::from)?;
        Ok(out)
    }
}
