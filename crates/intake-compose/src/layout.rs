//! Line wrapping and page placement
//!
//! Pure geometry: no PDF types here. The wrap width is estimated from the
//! character count (`usable_width / (font_size * width_factor)`) instead of
//! measured glyph widths, so lines may end a little short of the margin.

use serde::{Deserialize, Serialize};

/// Margins, font and spacing for composed text, in PDF points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub font_size: f64,
    pub line_height: f64,
    /// Average glyph width as a fraction of the font size
    pub width_factor: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            margin_top: 100.0,
            margin_bottom: 50.0,
            margin_left: 72.0,
            margin_right: 72.0,
            font_size: 11.0,
            line_height: 15.0,
            width_factor: 0.6,
        }
    }
}

impl LayoutSettings {
    /// With margins (top, bottom, left, right)
    #[must_use]
    pub fn with_margins(mut self, top: f64, bottom: f64, left: f64, right: f64) -> Self {
        self.margin_top = top;
        self.margin_bottom = bottom;
        self.margin_left = left;
        self.margin_right = right;
        self
    }

    /// With font size and line height
    #[must_use]
    pub fn with_font(mut self, font_size: f64, line_height: f64) -> Self {
        self.font_size = font_size;
        self.line_height = line_height;
        self
    }

    /// Estimated characters that fit between the side margins
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn chars_per_line(&self, page_width: f64) -> usize {
        let usable = page_width - self.margin_left - self.margin_right;
        let glyph = self.font_size * self.width_factor;
        if usable <= 0.0 || glyph <= 0.0 {
            return 0;
        }
        (usable / glyph).floor() as usize
    }
}

/// Page dimensions in PDF points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// US Letter, portrait
    pub const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };

    #[inline]
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Where a planned page comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSource {
    /// Index into the letterhead's pages
    Letterhead(usize),
    /// Appended page without header graphic
    Blank,
}

/// One line of text at its baseline position
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Lines drawn on one page
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub source: PageSource,
    pub size: PageSize,
    pub lines: Vec<PlacedLine>,
}

/// Complete placement of a text onto a page set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutPlan {
    pub pages: Vec<PagePlan>,
}

impl LayoutPlan {
    /// Pages appended beyond the letterhead
    #[must_use]
    pub fn blank_pages(&self) -> usize {
        self.pages
            .iter()
            .filter(|p| p.source == PageSource::Blank)
            .count()
    }

    /// Total lines placed
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.pages.iter().map(|p| p.lines.len()).sum()
    }
}

/// Greedy word wrap against a character budget
///
/// All whitespace separates words, so paragraph breaks are not kept. A word
/// longer than the budget gets a line of its own.
#[must_use]
pub fn wrap_words(text: &str, budget: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate_len = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if current.is_empty() || candidate_len < budget {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Place `text` onto the letterhead pages, adding blank pages as needed
///
/// Every letterhead page appears in the plan, used or not. Blank pages take
/// the first letterhead page's size; with no letterhead at all, US Letter.
#[must_use]
pub fn plan(text: &str, letterhead: &[PageSize], settings: &LayoutSettings) -> LayoutPlan {
    let mut pages: Vec<PagePlan> = letterhead
        .iter()
        .enumerate()
        .map(|(i, &size)| PagePlan {
            source: PageSource::Letterhead(i),
            size,
            lines: Vec::new(),
        })
        .collect();

    let first = letterhead.first().copied().unwrap_or(PageSize::LETTER);
    if pages.is_empty() {
        pages.push(PagePlan {
            source: PageSource::Blank,
            size: first,
            lines: Vec::new(),
        });
    }

    let lines = wrap_words(text, settings.chars_per_line(first.width));

    let mut index = 0;
    let mut cursor = first.height - settings.margin_top;
    for text in lines {
        if cursor < settings.margin_bottom {
            index += 1;
            if index >= pages.len() {
                pages.push(PagePlan {
                    source: PageSource::Blank,
                    size: first,
                    lines: Vec::new(),
                });
            }
            cursor = pages[index].size.height - settings.margin_top;
        }

        pages[index].lines.push(PlacedLine {
            text,
            x: settings.margin_left,
            y: cursor,
        });
        cursor -= settings.line_height;
    }

    LayoutPlan { pages }
}
