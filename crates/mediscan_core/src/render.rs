//! Read-only projections over an [`ExtractionResult`].

use crate::{ExtractionResult, PageText};

const EMPTY_PAGE_TEXT: &str = "No text found on this page.";
const EMPTY_DOCUMENT_TEXT: &str = "No text found in the document.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResultStats {
    pub pages: usize,
    pub words: u64,
    pub characters: u64,
}

impl ResultStats {
    pub fn of(result: &ExtractionResult) -> Self {
        match result {
            ExtractionResult::Single(doc) => Self {
                pages: 1,
                words: doc.word_count,
                characters: doc.character_count,
            },
            ExtractionResult::MultiPage(doc) => Self {
                pages: doc.pages.len(),
                words: doc.pages.iter().map(|p| p.word_count).sum(),
                characters: doc.pages.iter().map(|p| p.character_count).sum(),
            },
        }
    }
}

/// All text of a result, pages separated by `=== PAGE n ===` markers.
pub fn all_text(result: &ExtractionResult) -> String {
    match result {
        ExtractionResult::Single(doc) => doc.text.clone(),
        ExtractionResult::MultiPage(doc) => doc
            .pages
            .iter()
            .map(|page| format!("=== PAGE {} ===\n\n{}", page.page, page.text))
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

/// `<1s` renders as milliseconds, otherwise seconds with one decimal.
pub fn format_processing_time(seconds: f64) -> String {
    if seconds < 1.0 {
        format!("{}ms", (seconds * 1000.0).round() as u64)
    } else {
        format!("{seconds:.1}s")
    }
}

/// A result with one selected page.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView<'a> {
    result: &'a ExtractionResult,
    active_page: usize,
}

impl<'a> ResultView<'a> {
    pub fn new(result: &'a ExtractionResult) -> Self {
        Self {
            result,
            active_page: 0,
        }
    }

    /// Selects a page by index; out-of-range indices clamp to the last page.
    pub fn with_page(mut self, index: usize) -> Self {
        self.select_page(index);
        self
    }

    pub fn select_page(&mut self, index: usize) {
        let last = self.result.page_count().saturating_sub(1);
        self.active_page = index.min(last);
    }

    pub fn active_index(&self) -> usize {
        self.active_page
    }

    pub fn stats(&self) -> ResultStats {
        ResultStats::of(self.result)
    }

    /// Page tabs are only shown for documents with more than one page.
    pub fn has_page_tabs(&self) -> bool {
        matches!(self.result, ExtractionResult::MultiPage(doc) if doc.pages.len() > 1)
    }

    pub fn active_page(&self) -> Option<&'a PageText> {
        match self.result {
            ExtractionResult::Single(_) => None,
            ExtractionResult::MultiPage(doc) => doc.pages.get(self.active_page),
        }
    }

    pub fn active_text(&self) -> &'a str {
        match self.result {
            ExtractionResult::Single(doc) => non_empty_or(&doc.text, EMPTY_DOCUMENT_TEXT),
            ExtractionResult::MultiPage(doc) => match doc.pages.get(self.active_page) {
                Some(page) => non_empty_or(&page.text, EMPTY_PAGE_TEXT),
                None => EMPTY_DOCUMENT_TEXT,
            },
        }
    }

    pub fn all_text(&self) -> String {
        all_text(self.result)
    }
}

fn non_empty_or<'a>(text: &'a str, fallback: &'static str) -> &'a str {
    if text.trim().is_empty() {
        fallback
    } else {
        text
    }
}
