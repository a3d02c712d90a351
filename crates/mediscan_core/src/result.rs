use serde::Deserialize;

/// Tag the extraction service uses for multi-page documents.
const MULTI_PAGE_TAG: &str = "pdf";

/// Text extracted from a document, validated at the service boundary.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawExtractionResult")]
pub enum ExtractionResult {
    Single(SingleDocument),
    MultiPage(MultiPageDocument),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SingleDocument {
    pub text: String,
    pub word_count: u64,
    pub character_count: u64,
    /// Seconds spent by the service.
    pub processing_time: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiPageDocument {
    /// Ordered by strictly increasing page number.
    pub pages: Vec<PageText>,
    pub processing_time: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageText {
    pub page: u32,
    #[serde(default)]
    pub text: String,
    pub word_count: u64,
    pub character_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResultShapeError {
    #[error("multi-page result is missing `pages`")]
    MissingPages,
    #[error("single-document result is missing `text`")]
    MissingText,
    #[error("page numbers must be strictly increasing (page {page} follows {previous})")]
    PageOrder { previous: u32, page: u32 },
    #[error("processing time must be a finite, non-negative number")]
    InvalidProcessingTime,
}

impl ExtractionResult {
    pub fn processing_time(&self) -> f64 {
        match self {
            ExtractionResult::Single(doc) => doc.processing_time,
            ExtractionResult::MultiPage(doc) => doc.processing_time,
        }
    }

    pub fn page_count(&self) -> usize {
        match self {
            ExtractionResult::Single(_) => 1,
            ExtractionResult::MultiPage(doc) => doc.pages.len(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawExtractionResult {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    word_count: Option<u64>,
    #[serde(default)]
    character_count: Option<u64>,
    #[serde(default)]
    pages: Option<Vec<PageText>>,
    #[serde(default)]
    processing_time: f64,
}

impl TryFrom<RawExtractionResult> for ExtractionResult {
    type Error = ResultShapeError;

    fn try_from(raw: RawExtractionResult) -> Result<Self, Self::Error> {
        if !raw.processing_time.is_finite() || raw.processing_time < 0.0 {
            return Err(ResultShapeError::InvalidProcessingTime);
        }

        let is_multi_page = match raw.kind.as_deref() {
            Some(kind) => kind.eq_ignore_ascii_case(MULTI_PAGE_TAG),
            None => raw.pages.is_some(),
        };

        if is_multi_page {
            let pages = raw.pages.ok_or(ResultShapeError::MissingPages)?;
            check_page_order(&pages)?;
            return Ok(ExtractionResult::MultiPage(MultiPageDocument {
                pages,
                processing_time: raw.processing_time,
            }));
        }

        let text = raw.text.ok_or(ResultShapeError::MissingText)?;
        let word_count = raw
            .word_count
            .unwrap_or_else(|| text.split_whitespace().count() as u64);
        let character_count = raw
            .character_count
            .unwrap_or_else(|| text.chars().count() as u64);
        Ok(ExtractionResult::Single(SingleDocument {
            text,
            word_count,
            character_count,
            processing_time: raw.processing_time,
        }))
    }
}

fn check_page_order(pages: &[PageText]) -> Result<(), ResultShapeError> {
    for pair in pages.windows(2) {
        if pair[1].page <= pair[0].page {
            return Err(ResultShapeError::PageOrder {
                previous: pair[0].page,
                page: pair[1].page,
            });
        }
    }
    Ok(())
}
