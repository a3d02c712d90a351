use crate::render::ResultStats;
use crate::upload::{PendingFile, Rejection};

/// Which screen the front-end shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Upload,
    Loading,
    Result,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    pub percent: u8,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPanel {
    pub stats: ResultStats,
    pub processing_time: String,
    /// Page numbers, empty unless the result has more than one page.
    pub page_tabs: Vec<u32>,
    pub active_index: usize,
    pub active_page_number: Option<u32>,
    pub active_page_words: Option<u64>,
    pub active_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub screen: Screen,
    pub filename: Option<String>,
    pub progress: Option<ProgressView>,
    /// Simulated progress left behind by the last submission (100 or 0).
    pub settled_progress: u8,
    pub result: Option<ResultPanel>,
    pub error: Option<String>,
    pub pending: Vec<PendingFile>,
    pub rejections: Vec<Rejection>,
    pub recent: Vec<PendingFile>,
    pub can_submit: bool,
    pub preview: Option<PendingFile>,
    pub dirty: bool,
}
