use crate::progress::SimulatedProgress;
use crate::render::{format_processing_time, ResultView};
use crate::upload::{PendingFile, Rejection, Selection, UploadCollector, UploadLimits};
use crate::view_model::{AppViewModel, ProgressView, ResultPanel, Screen};
use crate::{ExtractionOutcome, ExtractionResult, FileCandidate, FileId};

pub type RequestId = u64;

/// Number of processed files listed under "recently processed".
pub const RECENT_FILES_SHOWN: usize = 6;

const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

/// What the interface currently displays. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading {
        filename: String,
        progress: SimulatedProgress,
    },
    Success {
        result: ExtractionResult,
        filename: String,
    },
    Error {
        message: String,
    },
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading { .. })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, ViewState::Idle)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    view: ViewState,
    collector: UploadCollector,
    processed: Vec<PendingFile>,
    last_rejections: Vec<Rejection>,
    in_flight: Option<RequestId>,
    next_request_id: RequestId,
    active_page: usize,
    preview: Option<FileId>,
    inspected: Option<PendingFile>,
    settled_progress: u8,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_limits(UploadLimits::default())
    }

    pub fn with_limits(limits: UploadLimits) -> Self {
        Self {
            collector: UploadCollector::new(limits),
            next_request_id: 1,
            ..Self::default()
        }
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn pending(&self) -> &[PendingFile] {
        self.collector.pending()
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }

    pub fn preview(&self) -> Option<FileId> {
        self.preview
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn view(&self) -> AppViewModel {
        let (screen, filename, progress, result, error) = match &self.view {
            ViewState::Idle => (Screen::Upload, None, None, None, None),
            ViewState::Loading { filename, progress } => (
                Screen::Loading,
                Some(filename.clone()),
                Some(ProgressView {
                    percent: progress.percent(),
                    label: progress.phase_label().to_string(),
                }),
                None,
                None,
            ),
            ViewState::Success { result, filename } => (
                Screen::Result,
                Some(filename.clone()),
                None,
                Some(result_panel(result, self.active_page)),
                None,
            ),
            ViewState::Error { message } => {
                (Screen::Error, None, None, None, Some(message.clone()))
            }
        };

        let recent_start = self.processed.len().saturating_sub(RECENT_FILES_SHOWN);
        AppViewModel {
            screen,
            filename,
            progress,
            settled_progress: self.settled_progress,
            result,
            error,
            pending: self.collector.pending().to_vec(),
            rejections: self.last_rejections.clone(),
            recent: self.processed[recent_start..].to_vec(),
            can_submit: self.view.is_idle() && !self.collector.is_empty(),
            preview: self.preview.and_then(|id| self.find_file(id)).cloned(),
            dirty: self.dirty,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn find_file(&self, id: FileId) -> Option<&PendingFile> {
        self.collector
            .find(id)
            .or_else(|| self.processed.iter().rev().find(|file| file.id == id))
            .or_else(|| self.inspected.as_ref().filter(|file| file.id == id))
    }

    pub(crate) fn select_files(&mut self, candidates: Vec<FileCandidate>) -> Selection {
        let selection = self.collector.select(candidates);
        self.last_rejections = selection.rejected.clone();
        self.mark_dirty();
        selection
    }

    pub(crate) fn remove_file(&mut self, id: FileId) -> Option<PendingFile> {
        let removed = self.collector.remove(id)?;
        self.mark_dirty();
        Some(removed)
    }

    /// Moves the next pending file into flight. Only valid while idle.
    pub(crate) fn begin_submission(&mut self) -> Option<(RequestId, PendingFile)> {
        if !self.view.is_idle() {
            return None;
        }
        let file = self.collector.take_next()?;
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.in_flight = Some(request_id);
        self.view = ViewState::Loading {
            filename: file.name.clone(),
            progress: SimulatedProgress::start(),
        };
        self.processed.push(file.clone());
        self.last_rejections.clear();
        self.active_page = 0;
        self.settled_progress = 0;
        self.mark_dirty();
        Some((request_id, file))
    }

    /// Ticks from a timer of an earlier submission are ignored.
    pub(crate) fn advance_progress(&mut self, request_id: RequestId, increment: f32) {
        if self.in_flight != Some(request_id) {
            return;
        }
        if let ViewState::Loading { progress, .. } = &mut self.view {
            let before = progress.percent();
            progress.advance(increment);
            if progress.percent() != before {
                self.dirty = true;
            }
        }
    }

    /// Applies a transfer outcome. Returns false for unknown or stale requests.
    pub(crate) fn finish_submission(
        &mut self,
        request_id: RequestId,
        outcome: ExtractionOutcome,
    ) -> bool {
        if self.in_flight != Some(request_id) || !self.view.is_loading() {
            return false;
        }
        let ViewState::Loading {
            filename,
            mut progress,
        } = std::mem::take(&mut self.view)
        else {
            return false;
        };

        self.in_flight = None;
        self.view = match outcome {
            Ok(result) => {
                progress.complete();
                ViewState::Success { result, filename }
            }
            Err(message) => {
                progress.reset();
                let message = if message.trim().is_empty() {
                    UNEXPECTED_ERROR.to_string()
                } else {
                    message
                };
                ViewState::Error { message }
            }
        };
        self.settled_progress = progress.percent();
        self.mark_dirty();
        true
    }

    /// Leaves a result or error screen for the upload screen.
    pub(crate) fn return_to_upload(&mut self) -> bool {
        if !matches!(
            self.view,
            ViewState::Success { .. } | ViewState::Error { .. }
        ) {
            return false;
        }
        self.view = ViewState::Idle;
        self.active_page = 0;
        self.settled_progress = 0;
        self.mark_dirty();
        true
    }

    pub(crate) fn select_page(&mut self, index: usize) {
        if let ViewState::Success { result, .. } = &self.view {
            let clamped = ResultView::new(result).with_page(index).active_index();
            if clamped != self.active_page {
                self.active_page = clamped;
                self.mark_dirty();
            }
        }
    }

    pub(crate) fn result(&self) -> Option<&ExtractionResult> {
        match &self.view {
            ViewState::Success { result, .. } => Some(result),
            _ => None,
        }
    }

    pub(crate) fn open_preview(&mut self, id: FileId) -> bool {
        if self.find_file(id).is_none() {
            return false;
        }
        self.preview = Some(id);
        self.mark_dirty();
        true
    }

    /// Holds a file outside the upload queue and previews it.
    pub(crate) fn inspect_file(&mut self, candidate: FileCandidate) -> bool {
        if self.find_file(candidate.id).is_some() {
            return false;
        }
        self.preview = Some(candidate.id);
        self.inspected = Some(PendingFile::from(candidate));
        self.mark_dirty();
        true
    }

    pub(crate) fn close_preview(&mut self) -> bool {
        self.inspected = None;
        if self.preview.take().is_some() {
            self.mark_dirty();
            true
        } else {
            false
        }
    }

    /// Drops any in-flight submission. Returns whether one was active.
    pub(crate) fn abandon_submission(&mut self) -> bool {
        self.in_flight = None;
        if self.view.is_loading() {
            self.view = ViewState::Idle;
            self.settled_progress = 0;
            self.mark_dirty();
            true
        } else {
            false
        }
    }
}

fn result_panel(result: &ExtractionResult, active_page: usize) -> ResultPanel {
    let view = ResultView::new(result).with_page(active_page);
    let page_tabs = match result {
        ExtractionResult::MultiPage(doc) if view.has_page_tabs() => {
            doc.pages.iter().map(|page| page.page).collect()
        }
        _ => Vec::new(),
    };
    ResultPanel {
        stats: view.stats(),
        processing_time: format_processing_time(result.processing_time()),
        page_tabs,
        active_index: view.active_index(),
        active_page_number: view.active_page().map(|page| page.page),
        active_page_words: view.active_page().map(|page| page.word_count),
        active_text: view.active_text().to_string(),
    }
}
