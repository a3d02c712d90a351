use crate::{ExtractionResult, FileCandidate, FileId, RequestId};

/// Outcome reported by the host once a submission resolves. The error side is
/// the human-readable message to display.
pub type ExtractionOutcome = Result<ExtractionResult, String>;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User dropped or picked files.
    FilesDropped(Vec<FileCandidate>),
    /// User removed a file from the pending list.
    FileRemoved { file_id: FileId },
    /// User asked to process the pending files.
    ProcessClicked,
    /// Timer tick for the simulated progress bar of one submission.
    SimulatedProgressTick {
        request_id: RequestId,
        increment: f32,
    },
    /// The transfer for a submission resolved.
    ExtractionFinished {
        request_id: RequestId,
        outcome: ExtractionOutcome,
    },
    /// User clicked "Try Again" on the error screen.
    RetryClicked,
    /// User clicked "Upload Another" on the result screen.
    UploadAnotherClicked,
    /// User selected a page tab of a multi-page result.
    PageSelected { index: usize },
    /// User asked to preview a pending or processed file.
    PreviewRequested { file_id: FileId },
    /// User opened a file only to look at it. It is not queued for upload, so
    /// the type and size limits do not apply.
    PreviewFileOpened(FileCandidate),
    /// User closed the preview.
    PreviewClosed,
    /// User clicked "Copy All Text".
    CopyAllTextClicked,
    /// The front-end is going away; release timers and previews.
    Shutdown,
}
