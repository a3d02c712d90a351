//! MediScan core: pure state machine, upload validation and result projections.
mod effect;
mod msg;
mod progress;
mod render;
mod result;
mod state;
mod update;
mod upload;
mod view_model;

pub use effect::Effect;
pub use msg::{ExtractionOutcome, Msg};
pub use progress::{SimulatedProgress, MAX_TICK_INCREMENT, SIMULATED_CEILING, TICK_INTERVAL_MS};
pub use render::{all_text, format_processing_time, ResultStats, ResultView};
pub use result::{ExtractionResult, MultiPageDocument, PageText, ResultShapeError, SingleDocument};
pub use state::{AppState, RequestId, ViewState, RECENT_FILES_SHOWN};
pub use update::update;
pub use upload::{
    format_file_size, is_mime_allowed, FileCandidate, FileId, PendingFile, RejectReason,
    Rejection, Selection, UploadCollector, UploadLimits, ALLOWED_MIME_TYPES, DEFAULT_MAX_FILES,
    MAX_FILE_SIZE,
};
pub use view_model::{AppViewModel, ProgressView, ResultPanel, Screen};
