//! MediScan engine: transfer client, preview staging and effect execution.
mod client;
mod engine;
mod preview;
mod settings;
mod source;
mod types;

pub use client::{ExtractionClient, ReqwestExtractionClient};
pub use engine::EngineHandle;
pub use preview::{PreviewError, PreviewHandle, PreviewId, PreviewService};
pub use settings::{
    ClientSettings, SettingsError, API_URL_ENV, BATCH_LIMIT, DEFAULT_API_BASE_URL,
    LEGACY_API_URL_ENV,
};
pub use source::{load_upload_file, LoadError};
pub use types::{
    AdvancedOptions, BatchItem, EngineEvent, ExtractionMode, FailureKind, FormatGroups,
    HealthStatus, OutputFormat, Probe, ServiceInfo, SupportedFormats, TransferError,
    UploadFile,
};
