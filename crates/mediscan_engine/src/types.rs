use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use mediscan_core::{ExtractionResult, FileCandidate, FileId, RequestId};
use serde::Deserialize;

/// A local file held in memory, ready to be sent or previewed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime: String,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Metadata the core collector validates.
    pub fn candidate(&self, id: FileId) -> FileCandidate {
        FileCandidate {
            id,
            name: self.name.clone(),
            size: self.size(),
            mime: self.mime.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
    Txt,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Txt => "txt",
        }
    }
}

/// Query options for the advanced extraction endpoint. Unset options are not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdvancedOptions {
    pub include_metadata: Option<bool>,
    pub include_statistics: Option<bool>,
    pub output_format: Option<OutputFormat>,
}

impl AdvancedOptions {
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, &'static str)> {
        let mut pairs = Vec::new();
        if let Some(value) = self.include_metadata {
            pairs.push(("include_metadata", bool_str(value)));
        }
        if let Some(value) = self.include_statistics {
            pairs.push(("include_statistics", bool_str(value)));
        }
        if let Some(format) = self.output_format {
            pairs.push(("output_format", format.as_str()));
        }
        pairs
    }
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    #[default]
    Standard,
    Advanced(AdvancedOptions),
}

/// Per-file entry of a batch response.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    pub filename: String,
    pub success: bool,
    pub result: Option<ExtractionResult>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub gemini_model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FormatGroups {
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub documents: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SupportedFormats {
    pub supported_formats: FormatGroups,
    #[serde(default)]
    pub max_file_size: Option<String>,
    #[serde(default)]
    pub batch_limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceInfo {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
}

/// Read-only service queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Health,
    SupportedFormats,
    ServiceInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    ExtractionCompleted {
        request_id: RequestId,
        result: Result<ExtractionResult, TransferError>,
    },
    BatchCompleted {
        result: Result<Vec<BatchItem>, TransferError>,
    },
    HealthChecked(Result<HealthStatus, TransferError>),
    FormatsListed(Result<SupportedFormats, TransferError>),
    ServiceDescribed(Result<ServiceInfo, TransferError>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransferError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransferError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Rejected client-side before any request was made.
    Validation,
    InvalidFile,
    Network,
    Timeout,
    HttpStatus(u16),
    /// The service answered `success: false`.
    Rejected,
    /// The response did not have the expected shape.
    MalformedResult,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Validation => write!(f, "validation error"),
            FailureKind::InvalidFile => write!(f, "invalid file"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Rejected => write!(f, "rejected by service"),
            FailureKind::MalformedResult => write!(f, "malformed result"),
        }
    }
}
