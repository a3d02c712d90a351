use mediscan_core::ExtractionResult;
use mediscan_logging::{mediscan_debug, mediscan_info, mediscan_warn};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::{
    AdvancedOptions, BatchItem, ClientSettings, FailureKind, HealthStatus, ServiceInfo,
    SupportedFormats, TransferError, UploadFile,
};

const REJECTED_FALLBACK: &str = "Failed to process document";

/// Remote text-extraction service.
///
/// Every call is exactly one round trip; nothing is retried.
#[async_trait::async_trait]
pub trait ExtractionClient: Send + Sync {
    async fn extract_text(&self, file: &UploadFile) -> Result<ExtractionResult, TransferError>;

    async fn extract_text_advanced(
        &self,
        file: &UploadFile,
        options: &AdvancedOptions,
    ) -> Result<ExtractionResult, TransferError>;

    /// Rejects more than the configured batch limit before issuing a request.
    async fn batch_extract(&self, files: &[UploadFile]) -> Result<Vec<BatchItem>, TransferError>;

    async fn health(&self) -> Result<HealthStatus, TransferError>;

    async fn supported_formats(&self) -> Result<SupportedFormats, TransferError>;

    async fn service_info(&self) -> Result<ServiceInfo, TransferError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestExtractionClient {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestExtractionClient {
    pub fn new(settings: ClientSettings) -> Result<Self, TransferError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| TransferError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    async fn post_extraction(
        &self,
        url: Url,
        form: Form,
    ) -> Result<ExtractionResult, TransferError> {
        let body = self.send_form(url, form).await?;
        let data = decode_envelope(&body)?;
        serde_json::from_value::<ExtractionResult>(data).map_err(|err| {
            TransferError::new(
                FailureKind::MalformedResult,
                format!("Malformed extraction result: {err}"),
            )
        })
    }

    async fn send_form(&self, url: Url, form: Form) -> Result<bytes::Bytes, TransferError> {
        mediscan_debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            // An unreadable error body still reports the status code.
            let body = response.bytes().await.ok().unwrap_or_default();
            let err = status_error(status.as_u16(), &body);
            mediscan_warn!("Extraction request failed: {} ({})", err.message, err.kind);
            return Err(err);
        }
        response.bytes().await.map_err(map_reqwest_error)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        failure_label: &str,
    ) -> Result<T, TransferError> {
        let url = self.settings.endpoint(path);
        mediscan_debug!("GET {}", url);
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::new(
                FailureKind::HttpStatus(status.as_u16()),
                format!("{failure_label}: {}", status.as_u16()),
            ));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body).map_err(|err| {
            TransferError::new(
                FailureKind::MalformedResult,
                format!("Invalid response body: {err}"),
            )
        })
    }
}

#[async_trait::async_trait]
impl ExtractionClient for ReqwestExtractionClient {
    async fn extract_text(&self, file: &UploadFile) -> Result<ExtractionResult, TransferError> {
        mediscan_info!("Extracting text from {} ({} bytes)", file.name, file.size());
        let form = Form::new().part("file", file_part(file)?);
        self.post_extraction(self.settings.endpoint("extract-text"), form)
            .await
    }

    async fn extract_text_advanced(
        &self,
        file: &UploadFile,
        options: &AdvancedOptions,
    ) -> Result<ExtractionResult, TransferError> {
        mediscan_info!(
            "Extracting text (advanced {:?}) from {} ({} bytes)",
            options,
            file.name,
            file.size()
        );
        let mut url = self.settings.endpoint("extract-text-advanced");
        let pairs = options.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        let form = Form::new().part("file", file_part(file)?);
        self.post_extraction(url, form).await
    }

    async fn batch_extract(&self, files: &[UploadFile]) -> Result<Vec<BatchItem>, TransferError> {
        let limit = self.settings.batch_limit;
        if files.len() > limit {
            return Err(TransferError::new(
                FailureKind::Validation,
                format!("Batch size limit exceeded. Maximum {limit} files allowed."),
            ));
        }
        if files.is_empty() {
            return Err(TransferError::new(
                FailureKind::Validation,
                "No files provided for batch extraction.",
            ));
        }

        mediscan_info!("Batch extracting {} files", files.len());
        let mut form = Form::new();
        for file in files {
            form = form.part("files", file_part(file)?);
        }
        let body = self
            .send_form(self.settings.endpoint("batch-extract"), form)
            .await?;
        let data = decode_envelope(&body)?;
        let batch: BatchData = serde_json::from_value(data).map_err(|err| {
            TransferError::new(
                FailureKind::MalformedResult,
                format!("Malformed batch response: {err}"),
            )
        })?;
        Ok(batch.results.into_iter().map(BatchItem::from).collect())
    }

    async fn health(&self) -> Result<HealthStatus, TransferError> {
        self.get_json("health", "Health check failed").await
    }

    async fn supported_formats(&self) -> Result<SupportedFormats, TransferError> {
        self.get_json("supported-formats", "Failed to get supported formats")
            .await
    }

    async fn service_info(&self) -> Result<ServiceInfo, TransferError> {
        self.get_json("", "Failed to get API info").await
    }
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    success: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BatchData {
    results: Vec<BatchItemWire>,
}

#[derive(Debug, Deserialize)]
struct BatchItemWire {
    filename: String,
    success: bool,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

impl From<BatchItemWire> for BatchItem {
    fn from(wire: BatchItemWire) -> Self {
        let parsed = match wire.data {
            Some(data) if wire.success => Some(serde_json::from_value::<ExtractionResult>(data)),
            _ => None,
        };
        match parsed {
            Some(Ok(result)) => BatchItem {
                filename: wire.filename,
                success: true,
                result: Some(result),
                error: None,
            },
            Some(Err(err)) => BatchItem {
                filename: wire.filename,
                success: false,
                result: None,
                error: Some(format!("Malformed extraction result: {err}")),
            },
            None => BatchItem {
                filename: wire.filename,
                success: false,
                result: None,
                error: wire.error.or_else(|| Some(REJECTED_FALLBACK.to_string())),
            },
        }
    }
}

fn file_part(file: &UploadFile) -> Result<Part, TransferError> {
    Part::bytes(file.bytes.to_vec())
        .file_name(file.name.clone())
        .mime_str(&file.mime)
        .map_err(|err| {
            TransferError::new(
                FailureKind::InvalidFile,
                format!("{}: {err}", file.name),
            )
        })
}

/// Unwraps `{success, message, data}`, mapping `success: false` to an error.
fn decode_envelope(body: &[u8]) -> Result<serde_json::Value, TransferError> {
    let envelope: ApiEnvelope = serde_json::from_slice(body).map_err(|err| {
        TransferError::new(
            FailureKind::MalformedResult,
            format!("Invalid response body: {err}"),
        )
    })?;

    if !envelope.success {
        let message = if envelope.message.trim().is_empty() {
            REJECTED_FALLBACK.to_string()
        } else {
            envelope.message
        };
        return Err(TransferError::new(FailureKind::Rejected, message));
    }

    envelope.data.ok_or_else(|| {
        TransferError::new(FailureKind::MalformedResult, "Response is missing `data`")
    })
}

/// Uses the service's `detail` when the body carries one, else the status code.
fn status_error(code: u16, body: &[u8]) -> TransferError {
    let detail = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.detail)
        .filter(|detail| !detail.trim().is_empty());
    let message = detail.unwrap_or_else(|| format!("HTTP error! status: {code}"));
    TransferError::new(FailureKind::HttpStatus(code), message)
}

fn map_reqwest_error(err: reqwest::Error) -> TransferError {
    if err.is_timeout() {
        return TransferError::new(FailureKind::Timeout, err.to_string());
    }
    TransferError::new(FailureKind::Network, err.to_string())
}
