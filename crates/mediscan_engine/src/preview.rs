//! Local previews of in-memory files.
//!
//! A preview copies the file's bytes into a named temp file and hands out a
//! `file://` URL for it. Only one preview is active at a time; opening another
//! one, closing it, or dropping the service deletes the temp file.

use std::io::{self, Write};
use std::path::Path;

use mediscan_logging::{mediscan_debug, mediscan_warn};
use tempfile::NamedTempFile;
use thiserror::Error;
use url::Url;

use crate::UploadFile;

const TEMP_PREFIX: &str = "mediscan-preview-";

pub type PreviewId = u64;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("failed to stage preview: {0}")]
    Io(#[from] io::Error),
    #[error("temp path {0} cannot be expressed as a file url")]
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewHandle {
    id: PreviewId,
    file_name: String,
    mime: String,
    url: Url,
}

impl PreviewHandle {
    pub fn id(&self) -> PreviewId {
        self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

struct ActivePreview {
    handle: PreviewHandle,
    file: NamedTempFile,
}

#[derive(Default)]
pub struct PreviewService {
    next_id: PreviewId,
    active: Option<ActivePreview>,
}

impl PreviewService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Images and PDFs can be shown inline.
    pub fn is_previewable(mime: &str) -> bool {
        let essence = mime.split(';').next().unwrap_or(mime).trim().to_ascii_lowercase();
        essence.starts_with("image/") || essence == "application/pdf"
    }

    /// Opens a preview, releasing the previous one first.
    ///
    /// Returns `Ok(None)` for types that cannot be previewed.
    pub fn open(&mut self, file: &UploadFile) -> Result<Option<PreviewHandle>, PreviewError> {
        self.close_active();

        if !Self::is_previewable(&file.mime) {
            mediscan_debug!("Preview unavailable for {} ({})", file.name, file.mime);
            return Ok(None);
        }

        let suffix = preview_suffix(file);
        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(&suffix)
            .tempfile()?;
        temp.write_all(&file.bytes)?;
        temp.flush()?;

        let url = Url::from_file_path(temp.path())
            .map_err(|()| PreviewError::Url(temp.path().display().to_string()))?;

        self.next_id += 1;
        let handle = PreviewHandle {
            id: self.next_id,
            file_name: file.name.clone(),
            mime: file.mime.clone(),
            url,
        };
        mediscan_debug!("Opened preview {} for {}", handle.id, handle.url);
        self.active = Some(ActivePreview {
            handle: handle.clone(),
            file: temp,
        });
        Ok(Some(handle))
    }

    /// Releases `handle` if it is still the active preview. Returns whether
    /// anything was released; closing an already released handle is a no-op.
    pub fn close(&mut self, handle: &PreviewHandle) -> bool {
        let is_active = self
            .active
            .as_ref()
            .is_some_and(|active| active.handle.id == handle.id);
        is_active && self.close_active()
    }

    pub fn close_active(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        let id = active.handle.id;
        if let Err(err) = active.file.close() {
            mediscan_warn!("Failed to remove preview file for {}: {}", id, err);
        } else {
            mediscan_debug!("Released preview {}", id);
        }
        true
    }

    pub fn active(&self) -> Option<&PreviewHandle> {
        self.active.as_ref().map(|active| &active.handle)
    }
}

impl Drop for PreviewService {
    fn drop(&mut self) {
        self.close_active();
    }
}

fn preview_suffix(file: &UploadFile) -> String {
    let from_name = Path::new(&file.name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let ext = from_name.or_else(|| {
        mime_guess::get_mime_extensions_str(&file.mime)
            .and_then(|exts| exts.first())
            .map(|ext| ext.to_string())
    });
    ext.map(|ext| format!(".{ext}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, mime: &str) -> UploadFile {
        UploadFile::new(name, mime, b"%PDF-1.7 test".to_vec())
    }

    #[test]
    fn pdf_gets_a_file_url() {
        let mut service = PreviewService::new();
        let handle = service
            .open(&file("report.pdf", "application/pdf"))
            .unwrap()
            .expect("pdf is previewable");

        assert_eq!(handle.url().scheme(), "file");
        let path = handle.url().to_file_path().unwrap();
        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7 test");
    }

    #[test]
    fn plain_text_is_unavailable_without_error() {
        let mut service = PreviewService::new();
        let handle = service.open(&file("notes.txt", "text/plain")).unwrap();
        assert!(handle.is_none());
        assert!(service.active().is_none());
    }

    #[test]
    fn closing_twice_is_a_noop() {
        let mut service = PreviewService::new();
        let handle = service
            .open(&file("scan.png", "image/png"))
            .unwrap()
            .unwrap();
        let path = handle.url().to_file_path().unwrap();

        assert!(service.close(&handle));
        assert!(!path.exists());
        assert!(!service.close(&handle));
    }

    #[test]
    fn opening_again_releases_previous() {
        let mut service = PreviewService::new();
        let first = service
            .open(&file("a.png", "image/png"))
            .unwrap()
            .unwrap();
        let first_path = first.url().to_file_path().unwrap();

        let second = service
            .open(&file("b.jpg", "image/jpeg"))
            .unwrap()
            .unwrap();
        assert!(!first_path.exists());
        assert_ne!(first.id(), second.id());
        assert!(!service.close(&first));
        assert_eq!(service.active(), Some(&second));
    }

    #[test]
    fn drop_releases_active_preview() {
        let path = {
            let mut service = PreviewService::new();
            let handle = service
                .open(&file("scan.pdf", "application/pdf"))
                .unwrap()
                .unwrap();
            handle.url().to_file_path().unwrap()
        };
        assert!(!path.exists());
    }

    #[test]
    fn suffix_falls_back_to_mime() {
        assert_eq!(preview_suffix(&file("scan", "application/pdf")), ".pdf");
        assert_eq!(preview_suffix(&file("SCAN.PNG", "image/png")), ".png");
    }
}
