use std::fmt;

/// Identity of a file held by the host; the core never sees file bytes.
pub type FileId = u64;

/// Largest file accepted for upload (50 MiB).
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
/// Default cap on the number of pending files.
pub const DEFAULT_MAX_FILES: usize = 50;
/// MIME types the extraction service understands.
pub const ALLOWED_MIME_TYPES: &[&str] =
    &["image/png", "image/jpeg", "image/jpg", "application/pdf"];

/// A file offered to the collector by drag-and-drop or the file picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub id: FileId,
    pub name: String,
    pub size: u64,
    pub mime: String,
}

/// A validated file waiting to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub id: FileId,
    pub name: String,
    pub size: u64,
    pub mime: String,
}

impl From<FileCandidate> for PendingFile {
    fn from(candidate: FileCandidate) -> Self {
        Self {
            id: candidate.id,
            name: candidate.name,
            size: candidate.size,
            mime: candidate.mime,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_files: usize,
    pub max_file_size: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            max_file_size: MAX_FILE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("unsupported file type {mime}")]
    UnsupportedType { mime: String },
    #[error("file is {size} bytes, larger than the {max} byte limit")]
    TooLarge { size: u64, max: u64 },
    #[error("too many files, at most {max} can be selected")]
    TooMany { max: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub id: FileId,
    pub name: String,
    pub reason: RejectReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub accepted: Vec<PendingFile>,
    pub rejected: Vec<Rejection>,
}

/// Client-side validation and the pending list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadCollector {
    limits: UploadLimits,
    pending: Vec<PendingFile>,
}

impl UploadCollector {
    pub fn new(limits: UploadLimits) -> Self {
        Self {
            limits,
            pending: Vec::new(),
        }
    }

    pub fn limits(&self) -> UploadLimits {
        self.limits
    }

    pub fn pending(&self) -> &[PendingFile] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Validates candidates in order and appends the accepted ones.
    ///
    /// Type is checked before size, size before the count cap. Every candidate
    /// ends up in exactly one of `accepted` or `rejected`.
    pub fn select(&mut self, candidates: Vec<FileCandidate>) -> Selection {
        let mut selection = Selection::default();
        for candidate in candidates {
            let reason = if !is_mime_allowed(&candidate.mime) {
                Some(RejectReason::UnsupportedType {
                    mime: candidate.mime.clone(),
                })
            } else if candidate.size > self.limits.max_file_size {
                Some(RejectReason::TooLarge {
                    size: candidate.size,
                    max: self.limits.max_file_size,
                })
            } else if self.pending.len() >= self.limits.max_files {
                Some(RejectReason::TooMany {
                    max: self.limits.max_files,
                })
            } else {
                None
            };

            match reason {
                Some(reason) => selection.rejected.push(Rejection {
                    id: candidate.id,
                    name: candidate.name,
                    reason,
                }),
                None => {
                    let file = PendingFile::from(candidate);
                    self.pending.push(file.clone());
                    selection.accepted.push(file);
                }
            }
        }
        selection
    }

    pub fn remove(&mut self, id: FileId) -> Option<PendingFile> {
        let index = self.pending.iter().position(|file| file.id == id)?;
        Some(self.pending.remove(index))
    }

    /// Pops the oldest pending file for submission.
    pub fn take_next(&mut self) -> Option<PendingFile> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }

    pub fn find(&self, id: FileId) -> Option<&PendingFile> {
        self.pending.iter().find(|file| file.id == id)
    }
}

pub fn is_mime_allowed(mime: &str) -> bool {
    let essence = mime.split(';').next().unwrap_or(mime).trim();
    ALLOWED_MIME_TYPES
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(essence))
}

/// Formats a byte count as `0 Bytes`, `1.5 KB`, `2 MB` (base 1024).
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

impl fmt::Display for PendingFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, format_file_size(self.size))
    }
}
