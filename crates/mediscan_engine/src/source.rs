use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::UploadFile;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{0} has no usable file name")]
    InvalidName(String),
}

/// Reads a local file into memory, guessing its MIME type from the extension.
pub fn load_upload_file(path: &Path) -> Result<UploadFile, LoadError> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(ToOwned::to_owned)
        .ok_or_else(|| LoadError::InvalidName(path.display().to_string()))?;
    let bytes = fs::read(path).map_err(|source| LoadError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let mime = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    Ok(UploadFile::new(name, mime, bytes))
}
