use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Base URL used when no environment override is present.
pub const DEFAULT_API_BASE_URL: &str = "http://34.47.177.112:8004";
/// Environment variable holding the service base URL.
pub const API_URL_ENV: &str = "MEDISCAN_API_URL";
/// Variable name used by the original web deployment; read as a fallback.
pub const LEGACY_API_URL_ENV: &str = "NEXT_PUBLIC_API_URL";
/// Most files accepted by a single batch request.
pub const BATCH_LIMIT: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid service url {value:?}: {message}")]
    InvalidBaseUrl { value: String, message: String },
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub batch_limit: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_BASE_URL).expect("default base url is valid"),
            connect_timeout: Duration::from_secs(10),
            // OCR of a multi-page PDF can take a while on the service side.
            request_timeout: Duration::from_secs(180),
            batch_limit: BATCH_LIMIT,
        }
    }
}

impl ClientSettings {
    /// Reads the base URL from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the base URL through `lookup`, falling back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let configured = [API_URL_ENV, LEGACY_API_URL_ENV]
            .into_iter()
            .filter_map(|key| lookup(key))
            .find(|value| !value.trim().is_empty());

        match configured {
            Some(value) => Self::default().with_base_url(&value),
            None => Ok(Self::default()),
        }
    }

    pub fn with_base_url(mut self, raw: &str) -> Result<Self, SettingsError> {
        self.base_url = parse_base_url(raw)?;
        Ok(self)
    }

    /// Absolute URL of an endpoint below the base URL, keeping any base path prefix.
    pub fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(path.trim_start_matches('/'));
        }
        url
    }
}

fn parse_base_url(raw: &str) -> Result<Url, SettingsError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|err| SettingsError::InvalidBaseUrl {
        value: trimmed.to_string(),
        message: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(SettingsError::InvalidBaseUrl {
            value: trimmed.to_string(),
            message: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(url)
}
