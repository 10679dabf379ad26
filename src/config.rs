//! Runtime configuration for the client.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::session::MarkerRule;

/// Environment variable holding an explicit backend URL.
pub const API_URL_ENV: &str = "RESEARCH_ASSISTANT_API_URL";
/// Environment variable holding the host the backend URL is derived from.
pub const HOST_ENV: &str = "RESEARCH_ASSISTANT_HOST";
/// Environment variable holding the data directory.
pub const DATA_DIR_ENV: &str = "RESEARCH_ASSISTANT_DATA_DIR";

/// Port the backend listens on when the URL is derived from a host.
pub const BACKEND_PORT: u16 = 8000;
/// Backend URL used when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
/// Bounded wait for one file upload.
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(6);
/// Path prefix of files the backend can resolve and delete.
pub const DEFAULT_UPLOAD_PREFIX: &str = "/uploads";

/// Directory name under the platform data directory.
const APP_DIR_NAME: &str = "research-assistant";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The backend URL does not parse.
    #[error("invalid backend url {url:?}: {source}")]
    InvalidUrl {
        /// Offending value.
        url: String,
        /// Parser error.
        source: url::ParseError,
    },
    /// No data directory was configured and the platform has none.
    #[error("could not determine a data directory; set RESEARCH_ASSISTANT_DATA_DIR")]
    NoDataDir,
    /// The marker table file could not be read.
    #[error("could not read marker table {path:?}: {source}")]
    MarkersUnreadable {
        /// Marker table file.
        path: PathBuf,
        /// I/O error.
        source: std::io::Error,
    },
    /// The marker table file is not a JSON array of rules.
    #[error("invalid marker table {path:?}: {source}")]
    MarkersInvalid {
        /// Marker table file.
        path: PathBuf,
        /// Decoder error.
        source: serde_json::Error,
    },
}

/// Convenience result alias for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Backend base URL.
    pub api_url: String,
    /// Bounded wait for each file upload.
    #[serde(with = "duration_serde")]
    pub upload_timeout: Duration,
    /// Path prefix of backend-resolvable files.
    pub upload_prefix: String,
    /// Directory for the persisted slots; `None` means the platform default.
    pub data_dir: Option<PathBuf>,
    /// Directory for chat exports; `None` means `<data_dir>/exports`.
    pub export_dir: Option<PathBuf>,
    /// Replacement classification table.
    pub markers: Option<Vec<MarkerRule>>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
            upload_prefix: DEFAULT_UPLOAD_PREFIX.to_string(),
            data_dir: None,
            export_dir: None,
            markers: None,
        }
    }
}

impl AssistantConfig {
    /// Create a new config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backend URL.
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the upload timeout.
    #[must_use]
    pub const fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    /// Set the backend path prefix.
    #[must_use]
    pub fn with_upload_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.upload_prefix = prefix.into();
        self
    }

    /// Set the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Set the export directory.
    #[must_use]
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = Some(dir.into());
        self
    }

    /// Replace the classification table.
    #[must_use]
    pub fn with_markers(mut self, rules: Vec<MarkerRule>) -> Self {
        self.markers = Some(rules);
        self
    }

    /// Parsed backend URL.
    ///
    /// # Errors
    /// Returns an error if `api_url` is not a valid URL.
    pub fn parsed_api_url(&self) -> ConfigResult<Url> {
        Url::parse(&self.api_url).map_err(|source| ConfigError::InvalidUrl {
            url: self.api_url.clone(),
            source,
        })
    }

    /// Directory holding the persisted slots.
    ///
    /// # Errors
    /// Returns an error if no directory is configured and the platform has no
    /// data directory.
    pub fn resolved_data_dir(&self) -> ConfigResult<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|d| d.join(APP_DIR_NAME))
            .ok_or(ConfigError::NoDataDir)
    }

    /// Directory chat exports are written to.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be resolved.
    pub fn resolved_export_dir(&self) -> ConfigResult<PathBuf> {
        if let Some(dir) = &self.export_dir {
            return Ok(dir.clone());
        }
        Ok(self.resolved_data_dir()?.join("exports"))
    }
}

/// Pick the backend URL.
///
/// An explicit override wins, then a URL derived from the host, then the
/// local default. Blank values count as unset.
#[must_use]
pub fn resolve_api_url(explicit: Option<&str>, host: Option<&str>) -> String {
    if let Some(url) = explicit.map(str::trim).filter(|v| !v.is_empty()) {
        return url.trim_end_matches('/').to_string();
    }
    if let Some(host) = host.map(str::trim).filter(|v| !v.is_empty()) {
        return format!("http://{host}:{BACKEND_PORT}");
    }
    DEFAULT_API_URL.to_string()
}

/// Read a classification table from a JSON array of rules.
///
/// # Errors
/// Returns an error if the file cannot be read or does not decode.
pub fn load_markers(path: &Path) -> ConfigResult<Vec<MarkerRule>> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::MarkersUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::MarkersInvalid {
        path: path.to_path_buf(),
        source,
    })
}

/// Serde module for Duration serialization.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
