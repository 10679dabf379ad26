//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::{
    API_URL_ENV, AssistantConfig, ConfigResult, DATA_DIR_ENV, HOST_ENV, load_markers,
    resolve_api_url,
};

/// Terminal client for the research-assistant backend.
#[derive(Debug, Parser)]
#[command(name = "research-assistant", version)]
#[command(about = "Chat with the research-assistant backend and manage uploaded PDFs", long_about = None)]
pub struct Args {
    /// Backend base URL
    #[arg(long, env = API_URL_ENV)]
    pub api_url: Option<String>,

    /// Host running the backend; the URL becomes http://<host>:8000
    #[arg(long, env = HOST_ENV)]
    pub host: Option<String>,

    /// Directory for the persisted chat history and file list
    #[arg(long, env = DATA_DIR_ENV)]
    pub data_dir: Option<PathBuf>,

    /// Directory chat exports are written to
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// Per-file upload timeout in milliseconds
    #[arg(long, default_value_t = 6000)]
    pub upload_timeout_ms: u64,

    /// JSON file with a replacement reply classification table
    #[arg(long, value_name = "PATH")]
    pub markers: Option<PathBuf>,

    /// Keep the session in memory only
    #[arg(long)]
    pub ephemeral: bool,
}

impl Args {
    /// Configuration described by these arguments.
    ///
    /// # Errors
    /// Returns an error if the marker table file cannot be loaded.
    pub fn to_config(&self) -> ConfigResult<AssistantConfig> {
        let mut config = AssistantConfig::new()
            .with_api_url(resolve_api_url(
                self.api_url.as_deref(),
                self.host.as_deref(),
            ))
            .with_upload_timeout(Duration::from_millis(self.upload_timeout_ms));
        if let Some(dir) = &self.data_dir {
            config = config.with_data_dir(dir);
        }
        if let Some(dir) = &self.export_dir {
            config = config.with_export_dir(dir);
        }
        if let Some(path) = &self.markers {
            config = config.with_markers(load_markers(path)?);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    use crate::config::ConfigError;
    use crate::session::MessageType;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["research-assistant"]).unwrap();
        let config = args.to_config().unwrap();
        assert_eq!(config.upload_timeout, Duration::from_secs(6));
        assert!(config.markers.is_none());
        assert!(!args.ephemeral);
    }

    #[test]
    fn test_explicit_url_wins_over_host() {
        let args = Args::try_parse_from([
            "research-assistant",
            "--api-url",
            "http://backend.internal:9000/",
            "--host",
            "ignored",
        ])
        .unwrap();
        assert_eq!(args.to_config().unwrap().api_url, "http://backend.internal:9000");
    }

    #[test]
    fn test_host_derives_url() {
        let args = Args::try_parse_from([
            "research-assistant",
            "--host",
            "lab-box",
            "--data-dir",
            "/tmp/ra",
            "--upload-timeout-ms",
            "250",
            "--ephemeral",
        ])
        .unwrap();
        let config = args.to_config().unwrap();
        assert_eq!(config.api_url, "http://lab-box:8000");
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/ra")));
        assert_eq!(config.upload_timeout, Duration::from_millis(250));
        assert!(args.ephemeral);
    }

    #[test]
    fn test_markers_file_replaces_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markers.json");
        std::fs::write(
            &path,
            r#"[{"kind":"citation","markers":["[1]"]},{"kind":"search","markers":["Results:"]}]"#,
        )
        .unwrap();

        let args = Args::try_parse_from([
            OsStr::new("research-assistant"),
            OsStr::new("--markers"),
            path.as_os_str(),
        ])
        .unwrap();
        let rules = args.to_config().unwrap().markers.unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].kind, MessageType::Citation);
        assert_eq!(rules[1].markers, vec!["Results:".to_string()]);
    }

    #[test]
    fn test_unreadable_markers_file_is_an_error() {
        let args =
            Args::try_parse_from(["research-assistant", "--markers", "/nonexistent/markers.json"])
                .unwrap();
        assert!(matches!(
            args.to_config(),
            Err(ConfigError::MarkersUnreadable { .. })
        ));
    }
}
