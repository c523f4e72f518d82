use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variables naming the three remote collaborators.
pub const FLOW_URL_VAR: &str = "SENAR_FLOW_URL";
pub const PREFILL_URL_VAR: &str = "SENAR_PREFILL_URL";
pub const LIST_BY_SCHOOL_URL_VAR: &str = "SENAR_LIST_BY_SCHOOL_URL";

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("senar-portal")
}

/// Endpoint URLs and local storage location.
///
/// A missing URL is not an error at load time: each remote operation checks
/// for the URL it needs and fails with a missing-configuration error only
/// when actually called.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PortalConfig {
    pub flow_url: Option<String>,
    pub prefill_url: Option<String>,
    pub list_by_school_url: Option<String>,
    pub data_dir: PathBuf,
    pub debug_logging: bool,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            flow_url: None,
            prefill_url: None,
            list_by_school_url: None,
            data_dir: default_data_dir(),
            debug_logging: false,
        }
    }
}

fn non_blank_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl PortalConfig {
    /// Read endpoint URLs from the environment, leaving blanks as `None`.
    pub fn from_env() -> Self {
        Self {
            flow_url: non_blank_env(FLOW_URL_VAR),
            prefill_url: non_blank_env(PREFILL_URL_VAR),
            list_by_school_url: non_blank_env(LIST_BY_SCHOOL_URL_VAR),
            data_dir: default_data_dir(),
            debug_logging: non_blank_env("SENAR_DEBUG").is_some(),
        }
    }

    /// Ensure the data directory exists.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}
