use super::Secret;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const LATEST_TAG: &str = "latest";
pub const DEFAULT_DOWNLOAD_PARALLELISM: usize = 16;

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_download_parallelism() -> usize {
    DEFAULT_DOWNLOAD_PARALLELISM
}

// Environment variables are merged into the same map as the config file, so
// unknown keys are expected and must not be rejected.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    /// Token sent as a bearer credential with every API request
    #[serde(rename = "github_access_token")]
    pub access_token: Secret,
    /// Release tag, or `latest` for the most recently published release
    pub tag: String,
    /// Comma-separated list of asset names to download
    #[serde(rename = "source")]
    pub file_names: String,
    pub repository_url: String,
    /// Overrides the API root derived from the repository host
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_download_parallelism")]
    pub download_parallelism: usize,
}

impl Config {
    /// Requested asset names in input order. Entries are trimmed and blanks dropped.
    pub fn requested_file_names(&self) -> Vec<String> {
        self.file_names
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}
