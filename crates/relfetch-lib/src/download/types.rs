use crate::config::DEFAULT_DOWNLOAD_PARALLELISM;
use std::path::PathBuf;

/// One asset to fetch into one local file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadTask {
    pub file_name: String,
    pub file_url: String,
}

#[derive(Clone, Debug)]
pub struct DownloadOptions {
    pub output_dir: PathBuf,
    /// Maximum number of simultaneous downloads
    pub download_parallelism: usize,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            download_parallelism: DEFAULT_DOWNLOAD_PARALLELISM,
        }
    }
}
