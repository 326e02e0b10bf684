use crate::repository::RepositoryUrlError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelFetchError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {details}")]
    ConfigValidation { details: String },

    #[error("Invalid repository URL: {0}")]
    RepositoryUrl(#[from] RepositoryUrlError),

    #[error("Release {tag} not found in {repository}")]
    ReleaseNotFound { repository: String, tag: String },

    #[error("Failed to fetch release {tag} of {repository}: {reason}")]
    ReleaseLookup {
        repository: String,
        tag: String,
        reason: String,
    },

    #[error("No such files on target release {tag}: requested {requested}")]
    EmptySelection { tag: String, requested: String },

    #[error("Failed to download {asset} from {url}: {reason}")]
    AssetDownload {
        asset: String,
        url: String,
        reason: String,
    },

    #[error("Output directory creation failed at {path}: {reason}")]
    OutputDirectoryCreation { path: PathBuf, reason: String },

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] eyre::Report),
}
