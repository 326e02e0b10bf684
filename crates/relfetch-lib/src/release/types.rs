use crate::config::LATEST_TAG;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReleaseTag {
    Latest,
    Named(String),
}

impl From<&str> for ReleaseTag {
    fn from(value: &str) -> Self {
        let value = value.trim();
        if value == LATEST_TAG {
            Self::Latest
        } else {
            Self::Named(value.to_string())
        }
    }
}

impl Display for ReleaseTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Latest => f.write_str(LATEST_TAG),
            Self::Named(tag) => f.write_str(tag),
        }
    }
}

/// A file attached to a release.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Asset {
    pub id: u64,
    pub name: String,
    /// API endpoint that serves the raw bytes when requested with
    /// `Accept: application/octet-stream`
    pub url: String,
    #[serde(default)]
    pub browser_download_url: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}
