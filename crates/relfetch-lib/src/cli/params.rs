use crate::config::Config;
use crate::download::DownloadOptions;
use crate::release::ReleaseTag;
use crate::repository::RepositoryReference;
use url::Url;

#[derive(Debug, Clone)]
pub struct FetchParams {
    pub app_config: Config,
    pub repository: RepositoryReference,
    pub tag: ReleaseTag,
    pub requested_files: Vec<String>,
    pub api_base_url: Url,
    pub options: DownloadOptions,
}
