use crate::cli::args::FetchArgs;
use crate::cli::params::FetchParams;
use crate::config::{Config, load_config};
use crate::download::DownloadOptions;
use crate::error::RelFetchError;
use crate::release::ReleaseTag;
use crate::repository::RepositoryReference;
use std::path::PathBuf;
use url::Url;

pub fn resolve_fetch(args: FetchArgs) -> Result<FetchParams, RelFetchError> {
    let app_config = load_config(args.config_path.as_deref())?;
    resolve_fetch_with_config(app_config, args)
}

/// Applies command-line overrides to an already loaded configuration and
/// parses everything the fetch needs up front.
pub fn resolve_fetch_with_config(
    app_config: Config,
    args: FetchArgs,
) -> Result<FetchParams, RelFetchError> {
    let download_parallelism = args
        .download_parallelism
        .unwrap_or(app_config.download_parallelism);
    if download_parallelism == 0 {
        return Err(RelFetchError::ConfigValidation {
            details: "download-parallelism must be greater than 0.".to_string(),
        });
    }

    let output_dir = args
        .output_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| app_config.output_dir.clone());

    let repository: RepositoryReference = app_config.repository_url.parse()?;

    let api_base_url = app_config
        .api_base_url
        .clone()
        .unwrap_or_else(|| repository.api_base_url());
    let api_base_url = Url::parse(&api_base_url).map_err(|e| RelFetchError::ConfigValidation {
        details: format!("api_base_url {api_base_url} is not a valid URL: {e}"),
    })?;

    let tag = ReleaseTag::from(app_config.tag.as_str());
    let requested_files = app_config.requested_file_names();

    Ok(FetchParams {
        app_config,
        repository,
        tag,
        requested_files,
        api_base_url,
        options: DownloadOptions {
            output_dir,
            download_parallelism,
        },
    })
}
