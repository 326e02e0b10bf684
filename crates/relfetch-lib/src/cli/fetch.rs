use crate::cli::FetchParams;
use crate::download::download_all;
use crate::error::RelFetchError;
use crate::release::{GitHubClient, select_assets};
use std::path::PathBuf;
use tracing;

pub async fn run_fetch(params: FetchParams) -> Result<Vec<PathBuf>, RelFetchError> {
    let FetchParams {
        app_config,
        repository,
        tag,
        requested_files,
        api_base_url,
        options,
    } = params;

    tracing::info!(
        repository_url = %app_config.repository_url,
        tag = %tag,
        source = %app_config.file_names,
        github_access_token = %app_config.access_token,
        output_dir = %options.output_dir.display(),
        "Configuration"
    );

    let client = GitHubClient::new(api_base_url, app_config.access_token)?;

    tracing::info!(
        "Fetching release {} of {} from {}",
        tag,
        repository,
        client.api_base_url()
    );
    let release = client.resolve_release(&repository, &tag).await?;

    let tasks = select_assets(&release, &requested_files)?;

    tracing::info!("Downloading {} files...", tasks.len());
    let downloaded = download_all(&client, tasks, &options).await?;

    tracing::info!("Successfully downloaded {} files", downloaded.len());
    Ok(downloaded)
}
