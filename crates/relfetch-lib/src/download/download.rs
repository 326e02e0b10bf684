use super::types::{DownloadOptions, DownloadTask};
use crate::error::RelFetchError;
use crate::release::GitHubClient;
use eyre::{WrapErr, eyre};
use futures::stream::{FuturesUnordered, StreamExt};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::{Semaphore, watch};
use tracing::{info, warn};

const PARTIAL_SUFFIX: &str = ".part";

fn partial_path(output_path: &Path) -> PathBuf {
    let mut path = OsString::from(output_path.as_os_str());
    path.push(PARTIAL_SUFFIX);
    PathBuf::from(path)
}

/// Downloads every task into `options.output_dir`, at most
/// `options.download_parallelism` at a time.
///
/// Returns the written paths in completion order once all tasks have
/// finished. The first failure stops the run: the remaining downloads are
/// told to stop, awaited until they have, their `.part` files removed, and
/// that failure is returned.
pub async fn download_all(
    client: &GitHubClient,
    tasks: Vec<DownloadTask>,
    options: &DownloadOptions,
) -> Result<Vec<PathBuf>, RelFetchError> {
    let output_dir = options.output_dir.as_path();
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| RelFetchError::OutputDirectoryCreation {
            path: output_dir.to_path_buf(),
            reason: e.to_string(),
        })?;

    let semaphore = Semaphore::new(options.download_parallelism.max(1));
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let partial_paths: Vec<PathBuf> = tasks
        .iter()
        .map(|task| partial_path(&output_dir.join(&task.file_name)))
        .collect();

    let mut futs = tasks
        .iter()
        .map(|task| download_task(client, &semaphore, cancel_rx.clone(), task, output_dir))
        .collect::<FuturesUnordered<_>>();

    tracing::info!("Waiting for {} downloads to finish...", tasks.len());

    let mut downloaded = Vec::with_capacity(tasks.len());
    let mut failure = None;
    while let Some(res) = futs.next().await {
        match res {
            Ok(path) => downloaded.push(path),
            Err(err) if failure.is_none() => {
                warn!("Download failed, cancelling remaining downloads: {}", err);
                cancel_tx.send_replace(true);
                failure = Some(err);
            }
            // Siblings keep draining after a failure so no file operation
            // outlives the cleanup below.
            Err(err) => tracing::debug!("Stopped download: {}", err),
        }
    }

    match failure {
        None => Ok(downloaded),
        Some(err) => {
            remove_partial_files(&partial_paths).await;
            Err(err)
        }
    }
}

async fn remove_partial_files(partial_paths: &[PathBuf]) {
    for path in partial_paths {
        match tokio::fs::remove_file(path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "Removed partial download"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), "Failed to remove partial download: {}", e),
        }
    }
}

/// Resolves `fut` unless the run is cancelled first.
async fn unless_cancelled<T>(
    cancel: &mut watch::Receiver<bool>,
    fut: impl Future<Output = T>,
) -> eyre::Result<T> {
    tokio::select! {
        biased;
        _ = cancel.wait_for(|cancelled| *cancelled) => {
            Err(eyre!("Cancelled after another download failed"))
        }
        value = fut => Ok(value),
    }
}

async fn download_task(
    client: &GitHubClient,
    semaphore: &Semaphore,
    mut cancel: watch::Receiver<bool>,
    task: &DownloadTask,
    output_dir: &Path,
) -> Result<PathBuf, RelFetchError> {
    let output_path = output_dir.join(&task.file_name);
    let download_error = |e: eyre::Report| RelFetchError::AssetDownload {
        asset: task.file_name.clone(),
        url: task.file_url.clone(),
        reason: format!("{:#}", e),
    };

    let _permit = unless_cancelled(&mut cancel, semaphore.acquire())
        .await
        .map_err(download_error)?
        .wrap_err("Download semaphore closed")?;

    info!(asset = %task.file_name, output = %output_path.display(), "Downloading");

    let bytes = stream_to_file(client, &mut cancel, task, &output_path)
        .await
        .map_err(download_error)?;

    info!(asset = %task.file_name, output = %output_path.display(), bytes, "Downloaded");
    Ok(output_path)
}

/// Streams the asset body into a `.part` file next to `output_path`, then
/// renames it into place, replacing any existing file.
async fn stream_to_file(
    client: &GitHubClient,
    cancel: &mut watch::Receiver<bool>,
    task: &DownloadTask,
    output_path: &Path,
) -> eyre::Result<u64> {
    let request = client.asset_request(&task.file_url)?;
    let mut response = unless_cancelled(cancel, request.send())
        .await?
        .wrap_err("Request failed")?
        .error_for_status()
        .wrap_err("Server refused the download")?;
    let expected_len = response.content_length();

    let staging_path = partial_path(output_path);
    let file = tokio::fs::File::create(&staging_path)
        .await
        .wrap_err_with(|| format!("Failed to create output file: {}", staging_path.display()))?;
    let mut writer = BufWriter::new(file);

    let mut written: u64 = 0;
    while let Some(chunk) = unless_cancelled(cancel, response.chunk())
        .await?
        .wrap_err("Failed to read response body")?
    {
        writer
            .write_all(&chunk)
            .await
            .wrap_err_with(|| format!("Failed to write to {}", staging_path.display()))?;
        written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .wrap_err_with(|| format!("Failed to flush {}", staging_path.display()))?;
    drop(writer);

    match expected_len {
        Some(expected_len) if expected_len != written => {
            eyre::bail!("Body truncated: expected {expected_len} bytes, received {written}");
        }
        _ => {}
    }

    tokio::fs::rename(&staging_path, output_path)
        .await
        .wrap_err_with(|| format!("Failed to move download into {}", output_path.display()))?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Secret;
    use mockito::{Server, ServerGuard};
    use std::time::{Duration, Instant};
    use url::Url;

    fn client(server: &ServerGuard) -> GitHubClient {
        GitHubClient::new(Url::parse(&server.url()).unwrap(), Secret::from("ghp_test")).unwrap()
    }

    fn task(server: &ServerGuard, name: &str, id: u32) -> DownloadTask {
        DownloadTask {
            file_name: name.to_string(),
            file_url: format!("{}/repos/acme/widgets/releases/assets/{id}", server.url()),
        }
    }

    fn options(dir: &Path, download_parallelism: usize) -> DownloadOptions {
        DownloadOptions {
            output_dir: dir.to_path_buf(),
            download_parallelism,
        }
    }

    #[tokio::test]
    async fn test_downloads_all_tasks_with_auth_headers() {
        let mut server = Server::new_async().await;
        let mut mocks = Vec::new();
        for id in 1..=5 {
            mocks.push(
                server
                    .mock("GET", format!("/repos/acme/widgets/releases/assets/{id}").as_str())
                    .match_header("authorization", "Bearer ghp_test")
                    .match_header("accept", "application/octet-stream")
                    .with_status(200)
                    .with_body(format!("contents of asset {id}").repeat(1000))
                    .expect(1)
                    .create_async()
                    .await,
            );
        }

        let dir = tempfile::tempdir().unwrap();
        let tasks: Vec<_> = (1..=5)
            .map(|id| task(&server, &format!("asset-{id}.bin"), id))
            .collect();

        let downloaded = download_all(&client(&server), tasks, &options(dir.path(), 2))
            .await
            .expect("downloads should succeed");

        assert_eq!(downloaded.len(), 5);
        for mock in &mocks {
            mock.assert_async().await;
        }
        for id in 1..=5 {
            let contents = std::fs::read_to_string(dir.path().join(format!("asset-{id}.bin")))
                .expect("file should exist");
            assert_eq!(contents, format!("contents of asset {id}").repeat(1000));
            assert!(!dir.path().join(format!("asset-{id}.bin.part")).exists());
        }
    }

    #[tokio::test]
    async fn test_existing_file_is_overwritten() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/acme/widgets/releases/assets/1")
            .with_status(200)
            .with_body("new")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.zip"), "old contents that are longer").unwrap();

        download_all(
            &client(&server),
            vec![task(&server, "a.zip", 1)],
            &options(dir.path(), 4),
        )
        .await
        .expect("download should succeed");

        assert_eq!(std::fs::read_to_string(dir.path().join("a.zip")).unwrap(), "new");
    }

    #[tokio::test]
    async fn test_creates_missing_output_directory() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/acme/widgets/releases/assets/1")
            .with_status(200)
            .with_body("data")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("nested").join("dist");

        download_all(
            &client(&server),
            vec![task(&server, "a.zip", 1)],
            &options(&output_dir, 1),
        )
        .await
        .expect("download should succeed");

        assert!(output_dir.join("a.zip").is_file());
    }

    #[tokio::test]
    async fn test_failed_download_returns_error_and_leaves_no_partial_files() {
        let mut server = Server::new_async().await;
        let _healthy = server
            .mock("GET", "/repos/acme/widgets/releases/assets/1")
            .with_status(200)
            .with_body("fine")
            .create_async()
            .await;
        let _broken = server
            .mock("GET", "/repos/acme/widgets/releases/assets/2")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let result = download_all(
            &client(&server),
            vec![task(&server, "a.zip", 1), task(&server, "b.zip", 2)],
            &options(dir.path(), 4),
        )
        .await;

        match result {
            Err(RelFetchError::AssetDownload { asset, reason, .. }) => {
                assert_eq!(asset, "b.zip");
                assert!(reason.contains("500"), "{reason}");
                assert!(!reason.contains("ghp_test"), "{reason}");
            }
            other => panic!("expected AssetDownload error, got {other:?}"),
        }
        assert!(!dir.path().join("b.zip").exists());
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(PARTIAL_SUFFIX))
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
    }

    #[tokio::test]
    async fn test_failure_cancels_in_flight_sibling_and_removes_its_partial_file() {
        let mut server = Server::new_async().await;
        let _slow = server
            .mock("GET", "/repos/acme/widgets/releases/assets/1")
            .with_status(200)
            .with_chunked_body(|w| {
                w.write_all(b"first chunk of a large asset")?;
                w.flush()?;
                std::thread::sleep(Duration::from_secs(4));
                w.write_all(b"rest of the asset")
            })
            .create_async()
            .await;
        let _broken = server
            .mock("GET", "/repos/acme/widgets/releases/assets/2")
            .with_status(500)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let started = Instant::now();
        let result = download_all(
            &client(&server),
            vec![task(&server, "a.zip", 1), task(&server, "b.zip", 2)],
            &options(dir.path(), 2),
        )
        .await;
        let elapsed = started.elapsed();

        match result {
            Err(RelFetchError::AssetDownload { asset, .. }) => assert_eq!(asset, "b.zip"),
            other => panic!("expected AssetDownload error, got {other:?}"),
        }
        assert!(
            elapsed < Duration::from_secs(3),
            "slow sibling was not cancelled, took {elapsed:?}"
        );
        let remaining: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .map(|entry| entry.file_name())
            .collect();
        assert!(remaining.is_empty(), "{remaining:?}");
    }

    #[tokio::test]
    async fn test_queued_downloads_do_not_start_after_failure() {
        let mut server = Server::new_async().await;
        let _broken = server
            .mock("GET", "/repos/acme/widgets/releases/assets/1")
            .with_status(500)
            .create_async()
            .await;
        let queued = server
            .mock("GET", "/repos/acme/widgets/releases/assets/2")
            .with_status(200)
            .with_body("never requested")
            .expect(0)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let result = download_all(
            &client(&server),
            vec![task(&server, "a.zip", 1), task(&server, "b.zip", 2)],
            &options(dir.path(), 1),
        )
        .await;

        match result {
            Err(RelFetchError::AssetDownload { asset, .. }) => assert_eq!(asset, "a.zip"),
            other => panic!("expected AssetDownload error, got {other:?}"),
        }
        queued.assert_async().await;
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_asset_url_fails() {
        let server = Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();
        let unreachable = DownloadTask {
            file_name: "a.zip".to_string(),
            file_url: "http://127.0.0.1:9/assets/1".to_string(),
        };

        let result =
            download_all(&client(&server), vec![unreachable], &options(dir.path(), 1)).await;

        assert!(
            matches!(result, Err(RelFetchError::AssetDownload { .. })),
            "{result:?}"
        );
        assert!(!dir.path().join("a.zip").exists());
    }

    #[test]
    fn test_partial_path_appends_suffix() {
        assert_eq!(
            partial_path(Path::new("dist/a.tar.gz")),
            PathBuf::from("dist/a.tar.gz.part")
        );
    }
}
