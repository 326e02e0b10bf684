use super::types::Release;
use crate::download::DownloadTask;
use crate::error::RelFetchError;
use itertools::Itertools;
use std::collections::HashSet;
use tracing;

/// Picks the release assets whose names exactly match one of `requested`.
///
/// Tasks follow the release's asset order and each asset yields at most one
/// task, however often its name is requested. Requested names missing from
/// the release are only logged; the selection fails when nothing matches.
pub fn select_assets(
    release: &Release,
    requested: &[String],
) -> Result<Vec<DownloadTask>, RelFetchError> {
    let requested_set: HashSet<&str> = requested.iter().map(String::as_str).collect();

    let tasks: Vec<DownloadTask> = release
        .assets
        .iter()
        .filter(|asset| requested_set.contains(asset.name.as_str()))
        .map(|asset| DownloadTask {
            file_name: asset.name.clone(),
            file_url: asset.url.clone(),
        })
        .collect();

    if tasks.is_empty() {
        return Err(RelFetchError::EmptySelection {
            tag: release.tag_name.clone(),
            requested: requested.iter().join(", "),
        });
    }

    let available: HashSet<&str> = release.assets.iter().map(|a| a.name.as_str()).collect();
    for name in requested_set.difference(&available).sorted() {
        tracing::warn!(
            file = name,
            tag = %release.tag_name,
            "Requested file is not attached to the release"
        );
    }

    tracing::debug!(
        "Selected {}",
        tasks.iter().map(|task| task.file_name.as_str()).join(", ")
    );
    Ok(tasks)
}
