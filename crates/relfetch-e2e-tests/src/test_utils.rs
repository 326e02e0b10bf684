use config::Environment;
use eyre::Result;
use mockito::{Mock, ServerGuard};
use relfetch_lib::config::{Config, load_config_with_environment};
use serde_json::json;
use std::path::Path;

pub const TEST_TOKEN: &str = "ghp_e2e_token";
pub const TEST_TAG: &str = "v1.0.0";

/// Builds a configuration the way the binary does, from an environment map,
/// pointed at the mock API server.
pub fn create_test_config(
    server: &ServerGuard,
    tag: &str,
    source: &str,
    output_dir: &Path,
) -> Result<Config> {
    let vars = [
        ("github_access_token", TEST_TOKEN.to_string()),
        ("tag", tag.to_string()),
        ("source", source.to_string()),
        (
            "repository_url",
            "https://github.com/acme/widgets.git".to_string(),
        ),
        ("api_base_url", server.url()),
        ("output_dir", output_dir.display().to_string()),
    ];
    let source = vars
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect::<config::Map<String, String>>();

    Ok(load_config_with_environment(
        None,
        Environment::default().source(Some(source)),
    )?)
}

pub fn asset_path(asset_id: usize) -> String {
    format!("/repos/acme/widgets/releases/assets/{asset_id}")
}

pub fn asset_contents(name: &str) -> Vec<u8> {
    format!("binary payload of {name}\n").repeat(4096).into_bytes()
}

/// Release metadata listing `names` as assets with ids starting at 1.
pub fn release_body(server: &ServerGuard, tag: &str, names: &[&str]) -> String {
    let download_base = format!("https://github.com/acme/widgets/releases/download/{tag}");
    let assets: Vec<_> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            json!({
                "id": i + 1,
                "name": name,
                "url": format!("{}{}", server.url(), asset_path(i + 1)),
                "browser_download_url": format!("{download_base}/{name}"),
                "size": asset_contents(name).len(),
                "content_type": "application/zip",
            })
        })
        .collect();

    json!({
        "tag_name": tag,
        "name": tag,
        "assets": assets,
    })
    .to_string()
}

pub async fn mock_release(server: &mut ServerGuard, path: &str, body: String) -> Mock {
    server
        .mock("GET", path)
        .match_header("authorization", format!("Bearer {TEST_TOKEN}").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

pub async fn mock_asset(
    server: &mut ServerGuard,
    asset_id: usize,
    name: &str,
    expected_hits: usize,
) -> Mock {
    server
        .mock("GET", asset_path(asset_id).as_str())
        .match_header("authorization", format!("Bearer {TEST_TOKEN}").as_str())
        .match_header("accept", "application/octet-stream")
        .with_status(200)
        .with_header("content-type", "application/octet-stream")
        .with_body(asset_contents(name))
        .expect(expected_hits)
        .create_async()
        .await
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("relfetch_lib=debug,relfetch_e2e_tests=debug")
        .with_test_writer()
        .try_init()
        .ok();
}
