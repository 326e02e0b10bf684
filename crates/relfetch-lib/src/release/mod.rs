mod client;
mod selector;
mod types;

pub use client::GitHubClient;
pub use selector::select_assets;
pub use types::{Asset, Release, ReleaseTag};
