use super::types::{Release, ReleaseTag};
use crate::config::Secret;
use crate::error::RelFetchError;
use crate::repository::RepositoryReference;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing;
use url::Url;

const API_MEDIA_TYPE: &str = "application/vnd.github+json";
const BINARY_MEDIA_TYPE: &str = "application/octet-stream";

/// Thin wrapper over the hosting platform's REST API.
///
/// A single HTTP client is shared by the release lookup and every asset download.
#[derive(Clone, Debug)]
pub struct GitHubClient {
    http: Client,
    api_base_url: Url,
    token: Secret,
}

impl GitHubClient {
    pub fn new(api_base_url: Url, token: Secret) -> Result<Self, RelFetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("relfetch/", env!("CARGO_PKG_VERSION"))),
        );

        let http = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            http,
            api_base_url,
            token,
        })
    }

    pub fn api_base_url(&self) -> &Url {
        &self.api_base_url
    }

    fn authorization(&self) -> Result<HeaderValue, RelFetchError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.token.expose()))
            .map_err(|_| RelFetchError::ConfigValidation {
                details: "github_access_token contains characters not allowed in an HTTP header"
                    .to_string(),
            })?;
        value.set_sensitive(true);
        Ok(value)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, RelFetchError> {
        let mut url = self.api_base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RelFetchError::ConfigValidation {
                details: format!("API base URL {} cannot be used as a base", self.api_base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Authenticated GET for an asset's API URL that asks for the raw bytes.
    pub fn asset_request(&self, url: &str) -> Result<RequestBuilder, RelFetchError> {
        Ok(self
            .http
            .get(url)
            .header(AUTHORIZATION, self.authorization()?)
            .header(ACCEPT, HeaderValue::from_static(BINARY_MEDIA_TYPE)))
    }

    pub async fn resolve_release(
        &self,
        repository: &RepositoryReference,
        tag: &ReleaseTag,
    ) -> Result<Release, RelFetchError> {
        let url = match tag {
            ReleaseTag::Latest => self.endpoint(&[
                "repos",
                repository.owner.as_str(),
                repository.name.as_str(),
                "releases",
                "latest",
            ])?,
            ReleaseTag::Named(tag) => self.endpoint(&[
                "repos",
                repository.owner.as_str(),
                repository.name.as_str(),
                "releases",
                "tags",
                tag.as_str(),
            ])?,
        };
        tracing::debug!(%url, "Requesting release metadata");

        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.authorization()?)
            .header(ACCEPT, HeaderValue::from_static(API_MEDIA_TYPE))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RelFetchError::ReleaseNotFound {
                repository: repository.slug(),
                tag: tag.to_string(),
            });
        }
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RelFetchError::ReleaseLookup {
                repository: repository.slug(),
                tag: tag.to_string(),
                reason: format!("HTTP {status}: {}", body.trim()),
            });
        }

        let release: Release = serde_json::from_str(&body)?;
        tracing::info!(
            tag = %release.tag_name,
            assets = release.assets.len(),
            "Resolved release of {}",
            repository.slug()
        );
        Ok(release)
    }
}
