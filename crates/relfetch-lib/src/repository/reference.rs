use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

const GIT_SUFFIX: &str = ".git";
const GITHUB_HOST: &str = "github.com";
const GITHUB_API_BASE_URL: &str = "https://api.github.com";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryUrlError {
    #[error(
        "{url} is not a supported repository URL (expected https://, git@ or ssh:// form)"
    )]
    UnsupportedShape { url: String },

    #[error("Malformed repository URL {url}: {reason}")]
    Malformed { url: String, reason: &'static str },
}

/// Location of a repository on a hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryReference {
    pub host: String,
    pub owner: String,
    pub name: String,
}

impl RepositoryReference {
    /// `owner/name`, as used in API paths and log messages.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// REST API root for the host. Hosts other than github.com are treated as
    /// GitHub Enterprise Server instances.
    pub fn api_base_url(&self) -> String {
        if self.host == GITHUB_HOST {
            GITHUB_API_BASE_URL.to_string()
        } else {
            format!("https://{}/api/v3", self.host)
        }
    }
}

impl Display for RepositoryReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.host, self.owner, self.name)
    }
}

impl FromStr for RepositoryReference {
    type Err = RepositoryUrlError;

    // Accepted forms:
    //   https://host/owner/name[.git]
    //   git@host:owner/name[.git]
    //   ssh://[user@]host[:port]/owner/name[.git]
    fn from_str(url: &str) -> Result<Self, Self::Err> {
        let malformed = |reason| RepositoryUrlError::Malformed {
            url: url.to_string(),
            reason,
        };

        let trimmed = url.strip_suffix(GIT_SUFFIX).unwrap_or(url);

        let (host, path) = if let Some(rest) = trimmed.strip_prefix("https://") {
            rest.split_once('/')
                .ok_or_else(|| malformed("missing '/' after host"))?
        } else if let Some(rest) = trimmed.strip_prefix("git@") {
            rest.split_once(':')
                .ok_or_else(|| malformed("missing ':' after host"))?
        } else if let Some(rest) = trimmed.strip_prefix("ssh://") {
            let rest = rest.split_once('@').map_or(rest, |(_user, rest)| rest);
            let (authority, path) = rest
                .split_once('/')
                .ok_or_else(|| malformed("missing '/' after host"))?;
            let host = match authority.split_once(':') {
                Some((host, port)) => {
                    port.parse::<u16>()
                        .map_err(|_| malformed("port is not a number"))?;
                    host
                }
                None => authority,
            };
            (host, path)
        } else {
            return Err(RepositoryUrlError::UnsupportedShape {
                url: url.to_string(),
            });
        };

        if host.is_empty() {
            return Err(malformed("empty host"));
        }

        let mut components = path.split('/');
        match (components.next(), components.next(), components.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => Ok(Self {
                host: host.to_string(),
                owner: owner.to_string(),
                name: name.to_string(),
            }),
            _ => Err(malformed("expected exactly <owner>/<name> after host")),
        }
    }
}
