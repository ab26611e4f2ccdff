//! Fetch the upstream source tree into a local directory.
//!
//! The default fetcher shells out to `git clone --depth 1`; no shell is involved and the URL is
//! passed as a single argument. Tests substitute their own fetcher that lays out a fixture tree.

use std::path::Path;
use std::process::Command;

/// Clone failure. Always fatal: nothing has been written to the target yet.
#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    #[error("unsupported repository url: {0}")]
    InvalidUrl(String),
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("git clone of {url} failed ({status}): {stderr}")]
    Failed {
        url: String,
        status: String,
        stderr: String,
    },
}

/// Populates `dest` (which must not exist yet) with the source repository contents.
pub trait SourceFetcher {
    fn fetch(&self, dest: &Path) -> Result<(), CloneError>;

    /// Human-readable origin for progress output.
    fn describe(&self) -> String;
}

/// Shallow git clone of a remote repository.
#[derive(Debug, Clone)]
pub struct GitFetcher {
    url: String,
}

impl GitFetcher {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Accept https/http/ssh/file URLs and scp-style `git@host:path`; reject whitespace and
/// anything that git would read as an option.
pub fn validate_repository_url(url: &str) -> Result<(), CloneError> {
    let supported = ["https://", "http://", "ssh://", "file://", "git@"]
        .iter()
        .any(|scheme| url.starts_with(scheme));
    if !supported || url.chars().any(char::is_whitespace) {
        return Err(CloneError::InvalidUrl(url.to_string()));
    }
    Ok(())
}

impl SourceFetcher for GitFetcher {
    fn fetch(&self, dest: &Path) -> Result<(), CloneError> {
        validate_repository_url(&self.url)?;
        log::debug!("git clone --depth 1 {} {}", self.url, dest.display());
        let output = Command::new("git")
            .arg("clone")
            .arg("--depth")
            .arg("1")
            .arg("--")
            .arg(&self.url)
            .arg(dest)
            .output()?;
        if output.status.success() {
            Ok(())
        } else {
            Err(CloneError::Failed {
                url: self.url.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
