use super::{LinkResolver, Resolution, ResolveInput};
use crate::download::DownloadRequest;
use crate::error::ToolPrepError;
use crate::utils::{ArchNames, Architecture};
use serde::Deserialize;

/// Picks an artifact from a GitHub "latest release" document by looking for
/// a marker in each asset's download URL. The first matching asset wins.
#[derive(Clone, Debug)]
pub struct ReleaseAssetsResolver {
    marker: String,
    arch_names: Option<ArchNames>,
}

#[derive(Debug, Deserialize)]
struct Release {
    assets: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
struct Asset {
    browser_download_url: String,
}

impl ReleaseAssetsResolver {
    /// Matches assets containing `marker` regardless of architecture.
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            arch_names: None,
        }
    }

    /// Matches assets containing `prefix` directly followed by the vendor's name for the architecture.
    pub fn per_architecture(prefix: impl Into<String>, arch_names: ArchNames) -> Self {
        Self {
            marker: prefix.into(),
            arch_names: Some(arch_names),
        }
    }

    pub fn latest_release_page(repository: &str) -> String {
        format!("https://api.github.com/repos/{repository}/releases/latest")
    }

    pub fn superpowers() -> Self {
        Self::per_architecture("linux-", ArchNames::new("ia32", "x64"))
    }

    pub fn processing() -> Self {
        Self::per_architecture("linux", ArchNames::new("32", "64"))
    }

    pub fn lighttable() -> Self {
        Self::new("linux")
    }

    pub fn atom() -> Self {
        Self::new("tar.gz")
    }

    fn marker_for(&self, arch: Architecture) -> String {
        match &self.arch_names {
            Some(names) => format!("{}{}", self.marker, names.get(arch)),
            None => self.marker.clone(),
        }
    }
}

impl LinkResolver for ReleaseAssetsResolver {
    fn resolve(&self, input: ResolveInput<'_>) -> Result<Resolution, ToolPrepError> {
        let page = input.page()?;
        let release: Release = serde_json::from_slice(page.bytes()?)
            .map_err(|e| ToolPrepError::page_syntax(input.page_url, format!("not a release document: {e}")))?;

        let marker = self.marker_for(input.architecture);
        let url = release
            .assets
            .into_iter()
            .map(|asset| asset.browser_download_url)
            .find(|url| url.contains(&marker))
            .ok_or_else(|| {
                ToolPrepError::page_syntax(input.page_url, format!("no release asset matches {marker:?}"))
            })?;

        tracing::debug!(%url, "Found download link");
        Ok(Resolution::Ready(DownloadRequest::new(url)))
    }
}
