use super::sibling::follow_sibling_checksum;
use super::{FollowUp, LinkResolver, NextStep, Resolution, ResolveInput};
use crate::download::{DownloadBatch, DownloadRequest};
use crate::error::ToolPrepError;
use crate::utils::Architecture;
use crate::verification::ChecksumKind;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Resolves JetBrains products through the releases JSON API.
///
/// The API answers `{"<code>": [release, ...]}` with the newest release first.
/// Each release links to its linux tarball and to a SHA-256 checksum file.
#[derive(Clone, Debug, Default)]
pub struct JetBrainsResolver;

#[derive(Debug, Deserialize)]
struct Release {
    downloads: Downloads,
}

#[derive(Debug, Deserialize)]
struct Downloads {
    linux: LinuxDownload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinuxDownload {
    link: String,
    checksum_link: String,
}

impl JetBrainsResolver {
    pub fn releases_page(code: &str) -> String {
        format!("https://data.services.jetbrains.com/products/releases?code={code}")
    }
}

impl LinkResolver for JetBrainsResolver {
    fn resolve(&self, input: ResolveInput<'_>) -> Result<Resolution, ToolPrepError> {
        let page = input.page()?;
        let releases: BTreeMap<String, Vec<serde_json::Value>> = serde_json::from_slice(page.bytes()?)
            .map_err(|e| ToolPrepError::page_syntax(input.page_url, format!("not a release list: {e}")))?;

        let latest = releases.into_values().next().and_then(|list| list.into_iter().next());
        let Some(latest) = latest else {
            let channel = if input.page_url.contains("&type=eap") { "EAP" } else { "Stable" };
            return Err(ToolPrepError::page_syntax(
                input.page_url,
                format!("No {channel} version available"),
            ));
        };

        let release: Release = serde_json::from_value(latest).map_err(|e| {
            ToolPrepError::page_syntax(input.page_url, format!("can't parse the download URL: {e}"))
        })?;
        let linux = release.downloads.linux;
        tracing::debug!(url = %linux.link, checksum_url = %linux.checksum_link, "Found download link");

        Ok(Resolution::FollowUp(FollowUp {
            requests: vec![DownloadRequest::new(&linux.checksum_link)],
            step: NextStep::SiblingChecksum {
                download: DownloadRequest::new(linux.link).ignoring_encoding(),
                checksum_url: linux.checksum_link,
                kind: ChecksumKind::Sha256,
            },
        }))
    }

    fn follow(&self, step: NextStep, batch: &DownloadBatch, _architecture: Architecture) -> Result<Resolution, ToolPrepError> {
        follow_sibling_checksum(step, batch)
    }
}
