//! Vendor link resolvers.
//!
//! A resolver turns a vendor download page (HTML, JSON or script) into the
//! request for the artifact to install. Resolvers never perform I/O: when a
//! second page is needed they return a [`FollowUp`] and the install pipeline
//! fetches it and hands the results back through [`LinkResolver::follow`].

mod arduino;
mod assets;
mod fixed;
mod jetbrains;
mod line_scan;
mod netbeans;
pub mod scan;
mod sibling;
mod unity;

pub use arduino::ArduinoResolver;
pub use assets::ReleaseAssetsResolver;
pub use fixed::FixedLinksResolver;
pub use jetbrains::JetBrainsResolver;
pub use line_scan::LineScanResolver;
pub use netbeans::NetBeansResolver;
pub use scan::{LineScanner, MatchPolicy, ResolverState, SectionRule};
pub use sibling::SiblingChecksumResolver;
pub use unity::UnityResolver;

use crate::download::{DownloadBatch, DownloadRequest, DownloadResult};
use crate::error::ToolPrepError;
use crate::utils::Architecture;
use crate::verification::{ChecksumKind, ChecksumSpec};
use std::borrow::Cow;
use std::fmt::Debug;
use url::Url;

/// What a resolver hands back after looking at a page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The artifact request, with its checksum when the vendor publishes one.
    Ready(DownloadRequest),
    /// More pages are needed before the artifact is known.
    FollowUp(FollowUp),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FollowUp {
    pub requests: Vec<DownloadRequest>,
    pub step: NextStep,
}

/// Data carried from one resolution hop to the next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NextStep {
    SiblingChecksum {
        download: DownloadRequest,
        checksum_url: String,
        kind: ChecksumKind,
    },
    UnityRelease {
        release_page: String,
        checksum: ChecksumSpec,
    },
    ArduinoDownload {
        download_page: String,
        checksum_url: String,
    },
    NetBeansFiles {
        version: String,
        files_url: String,
    },
}

/// The page a resolver works on.
#[derive(Clone, Copy, Debug)]
pub struct ResolveInput<'a> {
    pub page_url: &'a str,
    pub page: Option<&'a DownloadResult>,
    pub architecture: Architecture,
}

impl<'a> ResolveInput<'a> {
    pub fn new(page_url: &'a str, page: Option<&'a DownloadResult>, architecture: Architecture) -> Self {
        Self {
            page_url,
            page,
            architecture,
        }
    }

    pub fn page(&self) -> Result<&'a DownloadResult, ToolPrepError> {
        let page = self
            .page
            .ok_or_else(|| ToolPrepError::page_syntax(self.page_url, "page was not fetched"))?;
        page.check()?;
        Ok(page)
    }

    pub fn page_text(&self) -> Result<Cow<'a, str>, ToolPrepError> {
        self.page()?.text()
    }

    /// URL relative links on the page resolve against.
    pub fn base_url(&self) -> &'a str {
        self.page
            .map(DownloadResult::effective_url)
            .unwrap_or(self.page_url)
    }
}

pub trait LinkResolver: Debug + Send + Sync {
    /// Request for the vendor page, or `None` when the resolver needs no page.
    fn page_request(&self, page_url: &str) -> Option<DownloadRequest> {
        Some(DownloadRequest::new(page_url))
    }

    fn resolve(&self, input: ResolveInput<'_>) -> Result<Resolution, ToolPrepError>;

    fn follow(
        &self,
        step: NextStep,
        _batch: &DownloadBatch,
        _architecture: Architecture,
    ) -> Result<Resolution, ToolPrepError> {
        Err(eyre::eyre!("{:?} cannot continue with {:?}", self, step).into())
    }
}

/// Resolves an `href` attribute, as written in the HTML source, against the
/// page it was found on.
pub(crate) fn absolutize(base: &str, href: &str) -> Result<String, ToolPrepError> {
    let base = Url::parse(base).map_err(|e| ToolPrepError::page_syntax(base, e.to_string()))?;
    let href = html_escape::decode_html_entities(href);
    base.join(&href)
        .map(String::from)
        .map_err(|e| ToolPrepError::page_syntax(base.as_str(), format!("invalid link {href:?}: {e}")))
}

/// First whitespace separated token of a checksum file.
pub(crate) fn first_token(url: &str, body: &str) -> Result<String, ToolPrepError> {
    body.split_whitespace()
        .next()
        .map(str::to_string)
        .ok_or_else(|| ToolPrepError::page_syntax(url, "checksum file is empty"))
}
