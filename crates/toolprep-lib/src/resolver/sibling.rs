use super::scan::{LineScanner, SectionRule, pattern};
use super::{FollowUp, LinkResolver, NextStep, Resolution, ResolveInput, absolutize, first_token};
use crate::download::{DownloadBatch, DownloadRequest};
use crate::error::ToolPrepError;
use crate::utils::Architecture;
use crate::verification::{ChecksumKind, ChecksumSpec};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};

type ScannerFactory = Box<dyn Fn(Architecture) -> Result<LineScanner, ToolPrepError> + Send + Sync>;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
                                  Chrome/41.0.2272.76 Safari/537.36";

/// Two stage resolver for vendors publishing a checksum file next to each
/// artifact: the page yields the artifact link, the checksum lives at the
/// same link plus a suffix.
pub struct SiblingChecksumResolver {
    vendor: &'static str,
    scanner: ScannerFactory,
    base_url: Option<&'static str>,
    download_suffix: &'static str,
    checksum_suffix: &'static str,
    kind: ChecksumKind,
    page_headers: BTreeMap<String, String>,
}

impl SiblingChecksumResolver {
    pub fn new(
        vendor: &'static str,
        scanner: impl Fn(Architecture) -> Result<LineScanner, ToolPrepError> + Send + Sync + 'static,
        checksum_suffix: &'static str,
        kind: ChecksumKind,
    ) -> Self {
        Self {
            vendor,
            scanner: Box::new(scanner),
            base_url: None,
            download_suffix: "",
            checksum_suffix,
            kind,
            page_headers: BTreeMap::new(),
        }
    }

    /// Links are resolved against `base_url` rather than the page they were found on.
    pub fn with_base_url(mut self, base_url: &'static str) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn with_download_suffix(mut self, suffix: &'static str) -> Self {
        self.download_suffix = suffix;
        self
    }

    pub fn with_page_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.page_headers.insert(name.into(), value.into());
        self
    }

    /// Eclipse packages page; `keyword` is the package file prefix, e.g. `eclipse-java-`.
    pub fn eclipse(keyword: &'static str) -> Self {
        Self::new(
            "eclipse",
            move |arch| eclipse_scanner(keyword, arch),
            ".sha512&r=1",
            ChecksumKind::Sha512,
        )
        .with_base_url("https://www.eclipse.org/")
        .with_download_suffix("&r=1")
        .with_page_header("User-agent", BROWSER_USER_AGENT)
    }

    pub fn spring_tools_suite() -> Self {
        Self::new(
            "spring-tools-suite",
            |arch| {
                let marker = match arch {
                    Architecture::Amd64 => "linux-gtk-x86_64.tar.gz",
                    Architecture::I386 => "linux-gtk.tar.gz",
                };
                Ok(LineScanner::new(
                    SectionRule::per_line([marker]),
                    pattern(r#"href="([^"]*\.tar\.gz)""#)?,
                ))
            },
            ".sha1",
            ChecksumKind::Sha1,
        )
    }
}

fn eclipse_scanner(keyword: &str, arch: Architecture) -> Result<LineScanner, ToolPrepError> {
    let section = match arch {
        Architecture::Amd64 => SectionRule::per_line([keyword, "x86_64"]),
        Architecture::I386 => SectionRule::per_line([keyword]).rejecting(["x86_64"]),
    };
    Ok(LineScanner::new(section, pattern(r#"href="([^"]*)" title"#)?))
}

/// Completes a [`NextStep::SiblingChecksum`] from the fetched checksum file.
pub(crate) fn follow_sibling_checksum(step: NextStep, batch: &DownloadBatch) -> Result<Resolution, ToolPrepError> {
    let (download, checksum_url, kind) = match step {
        NextStep::SiblingChecksum {
            download,
            checksum_url,
            kind,
        } => (download, checksum_url, kind),
        other => return Err(eyre::eyre!("not a checksum follow-up: {:?}", other).into()),
    };

    let checksum_page = batch.get(&checksum_url)?;
    let digest = first_token(&checksum_url, &checksum_page.text()?)?;
    tracing::debug!(url = %download.url, %kind, %digest, "Obtained checksum");
    Ok(Resolution::Ready(download.with_checksum(ChecksumSpec::new(kind, digest))))
}

impl Debug for SiblingChecksumResolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiblingChecksumResolver")
            .field("vendor", &self.vendor)
            .field("checksum_suffix", &self.checksum_suffix)
            .field("kind", &self.kind)
            .finish()
    }
}

impl LinkResolver for SiblingChecksumResolver {
    fn page_request(&self, page_url: &str) -> Option<DownloadRequest> {
        let request = self
            .page_headers
            .iter()
            .fold(DownloadRequest::new(page_url), |request, (name, value)| {
                request.with_header(name, value)
            });
        Some(request)
    }

    fn resolve(&self, input: ResolveInput<'_>) -> Result<Resolution, ToolPrepError> {
        let page = input.page_text()?;
        let scanner = (self.scanner)(input.architecture)?;
        let (href, _) = scanner.scan_for_url(input.page_url, &page)?;

        let link = absolutize(self.base_url.unwrap_or(input.base_url()), &href)?;
        let download = DownloadRequest::new(format!("{link}{}", self.download_suffix));
        let checksum_url = format!("{link}{}", self.checksum_suffix);
        tracing::debug!(vendor = self.vendor, url = %download.url, %checksum_url, "Found download link");

        Ok(Resolution::FollowUp(FollowUp {
            requests: vec![DownloadRequest::new(&checksum_url)],
            step: NextStep::SiblingChecksum {
                download,
                checksum_url,
                kind: self.kind,
            },
        }))
    }

    fn follow(&self, step: NextStep, batch: &DownloadBatch, _architecture: Architecture) -> Result<Resolution, ToolPrepError> {
        follow_sibling_checksum(step, batch)
    }
}
