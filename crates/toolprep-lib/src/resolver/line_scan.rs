use super::scan::{LineScanner, SectionRule, pattern};
use super::{LinkResolver, Resolution, ResolveInput, absolutize};
use crate::download::DownloadRequest;
use crate::error::ToolPrepError;
use crate::utils::{ArchNames, Architecture};
use crate::verification::{ChecksumKind, ChecksumSpec};
use std::fmt::{Debug, Formatter};

type ScannerFactory = fn(Architecture) -> Result<LineScanner, ToolPrepError>;

/// Single page resolver: the artifact link (and optionally an inline
/// checksum) is scraped straight from the vendor page.
pub struct LineScanResolver {
    vendor: &'static str,
    scanner: ScannerFactory,
    checksum_kind: Option<ChecksumKind>,
}

impl LineScanResolver {
    pub fn new(vendor: &'static str, scanner: ScannerFactory) -> Self {
        Self {
            vendor,
            scanner,
            checksum_kind: None,
        }
    }

    pub fn with_inline_checksum(mut self, kind: ChecksumKind) -> Self {
        self.checksum_kind = Some(kind);
        self
    }

    pub fn stencyl() -> Self {
        Self::new("stencyl", |arch| {
            Ok(LineScanner::new(
                SectionRule::sticky(">Linux <", Some(r#"<div class="spacer"><br/><br/>"#)),
                pattern(&format!(r#"href="([^"]*)"><.*{}-"#, arch.bits()))?,
            ))
        })
    }

    pub fn twine() -> Self {
        Self::new("twine", |arch| {
            Ok(LineScanner::new(
                SectionRule::Always,
                pattern(&format!(r#"href="([^"]*)" .*linux{}"#, arch.bits()))?,
            ))
        })
    }

    pub fn sublime_text() -> Self {
        const ARCH_NAMES: ArchNames = ArchNames::new("x32", "x64");
        Self::new("sublime-text", |arch| {
            Ok(LineScanner::new(
                SectionRule::per_line([".tar.bz2"]),
                pattern(&format!(
                    r#"href="([^<"]*{}\.tar\.bz2)""#,
                    regex::escape(ARCH_NAMES.get(arch))
                ))?,
            ))
        })
    }
}

impl Debug for LineScanResolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineScanResolver")
            .field("vendor", &self.vendor)
            .field("checksum_kind", &self.checksum_kind)
            .finish()
    }
}

impl LinkResolver for LineScanResolver {
    fn resolve(&self, input: ResolveInput<'_>) -> Result<Resolution, ToolPrepError> {
        let page = input.page_text()?;
        let scanner = (self.scanner)(input.architecture)?;
        let (href, state) = scanner.scan_for_url(input.page_url, &page)?;

        let mut request = DownloadRequest::new(absolutize(input.base_url(), &href)?);
        if let Some(kind) = self.checksum_kind {
            let digest = state.scraped_checksum_value.ok_or_else(|| {
                ToolPrepError::page_syntax(input.page_url, "missing checksum next to the download link")
            })?;
            request = request.with_checksum(ChecksumSpec::new(kind, digest));
        }

        tracing::debug!(vendor = self.vendor, url = %request.url, "Found download link");
        Ok(Resolution::Ready(request))
    }
}
