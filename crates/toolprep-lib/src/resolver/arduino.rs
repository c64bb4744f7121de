use super::scan::pattern;
use super::{FollowUp, LinkResolver, NextStep, Resolution, ResolveInput, absolutize};
use crate::download::{DownloadBatch, DownloadRequest};
use crate::error::ToolPrepError;
use crate::utils::Architecture;
use crate::verification::{ChecksumKind, ChecksumSpec};
use regex::Regex;

/// The Arduino IDE. Its software page links to a contribution page (which
/// sets session cookies and holds the real download button) and to a
/// checksum listing with one MD5 per release archive.
#[derive(Clone, Debug, Default)]
pub struct ArduinoResolver;

fn archive_name(architecture: Architecture) -> String {
    // Release archives only, never the nightly builds.
    format!(r"arduino-[\d.\-r]+-linux{}\.tar\.xz", architecture.bits())
}

fn capture(regex: &Regex, text: &str) -> Option<String> {
    regex
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

impl LinkResolver for ArduinoResolver {
    fn resolve(&self, input: ResolveInput<'_>) -> Result<Resolution, ToolPrepError> {
        let page = input.page_text()?;
        let link = pattern(&format!(r#"href="([^"]*{})""#, archive_name(input.architecture)))?;
        let checksums = pattern(r#"href="([^"]+)"[^>]*>[^<]*Checksums"#)?;

        let download_page = capture(&link, &page)
            .ok_or_else(|| ToolPrepError::page_syntax(input.page_url, "can't parse the download link"))?;
        let checksum_url = capture(&checksums, &page)
            .ok_or_else(|| ToolPrepError::page_syntax(input.page_url, "can't parse the checksum link"))?;
        let download_page = absolutize(input.base_url(), &download_page)?;
        let checksum_url = absolutize(input.base_url(), &checksum_url)?;

        Ok(Resolution::FollowUp(FollowUp {
            requests: vec![
                DownloadRequest::new(&download_page),
                DownloadRequest::new(&checksum_url),
            ],
            step: NextStep::ArduinoDownload {
                download_page,
                checksum_url,
            },
        }))
    }

    fn follow(&self, step: NextStep, batch: &DownloadBatch, architecture: Architecture) -> Result<Resolution, ToolPrepError> {
        let NextStep::ArduinoDownload {
            download_page,
            checksum_url,
        } = step
        else {
            return Err(eyre::eyre!("Arduino cannot continue with another vendor's step").into());
        };

        let listing = batch.get(&checksum_url)?.text()?;
        let md5 = pattern(&format!(r"(?m)^(\S+)\s+{}\s*$", archive_name(architecture)))?;
        let digest = capture(&md5, &listing)
            .ok_or_else(|| ToolPrepError::page_syntax(&checksum_url, "can't find a checksum"))?;

        let page = batch.get(&download_page)?;
        let button = pattern(r#"<a[^>]*href="([^"]+)"[^>]*>\s*<button[^>]*>[^<]*JUST DOWNLOAD"#)?;
        let href = capture(&button, &page.text()?)
            .ok_or_else(|| ToolPrepError::page_syntax(&download_page, "can't parse download button"))?;
        let url = absolutize(page.effective_url(), &href)?;

        tracing::info!(%url, cookies = ?page.cookies, "Final download url");
        Ok(Resolution::Ready(
            DownloadRequest::new(url)
                .with_checksum(ChecksumSpec::new(ChecksumKind::Md5, digest))
                .with_cookies(page.cookies.clone()),
        ))
    }
}
