use super::scan::pattern;
use super::{FollowUp, LinkResolver, NextStep, Resolution, ResolveInput};
use crate::download::{DownloadBatch, DownloadRequest};
use crate::error::ToolPrepError;
use crate::utils::Architecture;
use crate::verification::{ChecksumKind, ChecksumSpec};

const ARTIFACTS_BASE: &str = "https://netbeans.org/images_www/v6/download";
const DOWNLOAD_BASE: &str = "http://download.netbeans.org/netbeans";

/// NetBeans zip distribution. The download page only names the current
/// version; the artifact list with SHA-256 sums lives in a per-version
/// `files.js`.
#[derive(Clone, Debug, Default)]
pub struct NetBeansResolver;

impl LinkResolver for NetBeansResolver {
    fn resolve(&self, input: ResolveInput<'_>) -> Result<Resolution, ToolPrepError> {
        let page = input.page_text()?;
        let location = pattern(r#"/images_www/v6/download/([^/"]+)/"#)?;
        let version = page
            .lines()
            .rev()
            .filter_map(|line| location.captures(line))
            .find_map(|captures| captures.get(1))
            .map(|m| m.as_str().trim().to_string())
            .ok_or_else(|| ToolPrepError::page_syntax(input.page_url, "could not determine latest version"))?;

        let files_url = format!("{ARTIFACTS_BASE}/{version}/final/js/files.js");
        tracing::info!(%version, "Found NetBeans version");

        Ok(Resolution::FollowUp(FollowUp {
            requests: vec![DownloadRequest::new(&files_url)],
            step: NextStep::NetBeansFiles { version, files_url },
        }))
    }

    fn follow(&self, step: NextStep, batch: &DownloadBatch, _architecture: Architecture) -> Result<Resolution, ToolPrepError> {
        let NextStep::NetBeansFiles { version, files_url } = step else {
            return Err(eyre::eyre!("NetBeans cannot continue with another vendor's step").into());
        };

        let files = batch.get(&files_url)?.text()?;
        let entry = pattern(&format!(
            r#"^\s*add_file\("zip/netbeans-{}-[0-9]{{12}}\.zip""#,
            regex::escape(&version)
        ))?;
        let line = files
            .lines()
            .rev()
            .find(|line| entry.is_match(line))
            .ok_or_else(|| ToolPrepError::page_syntax(&files_url, "no zip distribution listed"))?;

        let cleaned = line
            .trim()
            .trim_start_matches("add_file(")
            .trim_end_matches(");")
            .replace('"', "");
        let fields: Vec<&str> = cleaned.split(", ").collect();
        let (Some(suffix), Some(sha256)) = (fields.first(), fields.get(2)) else {
            return Err(ToolPrepError::page_syntax(&files_url, "malformed add_file entry"));
        };

        let url = format!("{DOWNLOAD_BASE}/{version}/final/{suffix}");
        tracing::debug!(%url, %sha256, "Found download link");
        Ok(Resolution::Ready(
            DownloadRequest::new(url).with_checksum(ChecksumSpec::new(ChecksumKind::Sha256, sha256)),
        ))
    }
}
