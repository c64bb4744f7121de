use super::scan::{LineScanner, MatchPolicy, SectionRule, pattern};
use super::{FollowUp, LinkResolver, NextStep, Resolution, ResolveInput};
use crate::download::{DownloadBatch, DownloadRequest};
use crate::error::ToolPrepError;
use crate::utils::Architecture;
use crate::verification::{ChecksumKind, ChecksumSpec};

/// Unity editor for Linux, announced in a forum thread that appends each new
/// build at the bottom. The newest (last) release note links to a page that
/// carries the installer script.
#[derive(Clone, Debug, Default)]
pub struct UnityResolver;

impl UnityResolver {
    fn scanner() -> Result<LineScanner, ToolPrepError> {
        Ok(LineScanner::new(
            SectionRule::sticky("beta.unity", None),
            pattern(r#"href="(https?://beta\.unity[^"]*\.html)" target"#)?,
        )
        .with_checksum_pattern(pattern(r"sh: (\w+)\)")?)
        .with_policy(MatchPolicy::Last))
    }
}

impl LinkResolver for UnityResolver {
    fn resolve(&self, input: ResolveInput<'_>) -> Result<Resolution, ToolPrepError> {
        let page = input.page_text()?;
        let (release_page, state) = Self::scanner()?.scan_for_url(input.page_url, &page)?;
        let digest = state
            .scraped_checksum_value
            .ok_or_else(|| ToolPrepError::page_syntax(input.page_url, "missing checksum"))?;
        tracing::debug!(%release_page, %digest, "Found release notes");

        Ok(Resolution::FollowUp(FollowUp {
            requests: vec![DownloadRequest::new(&release_page)],
            step: NextStep::UnityRelease {
                release_page,
                checksum: ChecksumSpec::new(ChecksumKind::Sha1, digest),
            },
        }))
    }

    fn follow(&self, step: NextStep, batch: &DownloadBatch, _architecture: Architecture) -> Result<Resolution, ToolPrepError> {
        let NextStep::UnityRelease { release_page, checksum } = step else {
            return Err(eyre::eyre!("Unity cannot continue with another vendor's step").into());
        };

        let body = batch.get(&release_page)?.text()?;
        let installer = pattern(r#"https?://[^\s"'<>]+?\.sh\b"#)?
            .find(&body)
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| ToolPrepError::page_syntax(&release_page, "missing installer link"))?;

        tracing::debug!(url = %installer, %checksum, "Found download link");
        Ok(Resolution::Ready(DownloadRequest::new(installer).with_checksum(checksum)))
    }
}
