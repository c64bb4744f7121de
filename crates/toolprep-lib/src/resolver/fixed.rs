use super::{LinkResolver, Resolution, ResolveInput};
use crate::download::DownloadRequest;
use crate::error::ToolPrepError;
use crate::utils::{ArchNames, Architecture};

const STABLE: ArchNames = ArchNames::new(
    "https://go.microsoft.com/fwlink/?LinkID=620885",
    "https://go.microsoft.com/fwlink/?LinkID=620884",
);
const INSIDERS: ArchNames = ArchNames::new(
    "https://go.microsoft.com/fwlink/?LinkId=723969",
    "https://go.microsoft.com/fwlink/?LinkId=723968",
);

/// Vendors with permanent per-architecture links; no page is fetched.
#[derive(Clone, Debug, Default)]
pub struct FixedLinksResolver {
    insiders: bool,
}

impl FixedLinksResolver {
    pub fn visual_studio_code(insiders: bool) -> Self {
        Self { insiders }
    }
}

impl LinkResolver for FixedLinksResolver {
    fn page_request(&self, _page_url: &str) -> Option<DownloadRequest> {
        None
    }

    fn resolve(&self, input: ResolveInput<'_>) -> Result<Resolution, ToolPrepError> {
        let links = if self.insiders { INSIDERS } else { STABLE };
        Ok(Resolution::Ready(DownloadRequest::new(links.get(input.architecture))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_per_channel_and_architecture() {
        let resolve = |insiders, arch| {
            let resolver = FixedLinksResolver::visual_studio_code(insiders);
            assert!(resolver.page_request("https://code.visualstudio.com/License").is_none());
            match resolver.resolve(ResolveInput::new("", None, arch)).unwrap() {
                Resolution::Ready(request) => request.url,
                other => panic!("unexpected {other:?}"),
            }
        };

        assert_eq!(resolve(false, Architecture::Amd64), "https://go.microsoft.com/fwlink/?LinkID=620884");
        assert_eq!(resolve(false, Architecture::I386), "https://go.microsoft.com/fwlink/?LinkID=620885");
        assert_eq!(resolve(true, Architecture::Amd64), "https://go.microsoft.com/fwlink/?LinkId=723968");
        assert_eq!(resolve(true, Architecture::I386), "https://go.microsoft.com/fwlink/?LinkId=723969");
    }
}
