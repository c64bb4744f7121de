use super::extract::{ArchiveExtractor, ExtractRequest};
use crate::catalog::{IconSource, InstallTarget, PostInstallStep};
use crate::download::{DownloadRequest, DownloadResult, Fetch, FetchMode};
use crate::error::ToolPrepError;
use crate::launcher::{LauncherEntry, LauncherRegistrar, add_exec_link};
use crate::packages::PackageInstaller;
use crate::privileged::{PrivilegeRunner, PrivilegedAction, current_user};
use crate::resolver::{Resolution, ResolveInput};
use crate::utils::{Architecture, arch_matches};
use crate::verification::verify_file;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstallStage {
    Start,
    FetchPage,
    ResolveLink,
    FetchChecksum,
    FetchArtifact,
    Verify,
    Extract,
    PostInstall,
    RegisterLauncher,
    Done,
}

impl Display for InstallStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Start => "START",
            Self::FetchPage => "FETCH_PAGE",
            Self::ResolveLink => "RESOLVE_LINK",
            Self::FetchChecksum => "FETCH_CHECKSUM",
            Self::FetchArtifact => "FETCH_ARTIFACT",
            Self::Verify => "VERIFY",
            Self::Extract => "EXTRACT",
            Self::PostInstall => "POST_INSTALL",
            Self::RegisterLauncher => "REGISTER_LAUNCHER",
            Self::Done => "DONE",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstallReport {
    pub tool: String,
    pub install_dir: PathBuf,
    pub desktop_file: PathBuf,
    /// Messages for the user, e.g. to log in again after joining a group.
    pub notices: Vec<String>,
}

#[derive(Error, Debug)]
#[error("Installing {tool} failed at {stage}")]
pub struct InstallFailure {
    pub tool: String,
    pub stage: InstallStage,
    #[source]
    pub error: ToolPrepError,
}

#[derive(Clone, Debug)]
pub struct InstallSettings {
    pub architecture: Architecture,
    pub install_root: PathBuf,
    pub binary_link_dir: PathBuf,
    pub install_dependencies: bool,
}

/// The side-effecting collaborators of the pipeline.
#[derive(Clone)]
pub struct Collaborators {
    pub extractor: Arc<dyn ArchiveExtractor>,
    pub registrar: Arc<dyn LauncherRegistrar>,
    pub packages: Arc<dyn PackageInstaller>,
    pub privileges: Arc<dyn PrivilegeRunner>,
}

pub struct Installer<F> {
    fetcher: F,
    settings: InstallSettings,
    collaborators: Collaborators,
}

/// The fetched artifact and, when the tool ships none, its icon.
struct Artifact {
    request: DownloadRequest,
    download: DownloadResult,
    icon: Option<(DownloadResult, String)>,
}

impl<F: Fetch> Installer<F> {
    pub fn new(fetcher: F, settings: InstallSettings, collaborators: Collaborators) -> Self {
        Self {
            fetcher,
            settings,
            collaborators,
        }
    }

    pub async fn install(&self, target: &InstallTarget) -> Result<InstallReport, Box<InstallFailure>> {
        let mut stage = InstallStage::Start;
        match self.run(target, &mut stage).await {
            Ok(report) => {
                advance(&mut stage, InstallStage::Done, target);
                Ok(report)
            }
            Err(error) => {
                tracing::error!(tool = %target.id, %stage, "Installation failed: {error}");
                Err(Box::new(InstallFailure {
                    tool: target.id.clone(),
                    stage,
                    error,
                }))
            }
        }
    }

    async fn run(&self, target: &InstallTarget, stage: &mut InstallStage) -> Result<InstallReport, ToolPrepError> {
        let architecture = self.settings.architecture;
        tracing::info!(tool = %target.id, %architecture, "Installing {}", target.name);

        if !arch_matches(&target.architectures, architecture) {
            return Err(ToolPrepError::UnsupportedArchitecture {
                tool: target.name.clone(),
                architecture: architecture.to_string(),
            });
        }
        if target.needs_root {
            tracing::info!(tool = %target.id, "Part of the installation needs administrator privileges");
        }
        self.install_packages(target).await?;

        advance(stage, InstallStage::FetchPage, target);
        let page = self.fetch_page(target).await?;

        advance(stage, InstallStage::ResolveLink, target);
        let mut resolution = target
            .resolver
            .resolve(ResolveInput::new(&target.download_page, page.as_ref(), architecture))?;

        let request = loop {
            match resolution {
                Resolution::Ready(request) => break request,
                Resolution::FollowUp(follow_up) => {
                    advance(stage, InstallStage::FetchChecksum, target);
                    let batch = self.fetcher.fetch(follow_up.requests, FetchMode::InMemory).await;
                    for result in batch.values() {
                        result.check()?;
                    }
                    advance(stage, InstallStage::ResolveLink, target);
                    resolution = target.resolver.follow(follow_up.step, &batch, architecture)?;
                }
            }
        };
        tracing::info!(tool = %target.id, url = %request.url, checksum = ?request.checksum, "Resolved download link");

        advance(stage, InstallStage::FetchArtifact, target);
        let artifact = self.fetch_artifact(target, request).await?;
        let archive = artifact
            .download
            .path()
            .map(Path::to_path_buf)
            .ok_or_else(|| ToolPrepError::transport(&artifact.request.url, "artifact was not saved to disk"))?;

        advance(stage, InstallStage::Verify, target);
        match &artifact.request.checksum {
            Some(spec) => verify_file(&archive, &artifact.request.url, spec).await?,
            None => tracing::warn!(tool = %target.id, "No checksum published, skipping verification"),
        }

        advance(stage, InstallStage::Extract, target);
        let install_dir = target.install_dir(&self.settings.install_root);
        let extract_request = ExtractRequest {
            archive,
            destination: install_dir.clone(),
            payload: target.payload.clone(),
            strip_pattern: target.strip_pattern.clone(),
            required_files: target.required_files.clone(),
        };
        let extractor = Arc::clone(&self.collaborators.extractor);
        tokio::task::spawn_blocking(move || extractor.extract(&extract_request))
            .await
            .map_err(|e| eyre::eyre!("extraction task failed: {e}"))??;
        // The temporary artifact is only dropped once it has been unpacked.
        drop(artifact.download);

        advance(stage, InstallStage::PostInstall, target);
        if let Some((icon, file_name)) = &artifact.icon {
            copy_icon(icon, &install_dir.join(file_name))?;
        }
        let notices = self.post_install(target, &install_dir).await?;

        advance(stage, InstallStage::RegisterLauncher, target);
        let entry = LauncherEntry::for_target(target, &install_dir)?;
        let desktop_file = self.collaborators.registrar.register(&entry)?;

        Ok(InstallReport {
            tool: target.id.clone(),
            install_dir,
            desktop_file,
            notices,
        })
    }

    async fn install_packages(&self, target: &InstallTarget) -> Result<(), ToolPrepError> {
        if target.package_dependencies.is_empty() {
            return Ok(());
        }
        if !self.settings.install_dependencies {
            tracing::info!(tool = %target.id, "Not installing package dependencies");
            return Ok(());
        }
        let packages = Arc::clone(&self.collaborators.packages);
        let specs = target.package_dependencies.clone();
        tokio::task::spawn_blocking(move || packages.ensure_installed(&specs))
            .await
            .map_err(|e| eyre::eyre!("package installation task failed: {e}"))?
    }

    async fn fetch_page(&self, target: &InstallTarget) -> Result<Option<DownloadResult>, ToolPrepError> {
        let Some(request) = target.resolver.page_request(&target.download_page) else {
            tracing::debug!(tool = %target.id, "Download link is fixed, no page to fetch");
            return Ok(None);
        };
        let url = request.url.clone();
        let mut batch = self.fetcher.fetch(vec![request], FetchMode::InMemory).await;
        let page = batch.take(&url)?;
        page.check()?;
        Ok(Some(page))
    }

    async fn fetch_artifact(&self, target: &InstallTarget, request: DownloadRequest) -> Result<Artifact, ToolPrepError> {
        let icon_request = match &target.icon {
            IconSource::Downloaded { url, file_name } => Some((DownloadRequest::new(url), file_name.clone())),
            IconSource::Bundled(_) => None,
        };

        let mut requests = vec![request.clone()];
        requests.extend(icon_request.iter().map(|(icon, _)| icon.clone()));
        let mut batch = self.fetcher.fetch(requests, FetchMode::Persist).await;

        let download = batch.take(&request.url)?;
        download.check()?;
        let icon = match icon_request {
            Some((icon_request, file_name)) => {
                let icon = batch.take(&icon_request.url)?;
                icon.check()?;
                Some((icon, file_name))
            }
            None => None,
        };
        Ok(Artifact { request, download, icon })
    }

    async fn post_install(&self, target: &InstallTarget, install_dir: &Path) -> Result<Vec<String>, ToolPrepError> {
        let mut notices = Vec::new();
        for step in &target.post_install {
            match step {
                PostInstallStep::SetuidRoot { path } => {
                    self.run_privileged(PrivilegedAction::SetuidRoot {
                        path: install_dir.join(path),
                    })
                    .await?;
                }
                PostInstallStep::JoinGroup { group, notice } => {
                    let action = PrivilegedAction::AddUserToGroup {
                        user: current_user()?,
                        group: group.to_string(),
                    };
                    if self.collaborators.privileges.is_needed(&action) {
                        self.run_privileged(action).await?;
                        notices.push(notice.to_string());
                    } else {
                        tracing::debug!(%group, "User is already a group member");
                    }
                }
                PostInstallStep::ExecLink { path, link_name } => {
                    add_exec_link(&install_dir.join(path), &self.settings.binary_link_dir.join(link_name))?;
                }
            }
        }
        Ok(notices)
    }

    async fn run_privileged(&self, action: PrivilegedAction) -> Result<(), ToolPrepError> {
        let runner = Arc::clone(&self.collaborators.privileges);
        let description = format!("{action:?}");
        let succeeded = tokio::task::spawn_blocking(move || runner.run(&action))
            .await
            .map_err(|e| eyre::eyre!("privileged task failed: {e}"))?;
        if succeeded {
            Ok(())
        } else {
            Err(ToolPrepError::Privilege { action: description })
        }
    }
}

fn advance(stage: &mut InstallStage, next: InstallStage, target: &InstallTarget) {
    tracing::debug!(tool = %target.id, from = %stage, to = %next, "Install stage");
    *stage = next;
}

fn copy_icon(icon: &DownloadResult, destination: &Path) -> Result<(), ToolPrepError> {
    let source = icon
        .path()
        .ok_or_else(|| ToolPrepError::transport(&icon.url, "icon was not saved to disk"))?;
    std::fs::copy(source, destination).map_err(|e| ToolPrepError::filesystem(destination, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, LauncherSpec, PayloadKind, Variant};
    use crate::download::{DownloadBatch, Payload};
    use crate::error::ErrorKind;
    use crate::install::ArchiveUnpacker;
    use crate::launcher::DesktopEntryRegistrar;
    use crate::packages::SkipPackageInstaller;
    use crate::resolver::LinkResolver;
    use crate::verification::{ChecksumKind, ChecksumSpec};
    use flate2::write::GzEncoder;
    use sha2::{Digest, Sha256};
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ARTIFACT_URL: &str = "https://example.com/tool-1.0.tar.gz";
    const ICON_URL: &str = "https://example.com/logo.svg";

    struct FakeFetcher {
        routes: HashMap<String, Vec<u8>>,
        fetched: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        fn new(routes: &[(&str, Vec<u8>)]) -> Self {
            Self {
                routes: routes.iter().map(|(url, body)| (url.to_string(), body.clone())).collect(),
                fetched: Mutex::new(Vec::new()),
            }
        }
    }

    impl Fetch for &FakeFetcher {
        async fn fetch(&self, requests: Vec<DownloadRequest>, mode: FetchMode) -> DownloadBatch {
            requests
                .into_iter()
                .map(|request| {
                    self.fetched.lock().unwrap().push(request.url.clone());
                    match self.routes.get(&request.url) {
                        None => DownloadResult::failed(&request.url, "404 Not Found"),
                        Some(body) if mode == FetchMode::InMemory => DownloadResult::buffered(&request.url, body.clone()),
                        Some(body) => {
                            let mut file = tempfile::NamedTempFile::new().unwrap();
                            file.write_all(body).unwrap();
                            let mut result = DownloadResult::buffered(&request.url, Vec::new());
                            result.payload = Payload::File(file);
                            result
                        }
                    }
                })
                .collect()
        }
    }

    #[derive(Debug)]
    struct StaticResolver {
        checksum: Option<ChecksumSpec>,
    }

    impl LinkResolver for StaticResolver {
        fn page_request(&self, _page_url: &str) -> Option<DownloadRequest> {
            None
        }

        fn resolve(&self, _input: ResolveInput<'_>) -> Result<Resolution, ToolPrepError> {
            let mut request = DownloadRequest::new(ARTIFACT_URL);
            if let Some(checksum) = &self.checksum {
                request = request.with_checksum(checksum.clone());
            }
            Ok(Resolution::Ready(request))
        }
    }

    #[derive(Default)]
    struct CountingExtractor {
        calls: AtomicUsize,
    }

    impl ArchiveExtractor for CountingExtractor {
        fn extract(&self, request: &ExtractRequest) -> Result<(), ToolPrepError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ArchiveUnpacker.extract(request)
        }
    }

    struct FixedPrivilegeRunner {
        succeeds: bool,
        needed: bool,
        actions: Mutex<Vec<PrivilegedAction>>,
    }

    impl PrivilegeRunner for FixedPrivilegeRunner {
        fn is_needed(&self, _action: &PrivilegedAction) -> bool {
            self.needed
        }

        fn run(&self, action: &PrivilegedAction) -> bool {
            self.actions.lock().unwrap().push(action.clone());
            self.succeeds
        }
    }

    fn tarball() -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), flate2::Compression::default()));
        for (path, mode) in [("tool-1.0/bin/tool", 0o755), ("tool-1.0/chrome-sandbox", 0o755)] {
            let data = b"#!/bin/sh\n";
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Regular);
            header.set_size(data.len() as u64);
            header.set_mode(mode);
            builder.append_data(&mut header, path, &data[..]).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn sha256(bytes: &[u8]) -> ChecksumSpec {
        ChecksumSpec::new(ChecksumKind::Sha256, hex::encode(Sha256::digest(bytes)))
    }

    fn target(checksum: Option<ChecksumSpec>, post_install: Vec<PostInstallStep>, icon: IconSource) -> InstallTarget {
        InstallTarget {
            id: "tool".to_string(),
            category: Category::Ide,
            name: "Tool".to_string(),
            description: "A tool".to_string(),
            architectures: Architecture::ALL.to_vec(),
            download_page: "https://example.com/download".to_string(),
            desktop_filename: "tool.desktop".to_string(),
            required_files: vec!["bin/tool".to_string()],
            strip_pattern: Some("tool-*".to_string()),
            needs_root: false,
            package_dependencies: vec!["libtool-runtime".to_string()],
            resolver: Box::new(StaticResolver { checksum }),
            payload: PayloadKind::Archive,
            icon,
            launcher: LauncherSpec {
                name: "Tool".to_string(),
                comment: "A tool".to_string(),
                categories: "Development;IDE;",
                takes_file: false,
                extra: Vec::new(),
            },
            post_install,
            variant: Variant::Stable,
        }
    }

    struct Harness {
        root: tempfile::TempDir,
        extractor: Arc<CountingExtractor>,
        privileges: Arc<FixedPrivilegeRunner>,
    }

    impl Harness {
        fn new(privileged_succeeds: bool) -> Self {
            Self::with_privileges(privileged_succeeds, true)
        }

        fn with_privileges(succeeds: bool, needed: bool) -> Self {
            Self {
                root: tempfile::tempdir().unwrap(),
                extractor: Arc::new(CountingExtractor::default()),
                privileges: Arc::new(FixedPrivilegeRunner {
                    succeeds,
                    needed,
                    actions: Mutex::new(Vec::new()),
                }),
            }
        }

        fn launcher_dir(&self) -> PathBuf {
            self.root.path().join("applications")
        }

        fn installer<'a>(&self, fetcher: &'a FakeFetcher) -> Installer<&'a FakeFetcher> {
            Installer::new(
                fetcher,
                InstallSettings {
                    architecture: Architecture::Amd64,
                    install_root: self.root.path().join("tools"),
                    binary_link_dir: self.root.path().join("bin"),
                    install_dependencies: true,
                },
                Collaborators {
                    extractor: self.extractor.clone(),
                    registrar: Arc::new(DesktopEntryRegistrar::new(self.launcher_dir())),
                    packages: Arc::new(SkipPackageInstaller),
                    privileges: self.privileges.clone(),
                },
            )
        }
    }

    #[tokio::test]
    async fn test_install_happy_path() {
        let archive = tarball();
        let fetcher = FakeFetcher::new(&[(ARTIFACT_URL, archive.clone()), (ICON_URL, b"<svg/>".to_vec())]);
        let harness = Harness::new(true);
        let target = target(
            Some(sha256(&archive)),
            vec![
                PostInstallStep::SetuidRoot { path: "chrome-sandbox" },
                PostInstallStep::ExecLink {
                    path: "bin/tool",
                    link_name: "tool",
                },
            ],
            IconSource::Downloaded {
                url: ICON_URL.to_string(),
                file_name: "logo.svg".to_string(),
            },
        );

        let report = harness.installer(&fetcher).install(&target).await.unwrap();

        let install_dir = harness.root.path().join("tools/ide/tool");
        assert_eq!(report.install_dir, install_dir);
        assert_eq!(report.desktop_file, harness.launcher_dir().join("tool.desktop"));
        assert!(report.notices.is_empty());
        assert!(install_dir.join("bin/tool").is_file());
        assert_eq!(std::fs::read(install_dir.join("logo.svg")).unwrap(), b"<svg/>");
        assert_eq!(
            std::fs::read_link(harness.root.path().join("bin/tool")).unwrap(),
            install_dir.join("bin/tool")
        );
        assert_eq!(
            *harness.privileges.actions.lock().unwrap(),
            [PrivilegedAction::SetuidRoot {
                path: install_dir.join("chrome-sandbox")
            }]
        );
        let desktop = std::fs::read_to_string(report.desktop_file).unwrap();
        assert!(desktop.contains(&format!("Icon={}\n", install_dir.join("logo.svg").display())));
        assert_eq!(
            *fetcher.fetched.lock().unwrap(),
            [ARTIFACT_URL.to_string(), ICON_URL.to_string()]
        );
    }

    #[tokio::test]
    async fn test_checksum_mismatch_fails_before_extraction() {
        let fetcher = FakeFetcher::new(&[(ARTIFACT_URL, tarball())]);
        let harness = Harness::new(true);
        let target = target(
            Some(sha256(b"something else")),
            Vec::new(),
            IconSource::Bundled("icon.png"),
        );

        let failure = harness.installer(&fetcher).install(&target).await.unwrap_err();

        assert_eq!(failure.stage, InstallStage::Verify);
        assert_eq!(failure.error.kind(), ErrorKind::Integrity);
        assert_eq!(harness.extractor.calls.load(Ordering::SeqCst), 0);
        assert!(!harness.root.path().join("tools/ide/tool").exists());
        assert!(!harness.launcher_dir().join("tool.desktop").exists());
    }

    #[tokio::test]
    async fn test_privileged_failure_stops_before_launcher() {
        let archive = tarball();
        let fetcher = FakeFetcher::new(&[(ARTIFACT_URL, archive.clone())]);
        let harness = Harness::new(false);
        let target = target(
            Some(sha256(&archive)),
            vec![PostInstallStep::SetuidRoot { path: "chrome-sandbox" }],
            IconSource::Bundled("icon.png"),
        );

        let failure = harness.installer(&fetcher).install(&target).await.unwrap_err();

        assert_eq!(failure.stage, InstallStage::PostInstall);
        assert_eq!(failure.error.kind(), ErrorKind::Privilege);
        assert_eq!(harness.extractor.calls.load(Ordering::SeqCst), 1);
        assert!(!harness.launcher_dir().join("tool.desktop").exists());
    }

    const JOIN_DIALOUT: PostInstallStep = PostInstallStep::JoinGroup {
        group: "dialout",
        notice: "Log out and back in to use the serial ports",
    };

    #[tokio::test]
    async fn test_group_join_adds_current_user_and_returns_notice() {
        let archive = tarball();
        let fetcher = FakeFetcher::new(&[(ARTIFACT_URL, archive.clone())]);
        let harness = Harness::with_privileges(true, true);
        let target = target(Some(sha256(&archive)), vec![JOIN_DIALOUT], IconSource::Bundled("icon.png"));

        let report = harness.installer(&fetcher).install(&target).await.unwrap();

        assert_eq!(
            *harness.privileges.actions.lock().unwrap(),
            [PrivilegedAction::AddUserToGroup {
                user: current_user().unwrap(),
                group: "dialout".to_string(),
            }]
        );
        assert_eq!(report.notices, ["Log out and back in to use the serial ports"]);
        assert!(report.desktop_file.is_file());
    }

    #[tokio::test]
    async fn test_group_join_is_skipped_for_existing_members() {
        let archive = tarball();
        let fetcher = FakeFetcher::new(&[(ARTIFACT_URL, archive.clone())]);
        let harness = Harness::with_privileges(true, false);
        let target = target(Some(sha256(&archive)), vec![JOIN_DIALOUT], IconSource::Bundled("icon.png"));

        let report = harness.installer(&fetcher).install(&target).await.unwrap();

        assert!(harness.privileges.actions.lock().unwrap().is_empty());
        assert!(report.notices.is_empty());
        assert!(report.desktop_file.is_file());
    }

    #[tokio::test]
    async fn test_failed_group_join_fails_post_install() {
        let archive = tarball();
        let fetcher = FakeFetcher::new(&[(ARTIFACT_URL, archive.clone())]);
        let harness = Harness::with_privileges(false, true);
        let target = target(Some(sha256(&archive)), vec![JOIN_DIALOUT], IconSource::Bundled("icon.png"));

        let failure = harness.installer(&fetcher).install(&target).await.unwrap_err();

        assert_eq!(failure.stage, InstallStage::PostInstall);
        assert_eq!(failure.error.kind(), ErrorKind::Privilege);
        assert!(!harness.launcher_dir().join("tool.desktop").exists());
    }

    #[tokio::test]
    async fn test_missing_artifact_is_a_transport_failure() {
        let fetcher = FakeFetcher::new(&[]);
        let harness = Harness::new(true);
        let target = target(None, Vec::new(), IconSource::Bundled("icon.png"));

        let failure = harness.installer(&fetcher).install(&target).await.unwrap_err();

        assert_eq!(failure.stage, InstallStage::FetchArtifact);
        assert_eq!(failure.error.kind(), ErrorKind::Transport);
        assert_eq!(failure.tool, "tool");
    }

    #[tokio::test]
    async fn test_unsupported_architecture_fails_at_start() {
        let fetcher = FakeFetcher::new(&[]);
        let harness = Harness::new(true);
        let mut target = target(None, Vec::new(), IconSource::Bundled("icon.png"));
        target.architectures = vec![Architecture::I386];

        let failure = harness.installer(&fetcher).install(&target).await.unwrap_err();

        assert_eq!(failure.stage, InstallStage::Start);
        assert!(matches!(failure.error, ToolPrepError::UnsupportedArchitecture { .. }));
        assert!(fetcher.fetched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unparsable_page_fails_at_resolve() {
        let fetcher = FakeFetcher::new(&[("http://www.stencyl.com/download/", b"<html></html>".to_vec())]);
        let harness = Harness::new(true);
        let target = crate::catalog::lookup("games", "stencyl", Variant::Stable).unwrap();

        let failure = harness.installer(&fetcher).install(&target).await.unwrap_err();

        assert_eq!(failure.stage, InstallStage::ResolveLink);
        assert_eq!(failure.error.kind(), ErrorKind::Parse);
    }
}
