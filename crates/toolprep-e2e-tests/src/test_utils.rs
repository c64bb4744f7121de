use eyre::Result;
use flate2::Compression;
use flate2::write::GzEncoder;
use sha1::Sha1;
use sha2::{Digest, Sha512};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use toolprep_lib::download::{DownloadBatch, DownloadRequest, DownloadResult, Fetch, FetchMode, Payload};
use toolprep_lib::install::{ArchiveUnpacker, Collaborators, InstallSettings, Installer};
use toolprep_lib::launcher::DesktopEntryRegistrar;
use toolprep_lib::packages::SkipPackageInstaller;
use toolprep_lib::privileged::{PrivilegeRunner, PrivilegedAction};
use toolprep_lib::utils::Architecture;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Serves canned bodies by URL and records every request it receives.
#[derive(Clone, Default)]
pub struct FakeFetcher {
    routes: Arc<HashMap<String, Vec<u8>>>,
    requests: Arc<Mutex<Vec<DownloadRequest>>>,
}

impl FakeFetcher {
    pub fn new(routes: impl IntoIterator<Item = (String, Vec<u8>)>) -> Self {
        Self {
            routes: Arc::new(routes.into_iter().collect()),
            requests: Arc::default(),
        }
    }

    pub fn requests(&self) -> Vec<DownloadRequest> {
        self.requests.lock().map(|requests| requests.clone()).unwrap_or_default()
    }

    fn respond(&self, request: &DownloadRequest, mode: FetchMode) -> Result<DownloadResult> {
        let Some(body) = self.routes.get(&request.url) else {
            return Ok(DownloadResult::failed(&request.url, "HTTP 404 Not Found"));
        };
        let mut result = DownloadResult::buffered(&request.url, body.clone());
        if mode == FetchMode::Persist {
            let mut file = tempfile::NamedTempFile::new()?;
            file.write_all(body)?;
            result.payload = Payload::File(file);
        }
        Ok(result)
    }
}

impl Fetch for FakeFetcher {
    async fn fetch(&self, requests: Vec<DownloadRequest>, mode: FetchMode) -> DownloadBatch {
        if let Ok(mut recorded) = self.requests.lock() {
            recorded.extend(requests.iter().cloned());
        }
        requests
            .iter()
            .map(|request| {
                self.respond(request, mode)
                    .unwrap_or_else(|e| DownloadResult::failed(&request.url, e.to_string()))
            })
            .collect()
    }
}

/// Records privileged actions instead of performing them.
pub struct RecordingPrivilegeRunner {
    succeeds: bool,
    actions: Mutex<Vec<PrivilegedAction>>,
}

impl RecordingPrivilegeRunner {
    pub fn new(succeeds: bool) -> Arc<Self> {
        Arc::new(Self {
            succeeds,
            actions: Mutex::new(Vec::new()),
        })
    }

    pub fn actions(&self) -> Vec<PrivilegedAction> {
        self.actions.lock().map(|actions| actions.clone()).unwrap_or_default()
    }
}

impl PrivilegeRunner for RecordingPrivilegeRunner {
    fn run(&self, action: &PrivilegedAction) -> bool {
        if let Ok(mut actions) = self.actions.lock() {
            actions.push(action.clone());
        }
        self.succeeds
    }
}

/// An installer rooted at `root`: tools under `tools/`, launchers under
/// `applications/`, exec links under `bin/`.
pub fn test_installer(
    fetcher: FakeFetcher,
    root: &Path,
    architecture: Architecture,
    privileges: Arc<RecordingPrivilegeRunner>,
) -> Installer<FakeFetcher> {
    Installer::new(
        fetcher,
        InstallSettings {
            architecture,
            install_root: root.join("tools"),
            binary_link_dir: root.join("bin"),
            install_dependencies: false,
        },
        Collaborators {
            extractor: Arc::new(ArchiveUnpacker),
            registrar: Arc::new(DesktopEntryRegistrar::new(root.join("applications"))),
            packages: Arc::new(SkipPackageInstaller),
            privileges,
        },
    )
}

/// A gzipped tarball of `(path, contents, mode)` entries.
pub fn tar_gz(entries: &[(&str, &[u8], u32)]) -> Result<Vec<u8>> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (path, data, mode) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(data.len() as u64);
        header.set_mode(*mode);
        builder.append_data(&mut header, path, *data)?;
    }
    Ok(builder.into_inner()?.finish()?)
}

pub fn sha512_hex(bytes: &[u8]) -> String {
    hex::encode(Sha512::digest(bytes))
}

pub fn sha1_hex(bytes: &[u8]) -> String {
    hex::encode(Sha1::digest(bytes))
}
