use assert_fs::prelude::*;
use predicates::prelude::*;
use std::os::unix::fs::PermissionsExt;
use toolprep_e2e_tests::{FakeFetcher, RecordingPrivilegeRunner, init_tracing, sha1_hex, sha512_hex, tar_gz, test_installer};
use toolprep_lib::catalog::{Variant, lookup};
use toolprep_lib::error::ErrorKind;
use toolprep_lib::install::InstallStage;
use toolprep_lib::privileged::PrivilegedAction;
use toolprep_lib::utils::Architecture;

const ECLIPSE_PAGE: &str = "https://www.eclipse.org/downloads/eclipse-packages/";
const ECLIPSE_ARTIFACT: &str =
    "https://www.eclipse.org/downloads/download.php?file=/technology/epp/eclipse-java-neon-R-linux-gtk-x86_64.tar.gz";
const ECLIPSE_ICON: &str = "https://www.eclipse.org/downloads/images/java.png";

const UNITY_FORUM: &str = "https://forum.unity3d.com/threads/unity-on-linux-release-notes-and-known-issues.350256";
const UNITY_RELEASE: &str = "http://beta.unity3d.com/download/ccc/public_download.html";
const UNITY_INSTALLER: &str = "http://beta.unity3d.com/download/ccc/unity-editor-installer-5.5.0xb5Linux.sh";

fn eclipse_page() -> String {
    format!(
        r#"<a href="/downloads/download.php?file=/technology/epp/eclipse-java-neon-R-linux-gtk.tar.gz" title="32 bit">
<a href="{}" title="64 bit">
<a href="/downloads/download.php?file=/technology/epp/eclipse-cpp-neon-R-linux-gtk-x86_64.tar.gz" title="64 bit">"#,
        ECLIPSE_ARTIFACT.trim_start_matches("https://www.eclipse.org")
    )
}

fn eclipse_fetcher(checksum_body: String) -> eyre::Result<FakeFetcher> {
    let archive = tar_gz(&[
        ("eclipse/eclipse", b"#!/bin/sh\n", 0o755),
        ("eclipse/eclipse.ini", b"-vmargs\n", 0o644),
    ])?;
    let checksum_body = checksum_body.replace("{digest}", &sha512_hex(&archive));
    Ok(FakeFetcher::new([
        (ECLIPSE_PAGE.to_string(), eclipse_page().into_bytes()),
        (format!("{ECLIPSE_ARTIFACT}.sha512&r=1"), checksum_body.into_bytes()),
        (format!("{ECLIPSE_ARTIFACT}&r=1"), archive),
        (ECLIPSE_ICON.to_string(), b"PNG".to_vec()),
    ]))
}

#[tokio::test]
async fn test_eclipse_installs_end_to_end() {
    init_tracing();
    let temp = assert_fs::TempDir::new().unwrap();
    let fetcher = eclipse_fetcher("{digest}  eclipse-java-neon-R-linux-gtk-x86_64.tar.gz\n".to_string()).unwrap();
    let target = lookup("ide", "eclipse", Variant::Stable).unwrap();

    let installer = test_installer(
        fetcher.clone(),
        temp.path(),
        Architecture::Amd64,
        RecordingPrivilegeRunner::new(true),
    );
    let report = installer.install(&target).await.unwrap();

    temp.child("tools/ide/eclipse/eclipse").assert(predicate::path::is_file());
    temp.child("tools/ide/eclipse/eclipse.ini").assert("-vmargs\n");
    temp.child("tools/ide/eclipse/java.png").assert("PNG");
    let mode = std::fs::metadata(temp.child("tools/ide/eclipse/eclipse").path())
        .unwrap()
        .permissions()
        .mode();
    assert_ne!(mode & 0o111, 0);

    temp.child("applications/eclipse-java.desktop")
        .assert(predicate::str::starts_with("[Desktop Entry]\n"))
        .assert(predicate::str::contains(format!(
            "Exec=\"{}\" %f\n",
            temp.child("tools/ide/eclipse/eclipse").path().display()
        )))
        .assert(predicate::str::contains(format!(
            "Icon={}\n",
            temp.child("tools/ide/eclipse/java.png").path().display()
        )));
    assert_eq!(report.desktop_file, temp.child("applications/eclipse-java.desktop").path());

    let requests = fetcher.requests();
    let urls: Vec<&str> = requests.iter().map(|request| request.url.as_str()).collect();
    assert_eq!(
        urls,
        [
            ECLIPSE_PAGE.to_string(),
            format!("{ECLIPSE_ARTIFACT}.sha512&r=1"),
            format!("{ECLIPSE_ARTIFACT}&r=1"),
            ECLIPSE_ICON.to_string(),
        ]
    );
    assert!(requests[0].headers.contains_key("User-agent"));
}

#[tokio::test]
async fn test_checksum_mismatch_leaves_nothing_installed() {
    init_tracing();
    let temp = assert_fs::TempDir::new().unwrap();
    let wrong = "0".repeat(128);
    let fetcher = eclipse_fetcher(format!("{wrong}  eclipse-java-neon-R-linux-gtk-x86_64.tar.gz\n")).unwrap();
    let target = lookup("ide", "eclipse", Variant::Stable).unwrap();

    let installer = test_installer(fetcher, temp.path(), Architecture::Amd64, RecordingPrivilegeRunner::new(true));
    let failure = installer.install(&target).await.unwrap_err();

    assert_eq!(failure.stage, InstallStage::Verify);
    assert_eq!(failure.error.kind(), ErrorKind::Integrity);
    temp.child("tools/ide/eclipse").assert(predicate::path::missing());
    temp.child("applications/eclipse-java.desktop")
        .assert(predicate::path::missing());
}

#[tokio::test]
async fn test_eclipse_page_without_matching_link_is_a_parse_failure() {
    init_tracing();
    let temp = assert_fs::TempDir::new().unwrap();
    let fetcher = FakeFetcher::new([(ECLIPSE_PAGE.to_string(), b"<html>maintenance</html>".to_vec())]);
    let target = lookup("ide", "eclipse", Variant::Stable).unwrap();

    let installer = test_installer(fetcher, temp.path(), Architecture::I386, RecordingPrivilegeRunner::new(true));
    let failure = installer.install(&target).await.unwrap_err();

    assert_eq!(failure.stage, InstallStage::ResolveLink);
    assert_eq!(failure.error.kind(), ErrorKind::Parse);
}

fn unity_fetcher() -> eyre::Result<FakeFetcher> {
    unity_fetcher_with_release(Some(format!(
        r#"<p>Linux installer: <a href="{UNITY_INSTALLER}">download</a></p>"#
    )))
}

fn unity_fetcher_with_release(release: Option<String>) -> eyre::Result<FakeFetcher> {
    let mut installer = b"#!/bin/sh\necho \"Unity installer\"\nexit 0\n__ARCHIVE_BEGINS_HERE__\n".to_vec();
    installer.extend(tar_gz(&[
        ("unity-editor-5.5.0xb5Linux/Editor/Unity", b"\x7fELF", 0o755),
        ("unity-editor-5.5.0xb5Linux/Editor/chrome-sandbox", b"\x7fELF", 0o755),
    ])?);
    let forum = format!(
        r#"<div class="post">Known issues</div>
<a href="http://beta.unity3d.com/download/aaa/public_download.html" target="_blank">Build 5.4.0b1</a> (sha1 of the .sh: 1111111111111111111111111111111111111111)
<a href="{UNITY_RELEASE}" target="_blank">Build 5.5.0b5</a> (sha1 of the .sh: {})"#,
        sha1_hex(&installer)
    );

    let mut routes = vec![
        (UNITY_FORUM.to_string(), forum.into_bytes()),
        (UNITY_INSTALLER.to_string(), installer),
    ];
    if let Some(release) = release {
        routes.push((UNITY_RELEASE.to_string(), release.into_bytes()));
    }
    Ok(FakeFetcher::new(routes))
}

#[tokio::test]
async fn test_unity_unpacks_embedded_archive_and_sets_sandbox_setuid() {
    init_tracing();
    let temp = assert_fs::TempDir::new().unwrap();
    let target = lookup("games", "unity3d", Variant::Stable).unwrap();
    let privileges = RecordingPrivilegeRunner::new(true);

    let installer = test_installer(unity_fetcher().unwrap(), temp.path(), Architecture::Amd64, privileges.clone());
    installer.install(&target).await.unwrap();

    temp.child("tools/games/unity3d/Editor/Unity").assert(b"\x7fELF" as &[u8]);
    temp.child("tools/games/unity3d/unity-editor-5.5.0xb5Linux")
        .assert(predicate::path::missing());
    assert_eq!(
        privileges.actions(),
        [PrivilegedAction::SetuidRoot {
            path: temp.child("tools/games/unity3d/Editor/chrome-sandbox").path().to_path_buf()
        }]
    );
    temp.child("applications/unity3d-editor.desktop")
        .assert(predicate::str::contains("Name=Unity3D Editor\n"));
}

#[tokio::test]
async fn test_denied_privileges_fail_before_launcher_registration() {
    init_tracing();
    let temp = assert_fs::TempDir::new().unwrap();
    let target = lookup("games", "unity3d", Variant::Stable).unwrap();

    let installer = test_installer(
        unity_fetcher().unwrap(),
        temp.path(),
        Architecture::Amd64,
        RecordingPrivilegeRunner::new(false),
    );
    let failure = installer.install(&target).await.unwrap_err();

    assert_eq!(failure.stage, InstallStage::PostInstall);
    assert_eq!(failure.error.kind(), ErrorKind::Privilege);
    temp.child("tools/games/unity3d/Editor/Unity").assert(predicate::path::is_file());
    temp.child("applications/unity3d-editor.desktop")
        .assert(predicate::path::missing());
}

#[tokio::test]
async fn test_unity_is_rejected_on_i386() {
    init_tracing();
    let temp = assert_fs::TempDir::new().unwrap();
    let fetcher = unity_fetcher().unwrap();
    let target = lookup("games", "unity3d", Variant::Stable).unwrap();

    let installer = test_installer(fetcher.clone(), temp.path(), Architecture::I386, RecordingPrivilegeRunner::new(true));
    let failure = installer.install(&target).await.unwrap_err();

    assert_eq!(failure.stage, InstallStage::Start);
    assert_eq!(failure.error.kind(), ErrorKind::Usage);
    assert!(fetcher.requests().is_empty());
}

#[tokio::test]
async fn test_changed_release_page_fails_at_resolve_link() {
    init_tracing();
    let temp = assert_fs::TempDir::new().unwrap();
    let target = lookup("games", "unity3d", Variant::Stable).unwrap();
    let fetcher = unity_fetcher_with_release(Some("<p>Downloads moved to the Hub</p>".to_string())).unwrap();

    let installer = test_installer(fetcher.clone(), temp.path(), Architecture::Amd64, RecordingPrivilegeRunner::new(true));
    let failure = installer.install(&target).await.unwrap_err();

    assert_eq!(failure.stage, InstallStage::ResolveLink);
    assert_eq!(failure.error.kind(), ErrorKind::Parse);
    assert!(fetcher.requests().iter().all(|request| request.url != UNITY_INSTALLER));
}

#[tokio::test]
async fn test_unreachable_release_page_fails_at_fetch_checksum() {
    init_tracing();
    let temp = assert_fs::TempDir::new().unwrap();
    let target = lookup("games", "unity3d", Variant::Stable).unwrap();

    let installer = test_installer(
        unity_fetcher_with_release(None).unwrap(),
        temp.path(),
        Architecture::Amd64,
        RecordingPrivilegeRunner::new(true),
    );
    let failure = installer.install(&target).await.unwrap_err();

    assert_eq!(failure.stage, InstallStage::FetchChecksum);
    assert_eq!(failure.error.kind(), ErrorKind::Transport);
}
