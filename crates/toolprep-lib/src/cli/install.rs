use crate::catalog::lookup;
use crate::cli::InstallParams;
use crate::download::DownloadCenter;
use crate::error::ToolPrepError;
use crate::install::{ArchiveUnpacker, Collaborators, InstallSettings, Installer};
use crate::launcher::DesktopEntryRegistrar;
use crate::packages::{AptPackageInstaller, PackageInstaller, SkipPackageInstaller};
use crate::privileged::ProcessPrivilegeRunner;
use crate::utils::Architecture;
use std::sync::Arc;
use tracing;

pub async fn run_install(params: InstallParams) -> Result<(), ToolPrepError> {
    let InstallParams {
        app_config,
        category,
        tool,
        variant,
    } = params;

    let target = lookup(&category, &tool, variant)?;
    let architecture = Architecture::current().ok_or_else(|| ToolPrepError::UnsupportedArchitecture {
        tool: target.name.clone(),
        architecture: std::env::consts::ARCH.to_string(),
    })?;

    let packages: Arc<dyn PackageInstaller> = if app_config.install_dependencies {
        Arc::new(AptPackageInstaller)
    } else {
        Arc::new(SkipPackageInstaller)
    };
    let installer = Installer::new(
        DownloadCenter::new(app_config.download.options())?,
        InstallSettings {
            architecture,
            install_root: app_config.install_root.clone(),
            binary_link_dir: app_config.binary_link_dir.clone(),
            install_dependencies: app_config.install_dependencies,
        },
        Collaborators {
            extractor: Arc::new(ArchiveUnpacker),
            registrar: Arc::new(DesktopEntryRegistrar::new(&app_config.launcher_dir)),
            packages,
            privileges: Arc::new(ProcessPrivilegeRunner::from_current_exe()?),
        },
    );

    let report = installer.install(&target).await?;

    tracing::info!(
        "{} installed in {}, launcher at {}",
        target.name,
        report.install_dir.display(),
        report.desktop_file.display()
    );
    for notice in &report.notices {
        println!("{notice}");
    }

    Ok(())
}
