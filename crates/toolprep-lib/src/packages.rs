use crate::error::ToolPrepError;
use itertools::Itertools;
use std::process::Command;

pub trait PackageInstaller: Send + Sync {
    /// Installs whichever of `specs` are missing. A spec may list alternatives as `a | b`.
    fn ensure_installed(&self, specs: &[String]) -> Result<(), ToolPrepError>;
}

/// Splits a dependency spec into its alternatives.
pub fn alternatives(spec: &str) -> Vec<&str> {
    spec.split('|').map(str::trim).filter(|name| !name.is_empty()).collect()
}

/// Packages to install: the first alternative of every spec none of whose alternatives is installed.
pub fn missing_packages<'a>(specs: &'a [String], is_installed: impl Fn(&str) -> bool) -> Vec<&'a str> {
    specs
        .iter()
        .map(|spec| alternatives(spec))
        .filter(|choices| !choices.iter().any(|name| is_installed(name)))
        .filter_map(|choices| choices.first().copied())
        .unique()
        .collect()
}

/// Debian package installer backed by `dpkg-query` and `apt-get`.
#[derive(Clone, Debug, Default)]
pub struct AptPackageInstaller;

impl AptPackageInstaller {
    fn is_installed(package: &str) -> bool {
        match Command::new("dpkg-query")
            .args(["-W", "-f=${Status}", package])
            .output()
        {
            Ok(output) => {
                output.status.success()
                    && String::from_utf8_lossy(&output.stdout).contains("install ok installed")
            }
            Err(err) => {
                tracing::warn!(%package, "Could not run dpkg-query: {err}");
                false
            }
        }
    }
}

impl PackageInstaller for AptPackageInstaller {
    fn ensure_installed(&self, specs: &[String]) -> Result<(), ToolPrepError> {
        let missing = missing_packages(specs, Self::is_installed);
        if missing.is_empty() {
            tracing::debug!("All package dependencies are installed");
            return Ok(());
        }

        tracing::info!(packages = %missing.join(" "), "Installing package dependencies");
        let status = Command::new("sudo")
            .args(["apt-get", "install", "-y"])
            .args(&missing)
            .status()
            .map_err(|e| ToolPrepError::PackageDependencies {
                details: format!("could not run apt-get: {e}"),
            })?;
        if !status.success() {
            return Err(ToolPrepError::PackageDependencies {
                details: format!("apt-get install {} exited with {status}", missing.join(" ")),
            });
        }
        Ok(())
    }
}

/// Leaves package dependencies to the user.
#[derive(Clone, Debug, Default)]
pub struct SkipPackageInstaller;

impl PackageInstaller for SkipPackageInstaller {
    fn ensure_installed(&self, specs: &[String]) -> Result<(), ToolPrepError> {
        if !specs.is_empty() {
            tracing::debug!(count = specs.len(), "Skipping package dependencies");
        }
        Ok(())
    }
}
