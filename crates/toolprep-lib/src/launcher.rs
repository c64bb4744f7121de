use crate::catalog::InstallTarget;
use crate::error::ToolPrepError;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// A freedesktop launcher for an installed tool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LauncherEntry {
    pub desktop_filename: String,
    pub name: String,
    pub comment: String,
    pub icon: PathBuf,
    pub exec: String,
    pub categories: String,
    pub extra: Vec<(String, String)>,
}

impl LauncherEntry {
    pub fn for_target(target: &InstallTarget, install_dir: &Path) -> Result<Self, ToolPrepError> {
        let executable = target
            .executable(install_dir)
            .ok_or_else(|| eyre::eyre!("{} declares no executable", target.id))?;
        let exec = if target.launcher.takes_file {
            format!("\"{}\" %f", executable.display())
        } else {
            executable.display().to_string()
        };
        let install_dir_value = install_dir.display().to_string();

        Ok(Self {
            desktop_filename: target.desktop_filename.clone(),
            name: target.launcher.name.clone(),
            comment: target.launcher.comment.clone(),
            icon: target.icon_path(install_dir),
            exec,
            categories: target.launcher.categories.to_string(),
            extra: target
                .launcher
                .extra
                .iter()
                .map(|(key, value)| (key.to_string(), value.replace("{install_dir}", &install_dir_value)))
                .collect(),
        })
    }

    pub fn to_desktop_file(&self) -> String {
        let mut content = String::from("[Desktop Entry]\n");
        // Writing to a String cannot fail.
        let _ = write!(
            content,
            "Version=1.0\nType=Application\nName={}\nIcon={}\nExec={}\nComment={}\nCategories={}\nTerminal=false\n",
            self.name,
            self.icon.display(),
            self.exec,
            self.comment,
            self.categories
        );
        for (key, value) in &self.extra {
            let _ = writeln!(content, "{key}={value}");
        }
        content
    }
}

pub trait LauncherRegistrar: Send + Sync {
    /// Writes the launcher, replacing any previous one; returns where it was written.
    fn register(&self, entry: &LauncherEntry) -> Result<PathBuf, ToolPrepError>;
}

/// Writes `.desktop` files into an applications directory.
#[derive(Clone, Debug)]
pub struct DesktopEntryRegistrar {
    launcher_dir: PathBuf,
}

impl DesktopEntryRegistrar {
    pub fn new(launcher_dir: impl Into<PathBuf>) -> Self {
        Self {
            launcher_dir: launcher_dir.into(),
        }
    }
}

impl LauncherRegistrar for DesktopEntryRegistrar {
    fn register(&self, entry: &LauncherEntry) -> Result<PathBuf, ToolPrepError> {
        std::fs::create_dir_all(&self.launcher_dir)
            .map_err(|e| ToolPrepError::filesystem(&self.launcher_dir, e))?;
        let path = self.launcher_dir.join(&entry.desktop_filename);
        std::fs::write(&path, entry.to_desktop_file()).map_err(|e| ToolPrepError::filesystem(&path, e))?;
        tracing::info!(path = %path.display(), "Registered launcher");
        Ok(path)
    }
}

/// Points `link` at `target`, replacing whatever `link` was.
pub fn add_exec_link(target: &Path, link: &Path) -> Result<(), ToolPrepError> {
    if let Some(parent) = link.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ToolPrepError::filesystem(parent, e))?;
    }
    if link.symlink_metadata().is_ok() {
        std::fs::remove_file(link).map_err(|e| ToolPrepError::filesystem(link, e))?;
    }
    std::os::unix::fs::symlink(target, link).map_err(|e| ToolPrepError::filesystem(link, e))?;
    tracing::debug!(link = %link.display(), target = %target.display(), "Added exec link");
    Ok(())
}
