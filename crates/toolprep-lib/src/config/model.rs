use crate::download::DownloadOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Tools are installed under `<install_root>/<category>/<tool>`.
    #[serde(default = "default_install_root")]
    pub install_root: PathBuf,
    #[serde(default = "default_launcher_dir")]
    pub launcher_dir: PathBuf,
    #[serde(default = "default_binary_link_dir")]
    pub binary_link_dir: PathBuf,
    #[serde(default = "default_install_dependencies")]
    pub install_dependencies: bool,
    #[serde(default)]
    pub download: DownloadConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DownloadConfig {
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    #[serde(default)]
    pub user_agent: Option<String>,
    /// No timeout when unset.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            install_root: default_install_root(),
            launcher_dir: default_launcher_dir(),
            binary_link_dir: default_binary_link_dir(),
            install_dependencies: default_install_dependencies(),
            download: DownloadConfig::default(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            parallelism: default_parallelism(),
            user_agent: None,
            request_timeout_secs: None,
        }
    }
}

impl DownloadConfig {
    pub fn options(&self) -> DownloadOptions {
        DownloadOptions {
            parallelism: self.parallelism,
            user_agent: self.user_agent.clone(),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from(".local/share"))
}

fn default_install_root() -> PathBuf {
    data_dir().join("toolprep")
}

fn default_launcher_dir() -> PathBuf {
    data_dir().join("applications")
}

fn default_binary_link_dir() -> PathBuf {
    data_dir().join("toolprep").join("bin")
}

fn default_install_dependencies() -> bool {
    true
}

fn default_parallelism() -> usize {
    DownloadOptions::default().parallelism
}
