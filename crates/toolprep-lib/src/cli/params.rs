use crate::catalog::Variant;
use crate::config::Config;
use crate::privileged::PrivilegedAction;

#[derive(Debug, Clone)]
pub struct InstallParams {
    pub app_config: Config,
    pub category: String,
    pub tool: String,
    pub variant: Variant,
}

#[derive(Debug, Clone)]
pub struct PrivilegedHelperParams {
    pub action: PrivilegedAction,
}
