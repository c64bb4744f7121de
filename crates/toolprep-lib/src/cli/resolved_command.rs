use crate::catalog::{Category, Variant};
use crate::cli::args::Command;
use crate::cli::params::{InstallParams, PrivilegedHelperParams};
use crate::config::load_config;
use crate::error::ToolPrepError;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum ResolvedCommand {
    List,
    Install(InstallParams),
    PrivilegedHelper(PrivilegedHelperParams),
}

pub fn resolve_command(command: Command) -> Result<ResolvedCommand, ToolPrepError> {
    match command {
        Command::List => Ok(ResolvedCommand::List),
        Command::Install {
            category,
            tool,
            eap,
            insiders,
            install_root,
            skip_dependencies,
            config_path,
        } => {
            if Category::from_id(&category).is_none() {
                return Err(ToolPrepError::UnknownTool { category, tool });
            }

            let variant = match (eap, insiders) {
                (false, false) => Variant::Stable,
                (true, false) => Variant::Eap,
                (false, true) => Variant::Insiders,
                (true, true) => {
                    return Err(ToolPrepError::CliArgumentValidation {
                        details: "--eap and --insiders cannot be combined.".to_string(),
                    });
                }
            };

            let mut app_config = load_config(config_path.as_deref())?;
            if let Some(install_root) = install_root {
                app_config.install_root = PathBuf::from(install_root);
            }
            if skip_dependencies {
                app_config.install_dependencies = false;
            }
            if app_config.download.parallelism == 0 {
                return Err(ToolPrepError::CliArgumentValidation {
                    details: "download.parallelism must be greater than 0.".to_string(),
                });
            }

            Ok(ResolvedCommand::Install(InstallParams {
                app_config,
                category,
                tool,
                variant,
            }))
        }
        Command::PrivilegedHelper { payload } => Ok(ResolvedCommand::PrivilegedHelper(PrivilegedHelperParams {
            action: serde_json::from_str(&payload)?,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::privileged::PrivilegedAction;
    use std::path::Path;

    fn install(category: &str, eap: bool, insiders: bool) -> Command {
        Command::Install {
            category: category.to_string(),
            tool: "pycharm".to_string(),
            eap,
            insiders,
            install_root: Some("/opt/tools".to_string()),
            skip_dependencies: true,
            config_path: None,
        }
    }

    #[test]
    fn test_install_overrides_configuration() {
        let ResolvedCommand::Install(params) = resolve_command(install("ide", true, false)).unwrap() else {
            panic!("expected an install command");
        };
        assert_eq!(params.variant, Variant::Eap);
        assert_eq!(params.app_config.install_root, Path::new("/opt/tools"));
        assert!(!params.app_config.install_dependencies);
    }

    #[test]
    fn test_unknown_category() {
        let err = resolve_command(install("editors", false, false)).unwrap_err();
        assert!(matches!(err, ToolPrepError::UnknownTool { .. }));
    }

    #[test]
    fn test_conflicting_variants() {
        let err = resolve_command(install("ide", true, true)).unwrap_err();
        assert!(matches!(err, ToolPrepError::CliArgumentValidation { .. }));
    }

    #[test]
    fn test_privileged_helper_payload() {
        let command = Command::PrivilegedHelper {
            payload: r#"{"action":"setuid_root","path":"/opt/unity/Editor/chrome-sandbox"}"#.to_string(),
        };
        let ResolvedCommand::PrivilegedHelper(params) = resolve_command(command).unwrap() else {
            panic!("expected a privileged helper command");
        };
        assert_eq!(
            params.action,
            PrivilegedAction::SetuidRoot {
                path: "/opt/unity/Editor/chrome-sandbox".into()
            }
        );

        let err = resolve_command(Command::PrivilegedHelper {
            payload: "not json".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, ToolPrepError::Json(_)));
    }
}
