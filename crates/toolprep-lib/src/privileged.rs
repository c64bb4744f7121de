//! Operations that need root, run in a short-lived elevated child process.
//!
//! The child is this same binary started through the hidden
//! `privileged-helper` subcommand with the action serialised as JSON. Root
//! privileges last exactly as long as that child.

use crate::error::ToolPrepError;
use nix::unistd::{Gid, Group, Uid, User, chown, geteuid, getuid};
use serde::{Deserialize, Serialize};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const HELPER_SUBCOMMAND: &str = "privileged-helper";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PrivilegedAction {
    /// chown root and set mode 04755.
    SetuidRoot { path: PathBuf },
    AddUserToGroup { user: String, group: String },
}

pub trait PrivilegeRunner: Send + Sync {
    /// Whether the action still has to be performed.
    fn is_needed(&self, _action: &PrivilegedAction) -> bool {
        true
    }

    /// Runs the action with elevated privileges; `false` when it failed or elevation was denied.
    fn run(&self, action: &PrivilegedAction) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Elevation {
    Sudo,
    /// Already root.
    None,
}

#[derive(Clone, Debug)]
pub struct ProcessPrivilegeRunner {
    helper: PathBuf,
    elevation: Elevation,
}

impl ProcessPrivilegeRunner {
    pub fn new(helper: impl Into<PathBuf>, elevation: Elevation) -> Self {
        Self {
            helper: helper.into(),
            elevation,
        }
    }

    /// Uses the running binary as helper, through `sudo` unless already root.
    pub fn from_current_exe() -> Result<Self, ToolPrepError> {
        let helper = std::env::current_exe()?;
        let elevation = if geteuid().is_root() {
            Elevation::None
        } else {
            Elevation::Sudo
        };
        Ok(Self::new(helper, elevation))
    }

    fn command(&self, payload: &str) -> Command {
        let mut command = match self.elevation {
            Elevation::Sudo => {
                let mut sudo = Command::new("sudo");
                sudo.arg("--").arg(&self.helper);
                sudo
            }
            Elevation::None => Command::new(&self.helper),
        };
        command.arg(HELPER_SUBCOMMAND).arg(payload);
        command
    }
}

impl PrivilegeRunner for ProcessPrivilegeRunner {
    fn is_needed(&self, action: &PrivilegedAction) -> bool {
        match action {
            PrivilegedAction::SetuidRoot { .. } => true,
            PrivilegedAction::AddUserToGroup { user, group } => match user_in_group(user, group) {
                Ok(member) => !member,
                Err(err) => {
                    tracing::warn!(%user, %group, "Could not check group membership: {err}");
                    true
                }
            },
        }
    }

    fn run(&self, action: &PrivilegedAction) -> bool {
        let payload = match serde_json::to_string(action) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!(?action, "Could not serialise privileged action: {err}");
                return false;
            }
        };

        tracing::info!(?action, elevation = ?self.elevation, "Running privileged action");
        match self.command(&payload).status() {
            Ok(status) if status.success() => true,
            Ok(status) => {
                tracing::error!(?action, %status, "Privileged action failed");
                false
            }
            Err(err) => {
                tracing::error!(?action, helper = %self.helper.display(), "Could not start privileged helper: {err}");
                false
            }
        }
    }
}

/// Performs `action` in the current process; meant to run inside the elevated helper.
pub fn perform_privileged_action(action: &PrivilegedAction) -> Result<(), ToolPrepError> {
    match action {
        PrivilegedAction::SetuidRoot { path } => setuid_root(path),
        PrivilegedAction::AddUserToGroup { user, group } => {
            let status = Command::new("adduser")
                .arg(user)
                .arg(group)
                .status()
                .map_err(|e| ToolPrepError::Privilege {
                    action: format!("adduser {user} {group}: {e}"),
                })?;
            if !status.success() {
                return Err(ToolPrepError::Privilege {
                    action: format!("adduser {user} {group} exited with {status}"),
                });
            }
            tracing::debug!(%user, %group, "Added user to group");
            Ok(())
        }
    }
}

fn setuid_root(path: &Path) -> Result<(), ToolPrepError> {
    chown(path, Some(Uid::from_raw(0)), None).map_err(|e| ToolPrepError::Privilege {
        action: format!("chown root {}: {e}", path.display()),
    })?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o4755)).map_err(|e| {
        ToolPrepError::Privilege {
            action: format!("chmod 4755 {}: {e}", path.display()),
        }
    })?;
    tracing::debug!(path = %path.display(), "Changed setUID mode");
    Ok(())
}

/// The user who invoked the tool, looking through `sudo`.
pub fn current_user() -> Result<String, ToolPrepError> {
    for variable in ["SUDO_USER", "USER"] {
        if let Ok(user) = std::env::var(variable) {
            if !user.is_empty() {
                return Ok(user);
            }
        }
    }
    User::from_uid(getuid())
        .ok()
        .flatten()
        .map(|user| user.name)
        .ok_or_else(|| ToolPrepError::Privilege {
            action: "could not determine the current user".to_string(),
        })
}

/// Whether `user` belongs to `group`, as a supplementary or primary group.
pub fn user_in_group(user: &str, group: &str) -> Result<bool, ToolPrepError> {
    let lookup_error = |e: nix::Error| ToolPrepError::Privilege {
        action: format!("group lookup for {group}: {e}"),
    };
    let Some(group) = Group::from_name(group).map_err(lookup_error)? else {
        return Ok(false);
    };
    if group.mem.iter().any(|member| member == user) {
        return Ok(true);
    }
    let primary_gid: Option<Gid> = User::from_name(user).map_err(lookup_error)?.map(|user| user.gid);
    Ok(primary_gid == Some(group.gid))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_json_is_tagged() {
        let action = PrivilegedAction::AddUserToGroup {
            user: "ada".to_string(),
            group: "dialout".to_string(),
        };
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(json, r#"{"action":"add_user_to_group","user":"ada","group":"dialout"}"#);
        assert_eq!(serde_json::from_str::<PrivilegedAction>(&json).unwrap(), action);
    }

    #[test]
    fn test_helper_exit_status_decides_the_result() {
        let action = PrivilegedAction::SetuidRoot {
            path: PathBuf::from("/nonexistent/chrome-sandbox"),
        };
        assert!(ProcessPrivilegeRunner::new("/bin/true", Elevation::None).run(&action));
        assert!(!ProcessPrivilegeRunner::new("/bin/false", Elevation::None).run(&action));
        assert!(!ProcessPrivilegeRunner::new("/nonexistent/helper", Elevation::None).run(&action));
    }

    #[test]
    fn test_helper_command_line() {
        let runner = ProcessPrivilegeRunner::new("/usr/bin/toolprep", Elevation::Sudo);
        let command = runner.command("{}");
        assert_eq!(command.get_program(), "sudo");
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, ["--", "/usr/bin/toolprep", HELPER_SUBCOMMAND, "{}"]);
    }

    #[test]
    fn test_unknown_group_has_no_members() {
        assert!(!user_in_group("root", "toolprep-no-such-group").unwrap());
        let runner = ProcessPrivilegeRunner::new("/bin/true", Elevation::None);
        assert!(runner.is_needed(&PrivilegedAction::AddUserToGroup {
            user: "root".to_string(),
            group: "toolprep-no-such-group".to_string(),
        }));
    }

    #[test]
    fn test_setuid_on_missing_file_fails() {
        let err = perform_privileged_action(&PrivilegedAction::SetuidRoot {
            path: PathBuf::from("/nonexistent/chrome-sandbox"),
        })
        .unwrap_err();
        assert!(matches!(err, ToolPrepError::Privilege { .. }));
    }
}
