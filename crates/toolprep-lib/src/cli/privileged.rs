use crate::cli::PrivilegedHelperParams;
use crate::error::ToolPrepError;
use crate::privileged::perform_privileged_action;

/// Entry point of the elevated child process.
pub fn run_privileged_helper(params: PrivilegedHelperParams) -> Result<(), ToolPrepError> {
    tracing::debug!(action = ?params.action, "Performing privileged action");
    perform_privileged_action(&params.action)
}
