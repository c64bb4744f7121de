mod args;
mod install;
mod list;
mod params;
mod privileged;
mod resolved_command;

pub use args::{Args, Command, parse_args};
pub use install::run_install;
pub use list::{format_listing, run_list};
pub use params::{InstallParams, PrivilegedHelperParams};
pub use privileged::run_privileged_helper;
pub use resolved_command::{ResolvedCommand, resolve_command};
