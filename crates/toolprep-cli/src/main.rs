use toolprep_lib::cli::{
    ResolvedCommand, parse_args, resolve_command, run_install, run_list, run_privileged_helper,
};
use toolprep_lib::error::ToolPrepError;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), ToolPrepError> {
    color_eyre::install()?;

    let args = parse_args();
    let command = resolve_command(args.command)?;

    match command {
        ResolvedCommand::List => run_list()?,
        ResolvedCommand::Install(params) => run_install(params).await?,
        ResolvedCommand::PrivilegedHelper(params) => run_privileged_helper(params)?,
    }

    Ok(())
}
