use clap::{ArgAction, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber;

#[derive(Debug, Clone)]
pub enum Command {
    List,
    Install {
        category: String,
        tool: String,
        eap: bool,
        insiders: bool,
        install_root: Option<String>,
        skip_dependencies: bool,
        config_path: Option<String>,
    },
    PrivilegedHelper {
        payload: String,
    },
}

pub struct Args {
    pub command: Command,
    pub log_level: Level,
}

#[derive(Debug, Parser)]
#[command(
    name = "toolprep",
    version,
    about = "Install the latest upstream releases of developer tools, verified against their published checksums"
)]
struct Cli {
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Sets the level of verbosity",
        action = ArgAction::Count,
        global = true
    )]
    verbose: u8,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// List the installable tools, grouped by category
    List,

    /// Download, verify and install a tool
    Install {
        #[arg(value_name = "CATEGORY", help = "Tool category, e.g. ide or games")]
        category: String,

        #[arg(value_name = "TOOL", help = "Tool id within the category, e.g. pycharm")]
        tool: String,

        #[arg(long = "eap", help = "Install the early access release", conflicts_with = "insiders")]
        eap: bool,

        #[arg(long = "insiders", help = "Install the insiders release")]
        insiders: bool,

        #[arg(
            long = "install-root",
            value_name = "DIR",
            help = "Overrides the directory tools are installed under"
        )]
        install_root: Option<String>,

        #[arg(long = "skip-dependencies", help = "Do not install system package dependencies")]
        skip_dependencies: bool,

        #[arg(short = 'c', long = "config", value_name = "FILE", help = "Sets a custom config file")]
        config: Option<String>,
    },

    #[command(name = "privileged-helper", hide = true)]
    PrivilegedHelper {
        #[arg(value_name = "JSON")]
        payload: String,
    },
}

pub fn parse_args() -> Args {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy()
                .add_directive("reqwest=warn".parse().unwrap())
                .add_directive("hyper=warn".parse().unwrap()),
        )
        .init();

    Args {
        command: cli.command.into(),
        log_level,
    }
}

impl From<CliCommand> for Command {
    fn from(command: CliCommand) -> Self {
        match command {
            CliCommand::List => Command::List,
            CliCommand::Install {
                category,
                tool,
                eap,
                insiders,
                install_root,
                skip_dependencies,
                config,
            } => Command::Install {
                category,
                tool,
                eap,
                insiders,
                install_root,
                skip_dependencies,
                config_path: config,
            },
            CliCommand::PrivilegedHelper { payload } => Command::PrivilegedHelper { payload },
        }
    }
}
