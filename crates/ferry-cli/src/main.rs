mod cmd;
mod home;
mod output;

use clap::{Parser, Subcommand};
use cmd::{actions::ActionsSubcommand, files::FilesSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ferry",
    about = "Manage action recipes and content-addressed file transfers",
    version,
    propagate_version = true
)]
struct Cli {
    /// Registry home (default: FERRY_HOME or ~/.ferry)
    #[arg(long, global = true, env = "FERRY_HOME")]
    home: Option<PathBuf>,

    /// Stream backing-service and network diagnostics to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, short = 'j', global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage action definitions
    Actions {
        #[command(subcommand)]
        subcommand: ActionsSubcommand,
    },

    /// Move files through the content-addressed network
    Files {
        #[command(subcommand)]
        subcommand: FilesSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let home = home::resolve_home(cli.home.as_deref());
    let sink = ferry_core::sink::select(cli.verbose);

    let result = match cli.command {
        Commands::Actions { subcommand } => cmd::actions::run(&home, subcommand, sink, cli.json),
        Commands::Files { subcommand } => cmd::files::run(subcommand, sink, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
