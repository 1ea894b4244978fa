use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use ferry_core::client::HttpClient;
use ferry_core::registry::ActionRegistry;
use ferry_core::service::DockerLauncher;
use ferry_core::sink::Sink;
use ferry_core::transfer::Transfer;
use std::path::Path;

#[derive(Subcommand)]
pub enum ActionsSubcommand {
    /// Create an empty action definition
    New {
        /// Name parts, joined with underscores
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Fetch an action definition from a remote source
    Import {
        /// Source reference, `scheme:locator`
        source: String,
        /// Name for the imported definition
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Upload an action definition, printing its content hash
    Export {
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Open an action definition in $EDITOR
    Edit {
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Rename an action definition
    Rename { old: String, new: String },
    /// List known action definitions
    Ls,
    /// Remove an action, optionally deleting its file
    Rm {
        #[arg(required = true)]
        name: Vec<String>,
        /// Also delete the backing definition file
        #[arg(long)]
        file: bool,
    },
}

pub fn run(
    home: &Path,
    subcmd: ActionsSubcommand,
    sink: &dyn Sink,
    json: bool,
) -> anyhow::Result<()> {
    let registry = ActionRegistry::new(ferry_core::paths::actions_dir(home));

    match subcmd {
        ActionsSubcommand::New { name } => {
            let path = registry.create(&name).context("failed to create action")?;
            if json {
                print_json(&serde_json::json!({ "path": path }))?;
            } else {
                println!("Created {}", path.display());
            }
            Ok(())
        }
        ActionsSubcommand::Import { source, name } => {
            let launcher = DockerLauncher::new();
            let client = HttpClient::new().context("failed to build network client")?;
            let transfer = Transfer::new(&launcher, &client)?;
            registry
                .import(&source, &name, &transfer, sink)
                .with_context(|| format!("failed to import from '{source}'"))
        }
        ActionsSubcommand::Export { name } => {
            let launcher = DockerLauncher::new();
            let client = HttpClient::new().context("failed to build network client")?;
            let transfer = Transfer::new(&launcher, &client)?;
            let name = name.join(" ");
            let hash = registry
                .export(&name, &transfer, sink)
                .with_context(|| format!("failed to export '{name}'"))?;
            if json {
                print_json(&serde_json::json!({ "hash": hash }))?;
            } else {
                println!("{hash}");
            }
            Ok(())
        }
        ActionsSubcommand::Edit { name } => {
            let name = name.join(" ");
            registry
                .edit(&name)
                .with_context(|| format!("failed to edit '{name}'"))
        }
        ActionsSubcommand::Rename { old, new } => registry
            .rename(&old, &new, sink)
            .with_context(|| format!("failed to rename '{old}' to '{new}'")),
        ActionsSubcommand::Ls => {
            let names = registry.list().context("failed to list actions")?;
            if json {
                print_json(&names)?;
                return Ok(());
            }
            if names.is_empty() {
                println!("No actions yet.");
            } else {
                println!("{}", names.join("\n"));
            }
            Ok(())
        }
        ActionsSubcommand::Rm { name, file } => registry
            .remove(&name, file, sink)
            .context("failed to remove action"),
    }
}
